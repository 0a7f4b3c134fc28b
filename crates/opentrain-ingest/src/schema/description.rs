//! Explicit description of the loader's tables
//!
//! The same description drives `CREATE` during a reset and the `schema`
//! command's DDL listing, so there is one place to change a column.

use super::quote_ident;

/// Table holding `Station` rows
pub const STATIONS_TABLE: &str = "stations";

/// Table holding `TrainStop` rows
pub const TRAIN_STOPS_TABLE: &str = "train_stops";

/// Column types used by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    BigSerial,
    Date,
    Timestamp,
    Text,
}

impl SqlType {
    pub fn as_sql(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::BigSerial => "BIGSERIAL",
            SqlType::Date => "DATE",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnDef {
    pub fn required(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: false,
            primary_key: false,
        }
    }

    pub fn nullable(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            nullable: true,
            ..Self::required(name, sql_type)
        }
    }

    pub fn primary_key(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            primary_key: true,
            ..Self::required(name, sql_type)
        }
    }

    fn render(&self) -> String {
        let mut sql = format!("{} {}", quote_ident(self.name), self.sql_type.as_sql());
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

/// A column pointing at another table's key
///
/// When `enforced` is false the reference is documented and indexed but no
/// `FOREIGN KEY` constraint is created, so rows may point at ids that are
/// loaded later (or never).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub column: &'static str,
    pub target_table: &'static str,
    pub target_column: &'static str,
    pub enforced: bool,
}

impl Reference {
    pub fn constraint_name(&self, table: &str) -> String {
        format!("{}_{}_fkey", table, self.column)
    }

    pub fn index_name(&self, table: &str) -> String {
        format!("ix_{}_{}", table, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: Vec<ColumnDef>,
    pub references: Vec<Reference>,
}

impl TableDef {
    fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.render()))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE {} (\n{}\n)", quote_ident(self.name), columns)
    }
}

/// Ordered list of tables the loader creates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescription {
    pub tables: Vec<TableDef>,
}

impl SchemaDescription {
    /// The stations / train stops schema
    pub fn opentrain() -> Self {
        Self {
            tables: vec![
                TableDef {
                    name: STATIONS_TABLE,
                    columns: vec![
                        ColumnDef::primary_key("id", SqlType::Integer),
                        ColumnDef::nullable("name", SqlType::Text),
                    ],
                    references: Vec::new(),
                },
                TableDef {
                    name: TRAIN_STOPS_TABLE,
                    columns: vec![
                        ColumnDef::primary_key("id", SqlType::BigSerial),
                        ColumnDef::required("date", SqlType::Date),
                        ColumnDef::required("train_num", SqlType::Integer),
                        ColumnDef::required("arrive_expected", SqlType::Timestamp),
                        ColumnDef::required("arrive_actual", SqlType::Timestamp),
                        ColumnDef::required("depart_expected", SqlType::Timestamp),
                        ColumnDef::required("depart_actual", SqlType::Timestamp),
                        ColumnDef::required("station_id", SqlType::Integer),
                    ],
                    references: vec![Reference {
                        column: "station_id",
                        target_table: STATIONS_TABLE,
                        target_column: "id",
                        // Stop files reference stations that are loaded separately
                        enforced: false,
                    }],
                },
            ],
        }
    }

    /// DDL to build the schema from empty
    ///
    /// Tables come first in declaration order, then foreign keys for
    /// enforced references, then one index per referencing column.
    pub fn create_statements(&self) -> Vec<String> {
        let mut statements: Vec<String> = self.tables.iter().map(TableDef::create_table_sql).collect();

        for table in &self.tables {
            for reference in table.references.iter().filter(|r| r.enforced) {
                statements.push(format!(
                    "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
                    quote_ident(table.name),
                    quote_ident(&reference.constraint_name(table.name)),
                    quote_ident(reference.column),
                    quote_ident(reference.target_table),
                    quote_ident(reference.target_column),
                ));
            }
        }

        for table in &self.tables {
            for reference in &table.references {
                statements.push(format!(
                    "CREATE INDEX {} ON {} ({})",
                    quote_ident(&reference.index_name(table.name)),
                    quote_ident(table.name),
                    quote_ident(reference.column),
                ));
            }
        }

        statements
    }
}
