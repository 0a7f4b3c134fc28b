//! Schema description and destructive reset
//!
//! - [`description`]: the tables, columns and references the loader owns,
//!   rendered to DDL
//! - [`reset`]: snapshot the live schema, drop constraints then tables,
//!   recreate from the description

pub mod description;
pub mod reset;

pub use description::{ColumnDef, Reference, SchemaDescription, SqlType, TableDef};
pub use reset::{
    DropPlan, DropReport, ForeignKeyInfo, PgSchemaManager, ResetReport, SchemaManager,
    SchemaSnapshot,
};

/// Quote a PostgreSQL identifier, doubling embedded quotes
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
