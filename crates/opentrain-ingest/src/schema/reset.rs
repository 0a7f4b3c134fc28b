//! Destructive schema reset
//!
//! Dropping is a two-phase protocol. First every table and foreign key in
//! the current schema is enumerated into an immutable [`SchemaSnapshot`];
//! then a [`DropPlan`] built from that snapshot is executed. The backend is
//! never re-queried once DDL has started, because some backends change or
//! lock their catalog views mid-transaction.
//!
//! Both phases share one transaction. If any statement fails the whole
//! transaction rolls back and the schema is left as it was.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info, warn};

use super::description::SchemaDescription;
use super::quote_ident;
use crate::error::{IngestError, Result};

/// A foreign-key constraint found during enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyInfo {
    pub table: String,
    /// `None` when the backend reports no name; such constraints cannot be
    /// dropped by name and are skipped
    pub name: Option<String>,
}

/// Tables and foreign keys present before a drop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSnapshot {
    tables: Vec<String>,
    foreign_keys: Vec<ForeignKeyInfo>,
}

impl SchemaSnapshot {
    pub fn new(tables: Vec<String>, foreign_keys: Vec<ForeignKeyInfo>) -> Self {
        Self {
            tables,
            foreign_keys,
        }
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn foreign_keys(&self) -> &[ForeignKeyInfo] {
        &self.foreign_keys
    }
}

/// Ordered DROP statements derived from a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropPlan {
    statements: Vec<String>,
    report: DropReport,
}

impl DropPlan {
    /// Every named constraint first, then every table
    pub fn from_snapshot(snapshot: &SchemaSnapshot) -> Self {
        let mut statements = Vec::new();
        let mut report = DropReport::default();

        for fk in snapshot.foreign_keys() {
            match &fk.name {
                Some(name) => {
                    statements.push(format!(
                        "ALTER TABLE {} DROP CONSTRAINT {}",
                        quote_ident(&fk.table),
                        quote_ident(name)
                    ));
                    report.constraints_dropped += 1;
                },
                None => report.constraints_skipped += 1,
            }
        }

        for table in snapshot.tables() {
            statements.push(format!("DROP TABLE {}", quote_ident(table)));
            report.tables_dropped += 1;
        }

        Self { statements, report }
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn report(&self) -> DropReport {
        self.report
    }
}

/// What a drop removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropReport {
    pub tables_dropped: usize,
    pub constraints_dropped: usize,
    /// Unnamed foreign keys left in place
    pub constraints_skipped: usize,
}

/// Outcome of a full drop + create
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub dropped: DropReport,
    pub tables_created: usize,
}

/// Drop and recreate the loader's schema
#[async_trait]
pub trait SchemaManager: Send {
    /// Drop every foreign key, then every table, in one transaction
    async fn drop_all_schema_objects(&mut self) -> Result<DropReport>;

    /// Create every described table from empty; call only after a drop
    async fn create_all_schema_objects(&mut self) -> Result<usize>;

    /// Drop then create
    async fn reset(&mut self) -> Result<ResetReport> {
        let dropped = self.drop_all_schema_objects().await?;
        let tables_created = self.create_all_schema_objects().await?;
        Ok(ResetReport {
            dropped,
            tables_created,
        })
    }
}

/// [`SchemaManager`] for the current schema of a PostgreSQL database
pub struct PgSchemaManager {
    pool: PgPool,
    description: SchemaDescription,
}

impl PgSchemaManager {
    pub fn new(pool: PgPool, description: SchemaDescription) -> Self {
        Self { pool, description }
    }

    /// Enumerate tables and their foreign keys without changing anything
    pub async fn snapshot(&self) -> Result<SchemaSnapshot> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(IngestError::schema_reset("begin"))?;
        let snapshot = inspect(&mut tx).await?;
        tx.rollback()
            .await
            .map_err(IngestError::schema_reset("rollback"))?;
        Ok(snapshot)
    }
}

#[async_trait]
impl SchemaManager for PgSchemaManager {
    async fn drop_all_schema_objects(&mut self) -> Result<DropReport> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(IngestError::schema_reset("begin"))?;

        let snapshot = inspect(&mut tx).await?;
        let plan = DropPlan::from_snapshot(&snapshot);
        let report = plan.report();

        if report.constraints_skipped > 0 {
            warn!(
                skipped = report.constraints_skipped,
                "Unnamed foreign keys cannot be dropped by name and were left in place"
            );
        }

        for statement in plan.statements() {
            debug!(sql = %statement, "Dropping schema object");
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(IngestError::schema_reset("drop"))?;
        }

        tx.commit()
            .await
            .map_err(IngestError::schema_reset("drop commit"))?;

        info!(
            tables = report.tables_dropped,
            constraints = report.constraints_dropped,
            "Dropped all schema objects"
        );

        Ok(report)
    }

    async fn create_all_schema_objects(&mut self) -> Result<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(IngestError::schema_reset("begin"))?;

        for statement in self.description.create_statements() {
            debug!(sql = %statement, "Creating schema object");
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(IngestError::schema_reset("create"))?;
        }

        tx.commit()
            .await
            .map_err(IngestError::schema_reset("create commit"))?;

        let created = self.description.tables.len();
        info!(tables = created, "Created schema objects");
        Ok(created)
    }
}

/// Enumeration phase: read-only catalog queries
async fn inspect(tx: &mut Transaction<'_, Postgres>) -> Result<SchemaSnapshot> {
    let tables: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT c.relname::text
        FROM pg_catalog.pg_class c
        JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
        WHERE n.nspname = current_schema()
          AND c.relkind IN ('r', 'p')
          AND NOT c.relispartition
          -- partitions are dropped with their parent
        ORDER BY c.relname
        "#,
    )
    .fetch_all(&mut **tx)
    .await
    .map_err(IngestError::schema_reset("inspect tables"))?;

    let mut foreign_keys = Vec::new();
    for table in &tables {
        let names: Vec<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT NULLIF(con.conname::text, '')
            FROM pg_catalog.pg_constraint con
            JOIN pg_catalog.pg_class c ON c.oid = con.conrelid
            JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
            WHERE con.contype = 'f'
              AND n.nspname = current_schema()
              AND c.relname = $1
            ORDER BY con.conname
            "#,
        )
        .bind(table)
        .fetch_all(&mut **tx)
        .await
        .map_err(IngestError::schema_reset("inspect foreign keys"))?;

        foreign_keys.extend(names.into_iter().map(|name| ForeignKeyInfo {
            table: table.clone(),
            name,
        }));
    }

    debug!(
        tables = tables.len(),
        foreign_keys = foreign_keys.len(),
        "Captured schema snapshot"
    );

    Ok(SchemaSnapshot::new(tables, foreign_keys))
}
