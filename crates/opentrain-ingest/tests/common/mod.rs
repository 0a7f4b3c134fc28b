//! Shared helpers for loader integration tests
//!
//! - In-memory [`Session`] and [`SchemaManager`] for pipeline tests
//! - [`TestPostgres`]: a throwaway PostgreSQL container (needs Docker)
#![allow(dead_code)]

use anyhow::{Context, Result};
use async_trait::async_trait;
use opentrain_common::TrainStop;
use opentrain_ingest::schema::DropReport;
use opentrain_ingest::{SchemaManager, Session};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tracing::info;

// ============================================================================
// Input files
// ============================================================================

/// A valid stop line for `train_num` at `station_id`
pub fn stop_line(train_num: u32, station_id: u32) -> String {
    format!("20130115\t\"{train_num}\"\t0600\t0603\t0605\t0607\t{station_id}")
}

/// Temp file holding `n` valid stop lines
pub fn stop_file(n: usize) -> NamedTempFile {
    let lines: Vec<String> = (0..n).map(|i| stop_line(100 + i as u32, 3700)).collect();
    write_lines(&lines)
}

pub fn write_lines(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    for line in lines {
        writeln!(file, "{line}").expect("Failed to write temp file");
    }
    file.flush().expect("Failed to flush temp file");
    file
}

// ============================================================================
// In-memory fakes
// ============================================================================

/// Session that keeps committed rows in memory
#[derive(Default)]
pub struct MemorySession {
    pub staged: Vec<TrainStop>,
    pub durable: Vec<TrainStop>,
    pub commits: usize,
}

#[async_trait]
impl Session for MemorySession {
    fn stage(&mut self, stop: TrainStop) {
        self.staged.push(stop);
    }

    fn pending(&self) -> usize {
        self.staged.len()
    }

    async fn commit(&mut self) -> opentrain_ingest::Result<u64> {
        self.commits += 1;
        let batch = std::mem::take(&mut self.staged);
        let written = batch.len() as u64;
        self.durable.extend(batch);
        Ok(written)
    }
}

/// Schema manager that only counts calls
#[derive(Default)]
pub struct CountingSchema {
    pub drops: usize,
    pub creates: usize,
}

#[async_trait]
impl SchemaManager for CountingSchema {
    async fn drop_all_schema_objects(&mut self) -> opentrain_ingest::Result<DropReport> {
        self.drops += 1;
        Ok(DropReport::default())
    }

    async fn create_all_schema_objects(&mut self) -> opentrain_ingest::Result<usize> {
        self.creates += 1;
        Ok(2)
    }
}

// ============================================================================
// PostgreSQL Test Container
// ============================================================================

pub struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    pool: PgPool,
    connection_string: String,
}

impl TestPostgres {
    pub async fn start() -> Result<Self> {
        info!("Starting PostgreSQL test container...");

        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

        let connection_string =
            format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&connection_string)
            .await
            .context("Failed to connect to PostgreSQL")?;

        Ok(Self {
            _container: container,
            pool,
            connection_string,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn pool_clone(&self) -> PgPool {
        self.pool.clone()
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}

/// Initialize tracing for tests; safe to call from every test
pub fn init_test_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,opentrain_ingest=debug,sqlx=warn,testcontainers=info")
        }))
        .with_test_writer()
        .try_init();
}
