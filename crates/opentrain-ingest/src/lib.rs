//! OpenTrain Ingest
//!
//! Loads train-stop records from tab-separated files into PostgreSQL.
//!
//! A run is destructive: every table in the target schema is dropped and the
//! loader's tables are recreated before the first line is read. Rows are then
//! staged and committed in batches, so an aborted run leaves every batch it
//! committed and nothing else.
//!
//! # Modules
//!
//! - [`decode`]: compact `HHMM` offsets and `YYYYMMDD` dates
//! - [`parser`]: one input line to one [`opentrain_common::TrainStop`]
//! - [`schema`]: table description and the drop/create reset
//! - [`session`]: staged writes flushed by commit
//! - [`pipeline`]: the end-to-end run
//! - [`config`] / [`db`]: environment configuration and the connection pool
//!
//! # Example
//!
//! ```no_run
//! use opentrain_ingest::{
//!     config::IngestConfig, db, ingest, IngestOptions, PgSchemaManager, PgSession,
//!     SchemaDescription,
//! };
//! use std::path::Path;
//!
//! # async fn run() -> opentrain_ingest::Result<()> {
//! let config = IngestConfig::load()?;
//! let pool = db::connect(&config.database).await?;
//!
//! let mut schema = PgSchemaManager::new(pool.clone(), SchemaDescription::opentrain());
//! let mut session = PgSession::with_capacity(pool, config.commit_every);
//!
//! let report = ingest(
//!     Path::new("stops.tsv"),
//!     &mut schema,
//!     &mut session,
//!     &IngestOptions::from_config(&config),
//! )
//! .await?;
//! println!("{} rows in {} batches", report.rows_written, report.batches);
//! # Ok(())
//! # }
//! ```
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod db;
pub mod decode;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod schema;
pub mod session;

pub use error::{DecodeError, IngestError, RecordError, Result};
pub use pipeline::{ingest, IngestOptions, IngestReport};
pub use schema::{PgSchemaManager, ResetReport, SchemaDescription, SchemaManager};
pub use session::{PgSession, Session};
