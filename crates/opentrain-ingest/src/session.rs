//! Persistence session: staged writes flushed by commit

use async_trait::async_trait;
use opentrain_common::TrainStop;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::schema::description::TRAIN_STOPS_TABLE;

/// Rows per INSERT statement; 7 binds per row keeps each statement well
/// under PostgreSQL's 65535 bind-parameter limit.
const INSERT_CHUNK_ROWS: usize = 5_000;

/// Buffer of staged stops that become durable only on `commit`
#[async_trait]
pub trait Session: Send {
    /// Register a stop for the next commit; no I/O
    fn stage(&mut self, stop: TrainStop);

    /// Number of staged, uncommitted stops
    fn pending(&self) -> usize;

    /// Write every staged stop in one transaction and return how many were
    /// written. With nothing staged this is a no-op returning 0.
    ///
    /// On failure the staged stops are discarded.
    async fn commit(&mut self) -> Result<u64>;
}

/// [`Session`] writing to the `train_stops` table
pub struct PgSession {
    pool: PgPool,
    staged: Vec<TrainStop>,
}

impl PgSession {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            staged: Vec::new(),
        }
    }

    /// Pre-size the staging buffer for a known batch size
    pub fn with_capacity(pool: PgPool, capacity: usize) -> Self {
        Self {
            pool,
            staged: Vec::with_capacity(capacity),
        }
    }
}

#[async_trait]
impl Session for PgSession {
    fn stage(&mut self, stop: TrainStop) {
        self.staged.push(stop);
    }

    fn pending(&self) -> usize {
        self.staged.len()
    }

    async fn commit(&mut self) -> Result<u64> {
        if self.staged.is_empty() {
            return Ok(0);
        }

        let capacity = self.staged.capacity();
        let batch = std::mem::replace(&mut self.staged, Vec::with_capacity(capacity));

        let mut tx = self.pool.begin().await.map_err(IngestError::Persistence)?;

        for chunk in batch.chunks(INSERT_CHUNK_ROWS) {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {} (date, train_num, arrive_expected, arrive_actual, \
                 depart_expected, depart_actual, station_id) ",
                TRAIN_STOPS_TABLE
            ));

            query_builder.push_values(chunk, |mut b, stop| {
                b.push_bind(stop.date)
                    .push_bind(stop.train_num)
                    .push_bind(stop.arrive_expected)
                    .push_bind(stop.arrive_actual)
                    .push_bind(stop.depart_expected)
                    .push_bind(stop.depart_actual)
                    .push_bind(stop.station_id);
            });

            query_builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(IngestError::Persistence)?;
        }

        tx.commit().await.map_err(IngestError::Persistence)?;

        debug!(rows = batch.len(), "Committed staged stops");
        Ok(batch.len() as u64)
    }
}
