//! Persistence boundary
//!
//! The pipeline hands fully-stamped rows to a [`ReportSink`] in batches and
//! otherwise knows nothing about where they land. Implementations decide on
//! transactional behavior; the pipeline only requires that a batch either
//! lands or reports an error.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::records::ReportRow;

#[derive(Debug, Error)]
#[error("sink write failed: {0}")]
pub struct SinkError(pub String);

#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn write_batch(&self, records: &[ReportRow]) -> Result<(), SinkError>;
}

/// In-memory sink. Useful for dry runs and as the test double for the
/// pipeline; every flushed batch is retained in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<Vec<ReportRow>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn batches(&self) -> Vec<Vec<ReportRow>> {
        self.batches.lock().await.clone()
    }

    pub async fn records(&self) -> Vec<ReportRow> {
        self.batches.lock().await.iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl ReportSink for MemorySink {
    async fn write_batch(&self, records: &[ReportRow]) -> Result<(), SinkError> {
        self.batches.lock().await.push(records.to_vec());
        Ok(())
    }
}
