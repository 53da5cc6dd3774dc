//! Batched writes to the sink
//!
//! Rows accumulate in memory until the batch threshold, then flush as a
//! single sink call. The owner must flush once more at end of stream to push
//! the remainder; the buffer never flushes on drop.

use tracing::debug;

use crate::records::ReportRow;
use crate::sink::{ReportSink, SinkError};

pub struct RecordBuffer<'a> {
    sink: &'a dyn ReportSink,
    pending: Vec<ReportRow>,
    capacity: usize,
    flushed: u64,
}

impl<'a> RecordBuffer<'a> {
    pub fn new(sink: &'a dyn ReportSink, capacity: usize) -> Self {
        Self {
            sink,
            pending: Vec::with_capacity(capacity),
            capacity,
            flushed: 0,
        }
    }

    /// Queue a row, flushing if the batch threshold is reached.
    pub async fn add(&mut self, row: ReportRow) -> Result<(), SinkError> {
        self.pending.push(row);
        if self.pending.len() >= self.capacity {
            self.flush().await?;
        }
        Ok(())
    }

    /// Write out any pending rows. No-op when the buffer is empty.
    pub async fn flush(&mut self) -> Result<(), SinkError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.sink.write_batch(&self.pending).await?;
        self.flushed += self.pending.len() as u64;
        debug!(batch = self.pending.len(), total = self.flushed, "flushed batch");
        self.pending.clear();
        Ok(())
    }

    /// Rows successfully handed to the sink so far.
    pub fn flushed_rows(&self) -> u64 {
        self.flushed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::records::{AccountPerformance, ReportRecord as _};
    use crate::sink::MemorySink;

    fn row(n: i64) -> ReportRow {
        let mut record = AccountPerformance::default();
        record.common.impressions = Some(n);
        record.into_row()
    }

    #[tokio::test]
    async fn test_flushes_at_threshold() {
        let sink = MemorySink::new();
        let mut buffer = RecordBuffer::new(&sink, 3);
        for n in 0..7 {
            buffer.add(row(n)).await.unwrap();
        }
        // Two full batches went out; one row is still pending.
        assert_eq!(sink.batches().await.len(), 2);
        assert_eq!(buffer.flushed_rows(), 6);

        buffer.flush().await.unwrap();
        let batches = sink.batches().await;
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].len(), 1);
        assert_eq!(buffer.flushed_rows(), 7);
    }

    #[tokio::test]
    async fn test_flush_on_empty_is_a_no_op() {
        let sink = MemorySink::new();
        let mut buffer = RecordBuffer::new(&sink, 3);
        buffer.flush().await.unwrap();
        assert!(sink.batches().await.is_empty());
        assert_eq!(buffer.flushed_rows(), 0);
    }

    #[tokio::test]
    async fn test_preserves_arrival_order() {
        let sink = MemorySink::new();
        let mut buffer = RecordBuffer::new(&sink, 2);
        for n in 0..4 {
            buffer.add(row(n)).await.unwrap();
        }
        let records = sink.records().await;
        let impressions: Vec<_> = records
            .iter()
            .map(|r| r.common().impressions.unwrap())
            .collect();
        assert_eq!(impressions, vec![0, 1, 2, 3]);
    }
}
