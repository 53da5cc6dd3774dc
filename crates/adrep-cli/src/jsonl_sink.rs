//! JSON Lines sink
//!
//! Writes each ingested row as one JSON object per line. The record type
//! tag travels inside the object, so a single output file can hold rows
//! from every report category.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::Mutex;

use adrep_ingest::records::ReportRow;
use adrep_ingest::sink::{ReportSink, SinkError};

pub struct JsonLinesSink {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    /// Create the output file, truncating any previous run's content.
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to create output file {}", path.display()))?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

#[async_trait]
impl ReportSink for JsonLinesSink {
    async fn write_batch(&self, records: &[ReportRow]) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().await;
        for record in records {
            let line = serde_json::to_string(record).map_err(|e| SinkError(e.to_string()))?;
            writeln!(writer, "{line}").map_err(|e| SinkError(e.to_string()))?;
        }
        // Flush per batch so rows survive a later task failure.
        writer.flush().map_err(|e| SinkError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use adrep_ingest::records::{AccountPerformance, CampaignPerformance, ReportRecord as _};

    #[tokio::test]
    async fn test_writes_one_json_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.jsonl");
        let sink = JsonLinesSink::create(&path).unwrap();

        let mut account = AccountPerformance::default();
        account.common.impressions = Some(100);
        let mut campaign = CampaignPerformance::default();
        campaign.campaign_id = Some(42);

        sink.write_batch(&[account.into_row(), campaign.into_row()])
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["record_type"], "account");
        assert_eq!(first["impressions"], 100);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["record_type"], "campaign");
        assert_eq!(second["campaign_id"], 42);
    }

    #[tokio::test]
    async fn test_batches_append_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.jsonl");
        let sink = JsonLinesSink::create(&path).unwrap();

        for n in 0..3 {
            let mut record = AccountPerformance::default();
            record.common.clicks = Some(n);
            sink.write_batch(&[record.into_row()]).await.unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let clicks: Vec<i64> = content
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["clicks"]
                .as_i64()
                .unwrap())
            .collect();
        assert_eq!(clicks, vec![0, 1, 2]);
    }
}
