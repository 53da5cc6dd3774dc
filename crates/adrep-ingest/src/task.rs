//! Per-account ingestion task
//!
//! One task covers one account and one report type: download the gzipped
//! payload, stream-decode rows, stamp run context and deterministic ids,
//! and batch rows into the sink. Every failure mode resolves to an
//! [`IngestionOutcome`]; nothing panics across the task boundary.

use std::sync::Arc;
use std::time::Duration;

use flate2::read::GzDecoder;
use tracing::{debug, warn};

use adrep_common::dates::DateRange;
use adrep_common::error::AdrepError;
use adrep_common::record_id::record_id;

use crate::auth::Credential;
use crate::buffer::RecordBuffer;
use crate::definition::ReportRequest;
use crate::download::ReportDownloader;
use crate::outcome::{IngestionOutcome, TaskError};
use crate::parser::RowStream;
use crate::records::{ReportRecord, ReportType};
use crate::sink::ReportSink;

/// Everything a task needs to know about its slice of the run.
#[derive(Clone)]
pub struct IngestionTaskSpec {
    pub account_id: u64,
    pub top_account_id: u64,
    pub report_type: ReportType,
    pub request: Arc<ReportRequest>,
    pub date_range: DateRange,
}

pub async fn run_task<R: ReportRecord>(
    spec: &IngestionTaskSpec,
    downloader: &dyn ReportDownloader,
    sink: &dyn ReportSink,
    credential: &Credential,
    batch_size: usize,
    download_timeout_secs: u64,
) -> IngestionOutcome {
    let mut buffer = RecordBuffer::new(sink, batch_size);
    let result = ingest_stream::<R>(
        spec,
        downloader,
        credential,
        &mut buffer,
        download_timeout_secs,
    )
    .await;

    match result {
        Ok(()) => match buffer.flush().await {
            Ok(()) => {
                debug!(
                    account_id = spec.account_id,
                    report_type = %spec.report_type,
                    rows = buffer.flushed_rows(),
                    "task complete"
                );
                IngestionOutcome::success(spec.account_id, spec.report_type, buffer.flushed_rows())
            },
            Err(err) => IngestionOutcome::failure(
                spec.account_id,
                spec.report_type,
                buffer.flushed_rows(),
                err.into(),
            ),
        },
        Err(err) => {
            // Keep whatever parsed cleanly; idempotent ids make the
            // eventual re-ingestion safe.
            if let Err(flush_err) = buffer.flush().await {
                warn!(
                    account_id = spec.account_id,
                    error = %flush_err,
                    "failed to flush partial batch after task error"
                );
            }
            IngestionOutcome::failure(
                spec.account_id,
                spec.report_type,
                buffer.flushed_rows(),
                err,
            )
        },
    }
}

async fn ingest_stream<R: ReportRecord>(
    spec: &IngestionTaskSpec,
    downloader: &dyn ReportDownloader,
    credential: &Credential,
    buffer: &mut RecordBuffer<'_>,
    download_timeout_secs: u64,
) -> Result<(), TaskError> {
    let fetch = downloader.fetch(&spec.request, spec.account_id, credential);
    let payload = tokio::time::timeout(Duration::from_secs(download_timeout_secs), fetch)
        .await
        .map_err(|_| TaskError::Timeout(download_timeout_secs))??;

    // Report payloads arrive gzipped.
    let decoder = GzDecoder::new(payload.as_slice());
    let mut rows = RowStream::<R, _>::open(decoder)?;

    while let Some(mut record) = rows.next_record()? {
        stamp(&mut record, spec);
        assign_id(&mut record, spec)?;
        buffer.add(record.into_row()).await?;
    }
    Ok(())
}

/// Stamp run context onto a decoded row. The window is stamped even for
/// report types whose download carries no date filter, so every stored row
/// names the run that produced it.
fn stamp<R: ReportRecord>(record: &mut R, spec: &IngestionTaskSpec) {
    let common = record.common_mut();
    common.account_id = spec.account_id;
    common.top_account_id = spec.top_account_id;
    common.date_range_type = spec.date_range.range_type.as_str().to_string();
    common.date_start = spec.date_range.start_str();
    common.date_end = spec.date_range.end_str();
}

fn assign_id<R: ReportRecord>(record: &mut R, spec: &IngestionTaskSpec) -> Result<(), AdrepError> {
    let mut parts = record.natural_key();
    if parts.iter().all(String::is_empty) {
        // No usable key columns; hash the whole row instead.
        parts = vec![serde_json::to_string(record)?];
    }
    let common = record.common_mut();
    common.id = record_id(
        spec.account_id,
        spec.report_type.name(),
        &common.date_start,
        &common.date_end,
        &parts,
    );
    Ok(())
}
