//! Run orchestration
//!
//! A run walks report types sequentially; within a report type, accounts
//! are downloaded concurrently through a bounded worker pool. One account
//! failing never aborts the wave: each task resolves to an outcome and the
//! run reports the full picture at the end.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use adrep_common::dates::DateRange;
use adrep_common::error::Result;

use crate::auth::SharedCredentials;
use crate::config::IngestConfig;
use crate::definition::{build_request, ReportRequest};
use crate::download::ReportDownloader;
use crate::outcome::{AggregateOutcome, IngestionOutcome, TaskError};
use crate::records::{
    AccountPerformance, AdGroupPerformance, AdPerformance, CampaignNegativeKeyword,
    CampaignPerformance, KeywordPerformance, ReportRecord, ReportType,
};
use crate::sink::ReportSink;
use crate::task::{run_task, IngestionTaskSpec};

pub struct Orchestrator {
    downloader: Arc<dyn ReportDownloader>,
    sink: Arc<dyn ReportSink>,
    credentials: Arc<SharedCredentials>,
    config: IngestConfig,
}

impl Orchestrator {
    pub fn new(
        downloader: Arc<dyn ReportDownloader>,
        sink: Arc<dyn ReportSink>,
        credentials: Arc<SharedCredentials>,
        config: IngestConfig,
    ) -> Self {
        Self {
            downloader,
            sink,
            credentials,
            config,
        }
    }

    /// Ingest the given report types for the given accounts over one date
    /// window. Request construction failures abort the run; per-account
    /// failures are collected into the outcome instead.
    pub async fn ingest(
        &self,
        account_ids: &[u64],
        report_types: &[ReportType],
        date_range: DateRange,
    ) -> Result<AggregateOutcome> {
        let started = Instant::now();
        let mut aggregate = AggregateOutcome::default();

        for &report_type in report_types {
            let request = build_request(report_type, &date_range, &self.config.field_inclusions)?;
            if request.selected_fields.is_empty() {
                warn!(
                    report_type = %report_type,
                    "field inclusions select nothing for this report type, skipping"
                );
                continue;
            }
            let request = Arc::new(request);

            info!(
                report_type = %report_type,
                accounts = account_ids.len(),
                "starting report wave"
            );
            let outcomes = self
                .run_report_type(report_type, account_ids, request, date_range)
                .await;

            for outcome in &outcomes {
                if let Some(err) = &outcome.error {
                    error!(
                        account_id = outcome.account_id,
                        report_type = %outcome.report_type,
                        rows_before_failure = outcome.rows,
                        error = %err,
                        "account ingestion failed"
                    );
                }
                aggregate.record(outcome);
            }
        }

        aggregate.elapsed = started.elapsed();
        info!(
            total_rows = aggregate.total_rows,
            succeeded = aggregate.tasks_succeeded,
            failed = aggregate.failures.len(),
            elapsed_ms = aggregate.elapsed.as_millis() as u64,
            "ingestion run complete"
        );
        Ok(aggregate)
    }

    async fn run_report_type(
        &self,
        report_type: ReportType,
        account_ids: &[u64],
        request: Arc<ReportRequest>,
        date_range: DateRange,
    ) -> Vec<IngestionOutcome> {
        match report_type {
            ReportType::AccountPerformance => {
                self.run_wave::<AccountPerformance>(account_ids, request, date_range).await
            },
            ReportType::CampaignPerformance => {
                self.run_wave::<CampaignPerformance>(account_ids, request, date_range).await
            },
            ReportType::AdGroupPerformance => {
                self.run_wave::<AdGroupPerformance>(account_ids, request, date_range).await
            },
            ReportType::AdPerformance => {
                self.run_wave::<AdPerformance>(account_ids, request, date_range).await
            },
            ReportType::KeywordPerformance => {
                self.run_wave::<KeywordPerformance>(account_ids, request, date_range).await
            },
            ReportType::CampaignNegativeKeyword => {
                self.run_wave::<CampaignNegativeKeyword>(account_ids, request, date_range).await
            },
        }
    }

    async fn run_wave<R: ReportRecord>(
        &self,
        account_ids: &[u64],
        request: Arc<ReportRequest>,
        date_range: DateRange,
    ) -> Vec<IngestionOutcome> {
        let mut outcomes = Vec::with_capacity(account_ids.len());
        // Chunking bounds how many requests queue behind the pool at once.
        for chunk in account_ids.chunks(self.config.account_chunk_size) {
            let mut chunk_outcomes: Vec<IngestionOutcome> = stream::iter(chunk.iter().copied())
                .map(|account_id| {
                    let spec = IngestionTaskSpec {
                        account_id,
                        top_account_id: self.config.top_account_id,
                        report_type: R::REPORT_TYPE,
                        request: request.clone(),
                        date_range,
                    };
                    self.run_account::<R>(spec)
                })
                .buffer_unordered(self.config.worker_pool_size)
                .collect()
                .await;
            outcomes.append(&mut chunk_outcomes);
        }
        outcomes
    }

    async fn run_account<R: ReportRecord>(&self, spec: IngestionTaskSpec) -> IngestionOutcome {
        let credential = self.credentials.current().await;
        let first = run_task::<R>(
            &spec,
            self.downloader.as_ref(),
            self.sink.as_ref(),
            &credential,
            self.config.batch_size,
            self.config.download_timeout_secs,
        )
        .await;

        let expired = first
            .error
            .as_ref()
            .is_some_and(TaskError::is_auth_expired);
        if !expired {
            return first;
        }

        warn!(
            account_id = spec.account_id,
            report_type = %spec.report_type,
            "credential rejected, refreshing and retrying once"
        );
        let refreshed = match self.credentials.refresh_after(&credential).await {
            Ok(credential) => credential,
            Err(err) => {
                let mut outcome = IngestionOutcome::failure(
                    spec.account_id,
                    spec.report_type,
                    first.rows,
                    TaskError::Refresh(err.to_string()),
                );
                outcome.retried_auth = true;
                return outcome;
            },
        };

        // A second auth failure is terminal; no further retry.
        let mut second = run_task::<R>(
            &spec,
            self.downloader.as_ref(),
            self.sink.as_ref(),
            &refreshed,
            self.config.batch_size,
            self.config.download_timeout_secs,
        )
        .await;
        second.retried_auth = true;
        second
    }
}
