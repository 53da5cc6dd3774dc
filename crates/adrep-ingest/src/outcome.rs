//! Task and run outcomes
//!
//! Every per-account task resolves to an [`IngestionOutcome`] whether it
//! succeeded or not; failures never cross the task boundary as panics or
//! bare errors. A full run folds its outcomes into an [`AggregateOutcome`].

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use adrep_common::error::AdrepError;

use crate::download::DownloadError;
use crate::records::ReportType;
use crate::sink::SinkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    RetryingAuth,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::RetryingAuth => "retrying_auth",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error("download timed out after {0}s")]
    Timeout(u64),
    #[error(transparent)]
    Data(#[from] AdrepError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("credential refresh failed: {0}")]
    Refresh(String),
}

impl TaskError {
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, TaskError::Download(DownloadError::AuthExpired(_)))
    }
}

/// Terminal result of one account x report-type task.
#[derive(Debug)]
pub struct IngestionOutcome {
    pub account_id: u64,
    pub report_type: ReportType,
    /// Rows handed to the sink, including rows flushed before a failure.
    pub rows: u64,
    pub retried_auth: bool,
    pub error: Option<TaskError>,
}

impl IngestionOutcome {
    pub fn success(account_id: u64, report_type: ReportType, rows: u64) -> Self {
        Self {
            account_id,
            report_type,
            rows,
            retried_auth: false,
            error: None,
        }
    }

    pub fn failure(
        account_id: u64,
        report_type: ReportType,
        rows: u64,
        error: TaskError,
    ) -> Self {
        Self {
            account_id,
            report_type,
            rows,
            retried_auth: false,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn state(&self) -> TaskState {
        if self.is_success() {
            TaskState::Succeeded
        } else {
            TaskState::Failed
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountFailure {
    pub account_id: u64,
    pub report_type: ReportType,
    pub rows_before_failure: u64,
    pub error: String,
}

/// Summary of a whole run across report types and accounts.
#[derive(Debug, Default, Serialize)]
pub struct AggregateOutcome {
    pub total_rows: u64,
    pub tasks_succeeded: u64,
    pub failures: Vec<AccountFailure>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl AggregateOutcome {
    pub fn record(&mut self, outcome: &IngestionOutcome) {
        self.total_rows += outcome.rows;
        match &outcome.error {
            None => self.tasks_succeeded += 1,
            Some(err) => self.failures.push(AccountFailure {
                account_id: outcome.account_id,
                report_type: outcome.report_type,
                rows_before_failure: outcome.rows,
                error: err.to_string(),
            }),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_counts_both_paths() {
        let mut aggregate = AggregateOutcome::default();
        aggregate.record(&IngestionOutcome::success(
            1,
            ReportType::AccountPerformance,
            10,
        ));
        aggregate.record(&IngestionOutcome::failure(
            2,
            ReportType::AccountPerformance,
            4,
            TaskError::Timeout(300),
        ));

        assert_eq!(aggregate.total_rows, 14);
        assert_eq!(aggregate.tasks_succeeded, 1);
        assert!(aggregate.has_failures());
        assert_eq!(aggregate.failures[0].account_id, 2);
        assert_eq!(aggregate.failures[0].rows_before_failure, 4);
        assert!(aggregate.failures[0].error.contains("300"));
    }

    #[test]
    fn test_auth_expiry_detection() {
        let err = TaskError::Download(DownloadError::AuthExpired("401".into()));
        assert!(err.is_auth_expired());
        assert!(!TaskError::Timeout(10).is_auth_expired());
    }

    #[test]
    fn test_outcome_state() {
        let ok = IngestionOutcome::success(1, ReportType::CampaignPerformance, 1);
        assert_eq!(ok.state(), TaskState::Succeeded);
        assert_eq!(ok.state().as_str(), "succeeded");

        let bad = IngestionOutcome::failure(
            1,
            ReportType::CampaignPerformance,
            0,
            TaskError::Refresh("nope".into()),
        );
        assert_eq!(bad.state(), TaskState::Failed);
    }
}
