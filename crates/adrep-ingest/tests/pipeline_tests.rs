//! End-to-end tests for the report ingestion pipeline
//!
//! These tests validate the full workflow over a mock HTTP report service:
//! - Download, decompress, parse, stamp, and persist in one pass
//! - Credential refresh on an expired token mid-run
//! - Failure isolation across accounts
//! - Batch boundedness under arbitrary stream lengths

use std::io::Write as _;
use std::str::FromStr as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use flate2::write::GzEncoder;
use flate2::Compression;
use proptest::prelude::*;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use adrep_common::dates::DateRange;
use adrep_ingest::auth::{AuthError, SharedCredentials, TokenSource};
use adrep_ingest::buffer::RecordBuffer;
use adrep_ingest::config::{default_field_inclusions, IngestConfig};
use adrep_ingest::download::HttpReportDownloader;
use adrep_ingest::records::{AccountPerformance, ReportRecord as _, ReportRow, ReportType};
use adrep_ingest::sink::MemorySink;
use adrep_ingest::Orchestrator;

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

fn config(endpoint: String) -> IngestConfig {
    IngestConfig {
        top_account_id: 1_234_567_890,
        endpoint,
        field_inclusions: default_field_inclusions().expect("default inclusions"),
        ..IngestConfig::default()
    }
}

fn range() -> DateRange {
    DateRange::custom(
        NaiveDate::from_ymd_opt(2017, 1, 1).expect("date"),
        NaiveDate::from_ymd_opt(2017, 1, 31).expect("date"),
    )
}

struct CountingSource {
    issued: Arc<AtomicUsize>,
}

#[async_trait]
impl TokenSource for CountingSource {
    async fn issue(&self) -> Result<String, AuthError> {
        self.issued.fetch_add(1, Ordering::SeqCst);
        Ok("refreshed".to_string())
    }
}

fn credentials(issued: &Arc<AtomicUsize>) -> Arc<SharedCredentials> {
    Arc::new(SharedCredentials::new(
        Box::new(CountingSource {
            issued: issued.clone(),
        }),
        "initial".to_string(),
    ))
}

async fn orchestrator_for(server: &MockServer, issued: &Arc<AtomicUsize>) -> (Orchestrator, Arc<MemorySink>) {
    let config = config(format!("{}/report", server.uri()));
    let downloader = Arc::new(
        HttpReportDownloader::new(config.endpoint.clone(), &config.user_agent, 5)
            .expect("downloader"),
    );
    let sink = Arc::new(MemorySink::new());
    let orchestrator = Orchestrator::new(downloader, sink.clone(), credentials(issued), config);
    (orchestrator, sink)
}

#[tokio::test]
async fn test_end_to_end_single_account() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(gzip("Impressions,Cost\n100,2000000\n")),
        )
        .mount(&server)
        .await;

    let issued = Arc::new(AtomicUsize::new(0));
    let (orchestrator, sink) = orchestrator_for(&server, &issued).await;

    let outcome = orchestrator
        .ingest(&[7_001], &[ReportType::AccountPerformance], range())
        .await
        .expect("run");

    assert_eq!(outcome.total_rows, 1);
    assert_eq!(outcome.tasks_succeeded, 1);
    assert!(!outcome.has_failures());

    let records = sink.records().await;
    let record = match &records[0] {
        ReportRow::Account(r) => r,
        other => panic!("unexpected row: {other:?}"),
    };
    assert_eq!(record.common.impressions, Some(100));
    assert_eq!(record.common.cost, Some(BigDecimal::from_str("2.00").expect("decimal")));
    assert_eq!(record.common.account_id, 7_001);
    assert_eq!(record.common.top_account_id, 1_234_567_890);
    assert_eq!(record.common.date_start, "20170101");
    assert!(record.common.id.starts_with("7001-ACCOUNT_PERFORMANCE_REPORT-20170101-20170131-"));
    assert_eq!(issued.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_expired_token_refreshes_over_http() {
    let server = MockServer::start().await;
    // The first request sees the stale token and is rejected once.
    Mock::given(method("POST"))
        .and(path("/report"))
        .and(header("authorization", "Bearer initial"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/report"))
        .and(header("authorization", "Bearer refreshed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(gzip("Impressions\n100\n250\n")),
        )
        .mount(&server)
        .await;

    let issued = Arc::new(AtomicUsize::new(0));
    let (orchestrator, sink) = orchestrator_for(&server, &issued).await;

    let outcome = orchestrator
        .ingest(&[7_001], &[ReportType::AccountPerformance], range())
        .await
        .expect("run");

    assert_eq!(outcome.tasks_succeeded, 1);
    assert!(!outcome.has_failures());
    assert_eq!(outcome.total_rows, 2);
    assert_eq!(issued.load(Ordering::SeqCst), 1);
    assert_eq!(sink.records().await.len(), 2);
}

#[tokio::test]
async fn test_one_account_failing_leaves_the_rest_intact() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report"))
        .and(header("clientCustomerId", "3"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no report for account"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(gzip("Impressions,Clicks\n10,2\n20,4\n")),
        )
        .mount(&server)
        .await;

    let issued = Arc::new(AtomicUsize::new(0));
    let (orchestrator, sink) = orchestrator_for(&server, &issued).await;

    let outcome = orchestrator
        .ingest(&[1, 2, 3, 4, 5], &[ReportType::AccountPerformance], range())
        .await
        .expect("run");

    assert_eq!(outcome.tasks_succeeded, 4);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].account_id, 3);
    assert!(outcome.failures[0].error.contains("permanent"));
    assert_eq!(outcome.total_rows, 8);
    assert_eq!(sink.records().await.len(), 8);

    // A permanent failure must not touch the credential.
    assert_eq!(issued.load(Ordering::SeqCst), 0);
}

fn account_row(impressions: i64) -> ReportRow {
    let mut record = AccountPerformance::default();
    record.common.impressions = Some(impressions);
    record.into_row()
}

proptest! {
    // Whatever the stream length, the buffer hands the sink batches no
    // larger than its capacity and loses nothing at the end.
    #[test]
    fn prop_batches_stay_within_capacity(rows in 1usize..2_000, capacity in 1usize..64) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        runtime.block_on(async move {
            let sink = MemorySink::new();
            let mut buffer = RecordBuffer::new(&sink, capacity);
            for n in 0..rows {
                buffer.add(account_row(n as i64)).await.expect("add");
            }
            buffer.flush().await.expect("final flush");

            let batches = sink.batches().await;
            prop_assert!(batches.iter().all(|b| b.len() <= capacity));
            prop_assert_eq!(batches.len(), rows.div_ceil(capacity));
            prop_assert_eq!(
                batches.iter().map(Vec::len).sum::<usize>(),
                rows
            );
            prop_assert_eq!(buffer.flushed_rows(), rows as u64);
            Ok(())
        })?;
    }
}
