//! `adrep run` - execute an ingestion pass
//!
//! Wires the configured downloader, the shared credential store and the
//! JSON Lines sink into an orchestrator, runs it, and reports the outcome.
//! The process exits nonzero when any account task failed, even though
//! successful accounts' rows have already been written.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;

use adrep_common::dates::{DateRange, DateRangeType};
use adrep_ingest::auth::{SharedCredentials, StaticTokenSource};
use adrep_ingest::config::{parse_account_id, parse_field_inclusions, IngestConfig};
use adrep_ingest::download::HttpReportDownloader;
use adrep_ingest::records::ReportType;
use adrep_ingest::Orchestrator;

use crate::jsonl_sink::JsonLinesSink;

const TOKEN_ENV_VAR: &str = "ADREP_AUTH_TOKEN";

pub struct RunOptions {
    pub accounts: String,
    pub reports: Option<String>,
    pub date_range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub output: PathBuf,
    pub endpoint: Option<String>,
    pub fields_file: Option<PathBuf>,
}

pub async fn run(options: RunOptions) -> anyhow::Result<()> {
    let mut config = IngestConfig::from_env()?;
    if let Some(endpoint) = options.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(path) = &options.fields_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read field inclusion file {}", path.display()))?;
        config.field_inclusions = parse_field_inclusions(&text)?;
    }
    config.validate()?;

    let accounts = parse_accounts(&options.accounts)?;
    let reports = parse_reports(options.reports.as_deref())?;
    let range = parse_range(
        options.date_range.as_deref(),
        options.start.as_deref(),
        options.end.as_deref(),
    )?;

    let token =
        env::var(TOKEN_ENV_VAR).with_context(|| format!("{TOKEN_ENV_VAR} must be set"))?;
    let credentials = Arc::new(SharedCredentials::new(
        Box::new(StaticTokenSource::new(token.clone())),
        token,
    ));
    let downloader = Arc::new(HttpReportDownloader::new(
        config.endpoint.clone(),
        &config.user_agent,
        config.download_timeout_secs,
    )?);
    let sink = Arc::new(JsonLinesSink::create(&options.output)?);

    let orchestrator = Orchestrator::new(downloader, sink, credentials, config);
    let outcome = orchestrator.ingest(&accounts, &reports, range).await?;

    let total_tasks = outcome.tasks_succeeded + outcome.failures.len() as u64;
    println!(
        "Ingested {} rows across {} tasks in {:.1}s, output: {}",
        outcome.total_rows,
        total_tasks,
        outcome.elapsed.as_secs_f64(),
        options.output.display()
    );
    if outcome.has_failures() {
        for failure in &outcome.failures {
            eprintln!(
                "  account {} / {}: {} ({} rows kept)",
                failure.account_id,
                failure.report_type,
                failure.error,
                failure.rows_before_failure
            );
        }
        anyhow::bail!("{} of {total_tasks} tasks failed", outcome.failures.len());
    }
    Ok(())
}

fn parse_accounts(text: &str) -> anyhow::Result<Vec<u64>> {
    let accounts: Vec<u64> = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_account_id)
        .collect::<Result<_, _>>()?;
    if accounts.is_empty() {
        anyhow::bail!("no account ids given");
    }
    Ok(accounts)
}

fn parse_reports(text: Option<&str>) -> anyhow::Result<Vec<ReportType>> {
    match text {
        None => Ok(ReportType::ALL.to_vec()),
        Some(text) => {
            let reports: Vec<ReportType> = text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|name| name.parse())
                .collect::<Result<_, _>>()?;
            if reports.is_empty() {
                anyhow::bail!("no report types given");
            }
            Ok(reports)
        },
    }
}

fn parse_range(
    named: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> anyhow::Result<DateRange> {
    match (start, end) {
        (Some(start), Some(end)) => {
            let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
                .with_context(|| format!("invalid start date {start:?}, expected YYYY-MM-DD"))?;
            let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
                .with_context(|| format!("invalid end date {end:?}, expected YYYY-MM-DD"))?;
            let range = DateRange::custom(start, end);
            range.validate()?;
            Ok(range)
        },
        _ => {
            let range_type = match named {
                Some(name) => name.parse()?,
                None => DateRangeType::Last30Days,
            };
            if range_type == DateRangeType::CustomDate {
                anyhow::bail!("CUSTOM_DATE requires --start and --end");
            }
            Ok(DateRange::relative(range_type))
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accounts_accepts_dashed_and_plain() {
        let accounts = parse_accounts("123-456-7890, 42,7").unwrap();
        assert_eq!(accounts, vec![1_234_567_890, 42, 7]);
        assert!(parse_accounts("").is_err());
        assert!(parse_accounts("abc").is_err());
    }

    #[test]
    fn test_parse_reports_defaults_to_all() {
        assert_eq!(parse_reports(None).unwrap().len(), ReportType::ALL.len());
        let picked =
            parse_reports(Some("CAMPAIGN_PERFORMANCE_REPORT, KEYWORDS_PERFORMANCE_REPORT"))
                .unwrap();
        assert_eq!(
            picked,
            vec![ReportType::CampaignPerformance, ReportType::KeywordPerformance]
        );
        assert!(parse_reports(Some("NOT_A_REPORT")).is_err());
    }

    #[test]
    fn test_parse_range_variants() {
        let custom = parse_range(None, Some("2017-01-01"), Some("2017-01-31")).unwrap();
        assert_eq!(custom.range_type, DateRangeType::CustomDate);
        assert_eq!(custom.start_str(), "20170101");

        let named = parse_range(Some("YESTERDAY"), None, None).unwrap();
        assert_eq!(named.range_type, DateRangeType::Yesterday);

        let default = parse_range(None, None, None).unwrap();
        assert_eq!(default.range_type, DateRangeType::Last30Days);

        assert!(parse_range(Some("CUSTOM_DATE"), None, None).is_err());
        assert!(parse_range(None, Some("2017-02-01"), Some("2017-01-01")).is_err());
        assert!(parse_range(None, Some("bad"), Some("2017-01-01")).is_err());
    }
}
