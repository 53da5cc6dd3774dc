//! Ingestion configuration
//!
//! Defaults are production-shaped; the environment overrides individual
//! knobs. Field inclusion lists ride alongside the scalar settings because
//! they decide what each report download asks for.

use std::collections::HashMap;
use std::env;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use adrep_common::error::{AdrepError, Result};

use crate::records::ReportType;

const DEFAULT_BATCH_SIZE: usize = 1000;
const DEFAULT_WORKER_POOL_SIZE: usize = 20;
const DEFAULT_ACCOUNT_CHUNK_SIZE: usize = 500;
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Manager account the run is scoped under
    pub top_account_id: u64,
    pub endpoint: String,
    pub user_agent: String,
    /// Rows buffered per sink write
    pub batch_size: usize,
    /// Concurrent account downloads per report type
    pub worker_pool_size: usize,
    /// Accounts submitted to the worker pool at a time
    pub account_chunk_size: usize,
    pub download_timeout_secs: u64,
    /// Fields to request per report type name
    pub field_inclusions: HashMap<String, Vec<String>>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            top_account_id: 0,
            endpoint: String::new(),
            user_agent: format!("adrep/{}", env!("CARGO_PKG_VERSION")),
            batch_size: DEFAULT_BATCH_SIZE,
            worker_pool_size: DEFAULT_WORKER_POOL_SIZE,
            account_chunk_size: DEFAULT_ACCOUNT_CHUNK_SIZE,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            field_inclusions: HashMap::new(),
        }
    }
}

impl IngestConfig {
    /// Load configuration from the environment on top of the defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = env::var("ADREP_TOP_ACCOUNT_ID") {
            config.top_account_id =
                parse_account_id(&value).context("invalid ADREP_TOP_ACCOUNT_ID")?;
        }
        if let Ok(value) = env::var("ADREP_ENDPOINT") {
            config.endpoint = value;
        }
        if let Ok(value) = env::var("ADREP_USER_AGENT") {
            config.user_agent = value;
        }
        if let Ok(value) = env::var("ADREP_BATCH_SIZE") {
            config.batch_size = value.parse().context("invalid ADREP_BATCH_SIZE")?;
        }
        if let Ok(value) = env::var("ADREP_WORKER_POOL_SIZE") {
            config.worker_pool_size = value.parse().context("invalid ADREP_WORKER_POOL_SIZE")?;
        }
        if let Ok(value) = env::var("ADREP_ACCOUNT_CHUNK_SIZE") {
            config.account_chunk_size =
                value.parse().context("invalid ADREP_ACCOUNT_CHUNK_SIZE")?;
        }
        if let Ok(value) = env::var("ADREP_DOWNLOAD_TIMEOUT_SECS") {
            config.download_timeout_secs =
                value.parse().context("invalid ADREP_DOWNLOAD_TIMEOUT_SECS")?;
        }

        if config.field_inclusions.is_empty() {
            config.field_inclusions = default_field_inclusions()?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.top_account_id == 0 {
            anyhow::bail!("top_account_id must be set");
        }
        if self.endpoint.is_empty() {
            anyhow::bail!("endpoint must be set");
        }
        if self.batch_size == 0 {
            anyhow::bail!("batch_size must be greater than zero");
        }
        if self.worker_pool_size == 0 {
            anyhow::bail!("worker_pool_size must be greater than zero");
        }
        if self.account_chunk_size == 0 {
            anyhow::bail!("account_chunk_size must be greater than zero");
        }
        if self.download_timeout_secs == 0 {
            anyhow::bail!("download_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

/// Inclusion lists that request every mappable field for every report type.
pub fn default_field_inclusions() -> Result<HashMap<String, Vec<String>>> {
    let mut map = HashMap::new();
    for report_type in ReportType::ALL {
        let fields = report_type
            .selectable_fields()?
            .iter()
            .map(|f| f.to_string())
            .collect();
        map.insert(report_type.name().to_string(), fields);
    }
    Ok(map)
}

/// Parse an account id, accepting the dashed display form (`123-456-7890`).
pub fn parse_account_id(s: &str) -> Result<u64> {
    let digits = s.replace('-', "");
    digits
        .parse::<u64>()
        .map_err(|_| AdrepError::Parse(format!("invalid account id: {s:?}")))
}

/// Parse field inclusion lists from properties-style text:
/// one `REPORT_TYPE=Field1,Field2` entry per line, `#` starts a comment.
pub fn parse_field_inclusions(text: &str) -> Result<HashMap<String, Vec<String>>> {
    let mut map = HashMap::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (name, fields) = line.split_once('=').ok_or_else(|| {
            AdrepError::Config(format!(
                "field inclusion line {} has no '=': {line:?}",
                lineno + 1
            ))
        })?;
        let report_type: ReportType = name.trim().parse()?;
        let fields: Vec<String> = fields
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        map.insert(report_type.name().to_string(), fields);
    }
    Ok(map)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate_once_required_fields_set() {
        let mut config = IngestConfig::default();
        assert!(config.validate().is_err());

        config.top_account_id = 1234567890;
        config.endpoint = "https://reports.example.com/download".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.worker_pool_size, 20);
        assert_eq!(config.account_chunk_size, 500);
    }

    #[test]
    fn test_account_id_accepts_dashed_form() {
        assert_eq!(parse_account_id("123-456-7890").unwrap(), 1234567890);
        assert_eq!(parse_account_id("1234567890").unwrap(), 1234567890);
        assert!(parse_account_id("12a-45").is_err());
        assert!(parse_account_id("").is_err());
    }

    #[test]
    fn test_default_inclusions_cover_every_report_type() {
        let map = default_field_inclusions().unwrap();
        for report_type in ReportType::ALL {
            let fields = map.get(report_type.name()).unwrap();
            assert!(!fields.is_empty(), "{report_type} has no fields");
        }
    }

    #[test]
    fn test_parse_field_inclusions() {
        let text = "\
# trimmed-down account pull
ACCOUNT_PERFORMANCE_REPORT=Impressions, Clicks, Cost

CAMPAIGN_PERFORMANCE_REPORT=CampaignId,Impressions
";
        let map = parse_field_inclusions(text).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("ACCOUNT_PERFORMANCE_REPORT").unwrap(),
            &vec!["Impressions".to_string(), "Clicks".to_string(), "Cost".to_string()]
        );
    }

    #[test]
    fn test_parse_field_inclusions_rejects_malformed_lines() {
        assert!(parse_field_inclusions("ACCOUNT_PERFORMANCE_REPORT").is_err());
        assert!(parse_field_inclusions("NOT_A_REPORT=Foo").is_err());
    }
}
