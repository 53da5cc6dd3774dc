//! Typed report records
//!
//! One record type per report category, each composed of the shared
//! [`ReportCommon`] base plus its own columns. Binding tables are merged
//! most-derived first, so a record's own column declaration shadows a
//! same-named column from the base level.

mod account;
mod ad;
mod ad_group;
mod campaign;
mod common;
mod keyword;
mod negative_keyword;

pub use account::AccountPerformance;
pub use ad::AdPerformance;
pub use ad_group::AdGroupPerformance;
pub use campaign::CampaignPerformance;
pub use common::{common_bindings, segment_key, ReportCommon};
pub use keyword::KeywordPerformance;
pub use negative_keyword::CampaignNegativeKeyword;

use serde::{Deserialize, Serialize};

use adrep_common::error::{AdrepError, Result};

use crate::schema::RecordSchema;

/// Report categories understood by the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    AccountPerformance,
    CampaignPerformance,
    AdGroupPerformance,
    AdPerformance,
    KeywordPerformance,
    CampaignNegativeKeyword,
}

impl ReportType {
    pub const ALL: [ReportType; 6] = [
        ReportType::AccountPerformance,
        ReportType::CampaignPerformance,
        ReportType::AdGroupPerformance,
        ReportType::AdPerformance,
        ReportType::KeywordPerformance,
        ReportType::CampaignNegativeKeyword,
    ];

    /// Wire name of the report category
    pub fn name(&self) -> &'static str {
        match self {
            ReportType::AccountPerformance => "ACCOUNT_PERFORMANCE_REPORT",
            ReportType::CampaignPerformance => "CAMPAIGN_PERFORMANCE_REPORT",
            ReportType::AdGroupPerformance => "ADGROUP_PERFORMANCE_REPORT",
            ReportType::AdPerformance => "AD_PERFORMANCE_REPORT",
            ReportType::KeywordPerformance => "KEYWORDS_PERFORMANCE_REPORT",
            ReportType::CampaignNegativeKeyword => {
                "CAMPAIGN_NEGATIVE_KEYWORDS_PERFORMANCE_REPORT"
            },
        }
    }

    /// Structural reports carry no date window.
    pub fn is_date_range_exempt(&self) -> bool {
        matches!(self, ReportType::CampaignNegativeKeyword)
    }

    /// Selectable field names for this category, in declaration order.
    pub fn selectable_fields(&self) -> Result<Vec<&'static str>> {
        match self {
            ReportType::AccountPerformance => Ok(AccountPerformance::schema()?.fields()),
            ReportType::CampaignPerformance => Ok(CampaignPerformance::schema()?.fields()),
            ReportType::AdGroupPerformance => Ok(AdGroupPerformance::schema()?.fields()),
            ReportType::AdPerformance => Ok(AdPerformance::schema()?.fields()),
            ReportType::KeywordPerformance => Ok(KeywordPerformance::schema()?.fields()),
            ReportType::CampaignNegativeKeyword => {
                Ok(CampaignNegativeKeyword::schema()?.fields())
            },
        }
    }
}

impl std::str::FromStr for ReportType {
    type Err = AdrepError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_uppercase();
        ReportType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == normalized)
            .ok_or_else(|| AdrepError::Parse(format!("unknown report type: {s}")))
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A parsed report record of any category.
///
/// Tasks hand rows to the persistence sink through this type so one sink
/// implementation serves every report category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record_type", rename_all = "snake_case")]
pub enum ReportRow {
    Account(AccountPerformance),
    Campaign(CampaignPerformance),
    AdGroup(AdGroupPerformance),
    Ad(AdPerformance),
    Keyword(KeywordPerformance),
    CampaignNegativeKeyword(CampaignNegativeKeyword),
}

impl ReportRow {
    pub fn common(&self) -> &ReportCommon {
        match self {
            ReportRow::Account(r) => &r.common,
            ReportRow::Campaign(r) => &r.common,
            ReportRow::AdGroup(r) => &r.common,
            ReportRow::Ad(r) => &r.common,
            ReportRow::Keyword(r) => &r.common,
            ReportRow::CampaignNegativeKeyword(r) => &r.common,
        }
    }

    pub fn report_type(&self) -> ReportType {
        match self {
            ReportRow::Account(_) => ReportType::AccountPerformance,
            ReportRow::Campaign(_) => ReportType::CampaignPerformance,
            ReportRow::AdGroup(_) => ReportType::AdGroupPerformance,
            ReportRow::Ad(_) => ReportType::AdPerformance,
            ReportRow::Keyword(_) => ReportType::KeywordPerformance,
            ReportRow::CampaignNegativeKeyword(_) => ReportType::CampaignNegativeKeyword,
        }
    }
}

/// A typed record produced by the row parser.
///
/// Each implementation is a factory for itself (`Default`), declares its
/// binding tables through [`schema`](ReportRecord::schema), and exposes the
/// natural key used for deterministic record ids.
pub trait ReportRecord:
    Default + Clone + Serialize + Send + Sync + Sized + 'static
{
    const REPORT_TYPE: ReportType;

    /// The merged, cached column mapping for this record type.
    fn schema() -> Result<&'static RecordSchema<Self>>;

    fn common(&self) -> &ReportCommon;

    fn common_mut(&mut self) -> &mut ReportCommon;

    /// Entity ids plus segment cells identifying the row within its
    /// (account, report type, date window) context. May be empty for
    /// unsegmented records; callers fall back to hashing row content.
    fn natural_key(&self) -> Vec<String>;

    fn into_row(self) -> ReportRow;
}
