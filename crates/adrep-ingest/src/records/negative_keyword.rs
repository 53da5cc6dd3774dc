//! Campaign negative keyword records
//!
//! A structural report: no metric columns and no date window. The shared
//! base level still supplies the account and segment columns that do appear
//! in the download.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use adrep_common::error::Result;

use crate::schema::{cached_schema, FieldBinding, FieldSetter, RecordSchema};

use super::{common_bindings, ReportCommon, ReportRecord, ReportRow, ReportType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignNegativeKeyword {
    #[serde(flatten)]
    pub common: ReportCommon,
    pub campaign_id: Option<i64>,
    pub campaign_name: Option<String>,
    pub keyword_id: Option<i64>,
    pub keyword_text: Option<String>,
    pub match_type: Option<String>,
}

fn set_campaign_id(r: &mut CampaignNegativeKeyword, v: i64) {
    r.campaign_id = Some(v);
}

fn set_campaign_name(r: &mut CampaignNegativeKeyword, v: String) {
    r.campaign_name = Some(v);
}

fn set_keyword_id(r: &mut CampaignNegativeKeyword, v: i64) {
    r.keyword_id = Some(v);
}

fn set_keyword_text(r: &mut CampaignNegativeKeyword, v: String) {
    r.keyword_text = Some(v);
}

fn set_match_type(r: &mut CampaignNegativeKeyword, v: String) {
    r.match_type = Some(v);
}

fn own_bindings() -> Vec<FieldBinding<CampaignNegativeKeyword>> {
    vec![
        FieldBinding {
            column: "Campaign ID",
            field: "CampaignId",
            setter: FieldSetter::Integer(set_campaign_id),
        },
        FieldBinding {
            column: "Campaign",
            field: "CampaignName",
            setter: FieldSetter::Text(set_campaign_name),
        },
        FieldBinding {
            column: "Keyword ID",
            field: "Id",
            setter: FieldSetter::Integer(set_keyword_id),
        },
        FieldBinding {
            column: "Keyword",
            field: "KeywordText",
            setter: FieldSetter::Text(set_keyword_text),
        },
        FieldBinding {
            column: "Match type",
            field: "KeywordMatchType",
            setter: FieldSetter::Text(set_match_type),
        },
    ]
}

impl ReportRecord for CampaignNegativeKeyword {
    const REPORT_TYPE: ReportType = ReportType::CampaignNegativeKeyword;

    fn schema() -> Result<&'static RecordSchema<Self>> {
        static SCHEMA: OnceLock<RecordSchema<CampaignNegativeKeyword>> = OnceLock::new();
        cached_schema(&SCHEMA, || {
            RecordSchema::build(
                Self::REPORT_TYPE,
                vec![own_bindings(), common_bindings::<Self>()],
            )
        })
    }

    fn common(&self) -> &ReportCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut ReportCommon {
        &mut self.common
    }

    // Structural rows are keyed by campaign and criterion alone.
    fn natural_key(&self) -> Vec<String> {
        vec![
            self.campaign_id.map(|v| v.to_string()).unwrap_or_default(),
            self.keyword_id.map(|v| v.to_string()).unwrap_or_default(),
        ]
    }

    fn into_row(self) -> ReportRow {
        ReportRow::CampaignNegativeKeyword(self)
    }
}
