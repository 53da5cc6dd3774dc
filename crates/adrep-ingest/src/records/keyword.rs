//! Keyword performance records

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use adrep_common::error::Result;

use crate::schema::{cached_schema, FieldBinding, FieldSetter, RecordSchema};

use super::{common_bindings, segment_key, ReportCommon, ReportRecord, ReportRow, ReportType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordPerformance {
    #[serde(flatten)]
    pub common: ReportCommon,
    pub campaign_id: Option<i64>,
    pub ad_group_id: Option<i64>,
    pub keyword_id: Option<i64>,
    pub keyword_text: Option<String>,
    pub match_type: Option<String>,
    pub keyword_status: Option<String>,
    pub quality_score: Option<i64>,
}

fn set_campaign_id(r: &mut KeywordPerformance, v: i64) {
    r.campaign_id = Some(v);
}

fn set_ad_group_id(r: &mut KeywordPerformance, v: i64) {
    r.ad_group_id = Some(v);
}

fn set_keyword_id(r: &mut KeywordPerformance, v: i64) {
    r.keyword_id = Some(v);
}

fn set_keyword_text(r: &mut KeywordPerformance, v: String) {
    r.keyword_text = Some(v);
}

fn set_match_type(r: &mut KeywordPerformance, v: String) {
    r.match_type = Some(v);
}

fn set_keyword_status(r: &mut KeywordPerformance, v: String) {
    r.keyword_status = Some(v);
}

fn set_quality_score(r: &mut KeywordPerformance, v: i64) {
    r.quality_score = Some(v);
}

fn own_bindings() -> Vec<FieldBinding<KeywordPerformance>> {
    vec![
        FieldBinding {
            column: "Campaign ID",
            field: "CampaignId",
            setter: FieldSetter::Integer(set_campaign_id),
        },
        FieldBinding {
            column: "Ad group ID",
            field: "AdGroupId",
            setter: FieldSetter::Integer(set_ad_group_id),
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
        FieldBinding {
            column: "Keyword state",
            field: "Status",
            setter: FieldSetter::Text(set_keyword_status),
        },
        FieldBinding {
            column: "Quality score",
            field: "QualityScore",
            setter: FieldSetter::Integer(set_quality_score),
        },
    ]
}

impl ReportRecord for KeywordPerformance {
    const REPORT_TYPE: ReportType = ReportType::KeywordPerformance;

    fn schema() -> Result<&'static RecordSchema<Self>> {
        static SCHEMA: OnceLock<RecordSchema<KeywordPerformance>> = OnceLock::new();
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

    fn natural_key(&self) -> Vec<String> {
        let mut key = vec![
            self.campaign_id.map(|v| v.to_string()).unwrap_or_default(),
            self.ad_group_id.map(|v| v.to_string()).unwrap_or_default(),
            self.keyword_id.map(|v| v.to_string()).unwrap_or_default(),
        ];
        key.extend(segment_key(&self.common));
        key
    }

    fn into_row(self) -> ReportRow {
        ReportRow::Keyword(self)
    }
}
