//! Ad performance records

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use adrep_common::error::Result;

use crate::schema::{cached_schema, FieldBinding, FieldSetter, RecordSchema};

use super::{common_bindings, segment_key, ReportCommon, ReportRecord, ReportRow, ReportType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdPerformance {
    #[serde(flatten)]
    pub common: ReportCommon,
    pub campaign_id: Option<i64>,
    pub ad_group_id: Option<i64>,
    pub ad_id: Option<i64>,
    pub headline: Option<String>,
    pub ad_state: Option<String>,
    pub display_url: Option<String>,
}

fn set_campaign_id(r: &mut AdPerformance, v: i64) {
    r.campaign_id = Some(v);
}

fn set_ad_group_id(r: &mut AdPerformance, v: i64) {
    r.ad_group_id = Some(v);
}

fn set_ad_id(r: &mut AdPerformance, v: i64) {
    r.ad_id = Some(v);
}

fn set_headline(r: &mut AdPerformance, v: String) {
    r.headline = Some(v);
}

fn set_ad_state(r: &mut AdPerformance, v: String) {
    r.ad_state = Some(v);
}

fn set_display_url(r: &mut AdPerformance, v: String) {
    r.display_url = Some(v);
}

fn own_bindings() -> Vec<FieldBinding<AdPerformance>> {
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
            column: "Ad ID",
            field: "Id",
            setter: FieldSetter::Integer(set_ad_id),
        },
        FieldBinding {
            column: "Ad",
            field: "Headline",
            setter: FieldSetter::Text(set_headline),
        },
        FieldBinding {
            column: "Ad state",
            field: "Status",
            setter: FieldSetter::Text(set_ad_state),
        },
        FieldBinding {
            column: "Display URL",
            field: "DisplayUrl",
            setter: FieldSetter::Text(set_display_url),
        },
    ]
}

impl ReportRecord for AdPerformance {
    const REPORT_TYPE: ReportType = ReportType::AdPerformance;

    fn schema() -> Result<&'static RecordSchema<Self>> {
        static SCHEMA: OnceLock<RecordSchema<AdPerformance>> = OnceLock::new();
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
            self.ad_id.map(|v| v.to_string()).unwrap_or_default(),
        ];
        key.extend(segment_key(&self.common));
        key
    }

    fn into_row(self) -> ReportRow {
        ReportRow::Ad(self)
    }
}
