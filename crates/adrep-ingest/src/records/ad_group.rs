//! Ad group performance records

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use adrep_common::error::Result;

use crate::schema::{cached_schema, FieldBinding, FieldSetter, RecordSchema};

use super::{common_bindings, segment_key, ReportCommon, ReportRecord, ReportRow, ReportType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdGroupPerformance {
    #[serde(flatten)]
    pub common: ReportCommon,
    pub campaign_id: Option<i64>,
    pub campaign_name: Option<String>,
    pub ad_group_id: Option<i64>,
    pub ad_group_name: Option<String>,
    pub ad_group_status: Option<String>,
}

fn set_campaign_id(r: &mut AdGroupPerformance, v: i64) {
    r.campaign_id = Some(v);
}

fn set_campaign_name(r: &mut AdGroupPerformance, v: String) {
    r.campaign_name = Some(v);
}

fn set_ad_group_id(r: &mut AdGroupPerformance, v: i64) {
    r.ad_group_id = Some(v);
}

fn set_ad_group_name(r: &mut AdGroupPerformance, v: String) {
    r.ad_group_name = Some(v);
}

fn set_ad_group_status(r: &mut AdGroupPerformance, v: String) {
    r.ad_group_status = Some(v);
}

fn own_bindings() -> Vec<FieldBinding<AdGroupPerformance>> {
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
            column: "Ad group ID",
            field: "AdGroupId",
            setter: FieldSetter::Integer(set_ad_group_id),
        },
        FieldBinding {
            column: "Ad group",
            field: "AdGroupName",
            setter: FieldSetter::Text(set_ad_group_name),
        },
        FieldBinding {
            column: "Ad group state",
            field: "Status",
            setter: FieldSetter::Text(set_ad_group_status),
        },
    ]
}

impl ReportRecord for AdGroupPerformance {
    const REPORT_TYPE: ReportType = ReportType::AdGroupPerformance;

    fn schema() -> Result<&'static RecordSchema<Self>> {
        static SCHEMA: OnceLock<RecordSchema<AdGroupPerformance>> = OnceLock::new();
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
        ];
        key.extend(segment_key(&self.common));
        key
    }

    fn into_row(self) -> ReportRow {
        ReportRow::AdGroup(self)
    }
}
