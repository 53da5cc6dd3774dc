//! Campaign performance records

use std::sync::OnceLock;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use adrep_common::error::Result;

use crate::schema::{cached_schema, FieldBinding, FieldSetter, RecordSchema};

use super::{common_bindings, segment_key, ReportCommon, ReportRecord, ReportRow, ReportType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignPerformance {
    #[serde(flatten)]
    pub common: ReportCommon,
    pub campaign_id: Option<i64>,
    pub campaign_name: Option<String>,
    pub campaign_status: Option<String>,
    pub budget: Option<BigDecimal>,
}

fn set_campaign_id(r: &mut CampaignPerformance, v: i64) {
    r.campaign_id = Some(v);
}

fn set_campaign_name(r: &mut CampaignPerformance, v: String) {
    r.campaign_name = Some(v);
}

fn set_campaign_status(r: &mut CampaignPerformance, v: String) {
    r.campaign_status = Some(v);
}

fn set_budget(r: &mut CampaignPerformance, v: BigDecimal) {
    r.budget = Some(v);
}

fn own_bindings() -> Vec<FieldBinding<CampaignPerformance>> {
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
            column: "Campaign state",
            field: "Status",
            setter: FieldSetter::Text(set_campaign_status),
        },
        FieldBinding {
            column: "Budget",
            field: "Amount",
            setter: FieldSetter::Money(set_budget),
        },
    ]
}

impl ReportRecord for CampaignPerformance {
    const REPORT_TYPE: ReportType = ReportType::CampaignPerformance;

    fn schema() -> Result<&'static RecordSchema<Self>> {
        static SCHEMA: OnceLock<RecordSchema<CampaignPerformance>> = OnceLock::new();
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
        let mut key = vec![self
            .campaign_id
            .map(|v| v.to_string())
            .unwrap_or_default()];
        key.extend(segment_key(&self.common));
        key
    }

    fn into_row(self) -> ReportRow {
        ReportRow::Campaign(self)
    }
}
