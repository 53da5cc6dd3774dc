//! Shared base of every report record
//!
//! Context fields (ids, account, date window) are stamped by the ingestion
//! task after parsing; the remaining fields are mapped from report columns
//! shared by all performance report categories.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::schema::{FieldBinding, FieldSetter};

use super::ReportRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportCommon {
    /// Deterministic record id, computed after context stamping
    pub id: String,
    /// Owning account, stamped from the task spec
    pub account_id: u64,
    /// Parent account of the ingested tree, stamped from the task spec
    pub top_account_id: u64,
    /// Date window tag, stamped from the task spec
    pub date_range_type: String,
    pub date_start: String,
    pub date_end: String,

    pub day: Option<String>,
    pub account_name: Option<String>,
    pub currency_code: Option<String>,
    pub device: Option<String>,
    pub network: Option<String>,
    pub click_type: Option<String>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub conversions: Option<i64>,
    pub cost: Option<BigDecimal>,
    pub ctr: Option<BigDecimal>,
    pub avg_cpm: Option<BigDecimal>,
    pub avg_cpc: Option<BigDecimal>,
    pub avg_position: Option<BigDecimal>,
}

/// Segment cells refining a row's natural key
pub fn segment_key(common: &ReportCommon) -> Vec<String> {
    [
        common.day.as_deref(),
        common.device.as_deref(),
        common.network.as_deref(),
        common.click_type.as_deref(),
    ]
    .iter()
    .map(|cell| cell.unwrap_or_default().to_string())
    .collect()
}

fn set_day<R: ReportRecord>(r: &mut R, v: String) {
    r.common_mut().day = Some(v);
}

fn set_account_name<R: ReportRecord>(r: &mut R, v: String) {
    r.common_mut().account_name = Some(v);
}

fn set_currency_code<R: ReportRecord>(r: &mut R, v: String) {
    r.common_mut().currency_code = Some(v);
}

fn set_device<R: ReportRecord>(r: &mut R, v: String) {
    r.common_mut().device = Some(v);
}

fn set_network<R: ReportRecord>(r: &mut R, v: String) {
    r.common_mut().network = Some(v);
}

fn set_click_type<R: ReportRecord>(r: &mut R, v: String) {
    r.common_mut().click_type = Some(v);
}

fn set_impressions<R: ReportRecord>(r: &mut R, v: i64) {
    r.common_mut().impressions = Some(v);
}

fn set_clicks<R: ReportRecord>(r: &mut R, v: i64) {
    r.common_mut().clicks = Some(v);
}

fn set_conversions<R: ReportRecord>(r: &mut R, v: i64) {
    r.common_mut().conversions = Some(v);
}

fn set_cost<R: ReportRecord>(r: &mut R, v: BigDecimal) {
    r.common_mut().cost = Some(v);
}

fn set_ctr<R: ReportRecord>(r: &mut R, v: BigDecimal) {
    r.common_mut().ctr = Some(v);
}

fn set_avg_cpm<R: ReportRecord>(r: &mut R, v: BigDecimal) {
    r.common_mut().avg_cpm = Some(v);
}

fn set_avg_cpc<R: ReportRecord>(r: &mut R, v: BigDecimal) {
    r.common_mut().avg_cpc = Some(v);
}

fn set_avg_position<R: ReportRecord>(r: &mut R, v: BigDecimal) {
    r.common_mut().avg_position = Some(v);
}

/// Binding table for the shared base level.
///
/// Column names follow the report download headers; field names follow the
/// selectable field vocabulary of the reporting API.
pub fn common_bindings<R: ReportRecord>() -> Vec<FieldBinding<R>> {
    vec![
        FieldBinding {
            column: "Day",
            field: "Date",
            setter: FieldSetter::Text(set_day::<R>),
        },
        FieldBinding {
            column: "Account",
            field: "AccountDescriptiveName",
            setter: FieldSetter::Text(set_account_name::<R>),
        },
        FieldBinding {
            column: "Currency",
            field: "AccountCurrencyCode",
            setter: FieldSetter::Text(set_currency_code::<R>),
        },
        FieldBinding {
            column: "Device",
            field: "Device",
            setter: FieldSetter::Text(set_device::<R>),
        },
        FieldBinding {
            column: "Network",
            field: "AdNetworkType1",
            setter: FieldSetter::Text(set_network::<R>),
        },
        FieldBinding {
            column: "Click type",
            field: "ClickType",
            setter: FieldSetter::Text(set_click_type::<R>),
        },
        FieldBinding {
            column: "Impressions",
            field: "Impressions",
            setter: FieldSetter::Integer(set_impressions::<R>),
        },
        FieldBinding {
            column: "Clicks",
            field: "Clicks",
            setter: FieldSetter::Integer(set_clicks::<R>),
        },
        FieldBinding {
            column: "Conv. (1-per-click)",
            field: "Conversions",
            setter: FieldSetter::Integer(set_conversions::<R>),
        },
        FieldBinding {
            column: "Cost",
            field: "Cost",
            setter: FieldSetter::Money(set_cost::<R>),
        },
        FieldBinding {
            column: "CTR",
            field: "Ctr",
            setter: FieldSetter::Decimal(set_ctr::<R>),
        },
        FieldBinding {
            column: "Avg. CPM",
            field: "AverageCpm",
            setter: FieldSetter::Money(set_avg_cpm::<R>),
        },
        FieldBinding {
            column: "Avg. CPC",
            field: "AverageCpc",
            setter: FieldSetter::Money(set_avg_cpc::<R>),
        },
        FieldBinding {
            column: "Avg. position",
            field: "AveragePosition",
            setter: FieldSetter::Decimal(set_avg_position::<R>),
        },
    ]
}
