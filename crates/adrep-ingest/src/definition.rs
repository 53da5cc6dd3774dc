//! Report request construction
//!
//! A request names the report type, the fields to select, and the date
//! window. Selected fields are the intersection of the operator's inclusion
//! list with the fields the record schema can actually map, in declaration
//! order, so a typo in configuration narrows the download instead of
//! breaking the parse.

use std::collections::HashMap;

use serde::Serialize;

use adrep_common::dates::{DateRange, DateRangeType};
use adrep_common::error::{AdrepError, Result};

use crate::records::ReportType;

pub const DOWNLOAD_FORMAT: &str = "GZIPPED_CSV";
pub const REPORT_NAME_PREFIX: &str = "AdRep";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub report_name: String,
    pub report_type: String,
    pub selected_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range_type: Option<DateRangeType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_end: Option<String>,
    pub download_format: String,
}

/// Build the download request for one report type.
///
/// Structural report types carry no date window; their date fields are left
/// out entirely rather than sent empty.
pub fn build_request(
    report_type: ReportType,
    range: &DateRange,
    field_inclusions: &HashMap<String, Vec<String>>,
) -> Result<ReportRequest> {
    range.validate()?;

    let selectable = report_type.selectable_fields()?;
    let inclusions = field_inclusions.get(report_type.name()).ok_or_else(|| {
        AdrepError::Config(format!(
            "no field inclusion entry for report type {}",
            report_type.name()
        ))
    })?;
    let selected_fields: Vec<String> = selectable
        .iter()
        .filter(|field| inclusions.iter().any(|inc| inc == *field))
        .map(|field| (*field).to_string())
        .collect();

    let (date_range_type, date_start, date_end, report_name) = if report_type.is_date_range_exempt()
    {
        (None, None, None, format!("{REPORT_NAME_PREFIX}-{report_type}"))
    } else {
        let name = match range.range_type {
            DateRangeType::CustomDate => format!(
                "{REPORT_NAME_PREFIX}-{report_type}-{}-{}",
                range.start_str(),
                range.end_str()
            ),
            other => format!("{REPORT_NAME_PREFIX}-{report_type}-{}", other.as_str()),
        };
        (
            Some(range.range_type),
            range.start_str_opt(),
            range.end_str_opt(),
            name,
        )
    };

    Ok(ReportRequest {
        report_name,
        report_type: report_type.name().to_string(),
        selected_fields,
        date_range_type,
        date_start,
        date_end,
        download_format: DOWNLOAD_FORMAT.to_string(),
    })
}
