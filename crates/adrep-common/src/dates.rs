//! Report date ranges
//!
//! Date ranges are either a named relative window understood by the remote
//! API or a custom window with explicit bounds. Bounds travel on the wire in
//! `YYYYMMDD` form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AdrepError, Result};

/// Wire format for report date bounds
pub const DATE_WIRE_FORMAT: &str = "%Y%m%d";

/// Named date range categories accepted by the reporting API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateRangeType {
    CustomDate,
    Today,
    Yesterday,
    Last7Days,
    Last14Days,
    Last30Days,
    ThisMonth,
    LastMonth,
}

impl DateRangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRangeType::CustomDate => "CUSTOM_DATE",
            DateRangeType::Today => "TODAY",
            DateRangeType::Yesterday => "YESTERDAY",
            DateRangeType::Last7Days => "LAST_7_DAYS",
            DateRangeType::Last14Days => "LAST_14_DAYS",
            DateRangeType::Last30Days => "LAST_30_DAYS",
            DateRangeType::ThisMonth => "THIS_MONTH",
            DateRangeType::LastMonth => "LAST_MONTH",
        }
    }
}

impl std::str::FromStr for DateRangeType {
    type Err = AdrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "CUSTOM_DATE" => Ok(DateRangeType::CustomDate),
            "TODAY" => Ok(DateRangeType::Today),
            "YESTERDAY" => Ok(DateRangeType::Yesterday),
            "LAST_7_DAYS" => Ok(DateRangeType::Last7Days),
            "LAST_14_DAYS" => Ok(DateRangeType::Last14Days),
            "LAST_30_DAYS" => Ok(DateRangeType::Last30Days),
            "THIS_MONTH" => Ok(DateRangeType::ThisMonth),
            "LAST_MONTH" => Ok(DateRangeType::LastMonth),
            _ => Err(AdrepError::Parse(format!("invalid date range type: {s}"))),
        }
    }
}

impl std::fmt::Display for DateRangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A report date window: a named relative range, or a custom range with
/// explicit inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub range_type: DateRangeType,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Custom window with explicit bounds
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            range_type: DateRangeType::CustomDate,
            start: Some(start),
            end: Some(end),
        }
    }

    /// Named relative window, no explicit bounds
    pub fn relative(range_type: DateRangeType) -> Self {
        Self {
            range_type,
            start: None,
            end: None,
        }
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        match self.range_type {
            DateRangeType::CustomDate => {
                let (start, end) = match (self.start, self.end) {
                    (Some(s), Some(e)) => (s, e),
                    _ => {
                        return Err(AdrepError::Config(
                            "custom date range requires start and end".to_string(),
                        ))
                    },
                };
                if start > end {
                    return Err(AdrepError::Config(format!(
                        "date range start {start} is after end {end}"
                    )));
                }
                Ok(())
            },
            _ => {
                if self.start.is_some() || self.end.is_some() {
                    return Err(AdrepError::Config(format!(
                        "relative range {} does not take explicit bounds",
                        self.range_type
                    )));
                }
                Ok(())
            },
        }
    }

    /// Start bound in wire form, empty when unset
    pub fn start_str(&self) -> String {
        self.start
            .map(|d| d.format(DATE_WIRE_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// End bound in wire form, empty when unset
    pub fn end_str(&self) -> String {
        self.end
            .map(|d| d.format(DATE_WIRE_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// Start bound in wire form, `None` when unset
    pub fn start_str_opt(&self) -> Option<String> {
        self.start.map(|d| d.format(DATE_WIRE_FORMAT).to_string())
    }

    /// End bound in wire form, `None` when unset
    pub fn end_str_opt(&self) -> Option<String> {
        self.end.map(|d| d.format(DATE_WIRE_FORMAT).to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_wire_format() {
        let range = DateRange::custom(date(2026, 1, 5), date(2026, 2, 1));
        assert_eq!(range.start_str(), "20260105");
        assert_eq!(range.end_str(), "20260201");
    }

    #[test]
    fn test_relative_range_has_no_bounds() {
        let range = DateRange::relative(DateRangeType::Last30Days);
        assert_eq!(range.start_str(), "");
        assert_eq!(range.end_str(), "");
        assert!(range.validate().is_ok());
    }

    #[test]
    fn test_custom_range_validation() {
        assert!(DateRange::custom(date(2026, 1, 1), date(2026, 1, 31)).validate().is_ok());
        assert!(DateRange::custom(date(2026, 2, 1), date(2026, 1, 1)).validate().is_err());

        let missing = DateRange {
            range_type: DateRangeType::CustomDate,
            start: None,
            end: None,
        };
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_range_type_round_trip() {
        for s in ["CUSTOM_DATE", "YESTERDAY", "LAST_30_DAYS", "THIS_MONTH"] {
            let parsed: DateRangeType = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert!("NEXT_YEAR".parse::<DateRangeType>().is_err());
    }
}
