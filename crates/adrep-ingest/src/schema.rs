//! Column-to-field mapping tables
//!
//! Every record type declares explicit binding tables: one table per
//! composition level, most-derived first. A schema merges the levels into a
//! single column lookup, keeping the first occurrence when a column name
//! repeats across levels.

use std::collections::HashMap;
use std::sync::OnceLock;

use bigdecimal::BigDecimal;

use adrep_common::error::{AdrepError, Result};

use crate::records::ReportType;

/// How a raw cell is coerced before being stored on the record.
///
/// `Money` cells are fixed-point integer micros and are rescaled to a
/// scale-2 decimal by the parser.
#[derive(Debug)]
pub enum FieldSetter<R> {
    Text(fn(&mut R, String)),
    Integer(fn(&mut R, i64)),
    Decimal(fn(&mut R, BigDecimal)),
    Money(fn(&mut R, BigDecimal)),
}

impl<R> Clone for FieldSetter<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for FieldSetter<R> {}

/// One column binding: the header name as it appears in the data source,
/// the selectable field name used in report requests, and the typed setter.
#[derive(Clone, Copy, Debug)]
pub struct FieldBinding<R> {
    pub column: &'static str,
    pub field: &'static str,
    pub setter: FieldSetter<R>,
}

impl<R> FieldBinding<R> {
    pub fn is_monetary(&self) -> bool {
        matches!(self.setter, FieldSetter::Money(_))
    }
}

/// Merged, immutable mapping for one record type.
///
/// Built once per record type and shared read-only by every task that
/// parses that type.
#[derive(Debug)]
pub struct RecordSchema<R> {
    report_type: ReportType,
    bindings: Vec<FieldBinding<R>>,
    by_column: HashMap<&'static str, usize>,
}

impl<R> RecordSchema<R> {
    /// Merge binding tables, most-derived level first.
    ///
    /// A column already registered from an earlier level is not
    /// overwritten. Fails when the record type declares no bindings at all;
    /// an empty selection at request time is legal, an untagged record type
    /// is not.
    pub fn build(report_type: ReportType, levels: Vec<Vec<FieldBinding<R>>>) -> Result<Self> {
        if levels.iter().all(|level| level.is_empty()) {
            return Err(AdrepError::Schema(format!(
                "record type for {} declares no field bindings",
                report_type
            )));
        }

        let mut bindings: Vec<FieldBinding<R>> = Vec::new();
        let mut by_column: HashMap<&'static str, usize> = HashMap::new();

        for level in levels {
            for binding in level {
                if by_column.contains_key(binding.column) {
                    // First occurrence wins across levels.
                    continue;
                }
                by_column.insert(binding.column, bindings.len());
                bindings.push(binding);
            }
        }

        Ok(Self {
            report_type,
            bindings,
            by_column,
        })
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    /// Look up the binding for a header cell, if the column is mapped.
    pub fn binding(&self, column: &str) -> Option<&FieldBinding<R>> {
        self.by_column.get(column).map(|&idx| &self.bindings[idx])
    }

    /// Selectable field names in declaration order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.bindings.iter().map(|b| b.field).collect()
    }

    /// Whether the named field carries a micro-scaled monetary value.
    pub fn is_monetary(&self, field: &str) -> bool {
        self.bindings
            .iter()
            .any(|b| b.field == field && b.is_monetary())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Build-once cache for a record type's schema.
///
/// `OnceLock::get_or_try_init` is not stable, so a failed build is simply
/// rebuilt on the next call.
pub fn cached_schema<R>(
    cell: &'static OnceLock<RecordSchema<R>>,
    build: impl FnOnce() -> Result<RecordSchema<R>>,
) -> Result<&'static RecordSchema<R>> {
    if let Some(schema) = cell.get() {
        return Ok(schema);
    }
    let schema = build()?;
    Ok(cell.get_or_init(|| schema))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[derive(Default, Debug)]
    struct Sample {
        name: Option<String>,
        clicks: Option<i64>,
        cost: Option<BigDecimal>,
    }

    fn set_name(r: &mut Sample, v: String) {
        r.name = Some(v);
    }

    fn set_clicks(r: &mut Sample, v: i64) {
        r.clicks = Some(v);
    }

    fn set_cost(r: &mut Sample, v: BigDecimal) {
        r.cost = Some(v);
    }

    fn derived_level() -> Vec<FieldBinding<Sample>> {
        vec![FieldBinding {
            column: "Name",
            field: "DerivedName",
            setter: FieldSetter::Text(set_name),
        }]
    }

    fn base_level() -> Vec<FieldBinding<Sample>> {
        vec![
            FieldBinding {
                column: "Name",
                field: "BaseName",
                setter: FieldSetter::Text(set_name),
            },
            FieldBinding {
                column: "Clicks",
                field: "Clicks",
                setter: FieldSetter::Integer(set_clicks),
            },
            FieldBinding {
                column: "Cost",
                field: "Cost",
                setter: FieldSetter::Money(set_cost),
            },
        ]
    }

    #[test]
    fn test_merge_prefers_most_derived_on_collision() {
        let schema = RecordSchema::build(
            ReportType::CampaignPerformance,
            vec![derived_level(), base_level()],
        )
        .unwrap();

        // "Name" resolves to the derived binding, base "Name" is dropped,
        // everything else from the base level survives.
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.binding("Name").unwrap().field, "DerivedName");
        assert_eq!(schema.binding("Clicks").unwrap().field, "Clicks");
        assert_eq!(schema.fields(), vec!["DerivedName", "Clicks", "Cost"]);
    }

    #[test]
    fn test_monetary_set_built_in_same_pass() {
        let schema =
            RecordSchema::build(ReportType::CampaignPerformance, vec![base_level()]).unwrap();
        assert!(schema.is_monetary("Cost"));
        assert!(!schema.is_monetary("Clicks"));
        assert!(!schema.is_monetary("Missing"));
    }

    #[test]
    fn test_untagged_record_type_is_an_error() {
        let err = RecordSchema::<Sample>::build(
            ReportType::CampaignPerformance,
            vec![Vec::new(), Vec::new()],
        )
        .unwrap_err();
        assert!(matches!(err, AdrepError::Schema(_)));
    }

    #[test]
    fn test_unknown_column_is_unmapped() {
        let schema =
            RecordSchema::build(ReportType::CampaignPerformance, vec![base_level()]).unwrap();
        assert!(schema.binding("Unknown column").is_none());
    }
}
