//! Account performance records
//!
//! Every mapped column comes from the shared base level; the account name,
//! currency, and metric columns already live on [`ReportCommon`].

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use adrep_common::error::Result;

use crate::schema::{cached_schema, RecordSchema};

use super::{common_bindings, segment_key, ReportCommon, ReportRecord, ReportRow, ReportType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountPerformance {
    #[serde(flatten)]
    pub common: ReportCommon,
}

impl ReportRecord for AccountPerformance {
    const REPORT_TYPE: ReportType = ReportType::AccountPerformance;

    fn schema() -> Result<&'static RecordSchema<Self>> {
        static SCHEMA: OnceLock<RecordSchema<AccountPerformance>> = OnceLock::new();
        cached_schema(&SCHEMA, || {
            RecordSchema::build(Self::REPORT_TYPE, vec![common_bindings::<Self>()])
        })
    }

    fn common(&self) -> &ReportCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut ReportCommon {
        &mut self.common
    }

    // No entity id of its own; the account id is task context.
    fn natural_key(&self) -> Vec<String> {
        segment_key(&self.common)
    }

    fn into_row(self) -> ReportRow {
        ReportRow::Account(self)
    }
}
