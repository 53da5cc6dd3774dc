//! Streaming row parser
//!
//! Captures the header row once, resolves each header cell against the
//! record schema, then decodes data rows lazily. The stream is single pass;
//! consuming a record advances the underlying reader and there is no seek
//! back. Rows are decoded one at a time, so memory stays bounded no matter
//! how large the payload is.

use std::io::Read;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use csv::{ReaderBuilder, StringRecord};

use adrep_common::error::{AdrepError, Result};
use adrep_common::money::parse_micros_cell;

use crate::records::ReportRecord;
use crate::schema::{FieldBinding, FieldSetter};

/// First cell of the trailing summary row appended by the report service
const SUMMARY_ROW_MARKER: &str = "Total";

/// Cell content the report service emits for absent values
const ABSENT_CELL_MARKER: &str = "--";

pub struct RowStream<R: ReportRecord, D: Read> {
    reader: csv::Reader<D>,
    slots: Vec<Option<&'static FieldBinding<R>>>,
    header_len: usize,
    row: u64,
}

impl<R: ReportRecord, D: Read> RowStream<R, D> {
    /// Consume the header row and build the column-index to binding table.
    /// Header cells with no mapping are retained as ignored positions, so
    /// unknown columns added by the service pass through harmlessly.
    pub fn open(source: D) -> Result<Self> {
        let schema = R::schema()?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(source);

        let mut header = StringRecord::new();
        let got = reader.read_record(&mut header).map_err(stream_error)?;
        if !got {
            return Err(AdrepError::Parse(
                "report payload has no header row".to_string(),
            ));
        }

        let slots: Vec<Option<&'static FieldBinding<R>>> = header
            .iter()
            .map(|cell| schema.binding(cell.trim()))
            .collect();

        Ok(Self {
            reader,
            slots,
            header_len: header.len(),
            row: 0,
        })
    }

    /// Decode the next data row, or `None` at end of stream.
    ///
    /// A malformed row surfaces as an error on this call without poisoning
    /// the stream; the caller decides whether to continue or abort.
    pub fn next_record(&mut self) -> Result<Option<R>> {
        let mut raw = StringRecord::new();
        loop {
            if !self.reader.read_record(&mut raw).map_err(stream_error)? {
                return Ok(None);
            }
            self.row += 1;
            if raw.get(0) == Some(SUMMARY_ROW_MARKER) {
                continue;
            }
            break;
        }

        if raw.len() != self.header_len {
            return Err(AdrepError::RowFormat {
                row: self.row,
                detail: format!(
                    "expected {} cells to match the header, found {}",
                    self.header_len,
                    raw.len()
                ),
            });
        }

        let mut record = R::default();
        for (idx, slot) in self.slots.iter().enumerate() {
            if let Some(binding) = slot {
                if let Some(cell) = raw.get(idx) {
                    self.apply(binding, &mut record, cell)?;
                }
            }
        }
        Ok(Some(record))
    }

    /// Data rows consumed so far, summary rows included
    pub fn rows_read(&self) -> u64 {
        self.row
    }

    fn apply(&self, binding: &FieldBinding<R>, record: &mut R, cell: &str) -> Result<()> {
        let cell = cell.trim();
        if cell.is_empty() || cell == ABSENT_CELL_MARKER {
            return Ok(());
        }
        match binding.setter {
            FieldSetter::Text(set) => set(record, cell.to_string()),
            FieldSetter::Integer(set) => {
                // Counts may arrive with thousands separators.
                let value = cell
                    .replace(',', "")
                    .parse::<i64>()
                    .map_err(|_| self.cell_error(binding, cell))?;
                set(record, value);
            },
            FieldSetter::Decimal(set) => {
                let trimmed = cell.trim_end_matches('%').trim_end();
                let value = BigDecimal::from_str(trimmed)
                    .map_err(|_| self.cell_error(binding, cell))?;
                set(record, value);
            },
            FieldSetter::Money(set) => {
                let value =
                    parse_micros_cell(cell).map_err(|_| self.cell_error(binding, cell))?;
                set(record, value);
            },
        }
        Ok(())
    }

    fn cell_error(&self, binding: &FieldBinding<R>, cell: &str) -> AdrepError {
        AdrepError::RowFormat {
            row: self.row,
            detail: format!("column {:?} has unparseable cell {cell:?}", binding.column),
        }
    }
}

fn stream_error(err: csv::Error) -> AdrepError {
    AdrepError::Parse(format!("report stream error: {err}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::records::{AccountPerformance, CampaignPerformance};
    use bigdecimal::BigDecimal;
    use std::io::Cursor;
    use std::str::FromStr as _;

    fn stream<R: ReportRecord>(csv: &str) -> RowStream<R, Cursor<Vec<u8>>> {
        RowStream::open(Cursor::new(csv.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn test_maps_and_coerces_cells() {
        let mut rows = stream::<CampaignPerformance>(
            "Campaign ID,Campaign,Impressions,Cost\n42,Brand terms,100,2000000\n",
        );
        let record = rows.next_record().unwrap().unwrap();
        assert_eq!(record.campaign_id, Some(42));
        assert_eq!(record.campaign_name.as_deref(), Some("Brand terms"));
        assert_eq!(record.common.impressions, Some(100));
        assert_eq!(record.common.cost, Some(BigDecimal::from_str("2.00").unwrap()));
        assert!(rows.next_record().unwrap().is_none());
    }

    #[test]
    fn test_monetary_cell_rescaled_to_scale_two() {
        let mut rows = stream::<AccountPerformance>("Cost\n1500000\n");
        let record = rows.next_record().unwrap().unwrap();
        assert_eq!(record.common.cost, Some(BigDecimal::from_str("1.50").unwrap()));
    }

    #[test]
    fn test_unmapped_header_cells_are_ignored() {
        let mut rows = stream::<AccountPerformance>(
            "Impressions,Some future column,Clicks\n10,whatever,3\n",
        );
        let record = rows.next_record().unwrap().unwrap();
        assert_eq!(record.common.impressions, Some(10));
        assert_eq!(record.common.clicks, Some(3));
    }

    #[test]
    fn test_cell_count_mismatch_is_row_level() {
        let mut rows = stream::<AccountPerformance>(
            "Impressions,Clicks\n10,2\n7\n30,4\n",
        );
        assert!(rows.next_record().unwrap().is_some());

        let err = rows.next_record().unwrap_err();
        assert!(err.is_row_format(), "unexpected error: {err}");

        // The stream is not poisoned; the next row still parses.
        let after = rows.next_record().unwrap().unwrap();
        assert_eq!(after.common.impressions, Some(30));
    }

    #[test]
    fn test_unparseable_numeric_cell_is_row_level() {
        let mut rows = stream::<AccountPerformance>("Impressions\nnot-a-number\n");
        let err = rows.next_record().unwrap_err();
        assert!(err.is_row_format());
    }

    #[test]
    fn test_summary_row_is_skipped() {
        let mut rows = stream::<AccountPerformance>(
            "Impressions,Clicks\n10,2\nTotal,12\n",
        );
        assert!(rows.next_record().unwrap().is_some());
        assert!(rows.next_record().unwrap().is_none());
    }

    #[test]
    fn test_absent_cells_leave_fields_unset() {
        let mut rows = stream::<AccountPerformance>("Impressions,CTR\n--, --\n");
        let record = rows.next_record().unwrap().unwrap();
        assert_eq!(record.common.impressions, None);
        assert_eq!(record.common.ctr, None);
    }

    #[test]
    fn test_percent_and_separator_cleanup() {
        let mut rows = stream::<AccountPerformance>("Impressions,CTR\n\"1,234\",0.85%\n");
        let record = rows.next_record().unwrap().unwrap();
        assert_eq!(record.common.impressions, Some(1234));
        assert_eq!(record.common.ctr, Some(BigDecimal::from_str("0.85").unwrap()));
    }

    #[test]
    fn test_empty_payload_is_an_error() {
        let result = RowStream::<AccountPerformance, _>::open(Cursor::new(Vec::new()));
        assert!(result.is_err());
    }

    #[test]
    fn test_large_stream_decodes_row_by_row() {
        let mut csv = String::from("Impressions,Clicks\n");
        for i in 0..10_000 {
            csv.push_str(&format!("{i},{}\n", i % 7));
        }
        let mut rows = stream::<AccountPerformance>(&csv);
        let mut count = 0u64;
        while let Some(record) = rows.next_record().unwrap() {
            assert!(record.common.impressions.is_some());
            count += 1;
        }
        assert_eq!(count, 10_000);
    }
}
