//! Monetary value conversion
//!
//! The reporting API encodes currency amounts as fixed-point integers in
//! micros (millionths of the account currency unit). Records store them as
//! decimals with two fractional digits.

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, RoundingMode};

use crate::error::{AdrepError, Result};

const MICROS_SCALE: i64 = 6;
const CURRENCY_SCALE: i64 = 2;

/// Convert a micro amount into a currency decimal (scale 2, half-up).
pub fn micros_to_decimal(micros: i64) -> BigDecimal {
    BigDecimal::new(BigInt::from(micros), MICROS_SCALE)
        .with_scale_round(CURRENCY_SCALE, RoundingMode::HalfUp)
}

/// Parse a raw report cell holding a micro amount into a currency decimal.
///
/// Cells arrive as plain decimal integers, e.g. `"1500000"` for 1.50.
pub fn parse_micros_cell(cell: &str) -> Result<BigDecimal> {
    let micros: i64 = cell
        .trim()
        .parse()
        .map_err(|_| AdrepError::Parse(format!("invalid micro amount: {cell:?}")))?;
    Ok(micros_to_decimal(micros))
}
