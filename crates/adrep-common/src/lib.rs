//! AdRep Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types and utilities for the AdRep workspace.
//!
//! # Overview
//!
//! This crate provides common functionality used across all AdRep workspace
//! members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Logging**: Tracing subscriber setup with console/file output
//! - **Money**: Fixed-point micro-amount conversion to decimals
//! - **Dates**: Report date ranges and wire formatting
//! - **Record Ids**: Deterministic record identifiers for idempotent writes

pub mod dates;
pub mod error;
pub mod logging;
pub mod money;
pub mod record_id;

// Re-export commonly used types
pub use error::{AdrepError, Result};
