//! AdRep CLI Library
//!
//! Command-line interface for the report ingestion pipeline:
//!
//! - **Ingestion runs**: download, parse and persist reports (`adrep run`)
//! - **Schema inspection**: list selectable fields per report type
//!   (`adrep fields`)

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod commands;
pub mod jsonl_sink;

pub use jsonl_sink::JsonLinesSink;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// AdRep - Advertising Report Ingestion
#[derive(Parser, Debug)]
#[command(name = "adrep")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an ingestion pass over a set of accounts
    Run {
        /// Comma-separated account ids; dashed display form accepted
        #[arg(long)]
        accounts: String,

        /// Comma-separated report type names (defaults to all)
        #[arg(long)]
        reports: Option<String>,

        /// Named relative date range, e.g. LAST_30_DAYS
        #[arg(long, conflicts_with_all = ["start", "end"])]
        date_range: Option<String>,

        /// Custom range start (YYYY-MM-DD), requires --end
        #[arg(long, requires = "end")]
        start: Option<String>,

        /// Custom range end (YYYY-MM-DD), requires --start
        #[arg(long, requires = "start")]
        end: Option<String>,

        /// Destination file for ingested rows, one JSON object per line
        #[arg(long, short, default_value = "adrep-rows.jsonl")]
        output: PathBuf,

        /// Report download endpoint (overrides ADREP_ENDPOINT)
        #[arg(long)]
        endpoint: Option<String>,

        /// Path to a field inclusion file (REPORT_TYPE=Field1,Field2 lines)
        #[arg(long)]
        fields_file: Option<PathBuf>,
    },

    /// List report types and their selectable fields
    Fields {
        /// Restrict output to one report type
        #[arg(long)]
        report: Option<String>,
    },
}
