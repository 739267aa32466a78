//! Output formatting module
//!
//! Provides various output formats for batch results.

mod formatter;

pub use formatter::{
    write_report_to_file, OutputFormat, PlainFormatter, ReportFormatter, ResultFormatter,
};
