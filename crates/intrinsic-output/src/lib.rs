#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/intrinsic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod table;

pub use export::{
    DETAIL_HEADER, DetailRow, ExportError, ExportFormat, Exporter, FAILURE_HEADER, FailureRow,
    LONG_HEADER, LongRow, WIDE_HEADER, WideRow,
};
pub use table::{DETAILS_FILE, FAILURES_FILE, LONG_FILE, ResultTable, WIDE_FILE};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
