//! BIO-RED Test Utilities
//!
//! Builds genuine `.xlsx` containers in memory so loader and engine tests
//! exercise the same bytes a partner upload would carry.
//!
//! # Usage
//!
//! ```rust,ignore
//! use biored_test_utils::{fixtures, WorkbookBuilder};
//! use biored_schema::TemplateId;
//!
//! let id = TemplateId::FundingSources;
//! let mut rows = vec![fixtures::header_row(id)];
//! rows.extend((1..=5).map(|n| fixtures::valid_row(id, n)));
//! let bytes = WorkbookBuilder::new().sheet(id.schema().sheet_name, rows).build();
//! ```

pub mod fixtures;
pub mod workbook;

pub use workbook::{text_rows, zip_parts, Cell, WorkbookBuilder};
