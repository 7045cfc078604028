//! listas_pdf - Merge spreadsheet inventory lists into one sorted PDF
//!
//! This crate reads a batch of inventory spreadsheets (XLSX, XLS, XLSB, ODS),
//! validates that each one carries the required columns, normalizes and sorts
//! the rows, and renders one table per file into a single paginated PDF.
//! Files that fail are reported individually and never abort the batch.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use listas_pdf::{FileInput, ListProcessorBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let processor = ListProcessorBuilder::new().build()?;
//!
//!     let files = vec![FileInput::new("centro.xlsx"), FileInput::new("norte.xlsx")];
//!     let result = processor.process(&files)?;
//!
//!     for failure in &result.failures {
//!         eprintln!("{}: {}", failure.file_name, failure.message);
//!     }
//!     if let Some(document) = result.document {
//!         std::fs::write(&document.file_name, &document.bytes)?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! For uploaded buffers, use `MemoryFile`:
//!
//! ```rust,no_run
//! use listas_pdf::{ListProcessorBuilder, MemoryFile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let processor = ListProcessorBuilder::new().build()?;
//! let upload: Vec<u8> = vec![]; // Your spreadsheet bytes
//! let result = processor.process(&[MemoryFile::new("subida.xlsx", upload)])?;
//! println!("{} ok, {} failed", result.success_count, result.failures.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use listas_pdf::{ListProcessorBuilder, PageSize};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let processor = ListProcessorBuilder::new()
//!     .with_output_name("Inventario.pdf")
//!     .with_page_size(PageSize::A4)
//!     .with_margin_mm(12.0)
//!     .with_compression(false)
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Accounts
//!
//! The `accounts` module provides a local-only user store (login, password
//! recovery, profile edits, admin user management) over a pluggable
//! key-value store.

pub mod accounts;
mod api;
mod builder;
pub mod collation;
mod error;
mod normalize;
mod output;
mod parser;
mod schema;
mod security;
mod sort;
mod source;
mod types;

// 公開API
pub use api::{FileFailure, ListDocument, PageSize, ProcessResult};
pub use builder::{ListProcessor, ListProcessorBuilder, DEFAULT_OUTPUT_NAME};
pub use error::ListError;
pub use normalize::{normalize_record, normalize_records};
pub use output::{
    Align, ColumnSpec, ColumnWidth, ListTable, PdfReport, PdfStyle, RenderedReport,
    ReportRenderer, LIST_COLUMNS,
};
pub use parser::{CalamineDecoder, WorkbookDecoder};
pub use schema::{
    missing_columns, validate, COLUMN_BARCODE, COLUMN_CLASSIFICATION, COLUMN_DESCRIPTION,
    COLUMN_PRICE, REQUIRED_COLUMNS,
};
pub use security::SecurityConfig;
pub use sort::{compare_rows, sort_rows};
pub use source::{FileInput, FileSource, MemoryFile};
pub use types::{CellValue, NormalizedRow, Record, Sheet};
