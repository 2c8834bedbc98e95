//! omrsheet CLI - Command-line interface library
//!
//! This library provides the batch pipeline and commands behind the
//! `omrsheet` binary:
//! - Generate: roster workbook to a zip of per-worksheet PDFs
//! - Inspect: show resolved columns and tracks per worksheet
//! - Placeholders: write stand-in images for missing templates
//!
//! # Library Usage
//!
//! ```ignore
//! use omrsheet_cli::{run_batch, BatchContext, Settings};
//! use omrsheet_data::ExcelSource;
//!
//! let settings = Settings::default();
//! let context = BatchContext::load(&settings, "static".as_ref())?;
//! let mut source = ExcelSource::open("roster.xlsx")?;
//! let output = run_batch(&mut source, &context)?;
//! std::fs::write(&settings.output.archive_name, output.archive)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Generate sheets using templates from ./static
//! omrsheet generate roster.xlsx --assets static --output sheets.zip
//!
//! # Check column detection before generating
//! omrsheet inspect roster.xlsx --format json
//! ```

pub mod app;
pub mod archive;
pub mod batch;
pub mod config;

// Re-export main entry point and types
pub use app::{generate_command, inspect_command, placeholders_command};
pub use app::{run_cli, OutputFormat};
pub use archive::{EntryName, OutputArchive};
pub use batch::{
    inspect_workbook, run_batch, BatchContext, BatchError, BatchOutput, BatchReport, PageReport,
    SheetReport, SheetSummary,
};
pub use config::{load_settings, Settings};
