//! omrsheet-pdf - OMR sheet rendering via Typst
//!
//! This crate draws one page per student on top of a scanned answer-sheet
//! template and serializes a worksheet's pages to a single PDF.
//!
//! # Architecture
//!
//! The rendering pipeline consists of two stages:
//!
//! 1. **Composer** - Lays out each student's page as Typst markup
//! 2. **Compiler** - Compiles the markup, with template images, to PDF bytes
//!
//! Template images are loaded once into a [`TemplateSet`] and shared by
//! every run.
//!
//! # Example
//!
//! ```ignore
//! use omrsheet_pdf::{SheetComposer, TemplateSet, FontSet, render_sheet};
//!
//! let templates = TemplateSet::load("child_omr.jpg".as_ref(), "master_omr.jpg".as_ref());
//! let mut composer = SheetComposer::new(&omrsheet_pdf::default_font_family());
//! composer.add_page(&record, templates.get(record.track).unwrap());
//! let (sheet, pdf_bytes) = render_sheet(composer, &FontSet::default())?;
//! assert_eq!(sheet.pages.len(), 1);
//! ```

mod assets;
mod compiler;
mod composer;
mod error;

pub use assets::{
    placeholder_path, placeholder_svg, write_placeholder, ImageFormat, TemplateImage,
    TemplateOrigin, TemplateSet,
};
pub use compiler::{Compiler, FontSet};
pub use composer::{
    default_font_family, ComposedPage, ComposedSheet, SheetComposer, BUNDLED_FONT_FAMILY,
    PAGE_HEIGHT, PAGE_WIDTH,
};
pub use error::{PdfError, Result};

/// Finish a composer and compile its pages to PDF bytes
pub fn render_sheet(composer: SheetComposer, fonts: &FontSet) -> Result<(ComposedSheet, Vec<u8>)> {
    let sheet = composer.finish();
    let pdf = Compiler::compile_sheet(&sheet, fonts)?;
    Ok((sheet, pdf))
}
