//! Typst to PDF compiler
//!
//! Compiles composed sheets to PDF bytes using typst-as-lib.

use std::path::Path;

use tracing::{debug, warn};
use typst_as_lib::TypstEngine;

use crate::composer::ComposedSheet;
use crate::error::{PdfError, Result};

/// Font data handed to the Typst engine
///
/// Typst never looks up system fonts, so every set ends with the fonts
/// bundled by `typst-assets`, after any configured files.
#[derive(Debug, Clone)]
pub struct FontSet {
    fonts: Vec<Vec<u8>>,
    configured: usize,
}

impl Default for FontSet {
    fn default() -> Self {
        Self::bundled()
    }
}

impl FontSet {
    /// Only the bundled fonts
    pub fn bundled() -> Self {
        Self {
            fonts: typst_assets::fonts().map(<[u8]>::to_vec).collect(),
            configured: 0,
        }
    }

    /// Read font files from disk, ahead of the bundled fonts
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut fonts = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let bytes = std::fs::read(path).map_err(|e| {
                PdfError::Font(format!("Failed to read font {}: {}", path.display(), e))
            })?;
            debug!(font = %path.display(), "Loaded font");
            fonts.push(bytes);
        }

        let configured = fonts.len();
        fonts.extend(typst_assets::fonts().map(<[u8]>::to_vec));
        Ok(Self { fonts, configured })
    }

    /// Number of font files, bundled ones included
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// True when there are no fonts at all
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Number of font files read from disk
    pub fn configured(&self) -> usize {
        self.configured
    }
}

/// Compiler for converting composed sheets to PDF
pub struct Compiler;

impl Compiler {
    /// Compile raw Typst markup with no extra files
    pub fn compile(markup: &str, fonts: &FontSet) -> Result<Vec<u8>> {
        Self::compile_with_files(markup, &[], fonts)
    }

    /// Compile a composed sheet, embedding its template images
    pub fn compile_sheet(sheet: &ComposedSheet, fonts: &FontSet) -> Result<Vec<u8>> {
        Self::compile_with_files(&sheet.markup, &sheet.files, fonts)
    }

    /// Compile markup with images available at their virtual paths
    pub fn compile_with_files(
        markup: &str,
        files: &[(String, Vec<u8>)],
        fonts: &FontSet,
    ) -> Result<Vec<u8>> {
        let engine = TypstEngine::builder()
            .main_file(markup.to_string())
            .fonts(fonts.fonts.iter().map(Vec::as_slice))
            .with_static_file_resolver(
                files
                    .iter()
                    .map(|(path, bytes)| (path.as_str(), bytes.clone())),
            )
            .build();

        // compiled is Warned<Result<Document, Error>>
        let compiled = engine.compile();
        for warning in &compiled.warnings {
            warn!("Typst: {}", warning.message);
        }

        let document = compiled
            .output
            .map_err(|e| PdfError::Compilation(format!("{:?}", e)))?;

        let options = typst_pdf::PdfOptions::default();
        let pdf_bytes = typst_pdf::pdf(&document, &options)
            .map_err(|e| PdfError::Compilation(format!("PDF generation failed: {:?}", e)))?;

        Ok(pdf_bytes.into())
    }
}
