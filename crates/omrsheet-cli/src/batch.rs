//! Batch orchestration
//!
//! Turns a roster workbook into an archive of sheet PDFs: each worksheet is
//! read, its columns resolved once, every row normalized and drawn on its
//! track's template, and the worksheet's pages written as one document.

use std::path::Path;

use omrsheet_core::diagnostics::codes;
use omrsheet_core::{
    safe_filename, ColumnMap, Diagnostic, Diagnostics, Field, Severity, StudentRecord, Track,
};
use omrsheet_data::{DataError, RosterSource};
use omrsheet_pdf::{render_sheet, ComposedPage, FontSet, PdfError, SheetComposer, TemplateSet};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::archive::OutputArchive;
use crate::config::Settings;

/// Errors that stop a batch run
#[derive(Debug, Error)]
pub enum BatchError {
    /// Neither template could be loaded
    #[error("Both OMR template images failed to load")]
    NoTemplates,

    /// The workbook itself could not be opened
    #[error(transparent)]
    Data(#[from] DataError),

    /// A configured font file could not be read
    #[error("Font loading failed: {0}")]
    Fonts(#[source] PdfError),

    /// A worksheet's pages could not be rendered
    #[error("Failed to render sheet '{sheet}': {source}")]
    Render {
        sheet: String,
        #[source]
        source: PdfError,
    },

    /// Error writing the output archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BatchError {
    /// The run-level diagnostic for errors that have a stable code
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        match self {
            BatchError::NoTemplates => Some(
                Diagnostic::error(
                    "Cannot proceed: both OMR template images failed to load. \
                     Fix the files in the assets directory and retry.",
                )
                .with_code(codes::NO_TEMPLATES),
            ),
            _ => None,
        }
    }
}

/// Immutable startup state shared by every run
pub struct BatchContext {
    templates: TemplateSet,
    fonts: FontSet,
    font_family: Vec<String>,
    extension: String,
}

impl BatchContext {
    /// Build a context from already-loaded parts
    pub fn new(templates: TemplateSet, fonts: FontSet, settings: &Settings) -> Self {
        Self {
            templates,
            fonts,
            font_family: settings.render.font_family.clone(),
            extension: settings.output.extension.clone(),
        }
    }

    /// Load templates and fonts named by the settings
    pub fn load(settings: &Settings, assets_dir: &Path) -> Result<Self, BatchError> {
        let assets = &settings.assets;
        let templates = TemplateSet::load(
            &assets.resolve(assets_dir, &assets.child_template),
            &assets.resolve(assets_dir, &assets.master_template),
        );

        let font_paths: Vec<_> = settings
            .render
            .fonts
            .iter()
            .map(|path| assets.resolve(assets_dir, path))
            .collect();
        let fonts = FontSet::load(&font_paths).map_err(BatchError::Fonts)?;

        Ok(Self::new(templates, fonts, settings))
    }

    /// The loaded templates
    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }
}

/// Outcome for one worksheet written to the archive
#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    /// Worksheet name
    pub sheet: String,
    /// Archive entry name
    pub entry: String,
    /// Pages in order
    pub pages: Vec<PageReport>,
}

/// One generated page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub roll_no: String,
    pub track: Track,
}

impl From<ComposedPage> for PageReport {
    fn from(page: ComposedPage) -> Self {
        Self {
            roll_no: page.roll_no,
            track: page.track,
        }
    }
}

/// Summary of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub sheets: Vec<SheetReport>,
    pub diagnostics: Diagnostics,
}

impl BatchReport {
    /// Total pages across all sheets
    pub fn page_count(&self) -> usize {
        self.sheets.iter().map(|s| s.pages.len()).sum()
    }

    fn note(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Info => info!("{}", diagnostic.message),
            Severity::Warning => warn!("{}", diagnostic.message),
            Severity::Error => error!("{}", diagnostic.message),
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Archive bytes plus the run report
#[derive(Debug)]
pub struct BatchOutput {
    pub archive: Vec<u8>,
    pub report: BatchReport,
}

/// Generate the sheet archive for every worksheet in a source
pub fn run_batch<S: RosterSource>(
    source: &mut S,
    context: &BatchContext,
) -> Result<BatchOutput, BatchError> {
    if context.templates.is_empty() {
        let failure = BatchError::NoTemplates;
        if let Some(diagnostic) = failure.diagnostic() {
            error!("{}", diagnostic.message);
        }
        return Err(failure);
    }

    let mut report = BatchReport::default();
    let mut archive = OutputArchive::new();

    for sheet_name in source.sheet_names() {
        let table = match source.read_sheet(&sheet_name) {
            Ok(table) => table,
            Err(e) => {
                report.note(
                    Diagnostic::warning(format!(
                        "Could not read sheet '{}': {}. Skipping sheet.",
                        sheet_name, e
                    ))
                    .with_code(codes::UNREADABLE_SHEET)
                    .with_sheet(&sheet_name),
                );
                continue;
            }
        };

        let columns = ColumnMap::resolve(&table.headers);
        let missing = columns.missing();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|f| f.key()).collect();
            report.note(
                Diagnostic::info(format!(
                    "Missing columns in sheet '{}': {}. Fields will be blank.",
                    sheet_name,
                    names.join(", ")
                ))
                .with_code(codes::UNRESOLVED_COLUMNS)
                .with_sheet(&sheet_name),
            );
        }

        let mut composer = SheetComposer::new(&context.font_family);
        for row in &table.rows {
            let record = StudentRecord::from_row(&columns, &row.cells);
            match context.templates.get(record.track) {
                Some(template) => composer.add_page(&record, template),
                None => report.note(
                    Diagnostic::warning(format!(
                        "Skipping row for Roll No. {}: {} template failed to load.",
                        record.roll_no, record.track
                    ))
                    .with_code(codes::MISSING_TEMPLATE)
                    .with_sheet(&sheet_name)
                    .with_row(row.number),
                ),
            }
        }

        // Typst always emits a page, so an empty sheet would be a blank document
        if composer.page_count() == 0 {
            report.note(
                Diagnostic::warning(format!(
                    "Sheet '{}' has no printable rows. No document written.",
                    sheet_name
                ))
                .with_code(codes::EMPTY_SHEET)
                .with_sheet(&sheet_name),
            );
            continue;
        }

        let (composed, pdf) =
            render_sheet(composer, &context.fonts).map_err(|source| BatchError::Render {
                sheet: sheet_name.clone(),
                source,
            })?;

        let entry = archive.reserve_name(&safe_filename(&sheet_name), &context.extension);
        if entry.renamed {
            report.note(
                Diagnostic::warning(format!(
                    "Sheet '{}' saved as '{}' to avoid overwriting an earlier sheet.",
                    sheet_name, entry.name
                ))
                .with_code(codes::NAME_COLLISION)
                .with_sheet(&sheet_name),
            );
        }
        archive.add(&entry.name, &pdf)?;
        debug!(sheet = %sheet_name, entry = %entry.name, pages = composed.pages.len(), "Sheet written");

        report.sheets.push(SheetReport {
            sheet: sheet_name,
            entry: entry.name,
            pages: composed.pages.into_iter().map(PageReport::from).collect(),
        });
    }

    info!(
        sheets = report.sheets.len(),
        pages = report.page_count(),
        "Batch complete"
    );

    Ok(BatchOutput {
        archive: archive.finish()?,
        report,
    })
}

/// Column and track summary for one worksheet, without rendering
#[derive(Debug, Clone, Serialize)]
pub struct SheetSummary {
    pub sheet: String,
    /// Canonical field to header, `None` when unresolved
    pub columns: Vec<(Field, Option<String>)>,
    pub rows: usize,
    pub child_rows: usize,
    pub master_rows: usize,
    /// Read error, when the sheet could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summarize how each worksheet would be processed
pub fn inspect_workbook<S: RosterSource>(source: &mut S) -> Vec<SheetSummary> {
    let mut summaries = Vec::new();

    for sheet_name in source.sheet_names() {
        let table = match source.read_sheet(&sheet_name) {
            Ok(table) => table,
            Err(e) => {
                summaries.push(SheetSummary {
                    sheet: sheet_name,
                    columns: Vec::new(),
                    rows: 0,
                    child_rows: 0,
                    master_rows: 0,
                    error: Some(e.to_string()),
                });
                continue;
            }
        };

        let columns = ColumnMap::resolve(&table.headers);
        let child_rows = table
            .rows
            .iter()
            .filter(|row| StudentRecord::from_row(&columns, &row.cells).track == Track::Child)
            .count();

        summaries.push(SheetSummary {
            sheet: sheet_name,
            columns: Field::ALL
                .into_iter()
                .map(|field| (field, columns.get(field).map(|c| c.header.clone())))
                .collect(),
            rows: table.len(),
            child_rows,
            master_rows: table.len() - child_rows,
            error: None,
        });
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use omrsheet_core::CellValue;
    use omrsheet_data::SheetTable;
    use omrsheet_pdf::TemplateImage;

    /// In-memory source; a `None` table reads as an unreadable sheet
    struct FakeSource {
        sheets: Vec<(String, Option<SheetTable>)>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self { sheets: Vec::new() }
        }

        fn sheet(mut self, name: &str, rows: Vec<Vec<CellValue>>) -> Self {
            self.sheets
                .push((name.to_string(), Some(SheetTable::from_rows(name, rows))));
            self
        }

        fn broken(mut self, name: &str) -> Self {
            self.sheets.push((name.to_string(), None));
            self
        }
    }

    impl RosterSource for FakeSource {
        fn sheet_names(&self) -> Vec<String> {
            self.sheets.iter().map(|(name, _)| name.clone()).collect()
        }

        fn read_sheet(&mut self, sheet: &str) -> omrsheet_data::Result<SheetTable> {
            match self.sheets.iter().find(|(name, _)| name == sheet) {
                Some((_, Some(table))) => Ok(table.clone()),
                _ => Err(DataError::SheetUnreadable {
                    sheet: sheet.to_string(),
                    reason: "corrupt".to_string(),
                }),
            }
        }
    }

    fn text(s: &str) -> CellValue {
        CellValue::from(s)
    }

    fn context(templates: TemplateSet) -> BatchContext {
        BatchContext::new(templates, FontSet::default(), &Settings::default())
    }

    fn placeholders() -> TemplateSet {
        TemplateSet::from_images(Track::ALL.map(TemplateImage::placeholder))
    }

    #[test]
    fn test_no_templates_aborts() {
        let mut source = FakeSource::new().sheet("A", vec![vec![text("Name")]]);
        let result = run_batch(&mut source, &context(TemplateSet::default()));
        assert!(matches!(result, Err(BatchError::NoTemplates)));
    }

    #[test]
    fn test_no_templates_diagnostic() {
        let diagnostic = BatchError::NoTemplates.diagnostic().unwrap();
        assert!(diagnostic.is_error());
        assert_eq!(diagnostic.code.as_deref(), Some(codes::NO_TEMPLATES));

        let archive_error = BatchError::Io(std::io::Error::other("disk full"));
        assert!(archive_error.diagnostic().is_none());
    }

    #[test]
    fn test_sheet_without_pages_not_written() {
        let templates = TemplateSet::from_images([TemplateImage::placeholder(Track::Master)]);
        let mut source = FakeSource::new()
            .sheet("Header Only", vec![vec![text("Name"), text("Class")]])
            .sheet(
                "All Child",
                vec![vec![text("Name"), text("Class")], vec![text("Asha"), text("2")]],
            )
            .sheet("Seniors", vec![vec![text("Name")], vec![text("Ravi")]]);

        let output = run_batch(&mut source, &context(templates)).unwrap();
        let entries: Vec<_> = output.report.sheets.iter().map(|s| s.entry.as_str()).collect();
        assert_eq!(entries, ["Seniors.pdf"]);

        let empty: Vec<_> = output
            .report
            .diagnostics
            .with_code(codes::EMPTY_SHEET)
            .filter_map(|d| d.sheet.as_deref())
            .collect();
        assert_eq!(empty, ["Header Only", "All Child"]);
    }

    #[test]
    fn test_missing_track_skips_rows() {
        let templates = TemplateSet::from_images([TemplateImage::placeholder(Track::Master)]);
        let mut source = FakeSource::new().sheet(
            "Mixed",
            vec![
                vec![text("Class"), text("Roll No")],
                vec![text("1"), text("1")],
                vec![text("7"), text("2")],
            ],
        );

        let output = run_batch(&mut source, &context(templates)).unwrap();
        let report = output.report;

        assert_eq!(report.sheets.len(), 1);
        assert_eq!(
            report.sheets[0].pages,
            vec![PageReport {
                roll_no: "002".to_string(),
                track: Track::Master
            }]
        );

        let skipped: Vec<_> = report.diagnostics.with_code(codes::MISSING_TEMPLATE).collect();
        assert_eq!(skipped.len(), 1);
        // Header is worksheet row 1
        assert_eq!(skipped[0].row, Some(2));
    }

    #[test]
    fn test_unresolved_columns_noted_once_per_sheet() {
        let mut source = FakeSource::new().sheet(
            "Roster",
            vec![
                vec![text("Name")],
                vec![text("A")],
                vec![text("B")],
                vec![text("C")],
            ],
        );

        let output = run_batch(&mut source, &context(placeholders())).unwrap();
        let notes: Vec<_> = output
            .report
            .diagnostics
            .with_code(codes::UNRESOLVED_COLUMNS)
            .collect();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.contains("school_name, class, division, roll_no"));
        assert_eq!(output.report.page_count(), 3);
    }

    #[test]
    fn test_duplicate_sanitized_names_renamed() {
        let rows = || vec![vec![text("Name")], vec![text("A")]];
        let mut source = FakeSource::new()
            .sheet("Class 1", rows())
            .sheet("Class:1", rows())
            .sheet("Class_1", rows());

        let output = run_batch(&mut source, &context(placeholders())).unwrap();
        let entries: Vec<_> = output.report.sheets.iter().map(|s| s.entry.as_str()).collect();
        // "Class 1" and "Class:1" both sanitize to "Class_1"
        assert_eq!(entries, ["Class_1.pdf", "Class_1_2.pdf", "Class_1_3.pdf"]);
        assert_eq!(
            output.report.diagnostics.with_code(codes::NAME_COLLISION).count(),
            2
        );
    }

    #[test]
    fn test_inspect_workbook() {
        let mut source = FakeSource::new()
            .sheet(
                "Primary",
                vec![
                    vec![text("Grade"), text("Student Name")],
                    vec![text("II"), text("Asha")],
                    vec![text("v"), text("Ravi")],
                    vec![text("?"), text("Mina")],
                ],
            )
            .broken("Broken");

        let summaries = inspect_workbook(&mut source);
        assert_eq!(summaries.len(), 2);

        let primary = &summaries[0];
        assert_eq!(primary.rows, 3);
        assert_eq!(primary.child_rows, 1);
        assert_eq!(primary.master_rows, 2);
        assert!(primary
            .columns
            .contains(&(Field::Class, Some("Grade".to_string()))));
        assert!(primary.columns.contains(&(Field::RollNo, None)));

        assert!(summaries[1].error.is_some());
    }
}
