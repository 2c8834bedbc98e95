//! Sheet composer
//!
//! Builds the Typst markup for one worksheet: one page per student, each
//! drawn in a fixed order (template, bubbles, digit labels, info table).
//! Page geometry follows PDF conventions (points, origin bottom-left) and is
//! flipped to Typst's top-left origin here.

use omrsheet_core::{layout_roll, RollLayout, StudentRecord, Track, CM};

use crate::assets::TemplateImage;

/// A4 width in points
pub const PAGE_WIDTH: f64 = 21.0 * CM;
/// A4 height in points
pub const PAGE_HEIGHT: f64 = 29.7 * CM;

/// Info table width as a share of the page width
const TABLE_WIDTH_RATIO: f64 = 0.7;
/// Distance from the top of the page to the top of the info table
const TABLE_TOP: f64 = 4.5 * CM;
const TABLE_FONT_SIZE: f64 = 11.0;
const LABEL_FONT_SIZE: f64 = 14.0;
/// Width of the box a digit label is centred in
const LABEL_BOX_WIDTH: f64 = 40.0;

/// Family of the bundled bold sans face used when nothing else is configured
pub const BUNDLED_FONT_FAMILY: &str = "DejaVu Sans Mono";

/// Default font preference for sheet text
pub fn default_font_family() -> Vec<String> {
    vec![BUNDLED_FONT_FAMILY.to_string()]
}

/// A page that has been added to a sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPage {
    pub roll_no: String,
    pub track: Track,
}

/// A composed worksheet, ready for compilation
#[derive(Debug, Clone)]
pub struct ComposedSheet {
    /// Typst source
    pub markup: String,
    /// Images referenced by the markup, keyed by virtual path
    pub files: Vec<(String, Vec<u8>)>,
    /// Pages in order
    pub pages: Vec<ComposedPage>,
}

/// Accumulates student pages for one worksheet
#[derive(Debug)]
pub struct SheetComposer {
    markup: String,
    files: Vec<(String, Vec<u8>)>,
    pages: Vec<ComposedPage>,
}

impl SheetComposer {
    /// Start a new sheet document
    pub fn new(font_family: &[String]) -> Self {
        let mut markup = String::new();
        markup.push_str(&format!(
            "#set page(width: {}, height: {}, margin: 0pt)\n",
            pt(PAGE_WIDTH),
            pt(PAGE_HEIGHT)
        ));

        let fonts: Vec<String> = font_family.iter().map(|f| typst_string(f)).collect();
        markup.push_str(&format!(
            "#set text(font: ({},), weight: \"bold\", fill: black)\n",
            fonts.join(", ")
        ));

        Self {
            markup,
            files: Vec::new(),
            pages: Vec::new(),
        }
    }

    /// Draw one student's page on the given template
    pub fn add_page(&mut self, record: &StudentRecord, template: &TemplateImage) {
        let path = template.virtual_path();
        if !self.files.iter().any(|(p, _)| *p == path) {
            self.files.push((path.clone(), template.bytes().to_vec()));
        }

        if !self.pages.is_empty() {
            self.markup.push_str("#pagebreak()\n");
        }

        let layout = layout_roll(&record.roll_no, record.track.calibration());

        self.markup.push_str("#{\n");
        self.markup.push_str(&Self::background(&path));
        self.markup.push_str(&Self::bubbles(&layout));
        self.markup.push_str(&Self::labels(&layout));
        self.markup.push_str(&Self::info_table(record));
        self.markup.push_str("}\n");

        self.pages.push(ComposedPage {
            roll_no: record.roll_no.clone(),
            track: record.track,
        });
    }

    /// Number of pages added so far
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Close the document
    pub fn finish(self) -> ComposedSheet {
        ComposedSheet {
            markup: self.markup,
            files: self.files,
            pages: self.pages,
        }
    }

    /// Template stretched over the page, aspect ratio preserved and centred
    fn background(path: &str) -> String {
        format!(
            "  place(top + left, box(width: {}, height: {}, image({}, width: 100%, height: 100%, fit: \"contain\")))\n",
            pt(PAGE_WIDTH),
            pt(PAGE_HEIGHT),
            typst_string(path)
        )
    }

    fn bubbles(layout: &RollLayout) -> String {
        let mut output = String::new();
        for bubble in &layout.bubbles {
            let r = bubble.radius;
            output.push_str(&format!(
                "  place(top + left, dx: {}, dy: {}, circle(radius: {}, fill: black, stroke: none))\n",
                pt(bubble.center.x - r),
                pt(PAGE_HEIGHT - bubble.center.y - r),
                pt(r)
            ));
        }
        output
    }

    /// Digit labels, the text box collapsed onto its baseline
    fn labels(layout: &RollLayout) -> String {
        let mut output = String::new();
        for label in &layout.labels {
            output.push_str(&format!(
                "  place(top + left, dx: {}, dy: {}, box(width: {}, align(center, text(size: {}, top-edge: \"baseline\", bottom-edge: \"baseline\", {}))))\n",
                pt(label.anchor.x - LABEL_BOX_WIDTH / 2.0),
                pt(PAGE_HEIGHT - label.anchor.y),
                pt(LABEL_BOX_WIDTH),
                pt(LABEL_FONT_SIZE),
                typst_string(&label.glyph.to_string())
            ));
        }
        output
    }

    fn info_table(record: &StudentRecord) -> String {
        let rows = Self::info_rows(record);
        let cells: Vec<String> = rows.iter().map(|row| typst_string(row)).collect();
        let width = PAGE_WIDTH * TABLE_WIDTH_RATIO;

        format!(
            "  place(top + left, dx: {}, dy: {}, block(width: {}, stroke: 0.8pt, table(columns: ({},), stroke: 0.5pt, inset: (x: 10pt, y: 5pt), align: left + horizon, ..({},).map(c => text(size: {}, c)))))\n",
            pt((PAGE_WIDTH - width) / 2.0),
            pt(TABLE_TOP),
            pt(width),
            pt(width),
            cells.join(", "),
            pt(TABLE_FONT_SIZE)
        )
    }

    /// The four info rows; blank fields print as a single space
    pub fn info_rows(record: &StudentRecord) -> [String; 4] {
        [
            format!("Student Name: {}", or_space(&record.student_name)),
            format!("School: {}", or_space(&record.school_name)),
            format!(
                "Class: {}      Division: {}",
                or_space(&record.class_label),
                or_space(&record.division)
            ),
            "Question Paper Set: _____________".to_string(),
        ]
    }
}

fn or_space(value: &str) -> &str {
    if value.is_empty() {
        " "
    } else {
        value
    }
}

/// Format a length in points
fn pt(value: f64) -> String {
    format!("{}pt", value)
}

/// Quote a string as a Typst string literal
fn typst_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(roll_no: &str, track: Track) -> StudentRecord {
        StudentRecord {
            student_name: "Asha".to_string(),
            school_name: "Green Valley".to_string(),
            class_label: "II".to_string(),
            division: String::new(),
            roll_no: roll_no.to_string(),
            class_level: Some(2),
            track,
        }
    }

    #[test]
    fn test_page_size_is_a4() {
        assert!((PAGE_WIDTH - 595.2755905511812).abs() < 1e-9);
        assert!((PAGE_HEIGHT - 841.8897637795277).abs() < 1e-9);
    }

    #[test]
    fn test_single_page() {
        let template = TemplateImage::placeholder(Track::Child);
        let mut composer = SheetComposer::new(&default_font_family());
        composer.add_page(&record("005", Track::Child), &template);

        let sheet = composer.finish();
        assert_eq!(sheet.pages.len(), 1);
        assert_eq!(sheet.pages[0].roll_no, "005");
        assert_eq!(sheet.files.len(), 1);
        assert_eq!(sheet.files[0].0, "/templates/child.svg");
        assert!(!sheet.markup.contains("#pagebreak()"));
        assert_eq!(sheet.markup.matches("circle(").count(), 3);
        assert!(sheet.markup.contains("image(\"/templates/child.svg\""));
    }

    #[test]
    fn test_pages_break_between_students() {
        let template = TemplateImage::placeholder(Track::Master);
        let mut composer = SheetComposer::new(&default_font_family());
        for roll in ["001", "002", "003"] {
            composer.add_page(&record(roll, Track::Master), &template);
        }

        assert_eq!(composer.page_count(), 3);
        let sheet = composer.finish();
        assert_eq!(sheet.markup.matches("#pagebreak()").count(), 2);
        // Template embedded once
        assert_eq!(sheet.files.len(), 1);
    }

    #[test]
    fn test_draw_order() {
        let template = TemplateImage::placeholder(Track::Master);
        let mut composer = SheetComposer::new(&default_font_family());
        composer.add_page(&record("123", Track::Master), &template);
        let markup = composer.finish().markup;

        let image = markup.find("image(").unwrap();
        let bubble = markup.find("circle(").unwrap();
        let label = markup.find("top-edge").unwrap();
        let table = markup.find("table(").unwrap();
        assert!(image < bubble && bubble < label && label < table);
    }

    #[test]
    fn test_info_rows_blank_fields() {
        let mut rec = record("000", Track::Master);
        rec.student_name.clear();
        rec.class_label.clear();

        let rows = SheetComposer::info_rows(&rec);
        assert_eq!(rows[0], "Student Name:  ");
        assert_eq!(rows[1], "School: Green Valley");
        assert_eq!(rows[2], "Class:        Division:  ");
        assert_eq!(rows[3], "Question Paper Set: _____________");
    }

    #[test]
    fn test_non_digit_roll_skips_bubble() {
        let template = TemplateImage::placeholder(Track::Master);
        let mut composer = SheetComposer::new(&default_font_family());
        composer.add_page(&record("ab1", Track::Master), &template);
        let markup = composer.finish().markup;

        assert_eq!(markup.matches("circle(").count(), 1);
        assert_eq!(markup.matches("top-edge").count(), 3);
    }

    #[test]
    fn test_typst_string_escaping() {
        assert_eq!(typst_string("plain"), "\"plain\"");
        assert_eq!(typst_string("a\"b"), "\"a\\\"b\"");
        assert_eq!(typst_string("back\\slash"), "\"back\\\\slash\"");
        assert_eq!(typst_string("two\nlines"), "\"two\\nlines\"");
        // Markup characters are inert inside string literals
        assert_eq!(typst_string("#1 *bold*"), "\"#1 *bold*\"");
    }

    #[test]
    fn test_bubble_coordinates_flip_to_top_origin() {
        let layout = layout_roll("000", Track::Master.calibration());
        let markup = SheetComposer::bubbles(&layout);
        let bubble = layout.bubbles[0];
        let expected_dy = pt(PAGE_HEIGHT - bubble.center.y - bubble.radius);
        assert!(markup.contains(&format!("dy: {},", expected_dy)));
    }
}
