//! Template images
//!
//! The two background templates are loaded once at startup and shared
//! read-only by every run. A template file that is absent is replaced by a
//! labelled placeholder; one that exists but cannot be used disables its
//! track.

use std::path::{Path, PathBuf};

use omrsheet_core::Track;
use tracing::{debug, error, warn};

/// Image formats the page renderer accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Svg,
}

impl ImageFormat {
    /// Sniff the format from file contents
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Some(ImageFormat::Png);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }
        if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(ImageFormat::Webp);
        }

        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
        let head = head.trim_start_matches('\u{feff}').trim_start();
        if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
            return Some(ImageFormat::Svg);
        }

        None
    }

    /// File extension understood by the renderer
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Where a template image came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    /// Loaded from the configured file
    File(PathBuf),
    /// Synthesized because the file was missing; `written` is the on-disk
    /// copy when the directory was writable
    Placeholder { written: Option<PathBuf> },
}

/// A loaded background template
#[derive(Debug, Clone)]
pub struct TemplateImage {
    track: Track,
    format: ImageFormat,
    bytes: Vec<u8>,
    origin: TemplateOrigin,
}

impl TemplateImage {
    /// Build a template from image bytes, rejecting unknown formats
    pub fn from_bytes(track: Track, bytes: Vec<u8>, origin: TemplateOrigin) -> Option<Self> {
        let format = ImageFormat::detect(&bytes)?;
        Some(Self {
            track,
            format,
            bytes,
            origin,
        })
    }

    /// A labelled placeholder page kept in memory only
    pub fn placeholder(track: Track) -> Self {
        Self {
            track,
            format: ImageFormat::Svg,
            bytes: placeholder_svg(track).into_bytes(),
            origin: TemplateOrigin::Placeholder { written: None },
        }
    }

    /// The track this template serves
    pub fn track(&self) -> Track {
        self.track
    }

    /// Detected image format
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Raw image bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Where the image came from
    pub fn origin(&self) -> &TemplateOrigin {
        &self.origin
    }

    /// True when this is a synthesized placeholder
    pub fn is_placeholder(&self) -> bool {
        matches!(self.origin, TemplateOrigin::Placeholder { .. })
    }

    /// Path of the image inside the renderer's virtual file system
    pub fn virtual_path(&self) -> String {
        format!("/templates/{}.{}", self.track, self.format.extension())
    }
}

/// Placeholder text for a track
pub fn placeholder_label(track: Track) -> String {
    match track {
        Track::Child => "Child OMR Missing".to_string(),
        Track::Master => "Master OMR Missing".to_string(),
    }
}

/// White A4-proportioned SVG with the placeholder label
pub fn placeholder_svg(track: Track) -> String {
    format!(
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="595" height="842" viewBox="0 0 595 842">"##,
            r##"<rect width="595" height="842" fill="#ffffff"/>"##,
            r##"<text x="50" y="400" font-family="DejaVu Sans Mono, sans-serif" font-size="24" fill="#000000">{}</text>"##,
            "</svg>\n"
        ),
        placeholder_label(track)
    )
}

/// On-disk location for the placeholder of a missing template
pub fn placeholder_path(template_path: &Path) -> PathBuf {
    let stem = template_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "template".to_string());
    template_path.with_file_name(format!("{}.placeholder.svg", stem))
}

/// Write a placeholder beside a missing template, if the directory allows it
pub fn write_placeholder(track: Track, template_path: &Path) -> std::io::Result<PathBuf> {
    let path = placeholder_path(template_path);
    std::fs::write(&path, placeholder_svg(track))?;
    Ok(path)
}

/// The pair of background templates, one per track
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    child: Option<TemplateImage>,
    master: Option<TemplateImage>,
    failures: Vec<(Track, String)>,
}

impl TemplateSet {
    /// Load both templates from disk
    pub fn load(child_path: &Path, master_path: &Path) -> Self {
        let mut set = TemplateSet::default();
        for (track, path) in [(Track::Child, child_path), (Track::Master, master_path)] {
            match load_template(track, path) {
                Ok(image) => set.insert(image),
                Err(reason) => {
                    error!(%track, path = %path.display(), "Failed to load template: {}", reason);
                    set.failures.push((track, reason));
                }
            }
        }
        set
    }

    /// Build a set from already-loaded images
    pub fn from_images(images: impl IntoIterator<Item = TemplateImage>) -> Self {
        let mut set = TemplateSet::default();
        for image in images {
            set.insert(image);
        }
        set
    }

    fn insert(&mut self, image: TemplateImage) {
        match image.track {
            Track::Child => self.child = Some(image),
            Track::Master => self.master = Some(image),
        }
    }

    /// The template for a track, `None` if it failed to load
    pub fn get(&self, track: Track) -> Option<&TemplateImage> {
        match track {
            Track::Child => self.child.as_ref(),
            Track::Master => self.master.as_ref(),
        }
    }

    /// True when no track has a usable template
    pub fn is_empty(&self) -> bool {
        self.child.is_none() && self.master.is_none()
    }

    /// Load failures, one entry per failed track
    pub fn failures(&self) -> &[(Track, String)] {
        &self.failures
    }
}

fn load_template(track: Track, path: &Path) -> Result<TemplateImage, String> {
    if !path.exists() {
        warn!(%track, path = %path.display(), "Template missing, using placeholder");
        let written = match write_placeholder(track, path) {
            Ok(written) => Some(written),
            Err(e) => {
                debug!("Placeholder kept in memory: {}", e);
                None
            }
        };
        let mut image = TemplateImage::placeholder(track);
        image.origin = TemplateOrigin::Placeholder { written };
        return Ok(image);
    }

    let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    TemplateImage::from_bytes(track, bytes, TemplateOrigin::File(path.to_path_buf()))
        .ok_or_else(|| format!("{}: unrecognized image format", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_formats() {
        assert_eq!(ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::detect(b"\x89PNG\r\n\x1a\nrest"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::detect(b"GIF89a..."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(
            ImageFormat::detect(b"<?xml version=\"1.0\"?>\n<svg></svg>"),
            Some(ImageFormat::Svg)
        );
        assert_eq!(ImageFormat::detect(b"hello"), None);
        assert_eq!(ImageFormat::detect(b""), None);
    }

    #[test]
    fn test_placeholder_is_labelled() {
        let image = TemplateImage::placeholder(Track::Child);
        assert!(image.is_placeholder());
        assert_eq!(image.format(), ImageFormat::Svg);
        let svg = String::from_utf8(image.bytes().to_vec()).unwrap();
        assert!(svg.contains("Child OMR Missing"));
        assert_eq!(ImageFormat::detect(image.bytes()), Some(ImageFormat::Svg));
    }

    #[test]
    fn test_virtual_path() {
        let image = TemplateImage::placeholder(Track::Master);
        assert_eq!(image.virtual_path(), "/templates/master.svg");
    }

    #[test]
    fn test_placeholder_path() {
        assert_eq!(
            placeholder_path(Path::new("assets/child_omr.jpg")),
            PathBuf::from("assets/child_omr.placeholder.svg")
        );
    }

    #[test]
    fn test_load_missing_writes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let child = dir.path().join("child_omr.jpg");
        let master = dir.path().join("master_omr.jpg");

        let set = TemplateSet::load(&child, &master);
        assert!(!set.is_empty());
        assert!(set.failures().is_empty());

        let image = set.get(Track::Child).unwrap();
        assert_eq!(
            image.origin(),
            &TemplateOrigin::Placeholder {
                written: Some(dir.path().join("child_omr.placeholder.svg"))
            }
        );
        assert!(dir.path().join("master_omr.placeholder.svg").exists());
    }

    #[test]
    fn test_load_unreadable_template_fails_track() {
        let dir = tempfile::tempdir().unwrap();
        let child = dir.path().join("child_omr.jpg");
        let master = dir.path().join("master_omr.png");
        std::fs::write(&child, b"not an image").unwrap();
        std::fs::write(&master, b"\x89PNG\r\n\x1a\n0000").unwrap();

        let set = TemplateSet::load(&child, &master);
        assert!(set.get(Track::Child).is_none());
        assert_eq!(set.failures().len(), 1);
        assert_eq!(set.failures()[0].0, Track::Child);

        let master = set.get(Track::Master).unwrap();
        assert_eq!(master.format(), ImageFormat::Png);
        assert!(!master.is_placeholder());
    }

    #[test]
    fn test_both_failed_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let child = dir.path().join("child.jpg");
        let master = dir.path().join("master.jpg");
        std::fs::write(&child, b"x").unwrap();
        std::fs::write(&master, b"y").unwrap();

        let set = TemplateSet::load(&child, &master);
        assert!(set.is_empty());
        assert_eq!(set.failures().len(), 2);
    }
}
