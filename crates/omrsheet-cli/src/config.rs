//! Configuration settings
//!
//! Settings are loaded from `omrsheet.toml`:
//!
//! ```toml
//! [assets]
//! child_template = "child_omr.jpg"
//! master_template = "master_omr.jpg"
//! logo = "logo.webp"
//!
//! [output]
//! archive_name = "Generated_OMRs.zip"
//! extension = "pdf"
//!
//! [render]
//! fonts = ["fonts/LiberationSans-Bold.ttf"]
//! font_family = ["Liberation Sans", "DejaVu Sans Mono"]
//! ```
//!
//! Asset paths are relative to the assets directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default config file names, searched in the working directory
pub const CONFIG_CANDIDATES: [&str; 2] = ["omrsheet.toml", ".omrsheet.toml"];

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Static asset locations
    pub assets: AssetSettings,
    /// Output naming
    pub output: OutputSettings,
    /// Text rendering
    pub render: RenderSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// Template and logo files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Background for classes 1 to 3
    pub child_template: PathBuf,
    /// Background for every other class
    pub master_template: PathBuf,
    /// Branding image, optional
    pub logo: Option<PathBuf>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            child_template: PathBuf::from("child_omr.jpg"),
            master_template: PathBuf::from("master_omr.jpg"),
            logo: Some(PathBuf::from("logo.webp")),
        }
    }
}

impl AssetSettings {
    /// Resolve an asset path against the assets directory
    pub fn resolve(&self, assets_dir: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            assets_dir.join(path)
        }
    }
}

/// Output archive settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Default archive file name
    pub archive_name: String,
    /// Extension of each sheet document
    pub extension: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            archive_name: "Generated_OMRs.zip".to_string(),
            extension: "pdf".to_string(),
        }
    }
}

/// Font settings for sheet text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Font files loaded into the renderer, ahead of the bundled fonts
    pub fonts: Vec<PathBuf>,
    /// Family preference, first available wins
    pub font_family: Vec<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fonts: Vec::new(),
            font_family: omrsheet_pdf::default_font_family(),
        }
    }
}

/// Load settings from an explicit path, or the first default file found
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            Settings::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        }
        None => {
            for candidate in CONFIG_CANDIDATES {
                let path = Path::new(candidate);
                if path.exists() {
                    let content = fs::read_to_string(path)
                        .with_context(|| format!("Failed to read config: {}", candidate))?;
                    return Settings::from_toml_str(&content)
                        .with_context(|| format!("Failed to parse config: {}", candidate));
                }
            }
            Ok(Settings::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.assets.child_template, PathBuf::from("child_omr.jpg"));
        assert_eq!(settings.output.archive_name, "Generated_OMRs.zip");
        assert_eq!(settings.output.extension, "pdf");
        assert!(settings.render.fonts.is_empty());
        assert_eq!(settings.render.font_family, ["DejaVu Sans Mono"]);
    }

    #[test]
    fn test_partial_toml() {
        let settings = Settings::from_toml_str(
            r#"
[assets]
master_template = "sheets/master.png"

[output]
extension = "PDF"
"#,
        )
        .unwrap();

        assert_eq!(settings.assets.master_template, PathBuf::from("sheets/master.png"));
        assert_eq!(settings.assets.child_template, PathBuf::from("child_omr.jpg"));
        assert_eq!(settings.output.extension, "PDF");
        assert_eq!(settings.output.archive_name, "Generated_OMRs.zip");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Settings::from_toml_str("[assets\nchild_template = 3").is_err());
    }

    #[test]
    fn test_resolve_asset_path() {
        let assets = AssetSettings::default();
        assert_eq!(
            assets.resolve(Path::new("static"), &assets.child_template),
            PathBuf::from("static/child_omr.jpg")
        );
    }

    #[test]
    fn test_load_settings_explicit_missing() {
        assert!(load_settings(Some(Path::new("/nonexistent/omrsheet.toml"))).is_err());
    }

    #[test]
    fn test_load_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("omrsheet.toml");
        fs::write(&path, "[output]\narchive_name = \"sheets.zip\"\n").unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.output.archive_name, "sheets.zip");
    }
}
