//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use omrsheet_core::{Diagnostic, Track, CALIBRATION_VERSION};
use omrsheet_data::ExcelSource;
use omrsheet_pdf::{placeholder_path, write_placeholder, TemplateOrigin};

use crate::batch::{inspect_workbook, run_batch, BatchContext, BatchReport, SheetSummary};
use crate::config::{load_settings, Settings};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "omrsheet")]
#[command(author, version, about = "Personalized OMR answer sheets from a class roster", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one PDF per worksheet and bundle them into a zip archive
    Generate {
        /// Input workbook (xlsx, xls, ods)
        input: PathBuf,

        /// Output archive path (defaults to the configured archive name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory holding the template images and logo
        #[arg(short, long, default_value = ".")]
        assets: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show how each worksheet would be read, without rendering
    Inspect {
        /// Input workbook (xlsx, xls, ods)
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write placeholder images for missing templates
    Placeholders {
        /// Directory holding the template images
        #[arg(short, long, default_value = ".")]
        assets: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            assets,
            config,
            format,
        } => {
            let settings = load_settings(config.as_deref())?;
            generate_command(&input, output.as_deref(), &assets, &settings, format)?;
        }
        Commands::Inspect { input, format } => {
            inspect_command(&input, format)?;
        }
        Commands::Placeholders { assets, config } => {
            let settings = load_settings(config.as_deref())?;
            placeholders_command(&assets, &settings)?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct GenerateSummary<'a> {
    archive: &'a Path,
    calibration_version: u32,
    #[serde(flatten)]
    report: &'a BatchReport,
}

/// Execute the generate command
///
/// Returns the run report after the archive has been written.
pub fn generate_command(
    input: &Path,
    output: Option<&Path>,
    assets_dir: &Path,
    settings: &Settings,
    format: OutputFormat,
) -> Result<BatchReport> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let context = BatchContext::load(settings, assets_dir)
        .context("Failed to load rendering assets")?;
    let mut source = ExcelSource::open(input)
        .with_context(|| format!("Failed to open workbook: {}", input.display()))?;

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&settings.output.archive_name));

    let batch = match run_batch(&mut source, &context) {
        Ok(batch) => batch,
        Err(e) => {
            if let Some(diagnostic) = e.diagnostic() {
                print_diagnostics(&[diagnostic], format)?;
            }
            return Err(e)
                .with_context(|| format!("Failed to generate sheets for {}", input.display()));
        }
    };

    fs::write(&output_path, &batch.archive)
        .with_context(|| format!("Failed to write archive: {}", output_path.display()))?;

    let report = batch.report;
    match format {
        OutputFormat::Json => {
            let summary = GenerateSummary {
                archive: &output_path,
                calibration_version: CALIBRATION_VERSION,
                report: &report,
            };
            let json = serde_json::to_string_pretty(&summary)
                .context("Failed to serialize report to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("omrsheet v{}", omrsheet_core::VERSION);
            println!("Generating: {}", input.display());
            print_template_status(&context);
            print_logo_status(settings, assets_dir);

            for sheet in &report.sheets {
                println!(
                    "  Created: {} ({} page(s) from sheet '{}')",
                    sheet.entry,
                    sheet.pages.len(),
                    sheet.sheet
                );
            }
            for diag in report.diagnostics.iter() {
                println!("{}", diag);
            }

            println!();
            println!(
                "Wrote {} ({} sheet(s), {} page(s), {} warning(s))",
                output_path.display(),
                report.sheets.len(),
                report.page_count(),
                report.diagnostics.warning_count()
            );
        }
    }

    Ok(report)
}

/// Print diagnostics for a run that produced no report
fn print_diagnostics(diagnostics: &[Diagnostic], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "diagnostics": diagnostics });
            let json = serde_json::to_string_pretty(&json)
                .context("Failed to serialize diagnostics to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for diag in diagnostics {
                println!("{}", diag);
            }
        }
    }
    Ok(())
}

fn print_template_status(context: &BatchContext) {
    let templates = context.templates();
    for track in Track::ALL {
        match templates.get(track).map(|t| t.origin()) {
            Some(TemplateOrigin::File(path)) => {
                println!("  {} template: {}", track, path.display());
            }
            Some(TemplateOrigin::Placeholder { written: Some(path) }) => {
                println!("  {} template: placeholder ({})", track, path.display());
            }
            Some(TemplateOrigin::Placeholder { written: None }) => {
                println!("  {} template: placeholder (in memory)", track);
            }
            None => {
                println!("  {} template: unavailable, rows skipped", track);
            }
        }
    }
}

fn print_logo_status(settings: &Settings, assets_dir: &Path) {
    if let Some(logo) = &settings.assets.logo {
        let path = settings.assets.resolve(assets_dir, logo);
        if path.exists() {
            println!("  Logo: {}", path.display());
        } else {
            println!("  Logo: not found ({})", path.display());
        }
    }
}

/// Execute the inspect command
pub fn inspect_command(input: &Path, format: OutputFormat) -> Result<Vec<SheetSummary>> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let mut source = ExcelSource::open(input)
        .with_context(|| format!("Failed to open workbook: {}", input.display()))?;
    let summaries = inspect_workbook(&mut source);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summaries)
                .context("Failed to serialize sheet summaries to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for summary in &summaries {
                println!("Sheet '{}'", summary.sheet);
                if let Some(error) = &summary.error {
                    println!("  unreadable: {}", error);
                    continue;
                }
                for (field, header) in &summary.columns {
                    match header {
                        Some(header) => println!("  {:<13} <- {}", field, header),
                        None => println!("  {:<13} (not found)", field),
                    }
                }
                println!(
                    "  {} row(s): {} child, {} master",
                    summary.rows, summary.child_rows, summary.master_rows
                );
            }
        }
    }

    Ok(summaries)
}

/// Execute the placeholders command
///
/// Writes a placeholder beside each configured template that is missing.
/// Returns the paths written.
pub fn placeholders_command(assets_dir: &Path, settings: &Settings) -> Result<Vec<PathBuf>> {
    let assets = &settings.assets;
    let mut written = Vec::new();

    for (track, template) in [
        (Track::Child, &assets.child_template),
        (Track::Master, &assets.master_template),
    ] {
        let template_path = assets.resolve(assets_dir, template);
        if template_path.exists() {
            println!("  {} template present: {}", track, template_path.display());
            continue;
        }

        let path = write_placeholder(track, &template_path).with_context(|| {
            format!(
                "Failed to write placeholder: {}",
                placeholder_path(&template_path).display()
            )
        })?;
        println!("  Created: {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_generate() {
        let args = vec!["omrsheet", "generate", "roster.xlsx"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Generate {
                input,
                output,
                assets,
                config,
                format,
            } => {
                assert_eq!(input, PathBuf::from("roster.xlsx"));
                assert!(output.is_none());
                assert_eq!(assets, PathBuf::from("."));
                assert!(config.is_none());
                assert!(matches!(format, OutputFormat::Text));
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_parse_generate_full() {
        let args = vec![
            "omrsheet",
            "generate",
            "roster.xlsx",
            "--output",
            "out.zip",
            "--assets",
            "static",
            "--config",
            "omr.toml",
            "--format",
            "json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Generate {
                output,
                assets,
                config,
                format,
                ..
            } => {
                assert_eq!(output, Some(PathBuf::from("out.zip")));
                assert_eq!(assets, PathBuf::from("static"));
                assert_eq!(config, Some(PathBuf::from("omr.toml")));
                assert!(matches!(format, OutputFormat::Json));
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_parse_inspect() {
        let args = vec!["omrsheet", "inspect", "roster.ods", "-f", "json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Inspect { input, format } => {
                assert_eq!(input, PathBuf::from("roster.ods"));
                assert!(matches!(format, OutputFormat::Json));
            }
            _ => panic!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_cli_parse_placeholders() {
        let args = vec!["omrsheet", "placeholders", "--assets", "static"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Placeholders { assets, config } => {
                assert_eq!(assets, PathBuf::from("static"));
                assert!(config.is_none());
            }
            _ => panic!("Expected Placeholders command"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(vec!["omrsheet"]).is_err());
    }

    #[test]
    fn test_generate_missing_input() {
        let result = generate_command(
            Path::new("/nonexistent/roster.xlsx"),
            None,
            Path::new("."),
            &Settings::default(),
            OutputFormat::Text,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_placeholders_skip_existing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("child_omr.jpg"), [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let written = placeholders_command(dir.path(), &Settings::default()).unwrap();
        assert_eq!(written, vec![dir.path().join("master_omr.placeholder.svg")]);
        assert!(written[0].exists());
    }
}
