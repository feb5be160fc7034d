//! dimpivot CLI - pivot a label sheet into a count table

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dimpivot::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dimpivot")]
#[command(
    author,
    version,
    about = "Count dimension/color labels into a pivot table"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the pivot table and write it as XLSX or CSV
    Pivot {
        /// Input label sheet (xlsx, xlsm, csv)
        input: PathBuf,

        /// Output file, `-` for stdout (default: pivot.xlsx or pivot.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: from the output extension, xlsx for stdout)
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Keep ascending order and plain color headers
        #[arg(long)]
        plain: bool,
    },

    /// Print the pivot table to stdout
    Show {
        /// Input label sheet (xlsx, xlsm, csv)
        input: PathBuf,

        /// Keep ascending order and plain color headers
        #[arg(long)]
        plain: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Xlsx,
    Csv,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Xlsx => ExportFormat::Xlsx,
            Format::Csv => ExportFormat::Csv,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Pivot {
            input,
            output,
            format,
            plain,
        } => pivot(&input, output.as_deref(), format, plain),
        Commands::Show { input, plain } => show(&input, plain),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();
}

fn pivot_options(plain: bool) -> PivotOptions {
    if plain {
        PivotOptions::plain()
    } else {
        PivotOptions::default()
    }
}

fn load(input: &Path, plain: bool) -> Result<FinalTable> {
    let table = FinalTable::open(input, &pivot_options(plain))
        .with_context(|| format!("Failed to pivot '{}'", input.display()))?;
    info!(
        rows = table.data_rows().count(),
        colors = table.colors().len(),
        total = table.grand_total(),
        "pivoted {}",
        input.display()
    );
    Ok(table)
}

/// Resolve the export format: explicit flag, then output extension, then xlsx
fn resolve_format(format: Option<Format>, output: Option<&Path>) -> Result<ExportFormat> {
    if let Some(format) = format {
        return Ok(format.into());
    }
    match output {
        Some(path) if path != Path::new("-") => ExportFormat::from_path(path).with_context(|| {
            format!(
                "Cannot infer the output format of '{}'; pass --format",
                path.display()
            )
        }),
        _ => Ok(ExportFormat::Xlsx),
    }
}

fn pivot(
    input: &Path,
    output: Option<&Path>,
    format: Option<Format>,
    plain: bool,
) -> Result<()> {
    let format = resolve_format(format, output)?;
    let table = load(input, plain)?;
    let export = table
        .export(format)
        .with_context(|| format!("Failed to encode {}", format))?;

    match output {
        Some(path) if path == Path::new("-") => {
            io::stdout()
                .write_all(&export.bytes)
                .context("Failed to write to stdout")?;
        }
        _ => {
            let path = output.unwrap_or_else(|| Path::new(export.file_name));
            std::fs::write(path, &export.bytes)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            debug!(mime = export.mime_type, bytes = export.bytes.len(), "export written");
            eprintln!("Wrote {} rows to '{}'", table.rows().len(), path.display());
        }
    }

    Ok(())
}

fn show(input: &Path, plain: bool) -> Result<()> {
    let table = load(input, plain)?;
    print!("{}", table);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_pivot_command() {
        let cli = Cli::try_parse_from([
            "dimpivot", "-v", "pivot", "in.csv", "-o", "out.csv", "--plain",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Pivot {
                input,
                output,
                format,
                plain,
            } => {
                assert_eq!(input, PathBuf::from("in.csv"));
                assert_eq!(output, Some(PathBuf::from("out.csv")));
                assert_eq!(format, None);
                assert!(plain);
            }
            Commands::Show { .. } => panic!("expected pivot"),
        }
    }

    #[test]
    fn test_rejects_unknown_format() {
        let parsed = Cli::try_parse_from(["dimpivot", "pivot", "in.csv", "--format", "ods"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(resolve_format(None, None).unwrap(), ExportFormat::Xlsx);
        assert_eq!(
            resolve_format(None, Some(Path::new("out.csv"))).unwrap(),
            ExportFormat::Csv
        );
        assert_eq!(
            resolve_format(Some(Format::Xlsx), Some(Path::new("out.csv"))).unwrap(),
            ExportFormat::Xlsx
        );
        assert_eq!(
            resolve_format(None, Some(Path::new("-"))).unwrap(),
            ExportFormat::Xlsx
        );
        assert_eq!(
            resolve_format(Some(Format::Csv), Some(Path::new("out.txt"))).unwrap(),
            ExportFormat::Csv
        );
    }

    #[test]
    fn test_unknown_output_extension_needs_format() {
        assert!(resolve_format(None, Some(Path::new("out.txt"))).is_err());
        assert!(resolve_format(None, Some(Path::new("out"))).is_err());

        let dir = TempDir::new().unwrap();
        let input = dir.path().join("labels.csv");
        std::fs::write(&input, "Item\n1x2x3 Red\n").unwrap();
        let output = dir.path().join("out.txt");

        let err = pivot(&input, Some(&output), None, false).unwrap_err();
        assert!(format!("{:#}", err).contains("--format"));
        assert!(!output.exists());
    }

    #[test]
    fn test_pivot_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("labels.csv");
        std::fs::write(&input, "Item\n10x20x5 Red\n10x20x5 Red\n10x30x5 Blue\n").unwrap();
        let output = dir.path().join("out.csv");

        pivot(&input, Some(&output), None, true).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "No.;Measurement2;Blue;Red;Total\n\
             1;20;0;2;2\n\
             2;30;1;0;1\n\
             3;Total;1;2;3\n"
        );
    }

    #[test]
    fn test_pivot_reports_malformed_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("labels.csv");
        std::fs::write(&input, "Item\n9x9 Red\nabc\n").unwrap();

        let err = pivot(&input, Some(&dir.path().join("out.xlsx")), None, false).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Malformed input"), "{}", message);
        assert!(!dir.path().join("out.xlsx").exists());
    }
}
