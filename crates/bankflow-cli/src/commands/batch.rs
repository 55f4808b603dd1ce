//! Batch command - convert many statements, isolating failures.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use bankflow_core::{
    BankflowConfig, ConversionMode, ConversionOutcome, ConversionRequest, Converter, Document,
    SourceDocument,
};

use super::convert::{render, OutputFormat};

const SUPPORTED_EXTENSIONS: [&str; 7] = ["pdf", "xlsx", "xls", "xlsm", "xlsb", "ods", "csv"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input glob pattern (e.g. "statements/*.pdf")
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Statement kind: sales, purchase or bank
    #[arg(short, long, default_value = "bank")]
    mode: ConversionMode,

    /// Main ledger name (default from config)
    #[arg(short = 'l', long)]
    main_ledger: Option<String>,

    /// Password tried on protected PDFs
    #[arg(short, long)]
    password: Option<String>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "xml")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Stop at the first failed file
    #[arg(long)]
    fail_fast: bool,
}

/// Result of converting a single file.
struct ProcessResult {
    path: PathBuf,
    outcome: ConversionOutcome,
    output: Option<PathBuf>,
    /// Failure after or around conversion (writing output, a crashed task).
    error: Option<String>,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn is_success(&self) -> bool {
        self.error.is_none() && self.outcome.is_converted()
    }

    fn status(&self) -> &'static str {
        if self.error.is_some() {
            "failed"
        } else {
            self.outcome.status()
        }
    }

    fn reason(&self) -> Option<&str> {
        self.error.as_deref().or_else(|| self.outcome.reason())
    }

    fn voucher_count(&self) -> usize {
        if self.is_success() {
            self.outcome.voucher_count()
        } else {
            0
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::config::load(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to convert",
        style("ℹ").blue(),
        files.len()
    );

    fs::create_dir_all(&args.output_dir)?;
    let output_names = output_names(&files, args.format);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut request = ConversionRequest::new(args.mode).with_password(args.password.clone());
    if let Some(main_ledger) = &args.main_ledger {
        request = request.with_main_ledger(main_ledger.as_str());
    }

    let converter = Arc::new(Converter::new(config.clone()));
    let request = Arc::new(request);
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    // Handles are kept in input order so results come back in that order.
    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let permit = semaphore.clone().acquire_owned().await?;
        let converter = Arc::clone(&converter);
        let request = Arc::clone(&request);
        let task_path = path.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let outcome = match SourceDocument::from_path(&task_path) {
                Ok(source) => converter.convert_source(&source, &request),
                Err(e) => ConversionOutcome::NoData {
                    reason: format!("failed to read file: {}", e),
                },
            };
            (outcome, file_start.elapsed().as_millis() as u64)
        });
        handles.push((path, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for ((path, handle), output_name) in handles.into_iter().zip(output_names) {
        let result = match handle.await {
            Ok((outcome, processing_time_ms)) => {
                let mut result = ProcessResult {
                    path,
                    outcome,
                    output: None,
                    error: None,
                    processing_time_ms,
                };
                if let ConversionOutcome::Converted(conversion) = &result.outcome {
                    let output_path = args.output_dir.join(&output_name);
                    match write_output(&output_path, &conversion.document, args.format, &config) {
                        Ok(()) => {
                            debug!("Wrote output to {}", output_path.display());
                            result.output = Some(output_path);
                        }
                        Err(e) => {
                            result.error =
                                Some(format!("failed to write {}: {}", output_path.display(), e));
                        }
                    }
                }
                result
            }
            Err(e) => {
                let reason = format!("conversion task failed: {}", e);
                ProcessResult {
                    path,
                    outcome: ConversionOutcome::NoData {
                        reason: reason.clone(),
                    },
                    output: None,
                    error: Some(reason),
                    processing_time_ms: 0,
                }
            }
        };
        pb.inc(1);

        if !result.is_success() {
            let reason = result.reason().unwrap_or("unknown error");
            if args.fail_fast {
                pb.abandon();
                error!("Failed to convert {}: {}", result.path.display(), reason);
                anyhow::bail!("Conversion failed for {}: {}", result.path.display(), reason);
            }
            warn!("Failed to convert {}: {}", result.path.display(), reason);
        }

        results.push(result);
    }

    pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = args.output_dir.join("summary.csv");
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = results.iter().filter(|r| r.is_success()).count();
    let failed: Vec<_> = results.iter().filter(|r| !r.is_success()).collect();
    let vouchers: usize = results.iter().map(ProcessResult::voucher_count).sum();

    println!();
    println!(
        "{} Converted {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed, {} vouchers",
        style(successful).green(),
        style(failed.len()).red(),
        vouchers
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.reason().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_output(
    path: &Path,
    document: &Document,
    format: OutputFormat,
    config: &BankflowConfig,
) -> anyhow::Result<()> {
    fs::write(path, render(document, format, config)?)?;
    Ok(())
}

/// One output file name per input, in input order.
///
/// Inputs sharing a stem keep their own extension ("april.pdf.xml",
/// "april.csv.xml"); names still taken after that get a `_<n>` suffix.
fn output_names(files: &[PathBuf], format: OutputFormat) -> Vec<String> {
    let stems: Vec<String> = files
        .iter()
        .map(|p| {
            p.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string())
        })
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for stem in &stems {
        *counts.entry(stem.as_str()).or_default() += 1;
    }

    let mut used = HashSet::new();
    files
        .iter()
        .zip(&stems)
        .map(|(path, stem)| {
            let base = if counts.get(stem.as_str()).copied().unwrap_or(0) > 1 {
                file_name(path)
            } else {
                stem.clone()
            };

            let mut name = format!("{}.{}", base, format.extension());
            let mut n = 1;
            while !used.insert(name.clone()) {
                name = format!("{}_{}.{}", base, n, format.extension());
                n += 1;
            }
            name
        })
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "vouchers",
        "rows_seen",
        "skipped_zero",
        "dates_defaulted",
        "header_row",
        "output",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = file_name(&result.path);
        let time = result.processing_time_ms.to_string();
        let output = result
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        match &result.outcome {
            ConversionOutcome::Converted(conversion) if result.is_success() => {
                let stats = &conversion.stats;
                wtr.write_record([
                    filename.as_str(),
                    result.status(),
                    stats.vouchers.to_string().as_str(),
                    stats.rows_seen.to_string().as_str(),
                    stats.skipped_zero.to_string().as_str(),
                    stats.dates_defaulted.to_string().as_str(),
                    conversion.header.index.to_string().as_str(),
                    output.as_str(),
                    time.as_str(),
                    "",
                ])?;
            }
            _ => {
                wtr.write_record([
                    filename.as_str(),
                    result.status(),
                    "0",
                    "",
                    "",
                    "",
                    "",
                    "",
                    time.as_str(),
                    result.reason().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names_are_unique() {
        let files = vec![
            PathBuf::from("statements/april.pdf"),
            PathBuf::from("statements/april.csv"),
            PathBuf::from("statements/may.csv"),
            PathBuf::from("archive/april.csv"),
        ];

        assert_eq!(
            output_names(&files, OutputFormat::Xml),
            vec!["april.pdf.xml", "april.csv.xml", "may.xml", "april.csv_1.xml"]
        );
    }

    #[test]
    fn test_output_names_keep_stem_when_unique() {
        let files = vec![PathBuf::from("a.csv"), PathBuf::from("b.pdf")];
        assert_eq!(output_names(&files, OutputFormat::Json), vec!["a.json", "b.json"]);
    }
}
