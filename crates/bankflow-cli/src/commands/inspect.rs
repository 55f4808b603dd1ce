//! Inspect command - show how a statement would be interpreted.

use std::path::PathBuf;

use clap::Args;
use console::style;

use bankflow_core::{
    ConversionMode, ConversionRequest, Converter, ExtractError, FieldClassifier, LockStatus,
    PdfTableExtractor, RowNormalizer, SourceDocument, SourceFormat,
};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input file (PDF, xlsx/xls/ods or CSV)
    #[arg(required = true)]
    input: PathBuf,

    /// Password to verify against a protected PDF
    #[arg(short, long)]
    password: Option<String>,

    /// Statement kind used for the row preview
    #[arg(short, long, default_value = "bank")]
    mode: ConversionMode,

    /// Number of normalized rows to preview
    #[arg(short = 'n', long, default_value = "5")]
    rows: usize,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::config::load(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let source = SourceDocument::from_path(&args.input)?;
    let format = source.format()?;

    println!("File:   {}", source.name);
    println!("Format: {}", format.as_str());

    if format == SourceFormat::Pdf {
        let status = PdfTableExtractor::lock_status(&source.bytes)?;
        println!(
            "Lock:   {}",
            match status {
                LockStatus::Locked => style("locked").yellow(),
                LockStatus::Unlocked => style("unlocked").green(),
            }
        );

        if let Some(password) = &args.password {
            let valid = PdfTableExtractor::verify_password(&source.bytes, password);
            println!(
                "Password: {}",
                if valid { style("valid").green() } else { style("invalid").red() }
            );
        }
    }

    let converter = Converter::new(config.clone());
    let request = ConversionRequest::new(args.mode).with_password(args.password.clone());
    let (table, format) = match converter.extract(&source, &request) {
        Ok(extracted) => extracted,
        Err(ExtractError::PasswordRequired) => {
            println!();
            println!(
                "{} Document is password protected; pass --password to inspect its rows.",
                style("ℹ").blue()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Rows:   {}", table.len());

    let header = converter.resolve_header(&table, format.is_tabular())?;
    println!();
    println!(
        "Header: row {} (score {}{})",
        header.index,
        header.score,
        if header.confident { "" } else { ", below confidence floor" }
    );

    let schema = FieldClassifier::classify(&header.columns);
    for (i, (column, role)) in schema.columns().iter().zip(schema.roles()).enumerate() {
        println!("  [{:>2}] {:<30} {}", i, column, style(role.as_str()).cyan());
    }

    let normalizer = RowNormalizer::new(&schema, args.mode, config.normalize.fallback_date);
    let preview: Vec<_> = table
        .data_rows(header.index)
        .iter()
        .filter_map(|row| normalizer.normalize(row))
        .take(args.rows)
        .collect();

    if !preview.is_empty() {
        println!();
        println!("Preview ({} mode):", args.mode);
        for record in &preview {
            println!(
                "  {} {}{:<9} {:>14}  {}",
                record.date(),
                if record.date.is_defaulted() { "*" } else { " " },
                record.kind.as_str(),
                record.net_amount,
                record.party
            );
        }
    }

    Ok(())
}
