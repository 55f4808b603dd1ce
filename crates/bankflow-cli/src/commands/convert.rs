//! Convert command - turn a single statement into voucher XML.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use clap::Args;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use bankflow_core::extract::output_name_for;
use bankflow_core::{
    BankflowConfig, ConversionMode, ConversionOutcome, ConversionRequest, Converter, Document,
    SourceDocument, TallyXmlWriter,
};

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input file (PDF, xlsx/xls/ods or CSV)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file or directory (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Statement kind: sales, purchase or bank
    #[arg(short, long, default_value = "bank")]
    mode: ConversionMode,

    /// Main ledger name (default from config)
    #[arg(short = 'l', long)]
    main_ledger: Option<String>,

    /// Password for protected PDFs
    #[arg(short, long)]
    password: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "xml")]
    format: OutputFormat,

    /// Date used for rows whose date cannot be read (YYYY-MM-DD)
    #[arg(long)]
    fallback_date: Option<NaiveDate>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Importer XML
    Xml,
    /// JSON dump of the voucher document
    Json,
    /// One CSV line per ledger entry
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xml => "xml",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

pub async fn run(args: ConvertArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::config::load(config_path)?;
    if let Some(date) = args.fallback_date {
        config.normalize.fallback_date = date;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Converting file: {}", args.input.display());
    let source = SourceDocument::from_path(&args.input)?;
    let converter = Converter::new(config.clone());
    let mut request = ConversionRequest::new(args.mode).with_password(args.password.clone());
    if let Some(main_ledger) = &args.main_ledger {
        request = request.with_main_ledger(main_ledger.as_str());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Converting {}...", source.name));

    let mut outcome = converter.convert_source(&source, &request);
    pb.finish_and_clear();

    if matches!(outcome, ConversionOutcome::PasswordRequired) && request.password.is_none() {
        if let Some(password) = prompt_password(&source.name)? {
            request = request.with_password(Some(password));
            outcome = converter.convert_source(&source, &request);
        }
    }

    let conversion = match outcome {
        ConversionOutcome::Converted(conversion) => conversion,
        ConversionOutcome::PasswordRequired => {
            anyhow::bail!(
                "{} is password protected. Supply the password with --password.",
                source.name
            )
        }
        ConversionOutcome::NoData { reason } => {
            anyhow::bail!("No vouchers could be produced from {}: {}", source.name, reason)
        }
        ConversionOutcome::Unsupported { reason } => {
            anyhow::bail!("Unsupported file format: {}", reason)
        }
    };

    if conversion.document.is_empty() {
        eprintln!(
            "{} No transaction rows found in {}",
            style("⚠").yellow(),
            source.name
        );
    }

    let output = render(&conversion.document, args.format, &config)?;

    match &args.output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(output_file_name(&source.name, args.format))
            } else {
                path.clone()
            };
            fs::write(&path, &output)?;
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => print!("{}", String::from_utf8_lossy(&output)),
    }

    eprintln!(
        "{} {}, header at row {}",
        style("ℹ").blue(),
        conversion.stats,
        conversion.header.index
    );

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Ask for a password when a person is at the terminal.
fn prompt_password(name: &str) -> anyhow::Result<Option<String>> {
    if !console::user_attended_stderr() {
        return Ok(None);
    }

    let term = Term::stderr();
    term.write_str(&format!("{} is password protected. Password: ", name))?;
    let password = term.read_secure_line()?;

    Ok(Some(password).filter(|p| !p.is_empty()))
}

/// Output file name for an input file in the given format.
pub fn output_file_name(input_name: &str, format: OutputFormat) -> String {
    output_name_for(input_name, format.extension())
}

/// Encode a voucher document.
pub fn render(document: &Document, format: OutputFormat, config: &BankflowConfig) -> anyhow::Result<Vec<u8>> {
    match format {
        OutputFormat::Xml => Ok(TallyXmlWriter::new()
            .with_indent(config.output.indent)
            .serialize(document)?),
        OutputFormat::Json => {
            let mut json = serde_json::to_vec_pretty(document)?;
            json.push(b'\n');
            Ok(json)
        }
        OutputFormat::Csv => format_csv(document),
    }
}

fn format_csv(document: &Document) -> anyhow::Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "voucher",
        "date",
        "type",
        "narration",
        "ledger",
        "is_deemed_positive",
        "amount",
    ])?;

    for (i, voucher) in document.vouchers.iter().enumerate() {
        for entry in &voucher.entries {
            wtr.write_record([
                (i + 1).to_string().as_str(),
                voucher.date.to_string().as_str(),
                voucher.kind.as_str(),
                voucher.narration.as_str(),
                entry.ledger_name.as_str(),
                entry.deemed_positive_flag(),
                entry.amount.to_string().as_str(),
            ])?;
        }
    }

    Ok(wtr.into_inner()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankflow_core::RawTable;

    fn document() -> Document {
        let table = RawTable::from_text_rows(vec![
            vec!["Date", "Narration", "Debit", "Credit"],
            vec!["01/04/2024", "Rent, April", "5000", "0"],
        ]);
        Converter::default()
            .convert(&table, ConversionMode::Bank, "Bank Account")
            .unwrap()
            .document
    }

    #[test]
    fn test_csv_has_one_line_per_leg() {
        let csv = String::from_utf8(format_csv(&document()).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "1,2024-04-01,Payment,\"Rent, April\",Suspense Account,Yes,-5000");
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("stmt.april.pdf", OutputFormat::Xml), "stmt.april.xml");
        assert_eq!(output_file_name("stmt.april.pdf", OutputFormat::Json), "stmt.april.json");
    }
}
