//! WASM bindings for statement to voucher XML conversion.
//!
//! PDF decoding is native-only; the browser build accepts pre-extracted rows,
//! spreadsheets and CSV.
//!
//! Conversions return `{ status, reason, xml, stats }`. Document-level
//! failures such as an empty grid are reported through `status`
//! ("converted", "no_data", "unsupported") rather than thrown.

use wasm_bindgen::prelude::*;

use bankflow_core::statement::rules::parse_amount as parse_amount_text;
use bankflow_core::{
    BankflowConfig, ConversionMode, ConversionOutcome, ConversionRequest, ConversionStats,
    Converter, FieldClassifier, RawTable, SourceDocument, TallyXmlWriter,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_mode(mode: &str) -> Result<ConversionMode, JsValue> {
    mode.parse::<ConversionMode>().map_err(js_err)
}

fn rows_from_js(rows: JsValue) -> Result<RawTable, JsValue> {
    let rows: Vec<Vec<Option<String>>> = serde_wasm_bindgen::from_value(rows).map_err(js_err)?;
    Ok(RawTable::new(rows))
}

#[derive(Debug, serde::Serialize)]
struct ConvertResult {
    status: &'static str,
    reason: Option<String>,
    xml: Option<String>,
    stats: Option<ConversionStats>,
}

impl ConvertResult {
    fn from_outcome(outcome: &ConversionOutcome, indent: bool) -> bankflow_core::Result<Self> {
        Ok(match outcome {
            ConversionOutcome::Converted(conversion) => Self {
                status: outcome.status(),
                reason: None,
                xml: Some(
                    TallyXmlWriter::new()
                        .with_indent(indent)
                        .serialize_to_string(&conversion.document)?,
                ),
                stats: Some(conversion.stats.clone()),
            },
            other => Self {
                status: other.status(),
                reason: other.reason().map(str::to_string),
                xml: None,
                stats: None,
            },
        })
    }

    fn to_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self).map_err(js_err)
    }
}

fn table_outcome(
    converter: &Converter,
    table: &RawTable,
    mode: ConversionMode,
    main_ledger: &str,
) -> ConversionOutcome {
    match converter.convert(table, mode, main_ledger) {
        Ok(conversion) => ConversionOutcome::Converted(conversion),
        Err(e) => ConversionOutcome::NoData {
            reason: e.to_string(),
        },
    }
}

/// Convert a grid of cells (array of arrays of strings or nulls).
///
/// The header row is located by keyword scoring.
#[wasm_bindgen]
pub fn convert_rows(rows: JsValue, mode: &str, main_ledger: &str) -> Result<JsValue, JsValue> {
    let table = rows_from_js(rows)?;
    let outcome = table_outcome(&Converter::default(), &table, parse_mode(mode)?, main_ledger);

    ConvertResult::from_outcome(&outcome, true)
        .map_err(js_err)?
        .to_js()
}

/// Convert spreadsheet or CSV bytes. `name` picks the decoder by extension.
#[wasm_bindgen]
pub fn convert_spreadsheet(
    bytes: &[u8],
    name: &str,
    mode: &str,
    main_ledger: &str,
) -> Result<JsValue, JsValue> {
    let mut request = ConversionRequest::new(parse_mode(mode)?);
    if !main_ledger.is_empty() {
        request = request.with_main_ledger(main_ledger);
    }

    let source = SourceDocument::new(name, bytes.to_vec());
    let outcome = Converter::default().convert_source(&source, &request);

    ConvertResult::from_outcome(&outcome, true)
        .map_err(js_err)?
        .to_js()
}

/// Parse a statement amount (e.g., "1,00,000.50").
#[wasm_bindgen]
pub fn parse_amount(amount: &str) -> Option<f64> {
    parse_amount_text(amount).map(|d| d.to_string().parse().unwrap_or(0.0))
}

/// Voucher converter class for browser use.
#[wasm_bindgen]
pub struct VoucherConverter {
    config: BankflowConfig,
    mode: ConversionMode,
}

#[wasm_bindgen]
impl VoucherConverter {
    /// Create a converter for bank statements with default ledgers.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            config: BankflowConfig::default(),
            mode: ConversionMode::Bank,
        }
    }

    /// Set the statement kind: "sales", "purchase" or "bank".
    #[wasm_bindgen]
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        self.mode = parse_mode(mode)?;
        Ok(())
    }

    /// Set the main ledger name.
    #[wasm_bindgen]
    pub fn set_main_ledger(&mut self, main_ledger: &str) {
        self.config.ledgers.main_ledger = main_ledger.to_string();
    }

    /// Set the date used for rows with a missing or unparseable date (YYYY-MM-DD).
    #[wasm_bindgen]
    pub fn set_fallback_date(&mut self, date: &str) -> Result<(), JsValue> {
        self.config.normalize.fallback_date = date.parse().map_err(js_err)?;
        Ok(())
    }

    /// Toggle indented XML output.
    #[wasm_bindgen]
    pub fn set_indent(&mut self, indent: bool) {
        self.config.output.indent = indent;
    }

    /// Convert a grid of cells.
    #[wasm_bindgen]
    pub fn convert(&self, rows: JsValue) -> Result<JsValue, JsValue> {
        let table = rows_from_js(rows)?;
        self.convert_table(&table).map_err(js_err)?.to_js()
    }

    /// Convert spreadsheet or CSV bytes with this converter's settings.
    #[wasm_bindgen]
    pub fn convert_spreadsheet(&self, bytes: &[u8], name: &str) -> Result<JsValue, JsValue> {
        let source = SourceDocument::new(name, bytes.to_vec());
        self.convert_source(&source).map_err(js_err)?.to_js()
    }

    /// Report the detected header row and the role of each column.
    #[wasm_bindgen]
    pub fn inspect_header(&self, rows: JsValue) -> Result<JsValue, JsValue> {
        let table = rows_from_js(rows)?;
        let header = Converter::new(self.config.clone())
            .resolve_header(&table, false)
            .map_err(js_err)?;
        let schema = FieldClassifier::classify(&header.columns);

        #[derive(serde::Serialize)]
        struct ColumnInfo {
            name: String,
            role: &'static str,
        }

        #[derive(serde::Serialize)]
        struct HeaderInfo {
            index: usize,
            score: usize,
            confident: bool,
            columns: Vec<ColumnInfo>,
        }

        let info = HeaderInfo {
            index: header.index,
            score: header.score,
            confident: header.confident,
            columns: schema
                .columns()
                .iter()
                .zip(schema.roles())
                .map(|(name, role)| ColumnInfo {
                    name: name.clone(),
                    role: role.as_str(),
                })
                .collect(),
        };

        serde_wasm_bindgen::to_value(&info).map_err(js_err)
    }
}

impl VoucherConverter {
    fn converter(&self) -> Converter {
        Converter::new(self.config.clone())
    }

    fn convert_table(&self, table: &RawTable) -> bankflow_core::Result<ConvertResult> {
        let outcome = table_outcome(
            &self.converter(),
            table,
            self.mode,
            &self.config.ledgers.main_ledger,
        );
        ConvertResult::from_outcome(&outcome, self.config.output.indent)
    }

    fn convert_source(&self, source: &SourceDocument) -> bankflow_core::Result<ConvertResult> {
        let request = ConversionRequest::new(self.mode)
            .with_main_ledger(self.config.ledgers.main_ledger.as_str());
        let outcome = self.converter().convert_source(source, &request);
        ConvertResult::from_outcome(&outcome, self.config.output.indent)
    }
}

impl Default for VoucherConverter {
    fn default() -> Self {
        Self::new()
    }
}
