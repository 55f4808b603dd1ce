//! Voucher document serialization in the accounting importer's XML shape.
//!
//! ```text
//! ENVELOPE
//!   HEADER > TALLYREQUEST "Import Data"
//!   BODY > IMPORTDATA
//!     REQUESTDESC > REPORTNAME "Vouchers"
//!     REQUESTDATA
//!       TALLYMESSAGE > LEDGER          (suspense master, bank mode)
//!       TALLYMESSAGE > VOUCHER          (one per voucher)
//!         DATE, NARRATION, VOUCHERTYPENAME
//!         ALLLEDGERENTRIES.LIST x2 > LEDGERNAME, ISDEEMEDPOSITIVE, AMOUNT
//! ```

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{BankflowError, Result};
use crate::models::voucher::{Document, LedgerEntry, LedgerMaster, Voucher};

/// Serializes voucher documents. Output is a pure function of the document.
#[derive(Debug, Clone)]
pub struct TallyXmlWriter {
    indent: bool,
}

impl TallyXmlWriter {
    pub fn new() -> Self {
        Self { indent: true }
    }

    /// Enable or disable indentation.
    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Serialize a document to UTF-8 XML bytes.
    pub fn serialize(&self, document: &Document) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if self.indent {
            write_document(&mut Writer::new_with_indent(&mut buf, b' ', 4), document)?;
        } else {
            write_document(&mut Writer::new(&mut buf), document)?;
        }
        buf.push(b'\n');
        Ok(buf)
    }

    /// Serialize a document to a string.
    pub fn serialize_to_string(&self, document: &Document) -> Result<String> {
        let bytes = self.serialize(document)?;
        String::from_utf8(bytes).map_err(xml)
    }
}

impl Default for TallyXmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn xml<E: std::fmt::Display>(e: E) -> BankflowError {
    BankflowError::Xml(e.to_string())
}

fn start<W: Write>(wr: &mut Writer<W>, tag: BytesStart<'_>) -> Result<()> {
    wr.write_event(Event::Start(tag)).map_err(xml)
}

fn end<W: Write>(wr: &mut Writer<W>, name: &str) -> Result<()> {
    wr.write_event(Event::End(BytesStart::new(name).to_end())).map_err(xml)
}

fn text_element<W: Write>(wr: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    start(wr, BytesStart::new(name))?;
    wr.write_event(Event::Text(BytesText::new(text))).map_err(xml)?;
    end(wr, name)
}

fn write_document<W: Write>(wr: &mut Writer<W>, document: &Document) -> Result<()> {
    wr.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml)?;

    start(wr, BytesStart::new("ENVELOPE"))?;

    start(wr, BytesStart::new("HEADER"))?;
    text_element(wr, "TALLYREQUEST", "Import Data")?;
    end(wr, "HEADER")?;

    start(wr, BytesStart::new("BODY"))?;
    start(wr, BytesStart::new("IMPORTDATA"))?;

    start(wr, BytesStart::new("REQUESTDESC"))?;
    text_element(wr, "REPORTNAME", "Vouchers")?;
    end(wr, "REQUESTDESC")?;

    start(wr, BytesStart::new("REQUESTDATA"))?;
    for ledger in &document.ledgers {
        write_ledger_master(wr, ledger)?;
    }
    for voucher in &document.vouchers {
        write_voucher(wr, voucher)?;
    }
    end(wr, "REQUESTDATA")?;

    end(wr, "IMPORTDATA")?;
    end(wr, "BODY")?;
    end(wr, "ENVELOPE")
}

fn write_ledger_master<W: Write>(wr: &mut Writer<W>, ledger: &LedgerMaster) -> Result<()> {
    start(
        wr,
        BytesStart::new("TALLYMESSAGE").with_attributes([("xmlns:UDF", "TallyUDF")]),
    )?;
    start(
        wr,
        BytesStart::new("LEDGER").with_attributes([
            ("NAME", ledger.name.as_str()),
            ("ACTION", "Create"),
        ]),
    )?;

    start(wr, BytesStart::new("NAME.LIST"))?;
    text_element(wr, "NAME", &ledger.name)?;
    end(wr, "NAME.LIST")?;
    text_element(wr, "PARENT", &ledger.parent)?;

    end(wr, "LEDGER")?;
    end(wr, "TALLYMESSAGE")
}

fn write_voucher<W: Write>(wr: &mut Writer<W>, voucher: &Voucher) -> Result<()> {
    let kind = voucher.kind.as_str();

    start(wr, BytesStart::new("TALLYMESSAGE"))?;
    start(
        wr,
        BytesStart::new("VOUCHER").with_attributes([("VCHTYPE", kind), ("ACTION", "Create")]),
    )?;

    text_element(wr, "DATE", &voucher.date.format("%Y%m%d").to_string())?;
    text_element(wr, "NARRATION", &voucher.narration)?;
    text_element(wr, "VOUCHERTYPENAME", kind)?;
    for entry in &voucher.entries {
        write_ledger_entry(wr, entry)?;
    }

    end(wr, "VOUCHER")?;
    end(wr, "TALLYMESSAGE")
}

fn write_ledger_entry<W: Write>(wr: &mut Writer<W>, entry: &LedgerEntry) -> Result<()> {
    start(wr, BytesStart::new("ALLLEDGERENTRIES.LIST"))?;
    text_element(wr, "LEDGERNAME", &entry.ledger_name)?;
    text_element(wr, "ISDEEMEDPOSITIVE", entry.deemed_positive_flag())?;
    text_element(wr, "AMOUNT", &entry.amount.to_string())?;
    end(wr, "ALLLEDGERENTRIES.LIST")
}
