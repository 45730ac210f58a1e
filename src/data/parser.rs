//! Parser for the CBR `XML_daily` feed
//!
//! The feed looks like:
//!
//! ```xml
//! <?xml version="1.0" encoding="windows-1251"?>
//! <ValCurs Date="18.10.2026" name="Foreign Currency Market">
//!   <Valute ID="R01235">
//!     <NumCode>840</NumCode>
//!     <CharCode>USD</CharCode>
//!     <Nominal>1</Nominal>
//!     <Name>Доллар США</Name>
//!     <Value>90,5000</Value>
//!   </Valute>
//! </ValCurs>
//! ```

use chrono::NaiveDate;
use encoding_rs::{Encoding, UTF_8};
use serde::Deserialize;
use tracing::debug;

use super::CurrencyRecord;
use crate::error::{CurrencyError, Result};

/// Format of the `Date` attribute on the root element
const FEED_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Deserialize)]
struct ValCurs {
    #[serde(rename = "Date", default)]
    date: Option<String>,
    #[serde(rename = "Valute", default)]
    valutes: Vec<Valute>,
}

#[derive(Debug, Deserialize)]
struct Valute {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "CharCode")]
    char_code: String,
    #[serde(rename = "Value")]
    value: String,
    #[serde(rename = "Nominal")]
    nominal: String,
}

impl From<Valute> for CurrencyRecord {
    fn from(valute: Valute) -> Self {
        CurrencyRecord::new(
            valute.name.trim(),
            valute.char_code.trim(),
            valute.value.trim(),
            valute.nominal.trim(),
        )
    }
}

/// A parsed feed document
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeed {
    /// Date the rates are quoted for, if the feed states one
    pub date: Option<NaiveDate>,
    /// Currency records in document order
    pub records: Vec<CurrencyRecord>,
}

/// Parses raw feed bytes into currency records
///
/// Any element missing one of `Name`, `CharCode`, `Value` or `Nominal`
/// fails the whole document.
pub fn parse(xml: &[u8]) -> Result<Vec<CurrencyRecord>> {
    parse_feed(xml).map(|feed| feed.records)
}

/// Parses raw feed bytes, keeping the feed date alongside the records
pub fn parse_feed(xml: &[u8]) -> Result<ParsedFeed> {
    let text = decode_document(xml)?;

    let doc: ValCurs = serde_xml_rs::from_str(strip_declaration(&text))
        .map_err(|e| CurrencyError::Parse(e.to_string()))?;

    let date = doc
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), FEED_DATE_FORMAT).ok());
    let records: Vec<CurrencyRecord> = doc.valutes.into_iter().map(Into::into).collect();

    debug!(count = records.len(), ?date, "parsed rates feed");
    Ok(ParsedFeed { date, records })
}

/// Decodes the document using the encoding named in its XML declaration
///
/// A byte-order mark wins over the declaration; with neither, UTF-8 is assumed.
fn decode_document(xml: &[u8]) -> Result<String> {
    let encoding = match declared_encoding(xml) {
        Some(label) => Encoding::for_label(label.as_bytes())
            .ok_or_else(|| CurrencyError::Parse(format!("unsupported encoding '{}'", label)))?,
        None => UTF_8,
    };

    let (text, used, had_errors) = encoding.decode(xml);
    if had_errors {
        return Err(CurrencyError::Parse(format!(
            "document is not valid {}",
            used.name()
        )));
    }
    Ok(text.into_owned())
}

/// Reads the `encoding` pseudo-attribute from an ASCII-compatible XML declaration
fn declared_encoding(xml: &[u8]) -> Option<String> {
    if !xml.starts_with(b"<?xml") {
        return None;
    }
    let end = xml.windows(2).position(|w| w == b"?>")?;
    let decl = String::from_utf8_lossy(&xml[..end]);

    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let close = value.find(quote)?;
    Some(value[..close].to_string())
}

/// Drops the XML declaration; the text is already decoded to UTF-8
fn strip_declaration(text: &str) -> &str {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return &trimmed[end + 2..];
        }
    }
    trimmed
}
