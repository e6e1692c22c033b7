//! Quote records returned by the remote quote service.
//!
//! The service answers with `{"query": {"results": {"quote": ...}}}` where
//! `quote` is a list of objects, or a single object when exactly one symbol
//! was requested. [`parse_quote_response`] normalizes both into a `Vec`.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use stock_common::quote_fields;

use crate::error::StreamError;
use crate::result::Result;

/// Quote for a single symbol.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuoteRecord {
    /// Symbol as echoed by the service.
    #[serde(rename = "Symbol", alias = "symbol")]
    pub symbol: String,
    /// Last trade price, kept in its textual form.
    #[serde(
        rename = "LastTradePriceOnly",
        alias = "lastTradePrice",
        default,
        deserialize_with = "text_or_number"
    )]
    pub last_trade_price: Option<String>,
    /// Every other field of the record, by response field name.
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

impl QuoteRecord {
    /// Build a record carrying only a symbol and a price.
    pub fn new(symbol: &str, last_trade_price: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            last_trade_price: Some(last_trade_price.to_string()),
            fields: HashMap::new(),
        }
    }

    /// Attach an extra response field.
    pub fn with_field(mut self, name: &str, value: Value) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Value of a property by its short code (see [`quote_fields::QUOTE_PROPERTIES`]).
    pub fn property(&self, code: &str) -> Option<String> {
        let name = quote_fields::property_name(code)?;
        self.fields.get(name).and_then(value_text)
    }

    /// Change since the previous close, when the service sent one.
    pub fn change(&self) -> Option<String> {
        self.property(quote_fields::CHANGE)
    }
}

#[derive(Deserialize)]
struct Envelope {
    query: QueryBody,
}

#[derive(Deserialize)]
struct QueryBody {
    #[serde(default)]
    results: Option<Results>,
}

#[derive(Deserialize)]
struct Results {
    quote: OneOrMany,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<QuoteRecord>),
    One(QuoteRecord),
}

/// Parse a quote service body into records.
///
/// Invalid JSON is a `Json` error, a body without `query.results.quote` is
/// `MalformedResponse`, and `results: null` (no symbol matched) is an empty list.
pub fn parse_quote_response(body: &str) -> Result<Vec<QuoteRecord>> {
    let value: Value = serde_json::from_str(body)?;
    let envelope: Envelope = serde_json::from_value(value)
        .map_err(|e| StreamError::MalformedResponse(e.to_string()))?;
    let records = match envelope.query.results {
        None => Vec::new(),
        Some(Results {
            quote: OneOrMany::Many(records),
        }) => records,
        Some(Results {
            quote: OneOrMany::One(record),
        }) => vec![record],
    };
    Ok(records)
}

fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_text))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
