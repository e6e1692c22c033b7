//! Batched quote requests against the remote quote service.
//!
//! The poller depends on the [`QuoteSource`] trait only; [`HttpQuoteClient`] is
//! the production implementation issuing one blocking HTTP GET per cycle.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use stock_common::endpoint;

use crate::error::StreamError;
use crate::model::quote::{parse_quote_response, QuoteRecord};
use crate::result::Result;

/// Source of quotes for a serialized symbol list.
pub trait QuoteSource: Send + Sync {
    /// Fetch quotes for `symbols_csv` (symbols joined by `","`).
    fn fetch(&self, symbols_csv: &str) -> Result<Vec<QuoteRecord>>;
}

/// Blocking HTTP client for the quote service.
pub struct HttpQuoteClient {
    http: Client,
    url_template: String,
}

impl HttpQuoteClient {
    /// Client for `url_template` (must contain `{symbols}`) with a per-request timeout.
    pub fn new(url_template: &str, timeout: Duration) -> Result<Self> {
        if !endpoint::is_valid_template(url_template) {
            return Err(StreamError::Config(format!(
                "quote url must contain {}",
                endpoint::SYMBOLS_PLACEHOLDER
            )));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url_template: url_template.to_string(),
        })
    }

    /// Full request URL for `symbols_csv`.
    pub fn url_for(&self, symbols_csv: &str) -> String {
        endpoint::quote_url(&self.url_template, symbols_csv)
    }
}

impl QuoteSource for HttpQuoteClient {
    fn fetch(&self, symbols_csv: &str) -> Result<Vec<QuoteRecord>> {
        let url = self.url_for(symbols_csv);
        debug!("GET {}", url);
        let body = self.http.get(&url).send()?.error_for_status()?.text()?;
        parse_quote_response(&body)
    }
}
