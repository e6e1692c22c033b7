//! Remote quote service endpoint shared by the poller and configuration.

/// Placeholder substituted with the encoded symbol list.
pub const SYMBOLS_PLACEHOLDER: &str = "{symbols}";

/// Default batched quote endpoint (YQL `yahoo.finance.quotes` table).
pub const DEFAULT_QUOTE_URL: &str = "https://query.yahooapis.com/v1/public/yql?q=select%20*%20from%20\
yahoo.finance.quotes%20where%20symbol%20in%20({symbols})&format=json&env=store%3A%2F%2F\
datatables.org%2Falltableswithkeys&callback=";

/// Build the request URL for `symbols_csv` (the serialized symbol list).
///
/// The list is wrapped in double quotes, percent-encoded and substituted for
/// [`SYMBOLS_PLACEHOLDER`].
pub fn quote_url(template: &str, symbols_csv: &str) -> String {
    let quoted = format!("\"{}\"", symbols_csv);
    template.replace(SYMBOLS_PLACEHOLDER, &urlencoding::encode(&quoted))
}

/// Whether a template can carry the symbol list.
pub fn is_valid_template(template: &str) -> bool {
    template.contains(SYMBOLS_PLACEHOLDER)
}
