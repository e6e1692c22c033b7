//! Short property codes of the quote service and the response field each one names.

/// Code of the change field read by the poller.
pub const CHANGE: &str = "c1";

/// Known property codes and their response field names.
pub const QUOTE_PROPERTIES: &[(&str, &str)] = &[
    ("a0", "Ask"),
    ("a2", "AverageDailyVolume"),
    ("a5", "AskSize"),
    ("b0", "Bid"),
    ("b2", "AskRealtime"),
    ("b3", "BidRealtime"),
    ("b4", "BookValuePerShare"),
    ("b6", "BidSize"),
    ("c0", "Change_ChangeInPercent"),
    ("c1", "Change"),
    ("c3", "Commission"),
    ("c4", "Currency"),
    ("c6", "ChangeRealtime"),
    ("c8", "AfterHoursChangeRealtime"),
    ("d0", "TrailingAnnualDividendYield"),
];

/// Response field name for a property code.
pub fn property_name(code: &str) -> Option<&'static str> {
    QUOTE_PROPERTIES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}
