//! Parse quick-entry trade lines.
//! Supported: `SPY: BUY 1 100C 2025-06-20 @ 2.50; SELL 1 110C 2025-06-20 @ 1.10 | thesis`.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::{RawLeg, TradeSubmission};
use crate::utils::{option_type_word, sanitize_symbol};

// Leg with strike and C/P glued: "BUY 2 150C 2025-08-15 @ 2.50"
static RE_LEG_SHORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(BUY|SELL)\s+(?:(\d+)\s+)?(\d+(?:\.\d+)?)\s*([CP])\s+(\S+)\s*@\s*(\d+(?:\.\d+)?)$")
        .expect("valid short leg pattern")
});
// Leg with the type spelled out: "SELL 1 PUT 95 2025-08-15 @ 0.80"
static RE_LEG_LONG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(BUY|SELL)\s+(?:(\d+)\s+)?(CALL|PUT)\s+(\d+(?:\.\d+)?)\s+(\S+)\s*@\s*(\d+(?:\.\d+)?)$")
        .expect("valid long leg pattern")
});
static RE_TRADE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9.]{0,9})\s*:\s*([^|]+?)\s*(?:\|\s*(.*?)\s*)?$")
        .expect("valid trade pattern")
});

/// Parse a single leg. The expiration token is kept raw so a bad date still
/// reaches the classifier.
pub fn parse_leg(text: &str) -> Option<RawLeg> {
    let t = text.trim();

    if let Some(c) = RE_LEG_SHORT.captures(t) {
        return Some(RawLeg {
            action: Some(c[1].to_ascii_uppercase()),
            option_type: option_type_word(&c[4]).map(str::to_string),
            quantity: quantity(c.get(2).map(|m| m.as_str()))?,
            expiration: c[5].to_string(),
            strike: c[3].parse().ok()?,
            premium: c[6].parse().ok()?,
        });
    }

    if let Some(c) = RE_LEG_LONG.captures(t) {
        return Some(RawLeg {
            action: Some(c[1].to_ascii_uppercase()),
            option_type: Some(c[3].to_ascii_uppercase()),
            quantity: quantity(c.get(2).map(|m| m.as_str()))?,
            expiration: c[5].to_string(),
            strike: c[4].parse().ok()?,
            premium: c[6].parse().ok()?,
        });
    }

    None
}

fn quantity(raw: Option<&str>) -> Option<u32> {
    match raw {
        Some(q) => q.parse().ok(),
        None => Some(1), // default when qty missing
    }
}

/// Parse a whole trade line. Any unparseable leg rejects the line.
pub fn parse_trade(text: &str) -> Option<TradeSubmission> {
    let c = RE_TRADE.captures(text)?;
    let underlying = sanitize_symbol(&c[1]);
    let legs = c[2]
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_leg)
        .collect::<Option<Vec<_>>>()?;
    if legs.is_empty() {
        return None;
    }
    let justification = c
        .get(3)
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty());

    Some(TradeSubmission {
        underlying,
        entry_time: None,
        justification,
        legs,
        attachments: Vec::new(),
    })
}
