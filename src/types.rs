//! Core domain types for option legs, trades and detected strategies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    /// Case-insensitive, whitespace tolerant.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(Action::Buy),
            "SELL" => Some(Action::Sell),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CALL" => Some(OptionType::Call),
            "PUT" => Some(OptionType::Put),
            _ => None,
        }
    }

    /// Upper-case text form. Four-leg canonical ordering compares on this.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "CALL",
            OptionType::Put => "PUT",
        }
    }
}

/// A leg as submitted by the caller: numbers already coerced, text fields raw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawLeg {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub option_type: Option<String>,
    pub quantity: u32,
    pub expiration: String, // ISO YYYY-MM-DD
    pub strike: f64,
    pub premium: f64,
}

/// A leg after normalization; what the classifier rules look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub action: Action,
    pub option_type: OptionType,
    pub quantity: u32,
    pub expiration: NaiveDate,
    pub strike: f64,
    pub premium: f64,
}

impl Leg {
    pub fn is(&self, action: Action, option_type: OptionType) -> bool {
        self.action == action && self.option_type == option_type
    }
}

/// Every outcome the classifier can report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StrategyLabel {
    #[serde(rename = "Long Call")]
    LongCall,
    #[serde(rename = "Short Call")]
    ShortCall,
    #[serde(rename = "Long Put")]
    LongPut,
    #[serde(rename = "Short Put")]
    ShortPut,
    #[serde(rename = "Bull Call Spread")]
    BullCallSpread,
    #[serde(rename = "Bear Put Spread")]
    BearPutSpread,
    #[serde(rename = "Long Straddle")]
    LongStraddle,
    #[serde(rename = "Long Strangle")]
    LongStrangle,
    #[serde(rename = "Iron Condor")]
    IronCondor,
    #[serde(rename = "Custom Strategy")]
    CustomStrategy,
    #[serde(rename = "No Legs")]
    NoLegs,
    #[serde(rename = "Invalid Expiration Date")]
    InvalidExpirationDate,
}

impl StrategyLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyLabel::LongCall => "Long Call",
            StrategyLabel::ShortCall => "Short Call",
            StrategyLabel::LongPut => "Long Put",
            StrategyLabel::ShortPut => "Short Put",
            StrategyLabel::BullCallSpread => "Bull Call Spread",
            StrategyLabel::BearPutSpread => "Bear Put Spread",
            StrategyLabel::LongStraddle => "Long Straddle",
            StrategyLabel::LongStrangle => "Long Strangle",
            StrategyLabel::IronCondor => "Iron Condor",
            StrategyLabel::CustomStrategy => "Custom Strategy",
            StrategyLabel::NoLegs => "No Legs",
            StrategyLabel::InvalidExpirationDate => "Invalid Expiration Date",
        }
    }

    /// Data-quality outcomes are reported, not stored as a strategy.
    pub fn is_data_quality_outcome(&self) -> bool {
        matches!(
            self,
            StrategyLabel::NoLegs | StrategyLabel::InvalidExpirationDate
        )
    }
}

impl fmt::Display for StrategyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One trade as handed to the journal, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSubmission {
    pub underlying: String,
    #[serde(default)]
    pub entry_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub legs: Vec<RawLeg>,
    #[serde(default)]
    pub attachments: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredLeg {
    pub action: Action,
    pub option_type: OptionType,
    pub quantity: u32,
    pub expiration: NaiveDate,
    pub strike: f64,
    pub premium: f64,
}

impl From<Leg> for StoredLeg {
    fn from(l: Leg) -> Self {
        StoredLeg {
            action: l.action,
            option_type: l.option_type,
            quantity: l.quantity,
            expiration: l.expiration,
            strike: l.strike,
            premium: l.premium,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    pub id: u64,
    pub underlying: String,
    pub entry_time: DateTime<Utc>,
    pub justification: Option<String>,
    pub strategy: StrategyLabel,
    pub legs: Vec<StoredLeg>,
    /// Paths of attachment copies owned by this trade.
    pub attachments: Vec<PathBuf>,
}

impl TradeRecord {
    /// Earliest leg expiration; used to group trades for display.
    pub fn earliest_expiration(&self) -> Option<NaiveDate> {
        self.legs.iter().map(|l| l.expiration).min()
    }
}
