//! Checks a submission must pass before it is classified and stored.

use crate::config::ValidationCfg;
use crate::error::JournalError;
use crate::types::TradeSubmission;

pub struct TradeValidator {
    max_legs: Option<usize>,
    require_positive_premium: bool,
}

impl TradeValidator {
    pub fn new(cfg: &ValidationCfg) -> Self {
        Self {
            max_legs: cfg.max_legs,
            require_positive_premium: cfg.require_positive_premium,
        }
    }

    pub fn pre_check(&self, sub: &TradeSubmission) -> Result<(), JournalError> {
        if sub.underlying.trim().is_empty() || sub.legs.is_empty() {
            return Err(JournalError::Validation(
                "underlying and legs are required".into(),
            ));
        }
        if let Some(max) = self.max_legs {
            if sub.legs.len() > max {
                return Err(JournalError::Validation(format!(
                    "{} legs exceeds max_legs {}",
                    sub.legs.len(),
                    max
                )));
            }
        }
        for (i, leg) in sub.legs.iter().enumerate() {
            if leg.quantity == 0 {
                return Err(JournalError::Validation(format!(
                    "leg {i}: quantity must be positive"
                )));
            }
            if !leg.strike.is_finite() || leg.strike <= 0.0 {
                return Err(JournalError::Validation(format!(
                    "leg {i}: strike {} must be positive",
                    leg.strike
                )));
            }
            if !leg.premium.is_finite() {
                return Err(JournalError::Validation(format!(
                    "leg {i}: premium {} is not a number",
                    leg.premium
                )));
            }
            if self.require_positive_premium && leg.premium <= 0.0 {
                return Err(JournalError::Validation(format!(
                    "leg {i}: premium {:.2} must be positive",
                    leg.premium
                )));
            }
        }
        Ok(())
    }
}
