//! Recognize the named options strategy a set of legs forms.
//!
//! `classify` is pure: no I/O, no shared state, same input -> same label.
//! Legs are normalized first (dates parsed, action/type resolved), then
//! checked against an ordered rule table; the first matching rule wins and
//! anything unmatched is `Custom Strategy`.

use chrono::NaiveDate;
use std::cmp::Ordering;
use tracing::debug;

use crate::error::InvalidLegError;
use crate::types::{Action, Leg, OptionType, RawLeg, StrategyLabel};
use crate::utils::parse_expiration;

/// One named pattern. `matches` receives the legs in canonical order.
struct Rule {
    label: StrategyLabel,
    legs: usize,
    matches: fn(&[Leg]) -> bool,
}

/// Multi-leg rules in priority order. Only consulted when every leg shares
/// one expiration.
const RULES: &[Rule] = &[
    Rule {
        label: StrategyLabel::BullCallSpread,
        legs: 2,
        matches: bull_call_spread,
    },
    Rule {
        label: StrategyLabel::BearPutSpread,
        legs: 2,
        matches: bear_put_spread,
    },
    Rule {
        label: StrategyLabel::LongStraddle,
        legs: 2,
        matches: long_straddle,
    },
    Rule {
        label: StrategyLabel::LongStrangle,
        legs: 2,
        matches: long_strangle,
    },
    Rule {
        label: StrategyLabel::IronCondor,
        legs: 4,
        matches: iron_condor,
    },
];

pub fn classify(raw: &[RawLeg]) -> Result<StrategyLabel, InvalidLegError> {
    if raw.is_empty() {
        return Ok(StrategyLabel::NoLegs);
    }
    let legs = match normalize(raw)? {
        Some(legs) => legs,
        None => return Ok(StrategyLabel::InvalidExpirationDate),
    };
    let label = classify_legs(&legs);
    debug!("classified {} legs as {}", legs.len(), label);
    Ok(label)
}

/// Resolve every raw leg. `Ok(None)` means some expiration did not parse.
///
/// Dates are checked across all legs before action/type, so a set with both
/// defects reports the data-quality outcome.
pub fn normalize(raw: &[RawLeg]) -> Result<Option<Vec<Leg>>, InvalidLegError> {
    let mut dates = Vec::with_capacity(raw.len());
    for leg in raw {
        match parse_expiration(&leg.expiration) {
            Some(d) => dates.push(d),
            None => return Ok(None),
        }
    }

    raw.iter()
        .zip(dates)
        .enumerate()
        .map(|(index, (leg, expiration))| normalize_leg(index, leg, expiration))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn normalize_leg(index: usize, leg: &RawLeg, expiration: NaiveDate) -> Result<Leg, InvalidLegError> {
    let action_raw = leg.action.as_deref().filter(|s| !s.trim().is_empty()).ok_or(
        InvalidLegError::MissingField {
            index,
            field: "action",
        },
    )?;
    let type_raw = leg
        .option_type
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(InvalidLegError::MissingField {
            index,
            field: "option_type",
        })?;

    let action = Action::parse(action_raw).ok_or_else(|| InvalidLegError::UnknownAction {
        index,
        value: action_raw.to_string(),
    })?;
    let option_type =
        OptionType::parse(type_raw).ok_or_else(|| InvalidLegError::UnknownOptionType {
            index,
            value: type_raw.to_string(),
        })?;

    Ok(Leg {
        action,
        option_type,
        quantity: leg.quantity,
        expiration,
        strike: leg.strike,
        premium: leg.premium,
    })
}

/// Classify already-normalized legs.
pub fn classify_legs(legs: &[Leg]) -> StrategyLabel {
    match legs {
        [] => StrategyLabel::NoLegs,
        [leg] => single_leg(leg),
        _ if !same_expiration(legs) => StrategyLabel::CustomStrategy,
        _ => {
            let canonical = canonical_order(legs);
            RULES
                .iter()
                .filter(|r| r.legs == canonical.len())
                .find(|r| (r.matches)(&canonical))
                .map(|r| r.label)
                .unwrap_or(StrategyLabel::CustomStrategy)
        }
    }
}

fn single_leg(leg: &Leg) -> StrategyLabel {
    match (leg.action, leg.option_type) {
        (Action::Buy, OptionType::Call) => StrategyLabel::LongCall,
        (Action::Sell, OptionType::Call) => StrategyLabel::ShortCall,
        (Action::Buy, OptionType::Put) => StrategyLabel::LongPut,
        (Action::Sell, OptionType::Put) => StrategyLabel::ShortPut,
    }
}

/// True when every leg expires on the first leg's date.
pub fn same_expiration(legs: &[Leg]) -> bool {
    match legs.split_first() {
        Some((first, rest)) => rest.iter().all(|l| l.expiration == first.expiration),
        None => true,
    }
}

/// Ascending strike; four-leg sets break strike ties on the option type text.
fn canonical_order(legs: &[Leg]) -> Vec<Leg> {
    let mut sorted = legs.to_vec();
    if sorted.len() == 4 {
        sorted.sort_by(|a, b| {
            by_strike(a, b).then_with(|| a.option_type.as_str().cmp(b.option_type.as_str()))
        });
    } else {
        sorted.sort_by(by_strike);
    }
    sorted
}

fn by_strike(a: &Leg, b: &Leg) -> Ordering {
    a.strike.total_cmp(&b.strike)
}

fn bull_call_spread(legs: &[Leg]) -> bool {
    let [low, high] = legs else { return false };
    low.is(Action::Buy, OptionType::Call)
        && high.is(Action::Sell, OptionType::Call)
        && low.strike < high.strike
}

// Buy the lower-strike put, sell the higher one. The inverse assignment
// deliberately does not match.
fn bear_put_spread(legs: &[Leg]) -> bool {
    let [low, high] = legs else { return false };
    low.is(Action::Buy, OptionType::Put)
        && high.is(Action::Sell, OptionType::Put)
        && low.strike < high.strike
}

fn bought_call_and_put(a: &Leg, b: &Leg) -> bool {
    (a.is(Action::Buy, OptionType::Call) && b.is(Action::Buy, OptionType::Put))
        || (a.is(Action::Buy, OptionType::Put) && b.is(Action::Buy, OptionType::Call))
}

fn long_straddle(legs: &[Leg]) -> bool {
    let [a, b] = legs else { return false };
    bought_call_and_put(a, b) && a.strike == b.strike
}

fn long_strangle(legs: &[Leg]) -> bool {
    let [a, b] = legs else { return false };
    bought_call_and_put(a, b) && a.strike != b.strike
}

fn iron_condor(legs: &[Leg]) -> bool {
    let [p1, p2, p3, p4] = legs else { return false };
    p1.is(Action::Sell, OptionType::Put)
        && p2.is(Action::Buy, OptionType::Put)
        && p3.is(Action::Buy, OptionType::Call)
        && p4.is(Action::Sell, OptionType::Call)
        && p1.strike < p2.strike
        && p2.strike < p3.strike
        && p3.strike < p4.strike
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EXP: &str = "2025-06-20";

    fn leg(action: &str, ty: &str, strike: f64) -> RawLeg {
        leg_exp(action, ty, strike, EXP)
    }

    fn leg_exp(action: &str, ty: &str, strike: f64, exp: &str) -> RawLeg {
        RawLeg {
            action: Some(action.to_string()),
            option_type: Some(ty.to_string()),
            quantity: 1,
            expiration: exp.to_string(),
            strike,
            premium: 1.0,
        }
    }

    fn label(legs: &[RawLeg]) -> StrategyLabel {
        classify(legs).expect("valid legs")
    }

    fn iron_condor_legs() -> Vec<RawLeg> {
        vec![
            leg("SELL", "PUT", 90.0),
            leg("BUY", "PUT", 95.0),
            leg("BUY", "CALL", 105.0),
            leg("SELL", "CALL", 110.0),
        ]
    }

    // ---------- Edge outcomes ----------

    #[test]
    fn empty_set_is_no_legs() {
        assert_eq!(label(&[]), StrategyLabel::NoLegs);
    }

    #[test]
    fn unparseable_date_is_reported_not_raised() {
        let legs = vec![leg_exp("BUY", "CALL", 100.0, "not-a-date")];
        assert_eq!(classify(&legs), Ok(StrategyLabel::InvalidExpirationDate));
        assert!(StrategyLabel::InvalidExpirationDate.is_data_quality_outcome());
    }

    #[test]
    fn bad_date_wins_over_bad_action() {
        let legs = vec![
            leg("HOLD", "CALL", 100.0),
            leg_exp("BUY", "CALL", 110.0, "2025-13-40"),
        ];
        assert_eq!(classify(&legs), Ok(StrategyLabel::InvalidExpirationDate));
    }

    #[test]
    fn unknown_action_is_an_error() {
        let legs = vec![leg("BUY", "CALL", 100.0), leg("hold", "CALL", 110.0)];
        assert_eq!(
            classify(&legs),
            Err(InvalidLegError::UnknownAction {
                index: 1,
                value: "hold".into()
            })
        );
    }

    #[test]
    fn missing_fields_are_errors() {
        let mut l = leg("BUY", "CALL", 100.0);
        l.action = None;
        assert_eq!(
            classify(&[l]),
            Err(InvalidLegError::MissingField {
                index: 0,
                field: "action"
            })
        );

        let mut l = leg("BUY", "CALL", 100.0);
        l.option_type = Some("  ".into());
        assert_eq!(
            classify(&[l]),
            Err(InvalidLegError::MissingField {
                index: 0,
                field: "option_type"
            })
        );
    }

    #[test]
    fn unknown_option_type_is_an_error() {
        let legs = vec![leg("BUY", "future", 100.0)];
        assert!(matches!(
            classify(&legs),
            Err(InvalidLegError::UnknownOptionType { index: 0, .. })
        ));
    }

    // ---------- Single leg ----------

    #[test]
    fn single_legs() {
        assert_eq!(label(&[leg("buy", "call", 100.0)]), StrategyLabel::LongCall);
        assert_eq!(label(&[leg("SELL", "Call", 100.0)]), StrategyLabel::ShortCall);
        assert_eq!(label(&[leg("Buy", "PUT", 100.0)]), StrategyLabel::LongPut);
        assert_eq!(label(&[leg("sell", "put", 100.0)]), StrategyLabel::ShortPut);
    }

    // ---------- Two legs ----------

    #[test]
    fn bull_call_spread_either_order() {
        let legs = vec![leg("BUY", "CALL", 100.0), leg("SELL", "CALL", 110.0)];
        assert_eq!(label(&legs), StrategyLabel::BullCallSpread);
        let rev = vec![legs[1].clone(), legs[0].clone()];
        assert_eq!(label(&rev), StrategyLabel::BullCallSpread);
    }

    #[test]
    fn inverted_call_spread_is_custom() {
        let legs = vec![leg("SELL", "CALL", 100.0), leg("BUY", "CALL", 110.0)];
        assert_eq!(label(&legs), StrategyLabel::CustomStrategy);
    }

    #[test]
    fn bear_put_spread_only_in_stated_orientation() {
        let legs = vec![leg("SELL", "PUT", 110.0), leg("BUY", "PUT", 100.0)];
        assert_eq!(label(&legs), StrategyLabel::BearPutSpread);

        let inverse = vec![leg("BUY", "PUT", 110.0), leg("SELL", "PUT", 100.0)];
        assert_eq!(label(&inverse), StrategyLabel::CustomStrategy);
    }

    #[test]
    fn straddle_then_strangle() {
        let legs = vec![leg("BUY", "CALL", 100.0), leg("BUY", "PUT", 100.0)];
        assert_eq!(label(&legs), StrategyLabel::LongStraddle);

        let call_moved = vec![leg("BUY", "CALL", 105.0), leg("BUY", "PUT", 100.0)];
        assert_eq!(label(&call_moved), StrategyLabel::LongStrangle);

        let put_moved = vec![leg("BUY", "CALL", 100.0), leg("BUY", "PUT", 105.0)];
        assert_eq!(label(&put_moved), StrategyLabel::LongStrangle);
    }

    #[test]
    fn sold_straddle_is_custom() {
        let legs = vec![leg("SELL", "CALL", 100.0), leg("SELL", "PUT", 100.0)];
        assert_eq!(label(&legs), StrategyLabel::CustomStrategy);
    }

    #[test]
    fn equal_strike_call_spread_is_custom() {
        let legs = vec![leg("BUY", "CALL", 100.0), leg("SELL", "CALL", 100.0)];
        assert_eq!(label(&legs), StrategyLabel::CustomStrategy);
    }

    #[test]
    fn mismatched_expirations_never_match_named_patterns() {
        let legs = vec![
            leg_exp("BUY", "CALL", 100.0, "2025-06-20"),
            leg_exp("SELL", "CALL", 110.0, "2025-07-18"),
        ];
        assert_eq!(label(&legs), StrategyLabel::CustomStrategy);
    }

    // ---------- Four legs ----------

    #[test]
    fn iron_condor_matches() {
        assert_eq!(label(&iron_condor_legs()), StrategyLabel::IronCondor);
    }

    #[test]
    fn iron_condor_with_swapped_roles_is_custom() {
        let legs = vec![
            leg("SELL", "PUT", 90.0),
            leg("BUY", "CALL", 95.0),
            leg("BUY", "PUT", 105.0),
            leg("SELL", "CALL", 110.0),
        ];
        assert_eq!(label(&legs), StrategyLabel::CustomStrategy);
    }

    #[test]
    fn iron_condor_needs_distinct_strikes() {
        let legs = vec![
            leg("SELL", "PUT", 90.0),
            leg("BUY", "PUT", 100.0),
            leg("BUY", "CALL", 100.0),
            leg("SELL", "CALL", 110.0),
        ];
        assert_eq!(label(&legs), StrategyLabel::CustomStrategy);
    }

    #[test]
    fn iron_condor_across_expirations_is_custom() {
        let mut legs = iron_condor_legs();
        legs[3].expiration = "2025-07-18".into();
        assert_eq!(label(&legs), StrategyLabel::CustomStrategy);
    }

    #[test]
    fn other_sizes_fall_back() {
        let three = vec![
            leg("BUY", "CALL", 100.0),
            leg("SELL", "CALL", 110.0),
            leg("SELL", "CALL", 120.0),
        ];
        assert_eq!(label(&three), StrategyLabel::CustomStrategy);

        let mut five = iron_condor_legs();
        five.push(leg("BUY", "CALL", 120.0));
        assert_eq!(label(&five), StrategyLabel::CustomStrategy);
    }

    #[test]
    fn canonical_order_breaks_strike_ties_call_first() {
        let legs: Vec<Leg> = normalize(&[
            leg("BUY", "PUT", 100.0),
            leg("BUY", "CALL", 100.0),
            leg("SELL", "PUT", 90.0),
            leg("SELL", "CALL", 110.0),
        ])
        .unwrap()
        .unwrap();
        let sorted = canonical_order(&legs);
        assert_eq!(sorted[0].strike, 90.0);
        assert_eq!(sorted[1].option_type, OptionType::Call);
        assert_eq!(sorted[2].option_type, OptionType::Put);
        assert_eq!(sorted[3].strike, 110.0);
    }

    // ---------- Properties ----------

    fn arb_leg() -> impl Strategy<Value = RawLeg> {
        (
            prop::sample::select(vec!["BUY", "SELL", "buy", "Sell"]),
            prop::sample::select(vec!["CALL", "PUT", "call", "Put"]),
            prop::sample::select(vec![90.0, 95.0, 100.0, 105.0, 110.0]),
            prop::sample::select(vec!["2025-06-20", "2025-07-18"]),
        )
            .prop_map(|(a, t, k, e)| leg_exp(a, t, k, e))
    }

    proptest! {
        #[test]
        fn single_leg_label_follows_action(
            a in prop::sample::select(vec!["BUY", "SELL"]),
            t in prop::sample::select(vec!["CALL", "PUT"]),
            k in 1.0f64..500.0,
        ) {
            let got = label(&[leg(a, t, k)]);
            let expected = format!("{} {}", if a == "BUY" { "Long" } else { "Short" },
                if t == "CALL" { "Call" } else { "Put" });
            prop_assert_eq!(got.as_str(), expected.as_str());
        }

        #[test]
        fn classification_is_idempotent(legs in prop::collection::vec(arb_leg(), 0..6)) {
            prop_assert_eq!(classify(&legs), classify(&legs));
        }

        #[test]
        fn permuting_legs_never_changes_label(
            (legs, shuffled) in prop::collection::vec(arb_leg(), 1..6)
                .prop_flat_map(|legs| (Just(legs.clone()), Just(legs).prop_shuffle())),
        ) {
            prop_assert_eq!(classify(&legs), classify(&shuffled));
        }

        #[test]
        fn iron_condor_is_order_invariant(perm in Just(iron_condor_legs()).prop_shuffle()) {
            prop_assert_eq!(label(&perm), StrategyLabel::IronCondor);
        }
    }
}
