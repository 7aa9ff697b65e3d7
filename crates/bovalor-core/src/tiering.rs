//! Qualitative tiering of derived ratios.
//!
//! Each classifier is a pure, total function over `Option<f64>`: every input,
//! null included, maps to a tier. Boundary values fall into the middle tier.
//!
//! | Ratio | Green | Yellow | Red |
//! |-------|-------|--------|-----|
//! | P/E | < 10 | 10..=20 | > 20 |
//! | Dividend yield % | > 5 | 2..=5 | < 2 |
//! | EBITDA value | > 0 | — | <= 0 |
//! | EBITDA margin % | > 30 | 10..=30 | < 10 |
//! | P/B | < 1 | 1..=2 | > 2 |

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Display color bucket attached to a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorClass {
    Green,
    Yellow,
    Red,
    Neutral,
}

/// Qualitative tier for one derived ratio value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Undervalued,
    Moderate,
    Overvalued,
    High,
    Low,
    Positive,
    Negative,
    /// Null input. Renders as "N/A", never an error.
    Unavailable,
}

impl Tier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Undervalued => "undervalued",
            Self::Moderate => "moderate",
            Self::Overvalued => "overvalued",
            Self::High => "high",
            Self::Low => "low",
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Unavailable => "unavailable",
        }
    }

    pub const fn color(self) -> ColorClass {
        match self {
            Self::Undervalued | Self::High | Self::Positive => ColorClass::Green,
            Self::Moderate => ColorClass::Yellow,
            Self::Overvalued | Self::Low | Self::Negative => ColorClass::Red,
            Self::Unavailable => ColorClass::Neutral,
        }
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a price/earnings ratio.
pub fn price_earnings_tier(value: Option<f64>) -> Tier {
    match value {
        None => Tier::Unavailable,
        Some(pe) if pe < 10.0 => Tier::Undervalued,
        Some(pe) if pe <= 20.0 => Tier::Moderate,
        Some(_) => Tier::Overvalued,
    }
}

/// Classify a dividend yield expressed as a percentage.
pub fn dividend_yield_tier(value: Option<f64>) -> Tier {
    match value {
        None => Tier::Unavailable,
        Some(dy) if dy > 5.0 => Tier::High,
        Some(dy) if dy >= 2.0 => Tier::Moderate,
        Some(_) => Tier::Low,
    }
}

/// Classify a derived EBITDA value by sign.
pub fn ebitda_tier(value: Option<f64>) -> Tier {
    match value {
        None => Tier::Unavailable,
        Some(ebitda) if ebitda > 0.0 => Tier::Positive,
        Some(_) => Tier::Negative,
    }
}

/// Classify an EBITDA margin given the provider's raw fraction.
///
/// The raw margin is percentage-scaled before the thresholds apply: a raw
/// 0.32 reads as 32.0 and tiers as high.
pub fn ebitda_margin_tier(raw_margin: Option<f64>) -> Tier {
    match raw_margin.map(|m| m * 100.0) {
        None => Tier::Unavailable,
        Some(margin) if margin > 30.0 => Tier::High,
        Some(margin) if margin >= 10.0 => Tier::Moderate,
        Some(_) => Tier::Low,
    }
}

/// Classify a price/book ratio.
pub fn price_book_tier(value: Option<f64>) -> Tier {
    match value {
        None => Tier::Unavailable,
        Some(pvp) if pvp < 1.0 => Tier::Undervalued,
        Some(pvp) if pvp <= 2.0 => Tier::Moderate,
        Some(_) => Tier::Overvalued,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_earnings_boundaries_fall_to_the_middle_tier() {
        assert_eq!(price_earnings_tier(Some(9.99)), Tier::Undervalued);
        assert_eq!(price_earnings_tier(Some(10.0)), Tier::Moderate);
        assert_eq!(price_earnings_tier(Some(20.0)), Tier::Moderate);
        assert_eq!(price_earnings_tier(Some(20.01)), Tier::Overvalued);
        assert_eq!(price_earnings_tier(None), Tier::Unavailable);
    }

    #[test]
    fn dividend_yield_boundaries() {
        assert_eq!(dividend_yield_tier(Some(5.01)), Tier::High);
        assert_eq!(dividend_yield_tier(Some(5.0)), Tier::Moderate);
        assert_eq!(dividend_yield_tier(Some(2.0)), Tier::Moderate);
        assert_eq!(dividend_yield_tier(Some(1.99)), Tier::Low);
        assert_eq!(dividend_yield_tier(None), Tier::Unavailable);
    }

    #[test]
    fn ebitda_zero_is_negative() {
        assert_eq!(ebitda_tier(Some(1.0)), Tier::Positive);
        assert_eq!(ebitda_tier(Some(0.0)), Tier::Negative);
        assert_eq!(ebitda_tier(Some(-5.0)), Tier::Negative);
        assert_eq!(ebitda_tier(None), Tier::Unavailable);
    }

    #[test]
    fn margin_is_scaled_before_tiering() {
        assert_eq!(ebitda_margin_tier(Some(0.32)), Tier::High);
        assert_eq!(ebitda_margin_tier(Some(0.30)), Tier::Moderate);
        assert_eq!(ebitda_margin_tier(Some(0.10)), Tier::Moderate);
        assert_eq!(ebitda_margin_tier(Some(0.09)), Tier::Low);
        assert_eq!(ebitda_margin_tier(None), Tier::Unavailable);
    }

    #[test]
    fn price_book_boundaries() {
        assert_eq!(price_book_tier(Some(0.99)), Tier::Undervalued);
        assert_eq!(price_book_tier(Some(1.0)), Tier::Moderate);
        assert_eq!(price_book_tier(Some(2.0)), Tier::Moderate);
        assert_eq!(price_book_tier(Some(2.01)), Tier::Overvalued);
    }

    #[test]
    fn colors_follow_tiers() {
        assert_eq!(Tier::Undervalued.color(), ColorClass::Green);
        assert_eq!(Tier::Moderate.color(), ColorClass::Yellow);
        assert_eq!(Tier::Overvalued.color(), ColorClass::Red);
        assert_eq!(Tier::Unavailable.color(), ColorClass::Neutral);
    }
}
