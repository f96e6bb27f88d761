//! Display conversions for a predicted price.

use std::fmt;

const NPR_PER_EUR: f64 = 148.0;
const USD_PER_EUR: f64 = 1.18;
const INR_PER_EUR: f64 = 88.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A predicted price in the base currency and its display conversions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub eur: f64,
    pub npr: f64,
    pub usd: f64,
    pub inr: f64,
}

impl PriceQuote {
    /// Round the base price to cents, then convert from the rounded value.
    pub fn from_base(price_eur: f64) -> Self {
        let eur = round2(price_eur);
        Self {
            eur,
            npr: round2(eur * NPR_PER_EUR),
            usd: round2(eur * USD_PER_EUR),
            inr: round2(eur * INR_PER_EUR),
        }
    }
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The predicted price of the laptop is:")?;
        writeln!(f, "  EURO: {:.2}", self.eur)?;
        writeln!(f, "  NPR:  {:.2}", self.npr)?;
        writeln!(f, "  USD:  {:.2}", self.usd)?;
        write!(f, "  INR:  {:.2}", self.inr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_conversions() {
        let quote = PriceQuote::from_base(1000.0);
        assert_eq!(
            quote,
            PriceQuote {
                eur: 1000.0,
                npr: 148000.0,
                usd: 1180.0,
                inr: 88000.0,
            }
        );
    }

    #[test]
    fn test_base_is_rounded_before_converting() {
        let quote = PriceQuote::from_base(999.996);
        assert_eq!(quote.eur, 1000.0);
        assert_eq!(quote.usd, 1180.0);

        let quote = PriceQuote::from_base(512.345_6);
        assert_eq!(quote.eur, 512.35);
        assert_eq!(quote.npr, 75827.8);
    }

    #[test]
    fn test_display_lists_every_currency() {
        let text = PriceQuote::from_base(10.0).to_string();
        for label in ["EURO: 10.00", "NPR:  1480.00", "USD:  11.80", "INR:  880.00"] {
            assert!(text.contains(label), "missing {label} in {text}");
        }
    }
}
