//! Minor-unit prices with ISO 4217 currency codes.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in a currency's minor units (e.g. pence for GBP).
///
/// The backend always quotes amounts as minor-unit integers; this type
/// exists purely for display conversion. The server's pre-formatted bill
/// total is displayed verbatim and never reconstructed from these.
///
/// ## Examples
///
/// ```
/// use greengrocer_core::{Currency, Price};
///
/// let price = Price::from_minor_units(235, Currency::GBP);
/// assert_eq!(price.to_string(), "£2.35");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the smallest currency unit.
    minor_units: i64,
    /// ISO 4217 currency code.
    currency: Currency,
}

impl Price {
    /// Create a price from a minor-unit amount.
    #[must_use]
    pub const fn from_minor_units(minor_units: i64, currency: Currency) -> Self {
        Self {
            minor_units,
            currency,
        }
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// The price's currency.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Amount as a decimal in the currency's major unit.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.minor_units, 2)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.currency.symbol(), self.amount())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    USD,
    EUR,
    #[default]
    GBP,
    CAD,
    AUD,
}

impl Currency {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// ISO 4217 three-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// Parse a wire currency code, case-sensitively per ISO 4217.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "USD" => Some(Self::USD),
            "EUR" => Some(Self::EUR),
            "GBP" => Some(Self::GBP),
            "CAD" => Some(Self::CAD),
            "AUD" => Some(Self::AUD),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_has_two_decimal_places() {
        assert_eq!(Price::from_minor_units(50, Currency::GBP).to_string(), "£0.50");
        assert_eq!(Price::from_minor_units(235, Currency::GBP).to_string(), "£2.35");
        assert_eq!(Price::from_minor_units(100, Currency::USD).to_string(), "$1.00");
    }

    #[test]
    fn test_code_round_trip() {
        for currency in [
            Currency::USD,
            Currency::EUR,
            Currency::GBP,
            Currency::CAD,
            Currency::AUD,
        ] {
            assert_eq!(Currency::from_code(currency.code()), Some(currency));
        }
        assert_eq!(Currency::from_code("gbp"), None);
        assert_eq!(Currency::from_code("XXX"), None);
    }

    #[test]
    fn test_amount_is_major_units() {
        let price = Price::from_minor_units(235, Currency::GBP);
        assert_eq!(price.amount(), Decimal::new(235, 2));
        assert_eq!(price.minor_units(), 235);
    }
}
