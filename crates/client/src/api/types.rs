//! Wire types for the cart backend API.
//!
//! Field names follow the backend's camelCase JSON contract. The bill is
//! server-computed and treated as opaque apart from display formatting;
//! `totalFormatted` in particular is rendered verbatim, never recomputed.

use serde::{Deserialize, Serialize};

use greengrocer_core::{Currency, Price};

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Absent or empty means the login cannot be completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Response of `GET /api/cart`: the server-authoritative cart snapshot.
///
/// Entry order is server-defined; the client replaces its copy wholesale on
/// every reload and never patches it in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartContents {
    #[serde(default)]
    pub cart: Vec<String>,
}

/// Body of `POST /api/cart/items`.
#[derive(Debug, Serialize)]
pub struct AddItemRequest<'a> {
    pub item: &'a str,
}

/// Response of `POST /api/cart/total`: the server-computed bill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    /// ISO 4217 currency code for every amount in the bill.
    pub currency: String,
    /// Grand total in minor units.
    #[serde(default)]
    pub total_pence: i64,
    /// Server-formatted grand total, displayed verbatim.
    pub total_formatted: String,
    #[serde(default)]
    pub lines: Vec<BillLine>,
}

impl Bill {
    /// The bill's currency, defaulting when the code is unrecognized.
    #[must_use]
    pub fn currency_code(&self) -> Currency {
        Currency::from_code(&self.currency).unwrap_or_default()
    }
}

/// One priced line of a [`Bill`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BillLine {
    pub item: String,
    /// Units in the cart.
    pub qty: u32,
    /// Units actually charged after server-side offers.
    pub chargeable_qty: u32,
    pub unit_price_pence: i64,
    pub line_total_pence: i64,
}

impl BillLine {
    /// Unit price as a displayable amount.
    #[must_use]
    pub const fn unit_price(&self, currency: Currency) -> Price {
        Price::from_minor_units(self.unit_price_pence, currency)
    }

    /// Line total as a displayable amount.
    #[must_use]
    pub const fn line_total(&self, currency: Currency) -> Price {
        Price::from_minor_units(self.line_total_pence, currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_deserializes_camel_case() {
        let bill: Bill = serde_json::from_str(
            r#"{
                "currency": "GBP",
                "totalPence": 50,
                "totalFormatted": "£0.50",
                "lines": [{
                    "item": "Apple",
                    "qty": 1,
                    "chargeableQty": 1,
                    "unitPricePence": 50,
                    "lineTotalPence": 50
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(bill.currency_code(), Currency::GBP);
        assert_eq!(bill.total_pence, 50);
        assert_eq!(bill.total_formatted, "£0.50");
        assert_eq!(bill.lines.len(), 1);
        let line = &bill.lines[0];
        assert_eq!(line.item, "Apple");
        assert_eq!(line.unit_price(Currency::GBP).to_string(), "£0.50");
    }

    #[test]
    fn test_unknown_currency_falls_back() {
        let bill: Bill = serde_json::from_str(
            r#"{"currency": "ZZZ", "totalFormatted": "0.00"}"#,
        )
        .unwrap();
        assert_eq!(bill.currency_code(), Currency::GBP);
        assert!(bill.lines.is_empty());
    }

    #[test]
    fn test_cart_contents_tolerates_missing_field() {
        let contents: CartContents = serde_json::from_str("{}").unwrap();
        assert!(contents.cart.is_empty());
    }

    #[test]
    fn test_login_response_tolerates_missing_token() {
        let response: LoginResponse = serde_json::from_str("{}").unwrap();
        assert!(response.access_token.is_none());
    }
}
