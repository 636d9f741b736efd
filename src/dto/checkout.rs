use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::cart::CartLine;
use crate::session::{PaymentInfo, ShippingInfo};

/// Shipping form as submitted. Everything arrives optional; `validate`
/// enforces the required set and reports missing fields individually.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ShippingRequest {
    pub full_name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

fn required(value: &Option<String>, name: &str, missing: &mut Vec<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            missing.push(name.to_string());
            String::new()
        }
    }
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ShippingRequest {
    pub fn validate(&self) -> Result<ShippingInfo, Vec<String>> {
        let mut missing = Vec::new();

        let full_name = required(&self.full_name, "full_name", &mut missing);
        let address_line1 = required(&self.address_line1, "address_line1", &mut missing);
        let city = required(&self.city, "city", &mut missing);
        let state = required(&self.state, "state", &mut missing);
        let postal_code = required(&self.postal_code, "postal_code", &mut missing);
        let country = required(&self.country, "country", &mut missing);

        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(ShippingInfo {
            full_name,
            address_line1,
            address_line2: optional(&self.address_line2),
            city,
            state,
            postal_code,
            country,
            phone: optional(&self.phone),
        })
    }
}

/// Pre-filled values for the shipping form, taken from the user's profile.
#[derive(Debug, Serialize, ToSchema)]
pub struct ShippingForm {
    pub full_name: String,
    pub phone: Option<String>,
    pub country: String,
    /// Previously submitted shipping record, if the visitor stepped back.
    pub saved: Option<ShippingInfo>,
}

/// Payment form as submitted. Card fields are checked for presence when the
/// method is `credit_card` and then dropped; nothing here is stored.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PaymentRequest {
    pub payment_method: Option<String>,
    pub card_name: Option<String>,
    pub card_number: Option<String>,
    pub expiry_month: Option<String>,
    pub expiry_year: Option<String>,
    pub cvv: Option<String>,
}

pub enum PaymentFormError {
    MethodMissing,
    MissingFields(Vec<String>),
}

impl PaymentRequest {
    pub fn validate(&self) -> Result<PaymentInfo, PaymentFormError> {
        let method = match self.payment_method.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => return Err(PaymentFormError::MethodMissing),
        };

        if method == "credit_card" {
            let mut missing = Vec::new();
            required(&self.card_name, "card_name", &mut missing);
            required(&self.card_number, "card_number", &mut missing);
            required(&self.expiry_month, "expiry_month", &mut missing);
            required(&self.expiry_year, "expiry_year", &mut missing);
            required(&self.cvv, "cvv", &mut missing);
            if !missing.is_empty() {
                return Err(PaymentFormError::MissingFields(missing));
            }
        }

        Ok(PaymentInfo {
            payment_method: method,
        })
    }
}

/// Review step: the cart priced out with tax.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutReview {
    pub items: Vec<CartLine>,
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
}

/// Totals echoed back on the payment step.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentForm {
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
}

/// Everything the confirmation step shows before the final commit.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutSummary {
    pub items: Vec<CartLine>,
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
    pub shipping: ShippingInfo,
    pub payment_method: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_shipping() -> ShippingRequest {
        ShippingRequest {
            full_name: Some("Jane Doe".into()),
            address_line1: Some("1 Main St".into()),
            address_line2: Some("  ".into()),
            city: Some("Springfield".into()),
            state: Some("IL".into()),
            postal_code: Some("62704".into()),
            country: Some("US".into()),
            phone: None,
        }
    }

    #[test]
    fn shipping_missing_fields_are_reported_individually() {
        let request = ShippingRequest {
            full_name: Some("Jane Doe".into()),
            city: Some("   ".into()),
            ..Default::default()
        };
        let missing = request.validate().unwrap_err();
        assert_eq!(
            missing,
            vec!["address_line1", "city", "state", "postal_code", "country"]
        );
    }

    #[test]
    fn shipping_values_are_trimmed_and_blanks_dropped() {
        let mut request = complete_shipping();
        request.full_name = Some("  Jane Doe  ".into());
        let info = request.validate().unwrap();
        assert_eq!(info.full_name, "Jane Doe");
        assert_eq!(info.address_line2, None);
        assert_eq!(info.phone, None);
    }

    #[test]
    fn payment_requires_a_method() {
        let request = PaymentRequest::default();
        assert!(matches!(
            request.validate(),
            Err(PaymentFormError::MethodMissing)
        ));
    }

    #[test]
    fn credit_card_requires_all_card_fields_present() {
        let request = PaymentRequest {
            payment_method: Some("credit_card".into()),
            card_name: Some("Jane Doe".into()),
            ..Default::default()
        };
        match request.validate() {
            Err(PaymentFormError::MissingFields(missing)) => {
                assert_eq!(
                    missing,
                    vec!["card_number", "expiry_month", "expiry_year", "cvv"]
                );
            }
            _ => panic!("expected missing card fields"),
        }
    }

    #[test]
    fn only_the_method_tag_survives_validation() {
        let request = PaymentRequest {
            payment_method: Some("credit_card".into()),
            card_name: Some("Jane Doe".into()),
            card_number: Some("4111111111111111".into()),
            expiry_month: Some("12".into()),
            expiry_year: Some("2030".into()),
            cvv: Some("123".into()),
        };
        let info = request.validate().ok().unwrap();
        assert_eq!(info.payment_method, "credit_card");
    }

    #[test]
    fn non_card_methods_need_no_card_fields() {
        let request = PaymentRequest {
            payment_method: Some("cash_on_delivery".into()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }
}
