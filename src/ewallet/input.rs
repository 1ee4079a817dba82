use crate::ids::WalletId;
use crate::validation::validate_top_up_payload;
use crate::{CurrencyCode, Money};

use serde_json::Value;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputParseError {
    #[error("Request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Field {0} has an unsupported type")]
    InvalidFieldType(&'static str),
}

/// Top-up request fields as they arrived, before validation. A missing (or `null`) field is `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TopUpPayload {
    pub wallet_id: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
}

impl TopUpPayload {
    /// Parses a JSON request body. Only structural problems fail here; field contents are left
    /// for validation.
    pub fn from_json(body: &str) -> Result<Self, InputParseError> {
        let value: Value = serde_json::from_str(body)?;
        let object = value.as_object().ok_or(InputParseError::NotAnObject)?;

        let wallet_id = match object.get("wallet_id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(_) => return Err(InputParseError::InvalidFieldType("wallet_id")),
        };

        // A numeric amount is checked through its text form, so `5.00` sent as a number (which
        // prints as `5.0`) fails the format check instead of being silently accepted.
        let amount = match object.get("amount") {
            None | Some(Value::Null) => None,
            Some(Value::String(amount)) => Some(amount.clone()),
            Some(Value::Number(amount)) => Some(amount.to_string()),
            Some(_) => return Err(InputParseError::InvalidFieldType("amount")),
        };

        let currency = match object.get("currency") {
            None | Some(Value::Null) => None,
            Some(Value::String(currency)) => Some(currency.clone()),
            Some(_) => return Err(InputParseError::InvalidFieldType("currency")),
        };

        return Ok(Self {
            wallet_id,
            amount,
            currency,
        });
    }
}

/// A fully validated top-up request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopUpRequest {
    pub wallet_id: WalletId,
    pub amount: Money,
    pub currency: CurrencyCode,
}

impl TryFrom<TopUpPayload> for TopUpRequest {
    type Error = Vec<String>;

    fn try_from(payload: TopUpPayload) -> Result<Self, Self::Error> {
        let errors = validate_top_up_payload(&payload);
        if !errors.is_empty() {
            return Err(errors);
        }

        return match (payload.wallet_id, payload.amount, payload.currency) {
            (Some(wallet_id), Some(amount), Some(currency)) => Ok(Self {
                wallet_id: WalletId::new(wallet_id),
                amount: Money::parse(&amount).map_err(|e| vec![e.to_string()])?,
                currency: CurrencyCode::parse(&currency).map_err(|e| vec![e.to_string()])?,
            }),
            _ => Err(errors),
        };
    }
}
