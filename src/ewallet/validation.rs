use crate::currency::is_valid_currency_code;
use crate::input::TopUpPayload;
use crate::Money;

pub const WALLET_ID_MISSING: &str = "wallet_id is missing";
pub const AMOUNT_MISSING: &str = "amount is missing";
pub const AMOUNT_INVALID_FORMAT: &str = "Invalid amount format";
pub const AMOUNT_NOT_POSITIVE: &str = "Amount must be positive";
pub const CURRENCY_MISSING: &str = "currency is missing";
pub const CURRENCY_INVALID: &str = "Invalid currency code";

/// True iff `raw` is `<digits>.<two digits>` and strictly greater than zero
pub fn is_valid_amount(raw: &str) -> bool {
    return matches!(Money::parse(raw), Ok(amount) if !amount.is_zero());
}

/// Checks every field of a top-up payload and collects all violations, in field order.
/// An empty list means the payload is valid.
pub fn validate_top_up_payload(payload: &TopUpPayload) -> Vec<String> {
    let mut errors = vec![];

    if payload.wallet_id.is_none() {
        errors.push(WALLET_ID_MISSING.to_string());
    }

    match payload.amount.as_deref() {
        None => errors.push(AMOUNT_MISSING.to_string()),
        Some(raw) => match Money::parse(raw) {
            Err(_) => errors.push(AMOUNT_INVALID_FORMAT.to_string()),
            Ok(amount) if amount.is_zero() => errors.push(AMOUNT_NOT_POSITIVE.to_string()),
            Ok(_) => {}
        },
    }

    match payload.currency.as_deref() {
        None => errors.push(CURRENCY_MISSING.to_string()),
        Some(code) if !is_valid_currency_code(code) => errors.push(CURRENCY_INVALID.to_string()),
        Some(_) => {}
    }

    return errors;
}
