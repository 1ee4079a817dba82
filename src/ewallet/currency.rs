use std::fmt;

use serde::{Deserialize, Serialize};

use thiserror::Error;

/// Accepted currency codes: the active ISO 4217 alphabetic codes for circulating currencies and
/// the fund codes some of them settle in. Precious metals, bond-market units, SDRs and the
/// testing/"no currency" codes are left out on purpose.
///
/// Must stay sorted, lookups use a binary search.
pub const ACCEPTED_CURRENCY_CODES: &[&str] = &[
    "AED", "AFN", "ALL", "AMD", "ANG", "AOA", "ARS", "AUD", "AWG", "AZN",
    "BAM", "BBD", "BDT", "BGN", "BHD", "BIF", "BMD", "BND", "BOB", "BOV",
    "BRL", "BSD", "BTN", "BWP", "BYN", "BZD", "CAD", "CDF", "CHE", "CHF",
    "CHW", "CLF", "CLP", "CNY", "COP", "COU", "CRC", "CUP", "CVE", "CZK",
    "DJF", "DKK", "DOP", "DZD", "EGP", "ERN", "ETB", "EUR", "FJD", "FKP",
    "GBP", "GEL", "GHS", "GIP", "GMD", "GNF", "GTQ", "GYD", "HKD", "HNL",
    "HTG", "HUF", "IDR", "ILS", "INR", "IQD", "IRR", "ISK", "JMD", "JOD",
    "JPY", "KES", "KGS", "KHR", "KMF", "KPW", "KRW", "KWD", "KYD", "KZT",
    "LAK", "LBP", "LKR", "LRD", "LSL", "LYD", "MAD", "MDL", "MGA", "MKD",
    "MMK", "MNT", "MOP", "MRU", "MUR", "MVR", "MWK", "MXN", "MXV", "MYR",
    "MZN", "NAD", "NGN", "NIO", "NOK", "NPR", "NZD", "OMR", "PAB", "PEN",
    "PGK", "PHP", "PKR", "PLN", "PYG", "QAR", "RON", "RSD", "RUB", "RWF",
    "SAR", "SBD", "SCR", "SDG", "SEK", "SGD", "SHP", "SLE", "SOS", "SRD",
    "SSP", "STN", "SVC", "SYP", "SZL", "THB", "TJS", "TMT", "TND", "TOP",
    "TRY", "TTD", "TWD", "TZS", "UAH", "UGX", "USD", "USN", "UYI", "UYU",
    "UYW", "UZS", "VED", "VES", "VND", "VUV", "WST", "XAF", "XCD", "XOF",
    "XPF", "YER", "ZAR", "ZMW", "ZWG",
];

/// Returns true iff `code` is one of [`ACCEPTED_CURRENCY_CODES`]. Case-sensitive.
pub fn is_valid_currency_code(code: &str) -> bool {
    return code.len() == 3 && ACCEPTED_CURRENCY_CODES.binary_search(&code).is_ok();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid currency code: {0:?}")]
pub struct CurrencyCodeError(pub String);

/// A currency code that passed [`is_valid_currency_code`]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn parse(code: &str) -> Result<Self, CurrencyCodeError> {
        if !is_valid_currency_code(code) {
            return Err(CurrencyCodeError(code.to_string()));
        }

        return Ok(Self(code.to_string()));
    }

    /// Currency reported for wallets that never stored one
    pub fn usd() -> Self {
        return Self("USD".to_string());
    }

    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        return Self::parse(&value);
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        return code.0;
    }
}
