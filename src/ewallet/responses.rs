use crate::ids::{TransactionId, WalletId};
use crate::models::Wallet;
use crate::{CurrencyCode, Money};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use serde::{Deserialize, Serialize};

pub const TOP_UP_SUCCESS_MESSAGE: &str = "Top-up successful";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TopUpResponse {
    pub message: String,
    pub transaction_id: String,
    pub wallet_id: String,
    pub amount: String,
    pub currency: String,
    pub new_balance: String,
}

impl TopUpResponse {
    pub fn new(
        transaction_id: &TransactionId,
        wallet: &Wallet,
        amount: Money,
        currency: &CurrencyCode,
    ) -> Self {
        return Self {
            message: TOP_UP_SUCCESS_MESSAGE.to_string(),
            transaction_id: transaction_id.to_string(),
            wallet_id: wallet.id().to_string(),
            amount: amount.to_string(),
            currency: currency.to_string(),
            new_balance: wallet.get_balance(currency).to_string(),
        };
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BalanceResponse {
    pub wallet_id: String,
    pub balance: String,
    pub currency: String,
    pub last_updated: Option<DateTime<Utc>>,
}

impl BalanceResponse {
    pub fn new(wallet: &Wallet, currency: &CurrencyCode) -> Self {
        return Self {
            wallet_id: wallet.id().to_string(),
            balance: wallet.get_balance(currency).to_string(),
            currency: currency.to_string(),
            last_updated: wallet.last_updated(),
        };
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReconcileResponse {
    pub wallet_id: String,
    pub applied: usize,
    pub balances: BTreeMap<String, String>,
}

impl ReconcileResponse {
    pub fn new(wallet_id: &WalletId, applied: usize, wallet: &Wallet) -> Self {
        return Self {
            wallet_id: wallet_id.to_string(),
            applied,
            balances: wallet
                .balances()
                .iter()
                .map(|(currency, balance)| (currency.to_string(), balance.to_string()))
                .collect(),
        };
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}
