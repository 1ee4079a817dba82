use crate::ids::{TransactionId, WalletId};
use crate::{CurrencyCode, Money};

use std::fmt;
use std::ops::Deref;

use chrono::{DateTime, Utc};

use serde::{Deserialize, Serialize};

/// Kinds of ledger event. Anything that applies a transaction to a wallet must match on this
/// exhaustively, so a new kind can't be silently ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    #[serde(rename = "TOP_UP")]
    TopUp,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::TopUp => "TOP_UP",
        };

        return f.write_str(name);
    }
}

/// A single balance-affecting event, not yet recorded in the ledger.
///
/// No validation happens here: amount and currency must already have been checked by the caller,
/// before any wallet state is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    wallet_id: WalletId,
    amount: Money,
    currency: CurrencyCode,
    transaction_type: TransactionType,
    created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        wallet_id: WalletId,
        amount: Money,
        currency: CurrencyCode,
        transaction_type: TransactionType,
    ) -> Self {
        return Self::at(wallet_id, amount, currency, transaction_type, Utc::now());
    }

    pub fn top_up(wallet_id: WalletId, amount: Money, currency: CurrencyCode) -> Self {
        return Self::new(wallet_id, amount, currency, TransactionType::TopUp);
    }

    /// Rebuilds a transaction with a known creation time, e.g. when reading it back from storage
    pub fn at(
        wallet_id: WalletId,
        amount: Money,
        currency: CurrencyCode,
        transaction_type: TransactionType,
        created_at: DateTime<Utc>,
    ) -> Self {
        return Self {
            wallet_id,
            amount,
            currency,
            transaction_type,
            created_at,
        };
    }

    pub fn wallet_id(&self) -> &WalletId {
        return &self.wallet_id;
    }

    pub fn amount(&self) -> Money {
        return self.amount;
    }

    pub fn currency(&self) -> &CurrencyCode {
        return &self.currency;
    }

    pub fn transaction_type(&self) -> TransactionType {
        return self.transaction_type;
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        return self.created_at;
    }
}

/// A transaction that has been appended to the ledger, along with the id the repository gave it.
/// Entries are write-once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    id: TransactionId,
    transaction: Transaction,
}

impl LedgerEntry {
    pub fn new(id: TransactionId, transaction: Transaction) -> Self {
        return Self { id, transaction };
    }

    pub fn id(&self) -> &TransactionId {
        return &self.id;
    }
}

impl Deref for LedgerEntry {
    type Target = Transaction;

    fn deref(&self) -> &Self::Target {
        return &self.transaction;
    }
}
