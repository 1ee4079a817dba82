use super::{LedgerEntry, TransactionType};

use crate::ids::{TransactionId, WalletId};
use crate::money::MoneyError;
use crate::{CurrencyCode, Money};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use serde::{Deserialize, Serialize};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Ledger entry {0} belongs to wallet {1} and cannot be applied to wallet {2}")]
    ForeignEntry(TransactionId, WalletId, WalletId),

    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Per-currency balances for one wallet.
///
/// `balances` is a cache over the ledger: `ledger_cursor` counts how many of this wallet's ledger
/// entries have been folded in so far, and `version` is checked by the repository on every save.
/// Entries the cursor moved past without crediting them are listed in `rejected_entries`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    id: WalletId,

    #[serde(default)]
    currency: Option<CurrencyCode>,

    #[serde(default)]
    balances: BTreeMap<CurrencyCode, Money>,

    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,

    #[serde(default)]
    version: u64,

    #[serde(default)]
    ledger_cursor: usize,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    rejected_entries: Vec<TransactionId>,
}

impl Wallet {
    pub fn new(id: WalletId) -> Self {
        return Self {
            id,
            currency: None,
            balances: BTreeMap::new(),
            last_updated: None,
            version: 0,
            ledger_cursor: 0,
            rejected_entries: vec![],
        };
    }

    /// Sets the stored currency reported by balance queries
    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = Some(currency);
        return self;
    }

    /// Seeds a balance that predates the ledger. Also becomes the stored currency if none is set.
    pub fn with_opening_balance(mut self, currency: CurrencyCode, amount: Money) -> Self {
        if self.currency.is_none() {
            self.currency = Some(currency.clone());
        }

        self.balances.insert(currency, amount);
        return self;
    }

    pub fn id(&self) -> &WalletId {
        return &self.id;
    }

    pub fn currency(&self) -> Option<&CurrencyCode> {
        return self.currency.as_ref();
    }

    pub fn primary_currency(&self) -> CurrencyCode {
        return self.currency.clone().unwrap_or_else(CurrencyCode::usd);
    }

    pub fn balances(&self) -> &BTreeMap<CurrencyCode, Money> {
        return &self.balances;
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        return self.last_updated;
    }

    pub fn version(&self) -> u64 {
        return self.version;
    }

    pub fn ledger_cursor(&self) -> usize {
        return self.ledger_cursor;
    }

    pub fn rejected_entries(&self) -> &[TransactionId] {
        return &self.rejected_entries;
    }

    /// Balance held in `currency`, or zero if the wallet has never held it
    pub fn get_balance(&self, currency: &CurrencyCode) -> Money {
        return self.balances.get(currency).copied().unwrap_or(Money::ZERO);
    }

    /// Credits `amount` in `currency` and stamps `last_updated`.
    ///
    /// Callers must only pass amounts that passed validation (strictly positive); this is not
    /// re-checked here. The wallet is only changed in memory, persisting it is up to the caller.
    pub fn top_up(&mut self, amount: Money, currency: &CurrencyCode) -> Result<(), MoneyError> {
        let balance = self.balances.entry(currency.clone()).or_insert(Money::ZERO);
        balance.add(&amount)?;

        self.last_updated = Some(Utc::now());

        return Ok(());
    }

    /// Folds one ledger entry into the balances and advances the ledger cursor.
    /// On error neither the balances nor the cursor move.
    pub fn apply(&mut self, entry: &LedgerEntry) -> Result<(), WalletError> {
        if entry.wallet_id() != &self.id {
            return Err(WalletError::ForeignEntry(
                entry.id().clone(),
                entry.wallet_id().clone(),
                self.id.clone(),
            ));
        }

        match entry.transaction_type() {
            TransactionType::TopUp => self.top_up(entry.amount(), entry.currency())?,
        }

        self.ledger_cursor += 1;

        return Ok(());
    }

    /// Moves the ledger cursor past an entry that can never be applied, leaving the balances alone
    pub fn reject(&mut self, entry: &LedgerEntry) {
        self.rejected_entries.push(entry.id().clone());
        self.ledger_cursor += 1;
    }

    /// Copy of this wallet as it should be stored after a successful save
    pub(crate) fn next_version(&self) -> Self {
        let mut wallet = self.clone();
        wallet.version += 1;
        return wallet;
    }
}
