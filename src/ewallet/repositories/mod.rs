//! Persistence contracts for wallets and the transaction ledger, plus the stores behind them.
//!
//! Every storage failure surfaces as a [`RepositoryError`]; legitimate absence of a wallet is
//! `Ok(None)`, never an error.

mod file;
mod memory;

pub use file::{CsvTransactionRepository, JsonWalletRepository};
pub use memory::{InMemoryTransactionRepository, InMemoryWalletRepository};

use crate::ids::{TransactionId, WalletId};
use crate::models::{LedgerEntry, Transaction, Wallet};

use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Version conflict saving wallet {wallet_id}: expected stored version {expected}, found {found:?}")]
    Conflict {
        wallet_id: WalletId,
        expected: u64,
        found: Option<u64>,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ledger file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Wallet document error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait WalletRepository: Send + Sync {
    fn find(&self, id: &WalletId) -> Result<Option<Wallet>, RepositoryError>;

    /// Upserts the whole wallet, but only if the stored copy is still at `wallet.version()` (or
    /// absent, for a version 0 wallet). The stored copy moves to the next version.
    fn save(&self, wallet: &Wallet) -> Result<(), RepositoryError>;
}

pub trait TransactionRepository: Send + Sync {
    /// Appends to the ledger and returns the generated id
    fn save(&self, transaction: &Transaction) -> Result<TransactionId, RepositoryError>;

    /// Entries for one wallet in append order, skipping the first `skip` of them
    fn find_by_wallet(&self, wallet_id: &WalletId, skip: usize) -> Result<Vec<LedgerEntry>, RepositoryError>;
}

/// Shared version check for wallet stores
pub(crate) fn check_version(stored: Option<&Wallet>, wallet: &Wallet) -> Result<(), RepositoryError> {
    let found = stored.map(Wallet::version);

    let matches = match found {
        Some(version) => version == wallet.version(),
        None => wallet.version() == 0,
    };

    if !matches {
        return Err(RepositoryError::Conflict {
            wallet_id: wallet.id().clone(),
            expected: wallet.version(),
            found,
        });
    }

    return Ok(());
}

impl<R: WalletRepository + ?Sized> WalletRepository for &R {
    fn find(&self, id: &WalletId) -> Result<Option<Wallet>, RepositoryError> {
        return (**self).find(id);
    }

    fn save(&self, wallet: &Wallet) -> Result<(), RepositoryError> {
        return (**self).save(wallet);
    }
}

impl<R: WalletRepository + ?Sized> WalletRepository for Arc<R> {
    fn find(&self, id: &WalletId) -> Result<Option<Wallet>, RepositoryError> {
        return (**self).find(id);
    }

    fn save(&self, wallet: &Wallet) -> Result<(), RepositoryError> {
        return (**self).save(wallet);
    }
}

impl<R: TransactionRepository + ?Sized> TransactionRepository for &R {
    fn save(&self, transaction: &Transaction) -> Result<TransactionId, RepositoryError> {
        return (**self).save(transaction);
    }

    fn find_by_wallet(&self, wallet_id: &WalletId, skip: usize) -> Result<Vec<LedgerEntry>, RepositoryError> {
        return (**self).find_by_wallet(wallet_id, skip);
    }
}

impl<R: TransactionRepository + ?Sized> TransactionRepository for Arc<R> {
    fn save(&self, transaction: &Transaction) -> Result<TransactionId, RepositoryError> {
        return (**self).save(transaction);
    }

    fn find_by_wallet(&self, wallet_id: &WalletId, skip: usize) -> Result<Vec<LedgerEntry>, RepositoryError> {
        return (**self).find_by_wallet(wallet_id, skip);
    }
}
