use super::{check_version, RepositoryError, TransactionRepository, WalletRepository};

use crate::ids::{TransactionId, WalletId};
use crate::models::{LedgerEntry, Transaction, Wallet};

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

fn lock<'a, T>(mutex: &'a Mutex<T>, store: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    return mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{store} lock poisoned")));
}

/// Process-local wallet store
#[derive(Debug, Default)]
pub struct InMemoryWalletRepository {
    wallets: Mutex<HashMap<WalletId, Wallet>>,
}

impl InMemoryWalletRepository {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Builds a store already holding `wallets`, as if each had been saved once
    pub fn with_wallets(wallets: impl IntoIterator<Item = Wallet>) -> Self {
        let wallets = wallets
            .into_iter()
            .map(|wallet| (wallet.id().clone(), wallet.next_version()))
            .collect();

        return Self {
            wallets: Mutex::new(wallets),
        };
    }
}

impl WalletRepository for InMemoryWalletRepository {
    fn find(&self, id: &WalletId) -> Result<Option<Wallet>, RepositoryError> {
        let wallets = lock(&self.wallets, "wallet store")?;

        return Ok(wallets.get(id).cloned());
    }

    fn save(&self, wallet: &Wallet) -> Result<(), RepositoryError> {
        let mut wallets = lock(&self.wallets, "wallet store")?;

        check_version(wallets.get(wallet.id()), wallet)?;
        wallets.insert(wallet.id().clone(), wallet.next_version());

        return Ok(());
    }
}

/// Process-local append-only ledger
#[derive(Debug, Default)]
pub struct InMemoryTransactionRepository {
    entries: Mutex<Vec<LedgerEntry>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Every entry in append order
    pub fn entries(&self) -> Result<Vec<LedgerEntry>, RepositoryError> {
        return Ok(lock(&self.entries, "ledger")?.clone());
    }
}

impl TransactionRepository for InMemoryTransactionRepository {
    fn save(&self, transaction: &Transaction) -> Result<TransactionId, RepositoryError> {
        let mut entries = lock(&self.entries, "ledger")?;

        let id = TransactionId::generate();
        entries.push(LedgerEntry::new(id.clone(), transaction.clone()));

        return Ok(id);
    }

    fn find_by_wallet(&self, wallet_id: &WalletId, skip: usize) -> Result<Vec<LedgerEntry>, RepositoryError> {
        let entries = lock(&self.entries, "ledger")?;

        return Ok(entries
            .iter()
            .filter(|entry| entry.wallet_id() == wallet_id)
            .skip(skip)
            .cloned()
            .collect());
    }
}
