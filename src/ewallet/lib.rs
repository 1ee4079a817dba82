pub mod config;
mod currency;
pub mod ids;
pub mod input;
pub mod models;
mod money;
pub mod repositories;
pub mod responses;
mod result;
pub mod services;
pub mod validation;

pub use currency::{is_valid_currency_code, CurrencyCode, CurrencyCodeError, ACCEPTED_CURRENCY_CODES};
pub use models::{LedgerEntry, Transaction, TransactionType, Wallet};
pub use money::{Money, MoneyError};
pub use result::Result;

use config::StoreConfig;
use repositories::{CsvTransactionRepository, JsonWalletRepository};

/// Opens the file-backed wallet store and ledger. Build these once per process and hand them to
/// the services.
pub fn open_file_store(config: &StoreConfig) -> (JsonWalletRepository, CsvTransactionRepository) {
    let wallets = JsonWalletRepository::new(config.wallets_path.clone());
    let transactions = CsvTransactionRepository::new(config.transactions_path.clone());

    return (wallets, transactions);
}
