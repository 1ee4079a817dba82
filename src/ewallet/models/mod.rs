mod transaction;
mod wallet;

pub use transaction::{LedgerEntry, Transaction, TransactionType};
pub use wallet::{Wallet, WalletError};
