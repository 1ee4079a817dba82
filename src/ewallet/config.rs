use std::env;
use std::path::PathBuf;

pub const DATA_DIR_VAR: &str = "EWALLET_DATA_DIR";
pub const WALLETS_TABLE_VAR: &str = "WALLETS_TABLE";
pub const TRANSACTIONS_TABLE_VAR: &str = "TRANSACTIONS_TABLE";

const DEFAULT_DATA_DIR: &str = ".";
const DEFAULT_WALLETS_TABLE: &str = "wallets.json";
const DEFAULT_TRANSACTIONS_TABLE: &str = "transactions.csv";

/// Where the file-backed store keeps its wallets and ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub wallets_path: PathBuf,
    pub transactions_path: PathBuf,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        return Self::from_lookup(|name| env::var(name).ok());
    }

    /// Table names are resolved against the data directory; unset or blank values fall back to
    /// the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str, default: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let data_dir = PathBuf::from(var(DATA_DIR_VAR, DEFAULT_DATA_DIR));

        return Self {
            wallets_path: data_dir.join(var(WALLETS_TABLE_VAR, DEFAULT_WALLETS_TABLE)),
            transactions_path: data_dir.join(var(TRANSACTIONS_TABLE_VAR, DEFAULT_TRANSACTIONS_TABLE)),
        };
    }
}
