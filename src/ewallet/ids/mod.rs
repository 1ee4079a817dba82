mod transaction_id;
mod wallet_id;

pub use transaction_id::TransactionId;
pub use wallet_id::WalletId;
