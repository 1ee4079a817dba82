use super::{fold_pending_entries, load_wallet, ServiceError};

use crate::ids::WalletId;
use crate::repositories::{TransactionRepository, WalletRepository};
use crate::responses::ReconcileResponse;

/// Brings a wallet's cached balances up to date with the ledger, e.g. after a crash between
/// recording a transaction and saving the wallet
pub struct ReconcileService<W, T> {
    wallets: W,
    transactions: T,
}

impl<W, T> ReconcileService<W, T>
where
    W: WalletRepository,
    T: TransactionRepository,
{
    pub fn new(wallets: W, transactions: T) -> Self {
        return Self {
            wallets,
            transactions,
        };
    }

    pub fn reconcile(&self, wallet_id: &str) -> Result<ReconcileResponse, ServiceError> {
        let wallet_id = WalletId::new(wallet_id);

        let res = load_wallet(&self.wallets, &wallet_id)
            .and_then(|wallet| fold_pending_entries(&self.wallets, &self.transactions, wallet));

        return match res {
            Ok((wallet, applied)) => {
                if applied > 0 {
                    log::info!("Reconciled wallet {wallet_id}: applied {applied} ledger entries");
                }

                Ok(ReconcileResponse::new(&wallet_id, applied, &wallet))
            }
            Err(e) => {
                e.log("Reconcile");
                Err(e)
            }
        };
    }
}
