mod balance_service;
mod reconcile_service;
mod top_up_service;

pub use balance_service::BalanceService;
pub use reconcile_service::ReconcileService;
pub use top_up_service::TopUpService;

use crate::ids::WalletId;
use crate::input::InputParseError;
use crate::models::{Wallet, WalletError};
use crate::repositories::{RepositoryError, TransactionRepository, WalletRepository};
use crate::responses::ErrorResponse;

use thiserror::Error;

/// How many times a wallet save is retried after losing a version race
pub const MAX_COMMIT_ATTEMPTS: usize = 16;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Bad request: {0}")]
    BadRequest(#[from] InputParseError),

    #[error("Validation failed: {}", .0.join(", "))]
    ValidationFailed(Vec<String>),

    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),

    #[error("Storage failure: {0}")]
    Infrastructure(#[from] RepositoryError),

    #[error("Ledger could not be applied to wallet: {0}")]
    LedgerInconsistent(#[from] WalletError),
}

impl ServiceError {
    pub fn status_code(&self) -> u16 {
        return match self {
            Self::BadRequest(_) | Self::ValidationFailed(_) => 400,
            Self::WalletNotFound(_) => 404,
            Self::Infrastructure(_) | Self::LedgerInconsistent(_) => 500,
        };
    }

    /// Expected outcomes caused by the request itself, as opposed to failures of the system
    pub fn is_client_error(&self) -> bool {
        return self.status_code() < 500;
    }

    /// Body returned to the caller. Server-side details are never included.
    pub fn to_response(&self) -> ErrorResponse {
        let (message, errors) = match self {
            Self::BadRequest(_) => ("Bad Request".to_string(), None),
            Self::ValidationFailed(errors) => ("Validation failed".to_string(), Some(errors.clone())),
            Self::WalletNotFound(id) => (format!("Wallet with ID {id} not found"), None),
            Self::Infrastructure(_) | Self::LedgerInconsistent(_) => {
                ("Internal server error".to_string(), None)
            }
        };

        return ErrorResponse { message, errors };
    }

    fn log(&self, operation: &str) {
        if self.is_client_error() {
            log::debug!("{operation} rejected: {self}");
        } else {
            log::error!("{operation} failed: {self}");
        }
    }
}

fn load_wallet<W: WalletRepository>(wallets: &W, id: &WalletId) -> Result<Wallet, ServiceError> {
    return wallets
        .find(id)?
        .ok_or_else(|| ServiceError::WalletNotFound(id.clone()));
}

/// Applies every ledger entry the wallet hasn't seen yet and saves it.
///
/// An entry that would overflow its balance is rejected on the wallet instead, so one bad entry
/// can't block every later fold. On a version conflict the wallet is reloaded and the fold starts
/// over from the stored cursor. If another writer already folded everything, nothing is saved and
/// the reloaded wallet is returned. Returns the wallet as saved along with how many entries this
/// call credited.
fn fold_pending_entries<W, T>(
    wallets: &W,
    transactions: &T,
    mut wallet: Wallet,
) -> Result<(Wallet, usize), ServiceError>
where
    W: WalletRepository,
    T: TransactionRepository,
{
    let wallet_id = wallet.id().clone();
    let mut attempt = 1;

    loop {
        let pending = transactions.find_by_wallet(&wallet_id, wallet.ledger_cursor())?;

        if pending.is_empty() {
            log::debug!("Wallet {wallet_id} is up to date with the ledger");
            return Ok((wallet, 0));
        }

        let mut applied = 0;

        for entry in pending.iter() {
            match wallet.apply(entry) {
                Ok(()) => applied += 1,
                Err(WalletError::Money(e)) => {
                    log::error!("Rejecting ledger entry {} for wallet {wallet_id}: {e}", entry.id());
                    wallet.reject(entry);
                }
                Err(e) => return Err(e.into()),
            }
        }

        match wallets.save(&wallet) {
            Ok(()) => return Ok((wallet, applied)),

            Err(e @ RepositoryError::Conflict { .. }) if attempt < MAX_COMMIT_ATTEMPTS => {
                log::warn!("Attempt {attempt} to save wallet {wallet_id} lost a race, reloading: {e}");

                attempt += 1;
                wallet = load_wallet(wallets, &wallet_id)?;
            }

            Err(e) => return Err(e.into()),
        }
    }
}
