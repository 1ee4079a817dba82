use super::{load_wallet, ServiceError};

use crate::ids::WalletId;
use crate::repositories::WalletRepository;
use crate::responses::BalanceResponse;
use crate::validation::CURRENCY_INVALID;
use crate::CurrencyCode;

/// Read-only balance lookups. Safe to retry.
pub struct BalanceService<W> {
    wallets: W,
}

impl<W: WalletRepository> BalanceService<W> {
    pub fn new(wallets: W) -> Self {
        return Self { wallets };
    }

    /// Reports the balance in `currency`, or in the wallet's stored currency (USD if it has none)
    pub fn balance(&self, wallet_id: &str, currency: Option<&str>) -> Result<BalanceResponse, ServiceError> {
        let res = self.lookup(wallet_id, currency);

        match &res {
            Ok(response) => log::debug!("Balance lookup: {response:?}"),
            Err(e) => e.log("Balance lookup"),
        }

        return res;
    }

    fn lookup(&self, wallet_id: &str, currency: Option<&str>) -> Result<BalanceResponse, ServiceError> {
        let currency = currency
            .map(CurrencyCode::parse)
            .transpose()
            .map_err(|_| ServiceError::ValidationFailed(vec![CURRENCY_INVALID.to_string()]))?;

        let wallet = load_wallet(&self.wallets, &WalletId::new(wallet_id))?;

        let currency = currency.unwrap_or_else(|| wallet.primary_currency());

        return Ok(BalanceResponse::new(&wallet, &currency));
    }
}
