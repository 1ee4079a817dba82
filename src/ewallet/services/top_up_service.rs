use super::{fold_pending_entries, load_wallet, ServiceError};

use crate::input::{TopUpPayload, TopUpRequest};
use crate::models::Transaction;
use crate::repositories::{TransactionRepository, WalletRepository};
use crate::responses::TopUpResponse;

pub const AMOUNT_EXCEEDS_MAXIMUM: &str = "Amount exceeds the maximum wallet balance";

/// Credits a wallet.
///
/// A request moves through: payload received, validated, wallet loaded, transaction recorded,
/// balance updated, wallet persisted. Any failure stops it where it is. Validation finishes
/// before anything is read or written, and the ledger entry is written before the wallet is
/// touched, so the ledger never lags behind a balance.
pub struct TopUpService<W, T> {
    wallets: W,
    transactions: T,
}

impl<W, T> TopUpService<W, T>
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

    /// Handles a raw JSON request body
    pub fn handle_body(&self, body: &str) -> Result<TopUpResponse, ServiceError> {
        let payload = match TopUpPayload::from_json(body) {
            Ok(payload) => payload,
            Err(e) => {
                let e = ServiceError::from(e);
                e.log("Top-up");
                return Err(e);
            }
        };

        return self.top_up(payload);
    }

    pub fn top_up(&self, payload: TopUpPayload) -> Result<TopUpResponse, ServiceError> {
        log::debug!("Processing top-up payload: {payload:?}");

        let res = self.process(payload);

        if let Err(e) = &res {
            e.log("Top-up");
        }

        return res;
    }

    fn process(&self, payload: TopUpPayload) -> Result<TopUpResponse, ServiceError> {
        let request = TopUpRequest::try_from(payload).map_err(ServiceError::ValidationFailed)?;

        let wallet = load_wallet(&self.wallets, &request.wallet_id)?;
        log::debug!("Found wallet: {wallet:?}");

        // entries already in the ledger will be folded in ahead of this one
        let pending = self
            .transactions
            .find_by_wallet(&request.wallet_id, wallet.ledger_cursor())?;

        let projected = pending
            .iter()
            .filter(|entry| entry.currency() == &request.currency)
            .try_fold(wallet.get_balance(&request.currency), |balance, entry| {
                balance.checked_add(&entry.amount())
            })
            .and_then(|balance| balance.checked_add(&request.amount));

        if projected.is_none() {
            return Err(exceeds_maximum());
        }

        let transaction = Transaction::top_up(
            request.wallet_id.clone(),
            request.amount,
            request.currency.clone(),
        );

        let transaction_id = self.transactions.save(&transaction)?;
        log::debug!("Recorded transaction {transaction_id}: {transaction:?}");

        let (wallet, applied) = fold_pending_entries(&self.wallets, &self.transactions, wallet)?;
        log::debug!("Applied {applied} ledger entries to wallet {}", wallet.id());

        // a concurrent top-up can still push the balance past the maximum first
        if wallet.rejected_entries().contains(&transaction_id) {
            return Err(exceeds_maximum());
        }

        let response = TopUpResponse::new(&transaction_id, &wallet, request.amount, &request.currency);

        log::info!(
            "Topped up wallet {} with {} {}, new balance {}",
            response.wallet_id,
            response.amount,
            response.currency,
            response.new_balance
        );

        return Ok(response);
    }
}

fn exceeds_maximum() -> ServiceError {
    return ServiceError::ValidationFailed(vec![AMOUNT_EXCEEDS_MAXIMUM.to_string()]);
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ids::{TransactionId, WalletId};
    use crate::models::{LedgerEntry, TransactionType, Wallet};
    use crate::repositories::{InMemoryTransactionRepository, InMemoryWalletRepository, RepositoryError};
    use crate::validation::{AMOUNT_INVALID_FORMAT, CURRENCY_INVALID};
    use crate::{CurrencyCode, Money};

    const SOME_WALLET_ID: &str = "w1";

    fn build_wallets() -> InMemoryWalletRepository {
        InMemoryWalletRepository::with_wallets([Wallet::new(WalletId::new(SOME_WALLET_ID))
            .with_opening_balance(CurrencyCode::usd(), Money(1000))])
    }

    fn build_payload(amount: &str, currency: &str) -> TopUpPayload {
        TopUpPayload {
            wallet_id: Some(SOME_WALLET_ID.to_string()),
            amount: Some(amount.to_string()),
            currency: Some(currency.to_string()),
        }
    }

    #[test]
    fn top_up() {
        let wallets = build_wallets();
        let transactions = InMemoryTransactionRepository::new();
        let service = TopUpService::new(&wallets, &transactions);

        let response = service.top_up(build_payload("5.00", "USD")).unwrap();

        assert_eq!(response.new_balance, "15.00");
        assert_eq!(response.amount, "5.00");
        assert_eq!(response.currency, "USD");
        assert_eq!(response.wallet_id, SOME_WALLET_ID);

        let entries = transactions.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id().to_string(), response.transaction_id);
        assert_eq!(entries[0].transaction_type(), TransactionType::TopUp);
        assert_eq!(entries[0].amount(), Money(500));

        let stored = wallets.find(&WalletId::new(SOME_WALLET_ID)).unwrap().unwrap();
        assert_eq!(stored.get_balance(&CurrencyCode::usd()), Money(1500));
        assert_eq!(stored.ledger_cursor(), 1);
    }

    #[test]
    fn top_up_new_currency() {
        let wallets = build_wallets();
        let transactions = InMemoryTransactionRepository::new();
        let service = TopUpService::new(&wallets, &transactions);

        let response = service.top_up(build_payload("2.50", "EUR")).unwrap();

        assert_eq!(response.new_balance, "2.50");

        let stored = wallets.find(&WalletId::new(SOME_WALLET_ID)).unwrap().unwrap();
        assert_eq!(stored.get_balance(&CurrencyCode::usd()), Money(1000));
    }

    #[test]
    fn invalid_payload_touches_nothing() {
        let wallets = build_wallets();
        let transactions = InMemoryTransactionRepository::new();
        let service = TopUpService::new(&wallets, &transactions);

        let before = wallets.find(&WalletId::new(SOME_WALLET_ID)).unwrap();

        let res = service.top_up(build_payload("5.1", "usd"));

        match res {
            Err(ServiceError::ValidationFailed(errors)) => {
                assert_eq!(errors, vec![AMOUNT_INVALID_FORMAT, CURRENCY_INVALID]);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }

        assert!(transactions.entries().unwrap().is_empty());
        assert_eq!(wallets.find(&WalletId::new(SOME_WALLET_ID)).unwrap(), before);
    }

    #[test]
    fn unknown_wallet() {
        let wallets = build_wallets();
        let transactions = InMemoryTransactionRepository::new();
        let service = TopUpService::new(&wallets, &transactions);

        let res = service.top_up(TopUpPayload {
            wallet_id: Some("ghost".to_string()),
            ..build_payload("5.00", "USD")
        });

        assert!(matches!(res, Err(ServiceError::WalletNotFound(id)) if id == WalletId::new("ghost")));
        assert!(transactions.entries().unwrap().is_empty());
    }

    #[test]
    fn balance_overflow_is_rejected_before_recording() {
        let wallets = InMemoryWalletRepository::with_wallets([Wallet::new(WalletId::new(SOME_WALLET_ID))
            .with_opening_balance(CurrencyCode::usd(), Money(u64::MAX - 50))]);
        let transactions = InMemoryTransactionRepository::new();
        let service = TopUpService::new(&wallets, &transactions);

        let res = service.top_up(build_payload("1.00", "USD"));

        match res {
            Err(ServiceError::ValidationFailed(errors)) => {
                assert_eq!(errors, vec![AMOUNT_EXCEEDS_MAXIMUM]);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert!(transactions.entries().unwrap().is_empty());
    }

    #[test]
    fn balance_overflow_counts_pending_entries() {
        let wallets = InMemoryWalletRepository::with_wallets([Wallet::new(WalletId::new(SOME_WALLET_ID))
            .with_opening_balance(CurrencyCode::usd(), Money(u64::MAX - 150))]);
        let transactions = InMemoryTransactionRepository::new();

        // recorded earlier, never folded into the wallet
        transactions
            .save(&Transaction::top_up(WalletId::new(SOME_WALLET_ID), Money(100), CurrencyCode::usd()))
            .unwrap();

        let service = TopUpService::new(&wallets, &transactions);

        let res = service.top_up(build_payload("1.00", "USD"));

        assert!(matches!(res, Err(ServiceError::ValidationFailed(errors)) if errors == vec![AMOUNT_EXCEEDS_MAXIMUM]));
        assert_eq!(transactions.entries().unwrap().len(), 1);

        // the orphaned entry still fits, and later top-ups are not blocked
        let response = service.top_up(build_payload("0.50", "USD")).unwrap();

        assert_eq!(response.new_balance, Money(u64::MAX).to_string());
        assert_eq!(transactions.entries().unwrap().len(), 2);
    }

    /// Ledger where another top-up always lands just before ours
    struct RacingLedger {
        inner: InMemoryTransactionRepository,
        competing: Transaction,
    }

    impl TransactionRepository for RacingLedger {
        fn save(&self, transaction: &Transaction) -> Result<TransactionId, RepositoryError> {
            self.inner.save(&self.competing)?;
            return self.inner.save(transaction);
        }

        fn find_by_wallet(&self, wallet_id: &WalletId, skip: usize) -> Result<Vec<LedgerEntry>, RepositoryError> {
            return self.inner.find_by_wallet(wallet_id, skip);
        }
    }

    #[test]
    fn balance_overflow_from_concurrent_top_up() {
        let wallets = InMemoryWalletRepository::with_wallets([Wallet::new(WalletId::new(SOME_WALLET_ID))
            .with_opening_balance(CurrencyCode::usd(), Money(u64::MAX - 150))]);
        let transactions = RacingLedger {
            inner: InMemoryTransactionRepository::new(),
            competing: Transaction::top_up(WalletId::new(SOME_WALLET_ID), Money(100), CurrencyCode::usd()),
        };
        let service = TopUpService::new(&wallets, &transactions);

        let res = service.top_up(build_payload("1.00", "USD"));

        assert!(matches!(res, Err(ServiceError::ValidationFailed(errors)) if errors == vec![AMOUNT_EXCEEDS_MAXIMUM]));

        let entries = transactions.inner.entries().unwrap();
        let stored = wallets.find(&WalletId::new(SOME_WALLET_ID)).unwrap().unwrap();

        assert_eq!(stored.get_balance(&CurrencyCode::usd()), Money(u64::MAX - 50));
        assert_eq!(stored.ledger_cursor(), 2);
        assert_eq!(stored.rejected_entries(), &[entries[1].id().clone()]);
    }

    #[test]
    fn handle_body_malformed() {
        let wallets = build_wallets();
        let transactions = InMemoryTransactionRepository::new();
        let service = TopUpService::new(&wallets, &transactions);

        let res = service.handle_body("wallet_id=w1&amount=5.00");

        assert!(matches!(res, Err(ServiceError::BadRequest(_))));
        assert_eq!(res.unwrap_err().status_code(), 400);
    }

    #[test]
    fn handle_body() {
        let wallets = build_wallets();
        let transactions = InMemoryTransactionRepository::new();
        let service = TopUpService::new(&wallets, &transactions);

        let response = service
            .handle_body(r#"{"wallet_id": "w1", "amount": "0.99", "currency": "USD"}"#)
            .unwrap();

        assert_eq!(response.new_balance, "10.99");
    }
}
