mod args;
mod config;
mod reader;
mod writer;

use args::Command;
use writer::Envelope;

use ewallet::config::StoreConfig;
use ewallet::ids::WalletId;
use ewallet::repositories::{RepositoryError, TransactionRepository, WalletRepository};
use ewallet::responses::ErrorResponse;
use ewallet::services::{BalanceService, ReconcileService, ServiceError, TopUpService};
use ewallet::validation::{AMOUNT_INVALID_FORMAT, CURRENCY_INVALID};
use ewallet::{CurrencyCode, Money, Result, Wallet};

use std::process;

fn main() -> Result {
    config::configure_logging()?;

    let command = args::parse_command()?;
    log::debug!("Parsed command: {command:?}");

    let store = StoreConfig::from_env();
    log::debug!("Using store: {store:?}");

    let (wallets, transactions) = ewallet::open_file_store(&store);

    let envelope = run(command, &wallets, &transactions)?;

    println!("{}", writer::write_to_string(&envelope)?);

    if !envelope.is_success() {
        process::exit(1);
    }

    return Ok(());
}

/// Runs one request against the store and maps the outcome to an envelope
fn run<W, T>(command: Command, wallets: &W, transactions: &T) -> Result<Envelope>
where
    W: WalletRepository,
    T: TransactionRepository,
{
    return match command {
        Command::TopUp { body } => {
            let body = reader::read_body(body)?;
            let service = TopUpService::new(wallets, transactions);

            respond(service.handle_body(&body))
        }
        Command::Balance { wallet_id, currency } => {
            let service = BalanceService::new(wallets);

            respond(service.balance(&wallet_id, currency.as_deref()))
        }
        Command::Reconcile { wallet_id } => {
            let service = ReconcileService::new(wallets, transactions);

            respond(service.reconcile(&wallet_id))
        }
        Command::CreateWallet {
            wallet_id,
            currency,
            opening_balance,
        } => create_wallet(wallets, wallet_id, currency, opening_balance),
    };
}

fn respond<S: serde::Serialize>(res: std::result::Result<S, ServiceError>) -> Result<Envelope> {
    return match res {
        Ok(body) => Envelope::new(200, &body),
        Err(e) => Envelope::new(e.status_code(), &e.to_response()),
    };
}

/// Wallets are provisioned out-of-band; this is the operator's way to do it
fn create_wallet<W: WalletRepository>(
    wallets: &W,
    wallet_id: String,
    currency: Option<String>,
    opening_balance: Option<String>,
) -> Result<Envelope> {
    let mut errors = vec![];

    let currency = match currency.as_deref().map(CurrencyCode::parse).transpose() {
        Ok(currency) => currency.unwrap_or_else(CurrencyCode::usd),
        Err(_) => {
            errors.push(CURRENCY_INVALID.to_string());
            CurrencyCode::usd()
        }
    };

    let opening_balance = match opening_balance.as_deref().map(Money::parse).transpose() {
        Ok(balance) => balance.unwrap_or(Money::ZERO),
        Err(_) => {
            errors.push(AMOUNT_INVALID_FORMAT.to_string());
            Money::ZERO
        }
    };

    if !errors.is_empty() {
        return respond::<Wallet>(Err(ServiceError::ValidationFailed(errors)));
    }

    let wallet = Wallet::new(WalletId::new(wallet_id)).with_opening_balance(currency, opening_balance);

    return match wallets.save(&wallet) {
        Ok(()) => {
            log::info!("Created wallet {}", wallet.id());
            Envelope::new(200, &wallet)
        }
        Err(RepositoryError::Conflict { wallet_id, .. }) => Envelope::new(
            409,
            &ErrorResponse {
                message: format!("Wallet with ID {wallet_id} already exists"),
                errors: None,
            },
        ),
        Err(e) => {
            log::error!("Creating wallet {} failed: {e}", wallet.id());
            respond::<Wallet>(Err(e.into()))
        }
    };
}
