use ewallet::Result;

use std::env;

use anyhow::Context;

use thiserror::Error;

pub const USAGE: &str = "usage: ewallet-ledger <command>
  top-up <json-body | ->
  balance <wallet_id> [currency]
  reconcile <wallet_id>
  create-wallet <wallet_id> [currency] [opening_balance]";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputArgsError {
    #[error("Couldn't parse input arguments: {0}")]
    Parse(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `-` reads the body from stdin
    TopUp { body: String },
    Balance { wallet_id: String, currency: Option<String> },
    Reconcile { wallet_id: String },
    CreateWallet {
        wallet_id: String,
        currency: Option<String>,
        opening_balance: Option<String>,
    },
}

/// Parses the process arguments into a command
pub fn parse_command() -> Result<Command> {
    let command = parse_args(env::args().skip(1)).context(USAGE)?;

    return Ok(command);
}

fn parse_args(args: impl IntoIterator<Item = String>) -> std::result::Result<Command, InputArgsError> {
    let mut args = args.into_iter();

    let name = args
        .next()
        .ok_or_else(|| InputArgsError::Parse("A command is required.".to_string()))?;

    let command = match name.as_str() {
        "top-up" => Command::TopUp {
            body: required(&mut args, &name, "a JSON body")?,
        },
        "balance" => Command::Balance {
            wallet_id: required(&mut args, &name, "a wallet id")?,
            currency: args.next(),
        },
        "reconcile" => Command::Reconcile {
            wallet_id: required(&mut args, &name, "a wallet id")?,
        },
        "create-wallet" => Command::CreateWallet {
            wallet_id: required(&mut args, &name, "a wallet id")?,
            currency: args.next(),
            opening_balance: args.next(),
        },
        _ => return Err(InputArgsError::UnknownCommand(name.clone())),
    };

    if let Some(extra) = args.next() {
        return Err(InputArgsError::Parse(format!("Unexpected argument: {extra}")));
    }

    return Ok(command);
}

fn required(
    args: &mut impl Iterator<Item = String>,
    command: &str,
    what: &str,
) -> std::result::Result<String, InputArgsError> {
    return args
        .next()
        .ok_or_else(|| InputArgsError::Parse(format!("{command} requires {what}.")));
}
