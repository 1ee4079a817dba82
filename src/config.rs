use ewallet::Result;

use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Logs go to stderr so stdout only ever carries the response. Warnings and up by default,
/// `RUST_LOG` overrides.
pub fn configure_logging() -> Result {
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_utc_timestamps()
        .env()
        .init()?;

    return Ok(());
}
