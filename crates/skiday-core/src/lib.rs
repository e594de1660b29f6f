//! Shared foundation for skiday: configuration, errors, domain models and
//! the resort catalog.

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

pub use catalog::ResortCatalog;
pub use config::{
    Config, GeocodingConfig, SearchConfig, SnowForecastConfig, ValidationResult, WeatherConfig,
};
pub use error::{AppError, ConfigError, WeatherError};
pub use types::{Coordinate, Criteria, MonthDay, Resort, SeasonWindow};

use anyhow::Result;

/// Initialize logging. `RUST_LOG` overrides the default `info` filter.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("skiday core initialized");
    Ok(())
}
