//! Centralized error types for skiday.
//!
//! This module provides a typed error hierarchy that:
//! - Distinguishes provider rate limiting from generic provider failure
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for logging

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    /// Bad command-line arguments
    #[error("{0}")]
    Usage(String),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Usage(_) => "Usage: skiday [CITY] [YYYY-MM-DD] [--sort KEY[:asc|:desc]]",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "A configured file was not found. Check your settings.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Errors from the geocoder and the weather providers.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("{provider} rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        provider: &'static str,
        retry_after_secs: u64,
    },

    #[error("{provider} API error: {status} - {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} returned invalid response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider not configured: {0}")]
    Configuration(String),
}

impl WeatherError {
    pub fn invalid_response(provider: &'static str, message: impl Into<String>) -> Self {
        WeatherError::InvalidResponse {
            provider,
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::LocationNotFound(_) => "Location not found. Check the city name and try again.",
            WeatherError::RateLimited { .. } => {
                "Too many requests to the weather service. Please retry in a moment."
            }
            WeatherError::Api { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            WeatherError::Api { .. } => "Weather request failed. Please try again.",
            WeatherError::InvalidResponse { .. } => {
                "Received unexpected weather data. Please try again."
            }
            WeatherError::Network(_) => "Unable to reach the weather service. Check your connection.",
            WeatherError::Configuration(_) => "Weather source is not configured. Check your settings.",
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, WeatherError::RateLimited { .. })
    }

    /// Whether repeating the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            WeatherError::RateLimited { .. } | WeatherError::Network(_) => true,
            WeatherError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Extension trait for converting HTTP error statuses to weather errors.
pub trait StatusErrorExt {
    fn into_weather_error(self, provider: &'static str, body: String) -> WeatherError;
}

impl StatusErrorExt for reqwest::StatusCode {
    fn into_weather_error(self, provider: &'static str, body: String) -> WeatherError {
        if self == reqwest::StatusCode::TOO_MANY_REQUESTS {
            WeatherError::RateLimited {
                provider,
                retry_after_secs: DEFAULT_RETRY_AFTER_SECS,
            }
        } else {
            WeatherError::Api {
                provider,
                status: self.as_u16(),
                message: body,
            }
        }
    }
}

/// Used when a 429 response carries no usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Reads `Retry-After` (seconds form) from a 429 response.
pub fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
