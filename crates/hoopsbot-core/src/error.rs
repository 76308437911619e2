//! Error types for hoopsbot-core.
//!
//! Each external collaborator (league site, Telegram, Google Sheets,
//! the chat-history gateway) gets its own thiserror enum, unified
//! under [`CoreError`] for the orchestrator.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error covering every step of a bot invocation.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Config file or environment variable problems
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// League page or render gateway failures
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Telegram Bot API failures
    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),

    /// Google Sheets persistence failures
    #[error("Sheets error: {0}")]
    Sheets(#[from] SheetsError),

    /// Chat-history gateway failures
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// Bad values in config-driven patterns
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Filesystem errors while locating or writing the config
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and parsing errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Cannot write config file {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Config file {path} is not valid TOML: {message}")]
    ParseFailed { path: PathBuf, message: String },

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
}

/// Errors from fetching the monitored page or the render gateway.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP client construction failed
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Transport-level failure
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Render gateway did not answer within its deadline
    #[error("Render gateway timed out after {timeout_secs} seconds")]
    RenderTimeout { timeout_secs: u64 },
}

/// Telegram Bot API errors.
#[derive(Error, Debug)]
pub enum TelegramError {
    /// Transport-level failure
    #[error("Telegram request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with ok=false or a non-success status
    #[error("Telegram API rejected {method}: {description}")]
    Api { method: String, description: String },

    /// Poll option count outside the API bounds
    #[error("Poll must have between 2 and 10 options, got {count}")]
    InvalidOptionCount { count: usize },
}

/// Spreadsheet persistence errors.
#[derive(Error, Debug)]
pub enum SheetsError {
    /// Transport-level failure
    #[error("Sheets request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status from the Sheets API
    #[error("Sheets API returned status {status} for {operation}")]
    Status { operation: String, status: u16 },

    /// Response body did not have the expected shape
    #[error("Unexpected Sheets response for {operation}: {message}")]
    UnexpectedResponse { operation: String, message: String },
}

/// Chat-history gateway errors.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Transport-level failure
    #[error("History gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status from the gateway
    #[error("History gateway returned status {status}")]
    Status { status: u16 },

    /// Response body did not have the expected shape
    #[error("Unexpected history gateway response: {0}")]
    UnexpectedResponse(String),
}

/// Errors raised when config-supplied values fail to compile or parse.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Crate-wide result with [`CoreError`] as the default error.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
