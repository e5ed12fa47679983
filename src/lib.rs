//! Repo-Census: per-extension line and byte totals for public repositories
//!
//! This crate walks a repository's file-tree pages on the hosting service,
//! visits each file's detail page to read its line count and size, and
//! groups the results by file extension.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod crawler;
pub mod orchestrator;
pub mod output;
pub mod repository;

use thiserror::Error;

/// Main error type for Repo-Census operations
#[derive(Debug, Error)]
pub enum CensusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while fetching a page from the hosting service
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Cannot resolve path '{path}' against base URL: {source}")]
    InvalidPath {
        path: String,
        source: ::url::ParseError,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },
}

/// Errors raised while extracting required data from a parsed page
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Required node missing: {0}")]
    MissingNode(String),

    #[error("Invalid line number '{0}'")]
    InvalidLineNumber(String),

    #[error("Invalid size header: {0}")]
    Unit(#[from] crawler::UnitParseError),
}

/// Failure of a whole walk, carrying the first unrecoverable error
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Invalid repository identifier '{0}', expected owner/name")]
    InvalidRepository(String),

    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Parse error on {path}: {source}")]
    Parse { path: String, source: ParseError },

    #[error("Walk worker failed: {0}")]
    Worker(String),
}

/// Result type alias for Repo-Census operations
pub type Result<T> = std::result::Result<T, CensusError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for walk operations
pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

// Re-export commonly used types
pub use aggregate::{aggregate, AggregateBucket};
pub use config::Config;
pub use crawler::{FileEntry, TreeWalker};
pub use orchestrator::{census, ScrapeOrchestrator};
pub use repository::RepositoryId;
