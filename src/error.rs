//! Error types for playmatch

use thiserror::Error;

/// Result type for playmatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the host.
///
/// Missing assets and distractor exhaustion are recovered locally and never show up
/// here; these variants cover catalog misuse, session misuse and configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// Round generation was asked to work on a catalog with no concepts
    #[error("Catalog is empty")]
    EmptyCatalog,

    /// A round needs the target plus at least one distractor
    #[error("Option count must be at least 2, got {0}")]
    TooFewOptions(usize),

    /// Catalog and unrelated pool together cannot fill one round with unique keys
    #[error("Catalog has {available} distinct concepts, a round needs {needed}")]
    CatalogTooSmall { available: usize, needed: usize },

    /// Two concepts share a key
    #[error("Duplicate concept key: {0}")]
    DuplicateKey(String),

    /// A fallback default names a key that is not in the catalog
    #[error("Default concept '{0}' is not in the catalog")]
    UnknownDefault(String),

    /// An unrelated-pool concept reuses a catalog key
    #[error("Unrelated concept '{0}' collides with a catalog key")]
    UnrelatedCollision(String),

    /// Lookup by key failed
    #[error("Not found: {0}")]
    NotFound(String),

    /// All configured rounds have been played
    #[error("Session finished after {0} rounds")]
    SessionFinished(u32),

    /// The current round has not been answered yet
    #[error("Round {0} is still waiting for an answer")]
    RoundPending(u32),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON encoding of host events
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
