//! Error types for actor initialisation and configuration loading.

use thiserror::Error;

/// Errors raised while building an actor's animation resources.
///
/// Never fatal to the game: the caller logs it and drops the half-built actor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitError {
    /// Sprite sheet is not known to the asset catalog.
    #[error("missing sprite sheet '{key}'")]
    MissingAsset { key: String },

    /// Sheet exists but has fewer frames than the animation needs.
    #[error("sprite sheet '{key}' has {available} frames, animation needs {expected}")]
    FrameCountMismatch {
        key: String,
        expected: usize,
        available: usize,
    },
}

/// Errors that can occur when loading tuning tables or settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing failed.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Values parsed but make no sense together.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
