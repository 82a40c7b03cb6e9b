//! Error types for steamnote-core

use thiserror::Error;

/// Result type alias using steamnote-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading mappings or reconciling games
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid mapping document. Fatal to the whole run; no game is
    /// processed after this surfaces.
    #[error("Invalid mapping config: {0}")]
    Config(String),

    /// A format template referenced a field absent from the game record.
    /// Fatal to that game's reconciliation only.
    #[error("Rule '{rule}' references missing field '{field}'")]
    MissingField { rule: String, field: String },

    /// A resolved value could not be coerced to the rule's declared
    /// property kind. Fatal to that game's reconciliation only.
    #[error("Rule '{rule}' cannot coerce '{value}' to {kind}")]
    TypeCoercion {
        rule: String,
        kind: String,
        value: String,
    },
}

impl Error {
    /// Whether this error aborts only one game's reconciliation, leaving
    /// the rest of the run intact.
    #[must_use]
    pub fn is_per_game(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::TypeCoercion { .. })
    }
}
