//! Error types for schema-graph-proof.

use thiserror::Error;

/// Proof-subsystem error kinds.
#[derive(Debug, Error)]
pub enum ProofError {
    /// Unknown proof-backend tag passed to the factory.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A ledger backend was selected but a required environment variable was
    /// not set at initialization time. Carries the variable's name so the
    /// operator knows exactly what to set.
    #[error("missing required configuration: {var}")]
    ConfigMissing { var: String },

    /// The ledger rejected or failed to accept a submitted epoch.
    #[error("remote submission failed: {0}")]
    RemoteFailure(String),
}

pub type Result<T> = std::result::Result<T, ProofError>;
