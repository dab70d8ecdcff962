//! Error types for the backend abstraction layer.

use thiserror::Error;

/// Errors reported by a simulation backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    /// The backend cannot hold any more qubits.
    #[error("Backend resource ceiling reached: {0}")]
    ResourceExhausted(String),

    /// The gate selector is not implemented by this backend.
    #[error("Unknown gate selector '{0}'")]
    UnknownGate(String),

    /// A qubit address outside the backend's register was used.
    #[error("Address {addr} out of range for backend with {num_qubits} qubits")]
    InvalidAddress {
        /// The offending address.
        addr: usize,
        /// Current backend register size.
        num_qubits: usize,
    },

    /// The operation is not supported in the backend's current configuration.
    #[error("Unsupported backend operation: {0}")]
    Unsupported(String),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
