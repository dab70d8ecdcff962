//! Error types for the runtime core.
//!
//! Every error here is fatal for the run: nothing is retried or recovered
//! locally, because partially applied quantum operations leave the backend in
//! a state no caller can reason about. The one intentional soft branch —
//! skipping operations on lost qubits — is not an error at all and lives in
//! [`Runner`](crate::runner::Runner).

use embla_hal::BackendError;
use thiserror::Error;

/// Errors that can occur in the simulation runtime.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    /// Fixed-capacity allocator overflow.
    #[error("qubit allocation exceeds memory, {total} qubits, {allocated} allocated")]
    CapacityExceeded {
        /// Capacity of the allocator.
        total: usize,
        /// Cursor value the allocation would have produced.
        allocated: usize,
    },

    /// Growable allocation against an incompatible backend configuration.
    #[error("Unsupported backend mode: {0}")]
    UnsupportedBackendMode(String),

    /// Double-drop of a qubit. Indicates an upstream compiler/runtime bug.
    #[error("Qubit at position {pos} is already lost")]
    AlreadyLost {
        /// Register position of the qubit.
        pos: usize,
    },

    /// Position index outside a register.
    #[error("Index {index} out of range for register of size {size}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Register size.
        size: usize,
    },

    /// Malformed Pauli error pattern.
    #[error("Invalid error pattern '{pattern}': symbol '{symbol}' not in {{i, x, y, z}}")]
    InvalidErrorPattern {
        /// The full pattern string.
        pattern: String,
        /// The first offending symbol.
        symbol: char,
    },

    /// Malformed noise-channel probability distribution.
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    /// A measurement basis outside {x, y, z}.
    #[error("Invalid measurement basis '{0}': must be one of x, y, z")]
    InvalidBasis(char),

    /// Descriptor arity does not match the qubit group it was applied to.
    #[error("Length mismatch: operation expects {expected} qubits, got {got}")]
    LengthMismatch {
        /// Arity of the descriptor.
        expected: usize,
        /// Number of qubit references supplied.
        got: usize,
    },

    /// Backend-level failure.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
