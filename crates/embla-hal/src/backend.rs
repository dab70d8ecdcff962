//! The backend capability trait and its construction-time configuration.
//!
//! # Contract
//!
//! A [`StateBackend`] is the opaque engine that holds and evolves quantum
//! state. The runtime core never inspects amplitudes; it only drives the
//! primitives below, keyed by qubit *address*:
//!
//! | Method | Kind | Returns |
//! |--------|------|---------|
//! | `num_qubits()` | introspection | `usize` |
//! | `is_tensor_network()` | introspection | `bool` |
//! | `allocate_qubit()` | mutation | `BackendResult<()>` |
//! | `apply_unary()` | mutation | `BackendResult<()>` |
//! | `apply_controlled()` | mutation | `BackendResult<()>` |
//! | `apply_rotation()` | mutation | `BackendResult<()>` |
//! | `force_measure()` | mutation | `BackendResult<()>` |
//! | `measure_pauli()` | mutation | `BackendResult<bool>` |
//!
//! All calls are synchronous: the runtime is single-threaded per run and the
//! handle is not reentrant. Handles are *replaced*, never rewound — a memory
//! reset constructs a fresh backend through a [`BackendFactory`] so results
//! holding the old handle keep observing the state they were produced from.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::BackendResult;
use crate::pauli::Pauli;

/// Shared, single-threaded handle to a simulation backend.
///
/// Registers clone this handle at creation and keep it for their whole
/// lifetime; the owning allocator swaps in a new one on reset.
pub type SharedBackend = Rc<RefCell<dyn StateBackend>>;

/// Capability interface required from a simulation engine.
pub trait StateBackend {
    /// Number of qubits currently held by the backend.
    fn num_qubits(&self) -> usize;

    /// Whether the backend runs in a tensor-network representation.
    ///
    /// Queried once at allocator construction; tensor-network engines cannot
    /// grow their register incrementally.
    fn is_tensor_network(&self) -> bool;

    /// Bring the qubit at `index` into existence.
    ///
    /// Only growable allocators call this; fixed-capacity allocators size
    /// the backend up front via [`BackendOptions::qubit_count`].
    fn allocate_qubit(&mut self, index: usize) -> BackendResult<()>;

    /// Apply the named single-qubit gate to `addr`.
    fn apply_unary(&mut self, selector: &str, addr: usize) -> BackendResult<()>;

    /// Apply the named controlled gate with `controls` onto `target`.
    fn apply_controlled(
        &mut self,
        selector: &str,
        controls: &[usize],
        target: usize,
    ) -> BackendResult<()>;

    /// Apply a single-axis rotation by `angle` radians to `addr`.
    fn apply_rotation(&mut self, axis: Pauli, angle: f64, addr: usize) -> BackendResult<()>;

    /// Collapse the qubit at `addr` to the given computational outcome.
    fn force_measure(&mut self, addr: usize, outcome: bool) -> BackendResult<()>;

    /// Measure the qubit at `addr` in the given Pauli basis.
    fn measure_pauli(&mut self, basis: Pauli, addr: usize) -> BackendResult<bool>;
}

/// Constructs backend handles from options.
///
/// Every call returns a brand-new handle. Allocators hold a factory so that
/// `reset()` can replace their backend instead of mutating it back to the
/// initial state.
pub trait BackendFactory {
    /// Build a fresh backend configured by `options`.
    fn create(&self, options: &BackendOptions) -> BackendResult<SharedBackend>;
}

/// Construction-time configuration forwarded verbatim to the engine.
///
/// The runtime core interprets only `qubit_count` and `is_tensor_network`;
/// the remaining switches select engine representations and acceleration
/// paths whose semantics live entirely behind the [`StateBackend`] boundary.
/// Serialized keys use the engine's native camelCase spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendOptions {
    /// Initial register size.
    pub qubit_count: usize,
    /// Tensor-network representation.
    pub is_tensor_network: bool,
    /// Multi-qubit Schmidt decomposition.
    pub is_schmidt_decompose_multi: bool,
    /// Schmidt decomposition.
    pub is_schmidt_decompose: bool,
    /// Stabilizer-hybrid representation.
    pub is_stabilizer_hybrid: bool,
    /// Binary decision tree representation.
    pub is_binary_decision_tree: bool,
    /// Paged state memory.
    pub is_paged: bool,
    /// CPU/GPU hybrid execution.
    pub is_cpu_gpu_hybrid: bool,
    /// OpenCL acceleration.
    pub is_open_c_l: bool,
    /// Host-pointer state memory.
    pub is_host_pointer: bool,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            qubit_count: 0,
            is_tensor_network: false,
            is_schmidt_decompose_multi: false,
            is_schmidt_decompose: false,
            is_stabilizer_hybrid: false,
            is_binary_decision_tree: true,
            is_paged: false,
            is_cpu_gpu_hybrid: false,
            is_open_c_l: false,
            is_host_pointer: false,
        }
    }
}

impl BackendOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial register size.
    #[must_use]
    pub fn with_qubit_count(mut self, n: usize) -> Self {
        self.qubit_count = n;
        self
    }

    /// Enable the tensor-network representation.
    #[must_use]
    pub fn with_tensor_network(mut self, on: bool) -> Self {
        self.is_tensor_network = on;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = BackendOptions::default();
        assert_eq!(opts.qubit_count, 0);
        assert!(opts.is_binary_decision_tree);
        assert!(!opts.is_tensor_network);
        assert!(!opts.is_paged);
    }

    #[test]
    fn test_builder() {
        let opts = BackendOptions::new()
            .with_qubit_count(5)
            .with_tensor_network(true);
        assert_eq!(opts.qubit_count, 5);
        assert!(opts.is_tensor_network);
    }

    #[test]
    fn test_serde_camel_case_keys() {
        let json = serde_json::to_value(BackendOptions::default()).unwrap();
        assert!(json.get("qubitCount").is_some());
        assert!(json.get("isTensorNetwork").is_some());
        assert!(json.get("isBinaryDecisionTree").is_some());
    }

    #[test]
    fn test_serde_partial_input() {
        let opts: BackendOptions =
            serde_json::from_str(r#"{"qubitCount": 3, "isPaged": true}"#).unwrap();
        assert_eq!(opts.qubit_count, 3);
        assert!(opts.is_paged);
        // Unspecified fields keep their defaults.
        assert!(opts.is_binary_decision_tree);
    }
}
