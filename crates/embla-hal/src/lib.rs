//! Embla simulation-backend abstraction layer.
//!
//! This crate defines the capability boundary between the Embla runtime core
//! and whatever engine actually holds the quantum state. The engine is
//! opaque: the runtime addresses qubits by integer slot and drives a small
//! set of primitives — allocation, unary/controlled/rotation gates by string
//! selector, forced collapse, and Pauli-basis measurement.
//!
//! # Overview
//!
//! - [`StateBackend`] — the synchronous capability trait every engine
//!   implements.
//! - [`SharedBackend`] — the `Rc<RefCell<_>>` handle the runtime threads
//!   through allocators and registers. Single-threaded by contract.
//! - [`BackendFactory`] / [`BackendOptions`] — replace-on-reset
//!   construction: a memory reset never rewinds a handle, it builds a new
//!   one, so registers created before the reset keep observing the state
//!   they were bound to.
//! - [`Pauli`] — operator/axis/basis codes shared by gates and measurement.
//! - [`MockBackend`] / [`MockFactory`] — recording double for contract
//!   tests.
//!
//! # Example
//!
//! ```
//! use embla_hal::{BackendFactory, BackendOptions, MockFactory, Pauli, StateBackend};
//!
//! let factory = MockFactory::new();
//! let options = BackendOptions::new().with_qubit_count(2);
//! let backend = factory.create(&options).unwrap();
//!
//! backend.borrow_mut().apply_unary("h", 0).unwrap();
//! backend.borrow_mut().apply_controlled("mcx", &[0], 1).unwrap();
//! let outcome = backend.borrow_mut().measure_pauli(Pauli::Z, 1).unwrap();
//! assert!(!outcome);
//! ```

pub mod backend;
pub mod error;
pub mod mock;
pub mod pauli;

pub use backend::{BackendFactory, BackendOptions, SharedBackend, StateBackend};
pub use error::{BackendError, BackendResult};
pub use mock::{BackendCall, MockBackend, MockFactory};
pub use pauli::Pauli;
