//! Embla simulation runtime core.
//!
//! The execution-time bridge between an abstract circuit instruction stream
//! and a stateful simulation backend. Three concerns live here:
//!
//! - **Qubit memory** ([`memory`]): mapping logical qubit counts to backend
//!   addresses under fixed-capacity ([`StackMemory`]) or growable
//!   ([`DynamicMemory`]) disciplines, with replace-on-reset backend handles.
//! - **Registers and liveness** ([`register`]): per-qubit Active/Lost
//!   tracking outside the backend, so operations on physically lost qubits
//!   become no-ops instead of aborts.
//! - **Dispatch** ([`gate`], [`measure`], [`runner`]): frozen gate and
//!   measurement descriptors applied through a [`Runner`] that owns the
//!   run's random generator and centralizes the skip-on-lost policy.
//!
//! The backend itself is opaque; see [`embla_hal`].
//!
//! # Example
//!
//! ```
//! use embla_hal::{BackendOptions, MockFactory};
//! use embla_runtime::{GateOp, MeasureOp, Runner, StackMemory};
//!
//! # fn main() -> embla_runtime::RuntimeResult<()> {
//! let memory = StackMemory::new(
//!     Box::new(MockFactory::new()),
//!     BackendOptions::default(),
//!     2,
//! )?;
//! let mut runner = Runner::seeded(memory, 42);
//!
//! let reg = runner.allocate_register(2)?;
//! let q0 = reg.qubit(0)?;
//! let q1 = reg.qubit(1)?;
//!
//! runner.apply(&GateOp::unary("h"), &[q0.clone()])?;
//! runner.apply(&GateOp::controlled("mcx"), &[q0, q1.clone()])?;
//! let outcome = runner.measure(&MeasureOp::perfect_pauli('z')?, &[q1])?;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod gate;
pub mod measure;
pub mod memory;
pub mod register;
pub mod runner;

pub use error::{RuntimeError, RuntimeResult};
pub use gate::{GateOp, PauliChannel};
pub use measure::MeasureOp;
pub use memory::{DynamicMemory, MockMemory, QubitMemory, StackMemory};
pub use register::{
    ClassicalBitRef, ClassicalRegister, QuantumRegister, QubitRef, QubitState,
};
pub use runner::Runner;

pub use embla_hal::Pauli;
