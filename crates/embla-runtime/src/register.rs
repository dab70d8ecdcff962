//! Quantum and classical registers and their lightweight references.
//!
//! A [`QuantumRegister`] is a batch of qubits allocated together: an
//! immutable address block plus a per-position liveness vector. Liveness is
//! tracked outside the backend because a physically lost qubit (atom loss in
//! a neutral-atom machine) still occupies its backend address; compiled
//! circuits keep issuing operations against it, and those must become no-ops
//! rather than aborts. The liveness vector is the register's only mutable
//! field, and [`drop_qubit`](QuantumRegister::drop_qubit) is its only
//! mutation path: transitions are monotonic, Active to Lost.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use embla_hal::SharedBackend;

use crate::error::{RuntimeError, RuntimeResult};

/// Liveness of one qubit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QubitState {
    /// The qubit responds to operations.
    Active,
    /// The qubit is permanently lost; operations on it are skipped.
    Lost,
}

struct RegisterInner {
    backend: SharedBackend,
    addrs: Box<[usize]>,
    state: RefCell<Box<[QubitState]>>,
}

/// A batch of logical qubits bound to one backend handle.
///
/// Cloning is cheap and clones alias the same register; mutation is limited
/// to the liveness vector, so aliasing is harmless.
#[derive(Clone)]
pub struct QuantumRegister {
    inner: Rc<RegisterInner>,
}

impl QuantumRegister {
    /// Create a register over `addrs`, all positions Active.
    ///
    /// The register binds permanently to the backend handle passed here —
    /// the handle alive at allocation time — not to whichever handle the
    /// allocator holds later.
    pub fn new(backend: SharedBackend, addrs: Vec<usize>) -> Self {
        let state = vec![QubitState::Active; addrs.len()];
        Self {
            inner: Rc::new(RegisterInner {
                backend,
                addrs: addrs.into_boxed_slice(),
                state: RefCell::new(state.into_boxed_slice()),
            }),
        }
    }

    /// Number of qubits in the register.
    pub fn size(&self) -> usize {
        self.inner.addrs.len()
    }

    /// Backend handle this register was allocated against.
    pub fn backend(&self) -> SharedBackend {
        Rc::clone(&self.inner.backend)
    }

    /// Backend address of position `pos`.
    pub fn addr(&self, pos: usize) -> RuntimeResult<usize> {
        self.check(pos)?;
        Ok(self.inner.addrs[pos])
    }

    /// Reference to the qubit at `pos`.
    pub fn qubit(&self, pos: usize) -> RuntimeResult<QubitRef> {
        self.check(pos)?;
        Ok(QubitRef {
            reg: self.clone(),
            pos,
        })
    }

    /// Whether the qubit at `pos` is still active.
    pub fn is_active(&self, pos: usize) -> RuntimeResult<bool> {
        self.check(pos)?;
        Ok(self.inner.state.borrow()[pos] == QubitState::Active)
    }

    /// Mark the qubit at `pos` as permanently lost.
    ///
    /// Dropping an already-lost qubit is an upstream bug and fails with
    /// [`RuntimeError::AlreadyLost`].
    pub fn drop_qubit(&self, pos: usize) -> RuntimeResult<()> {
        self.check(pos)?;
        let mut state = self.inner.state.borrow_mut();
        if state[pos] == QubitState::Lost {
            return Err(RuntimeError::AlreadyLost { pos });
        }
        state[pos] = QubitState::Lost;
        Ok(())
    }

    fn check(&self, pos: usize) -> RuntimeResult<()> {
        if pos >= self.size() {
            return Err(RuntimeError::IndexOutOfRange {
                index: pos,
                size: self.size(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for QuantumRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuantumRegister")
            .field("addrs", &self.inner.addrs)
            .field("state", &self.inner.state.borrow())
            .finish()
    }
}

/// A `(register, position)` pair.
///
/// Never a standalone owner of backend state; everything it exposes is
/// indirection into its register.
#[derive(Debug, Clone)]
pub struct QubitRef {
    reg: QuantumRegister,
    pos: usize,
}

impl QubitRef {
    /// The register this reference points into.
    pub fn register(&self) -> &QuantumRegister {
        &self.reg
    }

    /// Position within the register.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Backend address of this qubit.
    pub fn addr(&self) -> usize {
        // Position was validated when the reference was created.
        self.reg.inner.addrs[self.pos]
    }

    /// Backend handle the qubit lives in.
    pub fn backend(&self) -> SharedBackend {
        self.reg.backend()
    }

    /// Whether this qubit is still active.
    pub fn is_active(&self) -> bool {
        self.reg.inner.state.borrow()[self.pos] == QubitState::Active
    }

    /// Mark this qubit as permanently lost.
    pub fn drop_qubit(&self) -> RuntimeResult<()> {
        self.reg.drop_qubit(self.pos)
    }
}

/// Fixed-size classical bit storage, all bits false at construction.
#[derive(Debug, Clone)]
pub struct ClassicalRegister {
    bits: Rc<RefCell<Box<[bool]>>>,
}

impl ClassicalRegister {
    /// Create a register of `size` bits.
    pub fn new(size: usize) -> Self {
        Self {
            bits: Rc::new(RefCell::new(vec![false; size].into_boxed_slice())),
        }
    }

    /// Number of bits.
    pub fn size(&self) -> usize {
        self.bits.borrow().len()
    }

    /// Reference to the bit at `pos`.
    pub fn bit(&self, pos: usize) -> RuntimeResult<ClassicalBitRef> {
        if pos >= self.size() {
            return Err(RuntimeError::IndexOutOfRange {
                index: pos,
                size: self.size(),
            });
        }
        Ok(ClassicalBitRef {
            reg: self.clone(),
            pos,
        })
    }
}

/// A `(classical register, position)` pair with direct bit access.
#[derive(Debug, Clone)]
pub struct ClassicalBitRef {
    reg: ClassicalRegister,
    pos: usize,
}

impl ClassicalBitRef {
    /// Position within the register.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Read the bit.
    pub fn get_value(&self) -> bool {
        self.reg.bits.borrow()[self.pos]
    }

    /// Write the bit.
    pub fn set_value(&self, value: bool) {
        self.reg.bits.borrow_mut()[self.pos] = value;
    }
}
