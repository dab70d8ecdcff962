//! Recording backend double for contract tests.
//!
//! [`MockBackend`] implements [`StateBackend`] without holding any quantum
//! state: every primitive is recorded as a [`BackendCall`] and measurement
//! outcomes are replayed from a queue. Runtime tests use it to assert *which*
//! backend calls were made (in particular, that none were made for a lost
//! qubit) and [`MockFactory`] keeps a handle to every backend it built so
//! multi-shot tests can verify that reset replaces the handle rather than
//! rewinding it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::backend::{BackendFactory, BackendOptions, SharedBackend, StateBackend};
use crate::error::BackendResult;
use crate::pauli::Pauli;

/// One recorded backend primitive invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// `allocate_qubit(index)`.
    AllocateQubit {
        /// Requested address.
        index: usize,
    },
    /// `apply_unary(selector, addr)`.
    Unary {
        /// Gate selector.
        selector: String,
        /// Target address.
        addr: usize,
    },
    /// `apply_controlled(selector, controls, target)`.
    Controlled {
        /// Gate selector.
        selector: String,
        /// Control addresses.
        controls: Vec<usize>,
        /// Target address.
        target: usize,
    },
    /// `apply_rotation(axis, angle, addr)`.
    Rotation {
        /// Rotation axis.
        axis: Pauli,
        /// Angle in radians.
        angle: f64,
        /// Target address.
        addr: usize,
    },
    /// `force_measure(addr, outcome)`.
    ForceMeasure {
        /// Target address.
        addr: usize,
        /// Forced outcome.
        outcome: bool,
    },
    /// `measure_pauli(basis, addr)`.
    MeasurePauli {
        /// Measurement basis.
        basis: Pauli,
        /// Target address.
        addr: usize,
    },
}

/// A stateless recording backend.
#[derive(Debug, Default)]
pub struct MockBackend {
    num_qubits: usize,
    tensor_network: bool,
    calls: Vec<BackendCall>,
    outcomes: VecDeque<bool>,
}

impl MockBackend {
    /// Backend with `num_qubits` pre-existing qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            ..Self::default()
        }
    }

    /// Backend configured like a real engine would be.
    pub fn from_options(options: &BackendOptions) -> Self {
        Self {
            num_qubits: options.qubit_count,
            tensor_network: options.is_tensor_network,
            ..Self::default()
        }
    }

    /// Wrap in the shared-handle type the runtime expects.
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Queue outcomes returned by subsequent `measure_pauli` calls.
    ///
    /// An exhausted queue yields `false`.
    pub fn queue_outcomes(&mut self, outcomes: impl IntoIterator<Item = bool>) {
        self.outcomes.extend(outcomes);
    }

    /// All recorded calls, in invocation order.
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.len()
    }
}

impl StateBackend for MockBackend {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn is_tensor_network(&self) -> bool {
        self.tensor_network
    }

    fn allocate_qubit(&mut self, index: usize) -> BackendResult<()> {
        self.calls.push(BackendCall::AllocateQubit { index });
        self.num_qubits = self.num_qubits.max(index + 1);
        Ok(())
    }

    fn apply_unary(&mut self, selector: &str, addr: usize) -> BackendResult<()> {
        self.calls.push(BackendCall::Unary {
            selector: selector.to_owned(),
            addr,
        });
        Ok(())
    }

    fn apply_controlled(
        &mut self,
        selector: &str,
        controls: &[usize],
        target: usize,
    ) -> BackendResult<()> {
        self.calls.push(BackendCall::Controlled {
            selector: selector.to_owned(),
            controls: controls.to_vec(),
            target,
        });
        Ok(())
    }

    fn apply_rotation(&mut self, axis: Pauli, angle: f64, addr: usize) -> BackendResult<()> {
        self.calls.push(BackendCall::Rotation { axis, angle, addr });
        Ok(())
    }

    fn force_measure(&mut self, addr: usize, outcome: bool) -> BackendResult<()> {
        self.calls.push(BackendCall::ForceMeasure { addr, outcome });
        Ok(())
    }

    fn measure_pauli(&mut self, basis: Pauli, addr: usize) -> BackendResult<bool> {
        self.calls.push(BackendCall::MeasurePauli { basis, addr });
        Ok(self.outcomes.pop_front().unwrap_or(false))
    }
}

/// Factory producing [`MockBackend`] handles.
///
/// Clones share the created-handle list, so a test can hold one clone while
/// an allocator owns the other and still inspect every backend the allocator
/// constructed across resets.
#[derive(Debug, Clone, Default)]
pub struct MockFactory {
    created: Rc<RefCell<Vec<Rc<RefCell<MockBackend>>>>>,
}

impl MockFactory {
    /// New factory with an empty creation log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles to every backend this factory has created, oldest first.
    pub fn created(&self) -> Vec<Rc<RefCell<MockBackend>>> {
        self.created.borrow().clone()
    }

    /// Handle to the most recently created backend.
    pub fn latest(&self) -> Option<Rc<RefCell<MockBackend>>> {
        self.created.borrow().last().cloned()
    }
}

impl BackendFactory for MockFactory {
    fn create(&self, options: &BackendOptions) -> BackendResult<SharedBackend> {
        let backend = MockBackend::from_options(options).shared();
        self.created.borrow_mut().push(Rc::clone(&backend));
        Ok(backend)
    }
}
