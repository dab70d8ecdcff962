//! The run-scoped dispatch surface handed to the interpreter.
//!
//! A [`Runner`] owns exactly one qubit memory and one random generator for
//! the lifetime of a run, and is the single place where the lost-qubit
//! policy lives: any operation whose qubit group contains a Lost qubit is
//! skipped *before* the descriptor executes, so no backend call is made.
//! Skipping is a normal operational branch, not an error — circuits are
//! compiled without knowledge of runtime loss and must not abort mid-run.
//!
//! Multi-shot execution is sequential: [`reset`](Runner::reset) between
//! shots rewinds the allocator and replaces the backend handle. Parallel
//! shots require one fully independent `Runner` (memory, backend, generator)
//! per shot; nothing here is shared across runners.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::error::RuntimeResult;
use crate::gate::GateOp;
use crate::measure::MeasureOp;
use crate::memory::QubitMemory;
use crate::register::{ClassicalRegister, QuantumRegister, QubitRef};

/// Owns the allocator and random generator for one run.
pub struct Runner<M, R = StdRng> {
    memory: M,
    rng: R,
    loss_outcome: bool,
}

impl<M: QubitMemory> Runner<M, StdRng> {
    /// Runner with a generator seeded for reproducibility.
    ///
    /// A fixed seed plus a fixed instruction sequence reproduces identical
    /// outcomes.
    pub fn seeded(memory: M, seed: u64) -> Self {
        Self::with_rng(memory, StdRng::seed_from_u64(seed))
    }
}

impl<M: QubitMemory, R: Rng> Runner<M, R> {
    /// Runner over an explicit generator.
    pub fn with_rng(memory: M, rng: R) -> Self {
        Self {
            memory,
            rng,
            loss_outcome: true,
        }
    }

    /// Set the outcome reported when measuring a lost qubit group.
    ///
    /// Defaults to `true`: a lost atom scatters no light, which readout
    /// classifies as the bright |1⟩ outcome on typical hardware.
    #[must_use]
    pub fn with_loss_outcome(mut self, outcome: bool) -> Self {
        self.loss_outcome = outcome;
        self
    }

    /// The owned qubit memory.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Allocate `n` qubits and wrap them in a register bound to the current
    /// backend handle.
    pub fn allocate_register(&mut self, n: usize) -> RuntimeResult<QuantumRegister> {
        let addrs = self.memory.allocate(n)?;
        Ok(QuantumRegister::new(self.memory.backend(), addrs))
    }

    /// Allocate a classical register of `n` bits.
    pub fn classical_register(&self, n: usize) -> ClassicalRegister {
        ClassicalRegister::new(n)
    }

    /// Shot boundary: rewind the allocator and replace the backend handle.
    ///
    /// Registers from the previous shot keep their old handle; no shot
    /// observes another shot's qubit state.
    pub fn reset(&mut self) -> RuntimeResult<()> {
        self.memory.reset()
    }

    /// Apply a gate, skipping the whole group if any qubit in it is lost.
    pub fn apply(&mut self, op: &GateOp, qubits: &[QubitRef]) -> RuntimeResult<()> {
        if let Some(lost) = first_lost(qubits) {
            debug!(pos = lost.pos(), "skipping gate on lost qubit");
            return Ok(());
        }
        op.apply(&mut self.rng, qubits)
    }

    /// Apply once per group, in input order, skipping groups with lost
    /// qubits.
    pub fn parallel_apply(&mut self, op: &GateOp, groups: &[Vec<QubitRef>]) -> RuntimeResult<()> {
        for group in groups {
            self.apply(op, group)?;
        }
        Ok(())
    }

    /// Measure a qubit group.
    ///
    /// A group containing a lost qubit is not measured; the configured loss
    /// outcome is reported instead.
    pub fn measure(&mut self, op: &MeasureOp, qubits: &[QubitRef]) -> RuntimeResult<bool> {
        if let Some(lost) = first_lost(qubits) {
            debug!(pos = lost.pos(), "reporting loss outcome for lost qubit");
            return Ok(self.loss_outcome);
        }
        op.do_measurement(&mut self.rng, qubits)
    }

    /// Measure each group independently, in input order.
    pub fn parallel_measure(
        &mut self,
        op: &MeasureOp,
        groups: &[Vec<QubitRef>],
    ) -> RuntimeResult<Vec<bool>> {
        groups
            .iter()
            .map(|group| self.measure(op, group))
            .collect()
    }
}

fn first_lost(qubits: &[QubitRef]) -> Option<&QubitRef> {
    qubits.iter().find(|q| !q.is_active())
}
