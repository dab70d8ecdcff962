//! End-to-end dispatch tests: liveness policy, forced random draws, and the
//! noise scenarios the runtime must reproduce exactly.

use std::cell::RefCell;
use std::rc::Rc;

use embla_hal::{BackendCall, MockBackend};
use embla_runtime::{GateOp, MeasureOp, MockMemory, QuantumRegister, QubitRef, Runner};
use rand::rngs::StdRng;
use rand::{Error, RngCore, SeedableRng};

/// Generator whose every `f64` draw is the same fixed value.
///
/// `Standard` samples `f64` as `(next_u64() >> 11) * 2^-53`, so seeding the
/// upper 53 bits with `d * 2^53` makes every draw come out as `d`.
struct FixedRng {
    value: u64,
}

impl FixedRng {
    fn drawing(d: f64) -> Self {
        Self {
            value: ((d * (1u64 << 53) as f64) as u64) << 11,
        }
    }
}

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        (self.value >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.value
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.value.to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

fn setup(n: usize) -> (Rc<RefCell<MockBackend>>, QuantumRegister) {
    let backend = MockBackend::new(n).shared();
    let reg = QuantumRegister::new(backend.clone(), (0..n).collect());
    (backend, reg)
}

fn refs(reg: &QuantumRegister, positions: &[usize]) -> Vec<QubitRef> {
    positions.iter().map(|p| reg.qubit(*p).unwrap()).collect()
}

// ---------------------------------------------------------------------------
// Forced-draw noise scenarios
// ---------------------------------------------------------------------------

#[test]
fn noisy_reset_draw_below_p_forces_one() {
    let (backend, reg) = setup(1);
    let op = GateOp::noisy_reset(0.8).unwrap();
    op.apply(&mut FixedRng::drawing(0.7), &refs(&reg, &[0]))
        .unwrap();

    assert_eq!(
        backend.borrow().calls(),
        &[BackendCall::ForceMeasure {
            addr: 0,
            outcome: true
        }]
    );
}

#[test]
fn noisy_reset_draw_at_or_above_p_forces_zero() {
    let (backend, reg) = setup(1);
    let op = GateOp::noisy_reset(0.8).unwrap();
    op.apply(&mut FixedRng::drawing(0.9), &refs(&reg, &[0]))
        .unwrap();

    assert_eq!(
        backend.borrow().calls(),
        &[BackendCall::ForceMeasure {
            addr: 0,
            outcome: false
        }]
    );
}

#[test]
fn pauli_error_draw_at_p_is_noop() {
    let (backend, reg) = setup(2);
    let op = GateOp::pauli_error(0.5, "xz").unwrap();
    op.apply(&mut FixedRng::drawing(0.5), &refs(&reg, &[0, 1]))
        .unwrap();
    assert_eq!(backend.borrow().call_count(), 0);
}

#[test]
fn pauli_error_draw_below_p_applies_pattern() {
    let (backend, reg) = setup(2);
    let op = GateOp::pauli_error(0.5, "xz").unwrap();
    op.apply(&mut FixedRng::drawing(0.25), &refs(&reg, &[0, 1]))
        .unwrap();

    assert_eq!(
        backend.borrow().calls(),
        &[
            BackendCall::Unary {
                selector: "x".into(),
                addr: 0
            },
            BackendCall::Unary {
                selector: "z".into(),
                addr: 1
            },
        ]
    );
}

#[test]
fn noisy_measurement_with_p_zero_always_flips() {
    let (backend, reg) = setup(1);
    backend.borrow_mut().queue_outcomes([true]);
    let op = MeasureOp::noisy_pauli('z', 0.0).unwrap();
    let outcome = op
        .do_measurement(&mut FixedRng::drawing(0.3), &refs(&reg, &[0]))
        .unwrap();
    assert!(!outcome);
}

#[test]
fn noisy_measurement_with_full_fidelity_is_truthful() {
    let (backend, reg) = setup(1);
    backend.borrow_mut().queue_outcomes([true]);
    let op = MeasureOp::noisy_pauli('z', 1.0).unwrap();
    let outcome = op
        .do_measurement(&mut FixedRng::drawing(0.999), &refs(&reg, &[0]))
        .unwrap();
    assert!(outcome);
}

#[test]
fn parity_zz_xors_independent_outcomes() {
    let (backend, reg) = setup(2);
    backend.borrow_mut().queue_outcomes([true, false]);
    let op = MeasureOp::perfect_parity("zz").unwrap();
    let outcome = op
        .do_measurement(&mut StdRng::seed_from_u64(1), &refs(&reg, &[0, 1]))
        .unwrap();
    assert!(outcome);
}

// ---------------------------------------------------------------------------
// Lost-qubit skip policy (no backend call may be made)
// ---------------------------------------------------------------------------

#[test]
fn runner_skips_gate_on_lost_qubit() {
    let (backend, reg) = setup(1);
    let q = reg.qubit(0).unwrap();
    q.drop_qubit().unwrap();

    let mut runner = Runner::seeded(MockMemory::new(0), 3);
    runner.apply(&GateOp::unary("h"), &[q]).unwrap();

    assert_eq!(backend.borrow().call_count(), 0);
}

#[test]
fn runner_skips_group_containing_lost_control() {
    let (backend, reg) = setup(2);
    reg.drop_qubit(0).unwrap();

    let mut runner = Runner::seeded(MockMemory::new(0), 3);
    runner
        .apply(&GateOp::controlled("mcz"), &refs(&reg, &[0, 1]))
        .unwrap();

    assert_eq!(backend.borrow().call_count(), 0);
}

#[test]
fn runner_parallel_apply_skips_only_lost_groups() {
    let (backend, reg) = setup(3);
    reg.drop_qubit(1).unwrap();

    let mut runner = Runner::seeded(MockMemory::new(0), 3);
    let groups: Vec<Vec<QubitRef>> = (0..3).map(|i| refs(&reg, &[i])).collect();
    runner
        .parallel_apply(&GateOp::unary("x"), &groups)
        .unwrap();

    let addrs: Vec<usize> = backend
        .borrow()
        .calls()
        .iter()
        .map(|c| match c {
            BackendCall::Unary { addr, .. } => *addr,
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    assert_eq!(addrs, vec![0, 2]);
}

#[test]
fn runner_measurement_on_lost_qubit_skips_backend() {
    let (backend, reg) = setup(1);
    let q = reg.qubit(0).unwrap();
    q.drop_qubit().unwrap();

    let mut runner = Runner::seeded(MockMemory::new(0), 3);
    let op = MeasureOp::perfect_pauli('z').unwrap();

    // Default loss outcome is the bright |1⟩ state.
    assert!(runner.measure(&op, &[q.clone()]).unwrap());
    assert_eq!(backend.borrow().call_count(), 0);

    let mut runner = Runner::seeded(MockMemory::new(0), 3).with_loss_outcome(false);
    assert!(!runner.measure(&op, &[q]).unwrap());
}

// ---------------------------------------------------------------------------
// Parallel sequencing
// ---------------------------------------------------------------------------

#[test]
fn parallel_apply_invokes_once_per_group_in_order() {
    let (backend, reg) = setup(3);
    let op = GateOp::unary("x");
    let groups: Vec<Vec<QubitRef>> = (0..3).map(|i| refs(&reg, &[i])).collect();
    op.parallel_apply(&mut StdRng::seed_from_u64(5), &groups)
        .unwrap();

    assert_eq!(backend.borrow().call_count(), 3);
    let addrs: Vec<usize> = backend
        .borrow()
        .calls()
        .iter()
        .map(|c| match c {
            BackendCall::Unary { addr, .. } => *addr,
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    assert_eq!(addrs, vec![0, 1, 2]);
}

#[test]
fn parallel_measurement_outcomes_do_not_condition_each_other() {
    let (backend, reg) = setup(2);
    backend.borrow_mut().queue_outcomes([true, false]);
    let op = MeasureOp::perfect_pauli('z').unwrap();
    let groups = vec![refs(&reg, &[0]), refs(&reg, &[1])];
    let outcomes = op
        .do_parallel_measurement(&mut StdRng::seed_from_u64(5), &groups)
        .unwrap();
    assert_eq!(outcomes, vec![true, false]);
}
