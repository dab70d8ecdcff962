//! Gate dispatch descriptors.
//!
//! Each [`GateOp`] is a frozen, parameter-only value: applying it is a pure
//! function of its parameters, the qubit references passed in, and the next
//! draws of the shared random generator. Descriptors own no generator —
//! callers thread `&mut R` through every call, which keeps the
//! single-writer-per-run discipline visible at each call site and makes a
//! seeded run reproducible.
//!
//! Malformed noise parameters are rejected at construction, never at apply
//! time, so a bad channel can never fail a run after simulation work has
//! begun. Liveness is *not* consulted here; the skip-on-lost policy lives in
//! [`Runner`](crate::runner::Runner).

use rand::Rng;

use embla_hal::Pauli;

use crate::error::{RuntimeError, RuntimeResult};
use crate::register::QubitRef;

const PROB_SUM_TOLERANCE: f64 = 1e-9;

/// Parse an error-pattern string over the alphabet `{i, x, y, z}`.
pub(crate) fn parse_pattern(pattern: &str) -> RuntimeResult<Vec<Pauli>> {
    pattern
        .chars()
        .map(|c| {
            Pauli::try_from(c).map_err(|symbol| RuntimeError::InvalidErrorPattern {
                pattern: pattern.to_owned(),
                symbol,
            })
        })
        .collect()
}

fn check_probability(p: f64, what: &str) -> RuntimeResult<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(RuntimeError::InvalidDistribution(format!(
            "{what} must lie in [0, 1], got {p}"
        )));
    }
    Ok(())
}

fn check_arity(expected: usize, got: usize) -> RuntimeResult<()> {
    if expected != got {
        return Err(RuntimeError::LengthMismatch { expected, got });
    }
    Ok(())
}

/// Apply one Pauli operator to one qubit's address; identity is a no-op.
fn apply_pauli(qubit: &QubitRef, op: Pauli) -> RuntimeResult<()> {
    if op == Pauli::I {
        return Ok(());
    }
    qubit
        .backend()
        .borrow_mut()
        .apply_unary(op.selector(), qubit.addr())?;
    Ok(())
}

/// A discrete distribution over tensor products of Pauli operators.
///
/// The probability vector has length `4^k` for `k` target qubits. Index 0 is
/// the all-identity term; every other index is decoded in base 4, least
/// significant qubit first, with digits `0..=3` meaning `i, x, y, z`.
#[derive(Debug, Clone, PartialEq)]
pub struct PauliChannel {
    probs: Vec<f64>,
    n_qubits: usize,
}

impl PauliChannel {
    /// Uniform error over all `4^n − 1` non-identity terms.
    ///
    /// The vector is `(1−p, p/(4^n−1), …)`.
    pub fn depolarizing(p: f64, n_qubits: usize) -> RuntimeResult<Self> {
        check_probability(p, "depolarizing probability")?;
        if n_qubits == 0 {
            return Err(RuntimeError::InvalidDistribution(
                "depolarizing channel needs at least one qubit".into(),
            ));
        }
        let total_errors = 4usize.pow(n_qubits as u32) - 1;
        let p_each = p / total_errors as f64;
        let mut probs = Vec::with_capacity(total_errors + 1);
        probs.push(1.0 - p);
        probs.extend(std::iter::repeat(p_each).take(total_errors));
        Ok(Self { probs, n_qubits })
    }

    /// Channel from explicit non-identity probabilities.
    ///
    /// `error_probs` holds the `4^k − 1` non-identity terms in index order;
    /// the identity probability is `1 − Σ error_probs`. Negative entries,
    /// sums above 1, and lengths that are not `4^k − 1` are rejected.
    pub fn generic(error_probs: Vec<f64>) -> RuntimeResult<Self> {
        if let Some(bad) = error_probs.iter().find(|p| **p < 0.0) {
            return Err(RuntimeError::InvalidDistribution(format!(
                "negative probability {bad}"
            )));
        }
        let sum: f64 = error_probs.iter().sum();
        if sum > 1.0 + PROB_SUM_TOLERANCE {
            return Err(RuntimeError::InvalidDistribution(format!(
                "error probabilities sum to {sum}, exceeding 1"
            )));
        }
        let len = error_probs.len() + 1;
        if !is_power_of_four(len) || len < 4 {
            return Err(RuntimeError::InvalidDistribution(format!(
                "expected 4^k - 1 error probabilities for k >= 1, got {}",
                error_probs.len()
            )));
        }
        let n_qubits = (len.trailing_zeros() / 2) as usize;
        let mut probs = Vec::with_capacity(len);
        probs.push(1.0 - sum);
        probs.extend(error_probs);
        Ok(Self { probs, n_qubits })
    }

    /// The full probability vector, identity term first.
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Number of target qubits `k` (vector length is `4^k`).
    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Draw one index from the distribution.
    fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let draw: f64 = rng.r#gen();
        let mut acc = 0.0;
        for (index, p) in self.probs.iter().enumerate() {
            acc += p;
            if draw < acc {
                return index;
            }
        }
        // Rounding left the tail short; the draw belongs to the last term.
        self.probs.len() - 1
    }

    /// Decode an index into one Pauli per qubit, least significant first.
    fn decode(&self, mut index: usize) -> Vec<Pauli> {
        let mut ops = Vec::with_capacity(self.n_qubits);
        for _ in 0..self.n_qubits {
            let digit = (index % 4) as u8;
            index /= 4;
            // Digits are 0..=3 by construction.
            ops.push(Pauli::from_code(digit).unwrap_or(Pauli::I));
        }
        ops
    }
}

fn is_power_of_four(x: usize) -> bool {
    x.is_power_of_two() && x.trailing_zeros() % 2 == 0
}

/// A frozen gate operation descriptor.
///
/// One closed family, dispatched by match in [`apply`](Self::apply). The
/// deterministic variants never touch the generator; the stochastic ones
/// consume exactly one uniform draw per application.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOp {
    /// Named single-qubit gate, applied to one qubit's address.
    Unary {
        /// Backend gate selector.
        selector: String,
    },
    /// Named controlled gate; all references but the last are controls.
    Controlled {
        /// Backend gate selector.
        selector: String,
    },
    /// Single-axis rotation.
    Rotation {
        /// Rotation axis.
        axis: Pauli,
        /// Angle in radians.
        angle: f64,
    },
    /// Deterministic collapse to |0⟩.
    Reset,
    /// Biased reset modelling preparation error: with probability `p` the
    /// qubit is forced to |1⟩, else to |0⟩. Not a measurement.
    NoisyReset {
        /// Probability of the |1⟩ outcome.
        p: f64,
    },
    /// With probability `p`, apply one Pauli per qubit as given by the
    /// pattern; otherwise do nothing.
    PauliError {
        /// Trigger probability.
        p: f64,
        /// One operator per target qubit.
        pattern: Vec<Pauli>,
    },
    /// Stochastic Pauli channel (depolarizing or generic).
    Channel(PauliChannel),
}

impl GateOp {
    /// Named single-qubit gate.
    pub fn unary(selector: impl Into<String>) -> Self {
        GateOp::Unary {
            selector: selector.into(),
        }
    }

    /// Named controlled gate.
    pub fn controlled(selector: impl Into<String>) -> Self {
        GateOp::Controlled {
            selector: selector.into(),
        }
    }

    /// Single-axis rotation by `angle` radians.
    pub fn rotation(axis: Pauli, angle: f64) -> Self {
        GateOp::Rotation { axis, angle }
    }

    /// Deterministic reset to |0⟩.
    pub fn reset() -> Self {
        GateOp::Reset
    }

    /// Biased reset with |1⟩ probability `p`.
    pub fn noisy_reset(p: f64) -> RuntimeResult<Self> {
        check_probability(p, "noisy reset probability")?;
        Ok(GateOp::NoisyReset { p })
    }

    /// Pauli error injection from a pattern string over `{i, x, y, z}`.
    pub fn pauli_error(p: f64, pattern: &str) -> RuntimeResult<Self> {
        check_probability(p, "error probability")?;
        Ok(GateOp::PauliError {
            p,
            pattern: parse_pattern(pattern)?,
        })
    }

    /// Depolarizing channel over `n_qubits` qubits.
    pub fn depolarizing(p: f64, n_qubits: usize) -> RuntimeResult<Self> {
        Ok(GateOp::Channel(PauliChannel::depolarizing(p, n_qubits)?))
    }

    /// Generic Pauli channel from explicit non-identity probabilities.
    pub fn pauli_channel(error_probs: Vec<f64>) -> RuntimeResult<Self> {
        Ok(GateOp::Channel(PauliChannel::generic(error_probs)?))
    }

    /// Number of qubit references this descriptor expects, if fixed.
    ///
    /// `Controlled` takes any group of two or more and returns `None`.
    pub fn arity(&self) -> Option<usize> {
        match self {
            GateOp::Unary { .. }
            | GateOp::Rotation { .. }
            | GateOp::Reset
            | GateOp::NoisyReset { .. } => Some(1),
            GateOp::Controlled { .. } => None,
            GateOp::PauliError { pattern, .. } => Some(pattern.len()),
            GateOp::Channel(channel) => Some(channel.n_qubits()),
        }
    }

    /// Apply this operation to a group of qubit references.
    ///
    /// Consumes at most one uniform draw from `rng`. Performs no liveness
    /// checks — callers decide the skip-on-lost policy before invoking.
    pub fn apply<R: Rng>(&self, rng: &mut R, qubits: &[QubitRef]) -> RuntimeResult<()> {
        if let Some(expected) = self.arity() {
            check_arity(expected, qubits.len())?;
        }
        match self {
            GateOp::Unary { selector } => {
                let q = &qubits[0];
                q.backend().borrow_mut().apply_unary(selector, q.addr())?;
                Ok(())
            }
            GateOp::Controlled { selector } => {
                if qubits.len() < 2 {
                    return Err(RuntimeError::LengthMismatch {
                        expected: 2,
                        got: qubits.len(),
                    });
                }
                let (target, controls) = qubits.split_last().expect("len checked above");
                let ctrl_addrs: Vec<usize> = controls.iter().map(QubitRef::addr).collect();
                target
                    .backend()
                    .borrow_mut()
                    .apply_controlled(selector, &ctrl_addrs, target.addr())?;
                Ok(())
            }
            GateOp::Rotation { axis, angle } => {
                let q = &qubits[0];
                q.backend()
                    .borrow_mut()
                    .apply_rotation(*axis, *angle, q.addr())?;
                Ok(())
            }
            GateOp::Reset => {
                let q = &qubits[0];
                q.backend().borrow_mut().force_measure(q.addr(), false)?;
                Ok(())
            }
            GateOp::NoisyReset { p } => {
                let q = &qubits[0];
                let outcome = rng.r#gen::<f64>() < *p;
                q.backend().borrow_mut().force_measure(q.addr(), outcome)?;
                Ok(())
            }
            GateOp::PauliError { p, pattern } => {
                if rng.r#gen::<f64>() >= *p {
                    return Ok(());
                }
                for (op, q) in pattern.iter().zip(qubits) {
                    apply_pauli(q, *op)?;
                }
                Ok(())
            }
            GateOp::Channel(channel) => {
                let index = channel.sample(rng);
                for (op, q) in channel.decode(index).into_iter().zip(qubits) {
                    apply_pauli(q, op)?;
                }
                Ok(())
            }
        }
    }

    /// Apply once per group, in input order.
    ///
    /// A sequencing contract, not a hardware-parallel guarantee: preserving
    /// input order is what keeps seeded runs deterministic.
    pub fn parallel_apply<R: Rng>(
        &self,
        rng: &mut R,
        groups: &[Vec<QubitRef>],
    ) -> RuntimeResult<()> {
        for group in groups {
            self.apply(rng, group)?;
        }
        Ok(())
    }
}
