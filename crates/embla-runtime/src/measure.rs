//! Measurement dispatch descriptors.
//!
//! Stateless value objects, one closed family: perfect and noisy single-
//! qubit Pauli measurements, and their multi-qubit parity (Pauli-product)
//! forms. A parity measurement measures each qubit *independently* in its
//! own basis and XOR-reduces the outcomes in input order. Noisy variants
//! report the true outcome with probability `p` and flip it otherwise,
//! spending exactly one fresh uniform draw on the decision.

use rand::Rng;

use embla_hal::Pauli;

use crate::error::{RuntimeError, RuntimeResult};
use crate::register::QubitRef;

/// A measurement basis: a Pauli operator other than identity.
fn parse_basis(c: char) -> RuntimeResult<Pauli> {
    match Pauli::try_from(c) {
        Ok(Pauli::I) | Err(_) => Err(RuntimeError::InvalidBasis(c)),
        Ok(basis) => Ok(basis),
    }
}

/// Parse a parity basis string such as `"zz"` or `"xy"`.
fn parse_bases(bases: &str) -> RuntimeResult<Vec<Pauli>> {
    bases.chars().map(parse_basis).collect()
}

fn check_arity(expected: usize, got: usize) -> RuntimeResult<()> {
    if expected != got {
        return Err(RuntimeError::LengthMismatch { expected, got });
    }
    Ok(())
}

fn measure_one(basis: Pauli, qubit: &QubitRef) -> RuntimeResult<bool> {
    let outcome = qubit
        .backend()
        .borrow_mut()
        .measure_pauli(basis, qubit.addr())?;
    Ok(outcome)
}

/// A frozen measurement operation descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureOp {
    /// Ideal single-qubit Pauli measurement.
    PerfectPauli {
        /// Measurement basis.
        basis: Pauli,
    },
    /// Single-qubit Pauli measurement that is correct with probability `p`.
    NoisyPauli {
        /// Measurement basis.
        basis: Pauli,
        /// Probability of reporting the true outcome.
        p: f64,
    },
    /// Ideal multi-qubit Pauli-product measurement (XOR of independent
    /// single-qubit measurements).
    PerfectParity {
        /// One basis per qubit.
        bases: Vec<Pauli>,
    },
    /// Parity measurement that is correct with probability `p`.
    NoisyParity {
        /// One basis per qubit.
        bases: Vec<Pauli>,
        /// Probability of reporting the true outcome.
        p: f64,
    },
}

impl MeasureOp {
    /// Ideal single-qubit measurement in `basis` (`'x'`, `'y'`, or `'z'`).
    pub fn perfect_pauli(basis: char) -> RuntimeResult<Self> {
        Ok(MeasureOp::PerfectPauli {
            basis: parse_basis(basis)?,
        })
    }

    /// Single-qubit measurement correct with probability `p`.
    pub fn noisy_pauli(basis: char, p: f64) -> RuntimeResult<Self> {
        check_fidelity(p)?;
        Ok(MeasureOp::NoisyPauli {
            basis: parse_basis(basis)?,
            p,
        })
    }

    /// Ideal parity measurement with one basis character per qubit.
    pub fn perfect_parity(bases: &str) -> RuntimeResult<Self> {
        Ok(MeasureOp::PerfectParity {
            bases: parse_bases(bases)?,
        })
    }

    /// Parity measurement correct with probability `p`.
    pub fn noisy_parity(bases: &str, p: f64) -> RuntimeResult<Self> {
        check_fidelity(p)?;
        Ok(MeasureOp::NoisyParity {
            bases: parse_bases(bases)?,
            p,
        })
    }

    /// Number of qubit references this descriptor expects.
    pub fn arity(&self) -> usize {
        match self {
            MeasureOp::PerfectPauli { .. } | MeasureOp::NoisyPauli { .. } => 1,
            MeasureOp::PerfectParity { bases } | MeasureOp::NoisyParity { bases, .. } => {
                bases.len()
            }
        }
    }

    /// Perform the measurement on a group of qubit references.
    ///
    /// Performs no liveness checks — callers decide the lost-qubit policy
    /// before invoking.
    pub fn do_measurement<R: Rng>(&self, rng: &mut R, qubits: &[QubitRef]) -> RuntimeResult<bool> {
        check_arity(self.arity(), qubits.len())?;
        match self {
            MeasureOp::PerfectPauli { basis } => measure_one(*basis, &qubits[0]),
            MeasureOp::NoisyPauli { basis, p } => {
                let outcome = measure_one(*basis, &qubits[0])?;
                Ok(flip_unless(rng, *p, outcome))
            }
            MeasureOp::PerfectParity { bases } => parity(bases, qubits),
            MeasureOp::NoisyParity { bases, p } => {
                let outcome = parity(bases, qubits)?;
                Ok(flip_unless(rng, *p, outcome))
            }
        }
    }

    /// Measure each group independently, in input order.
    ///
    /// No outcome conditions another within the batch.
    pub fn do_parallel_measurement<R: Rng>(
        &self,
        rng: &mut R,
        groups: &[Vec<QubitRef>],
    ) -> RuntimeResult<Vec<bool>> {
        groups
            .iter()
            .map(|group| self.do_measurement(rng, group))
            .collect()
    }
}

fn check_fidelity(p: f64) -> RuntimeResult<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(RuntimeError::InvalidDistribution(format!(
            "measurement fidelity must lie in [0, 1], got {p}"
        )));
    }
    Ok(())
}

/// Report `outcome` with probability `p`, its negation otherwise.
fn flip_unless<R: Rng>(rng: &mut R, p: f64, outcome: bool) -> bool {
    if rng.r#gen::<f64>() < p { outcome } else { !outcome }
}

/// XOR-reduce independent single-qubit measurements, in input order.
fn parity(bases: &[Pauli], qubits: &[QubitRef]) -> RuntimeResult<bool> {
    let mut acc = false;
    for (basis, qubit) in bases.iter().zip(qubits) {
        acc ^= measure_one(*basis, qubit)?;
    }
    Ok(acc)
}
