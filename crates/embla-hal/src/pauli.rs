//! Pauli operator codes shared between gate dispatch and measurement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single-qubit Pauli operator.
///
/// Doubles as a rotation axis and a measurement basis. The numeric codes
/// (`I=0, X=1, Y=2, Z=3`) are the wire codes backends accept for
/// [`measure_pauli`](crate::StateBackend::measure_pauli) and
/// [`apply_rotation`](crate::StateBackend::apply_rotation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity — valid in error patterns, not as a measurement basis.
    I,
    /// Pauli X.
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z.
    Z,
}

impl Pauli {
    /// Backend wire code for this operator.
    pub fn code(self) -> u8 {
        match self {
            Pauli::I => 0,
            Pauli::X => 1,
            Pauli::Y => 2,
            Pauli::Z => 3,
        }
    }

    /// Gate selector string understood by backends (`"x"`, `"y"`, `"z"`).
    pub fn selector(self) -> &'static str {
        match self {
            Pauli::I => "i",
            Pauli::X => "x",
            Pauli::Y => "y",
            Pauli::Z => "z",
        }
    }

    /// Decode a base-4 digit (the inverse of [`code`](Self::code)).
    ///
    /// Returns `None` for digits outside `0..=3`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Pauli::I),
            1 => Some(Pauli::X),
            2 => Some(Pauli::Y),
            3 => Some(Pauli::Z),
            _ => None,
        }
    }
}

impl TryFrom<char> for Pauli {
    type Error = char;

    fn try_from(c: char) -> Result<Self, char> {
        match c {
            'i' => Ok(Pauli::I),
            'x' => Ok(Pauli::X),
            'y' => Ok(Pauli::Y),
            'z' => Ok(Pauli::Z),
            other => Err(other),
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector())
    }
}
