//! Gates whose operations belong to the *n*-qubit Clifford group, along with
//! single-qubit Pauli operators and measurement bases.
//!
//! See also: <https://en.wikipedia.org/wiki/Clifford_gates>

use std::{ fmt, str::FromStr };
use nalgebra as na;
use num_complex::Complex64 as C64;
use rand::Rng;
use crate::{
    error::{ ShadowError, ShadowResult },
    qubit::Qubit,
};

/// The argument of a complex phase factor, limited to integer multiples of π/2.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// 0
    Pi0,
    /// π/2
    Pi1h,
    /// π
    Pi,
    /// 3π/2
    Pi3h,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Pi0 => write!(f, "+1"),
            Self::Pi1h => write!(f, "+i"),
            Self::Pi => write!(f, "-1"),
            Self::Pi3h => write!(f, "-i"),
        }
    }
}

impl Phase {
    /// Convert to the bare multiple of π/2.
    pub fn to_int(&self) -> u8 {
        match self {
            Self::Pi0  => 0,
            Self::Pi1h => 1,
            Self::Pi   => 2,
            Self::Pi3h => 3,
        }
    }

    /// Convert from a bare multiple of π/2 (modulo 4).
    pub fn from_int(i: u8) -> Self {
        match i % 4 {
            0 => Self::Pi0,
            1 => Self::Pi1h,
            2 => Self::Pi,
            3 => Self::Pi3h,
            _ => unreachable!(),
        }
    }

    pub fn as_complex(self) -> C64 {
        match self {
            Self::Pi0  => 1.0_f64.into(),
            Self::Pi1h => C64::i(),
            Self::Pi   => (-1.0_f64).into(),
            Self::Pi3h => -C64::i(),
        }
    }
}

/// Description of a single gate for a register of `n` qubits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Hadamard
    H(usize),
    /// π rotation about X
    X(usize),
    /// π rotation about Y
    Y(usize),
    /// π rotation about Z
    Z(usize),
    /// π/2 rotation about Z
    S(usize),
    /// –π/2 rotation about Z
    SInv(usize),
    /// Z-controlled π rotation about X.
    ///
    /// The first qubit index is the control.
    CX(usize, usize),
    /// Z-controlled π rotation about Z.
    ///
    /// The first qubit index is the control.
    CZ(usize, usize),
    /// Swap
    Swap(usize, usize),
}

impl Gate {
    /// Return the gate that undoes `self`.
    ///
    /// Every gate in the set is self-inverse except for `S` and `SInv`, which
    /// are exchanged.
    pub fn inverse(self) -> Self {
        match self {
            Self::S(k) => Self::SInv(k),
            Self::SInv(k) => Self::S(k),
            g => g,
        }
    }

    /// Return `true` if all qubit indices are less than `n` and two-qubit gate
    /// indices are distinct.
    pub fn is_valid(&self, n: usize) -> bool {
        match *self {
            Self::H(k)
            | Self::X(k)
            | Self::Y(k)
            | Self::Z(k)
            | Self::S(k)
            | Self::SInv(k)
            => k < n,
            Self::CX(a, b)
            | Self::CZ(a, b)
            | Self::Swap(a, b)
            => a < n && b < n && a != b,
        }
    }

    /// Apply a relabeling of qubit indices.
    pub fn map_qubits<F>(self, mut f: F) -> Self
    where F: FnMut(usize) -> usize
    {
        match self {
            Self::H(k) => Self::H(f(k)),
            Self::X(k) => Self::X(f(k)),
            Self::Y(k) => Self::Y(f(k)),
            Self::Z(k) => Self::Z(f(k)),
            Self::S(k) => Self::S(f(k)),
            Self::SInv(k) => Self::SInv(f(k)),
            Self::CX(a, b) => Self::CX(f(a), f(b)),
            Self::CZ(a, b) => Self::CZ(f(a), f(b)),
            Self::Swap(a, b) => Self::Swap(f(a), f(b)),
        }
    }
}

/// A single-qubit Pauli operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pauli {
    /// Identity
    I,
    /// σ<sub>*x*</sub>
    X,
    /// σ<sub>*y*</sub>
    Y,
    /// σ<sub>*z*</sub>
    Z,
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::I => write!(f, "{}", if f.alternate() { "." } else { "I" }),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Pauli {
    pub fn commutes_with(self, other: Self) -> bool {
        match (self, other) {
            (_, Self::I) => true,
            (Self::I, _) => true,
            (a, b) => a == b,
        }
    }

    pub(crate) fn from_int(u: usize) -> Self {
        match u % 4 {
            0 => Self::I,
            1 => Self::X,
            2 => Self::Y,
            3 => Self::Z,
            _ => unreachable!(),
        }
    }

    /// Sample a uniformly random string of `n` Paulis, including the
    /// identity.
    pub(crate) fn gen_nqubit<R>(n: usize, rng: &mut R) -> Vec<Self>
    where R: Rng + ?Sized
    {
        (0..n).map(|_| Self::from_int(rng.gen_range(0..4))).collect()
    }

    /// Return the symplectic (x, z) bits of `self`.
    pub fn xz(self) -> (bool, bool) {
        match self {
            Self::I => (false, false),
            Self::X => (true,  false),
            Self::Y => (true,  true ),
            Self::Z => (false, true ),
        }
    }

    /// Return the 2×2 matrix of `self` in the computational basis.
    pub fn matrix(self) -> na::Matrix2<C64> {
        const ZERO: C64 = C64 { re: 0.0, im: 0.0 };
        const ONE: C64 = C64 { re: 1.0, im: 0.0 };
        const I: C64 = C64 { re: 0.0, im: 1.0 };
        match self {
            Self::I => na::Matrix2::new(ONE,  ZERO, ZERO,  ONE),
            Self::X => na::Matrix2::new(ZERO, ONE,  ONE,   ZERO),
            Self::Y => na::Matrix2::new(ZERO, -I,   I,     ZERO),
            Self::Z => na::Matrix2::new(ONE,  ZERO, ZERO, -ONE),
        }
    }
}

/// Specify the basis in which to perform a projective measurement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Basis {
    /// X-basis
    X,
    /// Y-basis
    Y,
    /// Z-basis
    Z,
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl TryFrom<char> for Basis {
    type Error = ShadowError;

    fn try_from(c: char) -> ShadowResult<Self> {
        match c {
            'x' | 'X' => Ok(Self::X),
            'y' | 'Y' => Ok(Self::Y),
            'z' | 'Z' => Ok(Self::Z),
            _ => Err(ShadowError::InvalidRotationLabel(c.to_string())),
        }
    }
}

impl FromStr for Basis {
    type Err = ShadowError;

    fn from_str(s: &str) -> ShadowResult<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            _ => Err(ShadowError::InvalidRotationLabel(s.to_string())),
        }
    }
}

impl Basis {
    /// Parse a string of basis labels, one character per qubit.
    pub fn parse_string(s: &str) -> ShadowResult<Vec<Self>> {
        s.chars().map(Self::try_from).collect()
    }

    /// Sample a basis uniformly at random.
    pub fn gen<R>(rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        match rng.gen_range(0..3_usize) {
            0 => Self::X,
            1 => Self::Y,
            2 => Self::Z,
            _ => unreachable!(),
        }
    }

    /// Return the possible outcomes for a given measurement basis, with the
    /// plus state first.
    pub fn outcomes(self) -> (Qubit, Qubit) {
        match self {
            Self::X => (Qubit::Xp, Qubit::Xm),
            Self::Y => (Qubit::Yp, Qubit::Ym),
            Self::Z => (Qubit::Zp, Qubit::Zm),
        }
    }

    /// Return the eigenstate certified by observing `outcome` after rotating
    /// into `self` and measuring in the computational basis.
    pub fn eigenstate(self, outcome: bool) -> Qubit {
        let (plus, minus) = self.outcomes();
        if outcome { minus } else { plus }
    }

    /// Return the gates that rotate `self` onto the Z-basis for qubit `k`, so
    /// that a subsequent computational-basis measurement measures in `self`.
    pub fn rotation_gates(self, k: usize) -> Vec<Gate> {
        match self {
            Self::X => vec![Gate::H(k)],
            Self::Y => vec![Gate::SInv(k), Gate::H(k)],
            Self::Z => Vec::new(),
        }
    }
}
