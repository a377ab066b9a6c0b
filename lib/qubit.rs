//! The six cardinal single-qubit states.
//!
//! Every outcome of a single-qubit measurement in the X, Y, or Z basis leaves
//! the qubit in one of the six cardinal directions on the Bloch sphere: ∣±x⟩,
//! ∣±y⟩, or ∣±z⟩. These are the only states a product-ensemble snapshot is
//! ever built from.

use std::fmt;
use nalgebra as na;
use num_complex::Complex64 as C64;
use once_cell::sync::Lazy;
use crate::gate::Pauli;

/// Base qubit object defined as the 6 cardinal directions on the Bloch sphere.
///
/// The ∣+z⟩ state corresponds to ∣0⟩.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Qubit {
    /// ∣+x⟩
    Xp,
    /// ∣–x⟩
    Xm,
    /// ∣+y⟩
    Yp,
    /// ∣–y⟩
    Ym,
    /// ∣+z⟩
    Zp,
    /// ∣–z⟩
    Zm,
}

/// Creates a [`Self::Zp`].
impl Default for Qubit {
    fn default() -> Self { Self::Zp }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Xp => write!(f, "+x"),
            Self::Xm => write!(f, "-x"),
            Self::Yp => write!(f, "+y"),
            Self::Ym => write!(f, "-y"),
            Self::Zp => write!(f, "+z"),
            Self::Zm => write!(f, "-z"),
        }
    }
}

// ∣ψ⟩⟨ψ∣ = (I + r⋅σ) / 2 for each cardinal state, in declaration order
static DENSITY: Lazy<[na::Matrix2<C64>; 6]> = Lazy::new(|| {
    [Qubit::Xp, Qubit::Xm, Qubit::Yp, Qubit::Ym, Qubit::Zp, Qubit::Zm]
        .map(|q| {
            let (axis, sign) = q.bloch_axis();
            (Pauli::I.matrix() + axis.matrix().map(|z| z * sign))
                .map(|z| z * 0.5)
        })
});

impl Qubit {
    /// Return *z*-basis amplitudes, with +z ordered first.
    pub fn z_amps(self) -> [C64; 2] {
        use std::f64::consts::FRAC_1_SQRT_2;
        const ZERO:  C64 = C64 { re: 0.0, im: 0.0 };
        const ONE:   C64 = C64 { re: 1.0, im: 0.0 };
        const ORT2:  C64 = C64 { re: FRAC_1_SQRT_2, im: 0.0 };
        const iORT2: C64 = C64 { re: 0.0, im: FRAC_1_SQRT_2 };
        match self {
            Self::Xp => [ORT2,   ORT2 ],
            Self::Xm => [ORT2,  -ORT2 ],
            Self::Yp => [ORT2,   iORT2],
            Self::Ym => [ORT2,  -iORT2],
            Self::Zp => [ONE,    ZERO ],
            Self::Zm => [ZERO,   ONE  ],
        }
    }

    // the Bloch vector of `self` as a signed Pauli axis
    fn bloch_axis(self) -> (Pauli, f64) {
        match self {
            Self::Xp => (Pauli::X,  1.0),
            Self::Xm => (Pauli::X, -1.0),
            Self::Yp => (Pauli::Y,  1.0),
            Self::Ym => (Pauli::Y, -1.0),
            Self::Zp => (Pauli::Z,  1.0),
            Self::Zm => (Pauli::Z, -1.0),
        }
    }

    /// Return the density matrix ∣ψ⟩⟨ψ∣ of `self`.
    ///
    /// All elements are exact.
    pub fn density_matrix(self) -> na::Matrix2<C64> {
        let idx: usize
            = match self {
                Self::Xp => 0,
                Self::Xm => 1,
                Self::Yp => 2,
                Self::Ym => 3,
                Self::Zp => 4,
                Self::Zm => 5,
            };
        DENSITY[idx]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cardinal_density_matrices() {
        let one = C64::from(1.0);
        let zero = C64::from(0.0);
        let half = C64::from(0.5);
        let ihalf = C64::new(0.0, 0.5);
        let expected: [(Qubit, [C64; 4]); 6] = [
            (Qubit::Zp, [one,  zero, zero, zero]),
            (Qubit::Zm, [zero, zero, zero, one ]),
            (Qubit::Xp, [half,  half,  half,  half]),
            (Qubit::Xm, [half, -half, -half,  half]),
            (Qubit::Yp, [half, -ihalf, ihalf, half]),
            (Qubit::Ym, [half,  ihalf, -ihalf, half]),
        ];
        for (q, [a, b, c, d]) in expected {
            let rho = q.density_matrix();
            // row-major expectation
            for (found, want) in [rho[(0, 0)], rho[(0, 1)], rho[(1, 0)], rho[(1, 1)]]
                .into_iter()
                .zip([a, b, c, d])
            {
                assert_abs_diff_eq!(found.re, want.re, epsilon = 1e-12);
                assert_abs_diff_eq!(found.im, want.im, epsilon = 1e-12);
            }
            assert_abs_diff_eq!(rho.trace().re, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn amplitudes_match_density_matrices() {
        for q in [Qubit::Xp, Qubit::Xm, Qubit::Yp, Qubit::Ym, Qubit::Zp, Qubit::Zm] {
            let [a0, a1] = q.z_amps();
            let ket = na::Vector2::new(a0, a1);
            let rho = ket * ket.adjoint();
            for (found, want) in rho.iter().zip(q.density_matrix().iter()) {
                assert_abs_diff_eq!(found.re, want.re, epsilon = 1e-12);
                assert_abs_diff_eq!(found.im, want.im, epsilon = 1e-12);
            }
        }
    }
}
