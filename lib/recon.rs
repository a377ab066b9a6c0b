//! Density matrix reconstruction by inversion of the measurement channel.
//!
//! Each snapshot is mapped to an unbiased single-shot estimator of the
//! measured state and the estimators are averaged. For the product ensemble
//! the inverse channel acts on each qubit separately as 3ρ – I; for the global
//! Clifford ensemble it acts on the whole register as
//! (2<sup>*n*</sup> + 1)ψ – I. All constants are exact, and single-shot
//! estimators are summed before the final division, so the result does not
//! depend on the order of the snapshots.
//!
//! Individual estimators and their averages need not be positive
//! semi-definite.

use std::ops::Index;
use nalgebra as na;
use num_complex::Complex64 as C64;
use crate::{
    error::{ ShadowError, ShadowResult },
    snapshot::Snapshot,
    store::ShadowStore,
};

/// The largest register for which dense 2<sup>*n*</sup> × 2<sup>*n*</sup>
/// operators will be built.
pub const MAX_DENSE_QUBITS: usize = 12;

/// A dense 2<sup>*n*</sup> × 2<sup>*n*</sup> operator estimated from a
/// classical shadow, with qubit 0 as the most significant bit of each index.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityMatrix(na::DMatrix<C64>);

impl From<na::DMatrix<C64>> for DensityMatrix {
    fn from(mat: na::DMatrix<C64>) -> Self { Self(mat) }
}

impl Index<(usize, usize)> for DensityMatrix {
    type Output = C64;

    fn index(&self, ij: (usize, usize)) -> &Self::Output { &self.0[ij] }
}

impl DensityMatrix {
    /// Return the number of rows (equivalently, columns).
    pub fn dim(&self) -> usize { self.0.nrows() }

    pub fn num_qubits(&self) -> usize { self.dim().trailing_zeros() as usize }

    pub fn trace(&self) -> C64 { self.0.trace() }

    /// Return `true` if `self` equals its conjugate transpose to within `tol`
    /// in every element.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        self.max_abs_diff_mat(&self.0.adjoint()) <= tol
    }

    fn max_abs_diff_mat(&self, other: &na::DMatrix<C64>) -> f64 {
        self.0.iter().zip(other.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }

    /// Return the largest elementwise distance |*a*<sub>*ij*</sub> –
    /// *b*<sub>*ij*</sub>| to another matrix of the same size, or infinity if
    /// the sizes differ.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        if self.0.shape() != other.0.shape() { return f64::INFINITY; }
        self.max_abs_diff_mat(&other.0)
    }

    /// Return the Frobenius norm of the difference to another matrix of the
    /// same size, or infinity if the sizes differ.
    pub fn frobenius_distance(&self, other: &Self) -> f64 {
        if self.0.shape() != other.0.shape() { return f64::INFINITY; }
        (&self.0 - &other.0).norm()
    }

    pub fn as_matrix(&self) -> &na::DMatrix<C64> { &self.0 }

    pub fn into_matrix(self) -> na::DMatrix<C64> { self.0 }
}

fn check_dense(n: usize) -> ShadowResult<()> {
    if n > MAX_DENSE_QUBITS {
        Err(ShadowError::DenseTooLarge { n, max: MAX_DENSE_QUBITS })
    } else {
        Ok(())
    }
}

/// Apply the single-qubit inverse channel *M*<sup>–1</sup>(ρ) = 3ρ – I.
pub fn invert_single(rho: &na::Matrix2<C64>) -> na::Matrix2<C64> {
    rho.map(|z| z * 3.0) - na::Matrix2::identity()
}

/// Apply the global Clifford inverse channel *M*<sup>–1</sup>(ψ) =
/// (2<sup>*n*</sup> + 1)ψ – I to a dense `n`-qubit operator.
pub fn invert_global(psi: &na::DMatrix<C64>) -> na::DMatrix<C64> {
    let dim = psi.nrows();
    let scale = (dim + 1) as f64;
    psi.map(|z| z * scale) - na::DMatrix::identity(dim, dim)
}

/// Compute the dense single-shot estimator *M*<sup>–1</sup>(snapshot).
pub fn invert(snapshot: &Snapshot) -> ShadowResult<na::DMatrix<C64>> {
    check_dense(snapshot.num_qubits())?;
    match snapshot {
        Snapshot::Product(rhos) => {
            let est
                = rhos.iter()
                .map(|rho| {
                    let inv = invert_single(rho);
                    na::DMatrix::from_column_slice(2, 2, inv.as_slice())
                })
                .fold(
                    na::DMatrix::identity(1, 1),
                    |acc, inv| acc.kronecker(&inv),
                );
            Ok(est)
        },
        Snapshot::Global(state) => {
            Ok(invert_global(&state.to_density_matrix()?))
        },
    }
}

/// Reconstruct the density matrix of the measured state as the mean of all
/// single-shot estimators in `store`.
///
/// Fails with [`ShadowError::EmptyShadowStore`] if the store has no snapshots
/// or [`ShadowError::DenseTooLarge`] if the register is too large for a dense
/// result.
pub fn reconstruct(store: &ShadowStore) -> ShadowResult<DensityMatrix> {
    store.require_nonempty()?;
    let n = store.num_qubits();
    check_dense(n)?;
    let dim: usize = 1 << n;
    let mut acc: na::DMatrix<C64> = na::DMatrix::zeros(dim, dim);
    for snapshot in store.iter() {
        acc += invert(snapshot)?;
    }
    let count = store.len() as f64;
    Ok(DensityMatrix(acc.map(|z| z / count)))
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{ Rng, SeedableRng, rngs::StdRng, seq::SliceRandom };
    use crate::{
        config::{ Ensemble, QubitOrder },
        clifford::Clifford,
        qubit::Qubit,
        rotation::{ Rotation, RotationSampler },
    };

    fn diag(d: &[f64]) -> na::DMatrix<C64> {
        na::DMatrix::from_diagonal(
            &na::DVector::from_iterator(d.len(), d.iter().map(|x| C64::from(*x)))
        )
    }

    #[test]
    fn single_qubit_channel() {
        let zp = Qubit::Zp.density_matrix();
        let expected
            = na::Matrix2::new(
                C64::from(2.0), C64::from(0.0),
                C64::from(0.0), C64::from(-1.0),
            );
        assert_eq!(invert_single(&zp), expected);
        for q in [Qubit::Xp, Qubit::Xm, Qubit::Yp, Qubit::Ym, Qubit::Zp, Qubit::Zm] {
            let inv = invert_single(&q.density_matrix());
            assert!((inv.trace().re - 1.0).abs() < 1e-12);
            assert!(inv.trace().im.abs() < 1e-12);
        }
    }

    fn fill(store: &mut ShadowStore, rotation: &Rotation, bits: &[u8], count: usize) {
        for _ in 0..count {
            let snap = Snapshot::build(rotation, bits, QubitOrder::Forward).unwrap();
            store.push(snap).unwrap();
        }
    }

    #[test]
    fn product_fixed_point() {
        let mut store
            = ShadowStore::new(2, Ensemble::ProductPauli, QubitOrder::Forward);
        fill(&mut store, &Rotation::from_labels("ZZ").unwrap(), &[0, 0], 5);
        let rho = reconstruct(&store).unwrap();
        assert_eq!(rho.as_matrix(), &diag(&[4.0, -2.0, -2.0, 1.0]));
        assert_eq!(rho.trace(), C64::from(1.0));
    }

    #[test]
    fn global_fixed_point() {
        let mut store
            = ShadowStore::new(2, Ensemble::GlobalClifford, QubitOrder::Forward);
        fill(&mut store, &Rotation::Global(Clifford::identity(2)), &[0, 0], 5);
        let rho = reconstruct(&store).unwrap();
        assert_eq!(rho.as_matrix(), &diag(&[4.0, -1.0, -1.0, -1.0]));
        assert_eq!(rho.trace(), C64::from(1.0));
    }

    #[test]
    fn qubit_zero_is_most_significant() {
        let mut store
            = ShadowStore::new(2, Ensemble::ProductPauli, QubitOrder::Forward);
        fill(&mut store, &Rotation::from_labels("ZZ").unwrap(), &[1, 0], 1);
        let rho = reconstruct(&store).unwrap();
        // ∣10⟩ has index 2
        assert_eq!(rho.as_matrix(), &diag(&[-2.0, 1.0, 4.0, -2.0]));
    }

    #[test]
    fn order_independence() {
        let mut rng = StdRng::seed_from_u64(10546);
        for ensemble in [Ensemble::ProductPauli, Ensemble::GlobalClifford] {
            let mut snaps: Vec<Snapshot>
                = (0..40)
                .map(|_| {
                    let rot = ensemble.sample(3, &mut rng);
                    let bits: Vec<u8>
                        = (0..3).map(|_| u8::from(rng.gen::<bool>())).collect();
                    Snapshot::build(&rot, &bits, QubitOrder::Forward).unwrap()
                })
                .collect();
            let mut store = ShadowStore::new(3, ensemble, QubitOrder::Forward);
            store.extend(snaps.clone()).unwrap();
            let rho = reconstruct(&store).unwrap();
            assert!(rho.is_hermitian(1e-12));
            assert!((rho.trace().re - 1.0).abs() < 1e-12);

            snaps.shuffle(&mut rng);
            let mut shuffled = ShadowStore::new(3, ensemble, QubitOrder::Forward);
            shuffled.extend(snaps).unwrap();
            assert_eq!(reconstruct(&shuffled).unwrap(), rho);
        }
    }

    #[test]
    fn failures() {
        let store
            = ShadowStore::new(2, Ensemble::ProductPauli, QubitOrder::Forward);
        assert!(matches!(reconstruct(&store), Err(ShadowError::EmptyShadowStore)));

        let n = MAX_DENSE_QUBITS + 1;
        let mut store
            = ShadowStore::new(n, Ensemble::ProductPauli, QubitOrder::Forward);
        let rot = Rotation::Product(vec![crate::gate::Basis::Z; n]);
        fill(&mut store, &rot, &vec![0; n], 1);
        assert!(matches!(
            reconstruct(&store),
            Err(ShadowError::DenseTooLarge { n: _, max: MAX_DENSE_QUBITS })
        ));
    }
}
