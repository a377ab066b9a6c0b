//! The narrow interface through which a shadow session measures a state.
//!
//! A session never simulates anything itself: for every shot it hands a state
//! preparation and a freshly drawn [`Rotation`] to a [`MeasurementAdapter`]
//! and gets back one bit per qubit. Real backends, noisy simulators, and
//! deterministic fakes all sit behind the same trait.

use rand::Rng;
use crate::{
    clifford::Clifford,
    config::QubitOrder,
    error::{ ShadowError, ShadowResult },
    recon::DensityMatrix,
    rotation::Rotation,
    stab::Stab,
};

/// A device or simulator that can prepare a state, apply a rotation, and
/// measure every qubit once in the computational basis.
pub trait MeasurementAdapter {
    /// Description of the state to prepare.
    type Prep;

    /// Failure of a single shot.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The number of qubits in the register; constant for the adapter's
    /// lifetime.
    fn num_qubits(&self) -> usize;

    /// The state preparation measured by default.
    fn state_prep(&self) -> &Self::Prep;

    /// Prepare `prep`, apply `rotation`, and measure every qubit, returning
    /// one bit (0 or 1) per qubit in the adapter's own qubit order.
    ///
    /// Any randomness should be drawn from `rng`.
    fn run<R>(&self, prep: &Self::Prep, rotation: &Rotation, rng: &mut R)
        -> Result<Vec<u8>, Self::Error>
    where R: Rng + ?Sized;
}

/// A [`MeasurementAdapter`] backed by stabilizer simulation of a Clifford state
/// preparation.
///
/// Product rotations are carried out as H for the X basis and S<sup>†</sup>
/// then H for the Y basis; global rotations apply the Clifford's gates
/// directly. Since all preparations are exact, the adapter also provides the
/// ideal target state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StabAdapter {
    prep: Clifford,
    order: QubitOrder,
}

impl StabAdapter {
    /// Create a new adapter for the state prepared from ∣0...0⟩ by `prep`.
    pub fn new(prep: Clifford) -> Self {
        Self { prep, order: QubitOrder::Forward }
    }

    /// Like [`Self::new`], but labeling qubits in reverse, so that qubit `k`
    /// of every gate and every returned bit string refers to tensor factor `n
    /// - 1 - k`.
    ///
    /// Sessions driving this adapter should use [`QubitOrder::Reversed`].
    pub fn reversed(prep: Clifford) -> Self {
        Self { prep, order: QubitOrder::Reversed }
    }

    /// Return the qubit order of the labels this adapter accepts and reports.
    pub fn qubit_order(&self) -> QubitOrder { self.order }

    /// Return the default state preparation, in the adapter's qubit labels.
    pub fn preparation(&self) -> &Clifford { &self.prep }

    // map an adapter qubit label to a tensor factor
    fn relabel(&self, k: usize) -> usize {
        match self.order {
            QubitOrder::Forward => k,
            QubitOrder::Reversed => self.prep.num_qubits() - 1 - k,
        }
    }

    /// Return the exact density matrix of the default state preparation, in
    /// [`QubitOrder::Forward`] order.
    pub fn density_matrix(&self) -> ShadowResult<DensityMatrix> {
        let mut state = Stab::new(self.prep.num_qubits());
        for gate in self.prep.gates() {
            state.apply_gate(gate.map_qubits(|k| self.relabel(k)));
        }
        Ok(state.to_density_matrix()?.into())
    }
}

impl MeasurementAdapter for StabAdapter {
    type Prep = Clifford;
    type Error = ShadowError;

    fn num_qubits(&self) -> usize { self.prep.num_qubits() }

    fn state_prep(&self) -> &Clifford { &self.prep }

    fn run<R>(&self, prep: &Clifford, rotation: &Rotation, rng: &mut R)
        -> ShadowResult<Vec<u8>>
    where R: Rng + ?Sized
    {
        let n = self.num_qubits();
        if prep.num_qubits() != n {
            return Err(ShadowError::CliffordQubitMismatch {
                clifford: prep.num_qubits(),
                register: n,
            });
        }
        match rotation {
            Rotation::Product(bases) if bases.len() != n => {
                return Err(ShadowError::BitCountMismatch {
                    expected: n,
                    got: bases.len(),
                });
            },
            Rotation::Global(clifford) if clifford.num_qubits() != n => {
                return Err(ShadowError::CliffordQubitMismatch {
                    clifford: clifford.num_qubits(),
                    register: n,
                });
            },
            _ => { },
        }
        let rotation_gates = rotation.gates();
        let mut state = Stab::new(n);
        for gate in prep.gates().iter().chain(rotation_gates.iter()) {
            state.apply_gate(gate.map_qubits(|k| self.relabel(k)));
        }
        let bits: Vec<u8>
            = (0..n)
            .map(|k| state.measure(self.relabel(k), rng).as_bit())
            .collect();
        Ok(bits)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{ SeedableRng, rngs::StdRng };
    use num_complex::Complex64 as C64;
    use crate::gate::Gate;

    #[test]
    fn bell_outcomes() {
        let prep = Clifford::new(2, [Gate::H(0), Gate::CX(0, 1)]).unwrap();
        let adapter = StabAdapter::new(prep);
        let mut rng = StdRng::seed_from_u64(10546);
        let zz = Rotation::from_labels("ZZ").unwrap();
        let xx = Rotation::from_labels("XX").unwrap();
        let yy = Rotation::from_labels("YY").unwrap();
        let mut ones = 0;
        for _ in 0..200 {
            let bits = adapter.run(adapter.state_prep(), &zz, &mut rng).unwrap();
            assert_eq!(bits[0], bits[1]);
            ones += usize::from(bits[0]);
            let bits = adapter.run(adapter.state_prep(), &xx, &mut rng).unwrap();
            assert_eq!(bits[0], bits[1]);
            // ⟨YY⟩ = -1 for this state
            let bits = adapter.run(adapter.state_prep(), &yy, &mut rng).unwrap();
            assert_ne!(bits[0], bits[1]);
        }
        assert!((60..=140).contains(&ones));
    }

    #[test]
    fn global_rotation_inverts_prep() {
        let mut rng = StdRng::seed_from_u64(10546);
        let prep = Clifford::gen(4, &mut rng);
        let adapter = StabAdapter::new(prep.clone());
        let rot = Rotation::Global(prep.adjoint());
        for _ in 0..20 {
            let bits = adapter.run(adapter.state_prep(), &rot, &mut rng).unwrap();
            assert_eq!(bits, vec![0, 0, 0, 0]);
        }
    }

    #[test]
    fn reversed_labels() {
        let mut rng = StdRng::seed_from_u64(10546);
        let prep = Clifford::new(3, [Gate::X(0)]).unwrap();
        let zzz = Rotation::from_labels("ZZZ").unwrap();

        let fwd = StabAdapter::new(prep.clone());
        assert_eq!(fwd.run(&prep, &zzz, &mut rng).unwrap(), vec![1, 0, 0]);
        assert_eq!(fwd.density_matrix().unwrap()[(0b100, 0b100)], C64::from(1.0));

        // labels are reported back as given, but act on the opposite factor
        let rev = StabAdapter::reversed(prep.clone());
        assert_eq!(rev.qubit_order(), QubitOrder::Reversed);
        assert_eq!(rev.run(&prep, &zzz, &mut rng).unwrap(), vec![1, 0, 0]);
        assert_eq!(rev.density_matrix().unwrap()[(0b001, 0b001)], C64::from(1.0));
    }

    #[test]
    fn size_checks() {
        let mut rng = StdRng::seed_from_u64(10546);
        let adapter = StabAdapter::new(Clifford::identity(2));
        assert!(matches!(
            adapter.run(
                adapter.state_prep(), &Rotation::from_labels("Z").unwrap(), &mut rng),
            Err(ShadowError::BitCountMismatch { expected: 2, got: 1 })
        ));
        assert!(matches!(
            adapter.run(
                adapter.state_prep(), &Rotation::Global(Clifford::identity(3)), &mut rng),
            Err(ShadowError::CliffordQubitMismatch { clifford: 3, register: 2 })
        ));
        assert!(matches!(
            adapter.run(
                &Clifford::identity(1), &Rotation::from_labels("ZZ").unwrap(), &mut rng),
            Err(ShadowError::CliffordQubitMismatch { clifford: 1, register: 2 })
        ));
    }
}
