//! Random basis changes applied before each single-shot measurement.

use rand::Rng;
use crate::{
    clifford::Clifford,
    config::Ensemble,
    error::ShadowResult,
    gate::{ Basis, Gate },
};

/// A single draw from a measurement ensemble.
///
/// Immutable once drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rotation {
    /// One measurement basis per qubit.
    Product(Vec<Basis>),
    /// A Clifford element applied to the whole register before a
    /// computational-basis measurement.
    Global(Clifford),
}

impl Rotation {
    /// Parse a product rotation from a string of basis labels, one character
    /// per qubit.
    pub fn from_labels(labels: &str) -> ShadowResult<Self> {
        Basis::parse_string(labels).map(Self::Product)
    }

    /// Return the ensemble `self` belongs to.
    pub fn ensemble(&self) -> Ensemble {
        match self {
            Self::Product(_) => Ensemble::ProductPauli,
            Self::Global(_) => Ensemble::GlobalClifford,
        }
    }

    /// Return the number of qubits `self` acts on.
    pub fn num_qubits(&self) -> usize {
        match self {
            Self::Product(bases) => bases.len(),
            Self::Global(clifford) => clifford.num_qubits(),
        }
    }

    /// Return the gates that carry out `self`, such that a subsequent
    /// computational-basis measurement of every qubit completes the shot.
    pub fn gates(&self) -> Vec<Gate> {
        match self {
            Self::Product(bases) => {
                bases.iter().enumerate()
                    .flat_map(|(k, b)| b.rotation_gates(k))
                    .collect()
            },
            Self::Global(clifford) => clifford.gates().to_vec(),
        }
    }
}

/// A source of independent random [`Rotation`]s.
pub trait RotationSampler {
    /// The ensemble all draws belong to.
    fn ensemble(&self) -> Ensemble;

    /// Draw a rotation for `n` qubits.
    fn sample<R>(&self, n: usize, rng: &mut R) -> Rotation
    where R: Rng + ?Sized;
}

impl RotationSampler for Ensemble {
    fn ensemble(&self) -> Ensemble { *self }

    fn sample<R>(&self, n: usize, rng: &mut R) -> Rotation
    where R: Rng + ?Sized
    {
        match self {
            Self::ProductPauli
                => Rotation::Product((0..n).map(|_| Basis::gen(rng)).collect()),
            Self::GlobalClifford
                => Rotation::Global(Clifford::gen(n, rng)),
        }
    }
}

/// A trivial ensemble that always returns the same rotation.
///
/// The requested qubit count is ignored; mismatches are caught when the
/// snapshot is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedRotation(pub Rotation);

impl RotationSampler for FixedRotation {
    fn ensemble(&self) -> Ensemble { self.0.ensemble() }

    fn sample<R>(&self, _n: usize, _rng: &mut R) -> Rotation
    where R: Rng + ?Sized
    {
        self.0.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{ SeedableRng, rngs::StdRng };
    use crate::error::ShadowError;

    #[test]
    fn product_draws() {
        let mut rng = StdRng::seed_from_u64(10546);
        let mut counts = [0_usize; 3];
        for _ in 0..1000 {
            let rot = Ensemble::ProductPauli.sample(6, &mut rng);
            assert_eq!(rot.ensemble(), Ensemble::ProductPauli);
            assert_eq!(rot.num_qubits(), 6);
            let Rotation::Product(bases) = rot else { unreachable!() };
            for b in bases {
                counts[b as usize] += 1;
            }
        }
        assert!(counts.iter().all(|c| (1800..=2200).contains(c)));
    }

    #[test]
    fn global_draws() {
        let mut rng = StdRng::seed_from_u64(10546);
        let rot = Ensemble::GlobalClifford.sample(4, &mut rng);
        assert_eq!(rot.ensemble(), Ensemble::GlobalClifford);
        assert_eq!(rot.num_qubits(), 4);
        let Rotation::Global(ref c) = rot else { unreachable!() };
        assert_eq!(rot.gates(), c.gates());
    }

    #[test]
    fn labels_and_gates() {
        let rot = Rotation::from_labels("XYZ").unwrap();
        assert_eq!(
            rot.gates(),
            vec![Gate::H(0), Gate::SInv(1), Gate::H(1)],
        );
        assert!(matches!(
            Rotation::from_labels("XW"),
            Err(ShadowError::InvalidRotationLabel(_))
        ));

        let fixed = FixedRotation(rot.clone());
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(fixed.ensemble(), Ensemble::ProductPauli);
        assert_eq!(fixed.sample(3, &mut rng), rot);
    }
}
