//! Conversion of a single shot's (rotation, outcome) pair into the state it
//! certifies.
//!
//! A snapshot is always a physical state: the eigenstate of the measured
//! bases (product ensemble) or the computational basis state pulled back
//! through the inverse Clifford (global ensemble). The inverse measurement
//! channel is only applied on reconstruction.

use nalgebra as na;
use num_complex::Complex64 as C64;
use crate::{
    clifford::Clifford,
    config::{ Ensemble, QubitOrder },
    error::{ ShadowError, ShadowResult },
    gate::Basis,
    rotation::Rotation,
    stab::Stab,
};

/// The state certified by a single shot, in [`QubitOrder::Forward`] order.
#[derive(Clone, Debug, PartialEq)]
pub enum Snapshot {
    /// One single-qubit density matrix per qubit.
    Product(Vec<na::Matrix2<C64>>),
    /// A stabilizer state on the whole register.
    Global(Stab),
}

impl Snapshot {
    /// Build a snapshot from a drawn rotation and the bits measured after it,
    /// listed in the adapter's qubit order.
    ///
    /// Fails with [`ShadowError::InvalidMeasurement`] if any bit is not 0 or 1,
    /// [`ShadowError::BitCountMismatch`] if a product rotation has a different
    /// number of bases than there are bits, and
    /// [`ShadowError::CliffordQubitMismatch`] if a Clifford rotation acts on a
    /// different number of qubits than there are bits.
    pub fn build(rotation: &Rotation, bits: &[u8], order: QubitOrder)
        -> ShadowResult<Self>
    {
        match rotation {
            Rotation::Product(bases) => product(bases, bits, order),
            Rotation::Global(clifford) => global(clifford, bits, order),
        }
    }

    /// Like [`Self::build`] for the product ensemble, but with bases given as
    /// a string of labels.
    ///
    /// Fails additionally with [`ShadowError::InvalidRotationLabel`] if any
    /// label is not one of X, Y, Z.
    pub fn from_labels(labels: &str, bits: &[u8], order: QubitOrder)
        -> ShadowResult<Self>
    {
        let bases = Basis::parse_string(labels)?;
        product(&bases, bits, order)
    }

    pub fn ensemble(&self) -> Ensemble {
        match self {
            Self::Product(_) => Ensemble::ProductPauli,
            Self::Global(_) => Ensemble::GlobalClifford,
        }
    }

    pub fn num_qubits(&self) -> usize {
        match self {
            Self::Product(rhos) => rhos.len(),
            Self::Global(state) => state.num_qubits(),
        }
    }
}

fn product(bases: &[Basis], bits: &[u8], order: QubitOrder)
    -> ShadowResult<Snapshot>
{
    if bases.len() != bits.len() {
        return Err(ShadowError::BitCountMismatch {
            expected: bases.len(),
            got: bits.len(),
        });
    }
    let mut rhos: Vec<na::Matrix2<C64>>
        = bases.iter().zip(bits).enumerate()
        .map(|(k, (basis, bit))| {
            match *bit {
                0 => Ok(basis.eigenstate(false).density_matrix()),
                1 => Ok(basis.eigenstate(true).density_matrix()),
                value => Err(ShadowError::InvalidMeasurement { qubit: k, value }),
            }
        })
        .collect::<ShadowResult<_>>()?;
    if order == QubitOrder::Reversed { rhos.reverse(); }
    Ok(Snapshot::Product(rhos))
}

fn global(clifford: &Clifford, bits: &[u8], order: QubitOrder)
    -> ShadowResult<Snapshot>
{
    let mut state = Stab::from_bits(bits)?.evolve(&clifford.adjoint())?;
    if order == QubitOrder::Reversed {
        state = state.evolve(&Clifford::reversal(bits.len()))?;
    }
    Ok(Snapshot::Global(state))
}
