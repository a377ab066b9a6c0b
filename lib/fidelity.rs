//! Fidelity of the measured state with a stabilizer target state.
//!
//! For a target ∣φ⟩ = *a*∣0...0⟩ prepared by a Clifford element *a*, the
//! single-shot estimator of ⟨φ∣ρ∣φ⟩ under the global Clifford ensemble is
//! (2<sup>*n*</sup> + 1)|⟨0...0∣*a*<sup>†</sup>∣ψ⟩|<sup>2</sup> – 1, where ∣ψ⟩
//! is the snapshot. The overlap is computed by post-selection on the
//! stabilizer tableau, so no dense matrices are ever built.

use log::warn;
use crate::{
    clifford::Clifford,
    config::{ Ensemble, QubitOrder },
    error::{ ShadowError, ShadowResult },
    snapshot::Snapshot,
    store::ShadowStore,
};

// estimates further than this from [0, 1] are logged
const FIDELITY_WARN_MARGIN: f64 = 0.5;

/// Estimate the fidelity of the measured state with the state prepared from
/// ∣0...0⟩ by `target`, with qubits labeled as they are by the measurement
/// adapter.
///
/// The estimate is unbiased but not clamped, and may fall outside [0, 1] for
/// small numbers of snapshots. Fails with [`ShadowError::EmptyShadowStore`] if
/// the store has no snapshots, [`ShadowError::EnsembleMismatch`] if the store
/// does not hold global Clifford snapshots, or
/// [`ShadowError::CliffordQubitMismatch`] if `target` acts on a different
/// number of qubits.
pub fn estimate_fidelity(store: &ShadowStore, target: &Clifford)
    -> ShadowResult<f64>
{
    store.require_nonempty()?;
    if store.ensemble() != Ensemble::GlobalClifford {
        return Err(ShadowError::EnsembleMismatch {
            expected: Ensemble::GlobalClifford,
            found: store.ensemble(),
        });
    }
    let n = store.num_qubits();
    if target.num_qubits() != n {
        return Err(ShadowError::CliffordQubitMismatch {
            clifford: target.num_qubits(),
            register: n,
        });
    }
    let target
        = match store.qubit_order() {
            QubitOrder::Forward => target.clone(),
            QubitOrder::Reversed => Clifford::reversal(n).compose(target)?,
        };
    let unprepare = target.adjoint();

    let mut overlap_sum: f64 = 0.0;
    for snapshot in store.iter() {
        let Snapshot::Global(state) = snapshot else {
            return Err(ShadowError::EnsembleMismatch {
                expected: Ensemble::GlobalClifford,
                found: snapshot.ensemble(),
            });
        };
        overlap_sum += state.evolve(&unprepare)?.zero_overlap();
    }
    let mean_overlap = overlap_sum / store.len() as f64;
    let fidelity = (2.0_f64.powi(n as i32) + 1.0) * mean_overlap - 1.0;
    if !(-FIDELITY_WARN_MARGIN..=1.0 + FIDELITY_WARN_MARGIN).contains(&fidelity) {
        warn!(
            "fidelity estimate {fidelity:.4} from {} snapshots is far outside [0, 1]",
            store.len(),
        );
    }
    Ok(fidelity)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ gate::Gate, rotation::Rotation };

    fn global_store(bits: &[u8], order: QubitOrder, count: usize) -> ShadowStore {
        let n = bits.len();
        let mut store = ShadowStore::new(n, Ensemble::GlobalClifford, order);
        let rot = Rotation::Global(Clifford::identity(n));
        for _ in 0..count {
            store.push(Snapshot::build(&rot, bits, order).unwrap()).unwrap();
        }
        store
    }

    #[test]
    fn basis_state_fidelities() {
        let store = global_store(&[0, 0], QubitOrder::Forward, 5);
        let zero = Clifford::identity(2);
        let one = Clifford::new(2, [Gate::X(0)]).unwrap();
        let plus = Clifford::new(2, [Gate::H(0)]).unwrap();
        assert_eq!(estimate_fidelity(&store, &zero).unwrap(), 4.0);
        assert_eq!(estimate_fidelity(&store, &one).unwrap(), -1.0);
        assert_eq!(estimate_fidelity(&store, &plus).unwrap(), 1.5);
    }

    #[test]
    fn reversed_target() {
        // adapter qubit 0 is the last tensor factor
        let store = global_store(&[1, 0, 0], QubitOrder::Reversed, 1);
        let target = Clifford::new(3, [Gate::X(0)]).unwrap();
        assert_eq!(estimate_fidelity(&store, &target).unwrap(), 8.0);
        let target = Clifford::new(3, [Gate::X(2)]).unwrap();
        assert_eq!(estimate_fidelity(&store, &target).unwrap(), -1.0);
    }

    #[test]
    fn failures() {
        let target = Clifford::identity(2);
        let empty = ShadowStore::new(2, Ensemble::GlobalClifford, QubitOrder::Forward);
        assert!(matches!(
            estimate_fidelity(&empty, &target),
            Err(ShadowError::EmptyShadowStore)
        ));

        let mut product
            = ShadowStore::new(2, Ensemble::ProductPauli, QubitOrder::Forward);
        let rot = Rotation::from_labels("ZZ").unwrap();
        product.push(Snapshot::build(&rot, &[0, 0], QubitOrder::Forward).unwrap())
            .unwrap();
        assert!(matches!(
            estimate_fidelity(&product, &target),
            Err(ShadowError::EnsembleMismatch {
                expected: Ensemble::GlobalClifford,
                found: Ensemble::ProductPauli,
            })
        ));

        let store = global_store(&[0, 0], QubitOrder::Forward, 1);
        assert!(matches!(
            estimate_fidelity(&store, &Clifford::identity(3)),
            Err(ShadowError::CliffordQubitMismatch { clifford: 3, register: 2 })
        ));
    }
}
