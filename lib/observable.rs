//! Expectation values of Pauli strings.
//!
//! The single-shot estimator of tr(*P*ρ) is tr(*P* *M*<sup>–1</sup>(snapshot)).
//! Both ensembles admit a closed form that avoids dense 2<sup>*n*</sup>-sized
//! operators: the product ensemble factorizes over qubits, and the global
//! Clifford ensemble needs only ⟨ψ∣*P*∣ψ⟩ ∈ {–1, 0, +1} from the stabilizer
//! tableau.

use crate::{
    config::QubitOrder,
    error::{ ShadowError, ShadowResult },
    gate::Pauli,
    recon::invert_single,
    snapshot::Snapshot,
    store::ShadowStore,
};

/// Compute the single-shot estimator tr(*P* *M*<sup>–1</sup>(snapshot)) for a
/// Pauli string given in [`QubitOrder::Forward`] order.
///
/// Fails with [`ShadowError::ObservableLength`] if `ops` does not cover
/// exactly the snapshot's qubits.
pub fn snapshot_pauli(snapshot: &Snapshot, ops: &[Pauli]) -> ShadowResult<f64> {
    let n = snapshot.num_qubits();
    if ops.len() != n {
        return Err(ShadowError::ObservableLength { expected: n, got: ops.len() });
    }
    match snapshot {
        Snapshot::Product(rhos) => {
            let est: f64
                = rhos.iter().zip(ops)
                .map(|(rho, op)| (op.matrix() * invert_single(rho)).trace().re)
                .product();
            Ok(est)
        },
        Snapshot::Global(state) => {
            let dim = 2.0_f64.powi(n as i32);
            let trace_p
                = if ops.iter().all(|op| *op == Pauli::I) { dim } else { 0.0 };
            let expval = f64::from(state.pauli_expectation(ops)?);
            Ok((dim + 1.0) * expval - trace_p)
        },
    }
}

/// Estimate the expectation value of a Pauli string, with qubits labeled as
/// they are by the measurement adapter.
///
/// Fails with [`ShadowError::EmptyShadowStore`] if the store has no snapshots
/// or [`ShadowError::ObservableLength`] if `ops` does not cover exactly the
/// store's qubits.
pub fn estimate_pauli(store: &ShadowStore, ops: &[Pauli]) -> ShadowResult<f64> {
    store.require_nonempty()?;
    let n = store.num_qubits();
    if ops.len() != n {
        return Err(ShadowError::ObservableLength { expected: n, got: ops.len() });
    }
    let ops: Vec<Pauli>
        = match store.qubit_order() {
            QubitOrder::Forward => ops.to_vec(),
            QubitOrder::Reversed => ops.iter().rev().copied().collect(),
        };
    let mut acc: f64 = 0.0;
    for snapshot in store.iter() {
        acc += snapshot_pauli(snapshot, &ops)?;
    }
    Ok(acc / store.len() as f64)
}

#[cfg(test)]
mod test {
    use super::*;
    use Pauli::*;
    use crate::{
        clifford::Clifford,
        config::Ensemble,
        rotation::Rotation,
    };

    fn store_of(rot: &Rotation, bits: &[u8], order: QubitOrder) -> ShadowStore {
        let mut store = ShadowStore::new(bits.len(), rot.ensemble(), order);
        store.push(Snapshot::build(rot, bits, order).unwrap()).unwrap();
        store
    }

    #[test]
    fn product_estimators() {
        let store
            = store_of(&Rotation::from_labels("ZX").unwrap(), &[0, 1], QubitOrder::Forward);
        assert_eq!(estimate_pauli(&store, &[I, I]).unwrap(), 1.0);
        assert_eq!(estimate_pauli(&store, &[Z, I]).unwrap(), 3.0);
        assert_eq!(estimate_pauli(&store, &[I, X]).unwrap(), -3.0);
        assert_eq!(estimate_pauli(&store, &[Z, X]).unwrap(), -9.0);
        assert_eq!(estimate_pauli(&store, &[X, X]).unwrap(), 0.0);
        assert_eq!(estimate_pauli(&store, &[Z, Y]).unwrap(), 0.0);
    }

    #[test]
    fn global_estimators() {
        let rot = Rotation::Global(Clifford::identity(2));
        let store = store_of(&rot, &[0, 1], QubitOrder::Forward);
        assert_eq!(estimate_pauli(&store, &[I, I]).unwrap(), 1.0);
        assert_eq!(estimate_pauli(&store, &[Z, Z]).unwrap(), -5.0);
        assert_eq!(estimate_pauli(&store, &[Z, I]).unwrap(), 5.0);
        assert_eq!(estimate_pauli(&store, &[X, I]).unwrap(), 0.0);
    }

    #[test]
    fn reversed_labels() {
        let rot = Rotation::from_labels("ZZZ").unwrap();
        let store = store_of(&rot, &[1, 0, 0], QubitOrder::Reversed);
        assert_eq!(estimate_pauli(&store, &[Z, I, I]).unwrap(), -3.0);
        assert_eq!(estimate_pauli(&store, &[I, I, Z]).unwrap(), 3.0);
    }

    #[test]
    fn failures() {
        let store = ShadowStore::new(2, Ensemble::ProductPauli, QubitOrder::Forward);
        assert!(matches!(
            estimate_pauli(&store, &[Z, Z]),
            Err(ShadowError::EmptyShadowStore)
        ));
        let rot = Rotation::from_labels("ZZ").unwrap();
        let store = store_of(&rot, &[0, 0], QubitOrder::Forward);
        assert!(matches!(
            estimate_pauli(&store, &[Z]),
            Err(ShadowError::ObservableLength { expected: 2, got: 1 })
        ));
    }
}
