//! Append-only storage of snapshots from a single ensemble.

use crate::{
    config::{ Ensemble, QubitOrder },
    error::{ ShadowError, ShadowResult },
    snapshot::Snapshot,
};

/// Whether a [`ShadowStore`] can answer queries yet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StoreState {
    /// No snapshots; every query fails.
    Empty,
    /// At least one snapshot. Snapshots may always be added.
    Collecting,
}

/// An ordered, append-only sequence of [`Snapshot`]s tagged with the ensemble
/// and qubit order they were built under.
///
/// Snapshots are never modified or removed once added.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowStore {
    n: usize,
    ensemble: Ensemble,
    qubit_order: QubitOrder,
    snapshots: Vec<Snapshot>,
}

impl ShadowStore {
    /// Create a new, empty store for snapshots on `n` qubits.
    pub fn new(n: usize, ensemble: Ensemble, qubit_order: QubitOrder) -> Self {
        Self { n, ensemble, qubit_order, snapshots: Vec::new() }
    }

    pub fn num_qubits(&self) -> usize { self.n }

    pub fn ensemble(&self) -> Ensemble { self.ensemble }

    pub fn qubit_order(&self) -> QubitOrder { self.qubit_order }

    pub fn len(&self) -> usize { self.snapshots.len() }

    pub fn is_empty(&self) -> bool { self.snapshots.is_empty() }

    pub fn state(&self) -> StoreState {
        if self.snapshots.is_empty() {
            StoreState::Empty
        } else {
            StoreState::Collecting
        }
    }

    pub fn snapshots(&self) -> &[Snapshot] { &self.snapshots }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> { self.snapshots.iter() }

    /// Check a snapshot against the store's ensemble and size.
    pub fn check(&self, snapshot: &Snapshot) -> ShadowResult<()> {
        if snapshot.ensemble() != self.ensemble {
            return Err(ShadowError::EnsembleMismatch {
                expected: self.ensemble,
                found: snapshot.ensemble(),
            });
        }
        if snapshot.num_qubits() != self.n {
            return Err(ShadowError::BitCountMismatch {
                expected: self.n,
                got: snapshot.num_qubits(),
            });
        }
        Ok(())
    }

    /// Append a snapshot.
    ///
    /// Fails with [`ShadowError::EnsembleMismatch`] if the snapshot was built
    /// under a different ensemble, or [`ShadowError::BitCountMismatch`] if it
    /// covers a different number of qubits; the store is unchanged on failure.
    pub fn push(&mut self, snapshot: Snapshot) -> ShadowResult<()> {
        self.check(&snapshot)?;
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Append several snapshots, either all of them or none.
    pub fn extend<I>(&mut self, snapshots: I) -> ShadowResult<()>
    where I: IntoIterator<Item = Snapshot>
    {
        let snapshots: Vec<Snapshot> = snapshots.into_iter().collect();
        snapshots.iter().try_for_each(|s| self.check(s))?;
        self.snapshots.extend(snapshots);
        Ok(())
    }

    // fail on queries against an empty store
    pub(crate) fn require_nonempty(&self) -> ShadowResult<()> {
        match self.state() {
            StoreState::Empty => Err(ShadowError::EmptyShadowStore),
            StoreState::Collecting => Ok(()),
        }
    }
}

impl<'a> IntoIterator for &'a ShadowStore {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter { self.snapshots.iter() }
}
