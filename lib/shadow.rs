//! Classical shadow sessions.
//!
//! A [`ClassicalShadow`] owns a measurement adapter, a rotation sampler, a
//! seeded random number generator, and the growing [`ShadowStore`]. Each shot
//! draws a rotation, has the adapter measure under it, converts the outcome
//! to a snapshot, and appends the snapshot. Estimates are recomputed from the
//! full store on every query, so they can be requested at any point during
//! collection.

use log::{ debug, info, trace };
use rand::{ Rng, SeedableRng, rngs::StdRng };
use rayon::prelude::*;
use crate::{
    adapter::MeasurementAdapter,
    clifford::Clifford,
    config::{ Ensemble, QubitOrder, ShadowConfig },
    error::{ ShadowError, ShadowResult },
    fidelity,
    gate::Pauli,
    observable,
    recon::{ self, DensityMatrix },
    rotation::RotationSampler,
    snapshot::Snapshot,
    store::ShadowStore,
};

/// A classical shadow estimation session for the state prepared by a single
/// [`MeasurementAdapter`].
#[derive(Clone, Debug)]
pub struct ClassicalShadow<A, S = Ensemble>
where
    A: MeasurementAdapter,
    S: RotationSampler,
{
    adapter: A,
    sampler: S,
    config: ShadowConfig,
    rng: StdRng,
    store: ShadowStore,
}

impl<A> ClassicalShadow<A, Ensemble>
where A: MeasurementAdapter
{
    /// Create a new session drawing rotations from `config.ensemble`.
    ///
    /// Fails with [`ShadowError::NoQubits`] if the adapter reports an empty
    /// register.
    pub fn new(adapter: A, config: ShadowConfig) -> ShadowResult<Self> {
        Self::with_sampler(adapter, config.ensemble, config)
    }
}

impl<A, S> ClassicalShadow<A, S>
where
    A: MeasurementAdapter,
    S: RotationSampler,
{
    /// Create a new session drawing rotations from `sampler`.
    ///
    /// Snapshots are tagged with the sampler's ensemble, which takes the
    /// place of `config.ensemble`. Fails with [`ShadowError::NoQubits`] if the
    /// adapter reports an empty register.
    pub fn with_sampler(adapter: A, sampler: S, config: ShadowConfig)
        -> ShadowResult<Self>
    {
        let n = adapter.num_qubits();
        if n == 0 { return Err(ShadowError::NoQubits); }
        let config = ShadowConfig { ensemble: sampler.ensemble(), ..config };
        let rng
            = config.seed
            .map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_entropy);
        let store = ShadowStore::new(n, config.ensemble, config.qubit_order);
        info!(
            "new classical shadow: {} qubits, {:?} ensemble, {:?} qubit order, seed {:?}",
            n, config.ensemble, config.qubit_order, config.seed,
        );
        Ok(Self { adapter, sampler, config, rng, store })
    }

    pub fn num_qubits(&self) -> usize { self.store.num_qubits() }

    pub fn config(&self) -> &ShadowConfig { &self.config }

    pub fn adapter(&self) -> &A { &self.adapter }

    pub fn store(&self) -> &ShadowStore { &self.store }

    pub fn num_snapshots(&self) -> usize { self.store.len() }

    /// Consume `self`, returning only the collected snapshots.
    pub fn into_store(self) -> ShadowStore { self.store }

    // run a single shot without touching the store
    fn shot<R>(
        adapter: &A,
        sampler: &S,
        n: usize,
        order: QubitOrder,
        rng: &mut R,
    ) -> ShadowResult<Snapshot>
    where R: Rng + ?Sized
    {
        let rotation = sampler.sample(n, rng);
        let bits
            = adapter.run(adapter.state_prep(), &rotation, rng)
            .map_err(|err| ShadowError::Adapter(Box::new(err)))?;
        trace!("measured {:?} under {:?}", bits, rotation);
        Snapshot::build(&rotation, &bits, order)
    }

    /// Run a single shot and append its snapshot.
    ///
    /// Nothing is appended on failure.
    pub fn add_snapshot(&mut self) -> ShadowResult<()> {
        let snapshot
            = Self::shot(
                &self.adapter,
                &self.sampler,
                self.store.num_qubits(),
                self.config.qubit_order,
                &mut self.rng,
            )?;
        self.store.push(snapshot)
    }

    /// Run `shots` shots in sequence, appending all of their snapshots or, on
    /// the first failure, none of them.
    pub fn collect(&mut self, shots: usize) -> ShadowResult<()> {
        debug!("collecting {} snapshots ({} stored)", shots, self.store.len());
        let n = self.store.num_qubits();
        let order = self.config.qubit_order;
        let batch: Vec<Snapshot>
            = (0..shots)
            .map(|_| Self::shot(&self.adapter, &self.sampler, n, order, &mut self.rng))
            .collect::<ShadowResult<_>>()?;
        self.store.extend(batch)
    }

    /// Like [`Self::collect`], but running shots in parallel.
    ///
    /// Every shot gets its own generator, seeded from the session's generator
    /// in shot order, and snapshots are appended in shot order, so the result
    /// depends only on the session seed and not on thread scheduling.
    pub fn collect_parallel(&mut self, shots: usize) -> ShadowResult<()>
    where
        A: Sync,
        A::Prep: Sync,
        S: Sync,
    {
        debug!(
            "collecting {} snapshots in parallel ({} stored)",
            shots, self.store.len(),
        );
        let n = self.store.num_qubits();
        let order = self.config.qubit_order;
        let seeds: Vec<u64> = (0..shots).map(|_| self.rng.gen()).collect();
        let adapter = &self.adapter;
        let sampler = &self.sampler;
        let batch: Vec<Snapshot>
            = seeds.into_par_iter()
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                Self::shot(adapter, sampler, n, order, &mut rng)
            })
            .collect::<ShadowResult<_>>()?;
        self.store.extend(batch)
    }

    /// Reconstruct the density matrix of the measured state.
    ///
    /// See [`recon::reconstruct`].
    pub fn reconstruct(&self) -> ShadowResult<DensityMatrix> {
        recon::reconstruct(&self.store)
    }

    /// Estimate the fidelity of the measured state with the state prepared by
    /// `target`, in the adapter's qubit labels.
    ///
    /// See [`fidelity::estimate_fidelity`].
    pub fn estimate_fidelity(&self, target: &Clifford) -> ShadowResult<f64> {
        fidelity::estimate_fidelity(&self.store, target)
    }

    /// Estimate the expectation value of a Pauli string, in the adapter's
    /// qubit labels.
    ///
    /// See [`observable::estimate_pauli`].
    pub fn estimate_pauli(&self, ops: &[Pauli]) -> ShadowResult<f64> {
        observable::estimate_pauli(&self.store, ops)
    }
}
