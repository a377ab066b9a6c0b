#![allow(non_snake_case, non_upper_case_globals)]

//! Classical shadow estimation of quantum states from randomized single-shot
//! measurements.
//!
//! A classical shadow is built one shot at a time: a random basis change is
//! drawn from a measurement ensemble, the state of interest is rotated and
//! measured by an external [`MeasurementAdapter`][adapter::MeasurementAdapter],
//! and the observed bits are turned into a *snapshot* of the state they
//! certify. Snapshots accumulate in a [`ShadowStore`][store::ShadowStore], from
//! which density matrices, fidelities, and Pauli expectation values are
//! estimated on demand by inverting the ensemble's measurement channel.
//!
//! Two ensembles are supported:
//! - random single-qubit Pauli bases, with inverse channel 3ρ – I on every
//!   qubit;
//! - a single random *n*-qubit Clifford, with inverse channel
//!   (2<sup>*n*</sup> + 1)ψ – I, where all snapshots are kept as stabilizer
//!   tableaux so that fidelities never require dense matrices.
//!
//! # Example
//! ```
//! use shadow_sim::{
//!     adapter::StabAdapter,
//!     clifford::Clifford,
//!     config::{ Ensemble, ShadowConfig },
//!     gate::Gate,
//!     shadow::ClassicalShadow,
//! };
//!
//! // prepare a Bell state on two qubits
//! let prep = Clifford::new(2, [Gate::H(0), Gate::CX(0, 1)]).unwrap();
//! let adapter = StabAdapter::new(prep.clone());
//! let config = ShadowConfig {
//!     ensemble: Ensemble::GlobalClifford,
//!     seed: Some(10546),
//!     ..ShadowConfig::default()
//! };
//! let mut shadow = ClassicalShadow::new(adapter, config).unwrap();
//! shadow.collect(2000).unwrap();
//!
//! let rho = shadow.reconstruct().unwrap();
//! assert!((rho.trace().re - 1.0).abs() < 1e-9);
//! let fidelity = shadow.estimate_fidelity(&prep).unwrap();
//! assert!((fidelity - 1.0).abs() < 0.3);
//! ```

pub mod error;
pub mod gate;
pub mod qubit;
pub mod clifford;
pub mod stab;
pub mod config;
pub mod rotation;
pub mod snapshot;
pub mod store;
pub mod recon;
pub mod fidelity;
pub mod observable;
pub mod adapter;
pub mod shadow;

pub use error::{ ShadowError, ShadowResult };
