//! Error conditions raised by the shadow estimation engine.
//!
//! All errors are local and synchronous: they are raised where a precondition
//! is found to be violated and are never retried internally.

use thiserror::Error;
use crate::{ config::Ensemble, gate::Gate };

#[derive(Debug, Error)]
pub enum ShadowError {
    /// A measurement basis label outside of {X, Y, Z}.
    #[error("invalid rotation label {0:?}: must be one of X, Y, Z")]
    InvalidRotationLabel(String),

    /// A measurement outcome outside of {0, 1}.
    #[error("invalid measurement outcome {value} on qubit {qubit}: must be 0 or 1")]
    InvalidMeasurement { qubit: usize, value: u8 },

    /// The number of measured bits disagrees with the size of the rotation.
    #[error("received {got} measurement outcomes for a {expected}-qubit rotation")]
    BitCountMismatch { expected: usize, got: usize },

    /// A Clifford element acts on a different number of qubits than the
    /// register it is applied to.
    #[error("Clifford element acts on {clifford} qubits, but the register has {register}")]
    CliffordQubitMismatch { clifford: usize, register: usize },

    /// A gate addresses qubits outside the register or repeats a qubit index.
    #[error("gate {gate:?} is not valid on a {n}-qubit register")]
    InvalidGate { gate: Gate, n: usize },

    /// An estimate was requested from a store without any snapshots.
    #[error("shadow store contains no snapshots")]
    EmptyShadowStore,

    /// Snapshots built under one ensemble were used where another is required.
    #[error("expected {expected:?} snapshots, but found {found:?} snapshots")]
    EnsembleMismatch { expected: Ensemble, found: Ensemble },

    /// A Pauli observable has the wrong number of qubits.
    #[error("observable acts on {got} qubits, but the register has {expected}")]
    ObservableLength { expected: usize, got: usize },

    /// A dense operator was requested for too many qubits.
    #[error("refusing to build a dense operator on {n} qubits (at most {max} allowed)")]
    DenseTooLarge { n: usize, max: usize },

    /// The state provider reported an empty register.
    #[error("register must contain at least one qubit")]
    NoQubits,

    /// The external measurement adapter failed.
    #[error("measurement adapter failed: {0}")]
    Adapter(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type ShadowResult<T> = Result<T, ShadowError>;
