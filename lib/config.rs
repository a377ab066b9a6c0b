//! Session configuration.

use serde::{ Deserialize, Serialize };
use crate::error::ShadowResult;

/// The distribution from which measurement rotations are drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ensemble {
    /// An independent uniformly random basis from {X, Y, Z} on every qubit.
    #[default]
    ProductPauli,
    /// A single uniformly random element of the *n*-qubit Clifford group.
    GlobalClifford,
}

/// How qubit indices reported by a measurement adapter map onto tensor
/// factors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QubitOrder {
    /// Qubit `k` is tensor factor `k`, so that qubit 0 is the most significant
    /// bit of a basis index.
    #[default]
    Forward,
    /// Qubit `k` is tensor factor `n - 1 - k`, so that qubit 0 is the least
    /// significant bit of a basis index.
    Reversed,
}

/// Settings for a [`ClassicalShadow`][crate::shadow::ClassicalShadow].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub ensemble: Ensemble,
    pub qubit_order: QubitOrder,
    /// Seed for the session's random number generator; drawn from system
    /// entropy if `None`.
    pub seed: Option<u64>,
}

impl ShadowConfig {
    /// Parse a configuration from JSON, filling missing fields with their
    /// defaults.
    pub fn from_json(s: &str) -> ShadowResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> ShadowResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ShadowError;

    #[test]
    fn json_config() {
        let config
            = ShadowConfig::from_json(
                r#"{ "ensemble": "GlobalClifford", "seed": 10546 }"#
            )
            .unwrap();
        assert_eq!(config.ensemble, Ensemble::GlobalClifford);
        assert_eq!(config.qubit_order, QubitOrder::Forward);
        assert_eq!(config.seed, Some(10546));

        assert_eq!(ShadowConfig::from_json("{}").unwrap(), ShadowConfig::default());

        let config = ShadowConfig {
            ensemble: Ensemble::ProductPauli,
            qubit_order: QubitOrder::Reversed,
            seed: None,
        };
        let s = config.to_json().unwrap();
        assert_eq!(ShadowConfig::from_json(&s).unwrap(), config);

        assert!(matches!(
            ShadowConfig::from_json(r#"{ "ensemble": "Haar" }"#),
            Err(ShadowError::Config(_))
        ));
    }
}
