//! Flat generation parameters.
//!
//! [`GenerationParams`] is the serializable record a caller fills in (from a
//! config file, flags, or code). It maps onto the factor setters in a fixed
//! order and yields validated [`CalculatedFactors`].

use crate::builder::BuildOptions;
use crate::error::FactorError;
use crate::factors::{CalculatedFactors, ComplexityFactors, SizeFactors};
use ft_model::CcfModel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Every knob of a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Average number of arguments per gate.
    pub num_args: f64,
    /// Number of basic events.
    pub num_basic: usize,
    /// Number of house events.
    pub num_house: usize,
    /// Number of CCF groups.
    pub num_ccf: usize,
    /// CCF model of every group.
    pub ccf_model: CcfModel,
    /// Maximum members per CCF group.
    pub ccf_size: usize,
    /// Weights for `and`, `or`, `atleast`, `not`, `xor`.
    pub weights: Vec<f64>,
    /// Fraction of common basic events.
    pub common_b: f64,
    /// Fraction of common gates.
    pub common_g: f64,
    /// Average parents of common basic events.
    pub parents_b: f64,
    /// Average parents of common gates.
    pub parents_g: f64,
    /// Lower bound of basic event probabilities.
    pub min_prob: f64,
    /// Upper bound of basic event probabilities.
    pub max_prob: f64,
    /// Seed of the RNG stream.
    pub seed: u64,
    /// Fixed total number of gates; back-solves the common factors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_gate: Option<usize>,
    /// Wall-clock budget per tree in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            num_args: 3.0,
            num_basic: 100,
            num_house: 0,
            num_ccf: 0,
            ccf_model: CcfModel::AlphaFactor,
            ccf_size: 3,
            weights: vec![1.0, 3.0, 0.0, 0.0, 0.0],
            common_b: 0.1,
            common_g: 0.1,
            parents_b: 2.0,
            parents_g: 2.0,
            min_prob: 1e-5,
            max_prob: 1e-3,
            seed: 123,
            num_gate: None,
            timeout_ms: None,
        }
    }
}

impl GenerationParams {
    /// Validates the parameters and derives the secondary factors.
    ///
    /// # Errors
    ///
    /// Returns the first [`FactorError`] raised by the setters, the gate
    /// constraint, or `calculate()`.
    pub fn to_factors(&self) -> Result<CalculatedFactors, FactorError> {
        let mut factors = ComplexityFactors::new();
        factors.set_min_max_prob(self.min_prob, self.max_prob)?;
        factors.set_common_event_factors(
            self.common_b,
            self.common_g,
            self.parents_b,
            self.parents_g,
        )?;
        factors.set_num_factors(self.size_factors())?;
        factors.set_gate_weights(&self.weights)?;
        if let Some(num_gate) = self.num_gate {
            factors.constrain_num_gate(num_gate)?;
        }
        factors.calculate()
    }

    /// Size factors described by these parameters.
    pub fn size_factors(&self) -> SizeFactors {
        SizeFactors::new(self.num_args, self.num_basic)
            .with_house(self.num_house)
            .with_ccf(self.num_ccf, self.ccf_model, self.ccf_size)
    }

    /// Wall-clock budget per tree.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Build options for a tree called `name`.
    pub fn build_options(&self, name: impl Into<String>) -> BuildOptions {
        BuildOptions::default()
            .with_name(name)
            .with_seed(self.seed)
            .with_timeout(self.timeout())
    }
}
