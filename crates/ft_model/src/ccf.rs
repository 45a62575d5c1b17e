//! Common-cause failure groups.

use crate::error::{Error, Result};
use crate::event::BasicEventId;
use crate::probability::Probability;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parametric model distributing a group's failure probability over
/// multiplicities of simultaneous member failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CcfModel {
    /// Multiple Greek Letter model: one factor per multiplicity above one.
    #[serde(rename = "MGL")]
    Mgl,
    /// Alpha-factor model: one factor per multiplicity.
    #[default]
    #[serde(rename = "alpha-factor")]
    AlphaFactor,
}

impl CcfModel {
    /// Returns the conventional name of the model.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mgl => "MGL",
            Self::AlphaFactor => "alpha-factor",
        }
    }

    /// Returns the number of factors a group of `members` events carries.
    #[must_use]
    pub const fn factor_count(self, members: usize) -> usize {
        match self {
            Self::Mgl => members.saturating_sub(1),
            Self::AlphaFactor => members,
        }
    }
}

impl fmt::Display for CcfModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CcfModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mgl" => Ok(Self::Mgl),
            "alpha-factor" | "alpha_factor" | "alpha" => Ok(Self::AlphaFactor),
            other => Err(format!(
                "unknown CCF model '{other}', expected 'MGL' or 'alpha-factor'"
            )),
        }
    }
}

/// A set of basic events sharing a modeled common cause of failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CcfGroup {
    name: String,
    members: Vec<BasicEventId>,
    probability: Probability,
    model: CcfModel,
    factors: Vec<f64>,
}

impl CcfGroup {
    /// Creates a group, checking the member count and factor count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCcfGroup`] if the group has fewer than two
    /// members, repeats a member, or carries the wrong number of factors.
    pub fn new(
        name: impl Into<String>,
        members: Vec<BasicEventId>,
        probability: Probability,
        model: CcfModel,
        factors: Vec<f64>,
    ) -> Result<Self> {
        let name = name.into();
        if members.len() < 2 {
            return Err(Error::InvalidCcfGroup {
                name,
                reason: format!("needs at least 2 members, got {}", members.len()),
            });
        }
        let mut sorted = members.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != members.len() {
            return Err(Error::InvalidCcfGroup {
                name,
                reason: "members must be distinct".to_string(),
            });
        }
        let expected = model.factor_count(members.len());
        if factors.len() != expected {
            return Err(Error::InvalidCcfGroup {
                name,
                reason: format!(
                    "{model} model with {} members needs {expected} factors, got {}",
                    members.len(),
                    factors.len()
                ),
            });
        }
        Ok(Self {
            name,
            members,
            probability,
            model,
            factors,
        })
    }

    /// Returns the unique group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the member basic events in group order.
    #[must_use]
    pub fn members(&self) -> &[BasicEventId] {
        &self.members
    }

    /// Returns the shared base failure probability.
    #[must_use]
    pub const fn probability(&self) -> &Probability {
        &self.probability
    }

    /// Returns the CCF model.
    #[must_use]
    pub const fn model(&self) -> CcfModel {
        self.model
    }

    /// Returns the contribution factors.
    #[must_use]
    pub fn factors(&self) -> &[f64] {
        &self.factors
    }
}
