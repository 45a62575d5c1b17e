//! Failure probability models attached to basic events and CCF groups.
//!
//! The model never computes with these values; they are carried through to
//! exporters as-is.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default error factor for lognormal distributions.
pub const DEFAULT_ERROR_FACTOR: f64 = 5.0;

/// Default percentile for lognormal distributions.
pub const DEFAULT_PERCENTILE: f64 = 0.99;

/// A failure probability model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Probability {
    /// A single fixed value in `[0, 1]`.
    PointEstimate {
        /// The probability value.
        value: f64,
    },
    /// A lognormal distribution given by its mean and error factor.
    LogNormal {
        /// Mean of the distribution.
        mean: f64,
        /// Ratio between the percentile value and the median.
        error_factor: f64,
        /// Percentile the error factor refers to.
        percentile: f64,
    },
}

impl Probability {
    /// Creates a point estimate.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is outside `[0, 1]` or not a number.
    pub fn point(value: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidProbability(format!(
                "point estimate {value} is outside [0, 1]"
            )));
        }
        Ok(Self::PointEstimate { value })
    }

    /// Creates a lognormal distribution with the default error factor and percentile.
    ///
    /// # Errors
    ///
    /// Returns an error if `mean` is not positive.
    pub fn lognormal(mean: f64) -> Result<Self> {
        Self::lognormal_with(mean, DEFAULT_ERROR_FACTOR, DEFAULT_PERCENTILE)
    }

    /// Creates a lognormal distribution.
    ///
    /// # Errors
    ///
    /// Returns an error if `mean` is not positive, `error_factor` is below 1,
    /// or `percentile` is outside `(0, 1)`.
    pub fn lognormal_with(mean: f64, error_factor: f64, percentile: f64) -> Result<Self> {
        if mean.is_nan() || mean <= 0.0 {
            return Err(Error::InvalidProbability(format!(
                "lognormal mean {mean} must be positive"
            )));
        }
        if error_factor.is_nan() || error_factor < 1.0 {
            return Err(Error::InvalidProbability(format!(
                "error factor {error_factor} must be at least 1"
            )));
        }
        if percentile.is_nan() || percentile <= 0.0 || percentile >= 1.0 {
            return Err(Error::InvalidProbability(format!(
                "percentile {percentile} must be in (0, 1)"
            )));
        }
        Ok(Self::LogNormal {
            mean,
            error_factor,
            percentile,
        })
    }

    /// Returns the central value (the point estimate or the mean).
    #[must_use]
    pub const fn central_value(&self) -> f64 {
        match self {
            Self::PointEstimate { value } => *value,
            Self::LogNormal { mean, .. } => *mean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_estimate_domain() {
        assert!(Probability::point(0.0).is_ok());
        assert!(Probability::point(1.0).is_ok());
        assert!(Probability::point(-0.1).is_err());
        assert!(Probability::point(1.1).is_err());
        assert!(Probability::point(f64::NAN).is_err());
    }

    #[test]
    fn lognormal_defaults() {
        let p = Probability::lognormal(1e-3).unwrap();
        assert_eq!(
            p,
            Probability::LogNormal {
                mean: 1e-3,
                error_factor: DEFAULT_ERROR_FACTOR,
                percentile: DEFAULT_PERCENTILE,
            }
        );
        assert!((p.central_value() - 1e-3).abs() < f64::EPSILON);
    }

    #[test]
    fn lognormal_rejects_bad_parameters() {
        assert!(Probability::lognormal(0.0).is_err());
        assert!(Probability::lognormal_with(1e-3, 0.5, 0.99).is_err());
        assert!(Probability::lognormal_with(1e-3, 3.0, 1.0).is_err());
    }
}
