//! Complexity factors of a generated fault tree.
//!
//! [`ComplexityFactors`] collects and validates the configurable factors.
//! [`ComplexityFactors::calculate`] derives the secondary statistics and
//! returns [`CalculatedFactors`], the read-only object that provides every
//! sampling primitive and estimator the builder needs.

#![allow(clippy::cast_possible_truncation)] // estimators truncate like the closed-form model
#![allow(clippy::cast_sign_loss)] // truncated values are non-negative
#![allow(clippy::cast_precision_loss)] // event counts stay far below 2^52

use crate::error::FactorError;
use ft_model::{CcfModel, Operator};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Upper bound for the common node fractions.
pub const MAX_COMMON: f64 = 0.9;

/// Upper bound for the average number of parents of common nodes.
pub const MAX_PARENTS: f64 = 100.0;

/// Lower bound for back-solved common fractions.
const MIN_CONSTRAINED_COMMON: f64 = 0.01;

/// Minimum arity of each operator, in [`Operator::ALL`] order.
const MIN_ARGS: [f64; 5] = [2.0, 2.0, 3.0, 1.0, 2.0];

type FactorResult<T> = std::result::Result<T, FactorError>;

/// Sharing factors for common basic events and gates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommonFactors {
    /// Fraction of common basic events per gate.
    pub common_b: f64,
    /// Fraction of common gates per gate.
    pub common_g: f64,
    /// Average number of parents of common basic events.
    pub parents_b: f64,
    /// Average number of parents of common gates.
    pub parents_g: f64,
}

/// Size factors of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeFactors {
    /// Average number of gate arguments.
    pub num_args: f64,
    /// Number of basic events.
    pub num_basic: usize,
    /// Number of house events.
    pub num_house: usize,
    /// Number of CCF groups.
    pub num_ccf: usize,
    /// Model of the CCF groups.
    pub ccf_model: CcfModel,
    /// Maximum number of members in a CCF group.
    pub ccf_size: usize,
}

impl SizeFactors {
    /// Creates size factors without house events or CCF groups.
    #[must_use]
    pub const fn new(num_args: f64, num_basic: usize) -> Self {
        Self {
            num_args,
            num_basic,
            num_house: 0,
            num_ccf: 0,
            ccf_model: CcfModel::AlphaFactor,
            ccf_size: 3,
        }
    }

    /// Sets the number of house events.
    #[must_use]
    pub const fn with_house(mut self, num_house: usize) -> Self {
        self.num_house = num_house;
        self
    }

    /// Sets the CCF group count, model and maximum group size.
    #[must_use]
    pub const fn with_ccf(mut self, num_ccf: usize, model: CcfModel, ccf_size: usize) -> Self {
        self.num_ccf = num_ccf;
        self.ccf_model = model;
        self.ccf_size = ccf_size;
        self
    }
}

/// Configurable generation factors, validated on every setter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexityFactors {
    min_prob: f64,
    max_prob: f64,
    common: Option<CommonFactors>,
    size: Option<SizeFactors>,
    weights: Option<[f64; 5]>,
    num_gate: Option<usize>,
}

impl Default for ComplexityFactors {
    fn default() -> Self {
        Self {
            min_prob: 0.0,
            max_prob: 1.0,
            common: None,
            size: None,
            weights: None,
            num_gate: None,
        }
    }
}

fn check_common(which: &'static str, value: f64) -> FactorResult<()> {
    if value > 0.0 && value <= MAX_COMMON {
        Ok(())
    } else {
        Err(FactorError::CommonRange { which, value })
    }
}

fn check_parents(which: &'static str, value: f64) -> FactorResult<()> {
    if (2.0..=MAX_PARENTS).contains(&value) {
        Ok(())
    } else {
        Err(FactorError::ParentsRange { which, value })
    }
}

impl ComplexityFactors {
    /// Creates factors with probability bounds `[0, 1]` and nothing else set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the probability bounds for basic events and CCF groups.
    ///
    /// # Errors
    ///
    /// Fails if a bound is outside `[0, 1]` or `min > max`.
    pub fn set_min_max_prob(&mut self, min: f64, max: f64) -> FactorResult<()> {
        if !(0.0..=1.0).contains(&min) {
            return Err(FactorError::ProbabilityRange {
                which: "min",
                value: min,
            });
        }
        if !(0.0..=1.0).contains(&max) {
            return Err(FactorError::ProbabilityRange {
                which: "max",
                value: max,
            });
        }
        if min > max {
            return Err(FactorError::ProbabilityOrder { min, max });
        }
        self.min_prob = min;
        self.max_prob = max;
        Ok(())
    }

    /// Sets the factors for common basic events and gates.
    ///
    /// # Errors
    ///
    /// Fails if a fraction is outside `(0, 0.9]` or a parent count outside
    /// `[2, 100]`.
    pub fn set_common_event_factors(
        &mut self,
        common_b: f64,
        common_g: f64,
        parents_b: f64,
        parents_g: f64,
    ) -> FactorResult<()> {
        check_common("common_b", common_b)?;
        check_common("common_g", common_g)?;
        check_parents("parents_b", parents_b)?;
        check_parents("parents_g", parents_g)?;
        self.common = Some(CommonFactors {
            common_b,
            common_g,
            parents_b,
            parents_g,
        });
        Ok(())
    }

    /// Sets the size factors.
    ///
    /// # Errors
    ///
    /// Fails if `num_args < 2`, `num_basic < 1`, `num_house >= num_basic`,
    /// `num_ccf > num_basic / num_args`, or CCF groups are requested with a
    /// maximum size below two.
    pub fn set_num_factors(&mut self, size: SizeFactors) -> FactorResult<()> {
        if size.num_args.is_nan() || size.num_args < 2.0 {
            return Err(FactorError::TooFewArguments(size.num_args));
        }
        if size.num_basic < 1 {
            return Err(FactorError::NoBasicEvents);
        }
        if size.num_house >= size.num_basic {
            return Err(FactorError::TooManyHouseEvents {
                num_house: size.num_house,
                num_basic: size.num_basic,
            });
        }
        let limit = size.num_basic as f64 / size.num_args;
        if size.num_ccf as f64 > limit {
            return Err(FactorError::TooManyCcfGroups {
                num_ccf: size.num_ccf,
                limit,
            });
        }
        if size.num_ccf > 0 && size.ccf_size < 2 {
            return Err(FactorError::CcfSizeTooSmall(size.ccf_size));
        }
        self.size = Some(size);
        Ok(())
    }

    /// Sets the gate weights for `and`, `or`, `atleast`, `not`, `xor`.
    ///
    /// Missing trailing weights are zero.
    ///
    /// # Errors
    ///
    /// Fails on an empty list, negative weights, more than five weights, an
    /// all-zero list, or when only NOT and XOR carry weight.
    pub fn set_gate_weights(&mut self, weights: &[f64]) -> FactorResult<()> {
        if weights.is_empty() {
            return Err(FactorError::NoWeights);
        }
        if let Some(w) = weights.iter().find(|w| w.is_nan() || **w < 0.0) {
            return Err(FactorError::NegativeWeight(*w));
        }
        if weights.len() > Operator::ALL.len() {
            return Err(FactorError::TooManyWeights(weights.len()));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(FactorError::ZeroWeights);
        }
        if weights.len() > 3 && weights[..3].iter().sum::<f64>() <= 0.0 {
            return Err(FactorError::OnlyUnaryOrBinary);
        }
        let mut padded = [0.0; 5];
        padded[..weights.len()].copy_from_slice(weights);
        self.weights = Some(padded);
        Ok(())
    }

    /// Fixes the total number of gates and back-solves the common factors.
    ///
    /// Must be called after the size and common factors are set. The
    /// back-solved values are clamped to `[0.01, 0.9]` and `[2, 100]`; every
    /// clamp is logged.
    ///
    /// # Errors
    ///
    /// Fails if `num_gate < 1`, if `num_gate * num_args <= num_basic`, or if
    /// the size or common factors are missing.
    pub fn constrain_num_gate(&mut self, num_gate: usize) -> FactorResult<()> {
        let size = self.size.ok_or(FactorError::Missing("size"))?;
        let mut common = self.common.ok_or(FactorError::Missing("common event"))?;
        if num_gate < 1 {
            return Err(FactorError::TooFewGates);
        }
        if num_gate as f64 * size.num_args <= size.num_basic as f64 {
            return Err(FactorError::InsufficientCapacity {
                num_gate,
                num_args: size.num_args,
                num_basic: size.num_basic,
            });
        }

        let alpha = num_gate as f64 / size.num_basic as f64;
        let min_common = 1.0 - (1.0 + alpha) / size.num_args / alpha;
        let mut shared = common.common_g.max(common.common_b);
        if min_common > 0.0 {
            if shared < min_common {
                shared = ((min_common + 0.05) * 10.0).round() / 10.0;
            } else if shared > 2.0 * min_common {
                shared = 2.0 * min_common;
            }
        }
        if !(MIN_CONSTRAINED_COMMON..=MAX_COMMON).contains(&shared) {
            let clamped = shared.clamp(MIN_CONSTRAINED_COMMON, MAX_COMMON);
            warn!(
                solved = shared,
                clamped, "back-solved common fraction out of range, clamping"
            );
            shared = clamped;
        }

        let mut parents = if min_common > 0.0 {
            1.0 / (1.0 - min_common / shared)
        } else {
            2.0
        };
        if !(2.0..=MAX_PARENTS).contains(&parents) {
            let clamped = if parents > 2.0 { MAX_PARENTS } else { 2.0 };
            warn!(
                solved = parents,
                clamped, "back-solved parent count out of range, clamping"
            );
            parents = clamped;
        }

        debug!(num_gate, common = shared, parents, "constrained gate count");
        common.common_b = shared;
        common.common_g = shared;
        common.parents_b = parents;
        common.parents_g = parents;
        self.common = Some(common);
        self.num_gate = Some(num_gate);
        Ok(())
    }

    /// Returns the probability bounds.
    pub const fn min_max_prob(&self) -> (f64, f64) {
        (self.min_prob, self.max_prob)
    }

    /// Returns the common factors, if set.
    pub const fn common(&self) -> Option<&CommonFactors> {
        self.common.as_ref()
    }

    /// Returns the size factors, if set.
    pub const fn size(&self) -> Option<&SizeFactors> {
        self.size.as_ref()
    }

    /// Returns the padded gate weights, if set.
    pub const fn gate_weights(&self) -> Option<&[f64; 5]> {
        self.weights.as_ref()
    }

    /// Derives the secondary factors.
    ///
    /// # Errors
    ///
    /// Fails if a setter was skipped, if no weighted operator can be filled
    /// with `num_basic` distinct basic events, or if the derived
    /// basic-to-gate ratio is not positive.
    pub fn calculate(&self) -> FactorResult<CalculatedFactors> {
        let common = self.common.ok_or(FactorError::Missing("common event"))?;
        let size = self.size.ok_or(FactorError::Missing("size"))?;
        let weights = self.weights.ok_or(FactorError::Missing("gate weight"))?;

        // The lowest gates of any tree take basic events only.
        let min_args = Operator::ALL
            .iter()
            .zip(&weights)
            .filter(|(_, w)| **w > 0.0)
            .map(|(op, _)| op.min_args())
            .min()
            .unwrap_or(2);
        if size.num_basic < min_args {
            return Err(FactorError::TooFewBasicEvents {
                num_basic: size.num_basic,
                min_args,
            });
        }

        let total: f64 = weights.iter().sum();
        let norm_weights = weights.map(|w| w / total);
        let mut cum_dist = [0.0; 6];
        for (i, w) in norm_weights.iter().enumerate() {
            cum_dist[i + 1] = cum_dist[i] + w;
        }

        let max_args = max_args(size.num_args, &norm_weights);
        let g_factor = 1.0 - common.common_g + common.common_g / common.parents_g;
        let ratio = size.num_args * g_factor - 1.0;
        if ratio.is_nan() || ratio <= 0.0 {
            return Err(FactorError::NonPositiveRatio(ratio));
        }
        let percent_basic = ratio / (1.0 + ratio);
        let percent_gate = 1.0 / (1.0 + ratio);
        debug!(max_args, ratio, percent_basic, percent_gate, "calculated factors");

        Ok(CalculatedFactors {
            min_prob: self.min_prob,
            max_prob: self.max_prob,
            common,
            size,
            weights,
            num_gate: self.num_gate,
            norm_weights,
            cum_dist,
            max_args,
            ratio,
            percent_basic,
            percent_gate,
        })
    }
}

/// Upper bound for symmetric arity sampling of AND, OR and K/N gates.
///
/// NOT and XOR have a fixed arity; the variable-arity gates are sampled
/// uniformly so their average is `(min + max) / 2`. The result may have a
/// fractional part that sampling accounts for.
fn max_args(num_args: f64, norm_weights: &[f64; 5]) -> f64 {
    let var_weight: f64 = norm_weights[..3].iter().sum();
    let var_contrib: f64 = MIN_ARGS[..3]
        .iter()
        .zip(&norm_weights[..3])
        .map(|(a, w)| a * w)
        .sum();
    let const_contrib: f64 = MIN_ARGS[3..]
        .iter()
        .zip(&norm_weights[3..])
        .map(|(a, w)| a * w)
        .sum();
    (2.0 * num_args - var_contrib - 2.0 * const_contrib) / var_weight
}

/// Validated factors with derived statistics and sampling primitives.
///
/// Read-only after construction, so one instance can be shared across
/// threads generating independent trees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatedFactors {
    min_prob: f64,
    max_prob: f64,
    common: CommonFactors,
    size: SizeFactors,
    weights: [f64; 5],
    #[serde(skip_serializing_if = "Option::is_none")]
    num_gate: Option<usize>,
    norm_weights: [f64; 5],
    #[serde(skip)]
    cum_dist: [f64; 6],
    max_args: f64,
    ratio: f64,
    percent_basic: f64,
    percent_gate: f64,
}

impl CalculatedFactors {
    /// Lower probability bound.
    pub const fn min_prob(&self) -> f64 {
        self.min_prob
    }

    /// Upper probability bound.
    pub const fn max_prob(&self) -> f64 {
        self.max_prob
    }

    /// Sharing factors, possibly back-solved from a constrained gate count.
    pub const fn common(&self) -> &CommonFactors {
        &self.common
    }

    /// Size factors.
    pub const fn size(&self) -> &SizeFactors {
        &self.size
    }

    /// Raw gate weights, padded to five.
    pub const fn gate_weights(&self) -> &[f64; 5] {
        &self.weights
    }

    /// Gate weights normalized to probabilities.
    pub const fn norm_weights(&self) -> &[f64; 5] {
        &self.norm_weights
    }

    /// Expected upper bound of variable arities.
    pub const fn max_args(&self) -> f64 {
        self.max_args
    }

    /// Basic events to gates ratio per gate.
    pub const fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Expected fraction of gate arguments that are basic events.
    pub const fn percent_basic(&self) -> f64 {
        self.percent_basic
    }

    /// Expected fraction of gate arguments that are gates.
    pub const fn percent_gate(&self) -> f64 {
        self.percent_gate
    }

    /// Samples a gate operator by inverse-CDF over the normalized weights.
    pub fn random_operator<R: Rng + ?Sized>(&self, rng: &mut R) -> Operator {
        let r: f64 = rng.gen();
        for (i, op) in Operator::ALL.iter().enumerate() {
            if r < self.cum_dist[i + 1] && self.norm_weights[i] > 0.0 {
                return *op;
            }
        }
        // Rounding left the last bin short of 1.0.
        Operator::ALL
            .iter()
            .rev()
            .zip(self.norm_weights.iter().rev())
            .find(|(_, w)| **w > 0.0)
            .map_or(Operator::Or, |(op, _)| *op)
    }

    /// Samples the number of arguments for a gate of the given operator.
    ///
    /// Returns the arity and, for `atleast` gates, the vote number drawn
    /// uniformly in `[2, arity - 1]`. The two are sampled together because
    /// `k_num` is only meaningful relative to the arity.
    pub fn num_args<R: Rng + ?Sized>(&self, rng: &mut R, operator: Operator) -> (usize, Option<usize>) {
        if let Some(fixed) = operator.fixed_args() {
            return (fixed, None);
        }

        let floor = self.max_args.floor();
        let mut max_args = floor.max(0.0) as usize;
        if rng.gen::<f64>() < self.max_args - floor {
            max_args += 1;
        }

        if operator == Operator::AtLeast {
            let max_args = max_args.max(3);
            let num_args = rng.gen_range(3..=max_args);
            let k_num = rng.gen_range(2..=num_args - 1);
            return (num_args, Some(k_num));
        }
        (rng.gen_range(2..=max_args.max(2)), None)
    }

    /// Estimates the total number of gates, or returns the constrained count.
    pub fn num_gate(&self) -> usize {
        if let Some(num_gate) = self.num_gate {
            return num_gate;
        }
        let c = &self.common;
        let b_factor = 1.0 - c.common_b + c.common_b / c.parents_b;
        (self.size.num_basic as f64 / (self.percent_basic * self.size.num_args * b_factor)) as usize
    }

    /// Estimates the number of common basic events for `num_gate` gates.
    pub fn num_common_basic(&self, num_gate: usize) -> usize {
        let c = &self.common;
        (c.common_b * self.percent_basic * self.size.num_args * num_gate as f64 / c.parents_b)
            as usize
    }

    /// Estimates the number of common gates for `num_gate` gates.
    pub fn num_common_gate(&self, num_gate: usize) -> usize {
        let c = &self.common;
        (c.common_g * self.percent_gate * self.size.num_args * num_gate as f64 / c.parents_g)
            as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn factors(num_basic: usize, weights: &[f64]) -> ComplexityFactors {
        let mut f = ComplexityFactors::new();
        f.set_min_max_prob(0.01, 0.1).unwrap();
        f.set_common_event_factors(0.1, 0.1, 2.0, 2.0).unwrap();
        f.set_num_factors(SizeFactors::new(3.0, num_basic)).unwrap();
        f.set_gate_weights(weights).unwrap();
        f
    }

    #[test]
    fn probability_bounds() {
        let mut f = ComplexityFactors::new();
        assert!(f.set_min_max_prob(-0.1, 0.5).is_err());
        assert!(f.set_min_max_prob(0.1, 1.5).is_err());
        assert_eq!(
            f.set_min_max_prob(0.5, 0.1),
            Err(FactorError::ProbabilityOrder { min: 0.5, max: 0.1 })
        );
        assert!(f.set_min_max_prob(0.2, 0.2).is_ok());
        assert_eq!(f.min_max_prob(), (0.2, 0.2));
    }

    #[test]
    fn common_factor_ranges() {
        let mut f = ComplexityFactors::new();
        assert!(f.set_common_event_factors(0.0, 0.1, 2.0, 2.0).is_err());
        assert!(f.set_common_event_factors(0.1, 0.95, 2.0, 2.0).is_err());
        assert!(f.set_common_event_factors(0.1, 0.1, 1.5, 2.0).is_err());
        assert!(f.set_common_event_factors(0.1, 0.1, 2.0, 101.0).is_err());
        assert!(f.set_common_event_factors(0.9, 0.9, 100.0, 2.0).is_ok());
    }

    #[test]
    fn size_factor_boundaries() {
        let mut f = ComplexityFactors::new();
        assert_eq!(
            f.set_num_factors(SizeFactors::new(1.5, 10)),
            Err(FactorError::TooFewArguments(1.5))
        );
        assert_eq!(
            f.set_num_factors(SizeFactors::new(3.0, 0)),
            Err(FactorError::NoBasicEvents)
        );
        assert!(matches!(
            f.set_num_factors(SizeFactors::new(3.0, 10).with_house(10)),
            Err(FactorError::TooManyHouseEvents { .. })
        ));
        assert!(matches!(
            f.set_num_factors(SizeFactors::new(3.0, 9).with_ccf(4, CcfModel::Mgl, 3)),
            Err(FactorError::TooManyCcfGroups { .. })
        ));
        assert_eq!(
            f.set_num_factors(SizeFactors::new(3.0, 9).with_ccf(1, CcfModel::Mgl, 1)),
            Err(FactorError::CcfSizeTooSmall(1))
        );
        assert!(f
            .set_num_factors(SizeFactors::new(3.0, 9).with_house(8).with_ccf(3, CcfModel::Mgl, 3))
            .is_ok());
    }

    #[test]
    fn gate_weight_validation() {
        let mut f = ComplexityFactors::new();
        assert_eq!(f.set_gate_weights(&[]), Err(FactorError::NoWeights));
        assert_eq!(f.set_gate_weights(&[-1.0, -2.0]), Err(FactorError::NegativeWeight(-1.0)));
        assert_eq!(f.set_gate_weights(&[0.0, 0.0, 0.0]), Err(FactorError::ZeroWeights));
        assert_eq!(
            f.set_gate_weights(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]),
            Err(FactorError::TooManyWeights(6))
        );
        assert_eq!(
            f.set_gate_weights(&[0.0, 0.0, 0.0, 1.0, 1.0]),
            Err(FactorError::OnlyUnaryOrBinary)
        );
        f.set_gate_weights(&[1.0, 3.0]).unwrap();
        assert_eq!(f.gate_weights(), Some(&[1.0, 3.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn calculate_requires_every_setter() {
        let mut f = ComplexityFactors::new();
        assert_eq!(f.calculate(), Err(FactorError::Missing("common event")));
        f.set_common_event_factors(0.1, 0.1, 2.0, 2.0).unwrap();
        assert_eq!(f.calculate(), Err(FactorError::Missing("size")));
        f.set_num_factors(SizeFactors::new(3.0, 10)).unwrap();
        assert_eq!(f.calculate(), Err(FactorError::Missing("gate weight")));
        f.set_gate_weights(&[1.0]).unwrap();
        assert!(f.calculate().is_ok());
    }

    #[test]
    fn derived_statistics_for_small_tree() {
        let calc = factors(10, &[1.0, 3.0, 0.0, 0.0, 0.0]).calculate().unwrap();
        assert!((calc.max_args() - 4.0).abs() < 1e-12);
        assert!((calc.ratio() - 1.85).abs() < 1e-12);
        assert!((calc.percent_basic() + calc.percent_gate() - 1.0).abs() < 1e-12);
        assert_eq!(calc.num_gate(), 5);
        assert_eq!(calc.num_common_basic(5), 0);
        assert_eq!(calc.num_common_gate(5), 0);
    }

    #[test]
    fn basic_events_must_fill_the_smallest_gate() {
        let mut f = ComplexityFactors::new();
        f.set_common_event_factors(0.1, 0.1, 2.0, 2.0).unwrap();
        f.set_num_factors(SizeFactors::new(2.0, 1)).unwrap();
        f.set_gate_weights(&[1.0, 1.0]).unwrap();
        assert_eq!(
            f.calculate(),
            Err(FactorError::TooFewBasicEvents {
                num_basic: 1,
                min_args: 2
            })
        );
        f.set_gate_weights(&[1.0, 1.0, 0.0, 1.0]).unwrap();
        assert!(f.calculate().is_ok());

        f.set_num_factors(SizeFactors::new(3.0, 2)).unwrap();
        f.set_gate_weights(&[0.0, 0.0, 1.0]).unwrap();
        assert!(matches!(
            f.calculate(),
            Err(FactorError::TooFewBasicEvents { min_args: 3, .. })
        ));
        f.set_gate_weights(&[1.0, 0.0, 1.0]).unwrap();
        assert!(f.calculate().is_ok());
    }

    #[test]
    fn rejects_non_positive_ratio() {
        let mut f = ComplexityFactors::new();
        f.set_common_event_factors(0.1, 0.9, 2.0, 100.0).unwrap();
        f.set_num_factors(SizeFactors::new(2.0, 10)).unwrap();
        f.set_gate_weights(&[1.0]).unwrap();
        assert!(matches!(f.calculate(), Err(FactorError::NonPositiveRatio(_))));
    }

    #[test]
    fn constrained_gate_count() {
        let mut f = factors(100, &[1.0, 1.0]);
        assert_eq!(f.constrain_num_gate(0), Err(FactorError::TooFewGates));
        assert!(matches!(
            f.constrain_num_gate(33),
            Err(FactorError::InsufficientCapacity { .. })
        ));

        f.constrain_num_gate(100).unwrap();
        let common = *f.common().unwrap();
        assert!((common.common_b - 0.4).abs() < 1e-9);
        assert!((common.common_g - 0.4).abs() < 1e-9);
        assert!((common.parents_b - 6.0).abs() < 1e-9);
        assert_eq!(f.calculate().unwrap().num_gate(), 100);
    }

    #[test]
    fn constrained_gate_count_without_sharing_pressure() {
        let mut f = factors(100, &[1.0, 1.0]);
        f.constrain_num_gate(50).unwrap();
        let common = *f.common().unwrap();
        assert!((common.common_b - 0.1).abs() < 1e-12);
        assert!((common.parents_g - 2.0).abs() < 1e-12);
    }

    #[test]
    fn fixed_arity_operators_draw_nothing() {
        let calc = factors(10, &[1.0]).calculate().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut untouched = rng.clone();
        assert_eq!(calc.num_args(&mut rng, Operator::Not), (1, None));
        assert_eq!(calc.num_args(&mut rng, Operator::Xor), (2, None));
        assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
    }

    proptest! {
        #[test]
        fn operators_follow_weights(seed in any::<u64>()) {
            let calc = factors(10, &[1.0, 3.0, 0.0, 0.0, 0.0]).calculate().unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for _ in 0..64 {
                let op = calc.random_operator(&mut rng);
                prop_assert!(matches!(op, Operator::And | Operator::Or));
            }
        }

        #[test]
        fn sampled_arity_stays_in_bounds(
            seed in any::<u64>(),
            num_args in 2.0f64..8.0,
            weights in prop::collection::vec(0.0f64..5.0, 5),
        ) {
            prop_assume!(weights[..3].iter().sum::<f64>() > 0.1);
            let mut f = ComplexityFactors::new();
            f.set_common_event_factors(0.1, 0.1, 2.0, 2.0).unwrap();
            f.set_num_factors(SizeFactors::new(num_args, 50)).unwrap();
            f.set_gate_weights(&weights).unwrap();
            let calc = f.calculate().unwrap();
            let upper = (calc.max_args().ceil() as usize).max(3);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            for op in [Operator::And, Operator::Or, Operator::AtLeast] {
                let (n, k) = calc.num_args(&mut rng, op);
                prop_assert!(n >= op.min_args() && n <= upper);
                match k {
                    Some(k) => {
                        prop_assert_eq!(op, Operator::AtLeast);
                        prop_assert!(k >= 2 && k < n);
                    }
                    None => prop_assert_ne!(op, Operator::AtLeast),
                }
            }
        }
    }
}
