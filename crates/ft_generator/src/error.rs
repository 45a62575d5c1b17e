//! Error types for fault tree generation.

use std::time::Duration;
use thiserror::Error;

/// Invalid or contradictory generation factors.
///
/// Raised by the [`ComplexityFactors`](crate::ComplexityFactors) setters and
/// by `calculate()`. Values are never clamped to make them fit.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FactorError {
    /// A probability bound outside `[0, 1]`.
    #[error("{which} probability {value} is not in [0, 1]")]
    ProbabilityRange {
        /// "min" or "max".
        which: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The lower probability bound exceeds the upper one.
    #[error("min probability {min} > max probability {max}")]
    ProbabilityOrder {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// A common-node fraction outside `(0, 0.9]`.
    #[error("{which} {value} is not in (0, 0.9]")]
    CommonRange {
        /// "common_b" or "common_g".
        which: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An average parent count outside `[2, 100]`.
    #[error("{which} {value} is not in [2, 100]")]
    ParentsRange {
        /// "parents_b" or "parents_g".
        which: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Average gate arity below two.
    #[error("avg. # of gate arguments can't be less than 2, got {0}")]
    TooFewArguments(f64),

    /// No basic events requested.
    #[error("# of basic events must be more than 0")]
    NoBasicEvents,

    /// At least as many house events as basic events.
    #[error("too many house events: {num_house} >= {num_basic} basic events")]
    TooManyHouseEvents {
        /// Requested house events.
        num_house: usize,
        /// Requested basic events.
        num_basic: usize,
    },

    /// More CCF groups than `num_basic / num_args`.
    #[error("too many CCF groups: {num_ccf} > {limit}")]
    TooManyCcfGroups {
        /// Requested groups.
        num_ccf: usize,
        /// `num_basic / num_args`.
        limit: f64,
    },

    /// CCF groups requested with a maximum size below two.
    #[error("CCF group size must be at least 2, got {0}")]
    CcfSizeTooSmall(usize),

    /// Empty weight list.
    #[error("no gate weights are provided")]
    NoWeights,

    /// A negative gate weight.
    #[error("gate weights cannot be negative, got {0}")]
    NegativeWeight(f64),

    /// More weights than operators.
    #[error("too many gate weights: {0} > 5")]
    TooManyWeights(usize),

    /// Every weight is zero.
    #[error("at least one non-zero gate weight is needed")]
    ZeroWeights,

    /// Only NOT and XOR gates have weight.
    #[error("cannot work with only XOR or NOT gates")]
    OnlyUnaryOrBinary,

    /// A constrained gate count below one.
    #[error("# of gates can't be less than 1")]
    TooFewGates,

    /// Not enough gate capacity to place every basic event.
    #[error(
        "not enough gates and avg. # of args to achieve the # of basic events: \
         {num_gate} * {num_args} <= {num_basic}"
    )]
    InsufficientCapacity {
        /// Constrained gate count.
        num_gate: usize,
        /// Average gate arity.
        num_args: f64,
        /// Requested basic events.
        num_basic: usize,
    },

    /// Fewer basic events than the smallest arity among the weighted gates,
    /// so no gate can be built from basic events alone.
    #[error(
        "{num_basic} basic event(s) cannot fill a gate; \
         the weighted operators need at least {min_args} arguments"
    )]
    TooFewBasicEvents {
        /// Requested basic events.
        num_basic: usize,
        /// Smallest arity among operators with weight.
        min_args: usize,
    },

    /// The derived basic-to-gate ratio is not positive.
    #[error("derived basic-to-gate ratio {0} is not positive; raise num_args or lower common_g")]
    NonPositiveRatio(f64),

    /// A setter was not called before it was needed.
    #[error("{0} factors are not set")]
    Missing(&'static str),
}

/// Errors that can occur while generating fault trees.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid generation factors.
    #[error("error in complexity factors: {0}")]
    Factor(#[from] FactorError),

    /// The wall-clock budget ran out before the tree was complete.
    #[error("generation timed out after {elapsed:?}")]
    Timeout {
        /// Time spent before giving up.
        elapsed: Duration,
    },

    /// Generation was cancelled through the shared flag.
    #[error("generation cancelled")]
    Cancelled,

    /// Every gate that may hold house events is the top gate, a NOT or an
    /// XOR gate. Another seed usually draws a usable tree.
    #[error("no gate besides the top gate can hold {num_house} house event(s)")]
    NoHouseEventHost {
        /// Requested house events.
        num_house: usize,
    },

    /// The builder broke one of its own invariants.
    #[error("generator invariant violated: {0}")]
    Invariant(String),

    /// The model rejected an operation issued by the builder.
    #[error("model error: {0}")]
    Model(#[from] ft_model::Error),
}

impl Error {
    /// Returns true for conditions the caller may fix or retry.
    ///
    /// Invariant and model errors point at a generator bug and are never
    /// worth retrying.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Factor(_)
                | Self::Timeout { .. }
                | Self::Cancelled
                | Self::NoHouseEventHost { .. }
        )
    }
}

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, Error>;
