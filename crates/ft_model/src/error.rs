//! Error types for fault tree model operations.

use thiserror::Error;

/// Errors raised by the fault tree container.
///
/// Every variant describes a structural violation. Generated trees never
/// produce them unless the generation algorithm itself is broken.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// An id does not refer to an entity of this tree.
    #[error("unknown {kind} id {index}")]
    UnknownId {
        /// Kind of the entity ("gate", "basic event", ...).
        kind: &'static str,
        /// Raw arena index.
        index: usize,
    },

    /// An event name is already taken.
    #[error("duplicate event name '{0}'")]
    DuplicateName(String),

    /// The argument is already attached to the gate.
    #[error("'{argument}' is already an argument of gate '{gate}'")]
    DuplicateArgument {
        /// Gate name.
        gate: String,
        /// Argument name.
        argument: String,
    },

    /// The gate is already registered as a parent of the event.
    #[error("gate '{gate}' is already a parent of '{event}'")]
    DuplicateParent {
        /// Gate name.
        gate: String,
        /// Event name.
        event: String,
    },

    /// A gate was attached to itself.
    #[error("gate '{0}' cannot be its own argument")]
    SelfReference(String),

    /// A probability value outside of its domain.
    #[error("invalid probability: {0}")]
    InvalidProbability(String),

    /// A CCF group that breaks the group invariants.
    #[error("invalid CCF group '{name}': {reason}")]
    InvalidCcfGroup {
        /// Group name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The gate graph contains a cycle through this gate.
    #[error("cycle detected at gate '{0}'")]
    Cycle(String),

    /// Some gates cannot be reached from the roots.
    #[error("{unreachable} of {total} gates are unreachable from the top gate(s)")]
    Unreachable {
        /// Number of gates not visited.
        unreachable: usize,
        /// Total number of gates.
        total: usize,
    },

    /// A single-argument gate cannot be collapsed into several parents.
    #[error("gate '{gate}' has {parents} parents and cannot be pruned")]
    MultipleParents {
        /// Gate name.
        gate: String,
        /// Number of parents.
        parents: usize,
    },

    /// The tree has no top gate.
    #[error("fault tree has no top gate")]
    NoTopGate,

    /// Structural validation failed.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for fault tree model operations.
pub type Result<T> = std::result::Result<T, Error>;
