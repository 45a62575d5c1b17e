//! Event identifiers and the leaf event kinds.
//!
//! Entities live in arenas owned by [`FaultTree`](crate::FaultTree). Gates
//! reference their arguments through [`ArgRef`] and every event keeps the ids
//! of the gates that reference it, so the parent/argument cycle never turns
//! into an ownership cycle.

use crate::probability::Probability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Returns the arena index of this id.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Identifier of a gate within its fault tree.
    GateId,
    "gate"
);
arena_id!(
    /// Identifier of a basic event within its fault tree.
    BasicEventId,
    "basic"
);
arena_id!(
    /// Identifier of a house event within its fault tree.
    HouseEventId,
    "house"
);
arena_id!(
    /// Identifier of an event of a non-standard kind.
    UndefinedEventId,
    "undefined"
);

/// A gate argument, tagged by the kind of the referenced event.
///
/// The derived ordering sorts by kind first, then by creation order, which
/// keeps a gate's argument set partitioned by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgRef {
    /// A sub-gate.
    Gate(GateId),
    /// A basic event.
    Basic(BasicEventId),
    /// A house event.
    House(HouseEventId),
    /// An event of a non-standard kind.
    Undefined(UndefinedEventId),
}

impl From<GateId> for ArgRef {
    fn from(id: GateId) -> Self {
        Self::Gate(id)
    }
}

impl From<BasicEventId> for ArgRef {
    fn from(id: BasicEventId) -> Self {
        Self::Basic(id)
    }
}

impl From<HouseEventId> for ArgRef {
    fn from(id: HouseEventId) -> Self {
        Self::House(id)
    }
}

impl From<UndefinedEventId> for ArgRef {
    fn from(id: UndefinedEventId) -> Self {
        Self::Undefined(id)
    }
}

/// Name and parent links shared by every event kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    name: String,
    parents: BTreeSet<GateId>,
}

impl Event {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: BTreeSet::new(),
        }
    }

    /// Returns the unique name of the event.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the gates that reference this event.
    #[must_use]
    pub const fn parents(&self) -> &BTreeSet<GateId> {
        &self.parents
    }

    /// Returns the number of distinct parent gates.
    #[must_use]
    pub fn num_parents(&self) -> usize {
        self.parents.len()
    }

    /// Returns true if more than one gate references this event.
    #[must_use]
    pub fn is_common(&self) -> bool {
        self.parents.len() > 1
    }

    /// Returns true if no gate references this event.
    #[must_use]
    pub fn is_orphan(&self) -> bool {
        self.parents.is_empty()
    }

    /// Registers a parent. Returns false if it was already registered.
    pub(crate) fn add_parent(&mut self, gate: GateId) -> bool {
        self.parents.insert(gate)
    }

    pub(crate) fn remove_parent(&mut self, gate: GateId) -> bool {
        self.parents.remove(&gate)
    }

    /// Rewrites parent ids after the gate arena shifted.
    pub(crate) fn remap_parents(&mut self, remap: impl Fn(GateId) -> GateId) {
        self.parents = self.parents.iter().map(|id| remap(*id)).collect();
    }
}

/// A leaf event with a failure probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicEvent {
    #[serde(flatten)]
    event: Event,
    probability: Probability,
}

impl BasicEvent {
    pub(crate) fn new(name: impl Into<String>, probability: Probability) -> Self {
        Self {
            event: Event::new(name),
            probability,
        }
    }

    /// Returns the failure probability model.
    #[must_use]
    pub const fn probability(&self) -> &Probability {
        &self.probability
    }

    pub(crate) fn set_probability(&mut self, probability: Probability) {
        self.probability = probability;
    }

    pub(crate) fn event_mut(&mut self) -> &mut Event {
        &mut self.event
    }
}

impl std::ops::Deref for BasicEvent {
    type Target = Event;

    fn deref(&self) -> &Event {
        &self.event
    }
}

/// A leaf event with a fixed Boolean state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HouseEvent {
    #[serde(flatten)]
    event: Event,
    state: bool,
}

impl HouseEvent {
    pub(crate) fn new(name: impl Into<String>, state: bool) -> Self {
        Self {
            event: Event::new(name),
            state,
        }
    }

    /// Returns the fixed state of the house event.
    #[must_use]
    pub const fn state(&self) -> bool {
        self.state
    }

    pub(crate) fn event_mut(&mut self) -> &mut Event {
        &mut self.event
    }
}

impl std::ops::Deref for HouseEvent {
    type Target = Event;

    fn deref(&self) -> &Event {
        &self.event
    }
}
