//! Gates and their Boolean operators.

use crate::event::{ArgRef, BasicEventId, Event, GateId, HouseEventId, UndefinedEventId};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Boolean connective of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// All arguments fail.
    And,
    /// Any argument fails.
    Or,
    /// At least `k_num` arguments fail.
    #[serde(rename = "atleast")]
    AtLeast,
    /// Negation of the single argument.
    Not,
    /// Exactly one of the two arguments fails.
    Xor,
}

impl Operator {
    /// All operators, in the positional order used for gate weights.
    pub const ALL: [Self; 5] = [Self::And, Self::Or, Self::AtLeast, Self::Not, Self::Xor];

    /// Returns the lowercase name of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::AtLeast => "atleast",
            Self::Not => "not",
            Self::Xor => "xor",
        }
    }

    /// Returns the position of the operator in [`Operator::ALL`].
    #[must_use]
    pub const fn position(self) -> usize {
        match self {
            Self::And => 0,
            Self::Or => 1,
            Self::AtLeast => 2,
            Self::Not => 3,
            Self::Xor => 4,
        }
    }

    /// Returns the smallest argument count the operator accepts.
    #[must_use]
    pub const fn min_args(self) -> usize {
        match self {
            Self::And | Self::Or | Self::Xor => 2,
            Self::AtLeast => 3,
            Self::Not => 1,
        }
    }

    /// Returns the fixed argument count for unary and binary connectives.
    #[must_use]
    pub const fn fixed_args(self) -> Option<usize> {
        match self {
            Self::Not => Some(1),
            Self::Xor => Some(2),
            Self::And | Self::Or | Self::AtLeast => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            "atleast" => Ok(Self::AtLeast),
            "not" => Ok(Self::Not),
            "xor" => Ok(Self::Xor),
            other => Err(format!("unknown gate operator '{other}'")),
        }
    }
}

/// Scratch state for depth-first traversals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mark {
    /// Not visited yet.
    #[default]
    Unvisited,
    /// On the current traversal path.
    InProgress,
    /// Fully processed.
    Done,
}

/// An internal node applying a Boolean operator to its arguments.
#[derive(Debug, Clone, Serialize)]
pub struct Gate {
    #[serde(flatten)]
    event: Event,
    operator: Operator,
    #[serde(skip_serializing_if = "Option::is_none")]
    k_num: Option<usize>,
    arguments: BTreeSet<ArgRef>,
    #[serde(skip)]
    mark: Cell<Mark>,
}

impl Gate {
    pub(crate) fn new(name: impl Into<String>, operator: Operator) -> Self {
        Self {
            event: Event::new(name),
            operator,
            k_num: None,
            arguments: BTreeSet::new(),
            mark: Cell::new(Mark::Unvisited),
        }
    }

    /// Returns the Boolean operator.
    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    /// Returns the vote number of an `atleast` gate.
    #[must_use]
    pub const fn k_num(&self) -> Option<usize> {
        self.k_num
    }

    /// Sets the vote number. Only meaningful for `atleast` gates.
    pub fn set_k_num(&mut self, k_num: usize) {
        self.k_num = Some(k_num);
    }

    /// Returns every argument, grouped by kind.
    #[must_use]
    pub const fn arguments(&self) -> &BTreeSet<ArgRef> {
        &self.arguments
    }

    /// Returns the total number of arguments.
    #[must_use]
    pub fn num_arguments(&self) -> usize {
        self.arguments.len()
    }

    /// Returns true if the argument is attached to this gate.
    #[must_use]
    pub fn has_argument(&self, arg: ArgRef) -> bool {
        self.arguments.contains(&arg)
    }

    /// Returns the gate arguments.
    pub fn gate_arguments(&self) -> impl Iterator<Item = GateId> + '_ {
        self.arguments.iter().filter_map(|arg| match arg {
            ArgRef::Gate(id) => Some(*id),
            _ => None,
        })
    }

    /// Returns the basic event arguments.
    pub fn basic_arguments(&self) -> impl Iterator<Item = BasicEventId> + '_ {
        self.arguments.iter().filter_map(|arg| match arg {
            ArgRef::Basic(id) => Some(*id),
            _ => None,
        })
    }

    /// Returns the house event arguments.
    pub fn house_arguments(&self) -> impl Iterator<Item = HouseEventId> + '_ {
        self.arguments.iter().filter_map(|arg| match arg {
            ArgRef::House(id) => Some(*id),
            _ => None,
        })
    }

    /// Returns the arguments of non-standard kinds.
    pub fn undefined_arguments(&self) -> impl Iterator<Item = UndefinedEventId> + '_ {
        self.arguments.iter().filter_map(|arg| match arg {
            ArgRef::Undefined(id) => Some(*id),
            _ => None,
        })
    }

    /// Returns the traversal mark.
    #[must_use]
    pub fn mark(&self) -> Mark {
        self.mark.get()
    }

    pub(crate) fn set_mark(&self, mark: Mark) {
        self.mark.set(mark);
    }

    pub(crate) fn insert_argument(&mut self, arg: ArgRef) -> bool {
        self.arguments.insert(arg)
    }

    pub(crate) fn remove_argument(&mut self, arg: ArgRef) -> bool {
        self.arguments.remove(&arg)
    }

    /// Rewrites gate ids in arguments and parents after the arena shifted.
    pub(crate) fn remap_gates(&mut self, remap: impl Fn(GateId) -> GateId) {
        self.arguments = self
            .arguments
            .iter()
            .map(|arg| match arg {
                ArgRef::Gate(id) => ArgRef::Gate(remap(*id)),
                other => *other,
            })
            .collect();
        self.event.remap_parents(remap);
    }

    pub(crate) fn event_mut(&mut self) -> &mut Event {
        &mut self.event
    }
}

impl std::ops::Deref for Gate {
    type Target = Event;

    fn deref(&self) -> &Event {
        &self.event
    }
}
