//! The fault tree container.
//!
//! [`FaultTree`] exclusively owns every entity. Gates hold argument ids and
//! events hold parent ids; the container keeps both directions consistent.

use crate::ccf::CcfGroup;
use crate::error::{Error, Result};
use crate::event::{
    ArgRef, BasicEvent, BasicEventId, Event, GateId, HouseEvent, HouseEventId, UndefinedEventId,
};
use crate::gate::{Gate, Operator};
use crate::probability::Probability;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// Root selection of a fault tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Roots {
    /// A single top gate.
    Single(GateId),
    /// Several independent top gates.
    Multiple(Vec<GateId>),
}

/// A fault tree: gates, leaf events and CCF groups.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FaultTree {
    name: String,
    roots: Option<Roots>,
    gates: Vec<Gate>,
    basic_events: Vec<BasicEvent>,
    house_events: Vec<HouseEvent>,
    undefined_events: Vec<Event>,
    ccf_groups: Vec<CcfGroup>,
    non_ccf_events: Vec<BasicEventId>,
    #[serde(skip)]
    names: HashMap<String, ArgRef>,
}

impl FaultTree {
    /// Creates an empty fault tree.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the name of the system described by the tree.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    // ---- roots ----

    /// Sets a single top gate, replacing any previous root selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown.
    pub fn set_top_gate(&mut self, gate: GateId) -> Result<()> {
        self.check_gate(gate)?;
        self.roots = Some(Roots::Single(gate));
        Ok(())
    }

    /// Sets several top gates, replacing any previous root selection.
    ///
    /// # Errors
    ///
    /// Returns an error if any id is unknown or the list is empty.
    pub fn set_top_gates(&mut self, gates: Vec<GateId>) -> Result<()> {
        if gates.is_empty() {
            return Err(Error::NoTopGate);
        }
        for gate in &gates {
            self.check_gate(*gate)?;
        }
        self.roots = Some(Roots::Multiple(gates));
        Ok(())
    }

    /// Returns the single top gate, if the tree has exactly one root.
    #[must_use]
    pub const fn top_gate(&self) -> Option<GateId> {
        match &self.roots {
            Some(Roots::Single(gate)) => Some(*gate),
            _ => None,
        }
    }

    /// Returns all root gates regardless of how they were set.
    #[must_use]
    pub fn top_gates(&self) -> &[GateId] {
        match &self.roots {
            Some(Roots::Single(gate)) => std::slice::from_ref(gate),
            Some(Roots::Multiple(gates)) => gates,
            None => &[],
        }
    }

    /// Returns the root selection.
    #[must_use]
    pub const fn roots(&self) -> Option<&Roots> {
        self.roots.as_ref()
    }

    /// Returns true if the gate is one of the roots.
    #[must_use]
    pub fn is_top_gate(&self, gate: GateId) -> bool {
        self.top_gates().contains(&gate)
    }

    // ---- construction ----

    /// Adds a gate without arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn add_gate(&mut self, name: impl Into<String>, operator: Operator) -> Result<GateId> {
        let name = name.into();
        let id = GateId(self.gates.len());
        self.claim_name(&name, ArgRef::Gate(id))?;
        self.gates.push(Gate::new(name, operator));
        Ok(id)
    }

    /// Adds a basic event.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn add_basic_event(
        &mut self,
        name: impl Into<String>,
        probability: Probability,
    ) -> Result<BasicEventId> {
        let name = name.into();
        let id = BasicEventId(self.basic_events.len());
        self.claim_name(&name, ArgRef::Basic(id))?;
        self.basic_events.push(BasicEvent::new(name, probability));
        Ok(id)
    }

    /// Adds a house event.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn add_house_event(&mut self, name: impl Into<String>, state: bool) -> Result<HouseEventId> {
        let name = name.into();
        let id = HouseEventId(self.house_events.len());
        self.claim_name(&name, ArgRef::House(id))?;
        self.house_events.push(HouseEvent::new(name, state));
        Ok(id)
    }

    /// Adds an event of a non-standard kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn add_undefined_event(&mut self, name: impl Into<String>) -> Result<UndefinedEventId> {
        let name = name.into();
        let id = UndefinedEventId(self.undefined_events.len());
        self.claim_name(&name, ArgRef::Undefined(id))?;
        self.undefined_events.push(Event::new(name));
        Ok(id)
    }

    /// Attaches an argument to a gate and registers the gate as its parent.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is unknown, the gate would reference
    /// itself, the argument is already attached, or the parent link exists.
    pub fn add_argument(&mut self, gate: GateId, arg: impl Into<ArgRef>) -> Result<()> {
        let arg = arg.into();
        self.check_gate(gate)?;
        self.check_arg(arg)?;
        if arg == ArgRef::Gate(gate) {
            return Err(Error::SelfReference(self.gates[gate.0].name().to_string()));
        }
        if self.gates[gate.0].has_argument(arg) {
            return Err(Error::DuplicateArgument {
                gate: self.gates[gate.0].name().to_string(),
                argument: self.arg_name(arg).to_string(),
            });
        }
        if !self.event_mut(arg).add_parent(gate) {
            return Err(Error::DuplicateParent {
                gate: self.gates[gate.0].name().to_string(),
                event: self.arg_name(arg).to_string(),
            });
        }
        self.gates[gate.0].insert_argument(arg);
        Ok(())
    }

    /// Replaces the probability of a basic event.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown.
    pub fn set_probability(&mut self, event: BasicEventId, probability: Probability) -> Result<()> {
        let basic = self
            .basic_events
            .get_mut(event.0)
            .ok_or(Error::UnknownId {
                kind: "basic event",
                index: event.0,
            })?;
        basic.set_probability(probability);
        Ok(())
    }

    /// Registers a CCF group.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken, a member is unknown, or a
    /// member already belongs to another group.
    pub fn add_ccf_group(&mut self, group: CcfGroup) -> Result<()> {
        if self.ccf_groups.iter().any(|g| g.name() == group.name()) {
            return Err(Error::DuplicateName(group.name().to_string()));
        }
        for member in group.members() {
            if member.0 >= self.basic_events.len() {
                return Err(Error::UnknownId {
                    kind: "basic event",
                    index: member.0,
                });
            }
            if let Some(owner) = self.ccf_group_of(*member) {
                return Err(Error::InvalidCcfGroup {
                    name: group.name().to_string(),
                    reason: format!(
                        "'{}' already belongs to '{}'",
                        self.basic_events[member.0].name(),
                        owner.name()
                    ),
                });
            }
        }
        self.ccf_groups.push(group);
        Ok(())
    }

    /// Records the basic events not claimed by any CCF group.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is unknown or belongs to a CCF group.
    pub fn set_non_ccf_events(&mut self, events: Vec<BasicEventId>) -> Result<()> {
        for event in &events {
            if event.0 >= self.basic_events.len() {
                return Err(Error::UnknownId {
                    kind: "basic event",
                    index: event.0,
                });
            }
            if let Some(owner) = self.ccf_group_of(*event) {
                return Err(Error::Validation(format!(
                    "'{}' is claimed by CCF group '{}'",
                    self.basic_events[event.0].name(),
                    owner.name()
                )));
            }
        }
        self.non_ccf_events = events;
        Ok(())
    }

    // ---- restructuring ----

    /// Collapses a gate with a single argument into its only parent.
    ///
    /// The argument moves up to the parent, the gate leaves the tree, and
    /// the moved argument is collapsed in turn when it is itself a gate with
    /// one argument and one parent. Roots, gates with several arguments and
    /// gates without a parent are left alone.
    ///
    /// Gate ids above the removed gate shift down by one, so ids held by the
    /// caller are stale afterwards; look gates up again by name.
    ///
    /// Returns true if the gate was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or the single-argument gate
    /// has more than one parent.
    pub fn prune(&mut self, gate: GateId) -> Result<bool> {
        self.check_gate(gate)?;
        let node = &self.gates[gate.0];
        if node.num_arguments() != 1 || self.is_top_gate(gate) {
            return Ok(false);
        }
        let parents: Vec<GateId> = node.parents().iter().copied().collect();
        let parent = match parents.as_slice() {
            [] => return Ok(false),
            [parent] => *parent,
            _ => {
                return Err(Error::MultipleParents {
                    gate: node.name().to_string(),
                    parents: parents.len(),
                })
            }
        };
        let Some(&child) = node.arguments().iter().next() else {
            return Ok(false);
        };

        self.gates[parent.0].remove_argument(ArgRef::Gate(gate));
        self.event_mut(child).remove_parent(gate);
        if self.gates[parent.0].insert_argument(child) {
            self.event_mut(child).add_parent(parent);
        }
        self.remove_gate(gate);

        if let ArgRef::Gate(child) = child {
            let child = shifted(child, gate);
            if self.gates[child.0].num_parents() == 1 {
                self.prune(child)?;
            }
        }
        Ok(true)
    }

    // ---- access ----

    /// Returns all gates in creation order.
    #[must_use]
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Returns the ids of all gates in creation order.
    pub fn gate_ids(&self) -> impl Iterator<Item = GateId> + '_ {
        (0..self.gates.len()).map(GateId)
    }

    /// Returns all basic events in creation order.
    #[must_use]
    pub fn basic_events(&self) -> &[BasicEvent] {
        &self.basic_events
    }

    /// Returns the ids of all basic events in creation order.
    pub fn basic_event_ids(&self) -> impl Iterator<Item = BasicEventId> + '_ {
        (0..self.basic_events.len()).map(BasicEventId)
    }

    /// Returns all house events in creation order.
    #[must_use]
    pub fn house_events(&self) -> &[HouseEvent] {
        &self.house_events
    }

    /// Returns all events of non-standard kinds.
    #[must_use]
    pub fn undefined_events(&self) -> &[Event] {
        &self.undefined_events
    }

    /// Returns all CCF groups in creation order.
    #[must_use]
    pub fn ccf_groups(&self) -> &[CcfGroup] {
        &self.ccf_groups
    }

    /// Returns the basic events not claimed by any CCF group.
    #[must_use]
    pub fn non_ccf_events(&self) -> &[BasicEventId] {
        &self.non_ccf_events
    }

    /// Returns a gate.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this tree.
    #[must_use]
    pub fn gate(&self, id: GateId) -> &Gate {
        &self.gates[id.0]
    }

    /// Returns a gate, or `None` for a foreign id.
    #[must_use]
    pub fn get_gate(&self, id: GateId) -> Option<&Gate> {
        self.gates.get(id.0)
    }

    /// Returns a gate for in-place updates such as setting `k_num`.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this tree.
    pub fn gate_mut(&mut self, id: GateId) -> &mut Gate {
        &mut self.gates[id.0]
    }

    /// Returns a basic event.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this tree.
    #[must_use]
    pub fn basic_event(&self, id: BasicEventId) -> &BasicEvent {
        &self.basic_events[id.0]
    }

    /// Returns a house event.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this tree.
    #[must_use]
    pub fn house_event(&self, id: HouseEventId) -> &HouseEvent {
        &self.house_events[id.0]
    }

    /// Returns the shared event data behind an argument reference.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this tree.
    #[must_use]
    pub fn event(&self, arg: ArgRef) -> &Event {
        match arg {
            ArgRef::Gate(id) => &self.gates[id.0],
            ArgRef::Basic(id) => &self.basic_events[id.0],
            ArgRef::House(id) => &self.house_events[id.0],
            ArgRef::Undefined(id) => &self.undefined_events[id.0],
        }
    }

    /// Returns the name of the referenced event.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this tree.
    #[must_use]
    pub fn arg_name(&self, arg: ArgRef) -> &str {
        self.event(arg).name()
    }

    /// Looks up an event by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ArgRef> {
        self.names.get(name).copied()
    }

    /// Returns the CCF group a basic event belongs to.
    #[must_use]
    pub fn ccf_group_of(&self, event: BasicEventId) -> Option<&CcfGroup> {
        self.ccf_groups
            .iter()
            .find(|group| group.members().contains(&event))
    }

    /// Collects the gate and every gate above it, walking parent links
    /// breadth-first.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this tree.
    #[must_use]
    pub fn ancestors(&self, gate: GateId) -> HashSet<GateId> {
        let mut ancestors = HashSet::from([gate]);
        let mut pending: VecDeque<GateId> = self.gates[gate.0].parents().iter().copied().collect();
        while let Some(parent) = pending.pop_front() {
            if ancestors.insert(parent) {
                pending.extend(self.gates[parent.0].parents().iter().copied());
            }
        }
        ancestors
    }

    // ---- internals ----

    fn claim_name(&mut self, name: &str, arg: ArgRef) -> Result<()> {
        if self.names.contains_key(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        self.names.insert(name.to_string(), arg);
        Ok(())
    }

    fn check_gate(&self, gate: GateId) -> Result<()> {
        if gate.0 < self.gates.len() {
            Ok(())
        } else {
            Err(Error::UnknownId {
                kind: "gate",
                index: gate.0,
            })
        }
    }

    fn check_arg(&self, arg: ArgRef) -> Result<()> {
        let (kind, index, len) = match arg {
            ArgRef::Gate(id) => ("gate", id.0, self.gates.len()),
            ArgRef::Basic(id) => ("basic event", id.0, self.basic_events.len()),
            ArgRef::House(id) => ("house event", id.0, self.house_events.len()),
            ArgRef::Undefined(id) => ("undefined event", id.0, self.undefined_events.len()),
        };
        if index < len {
            Ok(())
        } else {
            Err(Error::UnknownId { kind, index })
        }
    }

    /// Drops a detached gate from the arena and shifts every later gate id.
    fn remove_gate(&mut self, gate: GateId) {
        let removed = self.gates.remove(gate.0);
        self.names.remove(removed.name());
        let shift = |id: GateId| shifted(id, gate);
        for node in &mut self.gates {
            node.remap_gates(shift);
        }
        for basic in &mut self.basic_events {
            basic.event_mut().remap_parents(shift);
        }
        for house in &mut self.house_events {
            house.event_mut().remap_parents(shift);
        }
        for event in &mut self.undefined_events {
            event.remap_parents(shift);
        }
        match &mut self.roots {
            Some(Roots::Single(top)) => *top = shift(*top),
            Some(Roots::Multiple(tops)) => {
                for top in tops {
                    *top = shift(*top);
                }
            }
            None => {}
        }
        for arg in self.names.values_mut() {
            if let ArgRef::Gate(id) = arg {
                *id = shift(*id);
            }
        }
    }

    fn event_mut(&mut self, arg: ArgRef) -> &mut Event {
        match arg {
            ArgRef::Gate(id) => self.gates[id.0].event_mut(),
            ArgRef::Basic(id) => self.basic_events[id.0].event_mut(),
            ArgRef::House(id) => self.house_events[id.0].event_mut(),
            ArgRef::Undefined(id) => &mut self.undefined_events[id.0],
        }
    }
}

/// Id of `id` once the gate at `removed` has left the arena.
const fn shifted(id: GateId, removed: GateId) -> GateId {
    if id.0 > removed.0 {
        GateId(id.0 - 1)
    } else {
        id
    }
}
