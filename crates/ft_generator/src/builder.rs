//! Breadth-first construction of a generated fault tree.
//!
//! The builder owns a single seeded RNG stream. Every random decision is
//! made in a fixed order (top operator, pool construction, then per gate the
//! arity followed by one percent/common draw pair per argument attempt), so
//! the same factors and seed always produce the same tree.

use crate::ccf::generate_ccf_groups;
use crate::deadline::Deadline;
use crate::error::{Error, Result};
use crate::factors::CalculatedFactors;
use ft_model::{ArgRef, BasicEventId, FaultTree, GateId, HouseEventId, Operator, Probability};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Options of a single build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Name of the system described by the tree.
    pub name: String,
    /// Name of the top gate.
    pub top_gate_name: String,
    /// Seed of the build's RNG stream.
    pub seed: u64,
    /// Wall-clock budget of the build.
    pub timeout: Option<Duration>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            name: "Autogenerated".to_string(),
            top_gate_name: "root".to_string(),
            seed: 123,
            timeout: None,
        }
    }
}

impl BuildOptions {
    /// Sets the system name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the top gate name.
    #[must_use]
    pub fn with_top_gate_name(mut self, name: impl Into<String>) -> Self {
        self.top_gate_name = name.into();
        self
    }

    /// Sets the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the wall-clock budget.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Generates one fault tree.
///
/// # Errors
///
/// Returns [`Error::Timeout`] if the budget in `options` runs out,
/// [`Error::NoHouseEventHost`] if house events are requested but every gate
/// below the top one is NOT or XOR, and [`Error::Invariant`] or
/// [`Error::Model`] if construction breaks an invariant.
pub fn generate(factors: &CalculatedFactors, options: &BuildOptions) -> Result<FaultTree> {
    GenerativeFaultTree::new(factors, options)
        .with_deadline(Deadline::new(options.timeout))
        .build()
}

/// Grows one fault tree from calculated factors.
///
/// A builder is consumed by [`GenerativeFaultTree::build`]; a failed build
/// leaves nothing to resume.
pub struct GenerativeFaultTree<'a> {
    factors: &'a CalculatedFactors,
    rng: ChaCha8Rng,
    tree: FaultTree,
    deadline: Deadline,
    top_gate_name: String,
    common_basic: Vec<BasicEventId>,
    common_gate: Vec<GateId>,
    queue: VecDeque<GateId>,
}

impl<'a> GenerativeFaultTree<'a> {
    /// Prepares a build without a deadline.
    pub fn new(factors: &'a CalculatedFactors, options: &BuildOptions) -> Self {
        Self {
            factors,
            rng: ChaCha8Rng::seed_from_u64(options.seed),
            tree: FaultTree::new(options.name.clone()),
            deadline: Deadline::unbounded(),
            top_gate_name: options.top_gate_name.clone(),
            common_basic: Vec::new(),
            common_gate: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    /// Replaces the deadline checked between expansion steps.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    /// Runs the whole construction.
    ///
    /// # Errors
    ///
    /// See [`generate`].
    pub fn build(mut self) -> Result<FaultTree> {
        self.deadline.check()?;
        let top = self.construct_top_gate()?;

        let num_gate = self.factors.num_gate();
        let num_basic = self.factors.size().num_basic;
        let num_common_basic = self.factors.num_common_basic(num_gate).min(num_basic);
        let num_common_gate = self.factors.num_common_gate(num_gate);
        debug!(num_gate, num_common_basic, num_common_gate, "estimated pools");
        for _ in 0..num_common_basic {
            let id = self.construct_basic_event()?;
            self.common_basic.push(id);
        }
        for _ in 0..num_common_gate {
            let id = self.construct_gate()?;
            self.common_gate.push(id);
        }

        self.queue.push_back(top);
        loop {
            while let Some(gate) = self.queue.pop_front() {
                self.deadline.check()?;
                self.init_gate(gate)?;
            }
            if !self.correct_for_exhaustion()? {
                break;
            }
        }
        self.check_connected(top)?;

        self.deadline.check()?;
        self.distribute_house_events(top)?;
        self.deadline.check()?;
        generate_ccf_groups(&mut self.tree, self.factors, &mut self.rng)?;

        let size = self.tree.size_summary();
        info!(
            name = self.tree.name(),
            gates = size.total_gates,
            basic_events = size.basic_events,
            house_events = size.house_events,
            ccf_groups = size.ccf_groups,
            elapsed_ms = self.deadline.elapsed().as_millis(),
            "generated fault tree"
        );
        Ok(self.tree)
    }

    /// Constructs the root with an operator other than NOT and XOR.
    ///
    /// Weights validation guarantees AND, OR or K/N carries weight, so the
    /// resampling terminates.
    fn construct_top_gate(&mut self) -> Result<GateId> {
        let mut operator = self.factors.random_operator(&mut self.rng);
        while matches!(operator, Operator::Not | Operator::Xor) {
            operator = self.factors.random_operator(&mut self.rng);
        }
        let top = self.tree.add_gate(self.top_gate_name.clone(), operator)?;
        self.tree.set_top_gate(top)?;
        Ok(top)
    }

    fn construct_gate(&mut self) -> Result<GateId> {
        let operator = self.factors.random_operator(&mut self.rng);
        let name = format!("G{}", self.tree.gates().len() + 1);
        Ok(self.tree.add_gate(name, operator)?)
    }

    fn construct_basic_event(&mut self) -> Result<BasicEventId> {
        let value = self
            .rng
            .gen_range(self.factors.min_prob()..=self.factors.max_prob());
        let name = format!("B{}", self.tree.basic_events().len() + 1);
        Ok(self.tree.add_basic_event(name, Probability::point(value)?)?)
    }

    fn construct_house_event(&mut self) -> Result<HouseEventId> {
        let state = self.rng.gen_bool(0.5);
        let name = format!("H{}", self.tree.house_events().len() + 1);
        Ok(self.tree.add_house_event(name, state)?)
    }

    fn basic_quota_met(&self) -> bool {
        self.tree.basic_events().len() >= self.factors.size().num_basic
    }

    /// Fills one gate with its sampled number of arguments.
    ///
    /// Once every basic event exists the gate only reuses nodes. It stops
    /// short of the sampled arity when nothing reusable is left and its
    /// operator's minimum is met; below the minimum it takes any gate
    /// outside its ancestry, or a new one.
    fn init_gate(&mut self, gate: GateId) -> Result<()> {
        let operator = self.tree.gate(gate).operator();
        let (num_args, k_num) = self.factors.num_args(&mut self.rng, operator);

        let common = *self.factors.common();
        let percent_gate = self.factors.percent_gate();
        let mut ancestors: Option<HashSet<GateId>> = None;

        while self.tree.gate(gate).num_arguments() < num_args {
            let s_percent: f64 = self.rng.gen();
            let s_common: f64 = self.rng.gen();

            if self.basic_quota_met() {
                let ancestors = ancestors.get_or_insert_with(|| self.tree.ancestors(gate));
                if !self.reuse_argument(gate, s_percent < percent_gate, ancestors)? {
                    if self.tree.gate(gate).num_arguments() >= operator.min_args() {
                        debug!(
                            gate = self.tree.gate(gate).name(),
                            sampled = num_args,
                            "nothing left to reuse, gate closed early"
                        );
                        break;
                    }
                    self.attach_filler_gate(gate, ancestors)?;
                }
            } else if s_percent < percent_gate {
                if s_common < common.common_g {
                    let ancestors = ancestors.get_or_insert_with(|| self.tree.ancestors(gate));
                    if let Some(candidate) = self.pick_common_gate(gate, ancestors) {
                        self.attach_gate(gate, candidate)?;
                    }
                } else {
                    let new_gate = self.construct_gate()?;
                    self.attach_gate(gate, new_gate)?;
                }
            } else {
                let basic = self.choose_basic_event(gate, s_common)?;
                self.tree.add_argument(gate, basic)?;
            }
        }

        if let Some(k) = k_num {
            // The vote number must stay below the final arity.
            let n = self.tree.gate(gate).num_arguments();
            self.tree.gate_mut(gate).set_k_num(k.min(n - 1));
        }
        Ok(())
    }

    /// Attaches `child` under `gate`, queueing it if it had no parent yet.
    fn attach_gate(&mut self, gate: GateId, child: GateId) -> Result<()> {
        let orphan = self.tree.gate(child).is_orphan();
        self.tree.add_argument(gate, child)?;
        if orphan {
            self.queue.push_back(child);
        }
        Ok(())
    }

    /// Attaches an existing node to `gate`: a common gate or a basic event,
    /// trying the preferred kind first. Returns false if neither is left.
    fn reuse_argument(
        &mut self,
        gate: GateId,
        prefer_gate: bool,
        ancestors: &HashSet<GateId>,
    ) -> Result<bool> {
        for want_gate in [prefer_gate, !prefer_gate] {
            if want_gate {
                if let Some(candidate) = self.pick_common_gate(gate, ancestors) {
                    self.attach_gate(gate, candidate)?;
                    return Ok(true);
                }
            } else {
                let pool: Vec<BasicEventId> = self.tree.basic_event_ids().collect();
                if let Some(basic) = self.pick_basic_event(gate, pool) {
                    self.tree.add_argument(gate, basic)?;
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Gives `gate` another argument when no common gate or basic event
    /// fits: any gate outside its ancestry, otherwise a new gate.
    fn attach_filler_gate(&mut self, gate: GateId, ancestors: &HashSet<GateId>) -> Result<()> {
        let parent = self.tree.gate(gate);
        let candidates: Vec<GateId> = self
            .tree
            .gate_ids()
            .filter(|id| !ancestors.contains(id) && !parent.has_argument(ArgRef::Gate(*id)))
            .collect();
        let child = if let Some(id) = candidates.choose(&mut self.rng) {
            *id
        } else {
            self.construct_gate()?
        };
        self.attach_gate(gate, child)
    }

    /// Picks a common gate that can become an argument of `gate` without
    /// duplication or a cycle.
    ///
    /// Orphans are tried first, then single-parent gates, then the rest.
    /// Each tier is shuffled only when the earlier tiers are exhausted.
    fn pick_common_gate(&mut self, gate: GateId, ancestors: &HashSet<GateId>) -> Option<GateId> {
        let tiers: [fn(usize) -> bool; 3] = [|p| p == 0, |p| p == 1, |p| p > 1];
        for in_tier in tiers {
            let mut candidates: Vec<GateId> = self
                .common_gate
                .iter()
                .copied()
                .filter(|id| in_tier(self.tree.gate(*id).num_parents()))
                .collect();
            candidates.shuffle(&mut self.rng);
            let parent = self.tree.gate(gate);
            if let Some(found) = candidates.into_iter().find(|id| {
                *id != gate && !parent.has_argument(ArgRef::Gate(*id)) && !ancestors.contains(id)
            }) {
                return Some(found);
            }
        }
        None
    }

    /// Returns a basic event for `gate` while the quota is open: a new one
    /// unless the reuse draw picks an unattached common basic event.
    fn choose_basic_event(&mut self, gate: GateId, s_common: f64) -> Result<BasicEventId> {
        if s_common < self.factors.common().common_b {
            let pool = self.common_basic.clone();
            if let Some(chosen) = self.pick_basic_event(gate, pool) {
                return Ok(chosen);
            }
        }
        self.construct_basic_event()
    }

    /// Picks a basic event from `pool` not yet attached to `gate`,
    /// preferring events with fewer parents.
    fn pick_basic_event(&mut self, gate: GateId, pool: Vec<BasicEventId>) -> Option<BasicEventId> {
        let parent = self.tree.gate(gate);
        let available: Vec<BasicEventId> = pool
            .into_iter()
            .filter(|id| !parent.has_argument(ArgRef::Basic(*id)))
            .collect();
        let parents_of = |id: &BasicEventId| self.tree.basic_event(*id).num_parents();
        let orphans: Vec<BasicEventId> =
            available.iter().copied().filter(|id| parents_of(id) == 0).collect();
        let single: Vec<BasicEventId> =
            available.iter().copied().filter(|id| parents_of(id) == 1).collect();
        let tier = if !orphans.is_empty() {
            orphans
        } else if !single.is_empty() {
            single
        } else {
            available
        };
        tier.choose(&mut self.rng).copied()
    }

    /// Keeps construction going once the queue drains.
    ///
    /// While basic events are missing, attaches a new gate under a random
    /// extensible gate. Afterwards, attaches leftover orphans from the common
    /// pools to random connected gates. Returns true if the queue was
    /// refilled.
    fn correct_for_exhaustion(&mut self) -> Result<bool> {
        if !self.basic_quota_met() {
            let pool: HashSet<GateId> = self.common_gate.iter().copied().collect();
            let hosts: Vec<GateId> = self
                .tree
                .gate_ids()
                .filter(|id| extensible(self.tree.gate(*id).operator()) && !pool.contains(id))
                .collect();
            let Some(host) = hosts.choose(&mut self.rng).copied() else {
                return Err(Error::Invariant(
                    "queue exhausted with no gate left to extend".to_string(),
                ));
            };
            let new_gate = self.construct_gate()?;
            self.tree.add_argument(host, new_gate)?;
            self.queue.push_back(new_gate);
            return Ok(true);
        }

        let orphan_gates: Vec<GateId> = self
            .common_gate
            .iter()
            .copied()
            .filter(|id| self.tree.gate(*id).is_orphan())
            .collect();
        if !orphan_gates.is_empty() {
            for orphan in orphan_gates {
                let host = self.connected_host(|tree, id| {
                    id != orphan && !tree.gate(id).has_argument(orphan.into())
                })?;
                self.tree.add_argument(host, orphan)?;
                self.queue.push_back(orphan);
            }
            debug!(queued = self.queue.len(), "attached orphan common gates");
            return Ok(true);
        }

        let orphan_basic: Vec<BasicEventId> = self
            .common_basic
            .iter()
            .copied()
            .filter(|id| self.tree.basic_event(*id).is_orphan())
            .collect();
        for orphan in orphan_basic {
            let host = self.connected_host(|tree, id| !tree.gate(id).has_argument(orphan.into()))?;
            self.tree.add_argument(host, orphan)?;
        }
        Ok(false)
    }

    /// Chooses a random extensible gate already connected to the top gate.
    fn connected_host(&mut self, accept: impl Fn(&FaultTree, GateId) -> bool) -> Result<GateId> {
        let top = self.tree.top_gate();
        let hosts: Vec<GateId> = self
            .tree
            .gate_ids()
            .filter(|id| {
                let gate = self.tree.gate(*id);
                (Some(*id) == top || !gate.is_orphan())
                    && extensible(gate.operator())
                    && accept(&self.tree, *id)
            })
            .collect();
        hosts
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| {
                Error::Invariant("no connected gate can take another argument".to_string())
            })
    }

    fn check_connected(&self, top: GateId) -> Result<()> {
        if let Some(orphan) = self.tree.basic_events().iter().find(|e| e.is_orphan()) {
            return Err(Error::Invariant(format!(
                "basic event '{}' has no parent after construction",
                orphan.name()
            )));
        }
        if let Some(orphan) = self
            .tree
            .gate_ids()
            .find(|id| *id != top && self.tree.gate(*id).is_orphan())
        {
            return Err(Error::Invariant(format!(
                "gate '{}' has no parent after construction",
                self.tree.gate(orphan).name()
            )));
        }
        Ok(())
    }

    /// Attaches each house event to a random gate other than the top gate,
    /// NOT and XOR gates.
    fn distribute_house_events(&mut self, top: GateId) -> Result<()> {
        let num_house = self.factors.size().num_house;
        if num_house == 0 {
            return Ok(());
        }
        let hosts: Vec<GateId> = self
            .tree
            .gate_ids()
            .filter(|id| *id != top && extensible(self.tree.gate(*id).operator()))
            .collect();
        if hosts.is_empty() {
            warn!(
                name = self.tree.name(),
                gates = self.tree.gates().len(),
                "only the top gate and fixed-arity gates were drawn"
            );
            return Err(Error::NoHouseEventHost { num_house });
        }
        for _ in 0..num_house {
            let host = hosts[self.rng.gen_range(0..hosts.len())];
            let house = self.construct_house_event()?;
            self.tree.add_argument(host, house)?;
        }
        Ok(())
    }
}

/// True for operators whose arity can grow after initialization.
const fn extensible(operator: Operator) -> bool {
    !matches!(operator, Operator::Not | Operator::Xor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FactorError;
    use crate::factors::{ComplexityFactors, SizeFactors};
    use ft_model::CcfModel;
    use proptest::prelude::*;

    fn try_factors(
        size: SizeFactors,
        weights: &[f64],
        common: f64,
    ) -> std::result::Result<CalculatedFactors, FactorError> {
        let mut f = ComplexityFactors::new();
        f.set_min_max_prob(1e-5, 1e-3)?;
        f.set_common_event_factors(common, common, 2.0, 2.0)?;
        f.set_num_factors(size)?;
        f.set_gate_weights(weights)?;
        f.calculate()
    }

    fn factors(size: SizeFactors, weights: &[f64], common: f64) -> CalculatedFactors {
        try_factors(size, weights, common).unwrap()
    }

    fn assert_well_formed(tree: &FaultTree, num_basic: usize) {
        let top = tree.top_gate().unwrap();
        assert!(tree.gate(top).is_orphan());
        assert_eq!(tree.basic_events().len(), num_basic);
        assert!(tree.basic_events().iter().all(|e| !e.is_orphan()));
        assert!(tree.house_events().iter().all(|e| !e.is_orphan()));
        assert!(tree
            .gate_ids()
            .all(|id| id == top || !tree.gate(id).is_orphan()));
        tree.validate().unwrap();
    }

    #[test]
    fn small_tree_scenario() {
        let calc = factors(SizeFactors::new(3.0, 10), &[1.0, 3.0, 0.0, 0.0, 0.0], 0.1);
        let options = BuildOptions::default().with_seed(42);
        let tree = generate(&calc, &options).unwrap();

        assert_well_formed(&tree, 10);
        assert!(tree.house_events().is_empty());
        assert!(tree.ccf_groups().is_empty());
        let top = tree.top_gate().unwrap();
        assert_eq!(tree.gate(top).name(), "root");
        assert!(matches!(tree.gate(top).operator(), Operator::And | Operator::Or));

        let order = tree.topological_order().unwrap();
        assert_eq!(order.len(), tree.gates().len());
        let unique: HashSet<_> = order.iter().collect();
        assert_eq!(unique.len(), order.len());
    }

    #[test]
    fn ccf_scenario() {
        let size = SizeFactors::new(3.0, 9).with_ccf(2, CcfModel::AlphaFactor, 3);
        let calc = factors(size, &[1.0, 3.0], 0.1);
        let tree = generate(&calc, &BuildOptions::default().with_seed(7)).unwrap();

        assert_eq!(tree.ccf_groups().len(), 2);
        let mut claimed = HashSet::new();
        for group in tree.ccf_groups() {
            assert!((2..=3).contains(&group.members().len()));
            assert!((group.factors().iter().sum::<f64>() - 1.0).abs() < 1e-9);
            for member in group.members() {
                assert!(claimed.insert(*member));
            }
        }
        let expected: HashSet<_> = tree
            .basic_event_ids()
            .filter(|id| !claimed.contains(id))
            .collect();
        let actual: HashSet<_> = tree.non_ccf_events().iter().copied().collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn generated_names_follow_creation_order() {
        let calc = factors(SizeFactors::new(3.0, 20), &[1.0, 1.0], 0.2);
        let tree = generate(&calc, &BuildOptions::default().with_seed(3)).unwrap();
        assert_eq!(tree.gates()[0].name(), "root");
        for (i, gate) in tree.gates().iter().enumerate().skip(1) {
            assert_eq!(gate.name(), format!("G{}", i + 1));
        }
        for (i, event) in tree.basic_events().iter().enumerate() {
            assert_eq!(event.name(), format!("B{}", i + 1));
            let p = event.probability().central_value();
            assert!((1e-5..=1e-3).contains(&p));
        }
    }

    #[test]
    fn house_events_avoid_top_and_fixed_arity_gates() {
        let size = SizeFactors::new(3.0, 40).with_house(6);
        let calc = factors(size, &[1.0, 1.0, 1.0, 0.5, 0.5], 0.1);
        let tree = generate(&calc, &BuildOptions::default().with_seed(11)).unwrap();
        assert_eq!(tree.house_events().len(), 6);
        let top = tree.top_gate().unwrap();
        for house in tree.house_events() {
            for parent in house.parents() {
                assert_ne!(*parent, top);
                assert!(extensible(tree.gate(*parent).operator()));
            }
        }
    }

    #[test]
    fn same_seed_same_tree() {
        let size = SizeFactors::new(3.5, 60).with_house(3);
        let calc = factors(size, &[1.0, 2.0, 1.0, 0.2, 0.2], 0.3);
        let options = BuildOptions::default().with_seed(99);
        let a = generate(&calc, &options).unwrap();
        let b = generate(&calc, &options).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.to_formula_text().unwrap(), b.to_formula_text().unwrap());

        let c = generate(&calc, &options.clone().with_seed(100)).unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn cancelled_build_returns_nothing() {
        let calc = factors(SizeFactors::new(3.0, 50), &[1.0, 1.0], 0.1);
        let flag = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
        let result = GenerativeFaultTree::new(&calc, &BuildOptions::default())
            .with_deadline(Deadline::unbounded().with_cancel_flag(flag))
            .build();
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn constrained_gate_count_builds() {
        let mut f = ComplexityFactors::new();
        f.set_min_max_prob(1e-5, 1e-3).unwrap();
        f.set_common_event_factors(0.1, 0.1, 2.0, 2.0).unwrap();
        f.set_num_factors(SizeFactors::new(3.0, 60)).unwrap();
        f.set_gate_weights(&[1.0, 1.0]).unwrap();
        f.constrain_num_gate(40).unwrap();
        let calc = f.calculate().unwrap();
        let tree = generate(&calc, &BuildOptions::default().with_seed(5)).unwrap();
        assert_well_formed(&tree, 60);
    }

    #[test]
    fn common_nodes_are_shared() {
        let calc = factors(SizeFactors::new(3.0, 200), &[1.0, 1.0], 0.4);
        let tree = generate(&calc, &BuildOptions::default().with_seed(8)).unwrap();
        assert!(tree.basic_events().iter().any(|e| e.is_common()));
        assert!(tree.complexity_summary().common_basic_events > 0);
    }

    #[test]
    fn few_basic_events_are_not_exceeded() {
        for (num_args, num_basic) in [(2.0, 2), (3.0, 2), (4.0, 3), (3.0, 3), (5.0, 4)] {
            let calc = factors(SizeFactors::new(num_args, num_basic), &[1.0, 1.0], 0.1);
            for seed in 0..50 {
                let tree = generate(&calc, &BuildOptions::default().with_seed(seed)).unwrap();
                assert_well_formed(&tree, num_basic);
            }
        }
    }

    #[test]
    fn single_basic_event_needs_a_unary_gate() {
        for num_args in [2.0, 3.0] {
            let size = SizeFactors::new(num_args, 1);
            assert!(matches!(
                try_factors(size, &[1.0, 1.0], 0.1),
                Err(FactorError::TooFewBasicEvents { num_basic: 1, .. })
            ));
            let calc = factors(size, &[1.0, 1.0, 0.0, 1.0], 0.1);
            for seed in 0..50 {
                let tree = generate(&calc, &BuildOptions::default().with_seed(seed)).unwrap();
                assert_well_formed(&tree, 1);
            }
        }
    }

    #[test]
    fn wide_arity_closes_gates_at_the_basic_count() {
        let weights = [1.0, 0.0, 0.0, 3.0, 3.0];
        for common in [0.1, 0.6] {
            let calc = factors(SizeFactors::new(3.0, 20), &weights, common);
            assert!(calc.max_args() > 20.0);
            for seed in 0..40 {
                let tree = generate(&calc, &BuildOptions::default().with_seed(seed)).unwrap();
                assert_well_formed(&tree, 20);
            }
        }
    }

    #[test]
    fn missing_house_host_is_recoverable() {
        let size = SizeFactors::new(2.0, 10).with_house(2);
        let calc = factors(size, &[1.0, 0.0, 0.0, 3.0, 3.0], 0.6);

        let mut builder = GenerativeFaultTree::new(&calc, &BuildOptions::default());
        let top = builder.tree.add_gate("root", Operator::And).unwrap();
        let not = builder.tree.add_gate("G2", Operator::Not).unwrap();
        let xor = builder.tree.add_gate("G3", Operator::Xor).unwrap();
        builder.tree.add_argument(top, not).unwrap();
        builder.tree.add_argument(top, xor).unwrap();
        let err = builder.distribute_house_events(top).unwrap_err();
        assert!(matches!(err, Error::NoHouseEventHost { num_house: 2 }));
        assert!(err.is_recoverable());

        let mut built = 0;
        for seed in 0..64 {
            match generate(&calc, &BuildOptions::default().with_seed(seed)) {
                Ok(tree) => {
                    assert_well_formed(&tree, 10);
                    assert_eq!(tree.house_events().len(), 2);
                    built += 1;
                }
                Err(e) => assert!(matches!(e, Error::NoHouseEventHost { .. }), "{e}"),
            }
        }
        assert!(built > 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn generated_trees_are_well_formed(
            seed in any::<u64>(),
            num_basic in 1usize..120,
            num_args in 2.0f64..4.5,
            common in 0.05f64..0.6,
            variable in prop::collection::vec(0.0f64..3.0, 3),
            fixed in prop::collection::vec(0.0f64..3.0, 2),
            house_percent in 0usize..30,
        ) {
            prop_assume!(variable.iter().sum::<f64>() > 0.1);
            let weights: Vec<f64> = variable.into_iter().chain(fixed).collect();
            let num_house = num_basic * house_percent / 100;
            let size = SizeFactors::new(num_args, num_basic).with_house(num_house);
            let calc = try_factors(size, &weights, common);
            prop_assume!(calc.is_ok());
            let calc = calc.unwrap();
            let result = generate(&calc, &BuildOptions::default().with_seed(seed));
            prop_assume!(!matches!(result, Err(Error::NoHouseEventHost { .. })));
            let tree = result.unwrap();

            prop_assert_eq!(tree.basic_events().len(), num_basic);
            prop_assert_eq!(tree.house_events().len(), num_house);
            prop_assert!(tree.validate().is_ok());
        }
    }
}
