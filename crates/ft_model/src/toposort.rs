//! Deterministic topological ordering of gates.
//!
//! The sort is a depth-first post-order walk with three-color marking on
//! [`Gate::mark`]. The walk keeps its own stack so deep trees cannot overflow
//! the call stack.

use crate::error::{Error, Result};
use crate::event::GateId;
use crate::gate::{Gate, Mark};
use crate::tree::FaultTree;
use std::vec;
use tracing::{debug, error};

/// Resets every gate mark when dropped, including on the error path.
struct MarkReset<'a>(&'a [Gate]);

impl Drop for MarkReset<'_> {
    fn drop(&mut self) {
        for gate in self.0 {
            gate.set_mark(Mark::Unvisited);
        }
    }
}

impl FaultTree {
    /// Orders every gate so that each gate's gate-arguments precede it.
    ///
    /// Roots are visited in their configured order. Marks are reset to
    /// [`Mark::Unvisited`] before returning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoTopGate`] without roots, [`Error::Cycle`] if the
    /// gate graph is cyclic, and [`Error::Unreachable`] if some gates are not
    /// reachable from the roots.
    pub fn topological_order(&self) -> Result<Vec<GateId>> {
        let roots = self.top_gates();
        if roots.is_empty() {
            return Err(Error::NoTopGate);
        }
        let order = self.sort_from(roots)?;
        debug!(sorted = order.len(), total = self.gates().len(), "topological sort");
        if order.len() != self.gates().len() {
            return Err(Error::Unreachable {
                unreachable: self.gates().len() - order.len(),
                total: self.gates().len(),
            });
        }
        Ok(order)
    }

    /// Orders the gates reachable from `roots`, arguments first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cycle`] if a gate is reached again while it is still
    /// on the traversal path.
    ///
    /// # Panics
    ///
    /// Panics if a root id does not belong to this tree.
    pub fn sort_from(&self, roots: &[GateId]) -> Result<Vec<GateId>> {
        let gates = self.gates();
        let _reset = MarkReset(gates);
        let mut order = Vec::with_capacity(gates.len());
        for &root in roots {
            visit(gates, root, &mut order)?;
        }
        Ok(order)
    }
}

fn children(gate: &Gate) -> vec::IntoIter<GateId> {
    gate.gate_arguments().collect::<Vec<_>>().into_iter()
}

fn visit(gates: &[Gate], root: GateId, order: &mut Vec<GateId>) -> Result<()> {
    if gates[root.0].mark() == Mark::Done {
        return Ok(());
    }
    gates[root.0].set_mark(Mark::InProgress);
    let mut stack = vec![(root, children(&gates[root.0]))];

    while let Some(frame) = stack.last_mut() {
        let current = frame.0;
        match frame.1.next() {
            Some(child) => match gates[child.0].mark() {
                Mark::Unvisited => {
                    gates[child.0].set_mark(Mark::InProgress);
                    stack.push((child, children(&gates[child.0])));
                }
                Mark::InProgress => {
                    error!(gate = gates[child.0].name(), "cycle in gate graph");
                    return Err(Error::Cycle(gates[child.0].name().to_string()));
                }
                Mark::Done => {}
            },
            None => {
                gates[current.0].set_mark(Mark::Done);
                order.push(current);
                stack.pop();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Operator;
    use crate::probability::Probability;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn diamond() -> FaultTree {
        let mut tree = FaultTree::new("diamond");
        let top = tree.add_gate("TOP", Operator::Or).unwrap();
        let left = tree.add_gate("L", Operator::And).unwrap();
        let right = tree.add_gate("R", Operator::And).unwrap();
        let shared = tree.add_gate("S", Operator::Or).unwrap();
        let b = tree.add_basic_event("B1", Probability::point(0.1).unwrap()).unwrap();
        tree.set_top_gate(top).unwrap();
        tree.add_argument(top, left).unwrap();
        tree.add_argument(top, right).unwrap();
        tree.add_argument(left, shared).unwrap();
        tree.add_argument(right, shared).unwrap();
        tree.add_argument(shared, b).unwrap();
        tree
    }

    fn all_unvisited(tree: &FaultTree) -> bool {
        tree.gates().iter().all(|g| g.mark() == Mark::Unvisited)
    }

    #[test]
    fn arguments_precede_gates() {
        let tree = diamond();
        let order = tree.topological_order().unwrap();
        assert_eq!(order.len(), 4);

        let position: HashMap<GateId, usize> =
            order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        for id in &order {
            for child in tree.gate(*id).gate_arguments() {
                assert!(position[&child] < position[id]);
            }
        }
        assert_eq!(tree.gate(*order.last().unwrap()).name(), "TOP");
    }

    #[test]
    fn sorting_twice_leaves_no_marks() {
        let tree = diamond();
        let first = tree.topological_order().unwrap();
        assert!(all_unvisited(&tree));
        let second = tree.topological_order().unwrap();
        assert!(all_unvisited(&tree));
        assert_eq!(first, second);
    }

    #[test]
    fn cycle_is_reported_and_marks_reset() {
        let mut tree = FaultTree::new("loop");
        let a = tree.add_gate("A", Operator::And).unwrap();
        let b = tree.add_gate("B", Operator::Or).unwrap();
        tree.set_top_gate(a).unwrap();
        tree.add_argument(a, b).unwrap();
        tree.add_argument(b, a).unwrap();

        assert_eq!(tree.topological_order(), Err(Error::Cycle("A".into())));
        assert!(all_unvisited(&tree));
    }

    #[test]
    fn unreachable_gates_are_reported() {
        let mut tree = diamond();
        tree.add_gate("DETACHED", Operator::And).unwrap();
        assert_eq!(
            tree.topological_order(),
            Err(Error::Unreachable {
                unreachable: 1,
                total: 5
            })
        );
        assert_eq!(tree.sort_from(tree.top_gates()).unwrap().len(), 4);
    }

    #[test]
    fn requires_roots() {
        let tree = FaultTree::new("empty");
        assert_eq!(tree.topological_order(), Err(Error::NoTopGate));
    }

    #[test]
    fn multiple_roots_share_subtrees() {
        let mut tree = diamond();
        let extra = tree.add_gate("EXTRA", Operator::Or).unwrap();
        let shared = match tree.find("S") {
            Some(crate::ArgRef::Gate(id)) => id,
            other => panic!("unexpected lookup result {other:?}"),
        };
        let top = tree.top_gates()[0];
        tree.add_argument(extra, shared).unwrap();
        tree.set_top_gates(vec![top, extra]).unwrap();

        let order = tree.topological_order().unwrap();
        assert_eq!(order.len(), 5);
        assert_eq!(order.last(), Some(&extra));
    }

    proptest! {
        #[test]
        fn random_dags_sort_completely(
            size in 2usize..40,
            edges in prop::collection::vec((0usize..40, 0usize..40), 0..120),
        ) {
            let mut tree = FaultTree::new("dag");
            let ids: Vec<GateId> = (0..size)
                .map(|i| tree.add_gate(format!("G{i}"), Operator::And).unwrap())
                .collect();
            tree.set_top_gate(ids[0]).unwrap();
            for (a, b) in edges {
                let (a, b) = (a % size, b % size);
                // Only downward edges keep the graph acyclic.
                if a < b && !tree.gate(ids[a]).has_argument(ids[b].into()) {
                    tree.add_argument(ids[a], ids[b]).unwrap();
                }
            }
            for id in &ids[1..] {
                if tree.gate(*id).is_orphan() {
                    tree.add_argument(ids[0], *id).unwrap();
                }
            }

            let order = tree.topological_order().unwrap();
            prop_assert_eq!(order.len(), size);
            let position: HashMap<GateId, usize> =
                order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
            prop_assert_eq!(position.len(), size);
            for id in &order {
                for child in tree.gate(*id).gate_arguments() {
                    prop_assert!(position[&child] < position[id]);
                }
            }
            prop_assert!(all_unvisited(&tree));
        }
    }
}
