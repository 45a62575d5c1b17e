//! Structural fingerprint of a fault tree.

use crate::event::ArgRef;
use crate::tree::FaultTree;
use std::fmt::Write;
use xxhash_rust::xxh64::xxh64;

impl FaultTree {
    /// Hashes the structure of the tree with xxh64.
    ///
    /// Names, operators, `k_num` values, argument sets, house states, roots
    /// and CCF groups contribute. Probability values do not, so two trees
    /// with the same shape and different point estimates share a fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut input = String::new();
        input.push_str(self.name());

        for root in self.top_gates() {
            input.push('\n');
            input.push_str(self.gate(*root).name());
        }
        for gate in self.gates() {
            let _ = write!(input, "\n{} {}", gate.name(), gate.operator());
            if let Some(k) = gate.k_num() {
                let _ = write!(input, " k={k}");
            }
            for arg in gate.arguments() {
                input.push(' ');
                input.push(kind_tag(*arg));
                input.push_str(self.arg_name(*arg));
            }
        }
        for event in self.basic_events() {
            input.push('\n');
            input.push_str(event.name());
        }
        for event in self.house_events() {
            let _ = write!(input, "\n{}={}", event.name(), event.state());
        }
        for group in self.ccf_groups() {
            let _ = write!(input, "\n{} {}", group.name(), group.model());
            for member in group.members() {
                input.push(' ');
                input.push_str(self.basic_event(*member).name());
            }
        }
        xxh64(input.as_bytes(), 0)
    }
}

const fn kind_tag(arg: ArgRef) -> char {
    match arg {
        ArgRef::Gate(_) => 'g',
        ArgRef::Basic(_) => 'b',
        ArgRef::House(_) => 'h',
        ArgRef::Undefined(_) => 'u',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Operator;
    use crate::probability::Probability;

    fn build(prob: f64, operator: Operator) -> FaultTree {
        let mut tree = FaultTree::new("system");
        let top = tree.add_gate("root", operator).unwrap();
        tree.set_top_gate(top).unwrap();
        for name in ["B1", "B2"] {
            let b = tree
                .add_basic_event(name, Probability::point(prob).unwrap())
                .unwrap();
            tree.add_argument(top, b).unwrap();
        }
        tree
    }

    #[test]
    fn equal_structures_hash_equal() {
        assert_eq!(build(0.1, Operator::And).fingerprint(), build(0.1, Operator::And).fingerprint());
        assert_eq!(build(0.1, Operator::And).fingerprint(), build(0.2, Operator::And).fingerprint());
    }

    #[test]
    fn operator_changes_hash() {
        assert_ne!(build(0.1, Operator::And).fingerprint(), build(0.1, Operator::Or).fingerprint());
    }
}
