//! Plain-text formula view of a fault tree.
//!
//! Each gate is written as `NAME := formula` with house events first, then
//! basic events, then gates. Leaf events follow as `p(B) = value` and
//! `s(H) = state` lines. The view is meant for reading and diffing.

use crate::error::Result;
use crate::event::ArgRef;
use crate::gate::Operator;
use crate::tree::FaultTree;
use crate::GateId;

impl FaultTree {
    /// Renders the formula of one gate.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this tree.
    #[must_use]
    pub fn gate_formula(&self, id: GateId) -> String {
        let gate = self.gate(id);
        let mut names: Vec<&str> = gate
            .house_arguments()
            .map(|h| self.house_event(h).name())
            .collect();
        names.extend(gate.basic_arguments().map(|b| self.basic_event(b).name()));
        names.extend(gate.gate_arguments().map(|g| self.gate(g).name()));
        names.extend(
            gate.undefined_arguments()
                .map(|u| self.arg_name(ArgRef::Undefined(u))),
        );

        let body = match gate.operator() {
            Operator::And => format!("({})", names.join(" & ")),
            Operator::Or => format!("({})", names.join(" | ")),
            Operator::Xor => format!("({})", names.join(" ^ ")),
            Operator::Not => format!("~({})", names.join("")),
            Operator::AtLeast => format!(
                "@({}, [{}])",
                gate.k_num().unwrap_or_default(),
                names.join(", ")
            ),
        };
        format!("{} := {body}", gate.name())
    }

    /// Renders every gate top-down followed by the leaf events.
    ///
    /// # Errors
    ///
    /// Returns an error if the gates cannot be ordered.
    pub fn to_formula_text(&self) -> Result<String> {
        let order = self.topological_order()?;
        let mut lines: Vec<String> = order.iter().rev().map(|id| self.gate_formula(*id)).collect();
        lines.extend(
            self.basic_events()
                .iter()
                .map(|b| format!("p({}) = {}", b.name(), b.probability().central_value())),
        );
        lines.extend(
            self.house_events()
                .iter()
                .map(|h| format!("s({}) = {}", h.name(), h.state())),
        );
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probability::Probability;

    fn demo() -> FaultTree {
        let mut tree = FaultTree::new("demo");
        let root = tree.add_gate("root", Operator::Or).unwrap();
        let vote = tree.add_gate("G2", Operator::AtLeast).unwrap();
        let not = tree.add_gate("G3", Operator::Not).unwrap();
        tree.gate_mut(vote).set_k_num(2);
        tree.set_top_gate(root).unwrap();
        let b: Vec<_> = [0.01, 0.02, 0.03, 0.04]
            .iter()
            .enumerate()
            .map(|(i, p)| {
                tree.add_basic_event(format!("B{}", i + 1), Probability::point(*p).unwrap())
                    .unwrap()
            })
            .collect();
        let h = tree.add_house_event("H1", true).unwrap();

        tree.add_argument(root, vote).unwrap();
        tree.add_argument(root, not).unwrap();
        tree.add_argument(root, b[0]).unwrap();
        tree.add_argument(root, h).unwrap();
        for id in &b[..3] {
            tree.add_argument(vote, *id).unwrap();
        }
        tree.add_argument(not, b[3]).unwrap();
        tree
    }

    #[test]
    fn formula_text() {
        let text = demo().to_formula_text().unwrap();
        insta::assert_snapshot!(text, @r###"
        root := (H1 | B1 | G2 | G3)
        G3 := ~(B4)
        G2 := @(2, [B1, B2, B3])
        p(B1) = 0.01
        p(B2) = 0.02
        p(B3) = 0.03
        p(B4) = 0.04
        s(H1) = true
        "###);
    }

    #[test]
    fn single_gate_formula() {
        let tree = demo();
        let root = tree.top_gate().unwrap();
        assert_eq!(tree.gate_formula(root), "root := (H1 | B1 | G2 | G3)");
    }
}
