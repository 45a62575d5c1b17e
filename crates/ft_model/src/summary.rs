//! Size and complexity reports over a fault tree.

#![allow(clippy::cast_precision_loss)]

use crate::event::ArgRef;
use crate::gate::Operator;
use crate::tree::FaultTree;
use serde::Serialize;

/// Number of gates per operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GateCounts {
    /// AND gates.
    pub and: usize,
    /// OR gates.
    pub or: usize,
    /// K-of-N gates.
    pub atleast: usize,
    /// NOT gates.
    pub not: usize,
    /// XOR gates.
    pub xor: usize,
}

impl GateCounts {
    fn bump(&mut self, operator: Operator) {
        match operator {
            Operator::And => self.and += 1,
            Operator::Or => self.or += 1,
            Operator::AtLeast => self.atleast += 1,
            Operator::Not => self.not += 1,
            Operator::Xor => self.xor += 1,
        }
    }
}

/// Entity counts of a fault tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SizeSummary {
    /// Basic events.
    pub basic_events: usize,
    /// House events.
    pub house_events: usize,
    /// CCF groups.
    pub ccf_groups: usize,
    /// All gates including the roots.
    pub total_gates: usize,
    /// Gates broken down by operator.
    pub gate_types: GateCounts,
}

/// Sharing and connectivity statistics of a fault tree.
///
/// The per-gate fractions are independent averages and do not sum to one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ComplexitySummary {
    /// Basic events per gate.
    pub basic_to_gate_ratio: f64,
    /// Mean number of arguments of a gate.
    pub avg_gate_arguments: f64,
    /// Basic events with more than one parent.
    pub common_basic_events: usize,
    /// Gates with more than one parent.
    pub common_gates: usize,
    /// Average fraction of a gate's basic and gate arguments that are basic events.
    pub frac_basic_arguments: f64,
    /// Average fraction of common events among a gate's basic event arguments,
    /// over gates with basic event arguments.
    pub frac_common_basic: f64,
    /// Average fraction of common gates among a gate's gate arguments, over
    /// gates with gate arguments.
    pub frac_common_gates: f64,
    /// Mean parent count of common basic events, if there are any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_parents_common_basic: Option<f64>,
    /// Mean parent count of common gates, if there are any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_parents_common_gates: Option<f64>,
}

/// Both reports together, as written next to generated trees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// Entity counts.
    pub size: SizeSummary,
    /// Sharing statistics.
    pub complexity: ComplexitySummary,
}

impl FaultTree {
    /// Counts the entities of the tree.
    #[must_use]
    pub fn size_summary(&self) -> SizeSummary {
        let mut gate_types = GateCounts::default();
        for gate in self.gates() {
            gate_types.bump(gate.operator());
        }
        SizeSummary {
            basic_events: self.basic_events().len(),
            house_events: self.house_events().len(),
            ccf_groups: self.ccf_groups().len(),
            total_gates: self.gates().len(),
            gate_types,
        }
    }

    /// Computes sharing statistics. An empty tree yields all zeros.
    #[must_use]
    pub fn complexity_summary(&self) -> ComplexitySummary {
        let gates = self.gates();
        if gates.is_empty() {
            return ComplexitySummary::default();
        }

        let mut frac_b = 0.0;
        let mut common_b = 0.0;
        let mut common_g = 0.0;
        let mut with_b = 0usize;
        let mut with_g = 0usize;
        for gate in gates {
            let (mut num_b, mut num_g, mut shared_b, mut shared_g) = (0usize, 0usize, 0usize, 0usize);
            for arg in gate.arguments() {
                match arg {
                    ArgRef::Basic(_) => {
                        num_b += 1;
                        shared_b += usize::from(self.event(*arg).is_common());
                    }
                    ArgRef::Gate(_) => {
                        num_g += 1;
                        shared_g += usize::from(self.event(*arg).is_common());
                    }
                    ArgRef::House(_) | ArgRef::Undefined(_) => {}
                }
            }
            if num_b + num_g > 0 {
                frac_b += num_b as f64 / (num_b + num_g) as f64;
            }
            if num_b > 0 {
                with_b += 1;
                common_b += shared_b as f64 / num_b as f64;
            }
            if num_g > 0 {
                with_g += 1;
                common_g += shared_g as f64 / num_g as f64;
            }
        }

        let common_basic: Vec<usize> = self
            .basic_events()
            .iter()
            .filter(|e| e.is_common())
            .map(|e| e.num_parents())
            .collect();
        let common_gates: Vec<usize> = gates
            .iter()
            .filter(|g| g.is_common())
            .map(|g| g.num_parents())
            .collect();
        let total_args: usize = gates.iter().map(|g| g.num_arguments()).sum();

        ComplexitySummary {
            basic_to_gate_ratio: self.basic_events().len() as f64 / gates.len() as f64,
            avg_gate_arguments: total_args as f64 / gates.len() as f64,
            common_basic_events: common_basic.len(),
            common_gates: common_gates.len(),
            frac_basic_arguments: frac_b / gates.len() as f64,
            frac_common_basic: common_b / with_b.max(1) as f64,
            frac_common_gates: common_g / with_g.max(1) as f64,
            avg_parents_common_basic: mean(&common_basic),
            avg_parents_common_gates: mean(&common_gates),
        }
    }

    /// Computes both reports.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary {
            size: self.size_summary(),
            complexity: self.complexity_summary(),
        }
    }
}

fn mean(values: &[usize]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<usize>() as f64 / values.len() as f64)
    }
}

impl Summary {
    /// Renders the reports as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probability::Probability;

    fn shared_tree() -> FaultTree {
        let mut tree = FaultTree::new("system");
        let top = tree.add_gate("root", Operator::Or).unwrap();
        let g2 = tree.add_gate("G2", Operator::And).unwrap();
        let g3 = tree.add_gate("G3", Operator::Xor).unwrap();
        tree.set_top_gate(top).unwrap();
        let b: Vec<_> = (1..=3)
            .map(|i| {
                tree.add_basic_event(format!("B{i}"), Probability::point(0.01).unwrap())
                    .unwrap()
            })
            .collect();
        tree.add_argument(top, g2).unwrap();
        tree.add_argument(top, g3).unwrap();
        tree.add_argument(g2, b[0]).unwrap();
        tree.add_argument(g2, b[1]).unwrap();
        tree.add_argument(g3, b[1]).unwrap();
        tree.add_argument(g3, b[2]).unwrap();
        tree
    }

    #[test]
    fn size_counts_operators() {
        let size = shared_tree().size_summary();
        assert_eq!(size.basic_events, 3);
        assert_eq!(size.total_gates, 3);
        assert_eq!(
            size.gate_types,
            GateCounts {
                and: 1,
                or: 1,
                xor: 1,
                ..GateCounts::default()
            }
        );
    }

    #[test]
    fn complexity_statistics() {
        let c = shared_tree().complexity_summary();
        assert!((c.basic_to_gate_ratio - 1.0).abs() < 1e-12);
        assert!((c.avg_gate_arguments - 2.0).abs() < 1e-12);
        assert_eq!(c.common_basic_events, 1);
        assert_eq!(c.common_gates, 0);
        // root: 0 of 2 basic; G2 and G3: 2 of 2 basic.
        assert!((c.frac_basic_arguments - 2.0 / 3.0).abs() < 1e-12);
        // G2 and G3 each share one of two basic events.
        assert!((c.frac_common_basic - 0.5).abs() < 1e-12);
        assert!(c.frac_common_gates.abs() < 1e-12);
        assert_eq!(c.avg_parents_common_basic, Some(2.0));
        assert_eq!(c.avg_parents_common_gates, None);
    }

    #[test]
    fn empty_tree_has_zero_complexity() {
        let tree = FaultTree::new("empty");
        assert_eq!(tree.complexity_summary(), ComplexitySummary::default());
    }

    #[test]
    fn json_omits_missing_averages() {
        let json = shared_tree().summary().to_json().unwrap();
        assert!(json.contains("\"avg_parents_common_basic\": 2.0"));
        assert!(!json.contains("avg_parents_common_gates"));
    }
}
