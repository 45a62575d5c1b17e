//! Structural validation of a finished fault tree.

use crate::error::{Error, Result};
use crate::event::Event;
use crate::gate::{Gate, Operator};
use crate::tree::FaultTree;

impl FaultTree {
    /// Checks the structural invariants of a complete tree.
    ///
    /// Roots must have no parents and every other event must have at least
    /// one. Gate arities must match their operators, `k_num` must be set
    /// exactly for `atleast` gates, and the gate graph must be acyclic with
    /// every gate reachable from the roots.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<()> {
        let roots = self.top_gates();
        if roots.is_empty() {
            return Err(Error::NoTopGate);
        }

        for (index, gate) in self.gates().iter().enumerate() {
            let is_root = roots.iter().any(|root| root.index() == index);
            if is_root && !gate.is_orphan() {
                return Err(Error::Validation(format!(
                    "top gate '{}' has {} parent(s)",
                    gate.name(),
                    gate.num_parents()
                )));
            }
            if !is_root {
                require_parent("gate", gate)?;
            }
            check_arity(gate)?;
        }
        for event in self.basic_events() {
            require_parent("basic event", event)?;
        }
        for event in self.house_events() {
            require_parent("house event", event)?;
        }
        for event in self.undefined_events() {
            require_parent("undefined event", event)?;
        }

        self.topological_order()?;
        Ok(())
    }
}

fn require_parent(kind: &str, event: &Event) -> Result<()> {
    if event.is_orphan() {
        Err(Error::Validation(format!(
            "{kind} '{}' has no parent",
            event.name()
        )))
    } else {
        Ok(())
    }
}

fn check_arity(gate: &Gate) -> Result<()> {
    let num_args = gate.num_arguments();
    let operator = gate.operator();
    match operator.fixed_args() {
        Some(fixed) if num_args != fixed => {
            return Err(Error::Validation(format!(
                "{operator} gate '{}' needs exactly {fixed} argument(s), has {num_args}",
                gate.name()
            )));
        }
        None if num_args < operator.min_args() => {
            return Err(Error::Validation(format!(
                "{operator} gate '{}' needs at least {} arguments, has {num_args}",
                gate.name(),
                operator.min_args()
            )));
        }
        _ => {}
    }

    match (operator, gate.k_num()) {
        (Operator::AtLeast, Some(k)) if (2..num_args).contains(&k) => Ok(()),
        (Operator::AtLeast, Some(k)) => Err(Error::Validation(format!(
            "atleast gate '{}' has k_num {k} outside [2, {num_args})",
            gate.name()
        ))),
        (Operator::AtLeast, None) => Err(Error::Validation(format!(
            "atleast gate '{}' has no k_num",
            gate.name()
        ))),
        (_, Some(_)) => Err(Error::Validation(format!(
            "{operator} gate '{}' must not carry k_num",
            gate.name()
        ))),
        (_, None) => Ok(()),
    }
}
