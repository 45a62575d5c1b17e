//! Fault tree model for ftgen.
//!
//! This crate provides:
//! - Arena-backed events, gates and CCF groups with typed ids
//! - The [`FaultTree`] container keeping parent and argument links consistent
//! - Deterministic topological ordering with cycle detection
//! - Structural validation, size and complexity summaries
//! - A plain-text formula view and an xxh64 structural fingerprint
//!
//! # Example
//!
//! ```rust
//! use ft_model::{FaultTree, Operator, Probability};
//!
//! let mut tree = FaultTree::new("pump");
//! let top = tree.add_gate("root", Operator::Or)?;
//! tree.set_top_gate(top)?;
//! for name in ["B1", "B2"] {
//!     let event = tree.add_basic_event(name, Probability::point(1e-3)?)?;
//!     tree.add_argument(top, event)?;
//! }
//! tree.validate()?;
//! assert_eq!(tree.topological_order()?, vec![top]);
//! # Ok::<(), ft_model::Error>(())
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod ccf;
pub mod error;
pub mod event;
mod fingerprint;
mod formula;
pub mod gate;
pub mod probability;
pub mod summary;
mod toposort;
pub mod tree;
mod validate;

pub use ccf::{CcfGroup, CcfModel};
pub use error::{Error, Result};
pub use event::{
    ArgRef, BasicEvent, BasicEventId, Event, GateId, HouseEvent, HouseEventId, UndefinedEventId,
};
pub use gate::{Gate, Mark, Operator};
pub use probability::Probability;
pub use summary::{ComplexitySummary, GateCounts, SizeSummary, Summary};
pub use tree::{FaultTree, Roots};
