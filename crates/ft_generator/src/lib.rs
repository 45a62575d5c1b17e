//! Synthetic fault tree generation driven by complexity factors.
//!
//! The workflow:
//! 1. Fill in [`GenerationParams`] (or call the [`ComplexityFactors`] setters)
//! 2. Derive [`CalculatedFactors`], the read-only sampling context
//! 3. Build one tree with [`generate`] or many with [`generate_batch`]
//!
//! # Example
//!
//! ```rust
//! use ft_generator::{generate, GenerationParams};
//!
//! let params = GenerationParams {
//!     num_basic: 20,
//!     seed: 42,
//!     ..GenerationParams::default()
//! };
//! let factors = params.to_factors()?;
//! let tree = generate(&factors, &params.build_options("demo"))?;
//! assert_eq!(tree.basic_events().len(), 20);
//! tree.validate()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod batch;
pub mod builder;
pub mod ccf;
pub mod deadline;
pub mod error;
pub mod factors;
pub mod params;

pub use batch::{generate_batch, tree_seed, BatchItem, BatchOptions};
pub use builder::{generate, BuildOptions, GenerativeFaultTree};
pub use deadline::Deadline;
pub use error::{Error, FactorError, Result};
pub use factors::{CalculatedFactors, CommonFactors, ComplexityFactors, SizeFactors};
pub use params::GenerationParams;
