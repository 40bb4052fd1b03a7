//! Subjective Time: procedural message generation for a kinetic display.
//!
//! Combines the current time and place with a curated library of templated
//! text fragments. A selection router draws candidate templates from tiered
//! record sources and a markup engine rewrites them through five ordered
//! substitution passes.

pub mod core;
pub mod schema;
