// src/graph/mod.rs

//! Task graph representation, plan resolution and execution.
//!
//! - [`graph`] holds task adjacency (deps and dependents).
//! - [`plan`] resolves a requested task into a dependency-ordered plan with
//!   cycle detection and diamond deduplication.
//! - [`node`] is the unit of work: selector → transform chain → destination,
//!   or a selector-less action.
//! - [`executor`] runs a plan with bounded parallelism and first-failure
//!   halting.

pub mod executor;
pub mod graph;
pub mod node;
pub mod plan;

pub use executor::execute_plan;
pub use graph::TaskGraph;
pub use node::TaskNode;
pub use plan::{ExecutionPlan, resolve};
