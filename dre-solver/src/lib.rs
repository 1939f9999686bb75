#![warn(missing_docs)]
//! Market clearing for the dynamic resource exchange.
//!
//! An [`ExchangeGraph`] is built from a step's
//! [`ExchangeContext`](dre_core::models::ExchangeContext) and handed to a
//! [`Strategy`], which produces the step's trades. Two strategies are
//! available: a greedy heuristic, and an optimization formulation solved
//! through an injectable [`LpBackend`].

/**
 * The bipartite graph of request and bid nodes, rebuilt every step.
 */
mod graph;
pub use graph::*;

/**
 * The residual-capacity bookkeeping shared by every strategy.
 */
mod ledger;
pub use ledger::Ledger;

/**
 * The linear program behind the optimization strategy.
 */
mod program;
pub use program::LinearProgram;

/**
 * Implementations of the linear-programming backend.
 */
mod impls;
pub use impls::*;

mod greedy;
mod optimization;
pub use optimization::{Optimization, OptimizationSettings};

mod strategy;
pub use strategy::{Solution, SolveError, SolveStatus, Strategy};

/**
 * Export of the optimization program to standard formats.
 */
pub mod export;
