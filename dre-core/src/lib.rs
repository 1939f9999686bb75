#![warn(missing_docs)]
//! Core models and ports for the dynamic resource exchange.
//!
//! Each simulation step, participants submit request and bid portfolios for
//! commodities into an [`models::ExchangeContext`]. Downstream crates turn the
//! context into a bipartite exchange graph, solve it, and dispatch the resulting
//! [`models::Trade`]s back to participants through the [`ports::Participant`]
//! interface.

/// Core domain models for the resource exchange.
///
/// These are plain data structures with the validation needed to uphold their
/// invariants at construction time. Nothing here searches or solves; the
/// models are consumed later by the graph builder and solvers.
pub mod models;

/// Interface traits for the resource exchange.
///
/// These are the "ports" that the simulation's participant layer implements in
/// order to take part in an exchange step.
pub mod ports;
