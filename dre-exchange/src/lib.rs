#![warn(missing_docs)]
//! The per-step engine of the dynamic resource exchange.
//!
//! An [`Exchange`] is configured once per simulation and then driven by the
//! time-stepping layer through [`Exchange::run_exchange`], which collects
//! portfolios from the [`Participant`](dre_core::ports::Participant)s, clears
//! them with the configured [`Strategy`](dre_solver::Strategy), and dispatches
//! the resulting trades.

pub mod config;
pub use config::ExchangeConfig;

mod engine;
pub use engine::Exchange;

mod error;
pub use error::ExchangeError;

mod report;
pub use report::{Rejection, StepReport};
