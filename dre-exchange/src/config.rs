//! Exchange configuration.
//!
//! The solver strategy and backend tuning are fixed for the lifetime of a
//! simulation. Every field has a default, so a configuration source only
//! needs to name what it changes.

use dre_solver::{LpBackend, Optimization, OptimizationSettings, SimplexBackend, Strategy};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// The cross-step configuration of an [`Exchange`](crate::Exchange)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExchangeConfig {
    /// How each step's graph is cleared
    #[serde(default)]
    pub solver: SolverConfig,
}

/// Which strategy to clear with, and its limits
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Greedy or optimization
    pub strategy: StrategyKind,
    /// The LP backend used by the optimization strategy
    pub backend: BackendKind,
    /// Wall-clock budget for one solve (e.g. "5s"); unlimited if omitted
    #[serde(with = "humantime_serde::option")]
    pub time_limit: Option<Duration>,
    /// The most branch-and-bound nodes one solve may explore
    pub node_limit: usize,
    /// Relative tolerance for integrality, pruning, and snapping LP values
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let settings = OptimizationSettings::default();
        Self {
            strategy: StrategyKind::Optimization,
            backend: BackendKind::default(),
            time_limit: settings.time_limit,
            node_limit: settings.node_limit,
            tolerance: settings.tolerance,
        }
    }
}

/// The available clearing strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Fill arcs by descending weight
    Greedy,
    /// Maximize the total weighted flow
    Optimization,
}

/// The available LP backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// The in-process exact simplex
    Simplex,
    /// The Clarabel interior point solver
    Clarabel,
    /// The OSQP operator splitting solver
    Osqp,
}

impl Default for BackendKind {
    /// Clarabel when compiled in, otherwise the simplex
    fn default() -> Self {
        if cfg!(feature = "clarabel") {
            Self::Clarabel
        } else {
            Self::Simplex
        }
    }
}

/// The ways a configuration can fail to produce a strategy
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The backend was not compiled in
    #[error("the {0} backend is not available in this build")]
    Unavailable(&'static str),
    /// A limit is out of range
    #[error("invalid solver setting: {0}")]
    Invalid(&'static str),
}

impl SolverConfig {
    /// Instantiate the configured strategy
    pub fn build(&self) -> Result<Strategy, ConfigError> {
        if !(self.tolerance >= 0.0 && self.tolerance < 1.0) {
            return Err(ConfigError::Invalid("tolerance must be in [0, 1)"));
        }

        match self.strategy {
            StrategyKind::Greedy => Ok(Strategy::Greedy),
            StrategyKind::Optimization => {
                let backend = self.backend.build()?;
                Ok(Optimization::new(backend, self.settings()).into())
            }
        }
    }

    /// The branch-and-bound limits
    pub fn settings(&self) -> OptimizationSettings {
        OptimizationSettings {
            time_limit: self.time_limit,
            node_limit: self.node_limit,
            tolerance: self.tolerance,
        }
    }
}

impl BackendKind {
    /// The default backend, which is always compiled in
    pub(crate) fn default_backend() -> Box<dyn LpBackend> {
        #[cfg(feature = "clarabel")]
        {
            Box::new(dre_solver::ClarabelBackend::default())
        }
        #[cfg(not(feature = "clarabel"))]
        {
            Box::new(SimplexBackend::default())
        }
    }

    /// Instantiate the backend with its default settings
    pub fn build(self) -> Result<Box<dyn LpBackend>, ConfigError> {
        match self {
            Self::Simplex => Ok(Box::new(SimplexBackend::default())),
            #[cfg(feature = "clarabel")]
            Self::Clarabel => Ok(Box::new(dre_solver::ClarabelBackend::default())),
            #[cfg(not(feature = "clarabel"))]
            Self::Clarabel => Err(ConfigError::Unavailable("clarabel")),
            #[cfg(feature = "osqp")]
            Self::Osqp => Ok(Box::new(dre_solver::OsqpBackend::default())),
            #[cfg(not(feature = "osqp"))]
            Self::Osqp => Err(ConfigError::Unavailable("osqp")),
        }
    }
}
