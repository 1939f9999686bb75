use crate::LinearProgram;
use std::time::{Duration, Instant};
use thiserror::Error;

mod simplex;
pub use simplex::SimplexBackend;

/// Implementation using the Clarabel interior point solver
#[cfg(feature = "clarabel")]
mod clarabel;
#[cfg(feature = "clarabel")]
pub use clarabel::ClarabelBackend;

/// Implementation using the OSQP operator splitting solver
#[cfg(feature = "osqp")]
mod osqp;
#[cfg(feature = "osqp")]
pub use osqp::OsqpBackend;

/// A solver for the linear relaxations produced by the optimization strategy.
///
/// Implementations receive a [`LinearProgram`] whose origin is feasible and
/// return a primal point, or report why they could not.
pub trait LpBackend: std::fmt::Debug {
    /// A short name for log events
    fn name(&self) -> &'static str;

    /// Maximize the program's objective within the given budget
    fn solve(&self, program: &LinearProgram, budget: &Budget) -> Result<LpSolution, BackendError>;
}

/// A primal solution of a [`LinearProgram`]
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    /// The value of each variable
    pub x: Vec<f64>,
    /// The objective value at `x`, including the program's offset
    pub objective: f64,
}

/// Which resource ran out before a solve finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Exhaustion {
    /// The wall-clock budget
    TimeLimit,
    /// A backend's iteration limit
    IterationLimit,
    /// The branch-and-bound node limit
    NodeLimit,
}

impl std::fmt::Display for Exhaustion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimeLimit => write!(f, "time limit"),
            Self::IterationLimit => write!(f, "iteration limit"),
            Self::NodeLimit => write!(f, "node limit"),
        }
    }
}

/// The ways a backend can fail
#[derive(Debug, Error, PartialEq)]
pub enum BackendError {
    /// The backend declared the program infeasible
    #[error("linear program is infeasible")]
    Infeasible,
    /// The backend declared the program unbounded
    #[error("linear program is unbounded")]
    Unbounded,
    /// The backend stopped early
    #[error("backend stopped at its {0}")]
    Limit(Exhaustion),
    /// The backend rejected the program
    #[error("backend setup failed: {0}")]
    Setup(String),
    /// The backend finished without a usable answer
    #[error("backend numerical failure: {0}")]
    Numerical(String),
}

/// A wall-clock deadline shared by every solve within one strategy invocation
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    deadline: Option<Instant>,
}

impl Budget {
    /// Start a budget of the given length, or an unlimited one
    pub fn new(limit: Option<Duration>) -> Self {
        Self {
            deadline: limit.map(|limit| Instant::now() + limit),
        }
    }

    /// A budget that never expires
    pub fn unlimited() -> Self {
        Self { deadline: None }
    }

    /// Whether the deadline has passed
    pub fn expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Time left before the deadline, if there is one
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::unlimited()
    }
}
