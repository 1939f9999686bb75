use crate::{BackendError, ExchangeGraph, Exhaustion, GraphError, Optimization, greedy};
use dre_core::models::Trade;
use thiserror::Error;
use tracing::{Level, event};

/// How a step's exchange graph is cleared.
#[derive(Debug, Default)]
pub enum Strategy {
    /// Fill arcs by descending weight, each as far as capacity allows
    #[default]
    Greedy,
    /// Maximize the total weighted flow
    Optimization(Optimization),
}

/// The outcome of a solve
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// The trades, in commit order
    pub trades: Vec<Trade>,
    /// How much confidence the trades deserve
    pub status: SolveStatus,
}

impl Solution {
    /// The sum of all traded quantities
    pub fn total_quantity(&self) -> f64 {
        self.trades.iter().map(|trade| trade.quantity).sum()
    }

    /// The preference-weighted sum of all traded quantities
    pub fn total_score(&self) -> f64 {
        self.trades.iter().map(Trade::score).sum()
    }
}

/// The quality of a [`Solution`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SolveStatus {
    /// Produced by the greedy strategy
    Heuristic,
    /// Optimal within the configured tolerance
    Optimal,
    /// The optimization ran out of budget; the trades are the best found
    Degraded {
        /// The exhausted resource
        reason: Exhaustion,
    },
}

/// The ways a solve can fail
#[derive(Debug, Error, PartialEq)]
pub enum SolveError {
    /// The graph is malformed, which indicates a construction defect
    #[error("infeasible exchange graph: {diagnostic}")]
    InfeasibleGraph {
        /// What is wrong with the graph
        #[from]
        diagnostic: GraphError,
    },
    /// The LP backend failed outright
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl Strategy {
    /// A short name for log events
    pub fn name(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Optimization(_) => "optimization",
        }
    }

    /// Compute trades for a graph.
    ///
    /// The result never exceeds a node capacity, member quantity, or
    /// constraint, and never contains a non-positive quantity. An empty trade
    /// set for a valid graph is a normal outcome.
    pub fn solve(&self, graph: &ExchangeGraph) -> Result<Solution, SolveError> {
        graph.validate()?;

        let solution = match self {
            Self::Greedy => Solution {
                trades: greedy::fill(graph).into_trades(),
                status: SolveStatus::Heuristic,
            },
            Self::Optimization(_) if graph.is_empty() => Solution {
                trades: Vec::new(),
                status: SolveStatus::Optimal,
            },
            Self::Optimization(optimization) => {
                let (ledger, exhausted) = optimization.run(graph)?;
                let status = match exhausted {
                    Some(reason) => {
                        event!(
                            Level::WARN,
                            backend = optimization.backend().name(),
                            %reason,
                            "optimization exhausted its budget, returning the best allocation found"
                        );
                        SolveStatus::Degraded { reason }
                    }
                    None => SolveStatus::Optimal,
                };
                Solution {
                    trades: ledger.into_trades(),
                    status,
                }
            }
        };

        event!(
            Level::DEBUG,
            strategy = self.name(),
            trades = solution.trades.len(),
            quantity = solution.total_quantity(),
            "solved exchange graph"
        );

        Ok(solution)
    }
}

impl From<Optimization> for Strategy {
    fn from(value: Optimization) -> Self {
        Self::Optimization(value)
    }
}
