use crate::{
    BackendError, Budget, ExchangeGraph, Exhaustion, Ledger, LinearProgram, LpBackend,
    SimplexBackend, greedy,
};
use std::time::Duration;
use tracing::{Level, event};

/// Limits and tolerances for the optimization strategy
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationSettings {
    /// Wall-clock budget for the whole solve
    pub time_limit: Option<Duration>,
    /// The most relaxations the branch-and-bound search may solve
    pub node_limit: usize,
    /// Relative tolerance for integrality, pruning, and snapping LP values
    pub tolerance: f64,
}

impl Default for OptimizationSettings {
    fn default() -> Self {
        Self {
            time_limit: None,
            node_limit: 10_000,
            tolerance: 1e-7,
        }
    }
}

/// Maximize the total preference-weighted flow through an [`LpBackend`].
///
/// Divisible arcs are continuous variables. All-or-nothing arcs are resolved
/// by a depth-first branch-and-bound over their two admissible values, with
/// the greedy solution as the initial incumbent; the search therefore never
/// does worse than greedy.
#[derive(Debug)]
pub struct Optimization {
    backend: Box<dyn LpBackend>,
    settings: OptimizationSettings,
}

impl Default for Optimization {
    fn default() -> Self {
        Self::new(
            Box::new(SimplexBackend::default()),
            OptimizationSettings::default(),
        )
    }
}

impl Optimization {
    /// Create a strategy solving through the given backend
    pub fn new(backend: Box<dyn LpBackend>, settings: OptimizationSettings) -> Self {
        Self { backend, settings }
    }

    /// The backend relaxations are solved with
    pub fn backend(&self) -> &dyn LpBackend {
        self.backend.as_ref()
    }

    /// The configured limits
    pub fn settings(&self) -> &OptimizationSettings {
        &self.settings
    }

    /// Run the search, returning the committed allocation and, if the search
    /// was cut short, the reason.
    pub(crate) fn run<'g>(
        &self,
        graph: &'g ExchangeGraph,
    ) -> Result<(Ledger<'g>, Option<Exhaustion>), BackendError> {
        let tolerance = self.settings.tolerance;
        let budget = Budget::new(self.settings.time_limit);
        let program = LinearProgram::from_graph(graph);

        let exclusive = graph
            .arcs()
            .iter()
            .enumerate()
            .filter_map(|(j, arc)| arc.exclusive.then_some(j))
            .collect::<Vec<_>>();

        let greedy = greedy::fill(graph);
        let mut incumbent = greedy.score();
        let mut best: Option<Ledger<'g>> = None;

        let mut stack = vec![vec![None; program.columns()]];
        let mut explored = 0;
        let mut exhausted = None;

        while let Some(fixed) = stack.pop() {
            if budget.expired() {
                exhausted = Some(Exhaustion::TimeLimit);
                break;
            }
            if explored >= self.settings.node_limit {
                exhausted = Some(Exhaustion::NodeLimit);
                break;
            }
            explored += 1;

            let Some(restricted) = program.restrict(&fixed, tolerance) else {
                continue;
            };
            let relaxed = match self.backend.solve(&restricted, &budget) {
                Ok(relaxed) => relaxed,
                Err(BackendError::Limit(reason)) => {
                    exhausted = Some(reason);
                    break;
                }
                Err(error) => return Err(error),
            };

            if relaxed.objective <= incumbent + tolerance * incumbent.abs().max(1.0) {
                continue;
            }

            let x = fixed
                .iter()
                .zip(relaxed.x.iter())
                .zip(program.upper.iter())
                .map(|((fixing, &x), &upper)| match fixing {
                    Some(true) => upper,
                    Some(false) => 0.0,
                    None => x,
                })
                .collect::<Vec<_>>();

            let fractional = exclusive.iter().copied().find(|&j| {
                let slack = tolerance * program.upper[j].max(1.0);
                fixed[j].is_none() && x[j] > slack && x[j] < program.upper[j] - slack
            });

            if let Some(j) = fractional {
                // Depth first, trying the full branch first
                let mut zero = fixed.clone();
                zero[j] = Some(false);
                let mut full = fixed;
                full[j] = Some(true);
                stack.push(zero);
                stack.push(full);
            } else {
                let candidate = extract(graph, &x, tolerance);
                if candidate.score() > incumbent {
                    incumbent = candidate.score();
                    best = Some(candidate);
                }
            }
        }

        event!(
            Level::DEBUG,
            backend = self.backend.name(),
            explored,
            exclusive = exclusive.len(),
            score = incumbent,
            "branch and bound finished"
        );

        Ok((best.unwrap_or(greedy), exhausted))
    }
}

/// Commit LP values through a fresh ledger in priority order.
///
/// Values within tolerance of the admissible bound snap to it, values within
/// tolerance of zero are discarded, and all-or-nothing arcs commit their full
/// flow or nothing.
pub(crate) fn extract<'g>(graph: &'g ExchangeGraph, x: &[f64], tolerance: f64) -> Ledger<'g> {
    let mut ledger = Ledger::new(graph);
    for id in graph.priority_order() {
        let arc = &graph.arcs()[id.0];
        let value = x[id.0];
        let slack = tolerance * arc.max_flow.max(1.0);
        if value <= slack {
            continue;
        }

        if arc.exclusive {
            if value >= arc.max_flow - slack {
                ledger.commit_exact(id, arc.max_flow);
            }
        } else {
            let admissible = ledger.admissible(id);
            let quantity = if value >= admissible - slack {
                admissible
            } else {
                value
            };
            ledger.commit(id, quantity);
        }
    }
    ledger
}
