use crate::Scenario;
use clap::ValueEnum;
use dre_core::ports::Participant;
use dre_exchange::{
    Exchange, ExchangeConfig, StepReport,
    config::{BackendKind, SolverConfig, StrategyKind},
};

/// The clearing strategies selectable from the command line
#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub enum SolverLib {
    /// Fill arcs by descending weight
    Greedy,
    /// Branch and bound over the exact simplex
    Simplex,
    /// Branch and bound over Clarabel
    Clarabel,
    /// Branch and bound over OSQP
    Osqp,
}

impl SolverLib {
    /// Overwrite the strategy (and backend) of a solver configuration
    pub fn apply(self, config: &mut SolverConfig) {
        let backend = match self {
            Self::Greedy => {
                config.strategy = StrategyKind::Greedy;
                return;
            }
            Self::Simplex => BackendKind::Simplex,
            Self::Clarabel => BackendKind::Clarabel,
            Self::Osqp => BackendKind::Osqp,
        };
        config.strategy = StrategyKind::Optimization;
        config.backend = backend;
    }
}

/// Run the scenario through one exchange step.
///
/// Portfolios that fail validation while reading the scenario are reported
/// ahead of those the exchange itself rejects.
pub fn solve(scenario: Scenario, config: &ExchangeConfig) -> anyhow::Result<StepReport> {
    let exchange = Exchange::from_config(config)?;

    let step = scenario.step;
    let (submitters, mut rejections) = scenario.into_participants();
    let mut participants = submitters
        .into_iter()
        .map(|submitter| Box::new(submitter) as Box<dyn Participant>)
        .collect::<Vec<_>>();

    let mut report = exchange.run_exchange(step, &mut participants)?;
    rejections.append(&mut report.rejections);
    report.rejections = rejections;
    Ok(report)
}
