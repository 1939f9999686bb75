use crate::{
    ExchangeError, Rejection, StepReport,
    config::{BackendKind, ConfigError, ExchangeConfig, SolverConfig},
};
use dre_core::{
    models::{
        ConstructionError, ExchangeContext, Map, Member, ParticipantId, Portfolio, Role, Side,
        Step, SubmissionError,
    },
    ports::Participant,
};
use dre_solver::{ExchangeGraph, Optimization, Strategy};
use tracing::{Level, event, span};

/// Runs one market-clearing pass per simulation step.
///
/// Nothing is retained between steps: each [`Exchange::run_exchange`] builds
/// its own context and graph and drops them before returning.
#[derive(Debug)]
pub struct Exchange {
    strategy: Strategy,
}

impl Default for Exchange {
    /// Clears with the strategy [`ExchangeConfig::default`] selects
    fn default() -> Self {
        let settings = SolverConfig::default().settings();
        let backend = BackendKind::default_backend();
        Self::new(Optimization::new(backend, settings).into())
    }
}

impl Exchange {
    /// Create an exchange that clears with the given strategy
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    /// Create an exchange from its configuration
    pub fn from_config(config: &ExchangeConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.solver.build()?))
    }

    /// The clearing strategy
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Collect, clear, and dispatch one step.
    ///
    /// Requests are gathered from every participant in ascending id order,
    /// then bids (each bidder sees the requests admitted so far). Malformed or
    /// duplicate portfolios are rejected individually and reported; they never
    /// abort the step. The graph is built with each requester's preference
    /// adjustment, solved, and every trade is executed on the bidder and then
    /// on the requester, in trade order.
    pub fn run_exchange(
        &self,
        step: Step,
        participants: &mut [Box<dyn Participant>],
    ) -> Result<StepReport, ExchangeError> {
        let span = span!(Level::INFO, "run_exchange", step);
        let _entered = span.enter();

        let roster = roster(participants)?;
        let positions: Map<ParticipantId, usize> = roster.iter().copied().collect();

        let mut context = ExchangeContext::new(step);
        let mut rejections = Vec::new();

        for &(id, i) in roster.iter() {
            for portfolio in participants[i].get_requests(step) {
                let result = submit(id, portfolio, Side::Request, |portfolio| {
                    context.add_request_portfolio(portfolio)
                });
                reject(result, &mut rejections);
            }
        }

        for &(id, i) in roster.iter() {
            for portfolio in participants[i].get_bids(step, &context) {
                let result = submit(id, portfolio, Side::Bid, |portfolio| {
                    context.add_bid_portfolio(portfolio)
                });
                reject(result, &mut rejections);
            }
        }

        let graph = ExchangeGraph::build_with(&context, |request, bid, preference| {
            match positions.get(&request.requester()) {
                Some(&i) => participants[i].adjust_preference(request, bid, preference),
                None => preference,
            }
        });

        let solution = self.strategy.solve(&graph)?;
        drop(graph);

        for (index, trade) in solution.trades.iter().enumerate() {
            event!(
                Level::TRACE,
                commodity = trade.commodity.as_str(),
                requester = %trade.request.participant,
                bidder = %trade.bid.participant,
                quantity = trade.quantity,
                "dispatching trade"
            );

            // Both sides resolve before either is executed
            let mut sides = [(Role::Bidder, 0), (Role::Requester, 0)];
            for (role, i) in sides.iter_mut() {
                let participant = trade.participant(*role);
                *i = *positions
                    .get(&participant)
                    .ok_or(ExchangeError::UnknownParticipant(participant))?;
            }

            // Debit the supplier before crediting the consumer
            for (role, i) in sides {
                participants[i]
                    .execute_trade(trade, role)
                    .map_err(|source| ExchangeError::Dispatch {
                        participant: trade.participant(role),
                        role,
                        index,
                        trade: trade.clone(),
                        dispatched: solution.trades[..index].to_vec(),
                        source,
                    })?;
            }
        }

        let report = StepReport {
            step,
            total_quantity: solution.total_quantity(),
            total_score: solution.total_score(),
            trades: solution.trades,
            status: solution.status,
            rejections,
        };

        event!(
            Level::INFO,
            strategy = self.strategy.name(),
            status = ?report.status,
            trades = report.trades.len(),
            rejections = report.rejections.len(),
            quantity = report.total_quantity,
            "cleared exchange step"
        );

        Ok(report)
    }
}

// The participants in ascending id order, paired with their roster position
fn roster(
    participants: &[Box<dyn Participant>],
) -> Result<Vec<(ParticipantId, usize)>, ExchangeError> {
    let mut roster = participants
        .iter()
        .enumerate()
        .map(|(i, participant)| (participant.id(), i))
        .collect::<Vec<_>>();
    roster.sort_unstable();

    if let Some(pair) = roster.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(ExchangeError::DuplicateParticipant(pair[0].0));
    }
    Ok(roster)
}

fn submit<T: Member>(
    owner: ParticipantId,
    portfolio: Portfolio<T>,
    side: Side,
    add: impl FnOnce(Portfolio<T>) -> Result<(), SubmissionError>,
) -> Result<(), Rejection> {
    let commodity = portfolio.commodity().clone();
    let result = if portfolio.participant() == owner {
        add(portfolio)
    } else {
        Err(ConstructionError::ForeignParticipant {
            expected: owner,
            found: portfolio.participant(),
        }
        .into())
    };

    result.map_err(|error| Rejection {
        participant: owner,
        commodity,
        side,
        error,
    })
}

fn reject(result: Result<(), Rejection>, rejections: &mut Vec<Rejection>) {
    if let Err(rejection) = result {
        event!(
            Level::WARN,
            participant = %rejection.participant,
            commodity = rejection.commodity.as_str(),
            side = %rejection.side,
            error = %rejection.error,
            "rejected submission"
        );
        rejections.push(rejection);
    }
}
