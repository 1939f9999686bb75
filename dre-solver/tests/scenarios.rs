use approx::assert_abs_diff_eq;
use dre_core::models::{
    Bid, BidPortfolio, CapacityConstraint, ConstructionError, ExchangeContext, ItemRef,
    ParticipantId, Request, RequestPortfolio, Trade,
};
use dre_solver::{ExchangeGraph, SolveStatus, Strategy};
use rstest::*;
use rstest_reuse::{self, *};

use all_solvers::all_strategies;

fn request(participant: u64, commodity: &str, quantity: f64, preference: f64) -> Request {
    Request::new(ParticipantId(participant), commodity, quantity)
        .unwrap()
        .with_preference(preference)
        .unwrap()
}

fn bid(participant: u64, commodity: &str, quantity: f64, preference: f64) -> Bid {
    Bid::new(ParticipantId(participant), commodity, quantity)
        .unwrap()
        .with_preference(preference)
        .unwrap()
}

fn single<T: dre_core::models::Member>(item: T) -> dre_core::models::Portfolio<T> {
    dre_core::models::Portfolio::new(item.participant(), item.commodity().clone())
        .with(item)
        .unwrap()
}

fn quantity_between(trades: &[Trade], request: u64, bid: u64) -> f64 {
    trades
        .iter()
        .filter(|t| t.request.participant.0 == request && t.bid.participant.0 == bid)
        .map(|t| t.quantity)
        .sum()
}

#[fixture]
fn hundred_sixty_sixty() -> ExchangeContext {
    let mut context = ExchangeContext::new(0);
    context
        .add_request_portfolio(single(request(1, "A", 100.0, 1.0)))
        .unwrap();
    context
        .add_bid_portfolio(single(bid(2, "A", 60.0, 0.9)))
        .unwrap();
    context
        .add_bid_portfolio(single(bid(3, "A", 60.0, 0.5)))
        .unwrap();
    context
}

#[apply(all_strategies)]
fn prefers_the_better_bid(#[case] strategy: Strategy, hundred_sixty_sixty: ExchangeContext) {
    let graph = ExchangeGraph::build(&hundred_sixty_sixty);
    let solution = strategy.solve(&graph).unwrap();

    assert_abs_diff_eq!(solution.total_quantity(), 100.0, epsilon = 1e-6);
    assert_abs_diff_eq!(
        quantity_between(&solution.trades, 1, 2),
        60.0,
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(
        quantity_between(&solution.trades, 1, 3),
        40.0,
        epsilon = 1e-6
    );
    // 60 · 0.95 + 40 · 0.75
    assert_abs_diff_eq!(solution.total_score(), 87.0, epsilon = 1e-6);
}

#[rstest]
fn greedy_trades_in_priority_order(hundred_sixty_sixty: ExchangeContext) {
    let graph = ExchangeGraph::build(&hundred_sixty_sixty);
    let solution = Strategy::Greedy.solve(&graph).unwrap();
    assert_eq!(solution.status, SolveStatus::Heuristic);

    let pairs = solution
        .trades
        .iter()
        .map(|t| (t.request, t.bid, t.quantity))
        .collect::<Vec<_>>();
    let item = |participant| ItemRef {
        participant: ParticipantId(participant),
        position: 0,
    };
    assert_eq!(
        pairs,
        vec![(item(1), item(2), 60.0), (item(1), item(3), 40.0)]
    );
    assert_abs_diff_eq!(solution.trades[0].weight, 0.95, epsilon = 1e-12);
    assert_abs_diff_eq!(solution.trades[1].weight, 0.75, epsilon = 1e-12);
}

#[apply(all_strategies)]
fn partial_fulfillment(#[case] strategy: Strategy) {
    // The small bid fills 4 of 10; the residual 6 goes to the less preferred bid
    let mut context = ExchangeContext::new(0);
    context
        .add_request_portfolio(single(request(1, "A", 10.0, 1.0)))
        .unwrap();
    context
        .add_bid_portfolio(single(bid(2, "A", 4.0, 1.0)))
        .unwrap();
    context
        .add_bid_portfolio(single(bid(3, "A", 20.0, 0.2)))
        .unwrap();

    let solution = strategy.solve(&ExchangeGraph::build(&context)).unwrap();
    assert_abs_diff_eq!(
        quantity_between(&solution.trades, 1, 2),
        4.0,
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(
        quantity_between(&solution.trades, 1, 3),
        6.0,
        epsilon = 1e-6
    );
}

#[apply(all_strategies)]
fn no_arcs_is_not_an_error(#[case] strategy: Strategy) {
    let mut context = ExchangeContext::new(0);
    context
        .add_request_portfolio(single(request(1, "A", 10.0, 1.0)))
        .unwrap();
    context
        .add_bid_portfolio(single(bid(2, "B", 10.0, 1.0)))
        .unwrap();

    let graph = ExchangeGraph::build(&context);
    assert!(graph.is_empty());
    let solution = strategy.solve(&graph).unwrap();
    assert!(solution.trades.is_empty());
    assert_ne!(
        solution.status,
        SolveStatus::Degraded {
            reason: dre_solver::Exhaustion::TimeLimit
        }
    );
}

#[apply(all_strategies)]
fn mutual_requests_share_a_total(#[case] strategy: Strategy) {
    // Two alternative requests for the same need of 12
    let portfolio = RequestPortfolio::new(ParticipantId(1), "A")
        .with(request(1, "A", 10.0, 1.0))
        .unwrap()
        .with(request(1, "A", 10.0, 0.5))
        .unwrap()
        .with_constraint(CapacityConstraint::total(12.0).unwrap())
        .unwrap();

    let mut context = ExchangeContext::new(0);
    context.add_request_portfolio(portfolio).unwrap();
    context
        .add_bid_portfolio(single(bid(2, "A", 50.0, 1.0)))
        .unwrap();

    let solution = strategy.solve(&ExchangeGraph::build(&context)).unwrap();
    let by_position = |position| -> f64 {
        solution
            .trades
            .iter()
            .filter(|t| t.request.position == position)
            .map(|t| t.quantity)
            .sum()
    };
    assert!(solution.total_quantity() <= 12.0);
    assert_abs_diff_eq!(by_position(0), 10.0, epsilon = 1e-6);
    assert_abs_diff_eq!(by_position(1), 2.0, epsilon = 1e-6);
}

#[apply(all_strategies)]
fn weighted_bid_constraint(#[case] strategy: Strategy) {
    // A facility whose second product costs three units of throughput each
    let portfolio = BidPortfolio::new(ParticipantId(2), "A")
        .with(bid(2, "A", 10.0, 1.0))
        .unwrap()
        .with(bid(2, "A", 10.0, 1.0))
        .unwrap()
        .with_constraint(CapacityConstraint::weighted(15.0, 1.0, [(1, 3.0)]).unwrap())
        .unwrap();

    let mut context = ExchangeContext::new(0);
    context
        .add_request_portfolio(single(request(1, "A", 30.0, 1.0)))
        .unwrap();
    context.add_bid_portfolio(portfolio).unwrap();

    let solution = strategy.solve(&ExchangeGraph::build(&context)).unwrap();
    let quantities = [0, 1].map(|position| {
        solution
            .trades
            .iter()
            .filter(|t| t.bid.position == position)
            .map(|t| t.quantity)
            .sum::<f64>()
    });
    assert!(quantities[0] + 3.0 * quantities[1] <= 15.0 + 1e-9);
    assert_abs_diff_eq!(quantities[0], 10.0, epsilon = 1e-6);
    assert_abs_diff_eq!(quantities[1], 5.0 / 3.0, epsilon = 1e-6);
}

#[apply(all_strategies)]
fn a_store_can_supply_itself(#[case] strategy: Strategy) {
    let mut context = ExchangeContext::new(0);
    context
        .add_request_portfolio(single(request(1, "A", 5.0, 1.0)))
        .unwrap();
    context
        .add_bid_portfolio(single(bid(1, "A", 5.0, 1.0)))
        .unwrap();

    let solution = strategy.solve(&ExchangeGraph::build(&context)).unwrap();
    assert_abs_diff_eq!(
        quantity_between(&solution.trades, 1, 1),
        5.0,
        epsilon = 1e-6
    );
}

#[apply(all_strategies)]
fn deterministic(#[case] strategy: Strategy, hundred_sixty_sixty: ExchangeContext) {
    let first = strategy
        .solve(&ExchangeGraph::build(&hundred_sixty_sixty))
        .unwrap();
    let second = strategy
        .solve(&ExchangeGraph::build(&hundred_sixty_sixty))
        .unwrap();
    assert_eq!(first, second);
    assert!(first.trades.iter().all(|trade| trade.quantity > 0.0));
}

#[test]
fn commodity_mismatch_never_reaches_the_graph() {
    let mut portfolio = RequestPortfolio::new(ParticipantId(1), "A");
    let result = portfolio.add(request(1, "B", 10.0, 1.0));
    assert_eq!(
        result,
        Err(ConstructionError::InvalidCommodity {
            expected: "A".into(),
            found: "B".into(),
        })
    );
    assert!(portfolio.is_empty());

    // An empty portfolio contributes no node
    let mut context = ExchangeContext::new(0);
    context.add_request_portfolio(portfolio).unwrap();
    assert!(ExchangeGraph::build(&context).nodes().is_empty());
}
