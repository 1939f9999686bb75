use dre_core::models::{ParticipantId, Side};
use dre_solver::{
    ArcId, ExchangeArc, ExchangeGraph, ExchangeNode, GraphError, NodeId, NodeMember, SolveError,
    Strategy,
};
use rstest::*;
use rstest_reuse::{self, *};

use all_solvers::all_strategies;

fn node(side: Side, participant: u64, commodity: &str) -> ExchangeNode {
    ExchangeNode::new(
        side,
        ParticipantId(participant),
        commodity.into(),
        vec![NodeMember {
            quantity: 1.0,
            preference: 1.0,
            exclusive: false,
        }],
        Vec::new(),
        1.0,
    )
}

fn arc(request: usize, bid: usize) -> ExchangeArc {
    ExchangeArc {
        request: NodeId(request),
        request_member: 0,
        bid: NodeId(bid),
        bid_member: 0,
        weight: 1.0,
        max_flow: 1.0,
        exclusive: false,
    }
}

#[apply(all_strategies)]
fn dangling_arc(#[case] strategy: Strategy) {
    let mut graph = ExchangeGraph::new();
    graph.add_node(node(Side::Request, 1, "A"));
    graph.add_arc(arc(0, 7));

    assert_eq!(
        strategy.solve(&graph),
        Err(SolveError::InfeasibleGraph {
            diagnostic: GraphError::DanglingArc {
                arc: ArcId(0),
                node: NodeId(7),
            }
        })
    );
}

#[apply(all_strategies)]
fn cross_commodity_arc(#[case] strategy: Strategy) {
    let mut graph = ExchangeGraph::new();
    graph.add_node(node(Side::Request, 1, "A"));
    graph.add_node(node(Side::Bid, 2, "B"));
    graph.add_arc(arc(0, 1));

    assert_eq!(
        strategy.solve(&graph),
        Err(SolveError::InfeasibleGraph {
            diagnostic: GraphError::CommodityMismatch { arc: ArcId(0) }
        })
    );
}

#[test]
fn same_side_arc() {
    let mut graph = ExchangeGraph::new();
    graph.add_node(node(Side::Request, 1, "A"));
    graph.add_node(node(Side::Request, 2, "A"));
    graph.add_arc(arc(0, 1));

    assert_eq!(
        graph.validate(),
        Err(GraphError::SideMismatch {
            arc: ArcId(0),
            node: NodeId(1),
            side: Side::Bid,
        })
    );
}

#[test]
fn non_finite_capacity() {
    let mut broken = node(Side::Request, 1, "A");
    broken.capacity = f64::NAN;
    let mut graph = ExchangeGraph::new();
    graph.add_node(broken);

    let error = graph.validate().unwrap_err();
    assert!(matches!(
        error,
        GraphError::InvalidCapacity {
            node: NodeId(0),
            ..
        }
    ));
    assert_eq!(error.to_string(), "node 0 has invalid capacity NaN");
}
