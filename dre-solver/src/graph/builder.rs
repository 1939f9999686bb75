use super::{ExchangeArc, ExchangeGraph, ExchangeNode, NodeId, NodeMember};
use dre_core::models::{Bid, ExchangeContext, Member, Portfolio, Preference, Request, Side};
use tracing::{Level, event};

impl ExchangeGraph {
    /// Build the exchange graph for a step, using each request's stated preference.
    pub fn build(context: &ExchangeContext) -> Self {
        Self::build_with(context, |_, _, preference| preference)
    }

    /// Build the exchange graph for a step.
    ///
    /// `adjust` receives every compatible (request, bid) pair together with
    /// the request's preference and returns the request-side preference to
    /// use for that arc; a negative result removes the arc.
    ///
    /// Commodities never cross-match. Within a commodity, every request member
    /// is paired with every bid member whose grade the request's specification
    /// accepts, including the requester's own bids. The arc weight is
    /// [`Preference::combine`] of the two sides.
    pub fn build_with(
        context: &ExchangeContext,
        adjust: impl Fn(&Request, &Bid, f64) -> f64,
    ) -> Self {
        let mut graph = Self::new();

        for commodity in context.commodities() {
            let requests = context
                .requests(commodity)
                .into_iter()
                .filter(|portfolio| !portfolio.is_empty())
                .map(|portfolio| (graph.add_node(node(Side::Request, portfolio)), portfolio))
                .collect::<Vec<_>>();

            let bids = context
                .bids(commodity)
                .into_iter()
                .filter(|portfolio| !portfolio.is_empty())
                .map(|portfolio| (graph.add_node(node(Side::Bid, portfolio)), portfolio))
                .collect::<Vec<_>>();

            let before = graph.arcs.len();

            for &(request_node, request_portfolio) in requests.iter() {
                for (request_member, request) in request_portfolio.members().iter().enumerate() {
                    for &(bid_node, bid_portfolio) in bids.iter() {
                        for (bid_member, bid) in bid_portfolio.members().iter().enumerate() {
                            if let Some(arc) = graph.candidate(
                                (request_node, request_member, request),
                                (bid_node, bid_member, bid),
                                &adjust,
                            ) {
                                graph.add_arc(arc);
                            }
                        }
                    }
                }
            }

            event!(
                Level::DEBUG,
                commodity = commodity.as_str(),
                requests = requests.len(),
                bids = bids.len(),
                arcs = graph.arcs.len() - before,
                "built exchange subgraph"
            );
        }

        graph
    }

    // Decide whether a request/bid pair becomes an arc, and with which bounds
    fn candidate(
        &self,
        (request_node, request_member, request): (NodeId, usize, &Request),
        (bid_node, bid_member, bid): (NodeId, usize, &Bid),
        adjust: &impl Fn(&Request, &Bid, f64) -> f64,
    ) -> Option<ExchangeArc> {
        if !request.specification().accepts(bid) {
            return None;
        }

        let preference = adjust(request, bid, request.preference().value());
        let weight = Preference::combine(preference, bid.preference().value())?;

        let exclusive = request.is_exclusive() || bid.is_exclusive();
        let pair = request.quantity().min(bid.quantity());
        let room = self.nodes[request_node.0]
            .capacity
            .min(self.nodes[bid_node.0].capacity);

        let max_flow = if exclusive {
            // All-or-nothing arcs that cannot fit their endpoints are useless
            if pair > room {
                return None;
            }
            pair
        } else {
            pair.min(room)
        };

        if max_flow > 0.0 {
            Some(ExchangeArc {
                request: request_node,
                request_member,
                bid: bid_node,
                bid_member,
                weight,
                max_flow,
                exclusive,
            })
        } else {
            None
        }
    }
}

fn node<T: Member>(side: Side, portfolio: &Portfolio<T>) -> ExchangeNode {
    let members = portfolio
        .members()
        .iter()
        .map(|member| NodeMember {
            quantity: member.quantity(),
            preference: member.preference().value(),
            exclusive: member.is_exclusive(),
        })
        .collect();

    ExchangeNode::new(
        side,
        portfolio.participant(),
        portfolio.commodity().clone(),
        members,
        portfolio.constraints().to_vec(),
        portfolio.capacity(),
    )
}
