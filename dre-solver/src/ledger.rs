use crate::{ArcId, ExchangeGraph, NodeId};
use dre_core::models::{ItemRef, Trade};

// How many times we are willing to step a quantity down by one ulp before
// giving up on committing it
const MAX_NUDGES: usize = 64;

/// Residual-capacity bookkeeping over an exchange graph.
///
/// The ledger tracks, per node, how much has been allocated to each member,
/// to the node as a whole, and against each of its constraints. Quantities are
/// only ever committed if every bound is still satisfied when re-checked in
/// floating point, so the recorded sums never exceed a capacity.
#[derive(Debug)]
pub struct Ledger<'g> {
    graph: &'g ExchangeGraph,
    members: Vec<Vec<f64>>,
    totals: Vec<f64>,
    constraints: Vec<Vec<f64>>,
    flows: Vec<f64>,
    commits: Vec<(ArcId, f64)>,
}

impl<'g> Ledger<'g> {
    /// Start with nothing allocated
    pub fn new(graph: &'g ExchangeGraph) -> Self {
        let nodes = graph.nodes();
        Self {
            graph,
            members: nodes.iter().map(|n| vec![0.0; n.members.len()]).collect(),
            totals: vec![0.0; nodes.len()],
            constraints: nodes
                .iter()
                .map(|n| vec![0.0; n.constraints.len()])
                .collect(),
            flows: vec![0.0; graph.arcs().len()],
            commits: Vec::new(),
        }
    }

    /// The largest additional quantity the arc can carry without breaking any
    /// bound at either endpoint or on the arc itself.
    pub fn admissible(&self, id: ArcId) -> f64 {
        let arc = &self.graph.arcs()[id.0];
        let request = self.room(arc.request, arc.request_member);
        let bid = self.room(arc.bid, arc.bid_member);
        request
            .min(bid)
            .min(arc.max_flow - self.flows[id.0])
            .max(0.0)
    }

    /// Record up to `quantity` on the arc, returning what was actually
    /// recorded (possibly zero).
    pub fn commit(&mut self, id: ArcId, quantity: f64) -> f64 {
        let mut quantity = quantity.min(self.admissible(id));
        if !(quantity > 0.0) {
            return 0.0;
        }

        let mut nudges = 0;
        while !self.fits(id, quantity) {
            nudges += 1;
            if nudges > MAX_NUDGES {
                return 0.0;
            }
            quantity = quantity.next_down();
            if !(quantity > 0.0) {
                return 0.0;
            }
        }

        self.record(id, quantity);
        quantity
    }

    /// Record exactly `quantity` on the arc if every bound allows it.
    ///
    /// Used for all-or-nothing arcs, which must not be partially filled.
    pub fn commit_exact(&mut self, id: ArcId, quantity: f64) -> bool {
        if quantity > 0.0 && self.fits(id, quantity) {
            self.record(id, quantity);
            true
        } else {
            false
        }
    }

    fn record(&mut self, id: ArcId, quantity: f64) {
        let arc = &self.graph.arcs()[id.0];
        for (node, member) in [(arc.request, arc.request_member), (arc.bid, arc.bid_member)] {
            self.members[node.0][member] += quantity;
            self.totals[node.0] += quantity;
            for (usage, constraint) in self.constraints[node.0]
                .iter_mut()
                .zip(self.graph.nodes()[node.0].constraints.iter())
            {
                *usage += constraint.coefficient(member) * quantity;
            }
        }
        self.flows[id.0] += quantity;
        self.commits.push((id, quantity));
    }

    /// The quantity recorded on an arc so far
    pub fn flow(&self, id: ArcId) -> f64 {
        self.flows[id.0]
    }

    /// The total recorded against a node so far
    pub fn total(&self, id: NodeId) -> f64 {
        self.totals[id.0]
    }

    /// The preference-weighted sum of everything committed
    pub fn score(&self) -> f64 {
        self.commits
            .iter()
            .map(|(id, q)| q * self.graph.arcs()[id.0].weight)
            .sum()
    }

    /// Convert the commits into trades, in commit order
    pub fn into_trades(self) -> Vec<Trade> {
        let graph = self.graph;
        self.commits
            .into_iter()
            .map(|(id, quantity)| {
                let arc = &graph.arcs()[id.0];
                let request = &graph.nodes()[arc.request.0];
                let bid = &graph.nodes()[arc.bid.0];
                Trade {
                    commodity: request.commodity.clone(),
                    request: ItemRef {
                        participant: request.participant,
                        position: arc.request_member,
                    },
                    bid: ItemRef {
                        participant: bid.participant,
                        position: arc.bid_member,
                    },
                    quantity,
                    weight: arc.weight,
                }
            })
            .collect()
    }

    // The remaining room for one member of a node
    fn room(&self, node: NodeId, member: usize) -> f64 {
        let n = &self.graph.nodes()[node.0];
        let mut room = (n.members[member].quantity - self.members[node.0][member])
            .min(n.capacity - self.totals[node.0]);
        for (usage, constraint) in self.constraints[node.0].iter().zip(n.constraints.iter()) {
            let coefficient = constraint.coefficient(member);
            if coefficient > 0.0 {
                room = room.min((constraint.limit() - usage) / coefficient);
            }
        }
        room
    }

    // Re-check every bound touched by adding `quantity` to the arc
    fn fits(&self, id: ArcId, quantity: f64) -> bool {
        let arc = &self.graph.arcs()[id.0];
        if self.flows[id.0] + quantity > arc.max_flow {
            return false;
        }
        [(arc.request, arc.request_member), (arc.bid, arc.bid_member)]
            .into_iter()
            .all(|(node, member)| {
                let n = &self.graph.nodes()[node.0];
                self.members[node.0][member] + quantity <= n.members[member].quantity
                    && self.totals[node.0] + quantity <= n.capacity
                    && self.constraints[node.0]
                        .iter()
                        .zip(n.constraints.iter())
                        .all(|(usage, constraint)| {
                            usage + constraint.coefficient(member) * quantity <= constraint.limit()
                        })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExchangeArc, ExchangeNode, NodeMember};
    use dre_core::models::{CapacityConstraint, ParticipantId, Side};

    fn node(side: Side, participant: u64, quantities: &[f64]) -> ExchangeNode {
        let members = quantities
            .iter()
            .map(|&quantity| NodeMember {
                quantity,
                preference: 1.0,
                exclusive: false,
            })
            .collect::<Vec<_>>();
        let capacity = quantities.iter().sum();
        ExchangeNode::new(
            side,
            ParticipantId(participant),
            "a".into(),
            members,
            Vec::new(),
            capacity,
        )
    }

    fn arc(request: usize, request_member: usize, bid: usize, max_flow: f64) -> ExchangeArc {
        ExchangeArc {
            request: NodeId(request),
            request_member,
            bid: NodeId(bid),
            bid_member: 0,
            weight: 1.0,
            max_flow,
            exclusive: false,
        }
    }

    #[test]
    fn partial_fill_leaves_residual() {
        let mut graph = ExchangeGraph::new();
        graph.add_node(node(Side::Request, 1, &[10.0]));
        graph.add_node(node(Side::Bid, 2, &[4.0]));
        graph.add_node(node(Side::Bid, 3, &[20.0]));
        let first = graph.add_arc(arc(0, 0, 1, 4.0));
        let second = graph.add_arc(arc(0, 0, 2, 10.0));

        let mut ledger = Ledger::new(&graph);
        assert_eq!(ledger.commit(first, 10.0), 4.0);
        assert_eq!(ledger.total(NodeId(0)), 4.0);
        assert_eq!(ledger.admissible(second), 6.0);
        assert_eq!(ledger.commit(second, 100.0), 6.0);
        assert_eq!(ledger.admissible(second), 0.0);
        assert_eq!(ledger.commit(second, 1.0), 0.0);
        assert_eq!(ledger.into_trades().len(), 2);
    }

    #[test]
    fn weighted_constraints_bind() {
        let mut graph = ExchangeGraph::new();
        let mut request = node(Side::Request, 1, &[10.0, 10.0]);
        // member 1 is twice as expensive against a throughput of 12
        request.constraints = vec![CapacityConstraint::weighted(12.0, 1.0, [(1, 2.0)]).unwrap()];
        request.capacity = 12.0;
        graph.add_node(request);
        graph.add_node(node(Side::Bid, 2, &[100.0]));
        graph.add_node(node(Side::Bid, 3, &[100.0]));
        let cheap = graph.add_arc(arc(0, 0, 1, 10.0));
        let dear = graph.add_arc(arc(0, 1, 2, 10.0));

        let mut ledger = Ledger::new(&graph);
        assert_eq!(ledger.commit(cheap, 10.0), 10.0);
        assert_eq!(ledger.admissible(dear), 1.0);
        assert_eq!(ledger.commit(dear, 10.0), 1.0);
        assert_eq!(ledger.score(), 11.0);
    }

    #[test]
    fn sums_never_exceed_capacity() {
        let mut graph = ExchangeGraph::new();
        graph.add_node(node(Side::Request, 1, &[0.3]));
        graph.add_node(node(Side::Bid, 2, &[0.1]));
        graph.add_node(node(Side::Bid, 3, &[0.1]));
        graph.add_node(node(Side::Bid, 4, &[0.1]));
        let arcs = (1..=3)
            .map(|b| graph.add_arc(arc(0, 0, b, 0.1)))
            .collect::<Vec<_>>();

        let mut ledger = Ledger::new(&graph);
        for id in arcs {
            ledger.commit(id, 0.1);
        }
        assert!(ledger.total(NodeId(0)) <= 0.3);
    }
}
