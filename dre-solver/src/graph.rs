use dre_core::models::Side;

mod arc;
pub use arc::{ArcId, ExchangeArc};

mod node;
pub use node::{ExchangeNode, NodeId, NodeMember};

mod builder;

mod error;
pub use error::GraphError;

/// The bipartite structure of request and bid nodes for one step.
///
/// Nodes and arcs live in arenas and are addressed by their stable index, so
/// enumerating either is deterministic: nodes in insertion order (ascending
/// commodity, then requests before bids, then ascending participant), arcs in
/// insertion order (request node, request member, bid node, bid member).
#[derive(Debug, Default)]
pub struct ExchangeGraph {
    nodes: Vec<ExchangeNode>,
    arcs: Vec<ExchangeArc>,
}

impl ExchangeGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, returning its id. Any adjacency already on the node is discarded.
    pub fn add_node(&mut self, mut node: ExchangeNode) -> NodeId {
        node.arcs.clear();
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Append an arc, returning its id.
    ///
    /// The arc is recorded in the adjacency of whichever endpoints exist. No
    /// other validation takes place here; see [`ExchangeGraph::validate`].
    pub fn add_arc(&mut self, arc: ExchangeArc) -> ArcId {
        let id = ArcId(self.arcs.len());
        for endpoint in [arc.request, arc.bid] {
            if let Some(node) = self.nodes.get_mut(endpoint.0) {
                node.arcs.push(id);
            }
        }
        self.arcs.push(arc);
        id
    }

    /// All nodes, indexed by [`NodeId`]
    pub fn nodes(&self) -> &[ExchangeNode] {
        &self.nodes
    }

    /// All arcs, indexed by [`ArcId`]
    pub fn arcs(&self) -> &[ExchangeArc] {
        &self.arcs
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&ExchangeNode> {
        self.nodes.get(id.0)
    }

    /// Look up an arc
    pub fn arc(&self, id: ArcId) -> Option<&ExchangeArc> {
        self.arcs.get(id.0)
    }

    /// Whether the graph has no arcs (and therefore nothing to trade)
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// The arcs ordered by descending weight, breaking ties by ascending
    /// (request node, bid node, arc id).
    ///
    /// This is the processing order of the greedy strategy and the commit
    /// order of the optimization strategy.
    pub fn priority_order(&self) -> Vec<ArcId> {
        let mut order = (0..self.arcs.len()).map(ArcId).collect::<Vec<_>>();
        order.sort_by(|&a, &b| {
            let (x, y) = (&self.arcs[a.0], &self.arcs[b.0]);
            y.weight
                .total_cmp(&x.weight)
                .then(x.request.cmp(&y.request))
                .then(x.bid.cmp(&y.bid))
                .then(a.cmp(&b))
        });
        order
    }

    /// Check that the graph is well formed.
    ///
    /// A graph produced by the builder always passes. Failures indicate a
    /// construction defect and carry a diagnostic naming the offending arc or
    /// node.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index);
            if !(node.capacity >= 0.0 && node.capacity.is_finite()) {
                return Err(GraphError::InvalidCapacity {
                    node: id,
                    capacity: node.capacity,
                });
            }
            for member in node.members.iter() {
                if !(member.quantity > 0.0 && member.quantity.is_finite()) {
                    return Err(GraphError::InvalidCapacity {
                        node: id,
                        capacity: member.quantity,
                    });
                }
            }
        }

        for (index, arc) in self.arcs.iter().enumerate() {
            let id = ArcId(index);
            let request = self.endpoint(id, arc.request, arc.request_member, Side::Request)?;
            let bid = self.endpoint(id, arc.bid, arc.bid_member, Side::Bid)?;
            if request.commodity != bid.commodity {
                return Err(GraphError::CommodityMismatch { arc: id });
            }
            if !(arc.max_flow >= 0.0 && arc.max_flow.is_finite() && arc.weight.is_finite()) {
                return Err(GraphError::InvalidArc { arc: id });
            }
        }

        Ok(())
    }

    fn endpoint(
        &self,
        arc: ArcId,
        node: NodeId,
        member: usize,
        side: Side,
    ) -> Result<&ExchangeNode, GraphError> {
        let endpoint = self
            .nodes
            .get(node.0)
            .ok_or(GraphError::DanglingArc { arc, node })?;
        if endpoint.side != side {
            return Err(GraphError::SideMismatch { arc, node, side });
        }
        if member >= endpoint.members.len() {
            return Err(GraphError::MemberOutOfRange {
                arc,
                node,
                position: member,
            });
        }
        if !endpoint.arcs.contains(&arc) {
            return Err(GraphError::DanglingArc { arc, node });
        }
        Ok(endpoint)
    }
}
