use super::ArcId;
use dre_core::models::{CapacityConstraint, Commodity, ParticipantId, Side};

/// The stable index of a node within its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// The part of a request or bid that matters once it is in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMember {
    /// The requested or offered quantity
    pub quantity: f64,
    /// The owner's stated preference
    pub preference: f64,
    /// Whether trades against the member are all-or-nothing
    pub exclusive: bool,
}

/// A graph vertex wrapping one portfolio.
#[derive(Debug, Clone)]
pub struct ExchangeNode {
    /// Whether the node demands or supplies
    pub side: Side,
    /// The owner of the wrapped portfolio
    pub participant: ParticipantId,
    /// The commodity of the wrapped portfolio
    pub commodity: Commodity,
    /// The portfolio's members, by position
    pub members: Vec<NodeMember>,
    /// The portfolio's joint constraints
    pub constraints: Vec<CapacityConstraint>,
    /// The portfolio's residual capacity at the zero baseline
    pub capacity: f64,
    /// Incident arcs in insertion order
    pub(crate) arcs: Vec<ArcId>,
}

impl ExchangeNode {
    /// Create a node with no adjacency
    pub fn new(
        side: Side,
        participant: ParticipantId,
        commodity: Commodity,
        members: Vec<NodeMember>,
        constraints: Vec<CapacityConstraint>,
        capacity: f64,
    ) -> Self {
        Self {
            side,
            participant,
            commodity,
            members,
            constraints,
            capacity,
            arcs: Vec::new(),
        }
    }

    /// The arcs incident to this node
    pub fn arcs(&self) -> &[ArcId] {
        &self.arcs
    }
}
