use super::NodeId;

/// The stable index of an arc within its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArcId(pub usize);

/// A compatibility edge between one request member and one bid member.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeArc {
    /// The request-side node
    pub request: NodeId,
    /// The position of the request within its portfolio
    pub request_member: usize,
    /// The bid-side node
    pub bid: NodeId,
    /// The position of the bid within its portfolio
    pub bid_member: usize,
    /// The combined preference of both sides
    pub weight: f64,
    /// The most that may flow across this arc
    pub max_flow: f64,
    /// Whether flow is all-or-nothing (exactly 0 or `max_flow`)
    pub exclusive: bool,
}
