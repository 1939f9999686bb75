use super::{ArcId, NodeId};
use dre_core::models::Side;
use thiserror::Error;

/// Diagnostics for a malformed exchange graph.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    /// The arc refers to a node that does not exist or does not list it
    #[error("arc {} references node {}, which does not hold it", .arc.0, .node.0)]
    DanglingArc {
        /// The offending arc
        arc: ArcId,
        /// The missing endpoint
        node: NodeId,
    },
    /// The arc connects two nodes of the same side
    #[error("arc {} expects node {} to be a {side} node", .arc.0, .node.0)]
    SideMismatch {
        /// The offending arc
        arc: ArcId,
        /// The endpoint on the wrong side
        node: NodeId,
        /// The side the endpoint should have
        side: Side,
    },
    /// The arc refers to a member its endpoint does not have
    #[error("arc {} references member {position} of node {}", .arc.0, .node.0)]
    MemberOutOfRange {
        /// The offending arc
        arc: ArcId,
        /// The endpoint
        node: NodeId,
        /// The missing position
        position: usize,
    },
    /// The arc connects nodes of different commodities
    #[error("arc {} connects nodes of different commodities", .arc.0)]
    CommodityMismatch {
        /// The offending arc
        arc: ArcId,
    },
    /// The arc's weight or flow bound is not a finite, non-negative number
    #[error("arc {} has a non-finite weight or invalid flow bound", .arc.0)]
    InvalidArc {
        /// The offending arc
        arc: ArcId,
    },
    /// A node capacity or member quantity is negative or not finite
    #[error("node {} has invalid capacity {capacity}", .node.0)]
    InvalidCapacity {
        /// The offending node
        node: NodeId,
        /// The invalid value
        capacity: f64,
    },
}
