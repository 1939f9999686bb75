use super::{Commodity, ParticipantId};
use thiserror::Error;

/// The ways in which a request, bid, constraint, or portfolio may be malformed.
///
/// These are raised at construction or submission time; a value that fails
/// validation never reaches graph construction.
#[derive(Debug, Error, PartialEq)]
pub enum ConstructionError {
    /// An item was added to a portfolio of a different commodity
    #[error("item for commodity {found} cannot join a portfolio of {expected}")]
    InvalidCommodity {
        /// The portfolio's commodity
        expected: Commodity,
        /// The item's commodity
        found: Commodity,
    },
    /// An item was added to a portfolio owned by another participant
    #[error("item of participant {found} cannot join a portfolio of participant {expected}")]
    ForeignParticipant {
        /// The portfolio's owner
        expected: ParticipantId,
        /// The item's owner
        found: ParticipantId,
    },
    /// A quantity was zero, negative, or not a number
    #[error("quantity must be positive and finite, got {0}")]
    NonPositiveQuantity(f64),
    /// A preference or coefficient was NaN or infinite
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    /// A capacity constraint bound was invalid
    #[error("invalid capacity constraint: {0}")]
    InvalidConstraint(&'static str),
}
