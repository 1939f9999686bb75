use super::{Commodity, ParticipantId};

/// Addresses one member of a participant's portfolio for the trade's commodity.
///
/// Since a participant submits at most one portfolio per commodity and side in
/// a step, the participant and the member's position identify the request or
/// bid uniquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRef {
    /// The owner of the portfolio
    pub participant: ParticipantId,
    /// The member's position within the portfolio
    pub position: usize,
}

/// A resolved match between one request and one bid.
///
/// The quantity is strictly positive and never exceeds what either side had
/// left when the trade was made. Partial fulfillment is normal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trade {
    /// The commodity changing hands
    pub commodity: Commodity,
    /// The request being filled
    pub request: ItemRef,
    /// The bid filling it
    pub bid: ItemRef,
    /// The traded quantity
    pub quantity: f64,
    /// The combined preference of the arc the trade was made on
    pub weight: f64,
}

impl Trade {
    /// The trade's contribution to the preference-weighted objective
    pub fn score(&self) -> f64 {
        self.quantity * self.weight
    }

    /// The participant on the given side of the trade
    pub fn participant(&self, role: Role) -> ParticipantId {
        match role {
            Role::Requester => self.request.participant,
            Role::Bidder => self.bid.participant,
        }
    }
}

/// The part a participant plays in a trade being executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Role {
    /// The participant receives the traded quantity
    Requester,
    /// The participant gives up the traded quantity
    Bidder,
}
