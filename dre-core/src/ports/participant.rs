use crate::models::{
    Bid, BidPortfolio, ExchangeContext, ParticipantId, Request, RequestPortfolio, Role, Side, Step,
    Trade,
};
use thiserror::Error;

/// The interface a simulated participant exposes to the exchange.
///
/// Each step the exchange first gathers every participant's requests, then
/// every participant's bids (bidders may inspect the requests already
/// collected), builds and solves the exchange graph, and finally calls
/// [`Participant::execute_trade`] once per trade on each of the two
/// participants involved.
pub trait Participant {
    /// The participant's simulation-wide identifier
    fn id(&self) -> ParticipantId;

    /// Request portfolios for this step, at most one per commodity.
    fn get_requests(&mut self, step: Step) -> Vec<RequestPortfolio> {
        let _ = step;
        Vec::new()
    }

    /// Bid portfolios for this step, at most one per commodity.
    ///
    /// `context` holds every request admitted so far in the step.
    fn get_bids(&mut self, step: Step, context: &ExchangeContext) -> Vec<BidPortfolio> {
        let _ = (step, context);
        Vec::new()
    }

    /// Adjust this participant's preference for filling `request` with `bid`.
    ///
    /// Called on the requester for every candidate arc during graph
    /// construction. Returning a negative value removes the arc.
    fn adjust_preference(&self, request: &Request, bid: &Bid, preference: f64) -> f64 {
        let _ = (request, bid);
        preference
    }

    /// Apply the participant's side of a trade: a bidder gives up the traded
    /// quantity, a requester receives it.
    fn execute_trade(&mut self, trade: &Trade, role: Role) -> Result<(), TransferError>;
}

/// The ways a participant may refuse to carry out its side of a trade.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The bidder no longer holds enough of the resource
    #[error("participant {participant} holds {available} but the trade requires {required}")]
    Insufficient {
        /// The participant that came up short
        participant: ParticipantId,
        /// What it actually holds
        available: f64,
        /// What the trade asked for
        required: f64,
    },
    /// The trade refers to a member the participant never submitted
    #[error("participant {participant} has no {side} at position {position}")]
    UnknownItem {
        /// The participant addressed
        participant: ParticipantId,
        /// The side of the missing member
        side: Side,
        /// The missing position
        position: usize,
    },
    /// Any other participant-specific failure
    #[error("{0}")]
    Other(String),
}
