use dre_core::{
    models::{ParticipantId, Role, Trade},
    ports::TransferError,
};
use dre_solver::SolveError;
use thiserror::Error;

/// The ways a step can be aborted
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Two participants in the roster share an id
    #[error("participant {0} appears more than once in the roster")]
    DuplicateParticipant(ParticipantId),
    /// Clearing failed outright
    #[error(transparent)]
    Solve(#[from] SolveError),
    /// A trade names a participant that is not in the roster
    #[error("trade references participant {0}, who is not in the roster")]
    UnknownParticipant(ParticipantId),
    /// A participant could not carry out its side of a trade.
    ///
    /// Every trade in `dispatched` was applied on both sides. Each trade is
    /// executed on the bidder first, so when `role` is [`Role::Requester`] the
    /// bidder has already given up `trade.quantity` and the caller must
    /// reconcile it. Trades after `trade` were never attempted.
    #[error("participant {participant} failed to execute its {role:?} side of trade {index}")]
    Dispatch {
        /// The participant that failed
        participant: ParticipantId,
        /// The side it failed on
        role: Role,
        /// The failing trade's position in the solution
        index: usize,
        /// The failing trade
        trade: Trade,
        /// The trades applied in full before the failure, in dispatch order
        dispatched: Vec<Trade>,
        /// Its reason
        #[source]
        source: TransferError,
    },
}
