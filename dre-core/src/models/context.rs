use super::{
    BidPortfolio, Commodity, ConstructionError, Map, Member, ParticipantId, Portfolio,
    RequestPortfolio, Set,
};
use std::fmt;
use thiserror::Error;

/// The index of a simulation time step
pub type Step = u64;

/// Which side of the exchange a submission belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Side {
    /// Demand
    Request,
    /// Supply
    Bid,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => "request",
            Self::Bid => "bid",
        }
        .fmt(f)
    }
}

/// The reasons a portfolio submission may be rejected.
///
/// A rejection only ever affects the offending submission; the rest of the
/// step proceeds.
#[derive(Debug, Error, PartialEq)]
pub enum SubmissionError {
    /// The participant already submitted a portfolio for this commodity and side
    #[error("participant {participant} already submitted a {side} portfolio for {commodity}")]
    Duplicate {
        /// The offending participant
        participant: ParticipantId,
        /// The commodity of the repeated submission
        commodity: Commodity,
        /// The side of the repeated submission
        side: Side,
    },
    /// The portfolio or one of its items failed validation
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Every portfolio submitted during one step, indexed by commodity.
///
/// A context lives for exactly one step: it is built from scratch as
/// participants submit and is dropped once the step's trades are dispatched.
/// At most one portfolio per participant, commodity, and side is admitted.
#[derive(Debug, Default)]
pub struct ExchangeContext {
    step: Step,
    requests: Map<Commodity, Map<ParticipantId, RequestPortfolio>>,
    bids: Map<Commodity, Map<ParticipantId, BidPortfolio>>,
}

impl ExchangeContext {
    /// Create an empty context for the given step
    pub fn new(step: Step) -> Self {
        Self {
            step,
            requests: Map::default(),
            bids: Map::default(),
        }
    }

    /// The step this context collects submissions for
    pub fn step(&self) -> Step {
        self.step
    }

    /// Submit a participant's requests for one commodity
    pub fn add_request_portfolio(
        &mut self,
        portfolio: RequestPortfolio,
    ) -> Result<(), SubmissionError> {
        insert(&mut self.requests, portfolio, Side::Request)
    }

    /// Submit a participant's bids for one commodity
    pub fn add_bid_portfolio(&mut self, portfolio: BidPortfolio) -> Result<(), SubmissionError> {
        insert(&mut self.bids, portfolio, Side::Bid)
    }

    /// The commodities with at least one submission, in ascending order
    pub fn commodities(&self) -> Vec<&Commodity> {
        let mut commodities = self
            .requests
            .keys()
            .chain(self.bids.keys())
            .collect::<Set<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        commodities.sort_unstable();
        commodities
    }

    /// The request portfolios for a commodity, in ascending participant order
    pub fn requests(&self, commodity: &Commodity) -> Vec<&RequestPortfolio> {
        sorted(self.requests.get(commodity))
    }

    /// The bid portfolios for a commodity, in ascending participant order
    pub fn bids(&self, commodity: &Commodity) -> Vec<&BidPortfolio> {
        sorted(self.bids.get(commodity))
    }

    /// Look up a participant's request portfolio for a commodity
    pub fn request_portfolio(
        &self,
        participant: ParticipantId,
        commodity: &Commodity,
    ) -> Option<&RequestPortfolio> {
        self.requests.get(commodity)?.get(&participant)
    }

    /// Look up a participant's bid portfolio for a commodity
    pub fn bid_portfolio(
        &self,
        participant: ParticipantId,
        commodity: &Commodity,
    ) -> Option<&BidPortfolio> {
        self.bids.get(commodity)?.get(&participant)
    }

    /// The total number of admitted portfolios on both sides
    pub fn len(&self) -> usize {
        self.requests.values().map(|x| x.len()).sum::<usize>()
            + self.bids.values().map(|x| x.len()).sum::<usize>()
    }

    /// Whether nothing has been submitted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn insert<T: Member>(
    index: &mut Map<Commodity, Map<ParticipantId, Portfolio<T>>>,
    portfolio: Portfolio<T>,
    side: Side,
) -> Result<(), SubmissionError> {
    let participant = portfolio.participant();
    let by_participant = index.entry(portfolio.commodity().clone()).or_default();
    match by_participant.entry(participant) {
        indexmap::map::Entry::Occupied(_) => Err(SubmissionError::Duplicate {
            participant,
            commodity: portfolio.commodity().clone(),
            side,
        }),
        indexmap::map::Entry::Vacant(entry) => {
            entry.insert(portfolio);
            Ok(())
        }
    }
}

fn sorted<T>(portfolios: Option<&Map<ParticipantId, Portfolio<T>>>) -> Vec<&Portfolio<T>> {
    let mut list = portfolios
        .map(|by_participant| by_participant.iter().collect::<Vec<_>>())
        .unwrap_or_default();
    list.sort_unstable_by_key(|(participant, _)| **participant);
    list.into_iter().map(|(_, portfolio)| portfolio).collect()
}
