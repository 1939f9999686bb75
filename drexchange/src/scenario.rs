//! The JSON scenario format read by every subcommand.
//!
//! A scenario is a single exchange step written down: the step index and the
//! request and bid portfolios each participant would have submitted.
//!
//! ```json
//! {
//!   "step": 0,
//!   "requests": [
//!     { "participant": 1, "commodity": "fuel",
//!       "members": [{ "quantity": 100, "grades": ["a"] }] }
//!   ],
//!   "bids": [
//!     { "participant": 2, "commodity": "fuel",
//!       "members": [{ "quantity": 60, "preference": 0.9, "grade": "a" }],
//!       "constraints": [{ "limit": 50 }] }
//!   ]
//! }
//! ```

use dre_core::{
    models::{
        Bid, BidPortfolio, CapacityConstraint, Commodity, ConstructionError, ExchangeContext,
        Member, ParticipantId, Portfolio, Request, RequestPortfolio, Role, Side, Specification,
        Step, Trade,
    },
    ports::{Participant, TransferError},
};
use dre_exchange::Rejection;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{Level, event};

/// One exchange step, as submitted
#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// The step index
    #[serde(default)]
    pub step: Step,
    /// Demand-side portfolios
    #[serde(default)]
    pub requests: Vec<PortfolioRecord<RequestRecord>>,
    /// Supply-side portfolios
    #[serde(default)]
    pub bids: Vec<PortfolioRecord<BidRecord>>,
}

/// A portfolio of one participant for one commodity
#[derive(Debug, Deserialize)]
pub struct PortfolioRecord<T> {
    /// The owner
    pub participant: ParticipantId,
    /// The commodity every member trades in
    pub commodity: Commodity,
    /// The members, in position order
    pub members: Vec<T>,
    /// Capacity bounds shared by the members
    #[serde(default)]
    pub constraints: Vec<CapacityConstraint>,
}

/// A request as written in a scenario
#[derive(Debug, Deserialize)]
pub struct RequestRecord {
    /// The quantity wanted
    pub quantity: f64,
    /// The requester's preference; neutral if omitted
    pub preference: Option<f64>,
    /// The acceptable bid grades; any bid if omitted
    pub grades: Option<Vec<String>>,
    /// Whether the request must be filled completely or not at all
    #[serde(default)]
    pub exclusive: bool,
}

/// A bid as written in a scenario
#[derive(Debug, Deserialize)]
pub struct BidRecord {
    /// The quantity offered
    pub quantity: f64,
    /// The bidder's preference; neutral if omitted
    pub preference: Option<f64>,
    /// The grade of the offered resource
    pub grade: Option<String>,
    /// Whether the bid must be taken completely or not at all
    #[serde(default)]
    pub exclusive: bool,
}

/// A written portfolio member that validates into its model
pub trait Record {
    /// The model type
    type Item: Member;

    /// Which side of the exchange the member belongs to
    const SIDE: Side;

    /// Validate and build the member
    fn build(
        self,
        participant: ParticipantId,
        commodity: &Commodity,
    ) -> Result<Self::Item, ConstructionError>;
}

impl Record for RequestRecord {
    type Item = Request;
    const SIDE: Side = Side::Request;

    fn build(
        self,
        participant: ParticipantId,
        commodity: &Commodity,
    ) -> Result<Request, ConstructionError> {
        let mut request = Request::new(participant, commodity.clone(), self.quantity)?
            .with_exclusive(self.exclusive);
        if let Some(preference) = self.preference {
            request = request.with_preference(preference)?;
        }
        if let Some(grades) = self.grades {
            request = request.with_specification(Specification::grades(grades));
        }
        Ok(request)
    }
}

impl Record for BidRecord {
    type Item = Bid;
    const SIDE: Side = Side::Bid;

    fn build(
        self,
        participant: ParticipantId,
        commodity: &Commodity,
    ) -> Result<Bid, ConstructionError> {
        let mut bid =
            Bid::new(participant, commodity.clone(), self.quantity)?.with_exclusive(self.exclusive);
        if let Some(preference) = self.preference {
            bid = bid.with_preference(preference)?;
        }
        if let Some(grade) = self.grade {
            bid = bid.with_grade(grade);
        }
        Ok(bid)
    }
}

impl<T: Record> PortfolioRecord<T> {
    /// Validate every member and constraint; any failure rejects the whole portfolio
    pub fn build(self) -> Result<Portfolio<T::Item>, Rejection> {
        let mut portfolio = Portfolio::new(self.participant, self.commodity.clone());
        let result = self
            .members
            .into_iter()
            .try_for_each(|member| -> Result<(), ConstructionError> {
                portfolio.add(member.build(self.participant, &self.commodity)?)?;
                Ok(())
            })
            .and_then(|()| {
                self.constraints
                    .into_iter()
                    .try_for_each(|constraint| portfolio.add_constraint(constraint))
            });

        match result {
            Ok(()) => Ok(portfolio),
            Err(error) => Err(Rejection {
                participant: self.participant,
                commodity: self.commodity,
                side: T::SIDE,
                error: error.into(),
            }),
        }
    }
}

/// A participant that replays the portfolios written in a scenario
#[derive(Debug)]
pub struct Submitter {
    id: ParticipantId,
    requests: Vec<RequestPortfolio>,
    bids: Vec<BidPortfolio>,
}

impl Submitter {
    fn new(id: ParticipantId) -> Self {
        Self {
            id,
            requests: Vec::new(),
            bids: Vec::new(),
        }
    }
}

impl Participant for Submitter {
    fn id(&self) -> ParticipantId {
        self.id
    }

    fn get_requests(&mut self, _step: Step) -> Vec<RequestPortfolio> {
        std::mem::take(&mut self.requests)
    }

    fn get_bids(&mut self, _step: Step, _context: &ExchangeContext) -> Vec<BidPortfolio> {
        std::mem::take(&mut self.bids)
    }

    // A scenario holds no inventory, so every transfer succeeds
    fn execute_trade(&mut self, trade: &Trade, role: Role) -> Result<(), TransferError> {
        event!(
            Level::TRACE,
            participant = %self.id,
            ?role,
            quantity = trade.quantity,
            "scenario transfer"
        );
        Ok(())
    }
}

impl Scenario {
    fn convert(self) -> (Vec<RequestPortfolio>, Vec<BidPortfolio>, Vec<Rejection>) {
        let mut rejections = Vec::new();
        let requests = collect(self.requests, &mut rejections);
        let bids = collect(self.bids, &mut rejections);
        (requests, bids, rejections)
    }

    /// One participant per distinct id, in ascending id order, together with
    /// the portfolios that failed validation.
    pub fn into_participants(self) -> (Vec<Submitter>, Vec<Rejection>) {
        let (requests, bids, rejections) = self.convert();

        let mut roster = BTreeMap::<ParticipantId, Submitter>::new();
        for portfolio in requests {
            let id = portfolio.participant();
            roster
                .entry(id)
                .or_insert_with(|| Submitter::new(id))
                .requests
                .push(portfolio);
        }
        for portfolio in bids {
            let id = portfolio.participant();
            roster
                .entry(id)
                .or_insert_with(|| Submitter::new(id))
                .bids
                .push(portfolio);
        }

        (roster.into_values().collect(), rejections)
    }

    /// Submit the scenario straight into a context, in file order.
    pub fn into_context(self) -> (ExchangeContext, Vec<Rejection>) {
        let mut context = ExchangeContext::new(self.step);
        let (requests, bids, mut rejections) = self.convert();

        for portfolio in requests {
            let (participant, commodity) = (portfolio.participant(), portfolio.commodity().clone());
            if let Err(error) = context.add_request_portfolio(portfolio) {
                rejections.push(Rejection {
                    participant,
                    commodity,
                    side: Side::Request,
                    error,
                });
            }
        }
        for portfolio in bids {
            let (participant, commodity) = (portfolio.participant(), portfolio.commodity().clone());
            if let Err(error) = context.add_bid_portfolio(portfolio) {
                rejections.push(Rejection {
                    participant,
                    commodity,
                    side: Side::Bid,
                    error,
                });
            }
        }

        (context, rejections)
    }
}

fn collect<T: Record>(
    records: Vec<PortfolioRecord<T>>,
    rejections: &mut Vec<Rejection>,
) -> Vec<Portfolio<T::Item>> {
    let mut portfolios = Vec::with_capacity(records.len());
    for record in records {
        match record.build() {
            Ok(portfolio) => portfolios.push(portfolio),
            Err(rejection) => {
                event!(
                    Level::WARN,
                    participant = %rejection.participant,
                    commodity = rejection.commodity.as_str(),
                    side = %rejection.side,
                    error = %rejection.error,
                    "rejected scenario portfolio"
                );
                rejections.push(rejection);
            }
        }
    }
    portfolios
}
