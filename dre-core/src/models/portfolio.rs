use super::{
    Bid, CapacityConstraint, Commodity, ConstructionError, ParticipantId, Preference, Request,
};

/// The common view of requests and bids taken by portfolios and the graph builder.
pub trait Member {
    /// The participant that owns the item
    fn participant(&self) -> ParticipantId;
    /// The commodity of the item
    fn commodity(&self) -> &Commodity;
    /// The requested or offered quantity
    fn quantity(&self) -> f64;
    /// The owner's preference for the item
    fn preference(&self) -> Preference;
    /// Whether trades against the item are all-or-nothing
    fn is_exclusive(&self) -> bool;
}

impl Member for Request {
    fn participant(&self) -> ParticipantId {
        self.requester()
    }
    fn commodity(&self) -> &Commodity {
        Request::commodity(self)
    }
    fn quantity(&self) -> f64 {
        Request::quantity(self)
    }
    fn preference(&self) -> Preference {
        Request::preference(self)
    }
    fn is_exclusive(&self) -> bool {
        Request::is_exclusive(self)
    }
}

impl Member for Bid {
    fn participant(&self) -> ParticipantId {
        self.bidder()
    }
    fn commodity(&self) -> &Commodity {
        Bid::commodity(self)
    }
    fn quantity(&self) -> f64 {
        Bid::quantity(self)
    }
    fn preference(&self) -> Preference {
        Bid::preference(self)
    }
    fn is_exclusive(&self) -> bool {
        Bid::is_exclusive(self)
    }
}

/// An ordered group of same-commodity items from one participant, together
/// with the joint capacity constraints that bind them.
///
/// Members keep their insertion position for the life of the portfolio; trades
/// refer back to members by that position.
#[derive(Debug, Clone)]
pub struct Portfolio<T> {
    participant: ParticipantId,
    commodity: Commodity,
    members: Vec<T>,
    constraints: Vec<CapacityConstraint>,
}

/// A participant's requests for one commodity
pub type RequestPortfolio = Portfolio<Request>;

/// A participant's bids for one commodity
pub type BidPortfolio = Portfolio<Bid>;

impl<T: Member> Portfolio<T> {
    /// Create an empty portfolio
    pub fn new(participant: ParticipantId, commodity: impl Into<Commodity>) -> Self {
        Self {
            participant,
            commodity: commodity.into(),
            members: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Append an item, returning its position.
    ///
    /// Fails if the item is for a different commodity or owned by a different
    /// participant than the portfolio.
    pub fn add(&mut self, item: T) -> Result<usize, ConstructionError> {
        if item.commodity() != &self.commodity {
            return Err(ConstructionError::InvalidCommodity {
                expected: self.commodity.clone(),
                found: item.commodity().clone(),
            });
        }
        if item.participant() != self.participant {
            return Err(ConstructionError::ForeignParticipant {
                expected: self.participant,
                found: item.participant(),
            });
        }
        self.members.push(item);
        Ok(self.members.len() - 1)
    }

    /// Attach a capacity constraint.
    ///
    /// Coefficients for positions that do not (yet) hold a member are allowed
    /// and simply never contribute.
    pub fn add_constraint(
        &mut self,
        constraint: CapacityConstraint,
    ) -> Result<(), ConstructionError> {
        if constraint.limit() < 0.0 || !constraint.limit().is_finite() {
            return Err(ConstructionError::InvalidConstraint("limit must be non-negative"));
        }
        self.constraints.push(constraint);
        Ok(())
    }

    /// Builder-style variant of [`Portfolio::add`]
    pub fn with(mut self, item: T) -> Result<Self, ConstructionError> {
        self.add(item)?;
        Ok(self)
    }

    /// Builder-style variant of [`Portfolio::add_constraint`]
    pub fn with_constraint(
        mut self,
        constraint: CapacityConstraint,
    ) -> Result<Self, ConstructionError> {
        self.add_constraint(constraint)?;
        Ok(self)
    }

    /// The owning participant
    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    /// The portfolio's commodity
    pub fn commodity(&self) -> &Commodity {
        &self.commodity
    }

    /// The members in insertion order
    pub fn members(&self) -> &[T] {
        &self.members
    }

    /// The attached constraints
    pub fn constraints(&self) -> &[CapacityConstraint] {
        &self.constraints
    }

    /// The number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the portfolio has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The total quantity that can still be transacted, given that
    /// `trial[i]` has already been allocated to member `i`.
    ///
    /// This is the smaller of the members' open quantity and, for each
    /// constraint, the most that constraint admits: its headroom is spent on
    /// open members in ascending coefficient order, each up to its open
    /// quantity. Members with a zero coefficient are free under that
    /// constraint. The bound is exact for a single constraint. Missing trial
    /// entries count as zero.
    pub fn residual_capacity(&self, trial: &[f64]) -> f64 {
        let allocated = |position: usize| trial.get(position).copied().unwrap_or(0.0);

        let open = self
            .members
            .iter()
            .enumerate()
            .map(|(position, member)| (member.quantity() - allocated(position)).max(0.0))
            .collect::<Vec<_>>();

        let mut residual: f64 = open.iter().sum();

        for constraint in self.constraints.iter() {
            let mut order = open
                .iter()
                .enumerate()
                .filter(|&(_, &quantity)| quantity > 0.0)
                .map(|(position, &quantity)| (constraint.coefficient(position), quantity))
                .collect::<Vec<_>>();
            order.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut headroom = constraint.headroom(trial).max(0.0);
            let mut admitted = 0.0;
            for (coefficient, quantity) in order {
                if coefficient > 0.0 {
                    let take = quantity.min(headroom / coefficient);
                    headroom = (headroom - take * coefficient).max(0.0);
                    admitted += take;
                } else {
                    admitted += quantity;
                }
            }

            residual = residual.min(admitted);
        }

        residual.max(0.0)
    }

    /// The residual capacity before anything has been allocated
    pub fn capacity(&self) -> f64 {
        self.residual_capacity(&[])
    }

    /// Whether the given allocation satisfies every member quantity and constraint
    pub fn evaluate(&self, quantities: &[f64]) -> bool {
        let members = quantities
            .iter()
            .enumerate()
            .all(|(position, &q)| {
                q >= 0.0
                    && self
                        .members
                        .get(position)
                        .is_some_and(|m| q <= m.quantity())
            });
        members && self.constraints.iter().all(|c| c.evaluate(quantities))
    }
}
