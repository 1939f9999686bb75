use super::{Commodity, ConstructionError, ParticipantId, Preference, Specification};

/// A demand-side declaration: a participant wants up to `quantity` of a
/// commodity, from any bid satisfying its specification.
///
/// Requests are assembled with the builder methods below and are immutable
/// once they are added to a portfolio.
#[derive(Debug, Clone)]
pub struct Request {
    requester: ParticipantId,
    commodity: Commodity,
    quantity: f64,
    specification: Specification,
    preference: Preference,
    exclusive: bool,
}

impl Request {
    /// Create a request with a neutral preference that accepts any bid.
    ///
    /// Fails if the quantity is not strictly positive and finite.
    pub fn new(
        requester: ParticipantId,
        commodity: impl Into<Commodity>,
        quantity: f64,
    ) -> Result<Self, ConstructionError> {
        if !(quantity > 0.0 && quantity.is_finite()) {
            return Err(ConstructionError::NonPositiveQuantity(quantity));
        }
        Ok(Self {
            requester,
            commodity: commodity.into(),
            quantity,
            specification: Specification::Any,
            preference: Preference::NEUTRAL,
            exclusive: false,
        })
    }

    /// Set the requester's preference for this request
    pub fn with_preference(mut self, preference: f64) -> Result<Self, ConstructionError> {
        self.preference = Preference::new(preference)?;
        Ok(self)
    }

    /// Restrict the bids that may fill this request
    pub fn with_specification(mut self, specification: Specification) -> Self {
        self.specification = specification;
        self
    }

    /// Mark the request as all-or-nothing: any trade must cover the full
    /// quantity of the smaller side
    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// The participant making the request
    pub fn requester(&self) -> ParticipantId {
        self.requester
    }

    /// The commodity requested
    pub fn commodity(&self) -> &Commodity {
        &self.commodity
    }

    /// The target quantity
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// The predicate bids must satisfy
    pub fn specification(&self) -> &Specification {
        &self.specification
    }

    /// The requester's preference
    pub fn preference(&self) -> Preference {
        self.preference
    }

    /// Whether the request is all-or-nothing
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }
}
