use super::{Commodity, ConstructionError, ParticipantId, Preference};

/// A supply-side declaration: a participant offers up to `quantity` of a
/// commodity.
#[derive(Debug, Clone)]
pub struct Bid {
    bidder: ParticipantId,
    commodity: Commodity,
    quantity: f64,
    grade: Option<String>,
    preference: Preference,
    exclusive: bool,
}

impl Bid {
    /// Create an ungraded bid with a neutral preference.
    ///
    /// Fails if the quantity is not strictly positive and finite.
    pub fn new(
        bidder: ParticipantId,
        commodity: impl Into<Commodity>,
        quantity: f64,
    ) -> Result<Self, ConstructionError> {
        if !(quantity > 0.0 && quantity.is_finite()) {
            return Err(ConstructionError::NonPositiveQuantity(quantity));
        }
        Ok(Self {
            bidder,
            commodity: commodity.into(),
            quantity,
            grade: None,
            preference: Preference::NEUTRAL,
            exclusive: false,
        })
    }

    /// Set the bidder's preference for this bid
    pub fn with_preference(mut self, preference: f64) -> Result<Self, ConstructionError> {
        self.preference = Preference::new(preference)?;
        Ok(self)
    }

    /// Describe the offered resource for specification matching
    pub fn with_grade(mut self, grade: impl Into<String>) -> Self {
        self.grade = Some(grade.into());
        self
    }

    /// Mark the bid as all-or-nothing
    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// The participant making the offer
    pub fn bidder(&self) -> ParticipantId {
        self.bidder
    }

    /// The commodity offered
    pub fn commodity(&self) -> &Commodity {
        &self.commodity
    }

    /// The offered quantity
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// The grade of the offered resource, if any
    pub fn grade(&self) -> Option<&str> {
        self.grade.as_deref()
    }

    /// The bidder's preference
    pub fn preference(&self) -> Preference {
        self.preference
    }

    /// Whether the bid is all-or-nothing
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }
}
