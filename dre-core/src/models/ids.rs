use std::fmt;

/// A named category of interchangeable resource.
///
/// Commodities carry identity only; the exchange never looks inside one.
/// Ordering is lexicographic and determines the order in which commodities are
/// processed within a step.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Commodity(String);

impl Commodity {
    /// Create a commodity from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name of the commodity
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Commodity {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Commodity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The simulation-assigned identifier of a participant.
///
/// Participant ids are the primary key of every deterministic enumeration in
/// the exchange: portfolios, graph nodes, and therefore arcs are all visited in
/// ascending participant order.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[repr(transparent)]
pub struct ParticipantId(pub u64);

impl From<u64> for ParticipantId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
