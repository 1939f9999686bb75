use super::{Bid, Set};
use std::{fmt, sync::Arc};

/// A request's predicate over the bids that may fill it.
///
/// The exchange only ever asks whether a bid satisfies a specification. The
/// bid's grade is the read-only description of the offered resource that the
/// resource layer exposes for this purpose.
#[derive(Debug, Clone, Default)]
pub enum Specification {
    /// Any bid of the right commodity is acceptable
    #[default]
    Any,
    /// The bid's grade must be one of these
    Grades(Set<String>),
    /// An arbitrary predicate supplied by the requester
    Custom(Predicate),
}

impl Specification {
    /// Accept only bids carrying one of the given grades
    pub fn grades<T: Into<String>>(grades: impl IntoIterator<Item = T>) -> Self {
        Self::Grades(grades.into_iter().map(Into::into).collect())
    }

    /// Accept bids for which `f` returns true
    pub fn custom(f: impl Fn(&Bid) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Predicate(Arc::new(f)))
    }

    /// Whether `bid` satisfies this specification
    pub fn accepts(&self, bid: &Bid) -> bool {
        match self {
            Self::Any => true,
            Self::Grades(grades) => bid.grade().is_some_and(|grade| grades.contains(grade)),
            Self::Custom(predicate) => (predicate.0)(bid),
        }
    }
}

/// A shared, thread-safe predicate over bids.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Bid) -> bool + Send + Sync>);

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}
