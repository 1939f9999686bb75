mod bid;
mod constraint;
mod context;
mod error;
mod ids;
mod map;
mod portfolio;
mod preference;
mod request;
mod specification;
mod trade;

pub use bid::Bid;
pub use constraint::CapacityConstraint;
pub use context::{ExchangeContext, Side, Step, SubmissionError};
pub use error::ConstructionError;
pub use ids::{Commodity, ParticipantId};
pub use map::{Map, Set};
pub use portfolio::{BidPortfolio, Member, Portfolio, RequestPortfolio};
pub use preference::Preference;
pub use request::Request;
pub use specification::{Predicate, Specification};
pub use trade::{ItemRef, Role, Trade};
