pub mod candidate;
pub mod query;
pub mod result;
pub mod unit;

pub use candidate::{Candidate, Listing};
pub use query::Query;
pub use result::{MatchResult, PriceChange, ReconcileReport};
pub use unit::{BaseUnit, TargetUnit};
