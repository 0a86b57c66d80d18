//! Candidate ranking and disambiguation for ambiguous identity queries.
//!
//! Given a free-text query and candidate account records from a lookup
//! service, scores each candidate on five signals (name similarity, account
//! trust, keyword hits, group overlap, profile completeness), combines them
//! into an integer confidence and returns the candidates in confidence order
//! with a short list of reasons.
//!
//! Everything here is pure: no I/O and no state that survives a call.

pub mod config;
pub mod error;
pub mod explain;
pub mod model;
pub mod normalize;
pub mod ranker;
pub mod signals;
pub mod similarity;
pub mod weights;

#[cfg(feature = "python")]
mod python;

pub use config::RankingConfig;
pub use error::ConfigError;
pub use explain::Reason;
pub use model::{Candidate, RankingHints, ScoredCandidate, SignalVector};
pub use ranker::{rank, top_suggestions, Ranker, DEFAULT_SUGGESTION_LIMIT};
pub use signals::{GroupOverlap, MembershipOverlap, NeutralGroupOverlap};
pub use similarity::{jaro_winkler, similarity, MatchTier, NameMatch};
pub use weights::WeightVector;
