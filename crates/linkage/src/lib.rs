//! `rosterlink-linkage`: approximate record linkage between an authoritative
//! employee registry and an external roster.
//!
//! Pure engine crate: receives pre-loaded records, returns one verdict per
//! external record. No CLI or file IO dependencies.

pub mod candidate;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod similarity;
pub mod summary;

pub use config::MatchConfig;
pub use engine::Matcher;
pub use error::LinkageError;
pub use model::{BestMatch, ExternalRecord, MatchVerdict, RegistryRecord};
pub use summary::{RunSummary, VerdictCounts};
