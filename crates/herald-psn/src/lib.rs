//! PlayStation Network trophy source for Herald.
//!
//! Implements the full achievement query path against the PSN mobile API:
//! NPSSO credential exchange, the paginated user-title listing, trophy
//! catalog metadata, per-user earned status, and the join of the latter two
//! into [`herald_models::TrophyRecord`] snapshots.
//!
//! The [`TrophySource`] trait is the seam new achievement platforms
//! implement; the scheduler never sees a concrete platform.

pub mod auth;
pub mod client;
pub mod compare;
pub mod error;
pub mod search;
pub mod source;

pub use compare::TrophyComparison;
pub use error::{PsnError, Result};
pub use source::{PsnTrophySource, TrophySource};
