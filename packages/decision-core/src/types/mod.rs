//! Domain types shared by the decision services.

pub mod category;
pub mod entity;
pub mod results;

/// Prefix of the reasoning line added when a signal was substituted.
pub const PARTIAL_MARKER: &str = "Partial:";
