//! Parser for the line-oriented fixture format Discern uses to record
//! combination scenarios: a frame of discernment, one mass distribution per
//! input source, and optionally the expected joint distribution per rule.

mod errors;
mod fixture;

pub use errors::*;
pub use fixture::*;
