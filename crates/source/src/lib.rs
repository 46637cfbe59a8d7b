//! Evidence-source adapters for the Discern engine.
//!
//! A source of evidence observes something and reports what it saw as a mass
//! distribution over a frame of discernment. The engine is agnostic to how
//! the masses are produced; this crate provides the capability trait sources
//! implement and a range-based classifier adapter for numeric measurements.

mod errors;
mod source;

pub use errors::*;
pub use source::*;
