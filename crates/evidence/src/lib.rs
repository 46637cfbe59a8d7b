//! This crate provides the Dempster-Shafer evidence combination engine used by Discern.

mod combine;
mod element;
mod errors;
mod mass;

pub use combine::*;
pub use element::*;
pub use errors::*;
pub use mass::*;

#[allow(unused_imports)]
#[macro_use]
extern crate approx;
