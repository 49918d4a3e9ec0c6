//! Beer storage record and wire representation.

mod beer;
pub use beer::*;
