//! HTTP handlers for the beer resource.

pub mod beer;
pub use beer::*;
