//! BeerService: validation, mapping and persistence calls behind the HTTP handlers.

mod beer;
pub mod mapper;
pub mod validation;
pub use beer::BeerService;
pub use validation::{beer_rules, BeerValidator, Constraint};
