//! Beer persistence behind a trait, with in-memory and PostgreSQL implementations.

mod memory;
mod postgres;
mod traits;

pub use memory::MemoryBeerRepository;
pub use postgres::{ensure_beer_table, ensure_database_exists, PgBeerRepository};
pub use traits::BeerRepository;
