//! Beer service: REST resource for beers with OpenAPI and recorded documentation snippets.

pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use docs::ApiDoc;
pub use error::{AppError, ConfigError};
pub use model::{Beer, BeerDto, BeerStyle};
pub use routes::{app, app_with_body_limit, beer_routes, common_routes, common_routes_with_ready};
pub use service::BeerService;
pub use state::AppState;
pub use store::{ensure_beer_table, ensure_database_exists, BeerRepository, MemoryBeerRepository, PgBeerRepository};
