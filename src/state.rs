//! Shared application state for all routes.

use crate::store::BeerRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn BeerRepository>,
}

impl AppState {
    pub fn new(repository: impl BeerRepository + 'static) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }
}
