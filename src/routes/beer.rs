//! Beer routes. Create is reachable with and without the trailing slash.

use crate::handlers::beer::{get_beer_by_id, save_new_beer, update_beer_by_id};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn beer_routes(state: AppState) -> Router {
    Router::new()
        .route("/beer", post(save_new_beer))
        .route("/beer/", post(save_new_beer))
        .route("/beer/:beer_id", get(get_beer_by_id).put(update_beer_by_id))
        .with_state(state)
}
