//! Beer handlers: fetch by id, create, update.

use crate::error::AppError;
use crate::model::BeerDto;
use crate::service::BeerService;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

/// Base path of the beer resource.
pub const BEER_PATH: &str = "/api/v1/beer";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BeerQuery {
    /// Is beer cold query parameter.
    pub iscold: Option<String>,
}

fn parse_beer_id(id_str: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id_str).map_err(|_| AppError::BadRequest(format!("invalid beer id '{}'", id_str)))
}

#[utoipa::path(
    get,
    path = "/api/v1/beer/{beerId}",
    tag = "beer",
    params(
        ("beerId" = Uuid, Path, description = "UUID of beer to get."),
        BeerQuery,
    ),
    responses(
        (status = 200, description = "Beer found", body = BeerDto),
        (status = 400, description = "Malformed beer id"),
        (status = 404, description = "No beer with this id"),
    )
)]
pub async fn get_beer_by_id(
    State(state): State<AppState>,
    Path(beer_id): Path<String>,
    Query(query): Query<BeerQuery>,
) -> Result<Json<BeerDto>, AppError> {
    let id = parse_beer_id(&beer_id)?;
    tracing::debug!(%id, iscold = ?query.iscold, "get beer");
    let beer = BeerService::get_by_id(state.repository.as_ref(), id).await?;
    Ok(Json(beer))
}

#[utoipa::path(
    post,
    path = "/api/v1/beer/",
    tag = "beer",
    request_body = BeerDto,
    responses(
        (status = 201, description = "Beer created", body = BeerDto,
            headers(("Location" = String, description = "URL of the created beer"))),
        (status = 400, description = "Malformed JSON body"),
        (status = 409, description = "UPC already belongs to another beer"),
        (status = 413, description = "Body exceeds the configured limit"),
        (status = 415, description = "Body is not application/json"),
        (status = 422, description = "Payload violates field constraints"),
    )
)]
pub async fn save_new_beer(
    State(state): State<AppState>,
    payload: Result<Json<BeerDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(dto) = payload.inspect_err(|e| tracing::warn!(error = %e, "rejected beer payload"))?;
    let saved = BeerService::save_new(state.repository.as_ref(), dto).await?;
    let location = saved
        .id
        .map(|id| format!("{}/{}", BEER_PATH, id))
        .ok_or_else(|| AppError::Internal("saved beer has no id".into()))?;
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(saved)))
}

#[utoipa::path(
    put,
    path = "/api/v1/beer/{beerId}",
    tag = "beer",
    params(("beerId" = Uuid, Path, description = "UUID of beer to update.")),
    request_body = BeerDto,
    responses(
        (status = 204, description = "Beer updated"),
        (status = 400, description = "Malformed beer id or JSON body"),
        (status = 404, description = "No beer with this id"),
        (status = 409, description = "UPC already belongs to another beer"),
        (status = 413, description = "Body exceeds the configured limit"),
        (status = 415, description = "Body is not application/json"),
        (status = 422, description = "Payload violates field constraints"),
    )
)]
pub async fn update_beer_by_id(
    State(state): State<AppState>,
    Path(beer_id): Path<String>,
    payload: Result<Json<BeerDto>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let id = parse_beer_id(&beer_id)?;
    let Json(dto) = payload.inspect_err(|e| tracing::warn!(error = %e, "rejected beer payload"))?;
    BeerService::update(state.repository.as_ref(), id, dto).await?;
    Ok(StatusCode::NO_CONTENT)
}
