//! API documentation: the OpenAPI document and recorded request/response snippets.

pub mod snippet;

use crate::handlers::beer as beer_handlers;
use crate::model::{BeerDto, BeerStyle};
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

pub use snippet::{
    field_with_path, parameter_with_name, perform, ConstrainedFields, DocumentedRequest, Exchange, FieldDescriptor,
    ParameterDescriptor, Snippet, SnippetError, SnippetWriter,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Beer service", description = "Beer resource API"),
    paths(
        beer_handlers::get_beer_by_id,
        beer_handlers::save_new_beer,
        beer_handlers::update_beer_by_id,
    ),
    components(schemas(BeerDto, BeerStyle)),
    tags((name = "beer", description = "Beer resource"))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// GET /api-docs/openapi.json
pub fn docs_routes() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_beer_operations() {
        let doc = ApiDoc::openapi();
        let by_id = doc.paths.paths.get("/api/v1/beer/{beerId}").expect("beer by id path");
        assert!(by_id.get.is_some());
        assert!(by_id.put.is_some());
        let create = doc.paths.paths.get("/api/v1/beer/").expect("create path");
        assert!(create.post.is_some());
    }

    #[test]
    fn openapi_documents_parameters() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let params = json["paths"]["/api/v1/beer/{beerId}"]["get"]["parameters"]
            .as_array()
            .expect("parameters")
            .clone();
        let described: Vec<(String, String)> = params
            .iter()
            .map(|p| {
                (
                    p["name"].as_str().unwrap_or_default().to_string(),
                    p["description"].as_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        assert!(described.contains(&("beerId".into(), "UUID of beer to get.".into())));
        assert!(described.contains(&("iscold".into(), "Is beer cold query parameter.".into())));
    }

    #[test]
    fn openapi_schema_has_nine_fields() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let props = json["components"]["schemas"]["BeerDto"]["properties"]
            .as_object()
            .expect("BeerDto properties");
        assert_eq!(props.len(), 9);
        assert_eq!(props["upc"]["description"], "UPC of beer");
    }
}
