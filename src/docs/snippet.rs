//! Request/response snippets recorded while exercising the router.
//!
//! A [`DocumentedRequest`] is sent through the router in-process with [`perform`]. The resulting
//! [`Exchange`] is checked against a [`Snippet`]'s descriptors: every documented parameter and
//! field must appear in the exchange and every field of the payloads must be documented.
//! [`SnippetWriter`] writes the checked snippets as JSON files under `<dir>/<identifier>/`.

use crate::service::validation::Constraint;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::Router;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tower::ServiceExt;

#[derive(Error, Debug)]
pub enum SnippetError {
    #[error("path parameters not documented: {0:?}")]
    UndocumentedPathParameters(Vec<String>),
    #[error("documented path parameters not in path template: {0:?}")]
    MissingPathParameters(Vec<String>),
    #[error("request parameters not documented: {0:?}")]
    UndocumentedRequestParameters(Vec<String>),
    #[error("documented request parameters not found in request: {0:?}")]
    MissingRequestParameters(Vec<String>),
    #[error("{payload} fields not documented: {paths:?}")]
    UndocumentedFields { payload: &'static str, paths: Vec<String> },
    #[error("documented {payload} fields not found in payload: {paths:?}")]
    MissingFields { payload: &'static str, paths: Vec<String> },
    #[error("cannot document {payload} fields: payload is empty")]
    EmptyPayload { payload: &'static str },
    #[error("request: {0}")]
    Request(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub description: String,
}

pub fn parameter_with_name(name: &str) -> ParameterDescriptor {
    ParameterDescriptor {
        name: name.to_string(),
        description: String::new(),
    }
}

impl ParameterDescriptor {
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// One documented payload field. `path` uses dots for nested objects (`a.b`).
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    pub path: String,
    pub description: String,
    /// Must be present in the payload but is left out of the written snippet.
    pub ignored: bool,
    /// May be absent from the payload.
    pub optional: bool,
    pub constraints: Option<String>,
}

pub fn field_with_path(path: &str) -> FieldDescriptor {
    FieldDescriptor {
        path: path.to_string(),
        description: String::new(),
        ignored: false,
        optional: false,
        constraints: None,
    }
}

impl FieldDescriptor {
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn constraints(mut self, constraints: String) -> Self {
        self.constraints = if constraints.is_empty() { None } else { Some(constraints) };
        self
    }
}

/// Field descriptors carrying the constraint text declared in a validation rule table.
pub struct ConstrainedFields {
    rules: Vec<(&'static str, Vec<Constraint>)>,
}

impl ConstrainedFields {
    pub fn new(rules: Vec<(&'static str, Vec<Constraint>)>) -> Self {
        Self { rules }
    }

    /// Constraint descriptions declared for one field path. Empty for unknown paths.
    pub fn descriptions_for_property(&self, path: &str) -> Vec<String> {
        self.rules
            .iter()
            .find(|(field, _)| *field == path)
            .map(|(_, constraints)| constraints.iter().map(Constraint::description).collect())
            .unwrap_or_default()
    }

    pub fn with_path(&self, path: &str) -> FieldDescriptor {
        field_with_path(path).constraints(self.descriptions_for_property(path).join(". "))
    }
}

/// A request described by its path template, so path parameters can be documented by name.
#[derive(Clone, Debug)]
pub struct DocumentedRequest {
    method: Method,
    template: String,
    path_values: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl DocumentedRequest {
    pub fn new(method: Method, template: &str, path_values: &[&str]) -> Self {
        Self {
            method,
            template: template.to_string(),
            path_values: path_values.iter().map(|v| v.to_string()).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(template: &str, path_values: &[&str]) -> Self {
        Self::new(Method::GET, template, path_values)
    }

    pub fn post(template: &str, path_values: &[&str]) -> Self {
        Self::new(Method::POST, template, path_values)
    }

    pub fn put(template: &str, path_values: &[&str]) -> Self {
        Self::new(Method::PUT, template, path_values)
    }

    /// Add a query parameter.
    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn expanded_path(&self) -> Result<String, SnippetError> {
        let names = template_parameters(&self.template);
        if names.len() != self.path_values.len() {
            return Err(SnippetError::Request(format!(
                "template {} has {} parameters but {} values were given",
                self.template,
                names.len(),
                self.path_values.len()
            )));
        }
        let mut path = self.template.clone();
        for (name, value) in names.iter().zip(&self.path_values) {
            path = path.replacen(&format!("{{{}}}", name), value, 1);
        }
        Ok(path)
    }
}

/// Parameter names in `{...}` segments of a path template, in order.
fn template_parameters(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else { break };
        names.push(rest[start + 1..start + len].to_string());
        rest = &rest[start + len + 1..];
    }
    names
}

fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

#[derive(Clone, Debug, Serialize)]
pub struct RecordedRequest {
    pub method: String,
    pub template: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RecordedResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// An executed request and the response the router produced for it.
#[derive(Clone, Debug, Serialize)]
pub struct Exchange {
    pub request: RecordedRequest,
    pub response: RecordedResponse,
}

/// Send `request` through `router` in-process and record the exchange.
pub async fn perform(router: Router, request: DocumentedRequest) -> Result<Exchange, SnippetError> {
    let path = request.expanded_path()?;
    let uri = if request.query.is_empty() {
        path.clone()
    } else {
        let query: Vec<String> = request
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect();
        format!("{}?{}", path, query.join("&"))
    };

    let mut builder = Request::builder()
        .method(request.method.clone())
        .uri(&uri)
        .header(header::ACCEPT, "application/json");
    let body = match &request.body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(value)?)
        }
        None => Body::empty(),
    };
    let http_request = builder.body(body).map_err(|e| SnippetError::Request(e.to_string()))?;

    let response = match router.oneshot(http_request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
        .collect();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| SnippetError::Request(e.to_string()))?;
    let response_body = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes)?)
    };
    tracing::debug!(method = %request.method, uri = %uri, status, "recorded exchange");

    Ok(Exchange {
        request: RecordedRequest {
            method: request.method.to_string(),
            template: request.template.clone(),
            path,
            query: request.query.iter().cloned().collect(),
            body: request.body,
        },
        response: RecordedResponse {
            status,
            headers,
            body: response_body,
        },
    })
}

#[derive(Serialize)]
struct FieldRow<'a> {
    path: &'a str,
    #[serde(rename = "type")]
    type_: &'static str,
    description: &'a str,
    optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraints: Option<&'a str>,
}

fn lookup<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(payload, |v, key| v.as_object()?.get(key))
}

fn json_type(value: Option<&Value>) -> &'static str {
    match value {
        None => "Varies",
        Some(Value::Null) => "Null",
        Some(Value::Bool(_)) => "Boolean",
        Some(Value::Number(_)) => "Number",
        Some(Value::String(_)) => "String",
        Some(Value::Array(_)) => "Array",
        Some(Value::Object(_)) => "Object",
    }
}

fn leaf_paths(value: &Value, prefix: &str, out: &mut Vec<String>) {
    if let Value::Object(map) = value {
        for (key, v) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            match v {
                Value::Object(inner) if !inner.is_empty() => leaf_paths(v, &path, out),
                _ => out.push(path),
            }
        }
    }
}

fn document_fields(
    payload_name: &'static str,
    payload: Option<&Value>,
    descriptors: &[FieldDescriptor],
) -> Result<Value, SnippetError> {
    let payload = match payload {
        Some(p) => p,
        None if descriptors.is_empty() => return Ok(Value::Array(Vec::new())),
        None => return Err(SnippetError::EmptyPayload { payload: payload_name }),
    };

    let missing: Vec<String> = descriptors
        .iter()
        .filter(|d| !d.optional && lookup(payload, &d.path).is_none())
        .map(|d| d.path.clone())
        .collect();
    if !missing.is_empty() {
        return Err(SnippetError::MissingFields {
            payload: payload_name,
            paths: missing,
        });
    }

    let mut leaves = Vec::new();
    leaf_paths(payload, "", &mut leaves);
    let undocumented: Vec<String> = leaves
        .into_iter()
        .filter(|leaf| {
            !descriptors
                .iter()
                .any(|d| *leaf == d.path || leaf.starts_with(&format!("{}.", d.path)))
        })
        .collect();
    if !undocumented.is_empty() {
        return Err(SnippetError::UndocumentedFields {
            payload: payload_name,
            paths: undocumented,
        });
    }

    let rows: Vec<FieldRow<'_>> = descriptors
        .iter()
        .filter(|d| !d.ignored)
        .map(|d| FieldRow {
            path: &d.path,
            type_: json_type(lookup(payload, &d.path)),
            description: &d.description,
            optional: d.optional,
            constraints: d.constraints.as_deref(),
        })
        .collect();
    Ok(serde_json::to_value(rows)?)
}

/// Snippets checked against one exchange, keyed by snippet name (`http-request`, `response-fields`, ...).
#[derive(Clone, Debug)]
pub struct DocumentedSnippets {
    pub identifier: String,
    pub files: BTreeMap<&'static str, Value>,
}

/// Descriptor set for one documented exchange. `identifier` becomes the output sub-directory (e.g. `v1/beer`).
#[derive(Clone, Debug, Default)]
pub struct Snippet {
    identifier: String,
    path_parameters: Option<Vec<ParameterDescriptor>>,
    request_parameters: Option<Vec<ParameterDescriptor>>,
    request_fields: Option<Vec<FieldDescriptor>>,
    response_fields: Option<Vec<FieldDescriptor>>,
}

impl Snippet {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            ..Default::default()
        }
    }

    pub fn path_parameters(mut self, parameters: Vec<ParameterDescriptor>) -> Self {
        self.path_parameters = Some(parameters);
        self
    }

    pub fn request_parameters(mut self, parameters: Vec<ParameterDescriptor>) -> Self {
        self.request_parameters = Some(parameters);
        self
    }

    pub fn request_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.request_fields = Some(fields);
        self
    }

    pub fn response_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.response_fields = Some(fields);
        self
    }

    /// Check the descriptors against `exchange` and build the snippet documents.
    pub fn document(&self, exchange: &Exchange) -> Result<DocumentedSnippets, SnippetError> {
        let mut files = BTreeMap::new();
        files.insert("http-request", serde_json::to_value(&exchange.request)?);
        files.insert("http-response", serde_json::to_value(&exchange.response)?);

        if let Some(params) = &self.path_parameters {
            let template = template_parameters(&exchange.request.template);
            let undocumented: Vec<String> = template
                .iter()
                .filter(|name| !params.iter().any(|p| &p.name == *name))
                .cloned()
                .collect();
            if !undocumented.is_empty() {
                return Err(SnippetError::UndocumentedPathParameters(undocumented));
            }
            let missing: Vec<String> = params
                .iter()
                .filter(|p| !template.contains(&p.name))
                .map(|p| p.name.clone())
                .collect();
            if !missing.is_empty() {
                return Err(SnippetError::MissingPathParameters(missing));
            }
            files.insert(
                "path-parameters",
                serde_json::json!({ "path": exchange.request.template, "parameters": params }),
            );
        }

        if let Some(params) = &self.request_parameters {
            let query = &exchange.request.query;
            let undocumented: Vec<String> = query
                .keys()
                .filter(|name| !params.iter().any(|p| &p.name == *name))
                .cloned()
                .collect();
            if !undocumented.is_empty() {
                return Err(SnippetError::UndocumentedRequestParameters(undocumented));
            }
            let missing: Vec<String> = params
                .iter()
                .filter(|p| !query.contains_key(&p.name))
                .map(|p| p.name.clone())
                .collect();
            if !missing.is_empty() {
                return Err(SnippetError::MissingRequestParameters(missing));
            }
            files.insert("request-parameters", serde_json::to_value(params)?);
        }

        if let Some(fields) = &self.request_fields {
            let doc = document_fields("request", exchange.request.body.as_ref(), fields)?;
            files.insert("request-fields", doc);
        }

        if let Some(fields) = &self.response_fields {
            let doc = document_fields("response", exchange.response.body.as_ref(), fields)?;
            files.insert("response-fields", doc);
        }

        Ok(DocumentedSnippets {
            identifier: self.identifier.clone(),
            files,
        })
    }
}

/// Writes documented snippets as pretty-printed JSON files.
pub struct SnippetWriter {
    dir: PathBuf,
}

impl SnippetWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write one file per snippet to `<dir>/<identifier>/<name>.json`. Returns the written paths.
    pub fn write(&self, snippets: &DocumentedSnippets) -> Result<Vec<PathBuf>, SnippetError> {
        let base = self.dir.join(&snippets.identifier);
        std::fs::create_dir_all(&base)?;
        let mut written = Vec::with_capacity(snippets.files.len());
        for (name, value) in &snippets.files {
            let path = base.join(format!("{}.json", name));
            std::fs::write(&path, serde_json::to_vec_pretty(value)?)?;
            written.push(path);
        }
        tracing::debug!(identifier = %snippets.identifier, files = written.len(), "wrote snippets");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::validation::beer_rules;
    use serde_json::json;

    fn exchange(request_body: Option<Value>, response_body: Option<Value>) -> Exchange {
        Exchange {
            request: RecordedRequest {
                method: "GET".into(),
                template: "/api/v1/beer/{beerId}".into(),
                path: "/api/v1/beer/abc".into(),
                query: BTreeMap::from([("iscold".to_string(), "yes".to_string())]),
                body: request_body,
            },
            response: RecordedResponse {
                status: 200,
                headers: BTreeMap::new(),
                body: response_body,
            },
        }
    }

    #[test]
    fn template_parameters_and_expansion() {
        let req = DocumentedRequest::get("/api/v1/beer/{beerId}/taps/{tapId}", &["b1", "t2"]);
        assert_eq!(
            template_parameters(&req.template),
            vec!["beerId".to_string(), "tapId".to_string()]
        );
        assert_eq!(req.expanded_path().unwrap(), "/api/v1/beer/b1/taps/t2");

        let short = DocumentedRequest::get("/api/v1/beer/{beerId}", &[]);
        assert!(matches!(short.expanded_path(), Err(SnippetError::Request(_))));
    }

    #[test]
    fn query_components_are_percent_encoded() {
        assert_eq!(encode_component("yes"), "yes");
        assert_eq!(encode_component("a b&c"), "a%20b%26c");
    }

    #[test]
    fn constrained_fields_join_descriptions() {
        let fields = ConstrainedFields::new(beer_rules());
        assert_eq!(
            fields.with_path("price").constraints.as_deref(),
            Some(
                "Must not be null. Must be zero or positive. \
                 Numeric value must have at most 17 integer and 2 fraction digits"
            )
        );
        assert_eq!(
            fields.descriptions_for_property("upc"),
            vec!["Must not be null".to_string(), "Must be positive".to_string()]
        );
        assert_eq!(fields.with_path("nope").constraints, None);
    }

    #[test]
    fn documents_parameters_and_fields() {
        let snippet = Snippet::new("v1/beer")
            .path_parameters(vec![parameter_with_name("beerId").description("UUID of beer to get.")])
            .request_parameters(vec![parameter_with_name("iscold").description("Is beer cold query parameter.")])
            .response_fields(vec![
                field_with_path("id").description("Id of beer."),
                field_with_path("beerName").description("Beer name"),
                field_with_path("version").ignored(),
            ]);
        let doc = snippet
            .document(&exchange(None, Some(json!({"id": null, "beerName": "Nice Ale", "version": 1}))))
            .unwrap();
        assert_eq!(doc.identifier, "v1/beer");
        let fields = &doc.files["response-fields"];
        assert_eq!(fields.as_array().unwrap().len(), 2);
        assert_eq!(fields[0]["type"], "Null");
        assert_eq!(fields[1]["type"], "String");
        assert_eq!(doc.files["path-parameters"]["parameters"][0]["name"], "beerId");
        assert_eq!(doc.files["request-parameters"][0]["description"], "Is beer cold query parameter.");
        assert!(doc.files.contains_key("http-request"));
        assert!(doc.files.contains_key("http-response"));
    }

    #[test]
    fn undocumented_response_field_fails() {
        let snippet = Snippet::new("v1/beer").response_fields(vec![field_with_path("id")]);
        let err = snippet
            .document(&exchange(None, Some(json!({"id": 1, "upc": 2}))))
            .unwrap_err();
        match err {
            SnippetError::UndocumentedFields { payload, paths } => {
                assert_eq!(payload, "response");
                assert_eq!(paths, vec!["upc".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_field_fails_unless_optional() {
        let strict = Snippet::new("x").request_fields(vec![field_with_path("a"), field_with_path("b")]);
        assert!(matches!(
            strict.document(&exchange(Some(json!({"a": 1})), None)),
            Err(SnippetError::MissingFields { .. })
        ));

        let lenient = Snippet::new("x").request_fields(vec![field_with_path("a"), field_with_path("b").optional()]);
        assert!(lenient.document(&exchange(Some(json!({"a": 1})), None)).is_ok());
    }

    #[test]
    fn nested_fields_are_covered_by_parent() {
        let snippet = Snippet::new("x").response_fields(vec![field_with_path("brewery")]);
        assert!(snippet
            .document(&exchange(None, Some(json!({"brewery": {"name": "n", "city": "c"}}))))
            .is_ok());

        let nested = Snippet::new("x").response_fields(vec![field_with_path("brewery.name")]);
        assert!(matches!(
            nested.document(&exchange(None, Some(json!({"brewery": {"name": "n", "city": "c"}})))),
            Err(SnippetError::UndocumentedFields { .. })
        ));
    }

    #[test]
    fn fields_on_empty_body_fail() {
        let snippet = Snippet::new("x").response_fields(vec![field_with_path("id")]);
        assert!(matches!(
            snippet.document(&exchange(None, None)),
            Err(SnippetError::EmptyPayload { payload: "response" })
        ));
    }

    #[test]
    fn parameter_mismatches_fail() {
        let undocumented = Snippet::new("x").path_parameters(vec![]);
        assert!(matches!(
            undocumented.document(&exchange(None, None)),
            Err(SnippetError::UndocumentedPathParameters(_))
        ));

        let missing = Snippet::new("x").request_parameters(vec![
            parameter_with_name("iscold"),
            parameter_with_name("isfresh"),
        ]);
        match missing.document(&exchange(None, None)) {
            Err(SnippetError::MissingRequestParameters(names)) => assert_eq!(names, vec!["isfresh".to_string()]),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn writer_creates_identifier_directory() {
        let dir = tempfile::tempdir().unwrap();
        let doc = Snippet::new("v1/beer").document(&exchange(None, None)).unwrap();
        let written = SnippetWriter::new(dir.path()).write(&doc).unwrap();
        assert_eq!(written.len(), 2);
        let request: Value =
            serde_json::from_slice(&std::fs::read(dir.path().join("v1/beer/http-request.json")).unwrap()).unwrap();
        assert_eq!(request["path"], "/api/v1/beer/abc");
    }
}
