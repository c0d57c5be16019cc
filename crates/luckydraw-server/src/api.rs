// HTTP routes over the draw registry.
//
// Each route maps to exactly one registry operation. Request payloads are
// taken as raw JSON and validated here so that every malformed input, body
// parse failures included, surfaces as a 400 with the route's own message
// instead of the framework's default rejection.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use luckydraw_core::{Draw, DrawError, Registry};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::{debug, warn};

use crate::docs;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub api_doc: Arc<Value>,
}

impl AppState {
    pub fn new(registry: Registry, server_url: &str) -> Self {
        AppState {
            registry: Arc::new(registry),
            api_doc: Arc::new(docs::api_doc(server_url)),
        }
    }
}

/// Build the router. The documentation routes are only mounted when
/// `docs_enabled` is set.
pub fn router(state: AppState, docs_enabled: bool) -> Router {
    let mut router = Router::new()
        .route("/drawn", get(draw_from_stored).put(draw_from_given))
        .route("/entry", post(create_entry))
        .route("/entries", get(list_entries).delete(clear_entries))
        .route("/uniqueRandom", get(unique_random));

    if docs_enabled {
        router = router
            .route(docs::DOCS_PATH, get(docs_page))
            .route(docs::OPENAPI_PATH, get(openapi_json));
    }

    router.with_state(state)
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EntryResponse {
    entry: u64,
}

#[derive(Debug, Serialize)]
struct EntriesResponse {
    entries: Vec<u64>,
}

#[derive(Debug, Serialize)]
struct UniqueRandomResponse {
    #[serde(rename = "randomNumber")]
    random_number: u64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct MaxQuery {
    max: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A registry error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub DrawError);

impl From<DrawError> for ApiError {
    fn from(err: DrawError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("Rejected request ({:?}): {}", self.0.kind(), self.0);
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Interpret a `max` parameter: a JSON integer (`5` or `5.0`), or a string
/// holding one. Zero, negatives, fractions and anything else are rejected.
pub fn parse_max(value: Option<&Value>) -> Result<u64, DrawError> {
    let max = match value {
        Some(Value::Number(n)) => whole_u64(n),
        Some(Value::String(s)) => parse_max_str(s),
        _ => None,
    };
    max.filter(|&m| m > 0).ok_or(DrawError::InvalidMax)
}

fn parse_max_str(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

/// Whole-valued JSON numbers as `u64`, whether written `5` or `5.0`.
fn whole_u64(n: &Number) -> Option<u64> {
    n.as_u64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
            .map(|f| f as u64)
    })
}

/// Whole-valued JSON numbers as `i64`, whether written `-2` or `-2.0`.
fn whole_i64(n: &Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Interpret an `entries` parameter: a non-empty JSON array of whole
/// numbers. One bad element invalidates the whole list.
pub fn parse_entries(value: Option<&Value>) -> Result<Vec<i64>, DrawError> {
    let items = match value {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(DrawError::InvalidArray),
    };
    items
        .iter()
        .map(|item| match item {
            Value::Number(n) => whole_i64(n).ok_or(DrawError::InvalidArray),
            _ => Err(DrawError::InvalidArray),
        })
        .collect()
}

/// Field `name` of a JSON object body; `None` if the body failed to parse or
/// is not an object.
fn body_field(body: &Result<Json<Value>, JsonRejection>, name: &str) -> Option<Value> {
    match body {
        Ok(Json(value)) => value.get(name).cloned(),
        Err(rejection) => {
            debug!("Unreadable JSON body: {rejection}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /drawn
async fn draw_from_stored(State(state): State<AppState>) -> Result<Json<Draw<u64>>, ApiError> {
    let draw = state.registry.draw_from_stored()?;
    Ok(Json(draw))
}

/// PUT /drawn
async fn draw_from_given(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Draw<i64>>, ApiError> {
    let list = parse_entries(body_field(&body, "entries").as_ref())?;
    let draw = state.registry.draw_from_given(list)?;
    Ok(Json(draw))
}

/// POST /entry
async fn create_entry(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    let max = parse_max(body_field(&body, "max").as_ref())?;
    let entry = state.registry.draw_unique(max)?;
    Ok((StatusCode::CREATED, Json(EntryResponse { entry })))
}

/// GET /entries
async fn list_entries(State(state): State<AppState>) -> Json<EntriesResponse> {
    let entries = state.registry.entries();
    debug!("Listing {} entries", entries.len());
    Json(EntriesResponse { entries })
}

/// DELETE /entries
async fn clear_entries(State(state): State<AppState>) -> Json<EntriesResponse> {
    Json(EntriesResponse {
        entries: state.registry.clear(),
    })
}

/// GET /uniqueRandom?max=N
async fn unique_random(
    State(state): State<AppState>,
    query: Result<Query<MaxQuery>, QueryRejection>,
) -> Result<Json<UniqueRandomResponse>, ApiError> {
    let raw = query.ok().and_then(|Query(q)| q.max).map(Value::String);
    let max = parse_max(raw.as_ref())?;
    let random_number = state.registry.draw_unique(max)?;
    Ok(Json(UniqueRandomResponse { random_number }))
}

async fn docs_page() -> Html<String> {
    Html(docs::swagger_page())
}

async fn openapi_json(State(state): State<AppState>) -> Json<Value> {
    debug!("Serving OpenAPI document");
    Json(state.api_doc.as_ref().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn max_accepts_integers_and_integer_strings() {
        assert_eq!(parse_max(Some(&json!(10))), Ok(10));
        assert_eq!(parse_max(Some(&json!("10"))), Ok(10));
        assert_eq!(parse_max(Some(&json!(" 7 "))), Ok(7));
        assert_eq!(parse_max(Some(&json!(1))), Ok(1));
    }

    #[test]
    fn max_accepts_whole_numbers_written_as_floats() {
        assert_eq!(parse_max(Some(&json!(5.0))), Ok(5));
        assert_eq!(parse_max(Some(&json!(1.0))), Ok(1));
        assert_eq!(parse_max(Some(&json!(0.0))), Err(DrawError::InvalidMax));
        assert_eq!(parse_max(Some(&json!(-5.0))), Err(DrawError::InvalidMax));
        assert_eq!(parse_max(Some(&json!(5.5))), Err(DrawError::InvalidMax));
        assert_eq!(parse_max(Some(&json!(1e30))), Err(DrawError::InvalidMax));
    }

    #[test]
    fn max_rejects_everything_else() {
        let bad = [
            json!(0),
            json!(-3),
            json!(2.5),
            json!("abc"),
            json!("0"),
            json!("-1"),
            json!(""),
            json!(null),
            json!(true),
            json!([5]),
            json!({"max": 5}),
        ];
        for value in &bad {
            assert_eq!(parse_max(Some(value)), Err(DrawError::InvalidMax), "{value}");
        }
        assert_eq!(parse_max(None), Err(DrawError::InvalidMax));
    }

    #[test]
    fn entries_accept_integer_arrays() {
        assert_eq!(parse_entries(Some(&json!([7]))), Ok(vec![7]));
        assert_eq!(parse_entries(Some(&json!([1, -2, 0, 3]))), Ok(vec![1, -2, 0, 3]));
    }

    #[test]
    fn entries_accept_whole_numbers_written_as_floats() {
        assert_eq!(parse_entries(Some(&json!([1.0, 2]))), Ok(vec![1, 2]));
        assert_eq!(parse_entries(Some(&json!([-3.0, 0.0]))), Ok(vec![-3, 0]));
        assert_eq!(parse_entries(Some(&json!([1.0, 2.5]))), Err(DrawError::InvalidArray));
        assert_eq!(parse_entries(Some(&json!([1e30]))), Err(DrawError::InvalidArray));
    }

    #[test]
    fn entries_reject_non_arrays_and_bad_elements() {
        let bad = [
            json!("not-an-array"),
            json!([]),
            json!([1, "2", 3]),
            json!([1, 2.5]),
            json!([null]),
            json!({"0": 1}),
            json!(5),
        ];
        for value in &bad {
            assert_eq!(parse_entries(Some(value)), Err(DrawError::InvalidArray), "{value}");
        }
        assert_eq!(parse_entries(None), Err(DrawError::InvalidArray));
    }
}
