//! Request extraction: caller identity from headers and body/query
//! rejections mapped onto the API error format.

use axum::{
    extract::{
        FromRequestParts, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::request::Parts,
    Json,
};
use tracing::warn;
use uuid::Uuid;

use crate::models::Actor;

use super::response::{ApiError, ApiErrorResponse};

/// Header naming the caller's role: `provider` or `worker`.
pub const ROLE_HEADER: &str = "x-actor-role";
/// Header carrying the caller's user id.
pub const ID_HEADER: &str = "x-actor-id";

/// The authenticated caller, as asserted by the session layer in front of
/// this service.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Actor);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
        };

        let Some(role) = header(ROLE_HEADER) else {
            return Err(ApiErrorResponse::unauthenticated(format!(
                "missing {} header",
                ROLE_HEADER
            )));
        };
        let Some(raw_id) = header(ID_HEADER) else {
            return Err(ApiErrorResponse::unauthenticated(format!("missing {} header", ID_HEADER)));
        };
        let id = Uuid::parse_str(raw_id).map_err(|_| {
            ApiErrorResponse::unauthenticated(format!(
                "{} is not a valid id: {}",
                ID_HEADER, raw_id
            ))
        })?;

        match role.to_ascii_lowercase().as_str() {
            "provider" => Ok(Caller(Actor::Provider(id))),
            "worker" => Ok(Caller(Actor::Worker(id))),
            other => Err(ApiErrorResponse::unauthenticated(format!("unknown role: {}", other))),
        }
    }
}

/// Unwraps a JSON body, turning extractor rejections into API errors.
pub fn json_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

/// Unwraps a query string, turning extractor rejections into API errors.
pub fn query_params<T>(
    correlation_id: Uuid,
    query: Result<Query<T>, QueryRejection>,
) -> Result<T, ApiErrorResponse> {
    query.map(|Query(params)| params).map_err(|rejection| {
        let message = rejection.body_text();
        warn!(correlation_id = %correlation_id, error = %message, "invalid query string");
        ApiErrorResponse::bad_request(ApiError::new("VALIDATION_ERROR", message))
    })
}
