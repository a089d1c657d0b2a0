//! MBID route validation
//!
//! Handlers that take an MBID path segment opt into validation by using
//! the [`Mbid`] extractor: malformed UUIDs are rejected with 400 before
//! the handler body runs, so facade code only ever sees parseable MBIDs.

use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

/// Validated MBID path parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mbid(pub Uuid);

impl Mbid {
    /// Hyphenated lowercase form, as stored in `gid` columns
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Mbid
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| bad_request(rejection.to_string()))?;

        Uuid::parse_str(&raw)
            .map(Mbid)
            .map_err(|_| bad_request(format!("Invalid MBID: {raw}")))
    }
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": message,
            "status": StatusCode::BAD_REQUEST.as_u16(),
        })),
    )
        .into_response()
}
