// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Request handlers, one module per entity kind, plus the pieces they share:
//! the owner extractor, id parsing and the health/fallback routes.
pub mod notes;
pub mod tasks;
pub mod timer_sessions;

use axum::{
    extract::{FromRequestParts, Json},
    http::{StatusCode, request::Parts},
};
use chrono::Utc;
use common::{Period, ValidationError};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, EntityKind, StoreError};

/// Header through which the authentication layer passes the caller's id.
pub const OWNER_HEADER: &str = "x-user-id";

/// The authenticated caller. Every store call is scoped to this id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

impl Owner {
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| Owner(id.to_string()))
            .ok_or_else(|| AppError::new(StatusCode::UNAUTHORIZED, "Not authorized, no user identity"))
    }
}

/// `?period=` of the statistics routes.
#[derive(Deserialize, Debug, Default)]
pub struct StatsQuery {
    pub period: Option<String>,
}

impl StatsQuery {
    pub fn period(&self) -> Period {
        Period::parse_lenient(self.period.as_deref())
    }
}

/// Parses a path id. An id that is not a number cannot name any record,
/// so it is reported like a missing one.
pub fn parse_id(raw: &str, kind: EntityKind) -> Result<i64, StoreError> {
    raw.trim().parse().map_err(|_| StoreError::NotFound(kind))
}

/// Reads the id array of a reorder body (`{"tasks": [...]}`). Ids may be
/// numbers or numeric strings; anything else keeps its slot as `None`.
pub fn parse_id_list(
    body: &Value,
    key: &str,
    missing: &'static str,
) -> Result<Vec<Option<i64>>, ValidationError> {
    let ids = body
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| ValidationError::new(missing))?;

    Ok(ids
        .iter()
        .map(|id| match id {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect())
}

/// Handler for `GET /api/health`.
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "OK",
        "message": "Server is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Fallback for every unmatched route or method.
pub async fn not_found() -> AppError {
    AppError::new(StatusCode::NOT_FOUND, "Route not found")
}
