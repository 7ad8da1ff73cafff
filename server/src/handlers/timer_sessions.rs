// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use axum::{
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::Utc;
use common::{
    CreateTimerSessionPayload, TimerFilter, TimerSession, TimerSessionView,
    UpdateTimerSessionPayload,
};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{Owner, StatsQuery, parse_id};
use crate::database::timer_sessions::{self, SessionEnd};
use crate::error::{AppError, EntityKind};
use crate::stats;

/// Handler for `GET /api/timer-sessions`.
pub async fn list_timer_sessions(
    State(pool): State<SqlitePool>,
    owner: Owner,
    filter: Result<Query<TimerFilter>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(filter) = filter?;
    debug!("Listing timer sessions for {} with {:?}", owner.id(), filter);

    let sessions: Vec<TimerSessionView> =
        timer_sessions::list_timer_sessions_from_db(&pool, owner.id(), &filter)
            .await?
            .into_iter()
            .map(TimerSession::view)
            .collect();

    info!("Successfully retrieved {} timer sessions.", sessions.len());
    Ok(Json(json!({
        "success": true,
        "count": sessions.len(),
        "sessions": sessions,
    })))
}

/// Handler for `POST /api/timer-sessions`.
pub async fn create_timer_session(
    State(pool): State<SqlitePool>,
    owner: Owner,
    payload: Result<Json<CreateTimerSessionPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(payload) = payload?;
    let new_session = payload.validate()?;

    let session = timer_sessions::create_timer_session_in_db(&pool, owner.id(), new_session).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Timer session created successfully",
            "session": session.view(),
        })),
    ))
}

/// Handler for `PUT /api/timer-sessions/{id}`.
pub async fn update_timer_session(
    State(pool): State<SqlitePool>,
    owner: Owner,
    Path(session_id): Path<String>,
    payload: Result<Json<UpdateTimerSessionPayload>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let session_id = parse_id(&session_id, EntityKind::TimerSession)?;
    let Json(payload) = payload?;
    let changes = payload.validate()?;

    let session =
        timer_sessions::update_timer_session_in_db(&pool, owner.id(), session_id, changes).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Timer session updated successfully",
        "session": session.view(),
    })))
}

/// Handler for `DELETE /api/timer-sessions/{id}`.
pub async fn delete_timer_session(
    State(pool): State<SqlitePool>,
    owner: Owner,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let session_id = parse_id(&session_id, EntityKind::TimerSession)?;
    let session = timer_sessions::delete_timer_session_from_db(&pool, owner.id(), session_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Timer session deleted successfully",
        "session": session.view(),
    })))
}

/// Handler for `PATCH /api/timer-sessions/{id}/complete`.
pub async fn complete_timer_session(
    State(pool): State<SqlitePool>,
    owner: Owner,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let session_id = parse_id(&session_id, EntityKind::TimerSession)?;
    let session =
        timer_sessions::end_timer_session_in_db(&pool, owner.id(), session_id, SessionEnd::Completed)
            .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Timer session completed successfully",
        "session": session.view(),
    })))
}

/// Handler for `PATCH /api/timer-sessions/{id}/interrupt`.
pub async fn interrupt_timer_session(
    State(pool): State<SqlitePool>,
    owner: Owner,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let session_id = parse_id(&session_id, EntityKind::TimerSession)?;
    let session = timer_sessions::end_timer_session_in_db(
        &pool,
        owner.id(),
        session_id,
        SessionEnd::Interrupted,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Timer session interrupted",
        "session": session.view(),
    })))
}

/// Handler for `GET /api/timer-sessions/stats`.
pub async fn timer_stats(
    State(pool): State<SqlitePool>,
    owner: Owner,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(query) = query?;
    let stats = stats::timer_stats_from_db(&pool, owner.id(), query.period(), Utc::now()).await?;

    Ok(Json(json!({ "success": true, "stats": stats })))
}

/// Handler for `GET /api/timer-sessions/daily-focus`.
pub async fn daily_focus(
    State(pool): State<SqlitePool>,
    owner: Owner,
) -> Result<Json<Value>, AppError> {
    let today = Utc::now().date_naive();
    let daily_focus = stats::daily_focus_from_db(&pool, owner.id(), today).await?;

    Ok(Json(json!({ "success": true, "dailyFocus": daily_focus })))
}
