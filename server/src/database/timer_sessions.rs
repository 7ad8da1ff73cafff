// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::Utc;
use common::{NewTimerSession, TimerFilter, TimerSession, TimerSessionChanges};
use sqlx::{QueryBuilder, Sqlite, SqlitePool, types::Json};
use tracing::{debug, info};

use super::filters;
use crate::error::{EntityKind, StoreError, StoreResult};

/// How a running session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Completed,
    Interrupted,
}

impl SessionEnd {
    const fn latch_sql(self) -> &'static str {
        match self {
            Self::Completed => {
                "UPDATE timer_sessions SET completed = 1, end_time = ?, updated_at = ?
                 WHERE id = ? AND owner_id = ? AND end_time IS NULL"
            }
            Self::Interrupted => {
                "UPDATE timer_sessions SET interrupted = 1, end_time = ?, updated_at = ?
                 WHERE id = ? AND owner_id = ? AND end_time IS NULL"
            }
        }
    }
}

/// Lists the owner's sessions matching `filter`, most recent first.
pub async fn list_timer_sessions_from_db(
    pool: &SqlitePool,
    owner_id: &str,
    filter: &TimerFilter,
) -> StoreResult<Vec<TimerSession>> {
    let mut qb = filters::timer_query(owner_id, filter);
    let sessions = qb.build_query_as::<TimerSession>().fetch_all(pool).await?;
    Ok(sessions)
}

pub async fn find_timer_session_in_db(
    pool: &SqlitePool,
    owner_id: &str,
    session_id: i64,
) -> StoreResult<TimerSession> {
    sqlx::query_as::<_, TimerSession>("SELECT * FROM timer_sessions WHERE id = ? AND owner_id = ?")
        .bind(session_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound(EntityKind::TimerSession))
}

/// Starts a session now. A session declared completed at creation ends
/// immediately.
pub async fn create_timer_session_in_db(
    pool: &SqlitePool,
    owner_id: &str,
    new_session: NewTimerSession,
) -> StoreResult<TimerSession> {
    let now = Utc::now();
    let end_time = new_session.completed.then_some(now);
    debug!(
        "Insert timer session: owner_id={}, mode={}, duration={}s, completed={}",
        owner_id, new_session.mode, new_session.duration, new_session.completed
    );

    let session = sqlx::query_as::<_, TimerSession>(
        "INSERT INTO timer_sessions
            (owner_id, mode, duration, completed, interrupted, start_time, end_time,
             notes, tags, productivity, created_at, updated_at)
         VALUES (?, ?, ?, ?, 0, ?, ?, ?, ?, ?, ?, ?)
         RETURNING *",
    )
    .bind(owner_id)
    .bind(new_session.mode)
    .bind(new_session.duration)
    .bind(new_session.completed)
    .bind(now)
    .bind(end_time)
    .bind(&new_session.notes)
    .bind(Json(&new_session.tags))
    .bind(new_session.productivity)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    info!("Timer session {} started ({})", session.id, session.mode);
    Ok(session)
}

/// Writes the allow-listed fields in one statement. `completed: true` goes
/// through the same latch as [`end_timer_session_in_db`]: it ends a running
/// session and leaves an ended one as it was, while the other fields are
/// still written.
pub async fn update_timer_session_in_db(
    pool: &SqlitePool,
    owner_id: &str,
    session_id: i64,
    changes: TimerSessionChanges,
) -> StoreResult<TimerSession> {
    let now = Utc::now();
    debug!("Update timer session {}: {:?}", session_id, changes);

    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE timer_sessions SET updated_at = ");
    qb.push_bind(now);
    if let Some(notes) = changes.notes {
        qb.push(", notes = ").push_bind(notes);
    }
    if let Some(tags) = changes.tags {
        qb.push(", tags = ").push_bind(Json(tags));
    }
    if let Some(productivity) = changes.productivity {
        qb.push(", productivity = ").push_bind(productivity);
    }
    if changes.completed == Some(true) {
        qb.push(", completed = CASE WHEN end_time IS NULL THEN 1 ELSE completed END");
        qb.push(", end_time = COALESCE(end_time, ").push_bind(now).push(")");
    }
    qb.push(" WHERE id = ")
        .push_bind(session_id)
        .push(" AND owner_id = ")
        .push_bind(owner_id)
        .push(" RETURNING *");

    let session = qb
        .build_query_as::<TimerSession>()
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound(EntityKind::TimerSession))?;

    info!("Timer session {} updated", session.id);
    Ok(session)
}

/// Ends a running session. A session that already ended is returned
/// unchanged.
pub async fn end_timer_session_in_db(
    pool: &SqlitePool,
    owner_id: &str,
    session_id: i64,
    end: SessionEnd,
) -> StoreResult<TimerSession> {
    let now = Utc::now();
    let result = sqlx::query(end.latch_sql())
        .bind(now)
        .bind(now)
        .bind(session_id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    let session = find_timer_session_in_db(pool, owner_id, session_id).await?;
    if result.rows_affected() == 0 {
        debug!("Timer session {} had already ended", session.id);
    } else {
        info!("Timer session {} {:?}", session.id, end);
    }
    Ok(session)
}

pub async fn delete_timer_session_from_db(
    pool: &SqlitePool,
    owner_id: &str,
    session_id: i64,
) -> StoreResult<TimerSession> {
    debug!("Attempting to delete timer session with ID: {}", session_id);
    let session = sqlx::query_as::<_, TimerSession>(
        "DELETE FROM timer_sessions WHERE id = ? AND owner_id = ? RETURNING *",
    )
    .bind(session_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound(EntityKind::TimerSession))?;

    info!("Deleted timer session ID: {}", session.id);
    Ok(session)
}
