// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::handlers::{self, notes, tasks, timer_sessions};
use axum::{
    Router,
    routing::{delete, get, patch, put},
};
use sqlx::SqlitePool;

/// Creates and configures the application router.
///
/// Static segments (`stats`, `reorder`, `completed`, `daily-focus`) take
/// precedence over the `{id}` captures next to them. A known path called
/// with an unsupported method is answered like an unknown route.
pub fn create_router(pool: SqlitePool) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        // Tasks
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/api/tasks/stats", get(tasks::task_stats))
        .route("/api/tasks/reorder", put(tasks::reorder_tasks))
        .route("/api/tasks/completed", delete(tasks::clear_completed_tasks))
        .route(
            "/api/tasks/{id}",
            put(tasks::update_task).delete(tasks::delete_task),
        )
        .route("/api/tasks/{id}/toggle", patch(tasks::toggle_task))
        // Notes
        .route("/api/notes", get(notes::list_notes).post(notes::create_note))
        .route("/api/notes/stats", get(notes::note_stats))
        .route("/api/notes/reorder", put(notes::reorder_notes))
        .route(
            "/api/notes/{id}",
            put(notes::update_note).delete(notes::delete_note),
        )
        .route("/api/notes/{id}/pin", patch(notes::toggle_pin))
        .route("/api/notes/{id}/archive", patch(notes::toggle_archive))
        .route("/api/notes/{id}/trash", patch(notes::toggle_trash))
        // Timer sessions
        .route(
            "/api/timer-sessions",
            get(timer_sessions::list_timer_sessions).post(timer_sessions::create_timer_session),
        )
        .route("/api/timer-sessions/stats", get(timer_sessions::timer_stats))
        .route(
            "/api/timer-sessions/daily-focus",
            get(timer_sessions::daily_focus),
        )
        .route(
            "/api/timer-sessions/{id}",
            put(timer_sessions::update_timer_session).delete(timer_sessions::delete_timer_session),
        )
        .route(
            "/api/timer-sessions/{id}/complete",
            patch(timer_sessions::complete_timer_session),
        )
        .route(
            "/api/timer-sessions/{id}/interrupt",
            patch(timer_sessions::interrupt_timer_session),
        )
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        // Adds the database pool to the application state
        .with_state(pool)
}
