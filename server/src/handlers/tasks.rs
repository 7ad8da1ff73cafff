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
use common::{CreateTaskPayload, TaskFilter, TaskView, UpdateTaskPayload};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{Owner, StatsQuery, parse_id, parse_id_list};
use crate::database::{
    ordering::{OrderedTable, reorder_in_db},
    tasks,
};
use crate::error::{AppError, EntityKind};
use crate::stats;

/// Handler for `GET /api/tasks`.
pub async fn list_tasks(
    State(pool): State<SqlitePool>,
    owner: Owner,
    filter: Result<Query<TaskFilter>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(filter) = filter?;
    debug!("Listing tasks for {} with {:?}", owner.id(), filter);

    let now = Utc::now();
    let tasks: Vec<TaskView> = tasks::list_tasks_from_db(&pool, owner.id(), &filter)
        .await?
        .into_iter()
        .map(|task| task.view_at(now))
        .collect();

    info!("Successfully retrieved {} tasks.", tasks.len());
    Ok(Json(json!({
        "success": true,
        "count": tasks.len(),
        "tasks": tasks,
    })))
}

/// Handler for `POST /api/tasks`.
pub async fn create_task(
    State(pool): State<SqlitePool>,
    owner: Owner,
    payload: Result<Json<CreateTaskPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(payload) = payload?;
    let new_task = payload.validate()?;

    let task = tasks::create_task_in_db(&pool, owner.id(), new_task).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Task created successfully",
            "task": task.view_at(Utc::now()),
        })),
    ))
}

/// Handler for `PUT /api/tasks/{id}`.
pub async fn update_task(
    State(pool): State<SqlitePool>,
    owner: Owner,
    Path(task_id): Path<String>,
    payload: Result<Json<UpdateTaskPayload>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let task_id = parse_id(&task_id, EntityKind::Task)?;
    let Json(payload) = payload?;
    let changes = payload.validate()?;

    let task = tasks::update_task_in_db(&pool, owner.id(), task_id, changes).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Task updated successfully",
        "task": task.view_at(Utc::now()),
    })))
}

/// Handler for `DELETE /api/tasks/{id}`.
pub async fn delete_task(
    State(pool): State<SqlitePool>,
    owner: Owner,
    Path(task_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let task_id = parse_id(&task_id, EntityKind::Task)?;
    let task = tasks::delete_task_from_db(&pool, owner.id(), task_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Task deleted successfully",
        "task": task.view_at(Utc::now()),
    })))
}

/// Handler for `PATCH /api/tasks/{id}/toggle`.
pub async fn toggle_task(
    State(pool): State<SqlitePool>,
    owner: Owner,
    Path(task_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let task_id = parse_id(&task_id, EntityKind::Task)?;
    let task = tasks::toggle_task_in_db(&pool, owner.id(), task_id).await?;

    let message = if task.completed {
        "Task completed"
    } else {
        "Task marked incomplete"
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "task": task.view_at(Utc::now()),
    })))
}

/// Handler for `DELETE /api/tasks/completed`.
pub async fn clear_completed_tasks(
    State(pool): State<SqlitePool>,
    owner: Owner,
) -> Result<Json<Value>, AppError> {
    let deleted = tasks::clear_completed_tasks_in_db(&pool, owner.id()).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Deleted {} completed tasks", deleted),
        "deleted": deleted,
    })))
}

/// Handler for `PUT /api/tasks/reorder`.
pub async fn reorder_tasks(
    State(pool): State<SqlitePool>,
    owner: Owner,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = body?;
    let ids = parse_id_list(&body, "tasks", "Tasks array is required")?;

    let updated = reorder_in_db(&pool, OrderedTable::Tasks, owner.id(), &ids).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Tasks reordered successfully",
        "updated": updated,
    })))
}

/// Handler for `GET /api/tasks/stats`.
pub async fn task_stats(
    State(pool): State<SqlitePool>,
    owner: Owner,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(query) = query?;
    let stats = stats::task_stats_from_db(&pool, owner.id(), query.period(), Utc::now()).await?;

    Ok(Json(json!({ "success": true, "stats": stats })))
}
