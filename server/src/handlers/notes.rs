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
use common::{CreateNotePayload, Note, NoteFilter, NoteView, UpdateNotePayload};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{Owner, StatsQuery, parse_id, parse_id_list};
use crate::database::{
    notes::{self, NoteFlag},
    ordering::{OrderedTable, reorder_in_db},
};
use crate::error::{AppError, EntityKind};
use crate::stats;

/// Handler for `GET /api/notes`.
pub async fn list_notes(
    State(pool): State<SqlitePool>,
    owner: Owner,
    filter: Result<Query<NoteFilter>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(filter) = filter?;
    debug!("Listing notes for {} with {:?}", owner.id(), filter);

    let notes: Vec<NoteView> = notes::list_notes_from_db(&pool, owner.id(), &filter)
        .await?
        .into_iter()
        .map(Note::view)
        .collect();

    info!("Successfully retrieved {} notes.", notes.len());
    Ok(Json(json!({
        "success": true,
        "count": notes.len(),
        "notes": notes,
    })))
}

/// Handler for `POST /api/notes`.
pub async fn create_note(
    State(pool): State<SqlitePool>,
    owner: Owner,
    payload: Result<Json<CreateNotePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(payload) = payload?;
    let new_note = payload.validate()?;

    let note = notes::create_note_in_db(&pool, owner.id(), new_note).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Note created successfully",
            "note": note.view(),
        })),
    ))
}

/// Handler for `PUT /api/notes/{id}`.
pub async fn update_note(
    State(pool): State<SqlitePool>,
    owner: Owner,
    Path(note_id): Path<String>,
    payload: Result<Json<UpdateNotePayload>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let note_id = parse_id(&note_id, EntityKind::Note)?;
    let Json(payload) = payload?;
    let changes = payload.validate()?;

    let note = notes::update_note_in_db(&pool, owner.id(), note_id, changes).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Note updated successfully",
        "note": note.view(),
    })))
}

/// Handler for `DELETE /api/notes/{id}`.
pub async fn delete_note(
    State(pool): State<SqlitePool>,
    owner: Owner,
    Path(note_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let note_id = parse_id(&note_id, EntityKind::Note)?;
    let note = notes::delete_note_from_db(&pool, owner.id(), note_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Note deleted successfully",
        "note": note.view(),
    })))
}

async fn toggle_flag(
    pool: &SqlitePool,
    owner: &Owner,
    note_id: &str,
    flag: NoteFlag,
) -> Result<Json<Value>, AppError> {
    let note_id = parse_id(note_id, EntityKind::Note)?;
    let note = notes::toggle_note_flag_in_db(pool, owner.id(), note_id, flag).await?;

    let message = match (flag, flag.get(&note)) {
        (NoteFlag::Pinned, true) => "Note pinned",
        (NoteFlag::Pinned, false) => "Note unpinned",
        (NoteFlag::Archived, true) => "Note archived",
        (NoteFlag::Archived, false) => "Note unarchived",
        (NoteFlag::Trashed, true) => "Note moved to trash",
        (NoteFlag::Trashed, false) => "Note restored",
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "note": note.view(),
    })))
}

/// Handler for `PATCH /api/notes/{id}/pin`.
pub async fn toggle_pin(
    State(pool): State<SqlitePool>,
    owner: Owner,
    Path(note_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    toggle_flag(&pool, &owner, &note_id, NoteFlag::Pinned).await
}

/// Handler for `PATCH /api/notes/{id}/archive`.
pub async fn toggle_archive(
    State(pool): State<SqlitePool>,
    owner: Owner,
    Path(note_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    toggle_flag(&pool, &owner, &note_id, NoteFlag::Archived).await
}

/// Handler for `PATCH /api/notes/{id}/trash`.
pub async fn toggle_trash(
    State(pool): State<SqlitePool>,
    owner: Owner,
    Path(note_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    toggle_flag(&pool, &owner, &note_id, NoteFlag::Trashed).await
}

/// Handler for `PUT /api/notes/reorder`.
pub async fn reorder_notes(
    State(pool): State<SqlitePool>,
    owner: Owner,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = body?;
    let ids = parse_id_list(&body, "notes", "Notes array is required")?;

    let updated = reorder_in_db(&pool, OrderedTable::Notes, owner.id(), &ids).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Notes reordered successfully",
        "updated": updated,
    })))
}

/// Handler for `GET /api/notes/stats`.
pub async fn note_stats(
    State(pool): State<SqlitePool>,
    owner: Owner,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(query) = query?;
    let stats = stats::note_stats_from_db(&pool, owner.id(), query.period(), Utc::now()).await?;

    Ok(Json(json!({ "success": true, "stats": stats })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::establish_memory_pool;

    fn alice() -> Owner {
        Owner("alice".to_string())
    }

    #[tokio::test]
    async fn test_create_note_requires_content() {
        let pool = establish_memory_pool().await.unwrap();
        let err = create_note(State(pool), alice(), Ok(Json(CreateNotePayload::default())))
            .await
            .unwrap_err();

        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Note content is required");
    }

    #[tokio::test]
    async fn test_trash_messages() {
        let pool = establish_memory_pool().await.unwrap();
        let payload = CreateNotePayload {
            content: Some("throwaway".to_string()),
            ..Default::default()
        };
        let (_, Json(body)) = create_note(State(pool.clone()), alice(), Ok(Json(payload)))
            .await
            .unwrap();
        let id = body["note"]["id"].as_i64().unwrap().to_string();
        assert_eq!(body["note"]["excerpt"], "throwaway");

        let Json(body) = toggle_trash(State(pool.clone()), alice(), Path(id.clone()))
            .await
            .unwrap();
        assert_eq!(body["message"], "Note moved to trash");

        let Json(body) = toggle_trash(State(pool), alice(), Path(id)).await.unwrap();
        assert_eq!(body["message"], "Note restored");
        assert_eq!(body["note"]["trashed"], false);
    }
}
