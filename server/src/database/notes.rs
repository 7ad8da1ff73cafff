// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::Utc;
use common::note::word_count;
use common::{NewNote, Note, NoteChanges, NoteFilter};
use sqlx::{QueryBuilder, Sqlite, SqlitePool, types::Json};
use tracing::{debug, info};

use super::filters;
use super::ordering::OrderedTable;
use crate::error::{EntityKind, StoreError, StoreResult};

/// The independent visibility flags of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteFlag {
    Pinned,
    Archived,
    Trashed,
}

impl NoteFlag {
    const fn toggle_sql(self) -> &'static str {
        match self {
            Self::Pinned => {
                "UPDATE notes SET pinned = NOT pinned, updated_at = ? WHERE id = ? AND owner_id = ? RETURNING *"
            }
            Self::Archived => {
                "UPDATE notes SET archived = NOT archived, updated_at = ? WHERE id = ? AND owner_id = ? RETURNING *"
            }
            Self::Trashed => {
                "UPDATE notes SET trashed = NOT trashed, updated_at = ? WHERE id = ? AND owner_id = ? RETURNING *"
            }
        }
    }

    /// Value of this flag on `note`.
    pub fn get(self, note: &Note) -> bool {
        match self {
            Self::Pinned => note.pinned,
            Self::Archived => note.archived,
            Self::Trashed => note.trashed,
        }
    }
}

/// Lists the owner's notes matching `filter`, pinned notes first.
pub async fn list_notes_from_db(
    pool: &SqlitePool,
    owner_id: &str,
    filter: &NoteFilter,
) -> StoreResult<Vec<Note>> {
    let mut qb = filters::note_query(owner_id, filter);
    let mut notes = qb.build_query_as::<Note>().fetch_all(pool).await?;
    if let Some(search) = &filter.search {
        notes.retain(|note| {
            filters::matches_search(search, &[note.title.as_str(), note.content.as_str()])
        });
    }
    Ok(notes)
}

pub async fn find_note_in_db(pool: &SqlitePool, owner_id: &str, note_id: i64) -> StoreResult<Note> {
    sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ? AND owner_id = ?")
        .bind(note_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound(EntityKind::Note))
}

/// Inserts a new note at the end of the owner's list.
pub async fn create_note_in_db(
    pool: &SqlitePool,
    owner_id: &str,
    new_note: NewNote,
) -> StoreResult<Note> {
    let now = Utc::now();
    debug!(
        "Insert note: owner_id={}, label={}, word_count={}",
        owner_id, new_note.label, new_note.word_count
    );

    let sql = format!(
        r#"INSERT INTO notes
            (owner_id, title, content, label, pinned, archived, trashed, tags, color,
             "order", word_count, last_edited, created_at, updated_at)
           VALUES (?, ?, ?, ?, 0, 0, 0, ?, ?, {}, ?, ?, ?, ?)
           RETURNING *"#,
        OrderedTable::Notes.next_order_sql()
    );

    let note = sqlx::query_as::<_, Note>(&sql)
        .bind(owner_id)
        .bind(&new_note.title)
        .bind(&new_note.content)
        .bind(new_note.label)
        .bind(Json(&new_note.tags))
        .bind(&new_note.color)
        .bind(owner_id)
        .bind(new_note.word_count)
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

    info!("Note {} created with order {}", note.id, note.order);
    Ok(note)
}

/// Writes only the columns present in `changes`, in one statement. New
/// content refreshes `word_count` and `last_edited` only when it differs
/// from what is stored.
pub async fn update_note_in_db(
    pool: &SqlitePool,
    owner_id: &str,
    note_id: i64,
    changes: NoteChanges,
) -> StoreResult<Note> {
    let now = Utc::now();
    debug!("Update note {}: {:?}", note_id, changes);

    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE notes SET updated_at = ");
    qb.push_bind(now);
    if let Some(title) = changes.title {
        qb.push(", title = ").push_bind(title);
    }
    if let Some(content) = changes.content {
        qb.push(", word_count = CASE WHEN content = ")
            .push_bind(content.clone())
            .push(" THEN word_count ELSE ")
            .push_bind(word_count(&content))
            .push(" END");
        qb.push(", last_edited = CASE WHEN content = ")
            .push_bind(content.clone())
            .push(" THEN last_edited ELSE ")
            .push_bind(now)
            .push(" END");
        qb.push(", content = ").push_bind(content);
    }
    if let Some(label) = changes.label {
        qb.push(", label = ").push_bind(label);
    }
    if let Some(color) = changes.color {
        qb.push(", color = ").push_bind(color);
    }
    if let Some(tags) = changes.tags {
        qb.push(", tags = ").push_bind(Json(tags));
    }
    qb.push(" WHERE id = ")
        .push_bind(note_id)
        .push(" AND owner_id = ")
        .push_bind(owner_id)
        .push(" RETURNING *");

    let note = qb
        .build_query_as::<Note>()
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound(EntityKind::Note))?;

    info!("Note {} updated", note.id);
    Ok(note)
}

/// Flips one visibility flag and returns the note as stored afterwards.
pub async fn toggle_note_flag_in_db(
    pool: &SqlitePool,
    owner_id: &str,
    note_id: i64,
    flag: NoteFlag,
) -> StoreResult<Note> {
    let note = sqlx::query_as::<_, Note>(flag.toggle_sql())
        .bind(Utc::now())
        .bind(note_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound(EntityKind::Note))?;

    info!("Note {} {:?} set to {}", note.id, flag, flag.get(&note));
    Ok(note)
}

/// Hard-deletes a note regardless of its trashed flag.
pub async fn delete_note_from_db(
    pool: &SqlitePool,
    owner_id: &str,
    note_id: i64,
) -> StoreResult<Note> {
    debug!("Attempting to delete note with ID: {}", note_id);
    let note = sqlx::query_as::<_, Note>("DELETE FROM notes WHERE id = ? AND owner_id = ? RETURNING *")
        .bind(note_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound(EntityKind::Note))?;

    info!("Deleted note ID: {}", note.id);
    Ok(note)
}
