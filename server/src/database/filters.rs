// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Builds owner-scoped `SELECT` statements from the optional list filters.
//! Each present filter adds one `AND` clause; absent filters add nothing.
//! Text search runs over the fetched rows with [`matches_search`], since
//! SQLite's `lower()` only folds ASCII.
use chrono::{DateTime, Utc};
use common::{NoteFilter, TaskFilter, TimerFilter};
use sqlx::{QueryBuilder, Sqlite};

pub(crate) const TASK_ORDER_BY: &str = r#" ORDER BY "order" ASC, created_at DESC, id DESC"#;
pub(crate) const NOTE_ORDER_BY: &str =
    r#" ORDER BY pinned DESC, "order" ASC, created_at DESC, id DESC"#;
pub(crate) const TIMER_ORDER_BY: &str = " ORDER BY start_time DESC, id DESC";

fn select_owned<'a>(table: &str, owner_id: &'a str) -> QueryBuilder<'a, Sqlite> {
    let mut qb = QueryBuilder::new(format!("SELECT * FROM {table} WHERE owner_id = "));
    qb.push_bind(owner_id);
    qb
}

/// Case-insensitive substring match of `needle` against any of `fields`.
pub(crate) fn matches_search(needle: &str, fields: &[&str]) -> bool {
    let needle = needle.to_lowercase();
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Restricts `column` to values at or after `since`, when given.
pub(crate) fn push_since(
    qb: &mut QueryBuilder<'_, Sqlite>,
    column: &str,
    since: Option<DateTime<Utc>>,
) {
    if let Some(since) = since {
        qb.push(format!(" AND {column} >= ")).push_bind(since);
    }
}

pub fn task_query<'a>(owner_id: &'a str, filter: &'a TaskFilter) -> QueryBuilder<'a, Sqlite> {
    let mut qb = select_owned("tasks", owner_id);
    if let Some(completed) = filter.completed {
        qb.push(" AND completed = ").push_bind(completed);
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.as_str());
    }
    if let Some(status) = &filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    qb.push(TASK_ORDER_BY);
    qb
}

pub fn note_query<'a>(owner_id: &'a str, filter: &'a NoteFilter) -> QueryBuilder<'a, Sqlite> {
    let mut qb = select_owned("notes", owner_id);
    for (column, value) in [
        ("trashed", filter.trashed),
        ("archived", filter.archived),
        ("pinned", filter.pinned),
    ] {
        if let Some(value) = value {
            qb.push(format!(" AND {column} = ")).push_bind(value);
        }
    }
    if let Some(label) = &filter.label {
        qb.push(" AND label = ").push_bind(label.as_str());
    }
    qb.push(NOTE_ORDER_BY);
    qb
}

/// `date_from` and `date_to` are independent; together they form a closed
/// interval on `start_time`.
pub fn timer_query<'a>(owner_id: &'a str, filter: &'a TimerFilter) -> QueryBuilder<'a, Sqlite> {
    let mut qb = select_owned("timer_sessions", owner_id);
    if let Some(mode) = &filter.mode {
        qb.push(" AND mode = ").push_bind(mode.as_str());
    }
    if let Some(completed) = filter.completed {
        qb.push(" AND completed = ").push_bind(completed);
    }
    push_since(&mut qb, "start_time", filter.date_from);
    if let Some(date_to) = filter.date_to {
        qb.push(" AND start_time <= ").push_bind(date_to);
    }
    qb.push(TIMER_ORDER_BY);
    qb
}
