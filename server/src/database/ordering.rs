// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Per-owner manual ordering for tasks and notes.
//!
//! Each owner has an independent `order` sequence per table. New rows are
//! appended after the current maximum; a reorder rewrites `order` to the
//! position of each id in the caller's list.
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{EntityKind, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderedTable {
    Tasks,
    Notes,
}

impl OrderedTable {
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Tasks => EntityKind::Task,
            Self::Notes => EntityKind::Note,
        }
    }

    /// Scalar subquery computing the append position for the owner bound to
    /// its single placeholder: one past the current maximum, or 0.
    ///
    /// Embedded in the `INSERT`, so the read and the write are one
    /// statement. Concurrent creates may still tie; listings break ties by
    /// creation time.
    pub const fn next_order_sql(self) -> &'static str {
        match self {
            Self::Tasks => r#"(SELECT COALESCE(MAX("order") + 1, 0) FROM tasks WHERE owner_id = ?)"#,
            Self::Notes => r#"(SELECT COALESCE(MAX("order") + 1, 0) FROM notes WHERE owner_id = ?)"#,
        }
    }

    const fn reorder_sql(self) -> &'static str {
        match self {
            Self::Tasks => {
                r#"UPDATE tasks SET "order" = ?, updated_at = ? WHERE id = ? AND owner_id = ?"#
            }
            Self::Notes => {
                r#"UPDATE notes SET "order" = ?, updated_at = ? WHERE id = ? AND owner_id = ?"#
            }
        }
    }
}

/// Assigns `order = position` to each id, in list order.
///
/// `None` stands for an id that could not be parsed; it keeps its position
/// but matches nothing. Ids not owned by `owner_id` are skipped the same
/// way. Each row is written on its own, so a failure part-way leaves the
/// earlier positions applied. Returns the number of rows updated.
pub async fn reorder_in_db(
    pool: &SqlitePool,
    table: OrderedTable,
    owner_id: &str,
    ids: &[Option<i64>],
) -> StoreResult<u64> {
    debug!(
        "Reordering {} {:?} entries for owner {}",
        ids.len(),
        table.kind(),
        owner_id
    );
    let now = Utc::now();
    let mut updated = 0;

    for (position, id) in ids.iter().copied().enumerate() {
        let Some(id) = id else {
            continue;
        };
        let result = sqlx::query(table.reorder_sql())
            .bind(position as i64)
            .bind(now)
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        updated += result.rows_affected();
    }

    info!(
        "Reordered {} of {} {:?} entries for owner {}",
        updated,
        ids.len(),
        table.kind(),
        owner_id
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{establish_memory_pool, notes, tasks};
    use common::{CreateNotePayload, CreateTaskPayload, NoteFilter, TaskFilter};

    async fn add_task(pool: &SqlitePool, owner: &str, title: &str) -> i64 {
        let new_task = CreateTaskPayload {
            title: Some(title.to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        tasks::create_task_in_db(pool, owner, new_task).await.unwrap().id
    }

    async fn titles(pool: &SqlitePool, owner: &str) -> Vec<String> {
        tasks::list_tasks_from_db(pool, owner, &TaskFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect()
    }

    #[tokio::test]
    async fn test_append_orders_are_dense_per_owner() {
        let pool = establish_memory_pool().await.unwrap();

        for i in 0..4 {
            add_task(&pool, "alice", &format!("a{i}")).await;
        }
        add_task(&pool, "bob", "b0").await;

        let alice = tasks::list_tasks_from_db(&pool, "alice", &TaskFilter::default())
            .await
            .unwrap();
        let orders: Vec<i64> = alice.iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);

        let bob = tasks::list_tasks_from_db(&pool, "bob", &TaskFilter::default())
            .await
            .unwrap();
        assert_eq!(bob[0].order, 0);
    }

    #[tokio::test]
    async fn test_tasks_and_notes_have_separate_sequences() {
        let pool = establish_memory_pool().await.unwrap();
        add_task(&pool, "alice", "t0").await;
        add_task(&pool, "alice", "t1").await;

        let note = CreateNotePayload {
            content: Some("first".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let note = notes::create_note_in_db(&pool, "alice", note).await.unwrap();
        assert_eq!(note.order, 0);

        let listed = notes::list_notes_from_db(&pool, "alice", &NoteFilter::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_reorder_applies_positions() {
        let pool = establish_memory_pool().await.unwrap();
        let a = add_task(&pool, "alice", "a").await;
        let b = add_task(&pool, "alice", "b").await;
        let c = add_task(&pool, "alice", "c").await;

        let updated = reorder_in_db(&pool, OrderedTable::Tasks, "alice", &[Some(c), Some(a), Some(b)])
            .await
            .unwrap();

        assert_eq!(updated, 3);
        assert_eq!(titles(&pool, "alice").await, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_reorder_skips_foreign_and_unparsable_ids() {
        let pool = establish_memory_pool().await.unwrap();
        let a = add_task(&pool, "alice", "a").await;
        let b = add_task(&pool, "alice", "b").await;
        let mallory = add_task(&pool, "mallory", "m").await;

        let updated = reorder_in_db(
            &pool,
            OrderedTable::Tasks,
            "alice",
            &[Some(mallory), None, Some(b), Some(a)],
        )
        .await
        .unwrap();
        assert_eq!(updated, 2);

        let alice = tasks::list_tasks_from_db(&pool, "alice", &TaskFilter::default())
            .await
            .unwrap();
        assert_eq!(alice[0].id, b);
        assert_eq!(alice[0].order, 2);
        assert_eq!(alice[1].id, a);
        assert_eq!(alice[1].order, 3);

        let theirs = tasks::list_tasks_from_db(&pool, "mallory", &TaskFilter::default())
            .await
            .unwrap();
        assert_eq!(theirs[0].order, 0);
    }
}
