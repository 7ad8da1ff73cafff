// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::Utc;
use common::{NewTask, Task, TaskChanges, TaskFilter, TaskStatus};
use sqlx::{QueryBuilder, Sqlite, SqlitePool, types::Json};
use tracing::{debug, info};

use super::filters;
use super::ordering::OrderedTable;
use crate::error::{EntityKind, StoreError, StoreResult};

/// Lists the owner's tasks matching `filter`, in manual order.
pub async fn list_tasks_from_db(
    pool: &SqlitePool,
    owner_id: &str,
    filter: &TaskFilter,
) -> StoreResult<Vec<Task>> {
    let mut qb = filters::task_query(owner_id, filter);
    let mut tasks = qb.build_query_as::<Task>().fetch_all(pool).await?;
    if let Some(search) = &filter.search {
        tasks.retain(|task| {
            filters::matches_search(search, &[task.title.as_str(), task.description.as_str()])
        });
    }
    Ok(tasks)
}

pub async fn find_task_in_db(pool: &SqlitePool, owner_id: &str, task_id: i64) -> StoreResult<Task> {
    sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ? AND owner_id = ?")
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound(EntityKind::Task))
}

/// Inserts a new task at the end of the owner's list.
pub async fn create_task_in_db(
    pool: &SqlitePool,
    owner_id: &str,
    new_task: NewTask,
) -> StoreResult<Task> {
    let now = Utc::now();
    debug!(
        "Insert task: owner_id={}, title={}, category={}, priority={}, due_date={:?}",
        owner_id, new_task.title, new_task.category, new_task.priority, new_task.due_date
    );

    let sql = format!(
        r#"INSERT INTO tasks
            (owner_id, title, description, category, priority, status, completed,
             due_date, completed_at, tags, "order", created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, 0, ?, NULL, ?, {}, ?, ?)
           RETURNING *"#,
        OrderedTable::Tasks.next_order_sql()
    );

    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(owner_id)
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(new_task.category)
        .bind(new_task.priority)
        .bind(TaskStatus::Pending)
        .bind(new_task.due_date)
        .bind(Json(&new_task.tags))
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

    info!("Task {} created with order {}", task.id, task.order);
    Ok(task)
}

/// Writes only the columns present in `changes`, in one statement. A status change
/// sets `completed` to match, and moves `completed_at` only when completion
/// flips.
pub async fn update_task_in_db(
    pool: &SqlitePool,
    owner_id: &str,
    task_id: i64,
    changes: TaskChanges,
) -> StoreResult<Task> {
    let now = Utc::now();
    debug!("Update task {}: {:?}", task_id, changes);

    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE tasks SET updated_at = ");
    qb.push_bind(now);
    if let Some(title) = changes.title {
        qb.push(", title = ").push_bind(title);
    }
    if let Some(description) = changes.description {
        qb.push(", description = ").push_bind(description);
    }
    if let Some(category) = changes.category {
        qb.push(", category = ").push_bind(category);
    }
    if let Some(priority) = changes.priority {
        qb.push(", priority = ").push_bind(priority);
    }
    if let Some(due_date) = changes.due_date {
        qb.push(", due_date = ").push_bind(due_date);
    }
    if let Some(tags) = changes.tags {
        qb.push(", tags = ").push_bind(Json(tags));
    }
    if let Some(status) = changes.status {
        let completed = status == TaskStatus::Completed;
        qb.push(", status = ").push_bind(status);
        qb.push(", completed_at = CASE WHEN completed = ")
            .push_bind(completed)
            .push(" THEN completed_at ELSE ")
            .push_bind(completed.then_some(now))
            .push(" END");
        qb.push(", completed = ").push_bind(completed);
    }
    qb.push(" WHERE id = ")
        .push_bind(task_id)
        .push(" AND owner_id = ")
        .push_bind(owner_id)
        .push(" RETURNING *");

    let task = qb
        .build_query_as::<Task>()
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound(EntityKind::Task))?;

    info!("Task {} updated", task.id);
    Ok(task)
}

/// Flips completion. `completed`, `status` and `completed_at` change
/// together in one statement.
pub async fn toggle_task_in_db(pool: &SqlitePool, owner_id: &str, task_id: i64) -> StoreResult<Task> {
    let now = Utc::now();
    let task = sqlx::query_as::<_, Task>(
        "UPDATE tasks SET
            completed = NOT completed,
            status = CASE WHEN completed THEN ? ELSE ? END,
            completed_at = CASE WHEN completed THEN NULL ELSE ? END,
            updated_at = ?
         WHERE id = ? AND owner_id = ?
         RETURNING *",
    )
    .bind(TaskStatus::Pending)
    .bind(TaskStatus::Completed)
    .bind(now)
    .bind(now)
    .bind(task_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound(EntityKind::Task))?;

    info!("Task {} toggled, completed={}", task.id, task.completed);
    Ok(task)
}

/// Hard-deletes a task and returns its last state.
pub async fn delete_task_from_db(
    pool: &SqlitePool,
    owner_id: &str,
    task_id: i64,
) -> StoreResult<Task> {
    debug!("Attempting to delete task with ID: {}", task_id);
    let task = sqlx::query_as::<_, Task>("DELETE FROM tasks WHERE id = ? AND owner_id = ? RETURNING *")
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound(EntityKind::Task))?;

    info!("Deleted task ID: {}", task.id);
    Ok(task)
}

/// Deletes every completed task of the owner. Returns how many were removed.
pub async fn clear_completed_tasks_in_db(pool: &SqlitePool, owner_id: &str) -> StoreResult<u64> {
    let result = sqlx::query("DELETE FROM tasks WHERE owner_id = ? AND completed = 1")
        .bind(owner_id)
        .execute(pool)
        .await?;

    let removed = result.rows_affected();
    info!("Cleared {} completed tasks for owner {}", removed, owner_id);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::establish_memory_pool;
    use common::{Category, CreateTaskPayload, UpdateTaskPayload};

    fn payload(title: &str) -> NewTask {
        CreateTaskPayload {
            title: Some(title.to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list_task() {
        let pool = establish_memory_pool().await.unwrap();

        let created = create_task_in_db(&pool, "alice", payload("Write draft"))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.owner_id, "alice");
        assert_eq!(created.order, 0);
        assert!(!created.completed);
        assert_eq!(created.status, TaskStatus::Pending);
        assert_eq!(created.completed_at, None);

        let listed = list_tasks_from_db(&pool, "alice", &TaskFilter::default())
            .await
            .unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn test_listing_never_crosses_owners() {
        let pool = establish_memory_pool().await.unwrap();
        create_task_in_db(&pool, "alice", payload("mine")).await.unwrap();
        let theirs = create_task_in_db(&pool, "bob", payload("theirs")).await.unwrap();

        let listed = list_tasks_from_db(&pool, "alice", &TaskFilter::default())
            .await
            .unwrap();
        assert!(listed.iter().all(|t| t.owner_id == "alice"));

        assert!(matches!(
            find_task_in_db(&pool, "alice", theirs.id).await,
            Err(StoreError::NotFound(EntityKind::Task))
        ));
        assert!(matches!(
            delete_task_from_db(&pool, "alice", theirs.id).await,
            Err(StoreError::NotFound(EntityKind::Task))
        ));
        assert!(find_task_in_db(&pool, "bob", theirs.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_filters() {
        let pool = establish_memory_pool().await.unwrap();
        let mut gym = payload("Leg day");
        gym.category = Category::Fitness;
        create_task_in_db(&pool, "alice", gym).await.unwrap();
        let mut report = payload("Quarterly report");
        report.description = "Send to the BOARD".to_string();
        let report = create_task_in_db(&pool, "alice", report).await.unwrap();
        toggle_task_in_db(&pool, "alice", report.id).await.unwrap();

        let fitness = TaskFilter {
            category: Some("Fitness".to_string()),
            ..Default::default()
        };
        let found = list_tasks_from_db(&pool, "alice", &fitness).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Leg day");

        let search = TaskFilter {
            search: Some("board".to_string()),
            ..Default::default()
        };
        let found = list_tasks_from_db(&pool, "alice", &search).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, report.id);

        let accented = create_task_in_db(&pool, "alice", payload("Élan Über"))
            .await
            .unwrap();
        for needle in ["élan", "über", "ÉLAN"] {
            let search = TaskFilter {
                search: Some(needle.to_string()),
                ..Default::default()
            };
            let found = list_tasks_from_db(&pool, "alice", &search).await.unwrap();
            assert_eq!(found.len(), 1, "search {needle}");
            assert_eq!(found[0].id, accented.id);
        }
        delete_task_from_db(&pool, "alice", accented.id).await.unwrap();

        let open = TaskFilter {
            completed: Some(false),
            ..Default::default()
        };
        let found = list_tasks_from_db(&pool, "alice", &open).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Leg day");

        let done = TaskFilter {
            status: Some("completed".to_string()),
            ..Default::default()
        };
        let found = list_tasks_from_db(&pool, "alice", &done).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, report.id);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_completion_fields() {
        let pool = establish_memory_pool().await.unwrap();
        let task = create_task_in_db(&pool, "alice", payload("Toggle me"))
            .await
            .unwrap();

        let done = toggle_task_in_db(&pool, "alice", task.id).await.unwrap();
        assert!(done.completed);
        assert_eq!(done.status, TaskStatus::Completed);
        assert!(done.completed_at.is_some());

        let undone = toggle_task_in_db(&pool, "alice", task.id).await.unwrap();
        assert!(!undone.completed);
        assert_eq!(undone.status, TaskStatus::Pending);
        assert_eq!(undone.completed_at, None);

        assert!(matches!(
            toggle_task_in_db(&pool, "bob", task.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_applies_allow_list_only() {
        let pool = establish_memory_pool().await.unwrap();
        let task = create_task_in_db(&pool, "alice", payload("Draft"))
            .await
            .unwrap();

        let changes: UpdateTaskPayload = serde_json::from_str(
            r#"{"title": " Final ", "tags": [" x "], "order": 42, "completed": true}"#,
        )
        .unwrap();
        let updated = update_task_in_db(&pool, "alice", task.id, changes.validate().unwrap())
            .await
            .unwrap();

        assert_eq!(updated.title, "Final");
        assert_eq!(updated.tags, vec!["x"]);
        assert_eq!(updated.order, 0);
        assert!(!updated.completed);

        let stored = find_task_in_db(&pool, "alice", task.id).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_status_change_keeps_completion_coupled() {
        let pool = establish_memory_pool().await.unwrap();
        let task = create_task_in_db(&pool, "alice", payload("Ship it"))
            .await
            .unwrap();
        let status = |value: TaskStatus| TaskChanges {
            status: Some(value),
            ..Default::default()
        };

        let done = update_task_in_db(&pool, "alice", task.id, status(TaskStatus::Completed))
            .await
            .unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());

        let again = update_task_in_db(&pool, "alice", task.id, status(TaskStatus::Completed))
            .await
            .unwrap();
        assert_eq!(again.completed_at, done.completed_at);

        let reopened = update_task_in_db(&pool, "alice", task.id, status(TaskStatus::InProgress))
            .await
            .unwrap();
        assert!(!reopened.completed);
        assert_eq!(reopened.status, TaskStatus::InProgress);
        assert_eq!(reopened.completed_at, None);
    }

    #[tokio::test]
    async fn test_update_without_status_keeps_toggled_completion() {
        let pool = establish_memory_pool().await.unwrap();
        let task = create_task_in_db(&pool, "alice", payload("Race"))
            .await
            .unwrap();

        let toggled = toggle_task_in_db(&pool, "alice", task.id).await.unwrap();
        let changes = TaskChanges {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = update_task_in_db(&pool, "alice", task.id, changes)
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert!(updated.completed);
        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.completed_at, toggled.completed_at);
    }

    #[tokio::test]
    async fn test_update_missing_task_is_not_found() {
        let pool = establish_memory_pool().await.unwrap();
        let result = update_task_in_db(&pool, "alice", 999, TaskChanges::default()).await;
        assert!(matches!(result, Err(StoreError::NotFound(EntityKind::Task))));
    }

    #[tokio::test]
    async fn test_delete_returns_prior_state() {
        let pool = establish_memory_pool().await.unwrap();
        let task = create_task_in_db(&pool, "alice", payload("Gone soon"))
            .await
            .unwrap();

        let deleted = delete_task_from_db(&pool, "alice", task.id).await.unwrap();
        assert_eq!(deleted, task);
        assert!(
            list_tasks_from_db(&pool, "alice", &TaskFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_clear_completed_only_touches_owner() {
        let pool = establish_memory_pool().await.unwrap();
        let a = create_task_in_db(&pool, "alice", payload("a")).await.unwrap();
        create_task_in_db(&pool, "alice", payload("b")).await.unwrap();
        let c = create_task_in_db(&pool, "bob", payload("c")).await.unwrap();
        toggle_task_in_db(&pool, "alice", a.id).await.unwrap();
        toggle_task_in_db(&pool, "bob", c.id).await.unwrap();

        let removed = clear_completed_tasks_in_db(&pool, "alice").await.unwrap();

        assert_eq!(removed, 1);
        let left = list_tasks_from_db(&pool, "alice", &TaskFilter::default())
            .await
            .unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].title, "b");
        assert!(find_task_in_db(&pool, "bob", c.id).await.is_ok());
    }
}
