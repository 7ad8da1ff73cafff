// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ValidationError, dates, parse_choice, trim_tags, trimmed};

allow_list! {
    /// Area of life a task belongs to.
    #[derive(Default)]
    pub enum Category ("category") {
        #[default]
        Work => "Work",
        Personal => "Personal",
        Study => "Study",
        Fitness => "Fitness",
    }
}

allow_list! {
    #[derive(Default)]
    pub enum Priority ("priority") {
        Low => "Low",
        #[default]
        Medium => "Medium",
        High => "High",
    }
}

allow_list! {
    /// Workflow state of a task. `Completed` is kept in lock-step with
    /// [`Task::completed`] and [`Task::completed_at`].
    #[derive(Default)]
    pub enum TaskStatus ("status") {
        #[default]
        Pending => "pending",
        InProgress => "in-progress",
        Completed => "completed",
    }
}

/// A task as stored in the `tasks` table.
///
/// Invariant: `completed == true` exactly when `status == Completed`, and
/// exactly when `completed_at` is set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,

    #[serde(rename = "user")]
    pub owner_id: String,

    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: TaskStatus,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,

    #[sqlx(json)]
    pub tags: Vec<String>,

    // Dense, per-owner rank used for manual ordering.
    pub order: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A task is overdue when it has a due date in the past and is not done.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => !self.completed && due < now,
            None => false,
        }
    }

    pub fn view_at(self, now: DateTime<Utc>) -> TaskView {
        TaskView {
            is_overdue: self.is_overdue_at(now),
            task: self,
        }
    }
}

/// A task together with its computed-on-read fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub is_overdue: bool,
}

/// Body of `POST /api/tasks`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "dates::optional_datetime")]
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
}

/// A validated task, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

impl CreateTaskPayload {
    pub fn validate(self) -> Result<NewTask, ValidationError> {
        let title = trimmed(self.title);
        if title.is_empty() {
            return Err(ValidationError::new("Task title is required"));
        }

        Ok(NewTask {
            title,
            description: trimmed(self.description),
            category: parse_choice(self.category.as_deref())?.unwrap_or_default(),
            priority: parse_choice(self.priority.as_deref())?.unwrap_or_default(),
            due_date: self.due_date,
            tags: trim_tags(self.tags.unwrap_or_default()),
        })
    }
}

/// Body of `PUT /api/tasks/{id}`. Fields outside this allow-list are
/// ignored; `completed` in particular only changes through `status` or the
/// toggle endpoint.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "dates::patch_datetime")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
}

/// Validated task changes. Setting `status` also sets `completed`, and
/// `completed_at` when completion flips.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<String>>,
    pub status: Option<TaskStatus>,
}

impl UpdateTaskPayload {
    pub fn validate(self) -> Result<TaskChanges, ValidationError> {
        let title = match self.title {
            Some(title) => {
                let title = title.trim().to_string();
                if title.is_empty() {
                    return Err(ValidationError::new("Task title cannot be empty"));
                }
                Some(title)
            }
            None => None,
        };

        Ok(TaskChanges {
            title,
            description: self.description.map(|d| d.trim().to_string()),
            category: parse_choice(self.category.as_deref())?,
            priority: parse_choice(self.priority.as_deref())?,
            due_date: self.due_date,
            tags: self.tags.map(trim_tags),
            status: parse_choice(self.status.as_deref())?,
        })
    }
}
