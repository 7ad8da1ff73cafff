// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Domain models shared by the FocusForge server and its clients.
//!
//! Every entity is owned by exactly one user. The models here carry the
//! persisted fields only; derived values (`isOverdue`, `excerpt`,
//! `durationMinutes`, `actualDuration`) are computed on read by the
//! `*View` wrappers and are never stored.
use std::borrow::Cow;

#[macro_use]
mod macros;

pub mod dates;
pub mod filter;
pub mod note;
pub mod period;
pub mod stats;
pub mod task;
pub mod timer;

pub use filter::{NoteFilter, TaskFilter, TimerFilter};
pub use note::{CreateNotePayload, Label, NewNote, Note, NoteChanges, NoteView, UpdateNotePayload};
pub use period::Period;
pub use stats::{
    CategoryStat, DailyFocus, LabelStat, ModeStat, NoteStats, TaskStats, TimerStats, TimerTotals,
};
pub use task::{
    Category, CreateTaskPayload, NewTask, Priority, Task, TaskChanges, TaskStatus, TaskView,
    UpdateTaskPayload,
};
pub use timer::{
    CreateTimerSessionPayload, NewTimerSession, TimerMode, TimerSession, TimerSessionChanges,
    TimerSessionView, UpdateTimerSessionPayload,
};

/// Rejection produced by the explicit validation functions of each entity
/// kind. The message is meant to be shown to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: Cow<'static, str>,
}

impl ValidationError {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Trims a free-text field, treating `None` as empty.
pub(crate) fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Trims every tag in place. Order and duplicates are preserved.
pub(crate) fn trim_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter().map(|t| t.trim().to_string()).collect()
}

/// Parses an optional allow-listed value. An absent or empty value yields
/// `None` so the caller can fall back to the default.
pub(crate) fn parse_choice<T>(raw: Option<&str>) -> Result<Option<T>, ValidationError>
where
    T: std::str::FromStr<Err = ValidationError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}
