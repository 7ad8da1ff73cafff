// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ValidationError, trim_tags, trimmed};

pub const DEFAULT_PRODUCTIVITY: i64 = 5;
const PRODUCTIVITY_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

allow_list! {
    pub enum TimerMode ("mode") {
        Work => "work",
        ShortBreak => "shortBreak",
        LongBreak => "longBreak",
        Custom => "custom",
    }
}

/// A focus/break session as stored in the `timer_sessions` table.
///
/// A session is running while `end_time` is unset. Completing or
/// interrupting it sets `end_time` once; after that the session is final.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimerSession {
    pub id: i64,

    #[serde(rename = "user")]
    pub owner_id: String,

    pub mode: TimerMode,
    /// Planned length in seconds.
    pub duration: i64,
    pub completed: bool,
    pub interrupted: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub notes: String,

    #[sqlx(json)]
    pub tags: Vec<String>,

    pub productivity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimerSession {
    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    /// Planned duration in whole minutes, rounded to nearest.
    pub fn duration_minutes(&self) -> i64 {
        (self.duration as f64 / 60.0).round() as i64
    }

    /// Elapsed seconds between start and end, or the planned duration while
    /// the session is still running.
    pub fn actual_duration(&self) -> i64 {
        match self.end_time {
            Some(end) => (end - self.start_time).num_seconds(),
            None => self.duration,
        }
    }

    /// Marks a running session completed. Returns `false`, changing
    /// nothing, if the session already ended.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_running() {
            return false;
        }
        self.completed = true;
        self.end_time = Some(now);
        true
    }

    /// Marks a running session interrupted. Same latch as [`Self::complete`].
    pub fn interrupt(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_running() {
            return false;
        }
        self.interrupted = true;
        self.end_time = Some(now);
        true
    }

    pub fn view(self) -> TimerSessionView {
        TimerSessionView {
            duration_minutes: self.duration_minutes(),
            actual_duration: self.actual_duration(),
            session: self,
        }
    }
}

/// A session together with its computed-on-read durations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSessionView {
    #[serde(flatten)]
    pub session: TimerSession,
    pub duration_minutes: i64,
    pub actual_duration: i64,
}

/// Body of `POST /api/timer-sessions`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimerSessionPayload {
    pub mode: Option<String>,
    pub duration: Option<i64>,
    pub completed: Option<bool>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub productivity: Option<i64>,
}

/// A validated session, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimerSession {
    pub mode: TimerMode,
    pub duration: i64,
    /// Declared finished by the client at creation time.
    pub completed: bool,
    pub notes: String,
    pub tags: Vec<String>,
    pub productivity: i64,
}

fn validate_productivity(value: Option<i64>) -> Result<Option<i64>, ValidationError> {
    match value {
        Some(p) if !PRODUCTIVITY_RANGE.contains(&p) => Err(ValidationError::new(format!(
            "Productivity must be between 1 and 10, got {p}"
        ))),
        other => Ok(other),
    }
}

impl CreateTimerSessionPayload {
    pub fn validate(self) -> Result<NewTimerSession, ValidationError> {
        let (Some(mode), Some(duration)) = (self.mode.as_deref().map(str::trim), self.duration)
        else {
            return Err(ValidationError::new("Mode and duration are required"));
        };
        if mode.is_empty() {
            return Err(ValidationError::new("Mode and duration are required"));
        }
        if duration < 0 {
            return Err(ValidationError::new("Duration cannot be negative"));
        }

        Ok(NewTimerSession {
            mode: mode.parse()?,
            duration,
            completed: self.completed.unwrap_or(false),
            notes: trimmed(self.notes),
            tags: trim_tags(self.tags.unwrap_or_default()),
            productivity: validate_productivity(self.productivity)?.unwrap_or(DEFAULT_PRODUCTIVITY),
        })
    }
}

/// Body of `PUT /api/timer-sessions/{id}`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimerSessionPayload {
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub productivity: Option<i64>,
    pub completed: Option<bool>,
}

/// Validated session changes. `completed: Some(true)` ends the session the
/// same way [`TimerSession::complete`] does; `false` is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerSessionChanges {
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub productivity: Option<i64>,
    pub completed: Option<bool>,
}

impl UpdateTimerSessionPayload {
    pub fn validate(self) -> Result<TimerSessionChanges, ValidationError> {
        Ok(TimerSessionChanges {
            notes: self.notes.map(|n| n.trim().to_string()),
            tags: self.tags.map(trim_tags),
            productivity: validate_productivity(self.productivity)?,
            completed: self.completed,
        })
    }
}
