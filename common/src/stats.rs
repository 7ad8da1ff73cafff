// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Response shapes for the statistics endpoints, plus the small rounding
//! rules they share.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Category, Label, Period, TimerMode};

/// `round(100 * part / total)`, or 0 for an empty total.
pub fn completion_rate(part: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (part as f64 * 100.0 / total as f64).round() as i64
}

/// Seconds to hours, rounded to one decimal place.
pub fn hours(seconds: i64) -> f64 {
    (seconds as f64 / 3600.0 * 10.0).round() / 10.0
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category: Category,
    pub count: i64,
    pub completed: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    pub overdue_tasks: i64,
    pub completion_rate: i64,
    pub category_stats: Vec<CategoryStat>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LabelStat {
    pub label: Label,
    pub count: i64,
    pub total_words: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteStats {
    pub total_notes: i64,
    pub pinned_notes: i64,
    pub archived_notes: i64,
    pub trashed_notes: i64,
    pub total_words: i64,
    pub label_stats: Vec<LabelStat>,
}

/// Per-mode aggregate of timer sessions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ModeStat {
    pub mode: TimerMode,
    pub total_sessions: i64,
    pub total_duration: i64,
    pub completed_sessions: i64,
    pub avg_productivity: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimerTotals {
    pub total_sessions: i64,
    pub total_duration: i64,
    pub completed_sessions: i64,
    /// Session-weighted mean of the per-mode averages.
    pub avg_productivity: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerStats {
    pub period: Period,
    pub totals: TimerTotals,
    pub mode_stats: Vec<ModeStat>,
    pub completion_rate: i64,
    pub total_hours: f64,
}

/// One day of work-mode focus time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyFocus {
    pub date: NaiveDate,
    pub total_duration: i64,
    pub sessions: i64,
    pub completed_sessions: i64,
    pub hours: f64,
}

impl DailyFocus {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_duration: 0,
            sessions: 0,
            completed_sessions: 0,
            hours: 0.0,
        }
    }
}
