// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Per-owner summary statistics.
//!
//! Grouping and summing happen in SQL; the cross-mode totals, rates and
//! the daily axis are derived in Rust by the pure functions below. Task and
//! note periods apply to `created_at`, timer periods to `start_time`.
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Utc};
use common::stats::{completion_rate, hours};
use common::{
    CategoryStat, DailyFocus, LabelStat, ModeStat, NoteStats, Period, TaskStats, TimerMode,
    TimerStats, TimerTotals,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::database::filters::push_since;
use crate::error::StoreResult;

/// Length of the daily focus axis, today included.
pub const FOCUS_DAYS: i64 = 7;

fn owned<'a>(select: &str, table: &str, owner_id: &'a str) -> QueryBuilder<'a, Sqlite> {
    let mut qb = QueryBuilder::new(format!("{select} FROM {table} WHERE owner_id = "));
    qb.push_bind(owner_id);
    qb
}

fn period_start(period: Period, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    period.lower_bound(&now.with_timezone(&Local))
}

pub async fn task_stats_from_db(
    pool: &SqlitePool,
    owner_id: &str,
    period: Period,
    now: DateTime<Utc>,
) -> StoreResult<TaskStats> {
    let since = period_start(period, now);
    debug!("Task stats for owner {} since {:?}", owner_id, since);

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT COUNT(*), COALESCE(SUM(completed), 0),
                COALESCE(SUM(CASE WHEN completed = 0 AND due_date IS NOT NULL AND due_date < ",
    );
    qb.push_bind(now)
        .push(" THEN 1 ELSE 0 END), 0) FROM tasks WHERE owner_id = ")
        .push_bind(owner_id);
    push_since(&mut qb, "created_at", since);
    let (total_tasks, completed_tasks, overdue_tasks): (i64, i64, i64) =
        qb.build_query_as().fetch_one(pool).await?;

    let mut qb = owned(
        "SELECT category, COUNT(*) AS count, COALESCE(SUM(completed), 0) AS completed",
        "tasks",
        owner_id,
    );
    push_since(&mut qb, "created_at", since);
    qb.push(" GROUP BY category ORDER BY category");
    let category_stats = qb.build_query_as::<CategoryStat>().fetch_all(pool).await?;

    Ok(TaskStats {
        total_tasks,
        completed_tasks,
        pending_tasks: total_tasks - completed_tasks,
        overdue_tasks,
        completion_rate: completion_rate(completed_tasks, total_tasks),
        category_stats,
    })
}

pub async fn note_stats_from_db(
    pool: &SqlitePool,
    owner_id: &str,
    period: Period,
    now: DateTime<Utc>,
) -> StoreResult<NoteStats> {
    let since = period_start(period, now);
    debug!("Note stats for owner {} since {:?}", owner_id, since);

    let mut qb = owned(
        "SELECT COUNT(*), COALESCE(SUM(pinned), 0), COALESCE(SUM(archived), 0),
                COALESCE(SUM(trashed), 0), COALESCE(SUM(word_count), 0)",
        "notes",
        owner_id,
    );
    push_since(&mut qb, "created_at", since);
    let (total_notes, pinned_notes, archived_notes, trashed_notes, total_words): (
        i64,
        i64,
        i64,
        i64,
        i64,
    ) = qb.build_query_as().fetch_one(pool).await?;

    let mut qb = owned(
        "SELECT label, COUNT(*) AS count, COALESCE(SUM(word_count), 0) AS total_words",
        "notes",
        owner_id,
    );
    push_since(&mut qb, "created_at", since);
    qb.push(" GROUP BY label ORDER BY label");
    let label_stats = qb.build_query_as::<LabelStat>().fetch_all(pool).await?;

    Ok(NoteStats {
        total_notes,
        pinned_notes,
        archived_notes,
        trashed_notes,
        total_words,
        label_stats,
    })
}

pub async fn timer_stats_from_db(
    pool: &SqlitePool,
    owner_id: &str,
    period: Period,
    now: DateTime<Utc>,
) -> StoreResult<TimerStats> {
    let since = period_start(period, now);
    debug!("Timer stats for owner {} since {:?}", owner_id, since);

    let mut qb = owned(
        "SELECT mode, COUNT(*) AS total_sessions,
                COALESCE(SUM(duration), 0) AS total_duration,
                COALESCE(SUM(completed), 0) AS completed_sessions,
                AVG(productivity) AS avg_productivity",
        "timer_sessions",
        owner_id,
    );
    push_since(&mut qb, "start_time", since);
    qb.push(" GROUP BY mode ORDER BY mode");
    let mode_stats = qb.build_query_as::<ModeStat>().fetch_all(pool).await?;

    Ok(summarize_modes(period, mode_stats))
}

/// Folds per-mode rows into the cross-mode totals. The overall average
/// productivity weights each mode's average by its session count.
pub fn summarize_modes(period: Period, mode_stats: Vec<ModeStat>) -> TimerStats {
    let mut totals = TimerTotals::default();
    let mut weighted = 0.0;
    for stat in &mode_stats {
        totals.total_sessions += stat.total_sessions;
        totals.total_duration += stat.total_duration;
        totals.completed_sessions += stat.completed_sessions;
        weighted += stat.avg_productivity * stat.total_sessions as f64;
    }
    if totals.total_sessions > 0 {
        totals.avg_productivity = weighted / totals.total_sessions as f64;
    }

    TimerStats {
        period,
        completion_rate: completion_rate(totals.completed_sessions, totals.total_sessions),
        total_hours: hours(totals.total_duration),
        totals,
        mode_stats,
    }
}

/// Work-mode sessions summed per UTC calendar day.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DayTotals {
    pub day: String,
    pub total_duration: i64,
    pub sessions: i64,
    pub completed_sessions: i64,
}

/// Work-mode focus for the seven days ending `today`, oldest first.
pub async fn daily_focus_from_db(
    pool: &SqlitePool,
    owner_id: &str,
    today: NaiveDate,
) -> StoreResult<Vec<DailyFocus>> {
    let first_day = today - Duration::days(FOCUS_DAYS - 1);
    let since = first_day.and_time(NaiveTime::MIN).and_utc();

    // Timestamps are stored as UTC RFC 3339 text, so the first ten
    // characters are the UTC date.
    let rows = sqlx::query_as::<_, DayTotals>(
        "SELECT substr(start_time, 1, 10) AS day,
                COALESCE(SUM(duration), 0) AS total_duration,
                COUNT(*) AS sessions,
                COALESCE(SUM(completed), 0) AS completed_sessions
         FROM timer_sessions
         WHERE owner_id = ? AND mode = ? AND start_time >= ?
         GROUP BY day",
    )
    .bind(owner_id)
    .bind(TimerMode::Work)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(bucket_daily_focus(today, &rows))
}

/// Lays `rows` onto a contiguous seven-day axis ending at `today`. Days
/// without a row are zero; rows outside the axis are dropped.
pub fn bucket_daily_focus(today: NaiveDate, rows: &[DayTotals]) -> Vec<DailyFocus> {
    (0..FOCUS_DAYS)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let key = date.format("%Y-%m-%d").to_string();
            match rows.iter().find(|row| row.day == key) {
                Some(row) => DailyFocus {
                    date,
                    total_duration: row.total_duration,
                    sessions: row.sessions,
                    completed_sessions: row.completed_sessions,
                    hours: hours(row.total_duration),
                },
                None => DailyFocus::empty(date),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{establish_memory_pool, notes, tasks, timer_sessions};
    use common::{
        Category, CreateNotePayload, CreateTaskPayload, CreateTimerSessionPayload, Label,
    };

    fn mode_stat(mode: TimerMode, sessions: i64, duration: i64, done: i64, avg: f64) -> ModeStat {
        ModeStat {
            mode,
            total_sessions: sessions,
            total_duration: duration,
            completed_sessions: done,
            avg_productivity: avg,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weighted_average_productivity() {
        let stats = summarize_modes(
            Period::Week,
            vec![
                mode_stat(TimerMode::Work, 3, 4500, 2, 8.0),
                mode_stat(TimerMode::ShortBreak, 1, 300, 1, 4.0),
            ],
        );

        assert_eq!(stats.totals.total_sessions, 4);
        assert_eq!(stats.totals.total_duration, 4800);
        assert_eq!(stats.totals.completed_sessions, 3);
        // (8*3 + 4*1) / 4, not (8 + 4) / 2
        assert_eq!(stats.totals.avg_productivity, 7.0);
        assert_eq!(stats.completion_rate, 75);
        assert_eq!(stats.total_hours, 1.3);
        assert_eq!(stats.period, Period::Week);
    }

    #[test]
    fn test_no_sessions_yields_zeroes() {
        let stats = summarize_modes(Period::All, Vec::new());
        assert_eq!(stats.totals, TimerTotals::default());
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.total_hours, 0.0);
    }

    #[test]
    fn test_daily_axis_is_full_and_contiguous() {
        let today = day(2025, 3, 2);
        let rows = vec![
            DayTotals {
                day: "2025-02-28".to_string(),
                total_duration: 3000,
                sessions: 2,
                completed_sessions: 1,
            },
            DayTotals {
                day: "2025-02-01".to_string(),
                total_duration: 99,
                sessions: 1,
                completed_sessions: 1,
            },
        ];

        let axis = bucket_daily_focus(today, &rows);

        assert_eq!(axis.len(), 7);
        assert_eq!(axis[0].date, day(2025, 2, 24));
        assert_eq!(axis[6].date, today);
        for pair in axis.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
        let feb28 = &axis[4];
        assert_eq!(feb28.date, day(2025, 2, 28));
        assert_eq!(feb28.sessions, 2);
        assert_eq!(feb28.hours, 0.8);
        assert_eq!(axis.iter().map(|d| d.sessions).sum::<i64>(), 2);
    }

    #[tokio::test]
    async fn test_task_stats_with_no_tasks() {
        let pool = establish_memory_pool().await.unwrap();
        let stats = task_stats_from_db(&pool, "alice", Period::Today, Utc::now())
            .await
            .unwrap();
        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.completion_rate, 0);
        assert!(stats.category_stats.is_empty());
    }

    #[tokio::test]
    async fn test_task_stats_counts() {
        let pool = establish_memory_pool().await.unwrap();
        let now = Utc::now();
        for (title, category, due) in [
            ("a", "Work", Some(now - Duration::days(1))),
            ("b", "Work", None),
            ("c", "Fitness", Some(now + Duration::days(1))),
        ] {
            let new_task = CreateTaskPayload {
                title: Some(title.to_string()),
                category: Some(category.to_string()),
                due_date: due,
                ..Default::default()
            }
            .validate()
            .unwrap();
            let task = tasks::create_task_in_db(&pool, "alice", new_task).await.unwrap();
            if title == "b" {
                tasks::toggle_task_in_db(&pool, "alice", task.id).await.unwrap();
            }
        }
        let other = CreateTaskPayload {
            title: Some("x".to_string()),
            ..Default::default()
        };
        tasks::create_task_in_db(&pool, "bob", other.validate().unwrap())
            .await
            .unwrap();

        let stats = task_stats_from_db(&pool, "alice", Period::All, Utc::now())
            .await
            .unwrap();

        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.pending_tasks, 2);
        assert_eq!(stats.overdue_tasks, 1);
        assert_eq!(stats.completion_rate, 33);
        assert_eq!(
            stats.category_stats,
            vec![
                CategoryStat {
                    category: Category::Fitness,
                    count: 1,
                    completed: 0
                },
                CategoryStat {
                    category: Category::Work,
                    count: 2,
                    completed: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_note_stats_sum_words_per_label() {
        let pool = establish_memory_pool().await.unwrap();
        for (content, label) in [("a b c", "Idea"), ("d e", "Idea"), ("f", "Study")] {
            let new_note = CreateNotePayload {
                content: Some(content.to_string()),
                label: Some(label.to_string()),
                ..Default::default()
            }
            .validate()
            .unwrap();
            notes::create_note_in_db(&pool, "alice", new_note).await.unwrap();
        }

        let stats = note_stats_from_db(&pool, "alice", Period::Week, Utc::now())
            .await
            .unwrap();

        assert_eq!(stats.total_notes, 3);
        assert_eq!(stats.total_words, 6);
        assert_eq!(stats.pinned_notes, 0);
        assert_eq!(stats.label_stats.len(), 2);
        assert_eq!(stats.label_stats[0].label, Label::Idea);
        assert_eq!(stats.label_stats[0].total_words, 5);
    }

    #[tokio::test]
    async fn test_timer_stats_and_daily_focus() {
        let pool = establish_memory_pool().await.unwrap();
        for (mode, duration, productivity, completed) in [
            ("work", 1500, 8, true),
            ("work", 1500, 6, false),
            ("longBreak", 900, 5, true),
        ] {
            let new_session = CreateTimerSessionPayload {
                mode: Some(mode.to_string()),
                duration: Some(duration),
                productivity: Some(productivity),
                completed: Some(completed),
                ..Default::default()
            }
            .validate()
            .unwrap();
            timer_sessions::create_timer_session_in_db(&pool, "alice", new_session)
                .await
                .unwrap();
        }

        let stats = timer_stats_from_db(&pool, "alice", Period::All, Utc::now())
            .await
            .unwrap();
        assert_eq!(stats.totals.total_sessions, 3);
        assert_eq!(stats.totals.total_duration, 3900);
        assert_eq!(stats.completion_rate, 67);
        let work = stats
            .mode_stats
            .iter()
            .find(|m| m.mode == TimerMode::Work)
            .unwrap();
        assert_eq!(work.avg_productivity, 7.0);

        let today = Utc::now().date_naive();
        let focus = daily_focus_from_db(&pool, "alice", today).await.unwrap();
        assert_eq!(focus.len(), 7);
        let last = focus.last().unwrap();
        assert_eq!(last.date, today);
        assert_eq!(last.sessions, 2);
        assert_eq!(last.completed_sessions, 1);
        assert_eq!(last.total_duration, 3000);
    }
}
