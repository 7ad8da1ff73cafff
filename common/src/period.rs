// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Named time range for statistics queries.
///
/// `Today` and `Month` start at local midnight, `Week` is a rolling seven
/// days. `All` has no lower bound.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
    #[default]
    All,
}

impl Period {
    /// Reads the `period` query parameter. Missing or unrecognized values
    /// mean `All`, for every entity kind.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("today") => Self::Today,
            Some("week") => Self::Week,
            Some("month") => Self::Month,
            _ => Self::All,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::All => "all",
        }
    }

    /// Inclusive start of the period as seen from `now`. Calendar
    /// boundaries are taken in `now`'s time zone.
    pub fn lower_bound<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        match self {
            Self::Today => Some(local_midnight(now, now.date_naive())),
            Self::Week => Some(now.with_timezone(&Utc) - Duration::days(7)),
            Self::Month => {
                let today = now.date_naive();
                // Day-of-month is clamped when last month is shorter.
                let day = today.checked_sub_months(Months::new(1)).unwrap_or(today);
                Some(local_midnight(now, day))
            }
            Self::All => None,
        }
    }
}

fn local_midnight<Tz: TimeZone>(now: &DateTime<Tz>, day: NaiveDate) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::MIN);
    now.timezone()
        .from_local_datetime(&naive)
        .earliest()
        .map_or_else(|| naive.and_utc(), |local| local.with_timezone(&Utc))
}
