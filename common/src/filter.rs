// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Optional list filters, deserialized straight from the query string.
//!
//! Every field is independent and `None` means "no constraint". Empty
//! strings count as absent, and boolean flags are `true` only for the
//! literal `true`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::dates;

fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(|raw| raw == "true"))
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|raw| !raw.is_empty()))
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    #[serde(default, deserialize_with = "flag")]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "non_empty")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub status: Option<String>,
    /// Case-insensitive substring of title or description.
    #[serde(default, deserialize_with = "non_empty")]
    pub search: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NoteFilter {
    #[serde(default, deserialize_with = "flag")]
    pub trashed: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub archived: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub pinned: Option<bool>,
    #[serde(default, deserialize_with = "non_empty")]
    pub label: Option<String>,
    /// Case-insensitive substring of title or content.
    #[serde(default, deserialize_with = "non_empty")]
    pub search: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerFilter {
    #[serde(default, deserialize_with = "non_empty")]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub completed: Option<bool>,
    /// Inclusive lower bound on `startTime`.
    #[serde(default, deserialize_with = "dates::optional_datetime")]
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `startTime`.
    #[serde(default, deserialize_with = "dates::range_end")]
    pub date_to: Option<DateTime<Utc>>,
}
