// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ValidationError, parse_choice, trim_tags, trimmed};

/// Color given to notes created without one.
pub const DEFAULT_NOTE_COLOR: &str = "#3B82F6";

const EXCERPT_CHARS: usize = 100;

allow_list! {
    #[derive(Default)]
    pub enum Label ("label") {
        #[default]
        Work => "Work",
        Personal => "Personal",
        Study => "Study",
        Idea => "Idea",
    }
}

/// A note as stored in the `notes` table.
///
/// `pinned`, `archived` and `trashed` are independent flags. `word_count`
/// and `last_edited` are refreshed together whenever `content` changes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,

    #[serde(rename = "user")]
    pub owner_id: String,

    pub title: String,
    pub content: String,
    pub label: Label,
    pub pinned: bool,
    pub archived: bool,
    pub trashed: bool,

    #[sqlx(json)]
    pub tags: Vec<String>,

    pub color: String,
    pub order: i64,
    pub word_count: i64,
    pub last_edited: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Number of whitespace-delimited, non-empty tokens.
pub fn word_count(content: &str) -> i64 {
    content.split_whitespace().count() as i64
}

/// First hundred characters of the content, with `...` when truncated.
pub fn excerpt(content: &str) -> String {
    let mut chars = content.char_indices();
    match chars.nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

impl Note {
    pub fn view(self) -> NoteView {
        NoteView {
            excerpt: excerpt(&self.content),
            note: self,
        }
    }
}

/// A note together with its computed-on-read excerpt.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NoteView {
    #[serde(flatten)]
    pub note: Note,
    pub excerpt: String,
}

/// Body of `POST /api/notes`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotePayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub label: Option<String>,
    pub color: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A validated note, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub label: Label,
    pub color: String,
    pub tags: Vec<String>,
    pub word_count: i64,
}

impl CreateNotePayload {
    pub fn validate(self) -> Result<NewNote, ValidationError> {
        let content = trimmed(self.content);
        if content.is_empty() {
            return Err(ValidationError::new("Note content is required"));
        }

        let color = match self.color.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_NOTE_COLOR.to_string(),
            Some(color) => color.to_string(),
        };

        Ok(NewNote {
            title: trimmed(self.title),
            word_count: word_count(&content),
            content,
            label: parse_choice(self.label.as_deref())?.unwrap_or_default(),
            color,
            tags: trim_tags(self.tags.unwrap_or_default()),
        })
    }
}

/// Body of `PUT /api/notes/{id}`; the visibility flags only change through
/// their toggle endpoints.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotePayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub label: Option<String>,
    pub color: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Validated note changes. New content refreshes `word_count` and
/// `last_edited` only when it differs from the stored content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub label: Option<Label>,
    pub color: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl UpdateNotePayload {
    pub fn validate(self) -> Result<NoteChanges, ValidationError> {
        let content = match self.content {
            Some(content) => {
                let content = content.trim().to_string();
                if content.is_empty() {
                    return Err(ValidationError::new("Note content is required"));
                }
                Some(content)
            }
            None => None,
        };

        Ok(NoteChanges {
            title: self.title.map(|t| t.trim().to_string()),
            content,
            label: parse_choice(self.label.as_deref())?,
            color: self.color.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            tags: self.tags.map(trim_tags),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_note(content: &str) -> Note {
        let created = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        Note {
            id: 7,
            owner_id: "alice".to_string(),
            title: String::new(),
            content: content.to_string(),
            label: Label::Work,
            pinned: false,
            archived: false,
            trashed: false,
            tags: Vec::new(),
            color: DEFAULT_NOTE_COLOR.to_string(),
            order: 0,
            word_count: word_count(content),
            last_edited: created,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("hello world"), 2);
        assert_eq!(word_count("  a \n\t b   c "), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let short = "a".repeat(100);
        assert_eq!(excerpt(&short), short);

        let long = "é".repeat(101);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), 103);
        assert!(cut.ends_with("é..."));
    }

    #[test]
    fn test_view_adds_excerpt() {
        let json = serde_json::to_value(sample_note("a b c").view()).unwrap();
        assert_eq!(json["excerpt"], "a b c");
        assert_eq!(json["wordCount"], 3);
        assert_eq!(json["user"], "alice");
    }

    #[test]
    fn test_create_computes_word_count_and_defaults() {
        let note = CreateNotePayload {
            content: Some("  a b c ".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();

        assert_eq!(note.content, "a b c");
        assert_eq!(note.word_count, 3);
        assert_eq!(note.label, Label::Work);
        assert_eq!(note.color, DEFAULT_NOTE_COLOR);
        assert_eq!(note.title, "");
    }

    #[test]
    fn test_empty_content_is_rejected() {
        let create = CreateNotePayload {
            content: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(create.validate().is_err());

        let update = UpdateNotePayload {
            content: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            update.validate().unwrap_err().message(),
            "Note content is required"
        );
    }
}
