use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Category assigned when a note doesn't carry one.
pub const DEFAULT_CATEGORY: &str = "Miscellaneous";

/// Wire format for reminders (what the server's create/update routes parse).
pub const REMINDER_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// How reminders are shown to people
pub const REMINDER_DISPLAY: &str = "%a %b %-d %Y, %H:%M";

/// Note identifier. Server-assigned when authenticated, a millisecond
/// timestamp in guest mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(NoteId)
            .map_err(|_| format!("invalid note id '{}'", s))
    }
}

/// A single note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(default, deserialize_with = "string_or_null")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub content: String,
    #[serde(default = "default_category", deserialize_with = "category_or_default")]
    pub category: String,
    #[serde(default, with = "reminder_serde")]
    pub reminder_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "bool_or_null")]
    pub is_pinned: bool,
    #[serde(default, with = "timestamp_serde")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp_serde")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    /// Title for display, `Untitled` when empty
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    /// First 30 characters of the content, or `No content`
    pub fn snippet(&self) -> String {
        if self.content.is_empty() {
            "No content".to_string()
        } else {
            self.content.chars().take(30).collect()
        }
    }

    /// The instant used for recency ordering
    pub fn last_touched(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }

    /// Overlay every field of `draft` except identity and creation time
    pub fn apply_draft(&mut self, draft: &NoteDraft) {
        self.title = draft.title.clone();
        self.content = draft.content.clone();
        self.category = normalize_category(&draft.category);
        self.reminder_date = draft.reminder_date;
        self.is_pinned = draft.is_pinned;
    }

    /// Build the editable form of this note
    pub fn to_draft(&self) -> NoteDraft {
        NoteDraft {
            id: Some(self.id),
            title: self.title.clone(),
            content: self.content.clone(),
            category: self.category.clone(),
            reminder_date: self.reminder_date,
            is_pinned: self.is_pinned,
        }
    }

    /// Reminder rendered in the wire format, if any
    pub fn reminder_string(&self) -> Option<String> {
        self.reminder_date
            .map(|d| d.format(REMINDER_FORMAT).to_string())
    }
}

/// A note as submitted by the user: `id` is `None` for a new note.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDraft {
    pub id: Option<NoteId>,
    pub title: String,
    pub content: String,
    pub category: String,
    pub reminder_date: Option<NaiveDateTime>,
    pub is_pinned: bool,
}

impl Default for NoteDraft {
    fn default() -> Self {
        NoteDraft {
            id: None,
            title: String::new(),
            content: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            reminder_date: None,
            is_pinned: false,
        }
    }
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        NoteDraft {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Trim title and content in place
    pub fn trimmed(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.content = self.content.trim().to_string();
        self
    }

    /// A note needs a title or some content
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }

    /// Request body for the create/update routes
    pub fn to_payload(&self) -> NotePayload {
        NotePayload {
            title: self.title.clone(),
            content: self.content.clone(),
            category: normalize_category(&self.category),
            reminder_date: self
                .reminder_date
                .map(|d| d.format(REMINDER_FORMAT).to_string())
                .unwrap_or_default(),
            is_pinned: self.is_pinned,
        }
    }
}

/// Partial edit: `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    /// `Some(None)` clears the reminder
    pub reminder_date: Option<Option<NaiveDateTime>>,
    pub is_pinned: Option<bool>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        *self == NotePatch::default()
    }

    /// Apply onto an existing note's draft
    pub fn apply_to(&self, mut draft: NoteDraft) -> NoteDraft {
        if let Some(t) = &self.title {
            draft.title = t.clone();
        }
        if let Some(c) = &self.content {
            draft.content = c.clone();
        }
        if let Some(c) = &self.category {
            draft.category = c.clone();
        }
        if let Some(r) = self.reminder_date {
            draft.reminder_date = r;
        }
        if let Some(p) = self.is_pinned {
            draft.is_pinned = p;
        }
        draft
    }
}

/// Body of `POST /create_note` and `PUT /update_note/{id}`.
/// An empty `reminder_date` tells the server there is no reminder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotePayload {
    pub title: String,
    pub content: String,
    pub category: String,
    pub reminder_date: String,
    pub is_pinned: bool,
}

/// Pinned first, then most recently touched first. Undated notes go last
/// within their pin group.
pub fn display_order(a: &Note, b: &Note) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| match (a.last_touched(), b.last_touched()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

pub fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse a reminder typed by a user or sent by the server.
///
/// Accepts `YYYY-MM-DDTHH:MM`, the same with seconds (and fractions), a space
/// instead of `T`, or RFC 3339 (converted to UTC wall time).
pub fn parse_reminder(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in [
        REMINDER_FORMAT,
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).naive_utc())
}

/// Parse a creation/update timestamp. Naive values are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn string_or_null<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn bool_or_null<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(d)?.unwrap_or(false))
}

fn category_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
    Ok(normalize_category(&raw))
}

mod reminder_serde {
    use super::*;

    pub fn serialize<S: Serializer>(v: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(dt) => s.serialize_str(&dt.format(REMINDER_FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.as_deref().and_then(parse_reminder))
    }
}

mod timestamp_serde {
    use super::*;

    pub fn serialize<S: Serializer>(v: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(dt) => s.serialize_str(&dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn at(h: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2025, 3, 1, h, 0, 0).unwrap())
    }

    fn note(id: i64, pinned: bool, updated: Option<DateTime<Utc>>) -> Note {
        Note {
            id: NoteId(id),
            title: format!("n{}", id),
            content: String::new(),
            category: DEFAULT_CATEGORY.into(),
            reminder_date: None,
            is_pinned: pinned,
            created_at: None,
            updated_at: updated,
        }
    }

    #[test]
    fn pinned_sort_first_then_newest() {
        let mut notes = vec![
            note(1, false, at(9)),
            note(2, true, at(1)),
            note(3, false, at(12)),
            note(4, true, at(5)),
        ];
        notes.sort_by(display_order);
        let ids: Vec<i64> = notes.iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn undated_notes_sort_last_in_group() {
        let mut notes = vec![note(1, false, None), note(2, false, at(3))];
        notes.sort_by(display_order);
        assert_eq!(notes[0].id, NoteId(2));
    }

    #[test]
    fn created_at_is_fallback_for_ordering() {
        let mut a = note(1, false, None);
        a.created_at = at(10);
        let b = note(2, false, at(8));
        let mut notes = vec![b, a];
        notes.sort_by(display_order);
        assert_eq!(notes[0].id, NoteId(1));
    }

    #[test]
    fn deserialize_server_note() {
        let json = r#"{
            "id": 7,
            "title": "Groceries",
            "content": "milk",
            "category": null,
            "is_pinned": true,
            "created_at": "2025-03-01T10:00:00.123456",
            "updated_at": "2025-03-01T11:00:00+00:00",
            "reminder_date": "2025-03-02T09:30:00"
        }"#;
        let n: Note = serde_json::from_str(json).unwrap();
        assert_eq!(n.id, NoteId(7));
        assert_eq!(n.category, DEFAULT_CATEGORY);
        assert!(n.is_pinned);
        assert_eq!(n.updated_at, at(11));
        assert_eq!(
            n.reminder_date,
            Some(
                NaiveDate::from_ymd_opt(2025, 3, 2)
                    .unwrap()
                    .and_hms_opt(9, 30, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn deserialize_guest_note_with_blank_reminder() {
        let json = r#"{"id": 1700000000000, "title": "t", "content": "c",
            "category": "Work", "reminder_date": "", "is_pinned": false}"#;
        let n: Note = serde_json::from_str(json).unwrap();
        assert_eq!(n.reminder_date, None);
        assert_eq!(n.created_at, None);
        assert_eq!(n.category, "Work");
    }

    #[test]
    fn reminder_serializes_in_wire_format() {
        let mut n = note(1, false, at(1));
        n.reminder_date = parse_reminder("2025-04-05T06:07");
        let v = serde_json::to_value(&n).unwrap();
        assert_eq!(v["reminder_date"], "2025-04-05T06:07");
    }

    #[test]
    fn parse_reminder_variants() {
        assert!(parse_reminder("2025-04-05T06:07").is_some());
        assert!(parse_reminder("2025-04-05 06:07").is_some());
        assert!(parse_reminder("2025-04-05T06:07:08.5").is_some());
        assert!(parse_reminder("2025-04-05T06:07:00Z").is_some());
        assert!(parse_reminder("tomorrow").is_none());
        assert!(parse_reminder("  ").is_none());
    }

    #[test]
    fn snippet_and_title_fallbacks() {
        let mut n = note(1, false, None);
        n.title.clear();
        assert_eq!(n.display_title(), "Untitled");
        assert_eq!(n.snippet(), "No content");
        n.content = "é".repeat(40);
        assert_eq!(n.snippet().chars().count(), 30);
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut n = note(3, true, at(2));
        n.reminder_date = parse_reminder("2025-01-01T00:00");
        let patch = NotePatch {
            content: Some("new body".into()),
            reminder_date: Some(None),
            ..Default::default()
        };
        let draft = patch.apply_to(n.to_draft());
        assert_eq!(draft.title, "n3");
        assert_eq!(draft.content, "new body");
        assert!(draft.is_pinned);
        assert_eq!(draft.reminder_date, None);
    }

    #[test]
    fn payload_uses_empty_string_for_no_reminder() {
        let p = NoteDraft::new("a", "b").to_payload();
        assert_eq!(p.reminder_date, "");
        assert_eq!(p.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn blank_draft_detection() {
        assert!(NoteDraft::new("  ", "\n").is_blank());
        assert!(!NoteDraft::new("", "x").is_blank());
    }

    #[test]
    fn note_id_parse() {
        assert_eq!("42".parse::<NoteId>(), Ok(NoteId(42)));
        assert!("abc".parse::<NoteId>().is_err());
    }
}
