use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::genre::Genre;

/// Placeholder rendered when a stored timestamp cannot be parsed.
pub const UNKNOWN_DATE: &str = "Date inconnue";

const DISPLAY_FORMAT: &str = "%d/%m/%Y à %H:%M";

/// Stored announcement. Field aliases let the JSON file backend read
/// documents exported from older deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "description", default)]
    pub content: String,
    #[serde(default)]
    pub genre: String,
    #[serde(alias = "author_username", default)]
    pub author: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Announcement {
    pub fn genre_info(&self) -> &'static Genre {
        Genre::display_for(&self.genre)
    }

    pub fn created_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    pub fn display_date(&self) -> String {
        format_display_date(&self.timestamp)
    }
}

/// Fields a user submits; everything else is assigned server-side.
#[derive(Debug, Clone, Validate)]
pub struct NewAnnouncement {
    #[validate(length(min = 1, message = "Le titre de l'actualité ne peut pas être vide."))]
    pub title: String,
    #[validate(length(min = 1, message = "Le contenu de l'actualité ne peut pas être vide."))]
    pub content: String,
    pub genre: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AnnouncementFilter {
    pub genre: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl AnnouncementFilter {
    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Search term with surrounding whitespace removed; `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Case-insensitive substring match on title or content, plus the genre filter.
    pub fn matches(&self, announcement: &Announcement) -> bool {
        if let Some(ref genre) = self.genre {
            if announcement.genre != *genre {
                return false;
            }
        }
        match self.search_term() {
            Some(term) => {
                let term = term.to_lowercase();
                announcement.title.to_lowercase().contains(&term)
                    || announcement.content.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

/// Timestamp the app writes for new announcements.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Accepts RFC 3339, ISO-8601 without offset, `YYYY-MM-DD HH:MM:SS`,
/// `dd/mm/YYYY HH:MM` and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%d/%m/%Y %H:%M",
        "%d/%m/%Y à %H:%M",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn format_display_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Newest first; records with unparseable timestamps sink to the end.
pub fn sort_newest_first(announcements: &mut [Announcement]) {
    announcements.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}
