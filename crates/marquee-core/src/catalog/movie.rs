//! Catalog entry types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::Result;
use crate::error::InvalidInputError;
use crate::types::{Genre, MovieId, Rating};

/// Duration shown on a blank form.
pub const DEFAULT_DURATION: &str = "1h 30m";

/// A catalog entry as stored by the gateway.
///
/// `id` and `created_at` are assigned by the gateway, `views` and `downloads`
/// only change through the increment calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub thumbnail_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_url: String,
    pub genre: Genre,
    pub release_date: NaiveDate,
    pub rating: Rating,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub downloads: u64,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl Movie {
    /// Assemble a stored entry from its editable fields.
    pub fn from_fields(
        id: MovieId,
        fields: MovieFields,
        views: u64,
        downloads: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            thumbnail_url: fields.thumbnail_url,
            video_url: fields.video_url,
            genre: fields.genre,
            release_date: fields.release_date,
            rating: fields.rating,
            duration: fields.duration,
            views,
            downloads,
            created_at,
        }
    }

    /// The editable part of this entry.
    pub fn fields(&self) -> MovieFields {
        MovieFields {
            title: self.title.clone(),
            description: self.description.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            video_url: self.video_url.clone(),
            genre: self.genre,
            release_date: self.release_date,
            rating: self.rating,
            duration: self.duration.clone(),
        }
    }

    /// Release year, for display.
    pub fn release_year(&self) -> i32 {
        use chrono::Datelike;
        self.release_date.year()
    }
}

/// The fields an admin edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieFields {
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub video_url: String,
    pub genre: Genre,
    pub release_date: NaiveDate,
    pub rating: Rating,
    pub duration: String,
}

impl MovieFields {
    /// Fields for a new entry, with the form defaults for everything else.
    pub fn new(title: impl Into<String>, genre: Genre, release_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            thumbnail_url: String::new(),
            video_url: String::new(),
            genre,
            release_date,
            rating: Rating::default(),
            duration: DEFAULT_DURATION.to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = url.into();
        self
    }

    pub fn with_video_url(mut self, url: impl Into<String>) -> Self {
        self.video_url = url.into();
        self
    }

    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }
}

/// Insert payload for a new entry.
///
/// Counters left as `None` are filled with zero before the insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMovie {
    #[serde(flatten)]
    pub fields: MovieFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads: Option<u64>,
}

impl NewMovie {
    pub fn new(fields: MovieFields) -> Self {
        Self {
            fields,
            views: None,
            downloads: None,
        }
    }

    /// Fill missing counters with zero.
    pub fn with_default_counters(mut self) -> Self {
        self.views.get_or_insert(0);
        self.downloads.get_or_insert(0);
        self
    }

    /// Check the fields a new entry cannot do without.
    pub fn validate(&self) -> Result<()> {
        if self.fields.title.trim().is_empty() {
            return Err(InvalidInputError::MissingField { field: "title" }.into());
        }
        if self.fields.video_url.trim().is_empty() {
            return Err(InvalidInputError::MissingField {
                field: "video source",
            }
            .into());
        }
        Ok(())
    }
}

/// Update payload.
///
/// Only the editable fields are representable, so an update can never
/// change the identifier, the creation time or the counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<Genre>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl MoviePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject empty patches and blank titles.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(InvalidInputError::Other {
                message: "nothing to update".to_string(),
            }
            .into());
        }
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(InvalidInputError::MissingField { field: "title" }.into());
        }
        Ok(())
    }

    /// Apply the present fields to a stored entry.
    pub fn apply_to(&self, movie: &mut Movie) {
        if let Some(title) = &self.title {
            movie.title = title.clone();
        }
        if let Some(description) = &self.description {
            movie.description = description.clone();
        }
        if let Some(url) = &self.thumbnail_url {
            movie.thumbnail_url = url.clone();
        }
        if let Some(url) = &self.video_url {
            movie.video_url = url.clone();
        }
        if let Some(genre) = self.genre {
            movie.genre = genre;
        }
        if let Some(date) = self.release_date {
            movie.release_date = date;
        }
        if let Some(rating) = self.rating {
            movie.rating = rating;
        }
        if let Some(duration) = &self.duration {
            movie.duration = duration.clone();
        }
    }
}

impl From<MovieFields> for MoviePatch {
    fn from(fields: MovieFields) -> Self {
        Self {
            title: Some(fields.title),
            description: Some(fields.description),
            thumbnail_url: Some(fields.thumbnail_url),
            video_url: Some(fields.video_url),
            genre: Some(fields.genre),
            release_date: Some(fields.release_date),
            rating: Some(fields.rating),
            duration: Some(fields.duration),
        }
    }
}

/// Suggested file name for a downloaded video.
pub fn download_file_name(title: &str) -> String {
    let name = title.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}.mp4", name)
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
