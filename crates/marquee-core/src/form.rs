//! Admin movie form.
//!
//! Turns what an administrator entered into a catalog write, uploading a
//! video file to object storage first when one was picked.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::Result;
use crate::catalog::{Movie, MovieFields, MoviePatch, NewMovie};
use crate::error::{Error, UploadError};
use crate::notice::Notice;
use crate::store::CatalogStore;
use crate::traits::{CatalogGateway, StorageGateway};
use crate::types::MovieId;

/// Bucket that holds uploaded videos.
pub const DEFAULT_VIDEO_BUCKET: &str = "movie-videos";

/// Content type used when a file does not name one.
const DEFAULT_VIDEO_TYPE: &str = "video/mp4";

const PLACEHOLDER_HOST: &str = "https://picsum.photos";

/// Longest base name kept for an uploaded file.
const MAX_BASE_NAME: usize = 50;

/// A video file picked for upload.
#[derive(Clone)]
pub struct VideoFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl std::fmt::Debug for VideoFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Where the entry's video comes from.
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// An external URL.
    Url(String),
    /// A file to upload.
    File(VideoFile),
    /// Leave the current video URL as it is.
    Keep,
}

/// Contents of the add/edit form.
#[derive(Debug, Clone)]
pub struct MovieForm {
    pub fields: MovieFields,
    pub video: VideoSource,
    /// The entry being edited, `None` for a new one.
    pub editing: Option<MovieId>,
}

impl MovieForm {
    /// Form for a new entry.
    pub fn new_entry(fields: MovieFields, video: VideoSource) -> Self {
        Self {
            fields,
            video,
            editing: None,
        }
    }

    /// Form pre-filled with an existing entry.
    pub fn edit(movie: &Movie) -> Self {
        Self {
            fields: movie.fields(),
            video: VideoSource::Keep,
            editing: Some(movie.id.clone()),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Upload the video if needed and save the entry.
    ///
    /// Returns the stored entry, or `None` after a failure notice.
    #[instrument(skip(self, store), fields(title = %self.fields.title, editing = self.is_editing()))]
    pub async fn submit<G>(self, store: &CatalogStore<G>, bucket: &str) -> Option<Movie>
    where
        G: CatalogGateway + StorageGateway + ?Sized,
    {
        let MovieForm {
            mut fields,
            video,
            editing,
        } = self;

        if needs_placeholder(&fields.thumbnail_url) {
            fields.thumbnail_url = placeholder_thumbnail(&fields.title);
        }

        match video {
            VideoSource::File(file) => {
                match upload_video(&**store.gateway(), bucket, &file, Utc::now()).await {
                    Ok(url) => fields.video_url = url.to_string(),
                    Err(e) => {
                        error!(error = %e, "Video upload failed");
                        store.notify(Notice::error(format!("Video upload failed: {}", e)));
                        return None;
                    }
                }
            }
            VideoSource::Url(url) => fields.video_url = url,
            VideoSource::Keep => {}
        }

        match editing {
            Some(id) => store.update(&id, MoviePatch::from(fields)).await,
            None => {
                if fields.video_url.trim().is_empty() {
                    store.notify(Notice::error(
                        "Please provide a video URL or upload a video file for new movies.",
                    ));
                    return None;
                }
                store.create(NewMovie::new(fields)).await
            }
        }
    }
}

/// Upload a video file and return its public URL.
#[instrument(skip(gateway, file), fields(name = %file.name, len = file.bytes.len()))]
pub async fn upload_video<G>(
    gateway: &G,
    bucket: &str,
    file: &VideoFile,
    now: DateTime<Utc>,
) -> Result<Url>
where
    G: StorageGateway + ?Sized,
{
    let key = sanitize_filename(&file.name, now.timestamp_millis());
    let content_type = file.content_type.as_deref().unwrap_or(DEFAULT_VIDEO_TYPE);
    debug!(%key, %bucket, "Uploading video");

    let path = gateway
        .upload(bucket, &key, file.bytes.clone(), content_type)
        .await
        .map_err(|e| match e {
            Error::Upload(_) => e,
            other => UploadError::Failed {
                message: other.to_string(),
            }
            .into(),
        })?;
    if path.is_empty() {
        return Err(UploadError::MissingPath.into());
    }

    let url = gateway.public_url(bucket, &path)?;
    info!(%url, "Video uploaded");
    Ok(url)
}

/// Storage key for an uploaded file: `<millis>_<safe base name><extension>`.
pub fn sanitize_filename(name: &str, timestamp_millis: i64) -> String {
    let (base, extension) = match name.rsplit_once('.') {
        Some((base, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            (base, format!(".{}", ext))
        }
        _ => (name, ".mp4".to_string()),
    };

    let mut cleaned = String::with_capacity(base.len());
    for c in base.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            c
        } else {
            '_'
        };
        if (c == '_' || c == '-') && cleaned.ends_with(c) {
            continue;
        }
        cleaned.push(c);
    }

    let trimmed: String = cleaned
        .trim_matches(|c| c == '_' || c == '-')
        .chars()
        .take(MAX_BASE_NAME)
        .collect();
    let base = if trimmed.is_empty() { "video" } else { &trimmed };

    format!("{}_{}{}", timestamp_millis, base, extension)
}

/// Placeholder poster for a title.
pub fn placeholder_thumbnail(title: &str) -> String {
    let seed = if title.is_empty() { "movie" } else { title };
    match Url::parse(PLACEHOLDER_HOST) {
        Ok(mut url) => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.clear().extend(["seed", seed, "400", "600"]);
            }
            url.to_string()
        }
        Err(_) => format!("{}/seed/{}/400/600", PLACEHOLDER_HOST, seed),
    }
}

fn needs_placeholder(thumbnail_url: &str) -> bool {
    let url = thumbnail_url.trim();
    url.is_empty() || url.contains("picsum.photos/seed/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Genre;

    #[test]
    fn sanitize_keeps_extension() {
        assert_eq!(
            sanitize_filename("My Movie (final).MOV", 1700000000000),
            "1700000000000_My_Movie_final.MOV"
        );
    }

    #[test]
    fn sanitize_collapses_and_trims() {
        assert_eq!(sanitize_filename("__a--b__.mp4", 1), "1_a-b.mp4");
        assert_eq!(sanitize_filename("...", 1), "1_video.mp4");
        assert_eq!(sanitize_filename("clip", 5), "5_clip.mp4");
    }

    #[test]
    fn sanitize_truncates_base_name() {
        let name = format!("{}.webm", "x".repeat(80));
        let key = sanitize_filename(&name, 7);
        assert_eq!(key, format!("7_{}.webm", "x".repeat(50)));
    }

    #[test]
    fn placeholder_encodes_title() {
        assert_eq!(
            placeholder_thumbnail("Star Wars"),
            "https://picsum.photos/seed/Star%20Wars/400/600"
        );
        assert_eq!(
            placeholder_thumbnail(""),
            "https://picsum.photos/seed/movie/400/600"
        );
    }

    #[test]
    fn edit_form_keeps_video() {
        let fields = MovieFields::new("Nova", Genre::SciFi, "2024-05-01".parse().unwrap())
            .with_video_url("https://x/a.mp4");
        let movie = Movie::from_fields("m1".parse().unwrap(), fields, 3, 1, Utc::now());
        let form = MovieForm::edit(&movie);
        assert!(form.is_editing());
        assert!(matches!(form.video, VideoSource::Keep));
        assert_eq!(form.fields.video_url, "https://x/a.mp4");
    }
}
