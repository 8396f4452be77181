//! Commands for administrators.

pub mod add;
pub mod create_user;
pub mod delete;
pub mod edit;
pub mod login;
pub mod logout;
pub mod stats;
pub mod whoami;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use marquee_core::form::DEFAULT_VIDEO_BUCKET;
use marquee_core::{VideoFile, VideoSource};

/// How long to wait for the gateway to announce a session change.
pub const SESSION_EVENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where an entry's video comes from.
#[derive(Args, Debug)]
pub struct VideoArgs {
    /// External video URL
    #[arg(long, conflicts_with = "video_file")]
    pub video_url: Option<String>,

    /// Local video file to upload
    #[arg(long)]
    pub video_file: Option<PathBuf>,

    /// Storage bucket for uploaded videos
    #[arg(long, default_value = DEFAULT_VIDEO_BUCKET)]
    pub bucket: String,
}

impl VideoArgs {
    pub fn is_set(&self) -> bool {
        self.video_url.is_some() || self.video_file.is_some()
    }

    /// The video source these arguments describe, `Keep` when none was given.
    pub fn source(&self) -> Result<VideoSource> {
        if let Some(url) = &self.video_url {
            return Ok(VideoSource::Url(url.clone()));
        }
        let Some(path) = &self.video_file else {
            return Ok(VideoSource::Keep);
        };

        let bytes =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("Video file path has no file name")?;
        let content_type = mime_guess::from_path(path)
            .first()
            .filter(|m| m.type_() == mime_guess::mime::VIDEO)
            .map(|m| m.essence_str().to_string());

        Ok(VideoSource::File(VideoFile {
            name,
            bytes,
            content_type,
        }))
    }
}
