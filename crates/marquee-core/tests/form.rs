//! Movie form submission.

mod common;

use std::sync::Arc;

use chrono::Utc;
use common::{FakeGateway, Op, RecordingNotifier, fields};
use marquee_core::form::upload_video;
use marquee_core::{
    CatalogStore, DEFAULT_VIDEO_BUCKET, ErrorKind, Genre, MovieFields, MovieForm, VideoFile,
    VideoSource,
};

fn store() -> (Arc<FakeGateway>, Arc<RecordingNotifier>, CatalogStore<FakeGateway>) {
    let gateway = Arc::new(FakeGateway::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let store = CatalogStore::new(Arc::clone(&gateway), notifier.clone());
    (gateway, notifier, store)
}

fn video() -> VideoFile {
    VideoFile {
        name: "Night Train (cut).mkv".to_string(),
        bytes: vec![0u8; 1024],
        content_type: None,
    }
}

#[tokio::test]
async fn uploaded_file_becomes_video_url() {
    let (gateway, _notifier, store) = store();
    let fields = MovieFields::new("Night Train", Genre::Thriller, "2022-02-02".parse().unwrap());

    let movie = MovieForm::new_entry(fields, VideoSource::File(video()))
        .submit(&store, DEFAULT_VIDEO_BUCKET)
        .await
        .unwrap();

    let uploads = gateway.uploads();
    assert_eq!(uploads.len(), 1);
    let (bucket, key, len, content_type) = &uploads[0];
    assert_eq!(bucket, "movie-videos");
    assert!(key.ends_with("_Night_Train_cut.mkv"));
    assert_eq!(*len, 1024);
    assert_eq!(content_type, "video/mp4");
    assert_eq!(
        movie.video_url,
        format!("https://cdn.example.co/public/movie-videos/{}", key)
    );
    assert_eq!(
        movie.thumbnail_url,
        "https://picsum.photos/seed/Night%20Train/400/600"
    );
}

#[tokio::test]
async fn new_entry_without_video_is_refused() {
    let (gateway, notifier, store) = store();
    let fields = MovieFields::new("Nothing", Genre::Drama, "2022-02-02".parse().unwrap());

    let result = MovieForm::new_entry(fields, VideoSource::Keep)
        .submit(&store, DEFAULT_VIDEO_BUCKET)
        .await;

    assert!(result.is_none());
    assert!(gateway.calls().is_empty());
    assert_eq!(
        notifier.messages(),
        ["Please provide a video URL or upload a video file for new movies."]
    );
}

#[tokio::test]
async fn failed_upload_aborts_submit() {
    let (gateway, notifier, store) = store();
    gateway.fail(Op::Upload);
    let fields = MovieFields::new("Broken", Genre::Drama, "2022-02-02".parse().unwrap());

    let result = MovieForm::new_entry(fields, VideoSource::File(video()))
        .submit(&store, DEFAULT_VIDEO_BUCKET)
        .await;

    assert!(result.is_none());
    assert_eq!(gateway.calls(), [Op::Upload]);
    assert!(notifier.messages()[0].starts_with("Video upload failed:"));
}

#[tokio::test]
async fn upload_errors_are_upload_failures() {
    let gateway = FakeGateway::new();
    gateway.fail(Op::Upload);

    let err = upload_video(&gateway, "movie-videos", &video(), Utc::now())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UploadFailure);
}

#[tokio::test]
async fn editing_keeps_video_and_custom_thumbnail() {
    let (_gateway, _notifier, store) = store();
    let created = MovieForm::new_entry(
        fields("Original").with_thumbnail_url("https://img.example.co/poster.jpg"),
        VideoSource::Keep,
    )
    .submit(&store, DEFAULT_VIDEO_BUCKET)
    .await
    .unwrap();

    let mut form = MovieForm::edit(&created);
    form.fields.title = "Renamed".to_string();
    let updated = form.submit(&store, DEFAULT_VIDEO_BUCKET).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.video_url, created.video_url);
    assert_eq!(updated.thumbnail_url, "https://img.example.co/poster.jpg");
}
