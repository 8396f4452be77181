//! REST gateway tests against a mock backend.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use futures_util::StreamExt;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use marquee_core::error::{AuthError, UploadError};
use marquee_core::traits::{AuthGateway, CatalogGateway, StorageGateway};
use marquee_core::{
    AccessToken, ApiKey, AuthEventKind, AuthSession, CatalogStore, Credentials, Error, ErrorKind,
    GatewayUrl, Genre, MovieFields, MovieId, MoviePatch, NewMovie, Notice, Notifier, Rating,
    RefreshToken, User,
};
use marquee_rest::RestGateway;

const API_KEY: &str = "anon-key";

fn gateway(server: &MockServer) -> RestGateway {
    let base = GatewayUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap();
    RestGateway::new(base, ApiKey::new(API_KEY)).unwrap()
}

fn token_body(access: &str) -> Value {
    json!({
        "access_token": access,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-1",
        "user": { "id": "user-1", "email": "admin@example.com" }
    })
}

fn movie_row(id: &str, title: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "",
        "thumbnailUrl": "https://img/x.jpg",
        "videoUrl": "https://x/a.mp4",
        "genre": "Drama",
        "releaseDate": "2023-03-10",
        "rating": 7.5,
        "duration": "1h 30m",
        "views": 0,
        "downloads": 0,
        "created_at": created_at
    })
}

#[derive(Default)]
struct Notices(Mutex<Vec<String>>);

impl Notifier for Notices {
    fn notify(&self, notice: Notice) {
        self.0.lock().unwrap().push(notice.message);
    }
}

async fn signed_in(server: &MockServer) -> RestGateway {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("user-jwt")))
        .mount(server)
        .await;
    let gateway = gateway(server);
    gateway
        .sign_in(Credentials::new("admin@example.com", "hunter2"))
        .await
        .unwrap();
    gateway
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn sign_in_sends_password_grant_and_emits_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", API_KEY))
        .and(body_json(json!({
            "email": "admin@example.com",
            "password": "hunter2"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("user-jwt")))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let mut events = gateway.auth_events();
    let session = gateway
        .sign_in(Credentials::new("admin@example.com", "hunter2"))
        .await
        .unwrap();

    assert_eq!(session.user().id, "user-1");
    assert_eq!(session.access_token().as_str(), "user-jwt");
    assert!(session.expires_at().is_some());
    let event = events.next().await.unwrap();
    assert_eq!(event.kind, AuthEventKind::SignedIn);
}

#[tokio::test]
async fn sign_in_rejection_is_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .sign_in(Credentials::new("admin@example.com", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials(ref m)) if m == "Invalid login credentials"));
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
}

#[tokio::test]
async fn sign_out_uses_user_token_and_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer user-jwt"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = signed_in(&server).await;
    let mut events = gateway.auth_events();

    gateway.sign_out().await.unwrap();

    assert!(gateway.current_session().await.unwrap().is_none());
    assert_eq!(events.next().await.unwrap().kind, AuthEventKind::SignedOut);
}

#[tokio::test]
async fn expired_session_is_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({ "refresh_token": "old-refresh" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh-jwt")))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    gateway
        .restore_session(AuthSession::new(
            User {
                id: "user-1".to_string(),
                email: None,
            },
            AccessToken::new("stale-jwt"),
            Some(RefreshToken::new("old-refresh")),
            Some(Utc::now() - Duration::minutes(5)),
        ))
        .await;
    let mut events = gateway.auth_events();

    let session = gateway.current_session().await.unwrap().unwrap();

    assert_eq!(session.access_token().as_str(), "fresh-jwt");
    assert_eq!(
        events.next().await.unwrap().kind,
        AuthEventKind::TokenRefreshed
    );
}

#[tokio::test]
async fn unrefreshable_session_becomes_anonymous() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_code": "refresh_token_not_found",
            "msg": "Invalid Refresh Token: Refresh Token Not Found"
        })))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    gateway
        .restore_session(AuthSession::new(
            User {
                id: "user-1".to_string(),
                email: None,
            },
            AccessToken::new("stale-jwt"),
            Some(RefreshToken::new("revoked")),
            Some(Utc::now() - Duration::minutes(5)),
        ))
        .await;

    assert!(gateway.current_session().await.unwrap().is_none());
    assert!(gateway.session().await.is_none());
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn list_requests_newest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/movies"))
        .and(query_param("select", "*"))
        .and(query_param("order", "created_at.desc"))
        .and(header("authorization", format!("Bearer {}", API_KEY).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            movie_row("m3", "T3", "2024-01-03T00:00:00+00:00"),
            movie_row("m2", "T2", "2024-01-02T00:00:00+00:00"),
            movie_row("m1", "T1", "2024-01-01T00:00:00+00:00")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let movies = gateway(&server).list_movies().await.unwrap();

    let titles: Vec<_> = movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, ["T3", "T2", "T1"]);
}

#[tokio::test]
async fn insert_asks_for_representation() {
    let server = MockServer::start().await;
    let gateway = signed_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/movies"))
        .and(header("prefer", "return=representation"))
        .and(header("authorization", "Bearer user-jwt"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            movie_row("m9", "Nova", "2024-05-02T10:00:00+00:00")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let fields = MovieFields::new("Nova", Genre::SciFi, "2024-05-01".parse().unwrap())
        .with_rating(Rating::new(8.2).unwrap())
        .with_video_url("https://x/a.mp4");
    let movie = gateway
        .insert_movie(&NewMovie::new(fields).with_default_counters())
        .await
        .unwrap();

    assert_eq!(movie.id.as_str(), "m9");
    let requests = server.received_requests().await.unwrap();
    let body: Value = requests.last().unwrap().body_json().unwrap();
    assert_eq!(body["title"], "Nova");
    assert_eq!(body["views"], 0);
}

#[tokio::test]
async fn policy_rejection_is_authorization_denied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/movies"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "42501",
            "message": "new row violates row-level security policy for table \"movies\""
        })))
        .mount(&server)
        .await;

    let fields = MovieFields::new("Nova", Genre::SciFi, "2024-05-01".parse().unwrap())
        .with_video_url("https://x/a.mp4");
    let err = gateway(&server)
        .insert_movie(&NewMovie::new(fields))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
}

#[tokio::test]
async fn update_filters_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/movies"))
        .and(query_param("id", "eq.m1"))
        .and(body_json(json!({ "title": "Renamed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            movie_row("m1", "Renamed", "2024-01-01T00:00:00+00:00")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let patch = MoviePatch {
        title: Some("Renamed".to_string()),
        ..Default::default()
    };
    let id: MovieId = "m1".parse().unwrap();
    let movie = gateway(&server).update_movie(&id, &patch).await.unwrap();

    assert_eq!(movie.title, "Renamed");
}

#[tokio::test]
async fn delete_of_missing_row_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/movies"))
        .and(query_param("id", "eq.ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let id: MovieId = "ghost".parse().unwrap();
    let err = gateway(&server).delete_movie(&id).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn delete_hidden_by_policy_mentions_access_policies() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/movies"))
        .and(query_param("id", "eq.protected"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let notices = Arc::new(Notices::default());
    let store = CatalogStore::new(Arc::new(gateway(&server)), notices.clone());
    let id: MovieId = "protected".parse().unwrap();

    assert!(!store.delete(&id).await);
    let messages = notices.0.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("access policies"), "notice: {}", messages[0]);
}

#[tokio::test]
async fn increments_call_procedures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/increment_views"))
        .and(body_json(json!({ "movie_id_param": "m1" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/increment_downloads"))
        .and(body_json(json!({ "movie_id_param": "m1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let id: MovieId = "m1".parse().unwrap();
    gateway.increment_views(&id).await.unwrap();
    gateway.increment_downloads(&id).await.unwrap();
}

#[tokio::test]
async fn server_error_is_network_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/movies"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = gateway(&server).list_movies().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
}

// ============================================================================
// Storage
// ============================================================================

#[tokio::test]
async fn upload_returns_path_inside_bucket() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/movie-videos/1700000000000_clip.mp4"))
        .and(header("x-upsert", "false"))
        .and(header("cache-control", "max-age=3600"))
        .and(header("content-type", "video/mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Key": "movie-videos/1700000000000_clip.mp4",
            "Id": "0b4f"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let path = gateway
        .upload("movie-videos", "1700000000000_clip.mp4", vec![1, 2, 3], "video/mp4")
        .await
        .unwrap();

    assert_eq!(path, "1700000000000_clip.mp4");
    let url = gateway.public_url("movie-videos", &path).unwrap();
    assert!(
        url.as_str()
            .ends_with("/storage/v1/object/public/movie-videos/1700000000000_clip.mp4")
    );
}

#[tokio::test]
async fn duplicate_upload_is_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/movie-videos/dup.mp4"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "statusCode": "409",
            "error": "Duplicate",
            "message": "The resource already exists"
        })))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .upload("movie-videos", "dup.mp4", vec![0], "video/mp4")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upload(UploadError::Conflict { .. })));
    assert_eq!(err.kind(), ErrorKind::UploadFailure);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/movie-videos/big.mp4"))
        .respond_with(ResponseTemplate::new(413).set_body_json(json!({
            "statusCode": "413",
            "error": "Payload too large",
            "message": "The object exceeded the maximum allowed size"
        })))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .upload("movie-videos", "big.mp4", vec![0], "video/mp4")
        .await
        .unwrap_err();

    match err {
        Error::Upload(UploadError::Rejected { status, message }) => {
            assert_eq!(status, 413);
            assert_eq!(message, "The object exceeded the maximum allowed size");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
