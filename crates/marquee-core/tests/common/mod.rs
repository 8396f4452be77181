//! In-memory gateway and recorders shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use url::Url;

use marquee_core::error::{AuthError, ProtocolError, TransportError};
use marquee_core::{
    AccessToken, AuthEvent, AuthEventHub, AuthEventStream, AuthGateway, AuthSession,
    CatalogGateway, Credentials, Error, Genre, Movie, MovieFields, MovieId, MoviePatch, NewMovie,
    Notice, Notifier, Redirect, Result, StorageGateway, User,
};
use marquee_core::session_manager::Navigator;

pub const EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "hunter2";

/// Operations that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    SignIn,
    SignOut,
    CurrentSession,
    List,
    Insert,
    Update,
    Delete,
    IncrementViews,
    IncrementDownloads,
    Upload,
}

#[derive(Default)]
struct State {
    movies: Vec<Movie>,
    session: Option<AuthSession>,
    next_id: u32,
    failing: HashSet<Op>,
    calls: Vec<Op>,
    uploads: Vec<(String, String, usize, String)>,
}

/// A gateway that keeps everything in memory.
pub struct FakeGateway {
    state: Mutex<State>,
    events: AuthEventHub,
    epoch: DateTime<Utc>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            events: AuthEventHub::new(),
            epoch: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    pub fn fail(&self, op: Op) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.state.lock().unwrap().failing.remove(&op);
    }

    /// Operations called so far, in order.
    pub fn calls(&self) -> Vec<Op> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn stored(&self) -> Vec<Movie> {
        self.state.lock().unwrap().movies.clone()
    }

    pub fn uploads(&self) -> Vec<(String, String, usize, String)> {
        self.state.lock().unwrap().uploads.clone()
    }

    /// Put a session in place without emitting an event.
    pub fn restore(&self) {
        self.state.lock().unwrap().session = Some(session());
    }

    /// Emit an event as if the gateway pushed it on its own.
    pub fn push(&self, event: AuthEvent) {
        self.events.emit(event);
    }

    fn begin(&self, op: Op) -> Result<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op);
        if state.failing.contains(&op) {
            return Err(failure(op));
        }
        Ok(state)
    }
}

fn failure(op: Op) -> Error {
    match op {
        Op::SignIn => AuthError::InvalidCredentials("Invalid login credentials".into()).into(),
        Op::Delete | Op::Insert | Op::Update => ProtocolError::new(
            403,
            Some("42501".into()),
            Some("new row violates row-level security policy".into()),
        )
        .into(),
        _ => TransportError::Connection {
            message: "connection refused".into(),
        }
        .into(),
    }
}

pub fn session() -> AuthSession {
    AuthSession::new(
        User {
            id: "admin-1".to_string(),
            email: Some(EMAIL.to_string()),
        },
        AccessToken::new("access"),
        None,
        None,
    )
}

#[async_trait]
impl AuthGateway for FakeGateway {
    async fn sign_in(&self, credentials: Credentials) -> Result<AuthSession> {
        {
            let mut state = self.begin(Op::SignIn)?;
            if credentials.email() != EMAIL || credentials.password() != PASSWORD {
                return Err(AuthError::InvalidCredentials("Invalid login credentials".into()).into());
            }
            state.session = Some(session());
        }
        self.events.emit(AuthEvent::signed_in(session()));
        Ok(session())
    }

    async fn sign_out(&self) -> Result<()> {
        self.begin(Op::SignOut)?.session = None;
        self.events.emit(AuthEvent::signed_out());
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>> {
        Ok(self.begin(Op::CurrentSession)?.session.clone())
    }

    fn auth_events(&self) -> AuthEventStream {
        self.events.subscribe()
    }
}

#[async_trait]
impl CatalogGateway for FakeGateway {
    async fn list_movies(&self) -> Result<Vec<Movie>> {
        let state = self.begin(Op::List)?;
        let mut movies = state.movies.clone();
        movies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(movies)
    }

    async fn insert_movie(&self, movie: &NewMovie) -> Result<Movie> {
        let mut state = self.begin(Op::Insert)?;
        state.next_id += 1;
        let id: MovieId = format!("m{}", state.next_id).parse()?;
        let created_at = self.epoch + Duration::seconds(i64::from(state.next_id));
        let stored = Movie::from_fields(
            id,
            movie.fields.clone(),
            movie.views.unwrap_or(0),
            movie.downloads.unwrap_or(0),
            created_at,
        );
        state.movies.push(stored.clone());
        Ok(stored)
    }

    async fn update_movie(&self, id: &MovieId, patch: &MoviePatch) -> Result<Movie> {
        let mut state = self.begin(Op::Update)?;
        let movie = state
            .movies
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| Error::not_found(id))?;
        patch.apply_to(movie);
        Ok(movie.clone())
    }

    async fn delete_movie(&self, id: &MovieId) -> Result<()> {
        let mut state = self.begin(Op::Delete)?;
        let before = state.movies.len();
        state.movies.retain(|m| &m.id != id);
        if state.movies.len() == before {
            return Err(Error::not_found(id));
        }
        Ok(())
    }

    async fn increment_views(&self, id: &MovieId) -> Result<()> {
        let mut state = self.begin(Op::IncrementViews)?;
        let movie = state
            .movies
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| Error::not_found(id))?;
        movie.views += 1;
        Ok(())
    }

    async fn increment_downloads(&self, id: &MovieId) -> Result<()> {
        let mut state = self.begin(Op::IncrementDownloads)?;
        let movie = state
            .movies
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| Error::not_found(id))?;
        movie.downloads += 1;
        Ok(())
    }
}

#[async_trait]
impl StorageGateway for FakeGateway {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let mut state = self.begin(Op::Upload)?;
        state.uploads.push((
            bucket.to_string(),
            key.to_string(),
            bytes.len(),
            content_type.to_string(),
        ));
        Ok(key.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "https://cdn.example.co/public/{}/{}",
            bucket, path
        ))
        .unwrap())
    }
}

/// Notifier that remembers every notice.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Navigator that stays wherever it was last sent.
pub struct RecordingNavigator {
    path: Mutex<String>,
    redirects: Mutex<Vec<Redirect>>,
}

impl RecordingNavigator {
    pub fn at(path: &str) -> Self {
        Self {
            path: Mutex::new(path.to_string()),
            redirects: Mutex::new(Vec::new()),
        }
    }

    pub fn redirects(&self) -> Vec<Redirect> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.path.lock().unwrap().clone()
    }

    fn navigate(&self, redirect: Redirect) {
        *self.path.lock().unwrap() = redirect.path().to_string();
        self.redirects.lock().unwrap().push(redirect);
    }
}

pub fn fields(title: &str) -> MovieFields {
    MovieFields::new(title, Genre::Drama, "2023-03-10".parse().unwrap())
        .with_video_url(format!("https://videos.example.co/{}.mp4", title))
}
