//! HTTP client for the note server.
//!
//! Every route answers with a JSON envelope `{status, message, ...}`; any
//! status other than `"success"` is a rejection. The session cookie from
//! config is sent with each request.

use std::time::Duration;

use serde::Deserialize;

use crate::model::config::RemoteConfig;
use crate::model::note::{Note, NoteId, NotePayload};

/// Error type for server calls
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Transport(#[from] ureq::Error),
    #[error("server refused the session (HTTP {status}); run `ql login` again")]
    Unauthorized { status: u16 },
    #[error("server error: {0}")]
    Rejected(String),
    #[error("server answered HTTP {status}")]
    Http { status: u16 },
    #[error("could not decode server response: {0}")]
    Decode(String),
    #[error("server response is missing `{0}`")]
    MissingField(&'static str),
}

/// Result of `POST /sync_notes`
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReply {
    pub synced_count: usize,
    pub cloud_notes: Vec<Note>,
}

/// Operations the notebook needs from a note server.
pub trait NoteBackend {
    /// `GET /search_notes?q=`; an empty query returns every note
    fn fetch_notes(&self, query: &str) -> Result<Vec<Note>, RemoteError>;
    /// `POST /create_note`; returns the stored note with its server id
    fn create_note(&self, payload: &NotePayload) -> Result<Note, RemoteError>;
    /// `PUT /update_note/{id}`
    fn update_note(&self, id: NoteId, payload: &NotePayload) -> Result<Option<Note>, RemoteError>;
    /// `DELETE /delete_note/{id}`
    fn delete_note(&self, id: NoteId) -> Result<(), RemoteError>;
    /// `POST /sync_notes` with the guest notes
    fn sync_notes(&self, notes: &[Note]) -> Result<SyncReply, RemoteError>;
}

/// Response envelope shared by all routes
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    note: Option<Note>,
    #[serde(default)]
    notes: Option<Vec<Note>>,
    #[serde(default)]
    cloud_notes: Option<Vec<Note>>,
    #[serde(default)]
    synced_count: Option<usize>,
}

impl Envelope {
    fn into_success(self) -> Result<Self, RemoteError> {
        if self.status == "success" {
            Ok(self)
        } else {
            Err(RemoteError::Rejected(
                self.message
                    .unwrap_or_else(|| format!("status '{}'", self.status)),
            ))
        }
    }
}

/// `NoteBackend` over HTTP
pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
    cookie: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, session: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        let agent: ureq::Agent = config.into();
        HttpBackend {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie: cookie_header(session),
        }
    }

    /// Build a backend when the config is authenticated
    pub fn from_config(remote: &RemoteConfig) -> Option<Self> {
        if !remote.is_authenticated() {
            return None;
        }
        let url = remote.url.as_deref()?;
        let session = remote.session.as_deref()?;
        Some(HttpBackend::new(
            url,
            session,
            Duration::from_secs(remote.timeout_secs.max(1)),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// A bare cookie value is taken to be Flask's `session` cookie.
fn cookie_header(session: &str) -> String {
    let session = session.trim();
    if session.contains('=') {
        session.to_string()
    } else {
        format!("session={}", session)
    }
}

type HttpResponse = ureq::http::Response<ureq::Body>;

fn read_envelope(mut response: HttpResponse) -> Result<Envelope, RemoteError> {
    let status = response.status().as_u16();
    if status == 401 || status == 403 {
        return Err(RemoteError::Unauthorized { status });
    }
    match response.body_mut().read_json::<Envelope>() {
        Ok(env) => env.into_success(),
        Err(_) if status >= 400 => Err(RemoteError::Http { status }),
        Err(e) => Err(RemoteError::Decode(e.to_string())),
    }
}

impl NoteBackend for HttpBackend {
    fn fetch_notes(&self, query: &str) -> Result<Vec<Note>, RemoteError> {
        tracing::debug!(query, "fetching notes from server");
        let response = self
            .agent
            .get(&self.url("/search_notes"))
            .header("Cookie", &self.cookie)
            .query("q", query)
            .call()?;
        read_envelope(response)?
            .notes
            .ok_or(RemoteError::MissingField("notes"))
    }

    fn create_note(&self, payload: &NotePayload) -> Result<Note, RemoteError> {
        tracing::debug!(title = %payload.title, "creating note on server");
        let response = self
            .agent
            .post(&self.url("/create_note"))
            .header("Cookie", &self.cookie)
            .send_json(payload)?;
        read_envelope(response)?
            .note
            .ok_or(RemoteError::MissingField("note"))
    }

    fn update_note(&self, id: NoteId, payload: &NotePayload) -> Result<Option<Note>, RemoteError> {
        tracing::debug!(%id, "updating note on server");
        let response = self
            .agent
            .put(&self.url(&format!("/update_note/{}", id)))
            .header("Cookie", &self.cookie)
            .send_json(payload)?;
        Ok(read_envelope(response)?.note)
    }

    fn delete_note(&self, id: NoteId) -> Result<(), RemoteError> {
        tracing::debug!(%id, "deleting note on server");
        let response = self
            .agent
            .delete(&self.url(&format!("/delete_note/{}", id)))
            .header("Cookie", &self.cookie)
            .call()?;
        let status = response.status().as_u16();
        match read_envelope(response) {
            Ok(_) => Ok(()),
            // An empty or non-JSON 2xx still means the note is gone
            Err(RemoteError::Decode(_)) if status < 300 => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn sync_notes(&self, notes: &[Note]) -> Result<SyncReply, RemoteError> {
        tracing::debug!(count = notes.len(), "uploading local notes");
        let response = self
            .agent
            .post(&self.url("/sync_notes"))
            .header("Cookie", &self.cookie)
            .send_json(notes)?;
        let env = read_envelope(response)?;
        let cloud_notes = env
            .cloud_notes
            .ok_or(RemoteError::MissingField("cloud_notes"))?;
        Ok(SyncReply {
            synced_count: env.synced_count.unwrap_or(0),
            cloud_notes,
        })
    }
}
