use std::sync::mpsc::Sender;
use std::time::Duration;

use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::warn;

use crate::alarm::model::{Alarm, sort_alarms};
use crate::worldclock::WorldLocation;

use super::identity::Session;
use super::{RemoteConfig, RemoteEvent, WatchHandle};

const REQUEST_TIMEOUT_SECS: u64 = 15;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// How often the watchers re-fetch a collection. The store has no push
/// channel; polling plus change detection stands in for a live
/// subscription.
pub const WATCH_POLL_INTERVAL: Duration = Duration::from_secs(3);

pub const DEFAULT_PHOTO_FILE: &str = "default_avatar.png";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(String),

    #[error("store returned status {status}")]
    Response { status: u16, body: String },

    #[error("store response parse failed: {0}")]
    Parse(String),

    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

/// The `users/{uid}` document.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub photo_file: String,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            photo_file: DEFAULT_PHOTO_FILE.to_string(),
        }
    }

    pub fn from_document(doc: &Value) -> Self {
        Self {
            name: doc
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            email: doc
                .get("email")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            photo_file: doc
                .get("photoFileName")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_PHOTO_FILE)
                .to_string(),
        }
    }

    pub fn to_document(&self) -> Value {
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!(self.name));
        fields.insert("email".to_string(), json!(self.email));
        fields.insert("photoFileName".to_string(), json!(self.photo_file));
        Value::Object(fields)
    }
}

/// Client for the per-user document store: `users/{uid}` plus the
/// `alarms` and `locations` subcollections. Requests carry the
/// session's id token as a bearer credential.
#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl StoreClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, StoreError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|err| StoreError::ClientBuild(err.to_string()))?;
        Ok(Self {
            http,
            base_url: config.store_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn fetch_alarms(&self, session: &Session) -> Result<Vec<Alarm>, StoreError> {
        let url = self.collection_url(&session.uid, "alarms");
        let text = self.send(Method::Get, &url, session, None)?;
        parse_alarm_documents(&text)
    }

    /// Creates an alarm; the store assigns the id, which reaches the
    /// UI through the next watcher snapshot.
    pub fn add_alarm(&self, session: &Session, alarm: &Alarm) -> Result<(), StoreError> {
        let url = self.collection_url(&session.uid, "alarms");
        self.send(Method::Post, &url, session, Some(&alarm.to_document()))
            .map(|_| ())
    }

    pub fn update_alarm(&self, session: &Session, alarm: &Alarm) -> Result<(), StoreError> {
        let url = self.document_url(&session.uid, "alarms", &alarm.id);
        self.send(Method::Patch, &url, session, Some(&alarm.to_document()))
            .map(|_| ())
    }

    pub fn delete_alarm(&self, session: &Session, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(&session.uid, "alarms", id);
        self.send(Method::Delete, &url, session, None).map(|_| ())
    }

    pub fn fetch_locations(&self, session: &Session) -> Result<Vec<WorldLocation>, StoreError> {
        let url = self.collection_url(&session.uid, "locations");
        let text = self.send(Method::Get, &url, session, None)?;
        parse_location_documents(&text)
    }

    pub fn add_location(
        &self,
        session: &Session,
        location: &WorldLocation,
    ) -> Result<(), StoreError> {
        let url = self.collection_url(&session.uid, "locations");
        self.send(Method::Post, &url, session, Some(&location.to_document()))
            .map(|_| ())
    }

    pub fn delete_location(&self, session: &Session, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(&session.uid, "locations", id);
        self.send(Method::Delete, &url, session, None).map(|_| ())
    }

    /// Fetches the profile document; a 404 is a first-run account
    /// without one, not an error.
    pub fn fetch_profile(&self, session: &Session) -> Result<Option<UserProfile>, StoreError> {
        let url = self.user_url(&session.uid);
        match self.send(Method::Get, &url, session, None) {
            Ok(text) => {
                let doc: Value = serde_json::from_str(&text)
                    .map_err(|err| StoreError::Parse(err.to_string()))?;
                Ok(Some(UserProfile::from_document(&doc)))
            }
            Err(StoreError::Response { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Upserts the profile document.
    pub fn save_profile(&self, session: &Session, profile: &UserProfile) -> Result<(), StoreError> {
        let url = self.user_url(&session.uid);
        self.send(Method::Patch, &url, session, Some(&profile.to_document()))
            .map(|_| ())
    }

    /// Removes the user document and everything under it.
    pub fn delete_user_data(&self, session: &Session) -> Result<(), StoreError> {
        let url = self.user_url(&session.uid);
        self.send(Method::Delete, &url, session, None).map(|_| ())
    }

    fn user_url(&self, uid: &str) -> String {
        format!("{}/users/{uid}", self.base_url)
    }

    fn collection_url(&self, uid: &str, collection: &str) -> String {
        format!("{}/users/{uid}/{collection}", self.base_url)
    }

    fn document_url(&self, uid: &str, collection: &str, id: &str) -> String {
        format!("{}/users/{uid}/{collection}/{id}", self.base_url)
    }

    fn send(
        &self,
        method: Method,
        url: &str,
        session: &Session,
        body: Option<&Value>,
    ) -> Result<String, StoreError> {
        let mut request = match method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Patch => self.http.patch(url),
            Method::Delete => self.http.delete(url),
        }
        .bearer_auth(&session.id_token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .map_err(|err| StoreError::Request(err.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|err| StoreError::Request(err.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(StoreError::Response { status, body: text });
        }
        Ok(text)
    }
}

enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

/// Starts the alarm subscription. Snapshots are pushed only when the
/// parsed list differs from the last one delivered.
pub fn watch_alarms(
    client: StoreClient,
    session: Session,
    events: Sender<RemoteEvent>,
) -> WatchHandle {
    let mut last: Option<Vec<Alarm>> = None;
    WatchHandle::spawn(WATCH_POLL_INTERVAL, move || {
        match client.fetch_alarms(&session) {
            Ok(list) => {
                if last.as_ref() != Some(&list) {
                    last = Some(list.clone());
                    let _ = events.send(RemoteEvent::AlarmsSnapshot(list));
                }
            }
            Err(err) => warn!("alarm watch poll failed: {err}"),
        }
    })
}

pub fn watch_locations(
    client: StoreClient,
    session: Session,
    events: Sender<RemoteEvent>,
) -> WatchHandle {
    let mut last: Option<Vec<WorldLocation>> = None;
    WatchHandle::spawn(WATCH_POLL_INTERVAL, move || {
        match client.fetch_locations(&session) {
            Ok(list) => {
                if last.as_ref() != Some(&list) {
                    last = Some(list.clone());
                    let _ = events.send(RemoteEvent::LocationsSnapshot(list));
                }
            }
            Err(err) => warn!("location watch poll failed: {err}"),
        }
    })
}

/// A collection response is `{"documents": [...]}` where each entry
/// carries its id inline. Documents that fail to parse are dropped
/// with a warning so one bad record cannot blank the whole list.
pub(crate) fn parse_alarm_documents(text: &str) -> Result<Vec<Alarm>, StoreError> {
    let mut alarms = Vec::new();
    for (id, doc) in collection_entries(text)? {
        match Alarm::from_document(&id, &doc) {
            Ok(alarm) => alarms.push(alarm),
            Err(err) => warn!("skipping alarm document '{id}': {err}"),
        }
    }
    sort_alarms(&mut alarms);
    Ok(alarms)
}

pub(crate) fn parse_location_documents(text: &str) -> Result<Vec<WorldLocation>, StoreError> {
    let mut locations = Vec::new();
    for (id, doc) in collection_entries(text)? {
        match WorldLocation::from_document(&id, &doc) {
            Ok(location) => locations.push(location),
            Err(err) => warn!("skipping location document '{id}': {err}"),
        }
    }
    Ok(locations)
}

fn collection_entries(text: &str) -> Result<Vec<(String, Value)>, StoreError> {
    let root: Value =
        serde_json::from_str(text).map_err(|err| StoreError::Parse(err.to_string()))?;
    let Some(documents) = root.get("documents").and_then(Value::as_array) else {
        return Err(StoreError::Parse("missing documents array".to_string()));
    };
    let mut entries = Vec::with_capacity(documents.len());
    for doc in documents {
        let Some(id) = doc.get("id").and_then(Value::as_str) else {
            warn!("skipping document without an id");
            continue;
        };
        entries.push((id.to_string(), doc.clone()));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_sorts_alarm_documents() {
        let text = json!({
            "documents": [
                { "id": "b", "time": "09:15", "label": "Stretch", "active": true,
                  "days": ["Every day"], "sound": "zen" },
                { "id": "a", "time": "07:00", "label": "Wake up", "active": true,
                  "days": ["Mon", "Tue"], "sound": "birds" },
            ]
        })
        .to_string();
        let alarms = parse_alarm_documents(&text).expect("documents parse");
        assert_eq!(alarms.len(), 2);
        assert_eq!(alarms[0].id, "a");
        assert_eq!(alarms[1].id, "b");
    }

    #[test]
    fn malformed_documents_are_skipped_not_fatal() {
        let text = json!({
            "documents": [
                { "id": "good", "time": "07:00" },
                { "id": "bad", "label": "no time here" },
                { "time": "08:00" },
            ]
        })
        .to_string();
        let alarms = parse_alarm_documents(&text).expect("documents parse");
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].id, "good");
    }

    #[test]
    fn missing_documents_array_is_an_error() {
        let err = parse_alarm_documents("{}").expect_err("parse fails");
        assert!(err.to_string().contains("parse failed"));
    }

    #[test]
    fn parses_location_documents_in_server_order() {
        let text = json!({
            "documents": [
                { "id": "x", "name": "Tokyo", "offset": 9.0 },
                { "id": "y", "name": "Mumbai", "offset": 5.5, "country": "India" },
            ]
        })
        .to_string();
        let locations = parse_location_documents(&text).expect("documents parse");
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].name, "Tokyo");
        assert_eq!(locations[1].country.as_deref(), Some("India"));
    }

    #[test]
    fn profile_documents_round_trip_with_defaults() {
        let profile = UserProfile::new("Sam", "sam@example.com");
        assert_eq!(profile.photo_file, DEFAULT_PHOTO_FILE);

        let parsed = UserProfile::from_document(&profile.to_document());
        assert_eq!(parsed, profile);

        let sparse = UserProfile::from_document(&json!({ "name": "Kit" }));
        assert_eq!(sparse.name, "Kit");
        assert_eq!(sparse.email, "");
        assert_eq!(sparse.photo_file, DEFAULT_PHOTO_FILE);
    }
}
