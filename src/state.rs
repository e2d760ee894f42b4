use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::timer::TimerSnapshot;

pub const STATE_DIR_NAME: &str = "focusdeck-state";
pub const TIMER_FILE_NAME: &str = "timer.json";
pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";

const STATE_VERSION: u64 = 1;

/// Email and password remembered on behalf of the user so the sign-in
/// form comes back prefilled. Kept only until a sign-in is verified.
#[derive(Debug, Clone, PartialEq)]
pub struct RememberedCredentials {
    pub email: String,
    pub password: String,
}

pub fn default_state_dir() -> PathBuf {
    let mut path = PathBuf::from(".");
    path.push(STATE_DIR_NAME);
    path
}

pub fn ensure_state_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create state directory {}", dir.display()))
}

pub fn timer_path(dir: &Path) -> PathBuf {
    dir.join(TIMER_FILE_NAME)
}

pub fn credentials_path(dir: &Path) -> PathBuf {
    dir.join(CREDENTIALS_FILE_NAME)
}

/// Reads the persisted countdown, if any. A missing file is a normal
/// first run; a present but unreadable file is an error.
pub fn load_timer_snapshot(path: &Path) -> Result<Option<TimerSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_timer_snapshot_text(&text).map(Some)
}

pub fn parse_timer_snapshot_text(text: &str) -> Result<TimerSnapshot> {
    let file: TimerFile = serde_json::from_str(text).map_err(|err| {
        anyhow!(
            "invalid JSON at line {}, column {}: {err}",
            err.line(),
            err.column()
        )
    })?;
    if file.version != STATE_VERSION {
        bail!(
            "unsupported timer state version {}; expected version {STATE_VERSION}",
            file.version
        );
    }
    Ok(TimerSnapshot {
        remaining_seconds: file.remaining_seconds,
        total_seconds: file.total_seconds,
        running: file.running,
        saved_at_unix: file.last_timestamp,
        theme_index: file.theme_index,
    })
}

pub fn save_timer_snapshot(path: &Path, snapshot: &TimerSnapshot) -> Result<()> {
    let mut root = Map::new();
    root.insert("version".to_string(), json!(STATE_VERSION));
    root.insert(
        "remaining_seconds".to_string(),
        json!(snapshot.remaining_seconds),
    );
    root.insert("total_seconds".to_string(), json!(snapshot.total_seconds));
    root.insert("running".to_string(), json!(snapshot.running));
    root.insert("last_timestamp".to_string(), json!(snapshot.saved_at_unix));
    root.insert("theme_index".to_string(), json!(snapshot.theme_index));
    let text = serde_json::to_string_pretty(&Value::Object(root))
        .context("failed to serialize timer state")?;
    fs::write(path, format!("{text}\n"))
        .with_context(|| format!("failed to write {}", path.display()))
}

pub fn load_credentials(path: &Path) -> Result<Option<RememberedCredentials>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_credentials_text(&text).map(Some)
}

pub fn parse_credentials_text(text: &str) -> Result<RememberedCredentials> {
    let file: CredentialsFile = serde_json::from_str(text).map_err(|err| {
        anyhow!(
            "invalid JSON at line {}, column {}: {err}",
            err.line(),
            err.column()
        )
    })?;
    if file.version != STATE_VERSION {
        bail!(
            "unsupported credentials version {}; expected version {STATE_VERSION}",
            file.version
        );
    }
    Ok(RememberedCredentials {
        email: file.email,
        password: file.password,
    })
}

pub fn save_credentials(path: &Path, credentials: &RememberedCredentials) -> Result<()> {
    let mut root = Map::new();
    root.insert("version".to_string(), json!(STATE_VERSION));
    root.insert("email".to_string(), json!(credentials.email));
    root.insert("password".to_string(), json!(credentials.password));
    let text = serde_json::to_string_pretty(&Value::Object(root))
        .context("failed to serialize credentials")?;
    fs::write(path, format!("{text}\n"))
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Forgets remembered credentials. Missing file means nothing to do.
pub fn clear_credentials(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    fs::remove_file(path).with_context(|| format!("failed to remove {}", path.display()))
}

#[derive(Deserialize)]
struct TimerFile {
    version: u64,
    remaining_seconds: u32,
    total_seconds: u32,
    #[serde(default)]
    running: bool,
    last_timestamp: i64,
    #[serde(default)]
    theme_index: usize,
}

#[derive(Deserialize)]
struct CredentialsFile {
    version: u64,
    email: String,
    password: String,
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn timer_snapshot_round_trips_through_disk() {
        let dir = tempdir().expect("temp dir");
        let path = timer_path(dir.path());
        let snapshot = TimerSnapshot {
            remaining_seconds: 70,
            total_seconds: 120,
            running: true,
            saved_at_unix: 1_767_400_000,
            theme_index: 4,
        };

        save_timer_snapshot(&path, &snapshot).expect("snapshot saves");
        let loaded = load_timer_snapshot(&path)
            .expect("snapshot loads")
            .expect("snapshot present");
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn missing_files_load_as_none() {
        let dir = tempdir().expect("temp dir");
        assert_eq!(
            load_timer_snapshot(&timer_path(dir.path())).expect("load succeeds"),
            None
        );
        assert_eq!(
            load_credentials(&credentials_path(dir.path())).expect("load succeeds"),
            None
        );
    }

    #[test]
    fn rejects_malformed_timer_json() {
        let err = parse_timer_snapshot_text("{ not json").expect_err("parse fails");
        assert!(err.to_string().contains("invalid JSON at line"));
    }

    #[test]
    fn rejects_unknown_timer_version() {
        let text = r#"{
  "version": 9,
  "remaining_seconds": 10,
  "total_seconds": 60,
  "running": false,
  "last_timestamp": 0,
  "theme_index": 0
}"#;
        let err = parse_timer_snapshot_text(text).expect_err("parse fails");
        assert!(
            err.to_string()
                .contains("unsupported timer state version 9")
        );
    }

    #[test]
    fn credentials_save_load_and_clear() {
        let dir = tempdir().expect("temp dir");
        let path = credentials_path(dir.path());
        let creds = RememberedCredentials {
            email: "person@example.com".to_string(),
            password: "hunter2".to_string(),
        };

        save_credentials(&path, &creds).expect("credentials save");
        let loaded = load_credentials(&path)
            .expect("credentials load")
            .expect("credentials present");
        assert_eq!(loaded, creds);

        clear_credentials(&path).expect("credentials clear");
        assert_eq!(load_credentials(&path).expect("load succeeds"), None);
        clear_credentials(&path).expect("clearing again is fine");
    }

    #[test]
    fn optional_timer_fields_default_when_absent() {
        let text = r#"{
  "version": 1,
  "remaining_seconds": 90,
  "total_seconds": 300,
  "last_timestamp": 1767400000
}"#;
        let snapshot = parse_timer_snapshot_text(text).expect("parse succeeds");
        assert!(!snapshot.running);
        assert_eq!(snapshot.theme_index, 0);
    }
}
