pub mod assist;
pub mod identity;
pub mod store;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::alarm::model::Alarm;
use crate::worldclock::WorldLocation;

use self::assist::CityInfo;
use self::identity::Session;
use self::store::UserProfile;

pub const ENV_API_KEY: &str = "FOCUSDECK_API_KEY";
pub const ENV_PROJECT: &str = "FOCUSDECK_PROJECT";
pub const ENV_IDENTITY_URL: &str = "FOCUSDECK_IDENTITY_URL";
pub const ENV_STORE_URL: &str = "FOCUSDECK_STORE_URL";

const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_PROJECT: &str = "focusdeck";

const STOP_CHECK_STEP: Duration = Duration::from_millis(200);

/// Endpoints and key for the identity service and the document store.
/// Absent configuration is not an error; the app simply runs without
/// accounts.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub api_key: String,
    pub identity_url: String,
    pub store_url: String,
}

impl RemoteConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(ENV_API_KEY).ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let project =
            std::env::var(ENV_PROJECT).unwrap_or_else(|_| DEFAULT_PROJECT.to_string());
        let identity_url = std::env::var(ENV_IDENTITY_URL)
            .unwrap_or_else(|_| DEFAULT_IDENTITY_URL.to_string());
        let store_url = std::env::var(ENV_STORE_URL)
            .unwrap_or_else(|_| format!("https://store.focusdeck.app/v1/projects/{project}"));
        Some(Self {
            api_key,
            identity_url,
            store_url,
        })
    }
}

/// What a finished sign-in means for the UI. An unverified account got
/// a fresh verification email and was signed out again; only a
/// verified one yields a usable session.
#[derive(Debug)]
pub enum SignInOutcome {
    Verified(Session),
    VerificationSent { email: String },
}

/// Messages from worker threads back to the UI, drained once per
/// frame. Error payloads are already the user-facing strings.
#[derive(Debug)]
pub enum RemoteEvent {
    SignInFinished(Result<SignInOutcome, String>),
    SignUpFinished(Result<String, String>),
    ResetFinished(Result<String, String>),
    ProfileLoaded(Result<UserProfile, String>),
    ProfileSaved(Result<UserProfile, String>),
    AccountDeleted(Result<(), String>),
    AlarmsSnapshot(Vec<Alarm>),
    LocationsSnapshot(Vec<WorldLocation>),
    StoreWriteFailed(String),
    MotivationReady(String),
    CityLookupFinished {
        query: String,
        result: Result<CityInfo, String>,
    },
}

/// Runs one blocking call off the UI thread and delivers its event.
/// A dead receiver just means the app is shutting down.
pub fn spawn_task<F>(events: Sender<RemoteEvent>, task: F)
where
    F: FnOnce() -> RemoteEvent + Send + 'static,
{
    thread::spawn(move || {
        let event = task();
        let _ = events.send(event);
    });
}

/// A polling thread that stops and joins when the handle drops. The
/// sleep between polls is chopped into short steps so dropping the
/// handle never blocks for a full interval.
pub struct WatchHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl WatchHandle {
    pub fn spawn<F>(interval: Duration, mut poll: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = Arc::clone(&stop);
        let thread = thread::spawn(move || {
            while !stop_for_thread.load(Ordering::Relaxed) {
                poll();
                let mut waited = Duration::ZERO;
                while waited < interval {
                    if stop_for_thread.load(Ordering::Relaxed) {
                        return;
                    }
                    let step = STOP_CHECK_STEP.min(interval - waited);
                    thread::sleep(step);
                    waited += step;
                }
            }
        });
        Self {
            stop,
            thread: Some(thread),
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn watch_handle_polls_and_stops_on_drop() {
        let polls = Arc::new(AtomicUsize::new(0));
        let polls_for_thread = Arc::clone(&polls);
        let handle = WatchHandle::spawn(Duration::from_millis(5), move || {
            polls_for_thread.fetch_add(1, Ordering::Relaxed);
        });

        thread::sleep(Duration::from_millis(40));
        drop(handle);
        let after_drop = polls.load(Ordering::Relaxed);
        assert!(after_drop >= 1);

        thread::sleep(Duration::from_millis(20));
        assert_eq!(polls.load(Ordering::Relaxed), after_drop);
    }

    #[test]
    fn spawn_task_delivers_its_event() {
        let (tx, rx) = mpsc::channel();
        spawn_task(tx, || RemoteEvent::MotivationReady("go".to_string()));
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(RemoteEvent::MotivationReady(line)) => assert_eq!(line, "go"),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
