use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Timelike, Utc};
use eframe::egui::{
    self, Align, Align2, Color32, FontId, Layout, Pos2, RichText, ScrollArea, Sense, Stroke,
    TextEdit, TopBottomPanel, Ui, pos2, vec2,
};
use tracing::warn;

use crate::alarm::matcher::AlarmMatcher;
use crate::alarm::model::{
    ALARM_SOUNDS, Alarm, DayRule, WEEKDAYS, default_alarms, format_alarm_time, parse_alarm_time,
    sort_alarms, sound_name, weekday_token,
};
use crate::remote::identity::{
    IdentityClient, Session, delete_message, reset_message, sign_in_message, sign_up_message,
};
use crate::remote::store::{
    StoreClient, UserProfile, watch_alarms, watch_locations,
};
use crate::remote::assist::{AssistClient, AssistConfig, FALLBACK_MOTIVATION};
use crate::remote::{
    RemoteConfig, RemoteEvent, SignInOutcome, WatchHandle, spawn_task,
};
use crate::state::{
    RememberedCredentials, clear_credentials, credentials_path, ensure_state_dir,
    load_credentials, load_timer_snapshot, save_credentials, save_timer_snapshot, timer_path,
};
use crate::stopwatch::{Stopwatch, format_elapsed};
use crate::theme::{CLOCK_THEMES, FOCUS_THEMES};
use crate::timer::{
    FocusTimer, MAX_CUSTOM_MINUTES, MIN_CUSTOM_MINUTES, TIMER_PRESETS, format_remaining,
};
use crate::worldclock::{
    WorldLocation, default_locations, format_full_date, format_main_clock, format_shifted_clock,
    hand_angles, lookup_city_offset, relative_day_label, shifted_time, time_difference_label,
    viewer_offset_hours,
};

const STATUS_TTL: Duration = Duration::from_secs(3);
const ERROR_TTL: Duration = Duration::from_secs(5);

pub fn run_gui(state_dir: PathBuf, start_tab: Tab, offline: bool) -> Result<()> {
    ensure_state_dir(&state_dir)?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("FocusDeck")
            .with_inner_size([420.0, 820.0])
            .with_min_inner_size([380.0, 700.0]),
        ..Default::default()
    };

    let app = FocusDeckApp::new(state_dir, start_tab, offline)?;

    eframe::run_native(
        "FocusDeck",
        native_options,
        Box::new(move |cc| {
            configure_theme(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to launch FocusDeck window: {err}"))?;

    Ok(())
}

fn configure_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.override_text_color = Some(Color32::from_rgb(235, 235, 240));
    visuals.panel_fill = Color32::from_rgb(10, 10, 14);
    visuals.window_fill = Color32::from_rgb(16, 16, 22);
    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(14, 14, 20);
    visuals.widgets.inactive.bg_fill = Color32::from_rgb(24, 24, 32);
    visuals.widgets.hovered.bg_fill = Color32::from_rgb(38, 38, 50);
    visuals.widgets.active.bg_fill = Color32::from_rgb(52, 52, 70);
    visuals.selection.bg_fill = Color32::from_rgb(59, 130, 246);
    ctx.set_visuals(visuals);
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Tab {
    Clock,
    Alarm,
    Stopwatch,
    Timer,
}

impl Tab {
    fn label(self) -> &'static str {
        match self {
            Tab::Clock => "CLOCK",
            Tab::Alarm => "ALARM",
            Tab::Stopwatch => "STOPWATCH",
            Tab::Timer => "TIMER",
        }
    }
}

const TAB_ORDER: [Tab; 4] = [Tab::Clock, Tab::Alarm, Tab::Stopwatch, Tab::Timer];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum AccountForm {
    SignIn,
    Register,
    Reset,
}

/// Clients for the configured identity and document services. `None`
/// when running offline or unconfigured; the account screen explains
/// the difference.
struct RemoteLink {
    identity: IdentityClient,
    store: StoreClient,
}

/// Watcher threads for the signed-in user's collections. Dropping the
/// pair stops and joins both.
struct ActiveWatch {
    _alarms: WatchHandle,
    _locations: WatchHandle,
}

struct FocusDeckApp {
    state_dir: PathBuf,
    tab: Tab,
    account_open: bool,
    status_message: Option<(String, Instant)>,
    next_local_id: u64,
    last_tick_unix: Option<i64>,

    timer: FocusTimer,
    timer_custom_input: String,
    timer_error: Option<String>,
    motivation: String,
    motivation_for_theme: Option<usize>,

    stopwatch: Stopwatch,

    alarms: Vec<Alarm>,
    matcher: AlarmMatcher,
    alarm_banner: Option<String>,
    alarm_time_input: String,
    alarm_label_input: String,
    alarm_day_selection: [bool; 7],
    alarm_sound_index: usize,
    alarm_error: Option<String>,

    locations: Vec<WorldLocation>,
    clock_theme_index: usize,
    city_query: String,
    city_error: Option<String>,
    city_lookup_busy: bool,

    account_form: AccountForm,
    email_input: String,
    password_input: String,
    confirm_input: String,
    name_input: String,
    auth_error: Option<String>,
    auth_notice: Option<String>,
    auth_busy: bool,
    pending_credentials: Option<RememberedCredentials>,
    session: Option<Session>,
    profile: Option<UserProfile>,
    profile_name_input: String,
    profile_busy: bool,
    delete_armed: bool,

    link: Option<RemoteLink>,
    watches: Option<ActiveWatch>,
    assist: Option<AssistClient>,
    events_tx: Sender<RemoteEvent>,
    events_rx: Receiver<RemoteEvent>,
}

impl FocusDeckApp {
    fn new(state_dir: PathBuf, start_tab: Tab, offline: bool) -> Result<Self> {
        let now = Local::now();
        let timer = match load_timer_snapshot(&timer_path(&state_dir))
            .with_context(|| format!("failed to load timer state from {}", state_dir.display()))?
        {
            Some(snapshot) => FocusTimer::restore(snapshot, now, FOCUS_THEMES.len()),
            None => FocusTimer::new(),
        };
        let remembered = load_credentials(&credentials_path(&state_dir)).with_context(|| {
            format!("failed to load credentials from {}", state_dir.display())
        })?;

        let link = if offline {
            None
        } else {
            match RemoteConfig::from_env() {
                Some(config) => Some(RemoteLink {
                    identity: IdentityClient::new(&config)?,
                    store: StoreClient::new(&config)?,
                }),
                None => None,
            }
        };
        let assist = if offline {
            None
        } else {
            match AssistConfig::from_env() {
                Some(config) => Some(AssistClient::new(&config)?),
                None => None,
            }
        };

        let mut alarms = default_alarms();
        sort_alarms(&mut alarms);
        let (events_tx, events_rx) = mpsc::channel();

        Ok(Self {
            state_dir,
            tab: start_tab,
            account_open: false,
            status_message: None,
            next_local_id: 1,
            last_tick_unix: None,
            timer,
            timer_custom_input: String::new(),
            timer_error: None,
            motivation: FALLBACK_MOTIVATION.to_string(),
            motivation_for_theme: None,
            stopwatch: Stopwatch::new(),
            alarms,
            matcher: AlarmMatcher::new(),
            alarm_banner: None,
            alarm_time_input: "07:00".to_string(),
            alarm_label_input: String::new(),
            alarm_day_selection: [false; 7],
            alarm_sound_index: 0,
            alarm_error: None,
            locations: default_locations(),
            clock_theme_index: 0,
            city_query: String::new(),
            city_error: None,
            city_lookup_busy: false,
            account_form: AccountForm::SignIn,
            email_input: remembered
                .as_ref()
                .map(|creds| creds.email.clone())
                .unwrap_or_default(),
            password_input: remembered
                .map(|creds| creds.password)
                .unwrap_or_default(),
            confirm_input: String::new(),
            name_input: String::new(),
            auth_error: None,
            auth_notice: None,
            auth_busy: false,
            pending_credentials: None,
            session: None,
            profile: None,
            profile_name_input: String::new(),
            profile_busy: false,
            delete_armed: false,
            link,
            watches: None,
            assist,
            events_tx,
            events_rx,
        })
    }

    fn set_status(&mut self, text: impl Into<String>, ttl: Duration) {
        self.status_message = Some((text.into(), Instant::now() + ttl));
    }

    fn next_generated_id(&mut self, prefix: &str, now: DateTime<Local>) -> String {
        let id = format!("{prefix}-{}-{}", now.timestamp(), self.next_local_id);
        self.next_local_id += 1;
        id
    }

    fn save_timer(&mut self, now: DateTime<Local>) {
        let snapshot = self.timer.snapshot(now);
        if let Err(err) = save_timer_snapshot(&timer_path(&self.state_dir), &snapshot) {
            warn!("could not save countdown: {err:#}");
        }
    }

    /// Runs one store write off the UI thread. Failures surface on the
    /// status line; the watcher snapshot is what reconciles the list.
    fn store_write<F>(&self, op: F)
    where
        F: FnOnce(&StoreClient, &Session) -> Result<(), crate::remote::store::StoreError>
            + Send
            + 'static,
    {
        let (Some(link), Some(session)) = (&self.link, &self.session) else {
            return;
        };
        let store = link.store.clone();
        let session = session.clone();
        let events = self.events_tx.clone();
        std::thread::spawn(move || {
            if let Err(err) = op(&store, &session) {
                let _ = events.send(RemoteEvent::StoreWriteFailed(err.to_string()));
            }
        });
    }

    fn attach_store(&mut self) {
        let (Some(link), Some(session)) = (&self.link, &self.session) else {
            return;
        };
        self.watches = Some(ActiveWatch {
            _alarms: watch_alarms(link.store.clone(), session.clone(), self.events_tx.clone()),
            _locations: watch_locations(
                link.store.clone(),
                session.clone(),
                self.events_tx.clone(),
            ),
        });

        let store = link.store.clone();
        let session = session.clone();
        spawn_task(self.events_tx.clone(), move || {
            RemoteEvent::ProfileLoaded(match store.fetch_profile(&session) {
                Ok(Some(profile)) => Ok(profile),
                Ok(None) => Ok(UserProfile::new("", session.email.clone())),
                Err(err) => Err(err.to_string()),
            })
        });
    }

    fn sign_out(&mut self) {
        self.watches = None;
        self.session = None;
        self.profile = None;
        self.profile_busy = false;
        self.delete_armed = false;
        self.alarms = default_alarms();
        sort_alarms(&mut self.alarms);
        self.locations = default_locations();
        self.set_status("Signed out.", STATUS_TTL);
    }

    fn submit_sign_in(&mut self) {
        let email = self.email_input.trim().to_string();
        let password = self.password_input.clone();
        if email.is_empty() || password.is_empty() {
            self.auth_error = Some("Email and password are required".to_string());
            return;
        }
        let Some(link) = &self.link else {
            return;
        };
        self.auth_error = None;
        self.auth_notice = None;
        self.auth_busy = true;
        self.pending_credentials = Some(RememberedCredentials {
            email: email.clone(),
            password: password.clone(),
        });

        let identity = link.identity.clone();
        spawn_task(self.events_tx.clone(), move || {
            let outcome = identity.sign_in(&email, &password).and_then(|session| {
                let info = identity.lookup(&session.id_token)?;
                if info.email_verified {
                    Ok(SignInOutcome::Verified(session))
                } else {
                    // A fresh link each attempt; the old one may be stale.
                    if let Err(err) = identity.send_verification_email(&session.id_token) {
                        warn!("could not resend verification email: {err}");
                    }
                    Ok(SignInOutcome::VerificationSent { email })
                }
            });
            RemoteEvent::SignInFinished(outcome.map_err(|err| sign_in_message(&err)))
        });
    }

    fn submit_registration(&mut self) {
        if let Err(message) = validate_registration(
            &self.name_input,
            &self.email_input,
            &self.password_input,
            &self.confirm_input,
        ) {
            self.auth_error = Some(message);
            return;
        }
        let Some(link) = &self.link else {
            return;
        };
        let email = self.email_input.trim().to_string();
        let password = self.password_input.clone();
        let name = self.name_input.trim().to_string();
        self.auth_error = None;
        self.auth_notice = None;
        self.auth_busy = true;
        self.pending_credentials = Some(RememberedCredentials {
            email: email.clone(),
            password,
        });

        let identity = link.identity.clone();
        let store = link.store.clone();
        let password = self.password_input.clone();
        spawn_task(self.events_tx.clone(), move || {
            let result = identity.sign_up(&email, &password).map(|session| {
                let profile = UserProfile::new(name.clone(), email.clone());
                if let Err(err) = store.save_profile(&session, &profile) {
                    warn!("could not create profile document: {err}");
                }
                if let Err(err) = identity.send_verification_email(&session.id_token) {
                    warn!("could not send verification email: {err}");
                }
                email.clone()
            });
            RemoteEvent::SignUpFinished(result.map_err(|err| sign_up_message(&err)))
        });
    }

    fn submit_reset(&mut self) {
        let email = self.email_input.trim().to_string();
        if email.is_empty() {
            self.auth_error = Some("Enter your email first".to_string());
            return;
        }
        let Some(link) = &self.link else {
            return;
        };
        self.auth_error = None;
        self.auth_notice = None;
        self.auth_busy = true;
        let identity = link.identity.clone();
        spawn_task(self.events_tx.clone(), move || {
            RemoteEvent::ResetFinished(
                identity
                    .send_reset_email(&email)
                    .map(|()| email.clone())
                    .map_err(|err| reset_message(&err)),
            )
        });
    }

    fn submit_profile_save(&mut self) {
        let (Some(link), Some(session), Some(profile)) =
            (&self.link, &self.session, &self.profile)
        else {
            return;
        };
        let mut updated = profile.clone();
        updated.name = self.profile_name_input.trim().to_string();
        self.profile_busy = true;

        let identity = link.identity.clone();
        let store = link.store.clone();
        let session = session.clone();
        spawn_task(self.events_tx.clone(), move || {
            let result = identity
                .update_display_name(&session.id_token, &updated.name)
                .map_err(|err| err.to_string())
                .and_then(|()| {
                    store
                        .save_profile(&session, &updated)
                        .map(|()| updated.clone())
                        .map_err(|err| err.to_string())
                });
            RemoteEvent::ProfileSaved(result)
        });
    }

    /// Second click of the armed delete button. Removes the user's
    /// documents first, then the identity account.
    fn submit_account_deletion(&mut self) {
        let (Some(link), Some(session)) = (&self.link, &self.session) else {
            return;
        };
        self.profile_busy = true;
        let identity = link.identity.clone();
        let store = link.store.clone();
        let session = session.clone();
        spawn_task(self.events_tx.clone(), move || {
            if let Err(err) = store.delete_user_data(&session) {
                return RemoteEvent::AccountDeleted(Err(format!(
                    "Could not remove your data: {err}"
                )));
            }
            RemoteEvent::AccountDeleted(
                identity
                    .delete_account(&session.id_token)
                    .map_err(|err| delete_message(&err)),
            )
        });
    }

    fn submit_alarm_form(&mut self, now: DateTime<Local>) {
        let time = match parse_alarm_time(&self.alarm_time_input) {
            Ok(time) => time,
            Err(err) => {
                self.alarm_error = Some(err.to_string());
                return;
            }
        };
        self.alarm_error = None;
        let label = match self.alarm_label_input.trim() {
            "" => "Alarm".to_string(),
            text => text.to_string(),
        };
        let alarm = Alarm {
            id: self.next_generated_id("alarm", now),
            time,
            label,
            active: true,
            days: DayRule::from_selection(&selected_days(&self.alarm_day_selection)),
            sound: ALARM_SOUNDS[self.alarm_sound_index.min(ALARM_SOUNDS.len() - 1)]
                .id
                .to_string(),
        };

        if self.session.is_some() {
            let body = alarm.clone();
            self.store_write(move |store, session| store.add_alarm(session, &body));
        }
        self.alarms.push(alarm);
        sort_alarms(&mut self.alarms);
        self.alarm_label_input.clear();
        self.alarm_day_selection = [false; 7];
        self.set_status("Alarm added.", STATUS_TTL);
    }

    fn toggle_alarm(&mut self, index: usize) {
        let Some(alarm) = self.alarms.get_mut(index) else {
            return;
        };
        alarm.active = !alarm.active;
        if self.session.is_some() {
            let body = alarm.clone();
            self.store_write(move |store, session| store.update_alarm(session, &body));
        }
    }

    fn remove_alarm(&mut self, index: usize) {
        if index >= self.alarms.len() {
            return;
        }
        let removed = self.alarms.remove(index);
        if self.session.is_some() {
            self.store_write(move |store, session| store.delete_alarm(session, &removed.id));
        }
        self.set_status("Alarm removed.", STATUS_TTL);
    }

    fn submit_city_query(&mut self, now: DateTime<Local>) {
        let query = self.city_query.trim().to_string();
        if query.is_empty() {
            self.city_error = Some("Enter a city name".to_string());
            return;
        }
        self.city_error = None;

        if let Some(offset) = lookup_city_offset(&query) {
            let location =
                WorldLocation::new(self.next_generated_id("loc", now), title_case(&query), offset);
            self.add_location(location);
            self.city_query.clear();
            return;
        }

        match &self.assist {
            Some(assist) => {
                self.city_lookup_busy = true;
                let assist = assist.clone();
                let for_event = query.clone();
                spawn_task(self.events_tx.clone(), move || {
                    RemoteEvent::CityLookupFinished {
                        query: for_event.clone(),
                        result: assist.city_lookup(&for_event).map_err(|err| {
                            warn!("city lookup failed for '{for_event}': {err}");
                            format!("No match found for '{for_event}'")
                        }),
                    }
                });
            }
            None => {
                self.city_error = Some(format!(
                    "'{query}' is not in the city table and lookup is not configured"
                ));
            }
        }
    }

    fn add_location(&mut self, location: WorldLocation) {
        if self.session.is_some() {
            let body = location.clone();
            self.store_write(move |store, session| store.add_location(session, &body));
        }
        // New cities go to the front of the list.
        self.locations.insert(0, location);
    }

    fn remove_location(&mut self, index: usize) {
        if index >= self.locations.len() {
            return;
        }
        let removed = self.locations.remove(index);
        if self.session.is_some() {
            self.store_write(move |store, session| store.delete_location(session, &removed.id));
        }
    }

    fn request_motivation(&mut self) {
        let theme_index = self.timer.theme_index;
        if self.motivation_for_theme == Some(theme_index) {
            return;
        }
        self.motivation_for_theme = Some(theme_index);
        self.motivation = FALLBACK_MOTIVATION.to_string();
        let Some(assist) = &self.assist else {
            return;
        };
        let assist = assist.clone();
        let theme_name = FOCUS_THEMES[theme_index.min(FOCUS_THEMES.len() - 1)].name;
        spawn_task(self.events_tx.clone(), move || {
            match assist.motivation_line(theme_name) {
                Ok(line) => RemoteEvent::MotivationReady(line),
                Err(err) => {
                    warn!("motivation fetch failed: {err}");
                    RemoteEvent::MotivationReady(FALLBACK_MOTIVATION.to_string())
                }
            }
        });
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                RemoteEvent::SignInFinished(result) => {
                    self.auth_busy = false;
                    match result {
                        Ok(SignInOutcome::Verified(session)) => {
                            if let Err(err) =
                                clear_credentials(&credentials_path(&self.state_dir))
                            {
                                warn!("could not clear remembered credentials: {err:#}");
                            }
                            self.pending_credentials = None;
                            self.password_input.clear();
                            self.session = Some(session);
                            self.attach_store();
                            self.account_open = false;
                            self.set_status("Signed in.", STATUS_TTL);
                        }
                        Ok(SignInOutcome::VerificationSent { email }) => {
                            self.remember_pending_credentials();
                            self.auth_notice = Some(format!(
                                "Email not verified. A new verification link went to {email}."
                            ));
                        }
                        Err(message) => self.auth_error = Some(message),
                    }
                }
                RemoteEvent::SignUpFinished(result) => {
                    self.auth_busy = false;
                    match result {
                        Ok(email) => {
                            self.remember_pending_credentials();
                            self.account_form = AccountForm::SignIn;
                            self.auth_notice = Some(format!(
                                "Account created. Verify {email} before signing in."
                            ));
                        }
                        Err(message) => self.auth_error = Some(message),
                    }
                }
                RemoteEvent::ResetFinished(result) => {
                    self.auth_busy = false;
                    match result {
                        Ok(email) => {
                            self.account_form = AccountForm::SignIn;
                            self.auth_notice =
                                Some(format!("Password reset email sent to {email}."));
                        }
                        Err(message) => self.auth_error = Some(message),
                    }
                }
                RemoteEvent::ProfileLoaded(result) => match result {
                    Ok(profile) => {
                        self.profile_name_input = profile.name.clone();
                        self.profile = Some(profile);
                    }
                    Err(message) => {
                        warn!("profile load failed: {message}");
                    }
                },
                RemoteEvent::ProfileSaved(result) => {
                    self.profile_busy = false;
                    match result {
                        Ok(profile) => {
                            self.profile_name_input = profile.name.clone();
                            self.profile = Some(profile);
                            self.set_status("Profile saved.", STATUS_TTL);
                        }
                        Err(message) => {
                            self.set_status(format!("Profile save failed: {message}"), ERROR_TTL);
                        }
                    }
                }
                RemoteEvent::AccountDeleted(result) => {
                    self.profile_busy = false;
                    self.delete_armed = false;
                    match result {
                        Ok(()) => {
                            self.sign_out();
                            self.set_status("Account deleted.", STATUS_TTL);
                        }
                        Err(message) => self.set_status(message, ERROR_TTL),
                    }
                }
                RemoteEvent::AlarmsSnapshot(alarms) => {
                    // Snapshots replace the cache wholesale, and only
                    // while the session that spawned them is current.
                    if self.session.is_some() {
                        self.alarms = alarms;
                    }
                }
                RemoteEvent::LocationsSnapshot(locations) => {
                    if self.session.is_some() {
                        self.locations = locations;
                    }
                }
                RemoteEvent::StoreWriteFailed(message) => {
                    self.set_status(format!("Sync failed: {message}"), ERROR_TTL);
                }
                RemoteEvent::MotivationReady(line) => {
                    self.motivation = line;
                }
                RemoteEvent::CityLookupFinished { query, result } => {
                    self.city_lookup_busy = false;
                    match result {
                        Ok(info) => {
                            let mut location = WorldLocation::new(
                                self.next_generated_id("loc", Local::now()),
                                info.city,
                                info.offset_hours,
                            );
                            if !info.country.is_empty() {
                                location.country = Some(info.country);
                            }
                            if !info.mood.is_empty() {
                                location.mood = Some(info.mood);
                            }
                            self.add_location(location);
                            if self.city_query.trim() == query {
                                self.city_query.clear();
                            }
                        }
                        Err(message) => self.city_error = Some(message),
                    }
                }
            }
        }
    }

    fn remember_pending_credentials(&mut self) {
        let Some(credentials) = self.pending_credentials.take() else {
            return;
        };
        if let Err(err) = save_credentials(&credentials_path(&self.state_dir), &credentials) {
            warn!("could not remember credentials: {err:#}");
        }
    }

    /// The once-per-second work: alarm poll, countdown finish check,
    /// and a running-countdown snapshot so a killed process resumes.
    fn tick_second(&mut self, now: DateTime<Local>) {
        let outcome = self.matcher.tick(now.naive_local(), &mut self.alarms);
        if !outcome.fired.is_empty() {
            let lines: Vec<String> = outcome
                .fired
                .iter()
                .map(|fired| format!("{} ({})", fired.label, sound_name(&fired.sound)))
                .collect();
            self.alarm_banner = Some(lines.join("  ·  "));
        }
        if self.session.is_some() {
            for id in outcome.deactivated {
                if let Some(alarm) = self.alarms.iter().find(|alarm| alarm.id == id).cloned() {
                    self.store_write(move |store, session| store.update_alarm(session, &alarm));
                }
            }
        }

        if self.timer.sync(now) {
            self.save_timer(now);
            self.set_status("Focus session complete. Well done.", Duration::from_secs(8));
        } else if self.timer.is_running() {
            self.save_timer(now);
        }
    }

    fn show_header(&mut self, ui: &mut Ui, now: DateTime<Local>) {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("FocusDeck")
                    .size(20.0)
                    .color(Color32::from_rgb(59, 130, 246))
                    .strong(),
            );
            ui.separator();
            ui.label(
                RichText::new(format!(
                    "{:02}:{:02}:{:02}",
                    now.hour(),
                    now.minute(),
                    now.second()
                ))
                .size(18.0)
                .monospace(),
            );
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let label = if self.account_open { "Back" } else { "Account" };
                if ui.button(label).clicked() {
                    self.account_open = !self.account_open;
                    self.auth_error = None;
                    self.auth_notice = None;
                    self.delete_armed = false;
                }
            });
        });

        if let Some(banner) = self.alarm_banner.clone() {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("\u{23F0} {banner}"))
                        .color(Color32::from_rgb(255, 183, 95))
                        .strong(),
                );
                if ui.small_button("Dismiss").clicked() {
                    self.alarm_banner = None;
                }
            });
        }
        if let Some((message, _)) = &self.status_message {
            ui.label(
                RichText::new(message)
                    .color(Color32::from_rgb(111, 228, 134))
                    .strong(),
            );
        }
        ui.add_space(4.0);
    }

    fn show_tab_bar(&mut self, ui: &mut Ui) {
        ui.add_space(6.0);
        ui.columns(TAB_ORDER.len(), |columns| {
            for (column, tab) in columns.iter_mut().zip(TAB_ORDER) {
                column.vertical_centered(|ui| {
                    let selected = self.tab == tab && !self.account_open;
                    if ui
                        .selectable_label(selected, RichText::new(tab.label()).strong())
                        .clicked()
                    {
                        self.tab = tab;
                        self.account_open = false;
                    }
                });
            }
        });
        ui.add_space(6.0);
    }

    fn show_timer(&mut self, ui: &mut Ui, now: DateTime<Local>) {
        self.request_motivation();
        let theme = FOCUS_THEMES[self.timer.theme_index.min(FOCUS_THEMES.len() - 1)];

        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new(format!("{} {}", theme.icon, theme.name))
                    .size(18.0)
                    .color(theme.accent)
                    .strong(),
            );
            ui.add_space(6.0);

            let (rect, _) = ui.allocate_exact_size(vec2(240.0, 240.0), Sense::hover());
            let painter = ui.painter();
            let center = rect.center();
            painter.circle_filled(center, 112.0, theme.backdrop);
            painter.circle_stroke(center, 104.0, Stroke::new(6.0, Color32::from_gray(40)));
            let fraction = self.timer.fraction_remaining(now).clamp(0.0, 1.0);
            if fraction > 0.0 {
                painter.add(egui::Shape::line(
                    ring_points(center, 104.0, fraction),
                    Stroke::new(6.0, theme.accent),
                ));
            }
            painter.text(
                center,
                Align2::CENTER_CENTER,
                format_remaining(self.timer.current_remaining(now)),
                FontId::monospace(44.0),
                Color32::WHITE,
            );
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.add_space(ui.available_width() / 2.0 - 110.0);
            let toggle_label = if self.timer.is_running() { "Pause" } else { "Start" };
            if ui
                .add(egui::Button::new(RichText::new(toggle_label).strong()).min_size(vec2(100.0, 34.0)))
                .clicked()
            {
                if self.timer.is_running() {
                    self.timer.pause(now);
                } else {
                    self.timer.start(now);
                }
                self.save_timer(now);
            }
            if ui
                .add(egui::Button::new("Reset").min_size(vec2(100.0, 34.0)))
                .clicked()
            {
                self.timer.reset();
                self.save_timer(now);
            }
        });

        ui.add_space(10.0);
        ui.label(RichText::new("Presets").strong());
        ui.horizontal_wrapped(|ui| {
            for preset in TIMER_PRESETS {
                if ui
                    .button(format!("{} {}m", preset.name, preset.minutes))
                    .clicked()
                {
                    self.timer.set_duration_minutes(preset.minutes);
                    self.timer_error = None;
                    self.save_timer(now);
                }
            }
        });
        ui.horizontal(|ui| {
            ui.label("Custom");
            ui.add(
                TextEdit::singleline(&mut self.timer_custom_input)
                    .desired_width(60.0)
                    .hint_text("min"),
            );
            if ui.button("Set").clicked() {
                match parse_custom_minutes(&self.timer_custom_input) {
                    Ok(minutes) => {
                        self.timer.set_duration_minutes(minutes);
                        self.timer_error = None;
                        self.timer_custom_input.clear();
                        self.save_timer(now);
                    }
                    Err(message) => self.timer_error = Some(message),
                }
            }
        });
        if let Some(error) = &self.timer_error {
            ui.colored_label(Color32::from_rgb(255, 124, 124), error);
        }

        ui.add_space(10.0);
        ui.label(RichText::new("Focus theme").strong());
        ui.horizontal_wrapped(|ui| {
            for (index, theme) in FOCUS_THEMES.iter().enumerate() {
                let selected = index == self.timer.theme_index;
                if ui
                    .selectable_label(selected, format!("{} {}", theme.icon, theme.name))
                    .clicked()
                    && !selected
                {
                    self.timer.theme_index = index;
                    self.save_timer(now);
                }
            }
        });

        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new(format!("\u{201C}{}\u{201D}", self.motivation))
                    .italics()
                    .color(Color32::from_gray(170)),
            );
        });
    }

    fn show_stopwatch(&mut self, ui: &mut Ui, now: DateTime<Local>) {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.label(
                RichText::new(format_elapsed(self.stopwatch.elapsed_ms(now)))
                    .size(52.0)
                    .monospace(),
            );
            ui.add_space(16.0);
        });

        ui.horizontal(|ui| {
            ui.add_space(ui.available_width() / 2.0 - 140.0);
            let toggle_label = if self.stopwatch.is_running() { "Pause" } else { "Start" };
            if ui
                .add(egui::Button::new(RichText::new(toggle_label).strong()).min_size(vec2(84.0, 32.0)))
                .clicked()
            {
                if self.stopwatch.is_running() {
                    self.stopwatch.pause(now);
                } else {
                    self.stopwatch.start(now);
                }
            }
            if ui
                .add_enabled(
                    self.stopwatch.is_running(),
                    egui::Button::new("Lap").min_size(vec2(84.0, 32.0)),
                )
                .clicked()
            {
                self.stopwatch.lap(now);
            }
            if ui
                .add_enabled(
                    !self.stopwatch.is_running(),
                    egui::Button::new("Reset").min_size(vec2(84.0, 32.0)),
                )
                .clicked()
            {
                self.stopwatch.reset();
            }
        });

        ui.add_space(12.0);
        if self.stopwatch.laps().is_empty() {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("No laps yet.").color(Color32::from_gray(140)));
            });
            return;
        }
        ScrollArea::vertical().id_salt("laps_scroll").show(ui, |ui| {
            egui::Grid::new("laps_grid")
                .striped(true)
                .num_columns(3)
                .min_col_width(100.0)
                .show(ui, |ui| {
                    ui.label(RichText::new("Lap").strong());
                    ui.label(RichText::new("Split").strong());
                    ui.label(RichText::new("Total").strong());
                    ui.end_row();
                    for lap in self.stopwatch.laps() {
                        ui.label(format!("#{:02}", lap.sequence));
                        ui.label(RichText::new(format_elapsed(lap.delta_ms)).monospace());
                        ui.label(RichText::new(format_elapsed(lap.cumulative_ms)).monospace());
                        ui.end_row();
                    }
                });
        });
    }

    fn show_alarms(&mut self, ui: &mut Ui, now: DateTime<Local>) {
        ui.label(RichText::new("Alarms").size(18.0).strong());
        ui.add_space(4.0);

        let mut toggle_index: Option<usize> = None;
        let mut remove_index: Option<usize> = None;
        if self.alarms.is_empty() {
            ui.label(RichText::new("No alarms yet.").color(Color32::from_gray(140)));
        } else {
            ScrollArea::vertical()
                .id_salt("alarms_scroll")
                .max_height(ui.available_height() - 220.0)
                .show(ui, |ui| {
                    egui::Grid::new("alarms_grid")
                        .striped(true)
                        .num_columns(5)
                        .show(ui, |ui| {
                            for (index, alarm) in self.alarms.iter().enumerate() {
                                let time_color = if alarm.active {
                                    Color32::WHITE
                                } else {
                                    Color32::from_gray(110)
                                };
                                ui.label(
                                    RichText::new(format_alarm_time(alarm.time))
                                        .size(22.0)
                                        .monospace()
                                        .color(time_color),
                                );
                                ui.vertical(|ui| {
                                    ui.label(RichText::new(&alarm.label).strong());
                                    ui.label(
                                        RichText::new(alarm.days.summary())
                                            .size(11.0)
                                            .color(Color32::from_gray(150)),
                                    );
                                });
                                ui.label(
                                    RichText::new(sound_name(&alarm.sound))
                                        .size(11.0)
                                        .color(Color32::from_gray(150)),
                                );
                                let mut active = alarm.active;
                                if ui.checkbox(&mut active, "").changed() {
                                    toggle_index = Some(index);
                                }
                                if ui.small_button("Delete").clicked() {
                                    remove_index = Some(index);
                                }
                                ui.end_row();
                            }
                        });
                });
        }
        if let Some(index) = toggle_index {
            self.toggle_alarm(index);
        }
        if let Some(index) = remove_index {
            self.remove_alarm(index);
        }

        ui.separator();
        ui.label(RichText::new("New alarm").strong());
        ui.horizontal(|ui| {
            ui.label("Time");
            ui.add(
                TextEdit::singleline(&mut self.alarm_time_input)
                    .desired_width(70.0)
                    .hint_text("HH:MM"),
            );
            ui.label("Label");
            ui.add(TextEdit::singleline(&mut self.alarm_label_input).desired_width(120.0));
        });
        ui.horizontal_wrapped(|ui| {
            ui.label("Days:");
            for (index, day) in WEEKDAYS.iter().enumerate() {
                ui.checkbox(&mut self.alarm_day_selection[index], weekday_token(*day));
            }
        });
        ui.horizontal(|ui| {
            ui.label("Sound");
            egui::ComboBox::from_id_salt("alarm_sound")
                .selected_text(ALARM_SOUNDS[self.alarm_sound_index.min(ALARM_SOUNDS.len() - 1)].name)
                .show_ui(ui, |ui| {
                    for (index, sound) in ALARM_SOUNDS.iter().enumerate() {
                        ui.selectable_value(&mut self.alarm_sound_index, index, sound.name);
                    }
                });
            if ui.button("Add alarm").clicked() {
                self.submit_alarm_form(now);
            }
        });
        ui.label(
            RichText::new("No days selected rings once; all seven rings every day.")
                .size(11.0)
                .color(Color32::from_gray(140)),
        );
        if let Some(error) = &self.alarm_error {
            ui.colored_label(Color32::from_rgb(255, 124, 124), error);
        }
    }

    fn show_clock(&mut self, ui: &mut Ui, now: DateTime<Local>) {
        let clock_theme = CLOCK_THEMES[self.clock_theme_index.min(CLOCK_THEMES.len() - 1)];

        ui.vertical_centered(|ui| {
            let (rect, _) = ui.allocate_exact_size(vec2(220.0, 220.0), Sense::hover());
            let painter = ui.painter();
            let center = rect.center();
            painter.circle_filled(center, 104.0, clock_theme.backdrop);
            painter.circle_stroke(center, 104.0, Stroke::new(2.0, clock_theme.marker));
            for hour in 0..12 {
                let degrees = hour as f32 * 30.0;
                painter.line_segment(
                    [
                        hand_endpoint(center, 92.0, degrees),
                        hand_endpoint(center, 100.0, degrees),
                    ],
                    Stroke::new(2.0, clock_theme.marker),
                );
            }
            let (second_deg, minute_deg, hour_deg) = hand_angles(now);
            painter.line_segment(
                [center, hand_endpoint(center, 54.0, hour_deg)],
                Stroke::new(5.0, clock_theme.hand),
            );
            painter.line_segment(
                [center, hand_endpoint(center, 78.0, minute_deg)],
                Stroke::new(3.0, clock_theme.hand),
            );
            painter.line_segment(
                [center, hand_endpoint(center, 88.0, second_deg)],
                Stroke::new(1.5, clock_theme.accent),
            );
            painter.circle_filled(center, 4.0, clock_theme.accent);

            let (readout, meridiem) = format_main_clock(now);
            ui.label(
                RichText::new(format!("{readout} {meridiem}"))
                    .size(26.0)
                    .color(clock_theme.text)
                    .strong(),
            );
            ui.label(
                RichText::new(format_full_date(now))
                    .size(12.0)
                    .color(Color32::from_gray(150)),
            );
        });

        ui.horizontal(|ui| {
            ui.label("Face:");
            for (index, theme) in CLOCK_THEMES.iter().enumerate() {
                if ui
                    .selectable_label(index == self.clock_theme_index, theme.name)
                    .clicked()
                {
                    self.clock_theme_index = index;
                }
            }
        });

        ui.separator();
        ui.horizontal(|ui| {
            ui.add(
                TextEdit::singleline(&mut self.city_query)
                    .desired_width(180.0)
                    .hint_text("Add a city"),
            );
            let add_enabled = !self.city_lookup_busy;
            if ui
                .add_enabled(add_enabled, egui::Button::new("Add"))
                .clicked()
            {
                self.submit_city_query(now);
            }
            if self.city_lookup_busy {
                ui.spinner();
            }
        });
        if let Some(error) = &self.city_error {
            ui.colored_label(Color32::from_rgb(255, 124, 124), error);
        }

        ui.add_space(6.0);
        let now_utc = Utc::now();
        let viewer_date = now.date_naive();
        let viewer_offset = viewer_offset_hours(now);
        let mut remove_index: Option<usize> = None;
        ScrollArea::vertical()
            .id_salt("locations_scroll")
            .show(ui, |ui| {
                egui::Grid::new("locations_grid")
                    .striped(true)
                    .num_columns(4)
                    .show(ui, |ui| {
                        for (index, location) in self.locations.iter().enumerate() {
                            let shifted = shifted_time(now_utc, location.offset_hours);
                            ui.vertical(|ui| {
                                ui.label(RichText::new(&location.name).strong());
                                let detail = match (&location.country, &location.mood) {
                                    (Some(country), Some(mood)) => {
                                        format!("{country} · {mood}")
                                    }
                                    (Some(country), None) => country.clone(),
                                    (None, Some(mood)) => mood.clone(),
                                    (None, None) => time_difference_label(
                                        location.offset_hours,
                                        viewer_offset,
                                    ),
                                };
                                ui.label(
                                    RichText::new(detail)
                                        .size(11.0)
                                        .color(Color32::from_gray(150)),
                                );
                            });
                            ui.label(
                                RichText::new(format_shifted_clock(shifted))
                                    .size(22.0)
                                    .monospace(),
                            );
                            ui.label(
                                RichText::new(relative_day_label(shifted.date(), viewer_date))
                                    .size(11.0)
                                    .color(Color32::from_gray(150)),
                            );
                            if ui.small_button("Remove").clicked() {
                                remove_index = Some(index);
                            }
                            ui.end_row();
                        }
                    });
            });
        if let Some(index) = remove_index {
            self.remove_location(index);
        }
    }

    fn show_account(&mut self, ui: &mut Ui) {
        if self.link.is_none() {
            ui.add_space(24.0);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("Remote sync is not configured.").strong());
                ui.label(
                    RichText::new(
                        "Set FOCUSDECK_API_KEY (and optionally FOCUSDECK_PROJECT) to \
                         sync alarms, cities and your profile across devices.",
                    )
                    .color(Color32::from_gray(150)),
                );
            });
            return;
        }

        if self.session.is_some() {
            self.show_profile(ui);
        } else {
            self.show_auth_forms(ui);
        }
    }

    fn show_auth_forms(&mut self, ui: &mut Ui) {
        ui.add_space(12.0);
        let heading = match self.account_form {
            AccountForm::SignIn => "Sign in",
            AccountForm::Register => "Create account",
            AccountForm::Reset => "Reset password",
        };
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(heading).size(20.0).strong());
        });
        ui.add_space(8.0);

        if self.account_form == AccountForm::Register {
            ui.horizontal(|ui| {
                ui.label("Name");
                ui.add(TextEdit::singleline(&mut self.name_input).desired_width(220.0));
            });
        }
        ui.horizontal(|ui| {
            ui.label("Email");
            ui.add(TextEdit::singleline(&mut self.email_input).desired_width(220.0));
        });
        if self.account_form != AccountForm::Reset {
            ui.horizontal(|ui| {
                ui.label("Password");
                ui.add(
                    TextEdit::singleline(&mut self.password_input)
                        .password(true)
                        .desired_width(220.0),
                );
            });
        }
        if self.account_form == AccountForm::Register {
            ui.horizontal(|ui| {
                ui.label("Confirm");
                ui.add(
                    TextEdit::singleline(&mut self.confirm_input)
                        .password(true)
                        .desired_width(220.0),
                );
            });
        }

        if let Some(error) = &self.auth_error {
            ui.colored_label(Color32::from_rgb(255, 124, 124), error);
        }
        if let Some(notice) = &self.auth_notice {
            ui.colored_label(Color32::from_rgb(111, 228, 134), notice);
        }

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            let submit_label = match self.account_form {
                AccountForm::SignIn => "Sign in",
                AccountForm::Register => "Register",
                AccountForm::Reset => "Send reset email",
            };
            if ui
                .add_enabled(
                    !self.auth_busy,
                    egui::Button::new(RichText::new(submit_label).strong())
                        .min_size(vec2(140.0, 30.0)),
                )
                .clicked()
            {
                match self.account_form {
                    AccountForm::SignIn => self.submit_sign_in(),
                    AccountForm::Register => self.submit_registration(),
                    AccountForm::Reset => self.submit_reset(),
                }
            }
            if self.auth_busy {
                ui.spinner();
            }
        });

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            match self.account_form {
                AccountForm::SignIn => {
                    if ui.link("Create an account").clicked() {
                        self.account_form = AccountForm::Register;
                        self.auth_error = None;
                    }
                    if ui.link("Forgot password?").clicked() {
                        self.account_form = AccountForm::Reset;
                        self.auth_error = None;
                    }
                }
                AccountForm::Register | AccountForm::Reset => {
                    if ui.link("Back to sign in").clicked() {
                        self.account_form = AccountForm::SignIn;
                        self.auth_error = None;
                    }
                }
            }
        });
    }

    fn show_profile(&mut self, ui: &mut Ui) {
        let email = self
            .session
            .as_ref()
            .map(|session| session.email.clone())
            .unwrap_or_default();
        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("Account").size(20.0).strong());
            ui.label(RichText::new(&email).color(Color32::from_gray(150)));
        });
        ui.add_space(8.0);

        if self.profile.is_some() {
            ui.horizontal(|ui| {
                ui.label("Display name");
                ui.add(TextEdit::singleline(&mut self.profile_name_input).desired_width(200.0));
            });
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!self.profile_busy, egui::Button::new("Save profile"))
                    .clicked()
                {
                    self.submit_profile_save();
                }
                if self.profile_busy {
                    ui.spinner();
                }
            });
        } else {
            ui.label(RichText::new("Loading profile\u{2026}").color(Color32::from_gray(150)));
        }

        ui.add_space(16.0);
        if ui.button("Sign out").clicked() {
            self.sign_out();
            return;
        }

        ui.add_space(24.0);
        ui.separator();
        if self.delete_armed {
            ui.label(
                RichText::new("This removes your alarms, cities and profile permanently.")
                    .color(Color32::from_rgb(255, 124, 124)),
            );
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(
                        !self.profile_busy,
                        egui::Button::new(
                            RichText::new("Really delete everything?")
                                .color(Color32::from_rgb(255, 124, 124))
                                .strong(),
                        )
                        .fill(Color32::from_rgb(51, 20, 24)),
                    )
                    .clicked()
                {
                    self.submit_account_deletion();
                }
                if ui.button("Keep my account").clicked() {
                    self.delete_armed = false;
                }
            });
        } else if ui
            .add(
                egui::Button::new(RichText::new("Delete account").color(Color32::from_rgb(255, 124, 124)))
                    .fill(Color32::from_rgb(34, 16, 18)),
            )
            .clicked()
        {
            self.delete_armed = true;
        }
    }
}

impl eframe::App for FocusDeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Local::now();

        if let Some((_, expires_at)) = &self.status_message
            && Instant::now() >= *expires_at
        {
            self.status_message = None;
        }

        self.drain_events();

        let now_unix = now.timestamp();
        if self.last_tick_unix != Some(now_unix) {
            self.last_tick_unix = Some(now_unix);
            self.tick_second(now);
        }

        TopBottomPanel::top("header")
            .resizable(false)
            .show(ctx, |ui| self.show_header(ui, now));

        TopBottomPanel::bottom("tabs")
            .resizable(false)
            .show(ctx, |ui| self.show_tab_bar(ui));

        let backdrop = if self.account_open || self.tab != Tab::Timer {
            ctx.style().visuals.panel_fill
        } else {
            FOCUS_THEMES[self.timer.theme_index.min(FOCUS_THEMES.len() - 1)].backdrop
        };
        egui::CentralPanel::default()
            .frame(
                egui::Frame::default()
                    .fill(backdrop)
                    .inner_margin(egui::Margin::same(12)),
            )
            .show(ctx, |ui| {
                if self.account_open {
                    self.show_account(ui);
                    return;
                }
                match self.tab {
                    Tab::Clock => self.show_clock(ui, now),
                    Tab::Alarm => self.show_alarms(ui, now),
                    Tab::Stopwatch => self.show_stopwatch(ui, now),
                    Tab::Timer => self.show_timer(ui, now),
                }
            });

        // The stopwatch shows centiseconds; everything else is happy
        // with a few repaints per second.
        let wait = if self.stopwatch.is_running() && self.tab == Tab::Stopwatch {
            Duration::from_millis(33)
        } else {
            Duration::from_millis(200)
        };
        ctx.request_repaint_after(wait);
    }
}

fn parse_custom_minutes(input: &str) -> Result<u32, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Enter a number of minutes".to_string());
    }
    let minutes: u32 = trimmed
        .parse()
        .map_err(|_| format!("'{trimmed}' is not a whole number of minutes"))?;
    if !(MIN_CUSTOM_MINUTES..=MAX_CUSTOM_MINUTES).contains(&minutes) {
        return Err(format!(
            "Minutes must be between {MIN_CUSTOM_MINUTES} and {MAX_CUSTOM_MINUTES}"
        ));
    }
    Ok(minutes)
}

fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), String> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err("All fields are required".to_string());
    }
    if password != confirm {
        return Err("Passwords do not match".to_string());
    }
    Ok(())
}

fn selected_days(selection: &[bool; 7]) -> Vec<chrono::Weekday> {
    WEEKDAYS
        .iter()
        .zip(selection)
        .filter_map(|(day, on)| on.then_some(*day))
        .collect()
}

fn title_case(text: &str) -> String {
    text.trim()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Points along the progress arc, clockwise from 12 o'clock.
fn ring_points(center: Pos2, radius: f32, fraction: f32) -> Vec<Pos2> {
    let segments = ((96.0 * fraction).ceil() as usize).max(1);
    (0..=segments)
        .map(|step| {
            let angle = fraction * (step as f32 / segments as f32) * std::f32::consts::TAU
                - std::f32::consts::FRAC_PI_2;
            pos2(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

/// Tip of a clock hand, `degrees` measured clockwise from 12 o'clock.
fn hand_endpoint(center: Pos2, length: f32, degrees: f32) -> Pos2 {
    let radians = (degrees - 90.0).to_radians();
    pos2(
        center.x + length * radians.cos(),
        center.y + length * radians.sin(),
    )
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    #[test]
    fn custom_minutes_parse_and_enforce_bounds() {
        assert_eq!(parse_custom_minutes(" 25 "), Ok(25));
        assert_eq!(parse_custom_minutes("999"), Ok(999));
        assert!(parse_custom_minutes("0").is_err());
        assert!(parse_custom_minutes("1000").is_err());
        assert!(parse_custom_minutes("ten").is_err());
        assert!(parse_custom_minutes("").is_err());
    }

    #[test]
    fn registration_rejects_mismatched_passwords_locally() {
        assert_eq!(
            validate_registration("Sam", "sam@example.com", "secret1", "secret2"),
            Err("Passwords do not match".to_string())
        );
        assert_eq!(
            validate_registration("", "sam@example.com", "secret1", "secret1"),
            Err("All fields are required".to_string())
        );
        assert_eq!(
            validate_registration("Sam", "sam@example.com", "secret1", "secret1"),
            Ok(())
        );
    }

    #[test]
    fn day_selection_maps_positionally() {
        let mut selection = [false; 7];
        selection[0] = true;
        selection[2] = true;
        selection[6] = true;
        assert_eq!(
            selected_days(&selection),
            vec![Weekday::Mon, Weekday::Wed, Weekday::Sun]
        );
        assert!(selected_days(&[false; 7]).is_empty());
    }

    #[test]
    fn title_case_normalizes_city_names() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("  TOKYO "), "Tokyo");
        assert_eq!(title_case("san FRANCISCO"), "San Francisco");
    }

    #[test]
    fn ring_starts_at_twelve_and_stays_on_radius() {
        let center = pos2(100.0, 100.0);
        let points = ring_points(center, 50.0, 0.75);
        let first = points[0];
        assert!((first.x - 100.0).abs() < 0.001);
        assert!((first.y - 50.0).abs() < 0.001);
        for point in &points {
            let distance = ((point.x - center.x).powi(2) + (point.y - center.y).powi(2)).sqrt();
            assert!((distance - 50.0).abs() < 0.01);
        }
    }

    #[test]
    fn hand_endpoints_follow_clock_geometry() {
        let center = pos2(0.0, 0.0);
        let up = hand_endpoint(center, 10.0, 0.0);
        assert!(up.x.abs() < 0.001 && (up.y + 10.0).abs() < 0.001);
        let right = hand_endpoint(center, 10.0, 90.0);
        assert!((right.x - 10.0).abs() < 0.001 && right.y.abs() < 0.001);
        let down = hand_endpoint(center, 10.0, 180.0);
        assert!(down.x.abs() < 0.001 && (down.y - 10.0).abs() < 0.001);
    }
}
