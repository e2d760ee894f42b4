use chrono::{DateTime, Local};

pub const MIN_CUSTOM_MINUTES: u32 = 1;
pub const MAX_CUSTOM_MINUTES: u32 = 999;

#[derive(Debug, Clone, Copy)]
pub struct TimerPreset {
    pub name: &'static str,
    pub minutes: u32,
}

pub const TIMER_PRESETS: [TimerPreset; 4] = [
    TimerPreset { name: "Work", minutes: 25 },
    TimerPreset { name: "Study", minutes: 50 },
    TimerPreset { name: "Meditation", minutes: 10 },
    TimerPreset { name: "Nap", minutes: 20 },
];

/// Countdown state as persisted between runs. `remaining_seconds` is
/// the value at `saved_at_unix`; a running session keeps counting down
/// on the wall clock while the process is gone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSnapshot {
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub running: bool,
    pub saved_at_unix: i64,
    pub theme_index: usize,
}

/// Focus countdown. Time is never accumulated tick by tick: the struct
/// stores the remaining seconds as of `anchor`, and every read derives
/// the live value from the wall clock, so a suspended or throttled
/// process shows the same countdown as one that ran every frame.
#[derive(Debug, Clone)]
pub struct FocusTimer {
    remaining_at_anchor: u32,
    total_seconds: u32,
    running: bool,
    anchor_unix: Option<i64>,
    pub theme_index: usize,
}

impl FocusTimer {
    pub fn new() -> Self {
        let minutes = TIMER_PRESETS[0].minutes;
        Self {
            remaining_at_anchor: minutes * 60,
            total_seconds: minutes * 60,
            running: false,
            anchor_unix: None,
            theme_index: 0,
        }
    }

    /// Replaces the session with a fresh stopped countdown. Minutes
    /// outside 1..=999 are clamped to the nearest bound.
    pub fn set_duration_minutes(&mut self, minutes: u32) {
        let minutes = minutes.clamp(MIN_CUSTOM_MINUTES, MAX_CUSTOM_MINUTES);
        self.total_seconds = minutes * 60;
        self.remaining_at_anchor = self.total_seconds;
        self.running = false;
        self.anchor_unix = None;
    }

    pub fn start(&mut self, now: DateTime<Local>) {
        if self.running || self.remaining_at_anchor == 0 {
            return;
        }
        self.running = true;
        self.anchor_unix = Some(now.timestamp());
    }

    pub fn pause(&mut self, now: DateTime<Local>) {
        if !self.running {
            return;
        }
        self.remaining_at_anchor = self.current_remaining(now);
        self.running = false;
        self.anchor_unix = None;
    }

    pub fn reset(&mut self) {
        self.remaining_at_anchor = self.total_seconds;
        self.running = false;
        self.anchor_unix = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    pub fn current_remaining(&self, now: DateTime<Local>) -> u32 {
        match (self.running, self.anchor_unix) {
            (true, Some(anchor)) => {
                let elapsed = (now.timestamp() - anchor).max(0);
                let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
                self.remaining_at_anchor.saturating_sub(elapsed)
            }
            _ => self.remaining_at_anchor,
        }
    }

    /// Fraction of the session still ahead, for the progress ring.
    pub fn fraction_remaining(&self, now: DateTime<Local>) -> f32 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        self.current_remaining(now) as f32 / self.total_seconds as f32
    }

    /// Folds the wall clock into the stored state and reports whether
    /// the countdown hit zero on this call. Returns true exactly once
    /// per finished session.
    pub fn sync(&mut self, now: DateTime<Local>) -> bool {
        if !self.running {
            return false;
        }
        let remaining = self.current_remaining(now);
        if remaining > 0 {
            return false;
        }
        self.remaining_at_anchor = 0;
        self.running = false;
        self.anchor_unix = None;
        true
    }

    pub fn snapshot(&self, now: DateTime<Local>) -> TimerSnapshot {
        TimerSnapshot {
            remaining_seconds: self.current_remaining(now),
            total_seconds: self.total_seconds,
            running: self.running,
            saved_at_unix: now.timestamp(),
            theme_index: self.theme_index,
        }
    }

    /// Rebuilds a timer from a persisted snapshot. A session that was
    /// running keeps counting across the downtime: the gap between the
    /// save and `now` is subtracted, and a countdown that ran out while
    /// the process was away comes back stopped at zero.
    pub fn restore(snapshot: TimerSnapshot, now: DateTime<Local>, theme_count: usize) -> Self {
        let remaining = if snapshot.running {
            let elapsed = (now.timestamp() - snapshot.saved_at_unix).max(0);
            let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
            snapshot.remaining_seconds.saturating_sub(elapsed)
        } else {
            snapshot.remaining_seconds
        };
        let running = snapshot.running && remaining > 0;
        Self {
            remaining_at_anchor: remaining,
            total_seconds: snapshot.total_seconds.max(1),
            running,
            anchor_unix: running.then(|| now.timestamp()),
            theme_index: snapshot.theme_index.min(theme_count.saturating_sub(1)),
        }
    }
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// "MM:SS" with zero padding; minutes widen past two digits for long
/// sessions (999 minutes renders as "999:00").
pub fn format_remaining(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 3, 2, hour, minute, second)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn countdown_follows_wall_clock() {
        let mut timer = FocusTimer::new();
        timer.set_duration_minutes(25);
        timer.start(at(9, 0, 0));
        assert_eq!(timer.current_remaining(at(9, 0, 10)), 25 * 60 - 10);
        assert_eq!(timer.current_remaining(at(9, 25, 0)), 0);
    }

    #[test]
    fn pause_freezes_remaining() {
        let mut timer = FocusTimer::new();
        timer.set_duration_minutes(10);
        timer.start(at(9, 0, 0));
        timer.pause(at(9, 0, 10));
        assert_eq!(timer.current_remaining(at(9, 30, 0)), 10 * 60 - 10);
        assert!(!timer.is_running());
    }

    #[test]
    fn finish_reports_exactly_once() {
        let mut timer = FocusTimer::new();
        timer.set_duration_minutes(1);
        timer.start(at(9, 0, 0));
        assert!(!timer.sync(at(9, 0, 30)));
        assert!(timer.sync(at(9, 1, 0)));
        assert!(!timer.sync(at(9, 1, 1)));
        assert!(!timer.is_running());
        assert_eq!(timer.current_remaining(at(9, 2, 0)), 0);
    }

    #[test]
    fn custom_duration_clamps_to_bounds() {
        let mut timer = FocusTimer::new();
        timer.set_duration_minutes(0);
        assert_eq!(timer.total_seconds(), 60);
        timer.set_duration_minutes(5000);
        assert_eq!(timer.total_seconds(), 999 * 60);
    }

    #[test]
    fn running_snapshot_resumes_with_gap_subtracted() {
        let mut timer = FocusTimer::new();
        timer.set_duration_minutes(2);
        timer.start(at(9, 0, 0));
        let snapshot = timer.snapshot(at(9, 0, 20));
        assert_eq!(snapshot.remaining_seconds, 100);
        assert!(snapshot.running);

        let resumed = FocusTimer::restore(snapshot, at(9, 0, 50), 15);
        assert_eq!(resumed.current_remaining(at(9, 0, 50)), 70);
        assert!(resumed.is_running());
    }

    #[test]
    fn expired_snapshot_comes_back_stopped_at_zero() {
        let snapshot = TimerSnapshot {
            remaining_seconds: 100,
            total_seconds: 120,
            running: true,
            saved_at_unix: at(9, 0, 0).timestamp(),
            theme_index: 3,
        };
        let resumed = FocusTimer::restore(snapshot, at(9, 2, 30), 15);
        assert_eq!(resumed.current_remaining(at(9, 2, 30)), 0);
        assert!(!resumed.is_running());
    }

    #[test]
    fn paused_snapshot_ignores_downtime() {
        let snapshot = TimerSnapshot {
            remaining_seconds: 100,
            total_seconds: 120,
            running: false,
            saved_at_unix: at(9, 0, 0).timestamp(),
            theme_index: 0,
        };
        let resumed = FocusTimer::restore(snapshot, at(18, 0, 0), 15);
        assert_eq!(resumed.current_remaining(at(18, 0, 0)), 100);
        assert!(!resumed.is_running());
    }

    #[test]
    fn theme_index_clamps_to_catalog() {
        let snapshot = TimerSnapshot {
            remaining_seconds: 60,
            total_seconds: 60,
            running: false,
            saved_at_unix: at(9, 0, 0).timestamp(),
            theme_index: 40,
        };
        let resumed = FocusTimer::restore(snapshot, at(9, 0, 0), 15);
        assert_eq!(resumed.theme_index, 14);
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(65), "01:05");
        assert_eq!(format_remaining(25 * 60), "25:00");
        assert_eq!(format_remaining(999 * 60), "999:00");
    }
}
