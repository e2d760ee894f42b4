use chrono::{DateTime, Local};

/// One recorded lap, newest stored first. `delta_ms` is the gap to the
/// lap recorded before it; for the first lap it equals the cumulative
/// time.
#[derive(Debug, Clone, PartialEq)]
pub struct LapTime {
    pub sequence: usize,
    pub cumulative_ms: u64,
    pub delta_ms: u64,
}

/// Count-up watch with lap capture. Like the countdown it anchors on
/// the wall clock instead of accumulating frame ticks, so elapsed time
/// stays honest when the UI thread stalls.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    accumulated_ms: u64,
    resume_anchor: Option<DateTime<Local>>,
    laps: Vec<LapTime>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.resume_anchor.is_some()
    }

    pub fn start(&mut self, now: DateTime<Local>) {
        if self.resume_anchor.is_none() {
            self.resume_anchor = Some(now);
        }
    }

    pub fn pause(&mut self, now: DateTime<Local>) {
        if let Some(anchor) = self.resume_anchor.take() {
            self.accumulated_ms += span_ms(anchor, now);
        }
    }

    pub fn elapsed_ms(&self, now: DateTime<Local>) -> u64 {
        match self.resume_anchor {
            Some(anchor) => self.accumulated_ms + span_ms(anchor, now),
            None => self.accumulated_ms,
        }
    }

    /// Captures a lap at `now`. Ignored while stopped.
    pub fn lap(&mut self, now: DateTime<Local>) {
        if self.resume_anchor.is_none() {
            return;
        }
        let cumulative_ms = self.elapsed_ms(now);
        let delta_ms = match self.laps.first() {
            Some(previous) => cumulative_ms.saturating_sub(previous.cumulative_ms),
            None => cumulative_ms,
        };
        self.laps.insert(
            0,
            LapTime {
                sequence: self.laps.len() + 1,
                cumulative_ms,
                delta_ms,
            },
        );
    }

    /// Clears time and laps. Only honored while stopped; a running
    /// watch must be paused first.
    pub fn reset(&mut self) {
        if self.resume_anchor.is_some() {
            return;
        }
        self.accumulated_ms = 0;
        self.laps.clear();
    }

    pub fn laps(&self) -> &[LapTime] {
        &self.laps
    }
}

fn span_ms(from: DateTime<Local>, to: DateTime<Local>) -> u64 {
    u64::try_from((to - from).num_milliseconds()).unwrap_or(0)
}

/// "MM:SS.CC" (centiseconds); minutes widen past two digits as needed.
pub fn format_elapsed(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1_000) % 60;
    let centis = (ms % 1_000) / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 3, 2, hour, minute, second)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn accumulates_across_pause_and_resume() {
        let mut watch = Stopwatch::new();
        watch.start(at(9, 0, 0));
        watch.pause(at(9, 0, 10));
        assert_eq!(watch.elapsed_ms(at(9, 3, 0)), 10_000);

        watch.start(at(9, 5, 0));
        let later = at(9, 5, 2) + Duration::milliseconds(500);
        assert_eq!(watch.elapsed_ms(later), 12_500);
    }

    #[test]
    fn laps_record_cumulative_and_split_deltas() {
        let mut watch = Stopwatch::new();
        watch.start(at(9, 0, 0));
        watch.lap(at(9, 0, 5));
        watch.lap(at(9, 0, 12));
        watch.lap(at(9, 0, 20));

        let laps = watch.laps();
        assert_eq!(laps.len(), 3);
        assert_eq!((laps[0].sequence, laps[0].cumulative_ms, laps[0].delta_ms), (3, 20_000, 8_000));
        assert_eq!((laps[1].sequence, laps[1].cumulative_ms, laps[1].delta_ms), (2, 12_000, 7_000));
        assert_eq!((laps[2].sequence, laps[2].cumulative_ms, laps[2].delta_ms), (1, 5_000, 5_000));
    }

    #[test]
    fn lap_is_ignored_while_stopped() {
        let mut watch = Stopwatch::new();
        watch.lap(at(9, 0, 0));
        assert!(watch.laps().is_empty());
    }

    #[test]
    fn reset_only_applies_when_stopped() {
        let mut watch = Stopwatch::new();
        watch.start(at(9, 0, 0));
        watch.lap(at(9, 0, 5));
        watch.reset();
        assert_eq!(watch.laps().len(), 1);
        assert!(watch.is_running());

        watch.pause(at(9, 0, 10));
        watch.reset();
        assert!(watch.laps().is_empty());
        assert_eq!(watch.elapsed_ms(at(9, 0, 10)), 0);
    }

    #[test]
    fn formats_minutes_seconds_centis() {
        assert_eq!(format_elapsed(0), "00:00.00");
        assert_eq!(format_elapsed(65_430), "01:05.43");
        assert_eq!(format_elapsed(600_000), "10:00.00");
        assert_eq!(format_elapsed(125 * 60_000 + 90), "125:00.09");
    }
}
