use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::alarm::model::{Alarm, DayRule};

/// What one poll produced: the alarms that fired this minute and the
/// ids of "Once" alarms that deactivated themselves by firing (the
/// caller mirrors those writes to the store when one is attached).
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub fired: Vec<FiredAlarm>,
    pub deactivated: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FiredAlarm {
    pub id: String,
    pub label: String,
    pub sound: String,
}

/// Once-per-second poll over the alarm list. The guard remembers the
/// last wall-clock minute that produced a firing so a matching minute
/// fires exactly once no matter how many ticks land inside it. A
/// minute the process sleeps through is simply missed; there is no
/// catch-up pass.
#[derive(Debug, Default)]
pub struct AlarmMatcher {
    last_fired_minute: Option<(NaiveDate, u32, u32)>,
}

impl AlarmMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, now: NaiveDateTime, alarms: &mut [Alarm]) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();
        let minute_key = (now.date(), now.hour(), now.minute());
        if self.last_fired_minute == Some(minute_key) {
            return outcome;
        }

        let weekday = now.weekday();
        for alarm in alarms.iter_mut() {
            if !alarm.active {
                continue;
            }
            if alarm.time.hour() != now.hour() || alarm.time.minute() != now.minute() {
                continue;
            }
            if !alarm.days.covers(weekday) {
                continue;
            }

            outcome.fired.push(FiredAlarm {
                id: alarm.id.clone(),
                label: alarm.label.clone(),
                sound: alarm.sound.clone(),
            });
            if alarm.days == DayRule::Once {
                alarm.active = false;
                outcome.deactivated.push(alarm.id.clone());
            }
        }

        if !outcome.fired.is_empty() {
            self.last_fired_minute = Some(minute_key);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, TimeZone, Weekday};
    use chrono_tz::America::New_York;

    use super::*;
    use crate::alarm::model::{Alarm, DayRule};

    fn alarm_at(id: &str, hour: u32, minute: u32, days: DayRule) -> Alarm {
        Alarm {
            id: id.to_string(),
            time: NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time"),
            label: id.to_string(),
            active: true,
            days,
            sound: "minimal".to_string(),
        }
    }

    fn monday_at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .expect("valid date")
            .and_hms_opt(hour, minute, second)
            .expect("valid time")
    }

    #[test]
    fn fires_once_per_matching_minute_not_per_tick() {
        let mut matcher = AlarmMatcher::new();
        let mut alarms = vec![alarm_at("wake", 7, 0, DayRule::EveryDay)];

        let mut fired_total = 0;
        for second in 0..60 {
            fired_total += matcher
                .tick(monday_at(7, 0, second), &mut alarms)
                .fired
                .len();
        }
        assert_eq!(fired_total, 1);

        let next_minute = matcher.tick(monday_at(7, 1, 0), &mut alarms);
        assert!(next_minute.fired.is_empty());
    }

    #[test]
    fn once_alarm_deactivates_and_recurring_does_not() {
        let mut matcher = AlarmMatcher::new();
        let mut alarms = vec![
            alarm_at("single", 7, 0, DayRule::Once),
            alarm_at("daily", 7, 0, DayRule::EveryDay),
        ];

        let outcome = matcher.tick(monday_at(7, 0, 3), &mut alarms);
        assert_eq!(outcome.fired.len(), 2);
        assert_eq!(outcome.deactivated, vec!["single".to_string()]);
        assert!(!alarms[0].active);
        assert!(alarms[1].active);
    }

    #[test]
    fn inactive_alarm_never_fires() {
        let mut matcher = AlarmMatcher::new();
        let mut alarms = vec![alarm_at("off", 7, 0, DayRule::EveryDay)];
        alarms[0].active = false;

        let outcome = matcher.tick(monday_at(7, 0, 0), &mut alarms);
        assert!(outcome.fired.is_empty());
    }

    #[test]
    fn weekday_rule_gates_firing() {
        let mut matcher = AlarmMatcher::new();
        let mut alarms = vec![alarm_at("mondays", 7, 0, DayRule::Days(vec![Weekday::Mon]))];

        let tuesday = NaiveDate::from_ymd_opt(2026, 1, 6)
            .expect("valid date")
            .and_hms_opt(7, 0, 0)
            .expect("valid time");
        assert!(matcher.tick(tuesday, &mut alarms).fired.is_empty());

        let monday = matcher.tick(monday_at(7, 0, 0), &mut alarms);
        assert_eq!(monday.fired.len(), 1);
    }

    #[test]
    fn distinct_minutes_fire_independently() {
        let mut matcher = AlarmMatcher::new();
        let mut alarms = vec![
            alarm_at("first", 7, 0, DayRule::EveryDay),
            alarm_at("second", 7, 1, DayRule::EveryDay),
        ];

        assert_eq!(matcher.tick(monday_at(7, 0, 10), &mut alarms).fired.len(), 1);
        assert_eq!(matcher.tick(monday_at(7, 1, 10), &mut alarms).fired.len(), 1);
    }

    #[test]
    fn quiet_minutes_leave_the_guard_untouched() {
        let mut matcher = AlarmMatcher::new();
        let mut alarms = vec![alarm_at("wake", 7, 0, DayRule::EveryDay)];

        assert!(matcher.tick(monday_at(6, 59, 59), &mut alarms).fired.is_empty());
        assert_eq!(matcher.tick(monday_at(7, 0, 0), &mut alarms).fired.len(), 1);
    }

    #[test]
    fn dst_fold_replays_the_minute_but_stays_deduped() {
        // America/New_York 2026-11-01: 01:30 occurs twice. Both passes
        // share a wall-clock minute, so the guard allows one firing.
        let (first, second) = match New_York.with_ymd_and_hms(2026, 11, 1, 1, 30, 0) {
            chrono::LocalResult::Ambiguous(a, b) => (a, b),
            _ => panic!("expected ambiguous local time"),
        };
        assert_eq!(first.naive_local(), second.naive_local());

        let mut matcher = AlarmMatcher::new();
        let mut alarms = vec![alarm_at("fold", 1, 30, DayRule::EveryDay)];

        assert_eq!(
            matcher.tick(first.naive_local(), &mut alarms).fired.len(),
            1
        );
        assert!(
            matcher
                .tick(second.naive_local(), &mut alarms)
                .fired
                .is_empty()
        );
    }
}
