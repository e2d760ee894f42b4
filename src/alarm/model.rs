use anyhow::{Result, bail};
use chrono::{NaiveTime, Weekday};
use serde_json::{Map, Value};

/// A scheduled alarm as the user sees it: a wall-clock minute plus a
/// day rule. `id` is the owning document id when the list is backed by
/// the remote store, or a locally generated id while signed out.
#[derive(Debug, Clone, PartialEq)]
pub struct Alarm {
    pub id: String,
    pub time: NaiveTime,
    pub label: String,
    pub active: bool,
    pub days: DayRule,
    pub sound: String,
}

/// Which weekdays an alarm covers. The wire form is a list of day
/// tokens, with two whole-list sentinels: `["Every day"]` fires every
/// day, `["Once"]` fires on any day and then deactivates itself.
#[derive(Debug, Clone, PartialEq)]
pub enum DayRule {
    EveryDay,
    Once,
    Days(Vec<Weekday>),
}

impl DayRule {
    pub fn covers(&self, weekday: Weekday) -> bool {
        match self {
            DayRule::EveryDay | DayRule::Once => true,
            DayRule::Days(days) => days.contains(&weekday),
        }
    }

    /// Builds the rule the way the add form does: all seven days means
    /// "Every day", no days means "Once".
    pub fn from_selection(selected: &[Weekday]) -> DayRule {
        if selected.len() == 7 {
            DayRule::EveryDay
        } else if selected.is_empty() {
            DayRule::Once
        } else {
            DayRule::Days(selected.to_vec())
        }
    }

    pub fn parse_tokens(tokens: &[String]) -> Result<DayRule> {
        if tokens.len() == 1 {
            match tokens[0].as_str() {
                EVERY_DAY_TOKEN => return Ok(DayRule::EveryDay),
                ONCE_TOKEN => return Ok(DayRule::Once),
                _ => {}
            }
        }
        if tokens.is_empty() {
            return Ok(DayRule::Once);
        }
        let mut days = Vec::with_capacity(tokens.len());
        for token in tokens {
            days.push(parse_weekday_token(token)?);
        }
        Ok(DayRule::Days(days))
    }

    pub fn tokens(&self) -> Vec<String> {
        match self {
            DayRule::EveryDay => vec![EVERY_DAY_TOKEN.to_string()],
            DayRule::Once => vec![ONCE_TOKEN.to_string()],
            DayRule::Days(days) => days
                .iter()
                .map(|day| weekday_token(*day).to_string())
                .collect(),
        }
    }

    /// Row summary, e.g. "Mon, Wed, Fri".
    pub fn summary(&self) -> String {
        self.tokens().join(", ")
    }
}

pub const EVERY_DAY_TOKEN: &str = "Every day";
pub const ONCE_TOKEN: &str = "Once";

pub struct SoundOption {
    pub id: &'static str,
    pub name: &'static str,
}

pub const ALARM_SOUNDS: [SoundOption; 4] = [
    SoundOption {
        id: "minimal",
        name: "Minimal Pulse",
    },
    SoundOption {
        id: "birds",
        name: "Morning Birds",
    },
    SoundOption {
        id: "zen",
        name: "Zen Bowl",
    },
    SoundOption {
        id: "digital",
        name: "Digital Wake",
    },
];

pub fn sound_name(sound_id: &str) -> &str {
    ALARM_SOUNDS
        .iter()
        .find(|sound| sound.id == sound_id)
        .map(|sound| sound.name)
        .unwrap_or(sound_id)
}

impl Alarm {
    /// Parses one store document into an alarm; the document id comes
    /// from the enclosing store entry.
    pub fn from_document(id: &str, doc: &Value) -> Result<Alarm> {
        let Some(obj) = doc.as_object() else {
            bail!("alarm document '{id}' is not a JSON object");
        };
        let time_text = obj
            .get("time")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("alarm document '{id}' is missing 'time'"))?;
        let time = parse_alarm_time(time_text)?;
        let label = obj
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or("Alarm")
            .to_string();
        let active = obj.get("active").and_then(Value::as_bool).unwrap_or(true);
        let tokens = match obj.get("days") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        anyhow::anyhow!("alarm document '{id}' has a non-string day entry")
                    })
                })
                .collect::<Result<Vec<String>>>()?,
            Some(_) => bail!("alarm document '{id}' has a non-list 'days' field"),
            None => Vec::new(),
        };
        let days = DayRule::parse_tokens(&tokens)?;
        let sound = obj
            .get("sound")
            .and_then(Value::as_str)
            .unwrap_or("minimal")
            .to_string();
        Ok(Alarm {
            id: id.to_string(),
            time,
            label,
            active,
            days,
            sound,
        })
    }

    /// Document body for the store; the id lives outside the body.
    pub fn to_document(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(
            "time".to_string(),
            Value::String(format_alarm_time(self.time)),
        );
        obj.insert("label".to_string(), Value::String(self.label.clone()));
        obj.insert("active".to_string(), Value::Bool(self.active));
        obj.insert(
            "days".to_string(),
            Value::Array(self.days.tokens().into_iter().map(Value::String).collect()),
        );
        obj.insert("sound".to_string(), Value::String(self.sound.clone()));
        Value::Object(obj)
    }
}

pub fn parse_alarm_time(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input.trim(), "%H:%M:%S"))
        .map_err(|_| anyhow::anyhow!("invalid time '{input}', expected HH:MM (24h)"))
}

pub fn format_alarm_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Keeps the list in time-of-day order, matching how the widget
/// displays it regardless of insertion order.
pub fn sort_alarms(alarms: &mut [Alarm]) {
    alarms.sort_by_key(|alarm| alarm.time);
}

/// The seeded list shown before any sign-in.
pub fn default_alarms() -> Vec<Alarm> {
    vec![
        Alarm {
            id: "seed-wake".to_string(),
            time: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default(),
            label: "Wake up".to_string(),
            active: true,
            days: DayRule::Days(vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ]),
            sound: "birds".to_string(),
        },
        Alarm {
            id: "seed-gym".to_string(),
            time: NaiveTime::from_hms_opt(8, 30, 0).unwrap_or_default(),
            label: "Gym".to_string(),
            active: false,
            days: DayRule::Days(vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]),
            sound: "minimal".to_string(),
        },
    ]
}

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_token(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

fn parse_weekday_token(token: &str) -> Result<Weekday> {
    let day = match token {
        "Mon" => Weekday::Mon,
        "Tue" => Weekday::Tue,
        "Wed" => Weekday::Wed,
        "Thu" => Weekday::Thu,
        "Fri" => Weekday::Fri,
        "Sat" => Weekday::Sat,
        "Sun" => Weekday::Sun,
        other => bail!("unknown day token '{other}'"),
    };
    Ok(day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_alarm_document() {
        let doc = json!({
            "time": "07:00",
            "label": "Wake up",
            "active": true,
            "days": ["Mon", "Tue", "Wed", "Thu", "Fri"],
            "sound": "birds"
        });
        let alarm = Alarm::from_document("abc123", &doc).expect("valid document");
        assert_eq!(alarm.id, "abc123");
        assert_eq!(alarm.time, NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        assert_eq!(alarm.label, "Wake up");
        assert!(alarm.active);
        assert!(alarm.days.covers(Weekday::Wed));
        assert!(!alarm.days.covers(Weekday::Sat));
        assert_eq!(alarm.sound, "birds");
    }

    #[test]
    fn document_round_trip_preserves_sentinels() {
        for days in [DayRule::EveryDay, DayRule::Once] {
            let alarm = Alarm {
                id: "x".to_string(),
                time: NaiveTime::from_hms_opt(6, 45, 0).unwrap(),
                label: "Stretch".to_string(),
                active: true,
                days: days.clone(),
                sound: "zen".to_string(),
            };
            let back =
                Alarm::from_document("x", &alarm.to_document()).expect("round trip");
            assert_eq!(back.days, days);
            assert_eq!(back.time, alarm.time);
        }
    }

    #[test]
    fn selection_maps_to_sentinels() {
        assert_eq!(DayRule::from_selection(&WEEKDAYS), DayRule::EveryDay);
        assert_eq!(DayRule::from_selection(&[]), DayRule::Once);
        assert_eq!(
            DayRule::from_selection(&[Weekday::Sat, Weekday::Sun]),
            DayRule::Days(vec![Weekday::Sat, Weekday::Sun])
        );
    }

    #[test]
    fn sentinel_rules_cover_any_day() {
        assert!(DayRule::EveryDay.covers(Weekday::Sun));
        assert!(DayRule::Once.covers(Weekday::Thu));
    }

    #[test]
    fn rejects_unknown_day_token() {
        let doc = json!({
            "time": "07:00",
            "days": ["Funday"]
        });
        let err = Alarm::from_document("bad", &doc).expect_err("unknown token should fail");
        assert!(err.to_string().contains("unknown day token"));
    }

    #[test]
    fn rejects_malformed_time() {
        let doc = json!({ "time": "25:99" });
        let err = Alarm::from_document("bad", &doc).expect_err("bad time should fail");
        assert!(err.to_string().contains("invalid time"));
    }

    #[test]
    fn accepts_unpadded_hour() {
        assert_eq!(
            parse_alarm_time("7:05").expect("unpadded hour"),
            NaiveTime::from_hms_opt(7, 5, 0).unwrap()
        );
    }

    #[test]
    fn sorts_by_time_of_day() {
        let mut alarms = default_alarms();
        alarms.reverse();
        sort_alarms(&mut alarms);
        assert_eq!(alarms[0].label, "Wake up");
        assert_eq!(alarms[1].label, "Gym");
    }

    #[test]
    fn summary_joins_tokens() {
        let rule = DayRule::Days(vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        assert_eq!(rule.summary(), "Mon, Wed, Fri");
        assert_eq!(DayRule::EveryDay.summary(), "Every day");
    }
}
