use anyhow::{Result, bail};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde_json::{Map, Value, json};

/// A pinned city on the world clock card. `offset_hours` is the fixed
/// UTC offset used for display; half-hour zones are real (Mumbai is
/// +5.5), so the value is fractional. `country` and `mood` come back
/// from assisted lookups only; table hits leave them empty.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldLocation {
    pub id: String,
    pub name: String,
    pub offset_hours: f64,
    pub country: Option<String>,
    pub mood: Option<String>,
}

impl WorldLocation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, offset_hours: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            offset_hours,
            country: None,
            mood: None,
        }
    }

    pub fn from_document(id: &str, doc: &Value) -> Result<Self> {
        let Some(fields) = doc.as_object() else {
            bail!("location document '{id}' is not a JSON object");
        };
        let Some(name) = fields.get("name").and_then(Value::as_str) else {
            bail!("location document '{id}' is missing string field 'name'");
        };
        let offset_hours = fields
            .get("offset")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let country = fields
            .get("country")
            .and_then(Value::as_str)
            .map(str::to_string);
        let mood = fields
            .get("mood")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            offset_hours,
            country,
            mood,
        })
    }

    pub fn to_document(&self) -> Value {
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!(self.name));
        fields.insert("offset".to_string(), json!(self.offset_hours));
        if let Some(country) = &self.country {
            fields.insert("country".to_string(), json!(country));
        }
        if let Some(mood) = &self.mood {
            fields.insert("mood".to_string(), json!(mood));
        }
        Value::Object(fields)
    }
}

/// Offline city table. Lookups are case-insensitive on the trimmed
/// name; anything missing here falls through to the assist service.
pub const CITY_OFFSETS: [(&str, f64); 37] = [
    ("london", 0.0),
    ("paris", 1.0),
    ("berlin", 1.0),
    ("rome", 1.0),
    ("madrid", 1.0),
    ("amsterdam", 1.0),
    ("athens", 2.0),
    ("cairo", 2.0),
    ("jerusalem", 2.0),
    ("moscow", 3.0),
    ("dubai", 4.0),
    ("mumbai", 5.5),
    ("delhi", 5.5),
    ("bangkok", 7.0),
    ("jakarta", 7.0),
    ("beijing", 8.0),
    ("singapore", 8.0),
    ("perth", 8.0),
    ("hong kong", 8.0),
    ("tokyo", 9.0),
    ("seoul", 9.0),
    ("sydney", 11.0),
    ("melbourne", 11.0),
    ("auckland", 13.0),
    ("new york", -5.0),
    ("miami", -5.0),
    ("toronto", -5.0),
    ("dc", -5.0),
    ("boston", -5.0),
    ("chicago", -6.0),
    ("mexico city", -6.0),
    ("denver", -7.0),
    ("los angeles", -8.0),
    ("vancouver", -8.0),
    ("san francisco", -8.0),
    ("seattle", -8.0),
    ("honolulu", -10.0),
];

pub fn lookup_city_offset(name: &str) -> Option<f64> {
    let needle = name.trim().to_lowercase();
    CITY_OFFSETS
        .iter()
        .find(|(city, _)| *city == needle)
        .map(|(_, offset)| *offset)
}

pub fn default_locations() -> Vec<WorldLocation> {
    vec![
        WorldLocation::new("1", "Tokyo", 9.0),
        WorldLocation::new("2", "London", 0.0),
        WorldLocation::new("3", "New York", -5.0),
    ]
}

/// Wall time in the target zone, derived by shifting the UTC instant
/// by the stored offset. Fractional hours shift by whole milliseconds.
pub fn shifted_time(now_utc: DateTime<Utc>, offset_hours: f64) -> NaiveDateTime {
    now_utc.naive_utc() + Duration::milliseconds((offset_hours * 3_600_000.0) as i64)
}

pub fn format_shifted_clock(shifted: NaiveDateTime) -> String {
    shifted.format("%H:%M").to_string()
}

pub fn relative_day_label(shifted_date: NaiveDate, viewer_date: NaiveDate) -> &'static str {
    match (shifted_date - viewer_date).num_days() {
        0 => "Today",
        days if days > 0 => "Tomorrow",
        _ => "Yesterday",
    }
}

/// "Same time", "+5hrs", "-1hr". The unit collapses to "hr" only for a
/// gap of exactly one hour; fractional gaps print as-is ("+4.5hrs").
pub fn time_difference_label(offset_hours: f64, viewer_offset_hours: f64) -> String {
    let diff = offset_hours - viewer_offset_hours;
    if diff == 0.0 {
        return "Same time".to_string();
    }
    let magnitude = diff.abs();
    let unit = if magnitude == 1.0 { "hr" } else { "hrs" };
    let sign = if diff > 0.0 { '+' } else { '-' };
    format!("{sign}{magnitude}{unit}")
}

pub fn viewer_offset_hours(now: DateTime<Local>) -> f64 {
    f64::from(now.offset().local_minus_utc()) / 3600.0
}

/// Degrees for the analog face: (second, minute, hour) hands, measured
/// clockwise from 12 o'clock. Minute and hour hands sweep continuously.
pub fn hand_angles(now: DateTime<Local>) -> (f32, f32, f32) {
    let seconds = now.second() as f32;
    let minutes = now.minute() as f32;
    let hours = (now.hour() % 12) as f32;
    let second_deg = seconds / 60.0 * 360.0;
    let minute_deg = (minutes + seconds / 60.0) / 60.0 * 360.0;
    let hour_deg = (hours + minutes / 60.0) / 12.0 * 360.0;
    (second_deg, minute_deg, hour_deg)
}

/// Main readout, 12-hour with a dot separator ("3.05"), plus meridiem.
pub fn format_main_clock(now: DateTime<Local>) -> (String, &'static str) {
    let hour12 = match now.hour() % 12 {
        0 => 12,
        other => other,
    };
    let meridiem = if now.hour() >= 12 { "PM" } else { "AM" };
    (format!("{hour12}.{:02}", now.minute()), meridiem)
}

pub fn format_full_date(now: DateTime<Local>) -> String {
    now.format("%A, %-d %B %Y").to_string()
}
