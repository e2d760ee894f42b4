use std::time::Duration;

use serde_json::{Value, json};
use thiserror::Error;

pub const ENV_ASSIST_KEY: &str = "FOCUSDECK_ASSIST_KEY";
pub const ENV_ASSIST_URL: &str = "FOCUSDECK_ASSIST_URL";
pub const ENV_ASSIST_MODEL: &str = "FOCUSDECK_ASSIST_MODEL";

const DEFAULT_ASSIST_URL: &str = "https://api.openai.com/v1";
const DEFAULT_ASSIST_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const MAX_COMPLETION_TOKENS: u32 = 120;

/// Shown while a generated line is in flight and kept when the assist
/// service is unconfigured or fails.
pub const FALLBACK_MOTIVATION: &str = "Deep breath. One thing at a time.";

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("assist request failed: {0}")]
    Request(String),

    #[error("assist service returned status {status}")]
    Response { status: u16, body: String },

    #[error("assist response parse failed: {0}")]
    Parse(String),

    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

#[derive(Debug, Clone)]
pub struct AssistConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl AssistConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(ENV_ASSIST_KEY).ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            std::env::var(ENV_ASSIST_URL).unwrap_or_else(|_| DEFAULT_ASSIST_URL.to_string());
        let model =
            std::env::var(ENV_ASSIST_MODEL).unwrap_or_else(|_| DEFAULT_ASSIST_MODEL.to_string());
        Some(Self {
            api_key,
            base_url,
            model,
        })
    }
}

/// City metadata resolved by the assist service for queries the
/// built-in table does not know.
#[derive(Debug, Clone, PartialEq)]
pub struct CityInfo {
    pub city: String,
    pub country: String,
    pub offset_hours: f64,
    pub mood: String,
}

/// Chat-completions client used for the two text features: a one-line
/// motivational message per theme and free-text city lookup.
#[derive(Clone)]
pub struct AssistClient {
    http: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AssistClient {
    pub fn new(config: &AssistConfig) -> Result<Self, AssistError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|err| AssistError::ClientBuild(err.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn motivation_line(&self, theme_name: &str) -> Result<String, AssistError> {
        let prompt = format!(
            "Write one short motivational sentence (under 12 words) for someone \
             starting a '{theme_name}' focus session. Reply with the sentence only."
        );
        let completion = self.chat(&prompt)?;
        let line = first_clean_line(&completion);
        if line.is_empty() {
            return Err(AssistError::Parse("empty completion".to_string()));
        }
        Ok(line)
    }

    pub fn city_lookup(&self, query: &str) -> Result<CityInfo, AssistError> {
        let prompt = format!(
            "For the city query '{query}', reply with strict JSON \
             {{\"city\": string, \"country\": string, \"offset\": number \
             (UTC offset in hours, may be fractional), \"mood\": string \
             (a two-word vibe)}} and nothing else."
        );
        let completion = self.chat(&prompt)?;
        parse_city_info(&completion)
    }

    fn chat(&self, user_prompt: &str) -> Result<String, AssistError> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_COMPLETION_TOKENS,
            "messages": [{ "role": "user", "content": user_prompt }],
        });
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|err| AssistError::Request(err.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|err| AssistError::Request(err.to_string()))?;
        if status != 200 {
            return Err(AssistError::Response { status, body: text });
        }
        parse_completion_text(&text)
    }
}

pub(crate) fn parse_completion_text(text: &str) -> Result<String, AssistError> {
    let root: Value =
        serde_json::from_str(text).map_err(|err| AssistError::Parse(err.to_string()))?;
    let Some(content) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
    else {
        return Err(AssistError::Parse(
            "missing choices[0].message.content".to_string(),
        ));
    };
    Ok(content.to_string())
}

/// Models habitually wrap JSON replies in Markdown code fences; peel
/// the outer fence (and its language tag, if any) before parsing.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

pub(crate) fn parse_city_info(completion: &str) -> Result<CityInfo, AssistError> {
    let cleaned = strip_code_fences(completion);
    let root: Value =
        serde_json::from_str(cleaned).map_err(|err| AssistError::Parse(err.to_string()))?;
    let Some(city) = root.get("city").and_then(Value::as_str) else {
        return Err(AssistError::Parse("missing city".to_string()));
    };
    let Some(offset_hours) = root.get("offset").and_then(Value::as_f64) else {
        return Err(AssistError::Parse("missing offset".to_string()));
    };
    if !(-12.0..=14.0).contains(&offset_hours) {
        return Err(AssistError::Parse(format!(
            "offset {offset_hours} outside -12..=14"
        )));
    }
    Ok(CityInfo {
        city: city.to_string(),
        country: root
            .get("country")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        offset_hours,
        mood: root
            .get("mood")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

fn first_clean_line(completion: &str) -> String {
    strip_code_fences(completion)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('"')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_the_completion_content() {
        let text = json!({
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "Eyes forward." },
                "finish_reason": "stop"
            }]
        })
        .to_string();
        assert_eq!(
            parse_completion_text(&text).expect("completion parses"),
            "Eyes forward."
        );
    }

    #[test]
    fn missing_choices_is_a_parse_error() {
        let text = json!({ "model": "gpt-4o-mini", "choices": [] }).to_string();
        assert!(parse_completion_text(&text).is_err());
    }

    #[test]
    fn strips_fences_with_and_without_language_tags() {
        assert_eq!(strip_code_fences("plain text"), "plain text");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  ```json\n{}\n```  "), "{}");
    }

    #[test]
    fn parses_city_replies_including_fenced_ones() {
        let reply = r#"{"city": "Reykjavik", "country": "Iceland", "offset": 0, "mood": "glacial quiet"}"#;
        let info = parse_city_info(reply).expect("city parses");
        assert_eq!(info.city, "Reykjavik");
        assert_eq!(info.offset_hours, 0.0);
        assert_eq!(info.mood, "glacial quiet");

        let fenced = "```json\n{\"city\": \"Kathmandu\", \"country\": \"Nepal\", \"offset\": 5.75, \"mood\": \"thin air\"}\n```";
        let info = parse_city_info(fenced).expect("fenced city parses");
        assert_eq!(info.offset_hours, 5.75);
    }

    #[test]
    fn rejects_out_of_range_or_missing_offsets() {
        let err = parse_city_info(r#"{"city": "Nowhere", "offset": 99}"#)
            .expect_err("offset out of range");
        assert!(err.to_string().contains("parse failed"));

        let err = parse_city_info(r#"{"city": "Nowhere"}"#).expect_err("offset missing");
        assert!(err.to_string().contains("parse failed"));
    }

    #[test]
    fn motivation_lines_are_trimmed_to_one_line() {
        assert_eq!(first_clean_line("\"Keep going.\"\nSecond line"), "Keep going.");
        assert_eq!(first_clean_line("```\nSteady on.\n```"), "Steady on.");
        assert_eq!(first_clean_line("   "), "");
    }
}
