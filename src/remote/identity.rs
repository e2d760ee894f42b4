use std::time::Duration;

use serde_json::{Value, json};
use thiserror::Error;

use super::RemoteConfig;

const REQUEST_TIMEOUT_SECS: u64 = 15;
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The HTTP request never completed.
    #[error("identity request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("identity service returned status {status}")]
    Response { status: u16, body: String },

    /// The response body could not be interpreted.
    #[error("identity response parse failed: {0}")]
    Parse(String),

    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

/// A signed-in user. The id token authorizes store requests and
/// account operations until it expires or the user signs out.
#[derive(Debug, Clone)]
pub struct Session {
    pub uid: String,
    pub id_token: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct AccountInfo {
    pub email_verified: bool,
    pub display_name: String,
}

/// Client for the identity-toolkit style REST endpoints. Every call is
/// a POST keyed by the API key in the query string; the id token, when
/// needed, travels in the body.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
}

impl IdentityClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, IdentityError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|err| IdentityError::ClientBuild(err.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.identity_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        let text = self.post("accounts:signInWithPassword", &body)?;
        parse_session(&text)
    }

    pub fn sign_up(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        let text = self.post("accounts:signUp", &body)?;
        parse_session(&text)
    }

    pub fn lookup(&self, id_token: &str) -> Result<AccountInfo, IdentityError> {
        let body = json!({ "idToken": id_token });
        let text = self.post("accounts:lookup", &body)?;
        parse_account_info(&text)
    }

    pub fn send_verification_email(&self, id_token: &str) -> Result<(), IdentityError> {
        let body = json!({ "requestType": "VERIFY_EMAIL", "idToken": id_token });
        self.post("accounts:sendOobCode", &body).map(|_| ())
    }

    pub fn send_reset_email(&self, email: &str) -> Result<(), IdentityError> {
        let body = json!({ "requestType": "PASSWORD_RESET", "email": email });
        self.post("accounts:sendOobCode", &body).map(|_| ())
    }

    pub fn update_display_name(
        &self,
        id_token: &str,
        display_name: &str,
    ) -> Result<(), IdentityError> {
        let body = json!({
            "idToken": id_token,
            "displayName": display_name,
            "returnSecureToken": false,
        });
        self.post("accounts:update", &body).map(|_| ())
    }

    pub fn delete_account(&self, id_token: &str) -> Result<(), IdentityError> {
        let body = json!({ "idToken": id_token });
        self.post("accounts:delete", &body).map(|_| ())
    }

    fn post(&self, endpoint: &str, body: &Value) -> Result<String, IdentityError> {
        let url = format!("{}/{}?key={}", self.base_url, endpoint, self.api_key);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .map_err(|err| IdentityError::Request(err.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|err| IdentityError::Request(err.to_string()))?;
        if status != 200 {
            return Err(IdentityError::Response { status, body: text });
        }
        Ok(text)
    }
}

pub(crate) fn parse_session(text: &str) -> Result<Session, IdentityError> {
    let root: Value =
        serde_json::from_str(text).map_err(|err| IdentityError::Parse(err.to_string()))?;
    let Some(uid) = root.get("localId").and_then(Value::as_str) else {
        return Err(IdentityError::Parse("missing localId".to_string()));
    };
    let Some(id_token) = root.get("idToken").and_then(Value::as_str) else {
        return Err(IdentityError::Parse("missing idToken".to_string()));
    };
    let email = root
        .get("email")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Ok(Session {
        uid: uid.to_string(),
        id_token: id_token.to_string(),
        email: email.to_string(),
    })
}

pub(crate) fn parse_account_info(text: &str) -> Result<AccountInfo, IdentityError> {
    let root: Value =
        serde_json::from_str(text).map_err(|err| IdentityError::Parse(err.to_string()))?;
    let Some(user) = root
        .get("users")
        .and_then(Value::as_array)
        .and_then(|users| users.first())
    else {
        return Err(IdentityError::Parse("missing users[0]".to_string()));
    };
    Ok(AccountInfo {
        email_verified: user
            .get("emailVerified")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        display_name: user
            .get("displayName")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// API error code from a failed call, e.g. "EMAIL_EXISTS". Some codes
/// arrive with a trailing explanation ("WEAK_PASSWORD : Password
/// should be at least 6 characters"); only the first token counts.
pub fn error_code(err: &IdentityError) -> Option<String> {
    let IdentityError::Response { body, .. } = err else {
        return None;
    };
    let root: Value = serde_json::from_str(body).ok()?;
    let message = root.get("error")?.get("message")?.as_str()?;
    message.split_whitespace().next().map(str::to_string)
}

pub fn sign_in_message(err: &IdentityError) -> String {
    match error_code(err).as_deref() {
        Some(
            "INVALID_LOGIN_CREDENTIALS" | "EMAIL_NOT_FOUND" | "INVALID_PASSWORD"
            | "INVALID_EMAIL",
        ) => "Password or Email Incorrect".to_string(),
        _ => "Login failed. Check connection.".to_string(),
    }
}

pub fn sign_up_message(err: &IdentityError) -> String {
    match error_code(err).as_deref() {
        Some("EMAIL_EXISTS") => "User already exists. Sign in?",
        Some("WEAK_PASSWORD") => "Password too weak",
        Some("INVALID_EMAIL") => "Invalid email format",
        _ => "Registration error. Try again.",
    }
    .to_string()
}

pub fn reset_message(err: &IdentityError) -> String {
    match error_code(err).as_deref() {
        Some("EMAIL_NOT_FOUND") => "No account found with this email",
        Some("INVALID_EMAIL") => "Invalid email format",
        _ => "Reset failed. Try again.",
    }
    .to_string()
}

pub fn delete_message(err: &IdentityError) -> String {
    match error_code(err).as_deref() {
        Some("CREDENTIAL_TOO_OLD_LOGIN_AGAIN") => {
            "Please log out and sign back in to delete your account for security.".to_string()
        }
        _ => "Account deletion failed. Try again.".to_string(),
    }
}
