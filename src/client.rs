//! Hosted backend HTTP client: `auth/v1` for sessions, `rest/v1` for tables.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::auth::{AuthBackend, AuthEvent, AuthEvents, Principal, Session, SignUp};
use crate::config::BackendConfig;
use crate::db::{Backend, Query, Table};
use crate::error::{AppError, Result};

/// Backend client.
///
/// Every request carries the project `apikey`; table requests are authorized
/// with the signed-in access token (or the anon key when signed out), so the
/// backend's row-level rules see the acting principal.
pub struct BackendClient {
    client: Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    events: AuthEvents,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: uuid::Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// Sign-up answers with a full session when email confirmation is off,
/// otherwise with the bare user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

impl From<AuthUser> for Principal {
    fn from(user: AuthUser) -> Self {
        Principal {
            id: user.id,
            email: user.email,
        }
    }
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = match (self.expires_at, self.expires_in) {
            (Some(at), _) => DateTime::from_timestamp(at, 0),
            (None, Some(secs)) => Some(now + chrono::Duration::seconds(secs)),
            (None, None) => None,
        };
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user.into(),
        }
    }
}

impl BackendClient {
    /// Create a new client instance.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.anon_key)
            .map_err(|_| AppError::config("Anon key contains invalid characters"))?;
        headers.insert("apikey", key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            session: RwLock::new(None),
            events: AuthEvents::new(),
        })
    }

    /// Resume a previously stored session.
    pub fn with_session(self, session: Option<Session>) -> Self {
        self.set_session(session);
        self
    }

    /// Snapshot of the held session (possibly expired).
    pub fn session(&self) -> Option<Session> {
        self.session.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_session(&self, session: Option<Session>) {
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = session;
    }

    fn bearer(&self) -> String {
        match self.session() {
            Some(session) => session.access_token,
            None => self.anon_key.clone(),
        }
    }

    fn rest_url(&self, table: Table) -> String {
        format!("{base}/rest/v1/{table}", base = self.base_url)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{base}/auth/v1/{path}", base = self.base_url)
    }

    fn table_request(&self, builder: RequestBuilder, query: &Query) -> RequestBuilder {
        builder.bearer_auth(self.bearer()).query(&query.to_params())
    }

    /// Test that the auth service answers.
    pub async fn test_connection(&self) -> Result<bool> {
        let response = self.client.get(self.auth_url("health")).send().await?;
        Ok(response.status().is_success())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let response = check_auth(response).await?;
        let token: TokenResponse = response.json().await?;
        Ok(token.into_session(Utc::now()))
    }
}

/// Map a non-success table response to a backend error.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::backend(status.as_u16(), extract_error_message(&body)))
}

/// Map a non-success auth response; client errors become login failures.
async fn check_auth(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body);
    if status.is_client_error() {
        Err(AppError::AuthFailed(message))
    } else {
        Err(AppError::backend(status.as_u16(), message))
    }
}

/// Pull a human-readable message out of an error body.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no details".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

fn first_row(table: Table, rows: Vec<Value>) -> Result<Value> {
    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::parse(format!("Empty response from {table} insert")))
}

#[async_trait]
impl Backend for BackendClient {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>> {
        debug!("GET {table} {:?}", query.to_params());
        let request = self
            .table_request(self.client.get(self.rest_url(table)), query)
            .query(&[("select", "*")]);
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn count(&self, table: Table, query: &Query) -> Result<u64> {
        debug!("HEAD {table} {:?}", query.to_params());
        let request = self
            .table_request(self.client.head(self.rest_url(table)), query)
            .query(&[("select", "*")])
            .header("Prefer", "count=exact");
        let response = check(request.send().await?).await?;

        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| AppError::parse(format!("Missing row count for {table}")))
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value> {
        debug!("POST {table}");
        let request = self
            .client
            .post(self.rest_url(table))
            .bearer_auth(self.bearer())
            .header("Prefer", "return=representation")
            .json(&row);
        let response = check(request.send().await?).await?;
        first_row(table, response.json().await?)
    }

    async fn update(&self, table: Table, query: &Query, patch: Value) -> Result<Vec<Value>> {
        debug!("PATCH {table} {:?}", query.to_params());
        let request = self
            .table_request(self.client.patch(self.rest_url(table)), query)
            .header("Prefer", "return=representation")
            .json(&patch);
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, table: Table, query: &Query) -> Result<u64> {
        debug!("DELETE {table} {:?}", query.to_params());
        let request = self
            .table_request(self.client.delete(self.rest_url(table)), query)
            .header("Prefer", "return=representation");
        let response = check(request.send().await?).await?;
        let rows: Vec<Value> = response.json().await?;
        Ok(rows.len() as u64)
    }
}

#[async_trait]
impl AuthBackend for BackendClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let response = check_auth(response).await?;
        let token: TokenResponse = response.json().await?;
        let session = token.into_session(Utc::now());

        info!("Signed in as {}", session.user.id);
        self.set_session(Some(session.clone()));
        self.events.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, data: &SignUp) -> Result<Principal> {
        let response = self
            .client
            .post(self.auth_url("signup"))
            .json(&json!({
                "email": data.email,
                "password": data.password,
                "data": { "full_name": data.full_name },
            }))
            .send()
            .await?;
        let response = check_auth(response).await?;

        match response.json::<SignUpResponse>().await? {
            SignUpResponse::Session(token) => {
                let session = token.into_session(Utc::now());
                let principal = session.user.clone();
                self.set_session(Some(session.clone()));
                self.events.emit(AuthEvent::SignedIn(session));
                Ok(principal)
            }
            SignUpResponse::User(user) => Ok(user.into()),
        }
    }

    async fn sign_out(&self) -> Result<()> {
        if self.session().is_some() {
            let response = self
                .client
                .post(self.auth_url("logout"))
                .bearer_auth(self.bearer())
                .send()
                .await?;
            // An already-invalid token still counts as signed out.
            let status = response.status();
            if !status.is_success() && status != StatusCode::UNAUTHORIZED && status != StatusCode::FORBIDDEN {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::backend(status.as_u16(), extract_error_message(&body)));
            }
        }

        self.set_session(None);
        self.events.emit(AuthEvent::SignedOut);
        info!("Signed out");
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        let Some(session) = self.session() else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now()) {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.as_deref() else {
            self.set_session(None);
            self.events.emit(AuthEvent::SignedOut);
            return Ok(None);
        };

        match self.refresh(refresh_token).await {
            Ok(fresh) => {
                debug!("Session refreshed for {}", fresh.user.id);
                self.set_session(Some(fresh.clone()));
                self.events.emit(AuthEvent::SignedIn(fresh.clone()));
                Ok(Some(fresh))
            }
            Err(e) if e.is_auth() => {
                warn!("Session expired and could not be refreshed: {e}");
                self.set_session(None);
                self.events.emit(AuthEvent::SignedOut);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn auth_events(&self) -> &AuthEvents {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BackendConfig {
        BackendConfig {
            url: "http://localhost:54321/".to_string(),
            anon_key: "anon".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let client = BackendClient::new(&config()).unwrap();
        assert_eq!(
            client.rest_url(Table::FinancialEntries),
            "http://localhost:54321/rest/v1/financial_entries"
        );
        assert_eq!(client.auth_url("token"), "http://localhost:54321/auth/v1/token");
    }

    #[test]
    fn test_bearer_falls_back_to_anon_key() {
        let client = BackendClient::new(&config()).unwrap();
        assert_eq!(client.bearer(), "anon");

        let client = client.with_session(Some(Session {
            access_token: "jwt".into(),
            refresh_token: None,
            expires_at: None,
            user: Principal {
                id: uuid::Uuid::new_v4(),
                email: None,
            },
        }));
        assert_eq!(client.bearer(), "jwt");
    }

    #[test]
    fn test_rejects_invalid_key() {
        let mut cfg = config();
        cfg.anon_key = "bad\nkey".to_string();
        assert!(matches!(BackendClient::new(&cfg), Err(AppError::Config(_))));
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"code":"42501","message":"permission denied for table patients"}"#),
            "permission denied for table patients"
        );
        assert_eq!(
            extract_error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(extract_error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_error_message(""), "no details");
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-24/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn test_token_response_expiry() {
        let body = r#"{
            "access_token": "jwt",
            "refresh_token": "r1",
            "expires_in": 3600,
            "user": { "id": "6a3b0f3e-4f7e-4e55-9a55-0b1f1f3c2d10", "email": "a@b.id" }
        }"#;
        let token: TokenResponse = serde_json::from_str(body).unwrap();
        let now = Utc::now();
        let session = token.into_session(now);
        assert_eq!(session.expires_at, Some(now + chrono::Duration::seconds(3600)));
        assert_eq!(session.user.email.as_deref(), Some("a@b.id"));
    }

    #[test]
    fn test_sign_up_response_shapes() {
        let bare = r#"{ "id": "6a3b0f3e-4f7e-4e55-9a55-0b1f1f3c2d10", "email": "a@b.id", "aud": "authenticated" }"#;
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(bare).unwrap(),
            SignUpResponse::User(_)
        ));

        let with_session = r#"{
            "access_token": "jwt",
            "expires_in": 3600,
            "user": { "id": "6a3b0f3e-4f7e-4e55-9a55-0b1f1f3c2d10" }
        }"#;
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(with_session).unwrap(),
            SignUpResponse::Session(_)
        ));
    }
}
