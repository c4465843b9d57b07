//! REST client for the Edupath backend.
//!
//! Implements the core gateway traits over `reqwest` with the cookie store
//! enabled, since the backend authenticates via the ambient session cookie.
//! All responses funnel through one dispatch point where 401 handling lives.

use crate::expiry::AuthExpiryNotifier;
use async_trait::async_trait;
use edupath_core::config::ClientConfig;
use edupath_core::error::{EdupathError, Result};
use edupath_core::favorites::{FavoriteKind, FavoritesApi, RemoteFavorite};
use edupath_core::session::{
    normalize_user_payload, AuthGateway, Credentials, LoginOutcome, RegisterOutcome,
    Registration, SessionUser,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Error code the backend attaches to blocked-account 403 responses.
const BLOCKED_CODE: &str = "USER_BLOCKED";

/// Cookie-authenticated client for the backend REST API.
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    expiry: AuthExpiryNotifier,
}

impl ApiClient {
    /// Builds a client for the configured API origin.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|err| EdupathError::transport(err.to_string()))?;

        Ok(Self {
            http,
            base: config.api_base.clone(),
            expiry: AuthExpiryNotifier::new(),
        })
    }

    /// The notifier the application layer registers its expiry observer on.
    pub fn expiry_notifier(&self) -> AuthExpiryNotifier {
        self.expiry.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Sends a request and applies the global 401 rule before the caller
    /// interprets the response.
    async fn dispatch(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| EdupathError::transport(err.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("received 401, firing auth expiry");
            self.expiry.notify().await;
        }

        Ok(response)
    }

    /// Best-effort message extraction from an error response body.
    async fn failure_message(response: Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        extract_message(&body).unwrap_or_else(|| format!("request failed with status {status}"))
    }
}

/// Pulls a human-readable message out of a JSON error body, if present.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error", "msg"]
        .iter()
        .find_map(|key| value.get(*key))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// True when a 403 body carries the blocked-account indicator.
fn is_blocked_body(value: &Value) -> bool {
    if value.get("code").and_then(Value::as_str) == Some(BLOCKED_CODE) {
        return true;
    }
    value
        .get("message")
        .and_then(Value::as_str)
        .map(|message| message.to_lowercase().contains("blocked"))
        .unwrap_or(false)
}

#[async_trait]
impl AuthGateway for ApiClient {
    async fn who_am_i(&self) -> Result<Option<SessionUser>> {
        // Sent directly, not through dispatch: this endpoint is the probe
        // for "no session yet", so a 401 here is the expected anonymous
        // answer rather than an expiry to react to.
        let response = self
            .http
            .get(self.url("/check_Auth"))
            .send()
            .await
            .map_err(|err| EdupathError::transport(err.to_string()))?;

        if response.status() != StatusCode::OK {
            return Ok(None);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| EdupathError::transport(err.to_string()))?;

        Ok(normalize_user_payload(&body))
    }

    async fn login(&self, credentials: &Credentials) -> LoginOutcome {
        // Sent directly, not through dispatch: a 401 here means the
        // credentials were wrong, for a visitor who has no session to
        // expire. Bouncing them through the force-logout redirect mid-login
        // would be wrong.
        let response = match self
            .http
            .post(self.url("/Login"))
            .json(credentials)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let err = EdupathError::transport(err.to_string());
                warn!(error = %err, "login request failed before a response");
                return LoginOutcome::Failed {
                    message: err.display_message(),
                };
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            let body: Value = match response.json().await {
                Ok(body) => body,
                Err(err) => {
                    return LoginOutcome::Failed {
                        message: err.to_string(),
                    }
                }
            };
            return match normalize_user_payload(&body) {
                Some(user) => LoginOutcome::Success(user),
                None => LoginOutcome::Failed {
                    message: "login response carried no user".to_string(),
                },
            };
        }

        if status == StatusCode::FORBIDDEN {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            if is_blocked_body(&body) {
                let message = body
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("account is blocked")
                    .to_string();
                return LoginOutcome::Blocked { message };
            }
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("login forbidden")
                .to_string();
            return LoginOutcome::Failed { message };
        }

        LoginOutcome::Failed {
            message: Self::failure_message(response).await,
        }
    }

    async fn logout(&self) -> Result<()> {
        let response = self.dispatch(self.http.post(self.url("/Logout"))).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(EdupathError::api(
                status.as_u16(),
                Self::failure_message(response).await,
            ))
        }
    }

    async fn register(&self, registration: &Registration) -> RegisterOutcome {
        let request = self.http.post(self.url("/Register")).json(registration);
        let response = match self.dispatch(request).await {
            Ok(response) => response,
            Err(err) => {
                return RegisterOutcome::Rejected {
                    message: err.display_message(),
                }
            }
        };

        if response.status().is_success() {
            RegisterOutcome::Accepted
        } else {
            RegisterOutcome::Rejected {
                message: Self::failure_message(response).await,
            }
        }
    }
}

#[async_trait]
impl FavoritesApi for ApiClient {
    async fn list_favorites(&self) -> Result<Vec<RemoteFavorite>> {
        let response = self.dispatch(self.http.get(self.url("/Favorites"))).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EdupathError::api(
                status.as_u16(),
                Self::failure_message(response).await,
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| EdupathError::transport(err.to_string()))?;

        // The list arrives either bare or wrapped in {"favorites": [...]}.
        let records = match body {
            Value::Array(records) => records,
            Value::Object(mut map) => match map.remove("favorites") {
                Some(Value::Array(records)) => records,
                _ => {
                    return Err(EdupathError::api(
                        status.as_u16(),
                        "unexpected favorites list shape",
                    ))
                }
            },
            _ => {
                return Err(EdupathError::api(
                    status.as_u16(),
                    "unexpected favorites list shape",
                ))
            }
        };

        let mut favorites = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::from_value::<RemoteFavorite>(record) {
                Ok(favorite) => favorites.push(favorite),
                Err(err) => warn!(error = %err, "skipping malformed favorite record"),
            }
        }
        Ok(favorites)
    }

    async fn add_favorite(&self, id: &str, kind: FavoriteKind) -> Result<()> {
        let body = json!({ kind.id_field(): id, "type": kind.as_str() });
        let request = self.http.post(self.url("/Favorites/add")).json(&body);
        let response = self.dispatch(request).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(EdupathError::api(
                status.as_u16(),
                Self::failure_message(response).await,
            ))
        }
    }

    async fn remove_favorite(&self, id: &str, kind: FavoriteKind) -> Result<()> {
        let body = json!({ kind.id_field(): id, "type": kind.as_str() });
        // Body-carrying DELETE, matching the backend contract.
        let request = self.http.delete(self.url("/Favorites/remove")).json(&body);
        let response = self.dispatch(request).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(EdupathError::api(
                status.as_u16(),
                Self::failure_message(response).await,
            ))
        }
    }

    async fn favorite_status(&self, id: &str, kind: FavoriteKind) -> Result<bool> {
        let request = self
            .http
            .get(self.url("/Favorites/status"))
            .query(&[(kind.id_field(), id), ("type", kind.as_str())]);
        let response = self.dispatch(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EdupathError::api(
                status.as_u16(),
                Self::failure_message(response).await,
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| EdupathError::transport(err.to_string()))?;

        Ok(match body {
            Value::Bool(flag) => flag,
            other => other
                .get("isFavorite")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}
