//! Reaction to a session expiry observed anywhere on the wire.
//!
//! Registered once on the transport's expiry notifier. When any request
//! comes back 401: remember where the user was, drop the local session, and
//! send them to the login view with the return target encoded, so logging
//! back in lands them where they left off.

use crate::session_store::SessionStore;
use async_trait::async_trait;
use edupath_api::AuthExpiryObserver;
use edupath_core::session::{Navigator, ReturnPathStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Path of the login view the redirect targets.
pub const LOGIN_PATH: &str = "/login";

/// The one place the 401-means-logged-out rule is implemented.
pub struct AuthExpiryRedirect {
    session: Arc<SessionStore>,
    return_paths: Arc<dyn ReturnPathStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthExpiryRedirect {
    pub fn new(
        session: Arc<SessionStore>,
        return_paths: Arc<dyn ReturnPathStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            return_paths,
            navigator,
        }
    }
}

#[async_trait]
impl AuthExpiryObserver for AuthExpiryRedirect {
    async fn on_auth_expired(&self) {
        let location = self.navigator.current_location();
        info!(%location, "session expired, redirecting to login");

        if let Err(err) = self.return_paths.save_return_path(&location) {
            warn!(error = %err, "failed to persist return path");
        }

        // The 401 already proved the server session is gone; clear locally
        // without another round-trip.
        self.session.force_expire().await;

        self.navigator.navigate(&format!(
            "{LOGIN_PATH}?redirect={}",
            encode_query_component(&location)
        ));
    }
}

/// Percent-encodes a query-string component.
fn encode_query_component(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
