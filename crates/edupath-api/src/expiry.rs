//! Global auth-expiry notification.
//!
//! A 401 from any endpoint means the server-side session is gone. That is
//! handled exactly once, here at the transport layer: every response passes
//! through the client's dispatch point, which fires the registered observer
//! before the response is interpreted further. Call sites never check for
//! 401 themselves.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Reacts to a session expiry observed on the wire.
///
/// The application layer registers one implementation that captures the
/// current location, forces a local logout, and redirects to the login view.
#[async_trait]
pub trait AuthExpiryObserver: Send + Sync {
    async fn on_auth_expired(&self);
}

/// Holds the registered observer and fans 401 notifications out to it.
///
/// Cloning shares the underlying slot, so the notifier handed out before
/// registration still reaches the observer registered later.
#[derive(Clone, Default)]
pub struct AuthExpiryNotifier {
    observer: Arc<RwLock<Option<Arc<dyn AuthExpiryObserver>>>>,
}

impl AuthExpiryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the observer, replacing any previous one.
    pub async fn set_observer(&self, observer: Arc<dyn AuthExpiryObserver>) {
        *self.observer.write().await = Some(observer);
    }

    /// Fires the observer, if one is registered.
    pub async fn notify(&self) {
        let observer = self.observer.read().await.clone();
        if let Some(observer) = observer {
            observer.on_auth_expired().await;
        }
    }
}
