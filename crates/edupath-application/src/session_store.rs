//! Session store: the single source of truth for "who is using the app".
//!
//! Constructed once at application root and injected into consumers. All
//! session mutations go through the four operations here; identity changes
//! are published on a `watch` channel that the favorites store (and anything
//! else interested) subscribes to.

use edupath_core::config::ClientConfig;
use edupath_core::session::{
    AuthGateway, Credentials, Identity, IdentitySnapshot, LoginOutcome, RegisterOutcome,
    Registration, Session, SessionSnapshotCache, SessionUser,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

#[cfg(feature = "dev-auth")]
use edupath_core::config::DevAuth;

/// Holds the current session and the operations that change it.
pub struct SessionStore {
    state: RwLock<Session>,
    gateway: Arc<dyn AuthGateway>,
    snapshot: Arc<dyn SessionSnapshotCache>,
    identity_tx: watch::Sender<IdentitySnapshot>,
    epoch: AtomicU64,
    #[cfg(feature = "dev-auth")]
    dev_auth: Option<DevAuth>,
}

impl SessionStore {
    /// Creates the store in its pre-bootstrap state (`loading = true`).
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        snapshot: Arc<dyn SessionSnapshotCache>,
        config: &ClientConfig,
    ) -> Self {
        let (identity_tx, _) = watch::channel(IdentitySnapshot::initial());

        #[cfg(not(feature = "dev-auth"))]
        let _ = config;

        Self {
            state: RwLock::new(Session::starting()),
            gateway,
            snapshot,
            identity_tx,
            epoch: AtomicU64::new(0),
            #[cfg(feature = "dev-auth")]
            dev_auth: config.dev_auth.clone(),
        }
    }

    /// Subscribes to identity transitions.
    ///
    /// The receiver always holds the latest [`IdentitySnapshot`]; its epoch
    /// is the staleness token consumers check before committing async work.
    pub fn subscribe(&self) -> watch::Receiver<IdentitySnapshot> {
        self.identity_tx.subscribe()
    }

    /// One-time startup identity check.
    ///
    /// Resolves the session from the dev bypass (dev builds only) or the
    /// cookie-backed whoami endpoint. Any non-200 answer or transport
    /// failure is the normal anonymous outcome, not an error. Every path
    /// through here ends with `loading == false`: the resolution step cannot
    /// return early and the flag is cleared in the single commit below it.
    pub async fn bootstrap(&self) {
        self.state.write().await.loading = true;

        let user = self.resolve_identity().await;

        {
            let mut state = self.state.write().await;
            state.user = user.clone();
            state.loading = false;
        }

        match user {
            Some(user) => {
                self.persist_snapshot(&user);
                self.publish(Identity::Authenticated(user));
            }
            None => self.publish(Identity::Anonymous),
        }
    }

    async fn resolve_identity(&self) -> Option<SessionUser> {
        #[cfg(feature = "dev-auth")]
        if let Some(dev) = &self.dev_auth {
            debug!(user_id = %dev.user_id, "dev auth bypass active, skipping whoami");
            return Some(SessionUser::with_type(&dev.user_id, &dev.user_type));
        }

        match self.gateway.who_am_i().await {
            Ok(user) => user,
            Err(err) => {
                debug!(error = %err, "whoami failed, treating as anonymous");
                None
            }
        }
    }

    /// Posts credentials and, on success, commits the authenticated session.
    ///
    /// Failures come back as tagged outcomes; the session is untouched for
    /// `Blocked` and `Failed`.
    pub async fn login(&self, credentials: &Credentials) -> LoginOutcome {
        let outcome = self.gateway.login(credentials).await;

        if let LoginOutcome::Success(user) = &outcome {
            {
                let mut state = self.state.write().await;
                state.user = Some(user.clone());
                state.loading = false;
            }
            self.persist_snapshot(user);
            self.publish(Identity::Authenticated(user.clone()));
        }

        outcome
    }

    /// Logs out: best-effort server invalidation, unconditional local clear.
    pub async fn logout(&self) {
        if let Err(err) = self.gateway.logout().await {
            warn!(error = %err, "server logout failed, clearing local session anyway");
        }
        self.clear_local().await;
    }

    /// Clears the local session without a server round-trip.
    ///
    /// Used by the auth-expiry path, where the 401 already proved the server
    /// session is gone.
    pub async fn force_expire(&self) {
        self.clear_local().await;
    }

    /// Posts registration data. Never mutates the session; callers chain an
    /// explicit [`login`](Self::login).
    pub async fn register(&self, registration: &Registration) -> RegisterOutcome {
        self.gateway.register(registration).await
    }

    /// The current session state.
    pub async fn session(&self) -> Session {
        self.state.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<SessionUser> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// The cached user snapshot, for rendering a user-ish shell before
    /// bootstrap resolves. A display hint only, never proof of
    /// authentication.
    pub fn optimistic_user(&self) -> Option<SessionUser> {
        match self.snapshot.load() {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, "failed to read user snapshot");
                None
            }
        }
    }

    async fn clear_local(&self) {
        {
            let mut state = self.state.write().await;
            state.user = None;
            state.loading = false;
        }
        if let Err(err) = self.snapshot.clear() {
            warn!(error = %err, "failed to clear user snapshot");
        }
        self.publish(Identity::Anonymous);
    }

    fn persist_snapshot(&self, user: &SessionUser) {
        if let Err(err) = self.snapshot.save(user) {
            warn!(error = %err, "failed to persist user snapshot");
        }
    }

    fn publish(&self, identity: Identity) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.identity_tx
            .send_replace(IdentitySnapshot { epoch, identity });
    }
}
