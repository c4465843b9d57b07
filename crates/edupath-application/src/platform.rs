//! Root wiring for the client core.
//!
//! Builds the transport, storage, and stores in their required order:
//! the session store resolves identity first, then the favorites store
//! attaches to its identity channel. Views receive the two stores from
//! here and never talk to storage or the API directly for these concerns.

use crate::auth_expiry::AuthExpiryRedirect;
use crate::favorites_store::FavoritesStore;
use crate::session_store::SessionStore;
use edupath_api::ApiClient;
use edupath_core::config::ClientConfig;
use edupath_core::error::Result;
use edupath_core::session::{Navigator, ReturnPathStore};
use edupath_infrastructure::{EdupathPaths, GuestFavoritesFile, StateCache};
use std::sync::Arc;

/// The assembled client core: one session store, one favorites store.
pub struct ClientPlatform {
    pub session: Arc<SessionStore>,
    pub favorites: Arc<FavoritesStore>,
    state_cache: Arc<StateCache>,
    watcher: tokio::task::JoinHandle<()>,
}

impl ClientPlatform {
    /// Initializes the platform with storage at the default location.
    pub async fn initialize(
        config: ClientConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let paths = EdupathPaths::default_location()?;
        Self::initialize_with_paths(config, navigator, &paths).await
    }

    /// Initializes the platform with storage under the given paths.
    ///
    /// Bootstraps the session before attaching the favorites store, so the
    /// first favorites load already sees the resolved identity.
    pub async fn initialize_with_paths(
        config: ClientConfig,
        navigator: Arc<dyn Navigator>,
        paths: &EdupathPaths,
    ) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config)?);
        let state_cache = Arc::new(StateCache::new(
            paths.user_snapshot_file(),
            paths.return_path_file(),
        ));
        let guest = Arc::new(GuestFavoritesFile::new(paths.guest_favorites_file()));

        let session = Arc::new(SessionStore::new(
            api.clone(),
            state_cache.clone(),
            &config,
        ));
        let favorites = Arc::new(FavoritesStore::new(
            api.clone(),
            guest,
            session.subscribe(),
        ));

        let redirect = Arc::new(AuthExpiryRedirect::new(
            session.clone(),
            state_cache.clone(),
            navigator,
        ));
        api.expiry_notifier().set_observer(redirect).await;

        session.bootstrap().await;
        let watcher = favorites.attach();

        Ok(Self {
            session,
            favorites,
            state_cache,
            watcher,
        })
    }

    /// The stored post-login return target, consumed by the login view.
    pub fn take_return_path(&self) -> Result<Option<String>> {
        self.state_cache.take_return_path()
    }

    /// Stops the favorites identity subscription.
    pub fn dispose(&self) {
        self.watcher.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct NullNavigator {
        visited: Mutex<Vec<String>>,
    }

    impl Navigator for NullNavigator {
        fn current_location(&self) -> String {
            "/".to_string()
        }

        fn navigate(&self, path: &str) {
            self.visited.lock().unwrap().push(path.to_string());
        }
    }

    #[tokio::test]
    async fn test_initialize_with_unreachable_backend_resolves_anonymous() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let paths = EdupathPaths::new(temp_dir.path()).unwrap();

        // Unroutable origin: bootstrap's whoami fails, which is the normal
        // anonymous outcome.
        let platform = ClientPlatform::initialize_with_paths(
            ClientConfig::new("http://127.0.0.1:1"),
            Arc::new(NullNavigator::default()),
            &paths,
        )
        .await
        .unwrap();

        assert!(!platform.session.is_loading().await);
        assert!(!platform.session.is_authenticated().await);
        assert_eq!(platform.take_return_path().unwrap(), None);

        platform.dispose();
    }
}
