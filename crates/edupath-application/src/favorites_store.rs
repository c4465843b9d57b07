//! Favorites store: one collection, two lenses.
//!
//! Anonymous users read and write the local guest document; authenticated
//! users read and write the backend. On every identity transition the store
//! discards its in-memory collection and reloads from the source that owns
//! the new identity. There is deliberately no merge of guest favorites into
//! an account on login.

use edupath_core::error::Result;
use edupath_core::favorites::{
    extract_item_id, FavoriteCollection, FavoriteEntry, FavoriteKind, FavoriteMutation,
    FavoritesApi, GuestFavoritesStore,
};
use edupath_core::session::IdentitySnapshot;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, warn};

/// Maintains the favorited-items collection across identity transitions.
pub struct FavoritesStore {
    collection: RwLock<FavoriteCollection>,
    api: Arc<dyn FavoritesApi>,
    guest: Arc<dyn GuestFavoritesStore>,
    identity: watch::Receiver<IdentitySnapshot>,
}

impl FavoritesStore {
    /// Creates an empty store bound to the session store's identity channel.
    pub fn new(
        api: Arc<dyn FavoritesApi>,
        guest: Arc<dyn GuestFavoritesStore>,
        identity: watch::Receiver<IdentitySnapshot>,
    ) -> Self {
        Self {
            collection: RwLock::new(FavoriteCollection::default()),
            api,
            guest,
            identity,
        }
    }

    /// Starts the identity subscription: one initial load for the identity
    /// at attach time, then a reload on every transition.
    ///
    /// The returned handle stops the subscription when aborted; a store
    /// whose session store has been dropped winds the task down on its own.
    pub fn attach(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = store.load().await {
                warn!(error = %err, "initial favorites load failed");
            }

            let mut rx = store.identity.clone();
            loop {
                if rx.changed().await.is_err() {
                    break;
                }
                if let Err(err) = store.load().await {
                    warn!(error = %err, "favorites reload failed after identity change");
                }
            }
        })
    }

    /// Reloads the collection from the source owning the current identity.
    ///
    /// The replacement is total: no partial state is observable, and a
    /// result that arrives after a further identity transition is discarded
    /// (last identity wins).
    pub async fn load(&self) -> Result<()> {
        let snapshot = self.identity.borrow().clone();
        self.load_for(&snapshot).await
    }

    /// True when the snapshot still matches the channel's latest identity.
    fn is_current(&self, snapshot: &IdentitySnapshot) -> bool {
        self.identity.borrow().epoch == snapshot.epoch
    }

    async fn load_for(&self, snapshot: &IdentitySnapshot) -> Result<()> {
        let mut failure = None;

        let fresh = if snapshot.is_authenticated() {
            match self.api.list_favorites().await {
                Ok(records) => {
                    let mut collection = FavoriteCollection::default();
                    for record in records {
                        match record.into_entry() {
                            Some((kind, entry)) => {
                                collection.insert(kind, entry);
                            }
                            None => warn!("skipping malformed favorite record"),
                        }
                    }
                    collection
                }
                Err(err) => {
                    // Never fall back to the local document for a signed-in
                    // user: on a shared device it may hold someone else's
                    // favorites. Empty is the safe answer.
                    error!(error = %err, "backend favorites load failed, starting empty");
                    failure = Some(err);
                    FavoriteCollection::default()
                }
            }
        } else {
            match self.guest.load() {
                Ok(collection) => collection,
                Err(err) => {
                    warn!(error = %err, "guest favorites load failed, starting empty");
                    FavoriteCollection::default()
                }
            }
        };

        // The identity may have moved on while the source was answering.
        let latest = self.identity.borrow().epoch;
        if latest != snapshot.epoch {
            debug!(
                stale = snapshot.epoch,
                latest, "discarding stale favorites load"
            );
            return Ok(());
        }

        *self.collection.write().await = fresh;
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Favorites the given catalog item.
    ///
    /// The item must carry an id under one of the accepted spellings; a
    /// payload without one is logged and ignored. Adding an item that is
    /// already favorited is an idempotent no-op. A mutation whose backend
    /// round-trip outlives the identity it was issued under is not committed
    /// to memory (last identity wins, same rule as `load`).
    pub async fn add(&self, item: &Value, kind: FavoriteKind) -> FavoriteMutation {
        let Some(id) = extract_item_id(item) else {
            warn!(%kind, "favorite add called with an item lacking an id, ignoring");
            return FavoriteMutation::InvalidItem;
        };

        let snapshot = self.identity.borrow().clone();
        if snapshot.is_authenticated() {
            if self.collection.read().await.contains(kind, &id) {
                return FavoriteMutation::NoOp;
            }
            if let Err(err) = self.api.add_favorite(&id, kind).await {
                return FavoriteMutation::Failed {
                    message: err.display_message(),
                };
            }
            if !self.is_current(&snapshot) {
                debug!(stale = snapshot.epoch, "identity changed mid-add, not committing");
                return FavoriteMutation::NoOp;
            }
            let mut collection = self.collection.write().await;
            if collection.insert(kind, FavoriteEntry::new(id, item.clone())) {
                FavoriteMutation::Applied
            } else {
                FavoriteMutation::NoOp
            }
        } else {
            match self.guest.add(item, kind) {
                Ok(true) => {
                    if self.is_current(&snapshot) {
                        self.collection
                            .write()
                            .await
                            .insert(kind, FavoriteEntry::new(id, item.clone()));
                    }
                    FavoriteMutation::Applied
                }
                Ok(false) => FavoriteMutation::NoOp,
                Err(err) => FavoriteMutation::Failed {
                    message: err.display_message(),
                },
            }
        }
    }

    /// Unfavorites the item with the given id. Subject to the same
    /// last-identity-wins commit rule as [`add`](Self::add).
    pub async fn remove(&self, id: &str, kind: FavoriteKind) -> FavoriteMutation {
        let snapshot = self.identity.borrow().clone();
        if snapshot.is_authenticated() {
            if let Err(err) = self.api.remove_favorite(id, kind).await {
                return FavoriteMutation::Failed {
                    message: err.display_message(),
                };
            }
            if !self.is_current(&snapshot) {
                debug!(stale = snapshot.epoch, "identity changed mid-remove, not committing");
                return FavoriteMutation::NoOp;
            }
            if self.collection.write().await.remove(kind, id) {
                FavoriteMutation::Applied
            } else {
                FavoriteMutation::NoOp
            }
        } else {
            match self.guest.remove(id, kind) {
                Ok(changed) => {
                    if self.is_current(&snapshot) {
                        self.collection.write().await.remove(kind, id);
                    }
                    if changed {
                        FavoriteMutation::Applied
                    } else {
                        FavoriteMutation::NoOp
                    }
                }
                Err(err) => FavoriteMutation::Failed {
                    message: err.display_message(),
                },
            }
        }
    }

    /// Whether the item is favorited under the current identity.
    ///
    /// For guests this consults local storage directly, which is the
    /// authoritative source at query time; for authenticated users it
    /// consults the loaded collection.
    pub async fn is_favorite(&self, id: &str, kind: FavoriteKind) -> bool {
        let authenticated = self.identity.borrow().is_authenticated();
        if authenticated {
            self.collection.read().await.contains(kind, id)
        } else {
            match self.guest.contains(id, kind) {
                Ok(found) => found,
                Err(err) => {
                    warn!(error = %err, "guest favorites lookup failed");
                    false
                }
            }
        }
    }

    /// Server-authoritative favorite check, for views that need one.
    pub async fn remote_status(&self, id: &str, kind: FavoriteKind) -> Result<bool> {
        self.api.favorite_status(id, kind).await
    }

    /// Cardinality of one set, or of both combined.
    pub async fn count(&self, kind: Option<FavoriteKind>) -> usize {
        self.collection.read().await.count(kind)
    }

    /// A copy of the current in-memory collection.
    pub async fn collection(&self) -> FavoriteCollection {
        self.collection.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use edupath_core::error::EdupathError;
    use edupath_core::favorites::RemoteFavorite;
    use edupath_core::session::{Identity, SessionUser};
    use edupath_infrastructure::GuestFavoritesFile;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeApi {
        records: Mutex<Vec<Value>>,
        fail_list: Mutex<bool>,
        fail_mutations: Mutex<Option<String>>,
        add_calls: AtomicUsize,
        remove_calls: AtomicUsize,
        /// When set, mutations park on this gate until the test releases it.
        mutation_gate: Mutex<Option<Arc<tokio::sync::Notify>>>,
    }

    impl FakeApi {
        fn with_records(records: Vec<Value>) -> Self {
            Self {
                records: Mutex::new(records),
                ..Self::default()
            }
        }

        async fn wait_for_gate(&self) {
            let gate = self.mutation_gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
        }
    }

    #[async_trait]
    impl FavoritesApi for FakeApi {
        async fn list_favorites(&self) -> Result<Vec<RemoteFavorite>> {
            if *self.fail_list.lock().unwrap() {
                return Err(EdupathError::transport("backend down"));
            }
            let records = self.records.lock().unwrap().clone();
            Ok(records
                .into_iter()
                .map(|record| serde_json::from_value(record).unwrap())
                .collect())
        }

        async fn add_favorite(&self, _id: &str, _kind: FavoriteKind) -> Result<()> {
            self.add_calls.fetch_add(1, Ordering::SeqCst);
            self.wait_for_gate().await;
            match self.fail_mutations.lock().unwrap().clone() {
                Some(message) => Err(EdupathError::api(500, message)),
                None => Ok(()),
            }
        }

        async fn remove_favorite(&self, _id: &str, _kind: FavoriteKind) -> Result<()> {
            self.remove_calls.fetch_add(1, Ordering::SeqCst);
            self.wait_for_gate().await;
            match self.fail_mutations.lock().unwrap().clone() {
                Some(message) => Err(EdupathError::api(500, message)),
                None => Ok(()),
            }
        }

        async fn favorite_status(&self, id: &str, kind: FavoriteKind) -> Result<bool> {
            let item_key = match kind {
                FavoriteKind::Course => "course",
                FavoriteKind::Program => "program",
            };
            Ok(self.records.lock().unwrap().iter().any(|record| {
                record
                    .get(item_key)
                    .and_then(|item| item.get("id"))
                    .and_then(Value::as_str)
                    == Some(id)
            }))
        }
    }

    struct Fixture {
        store: Arc<FavoritesStore>,
        api: Arc<FakeApi>,
        identity_tx: watch::Sender<IdentitySnapshot>,
        _temp_dir: TempDir,
    }

    fn fixture_with(api: FakeApi) -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let guest = Arc::new(GuestFavoritesFile::new(
            temp_dir.path().join("favorites.json"),
        ));
        let api = Arc::new(api);
        let (identity_tx, identity_rx) = watch::channel(IdentitySnapshot {
            epoch: 1,
            identity: Identity::Anonymous,
        });
        let store = Arc::new(FavoritesStore::new(api.clone(), guest, identity_rx));
        Fixture {
            store,
            api,
            identity_tx,
            _temp_dir: temp_dir,
        }
    }

    fn sign_in(fixture: &Fixture, epoch: u64) {
        fixture.identity_tx.send_replace(IdentitySnapshot {
            epoch,
            identity: Identity::Authenticated(SessionUser::new("12")),
        });
    }

    fn sign_out(fixture: &Fixture, epoch: u64) {
        fixture.identity_tx.send_replace(IdentitySnapshot {
            epoch,
            identity: Identity::Anonymous,
        });
    }

    fn course_record(id: &str) -> Value {
        json!({"favoriteId": 1, "type": "course", "course": {"id": id}})
    }

    #[tokio::test]
    async fn test_guest_add_remove_never_touch_the_backend() {
        let fixture = fixture_with(FakeApi::default());
        let store = &fixture.store;

        let item = json!({"id": "42", "title": "Marine Biology"});
        assert_eq!(store.add(&item, FavoriteKind::Course).await, FavoriteMutation::Applied);
        assert_eq!(store.add(&item, FavoriteKind::Course).await, FavoriteMutation::NoOp);
        assert!(store.is_favorite("42", FavoriteKind::Course).await);
        assert_eq!(store.count(Some(FavoriteKind::Course)).await, 1);

        assert_eq!(
            store.remove("42", FavoriteKind::Course).await,
            FavoriteMutation::Applied
        );
        assert!(!store.is_favorite("42", FavoriteKind::Course).await);

        assert_eq!(fixture.api.add_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fixture.api.remove_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_without_id_is_a_total_noop() {
        let fixture = fixture_with(FakeApi::default());
        let store = &fixture.store;

        let outcome = store
            .add(&json!({"title": "no id anywhere"}), FavoriteKind::Course)
            .await;

        assert_eq!(outcome, FavoriteMutation::InvalidItem);
        assert_eq!(store.count(None).await, 0);
        assert_eq!(fixture.api.add_calls.load(Ordering::SeqCst), 0);

        // Same rule while authenticated.
        sign_in(&fixture, 2);
        let outcome = store
            .add(&json!({"name": "still no id"}), FavoriteKind::Program)
            .await;
        assert_eq!(outcome, FavoriteMutation::InvalidItem);
        assert_eq!(fixture.api.add_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_identity_switch_replaces_not_merges() {
        let fixture = fixture_with(FakeApi::with_records(vec![course_record("99")]));
        let store = &fixture.store;
        store.load().await.unwrap();

        // Guest favorites course 42.
        store
            .add(&json!({"id": "42"}), FavoriteKind::Course)
            .await;
        assert!(store.is_favorite("42", FavoriteKind::Course).await);

        // Login: the server's view wins, no union with local state.
        sign_in(&fixture, 2);
        store.load().await.unwrap();
        assert!(!store.is_favorite("42", FavoriteKind::Course).await);
        assert!(store.is_favorite("99", FavoriteKind::Course).await);
        assert_eq!(store.count(None).await, 1);

        // Logout: back to the guest lens, 42 is still there locally.
        sign_out(&fixture, 3);
        store.load().await.unwrap();
        assert!(store.is_favorite("42", FavoriteKind::Course).await);
        assert!(!store.is_favorite("99", FavoriteKind::Course).await);
    }

    #[tokio::test]
    async fn test_authenticated_add_and_remove_write_through() {
        let fixture = fixture_with(FakeApi::default());
        let store = &fixture.store;
        sign_in(&fixture, 2);
        store.load().await.unwrap();

        let item = json!({"Id": 5, "name": "Exchange Year"});
        assert_eq!(store.add(&item, FavoriteKind::Program).await, FavoriteMutation::Applied);
        assert_eq!(fixture.api.add_calls.load(Ordering::SeqCst), 1);
        assert!(store.is_favorite("5", FavoriteKind::Program).await);

        assert_eq!(
            store.remove("5", FavoriteKind::Program).await,
            FavoriteMutation::Applied
        );
        assert_eq!(fixture.api.remove_calls.load(Ordering::SeqCst), 1);
        // Once the returned future resolves, the entry is gone.
        assert!(!store.is_favorite("5", FavoriteKind::Program).await);
        assert_eq!(store.count(Some(FavoriteKind::Program)).await, 0);
    }

    #[tokio::test]
    async fn test_backend_rejection_is_a_tagged_failure() {
        let api = FakeApi::default();
        *api.fail_mutations.lock().unwrap() = Some("quota exceeded".to_string());
        let fixture = fixture_with(api);
        let store = &fixture.store;
        sign_in(&fixture, 2);
        store.load().await.unwrap();

        let outcome = store.add(&json!({"id": "5"}), FavoriteKind::Course).await;
        assert_eq!(
            outcome,
            FavoriteMutation::Failed {
                message: "quota exceeded".to_string()
            }
        );
        // The collection is untouched on failure.
        assert!(!store.is_favorite("5", FavoriteKind::Course).await);
    }

    #[tokio::test]
    async fn test_authenticated_load_failure_leaves_collection_empty() {
        let api = FakeApi::default();
        *api.fail_list.lock().unwrap() = true;
        let fixture = fixture_with(api);
        let store = &fixture.store;

        // Guest data exists on the device.
        store
            .add(&json!({"id": "42"}), FavoriteKind::Course)
            .await;

        sign_in(&fixture, 2);
        let result = store.load().await;

        // Logged and surfaced, and crucially NOT served from local storage.
        assert!(result.is_err());
        assert_eq!(store.count(None).await, 0);
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let fixture = fixture_with(FakeApi::with_records(vec![course_record("99")]));
        let store = &fixture.store;

        // A load captured for the anonymous identity at epoch 1...
        let stale = IdentitySnapshot {
            epoch: 1,
            identity: Identity::Anonymous,
        };

        // ...while the identity has already moved on and its load committed.
        sign_in(&fixture, 2);
        store.load().await.unwrap();
        assert!(store.is_favorite("99", FavoriteKind::Course).await);

        // The slow anonymous response must not overwrite the newer state.
        store.load_for(&stale).await.unwrap();
        assert!(store.is_favorite("99", FavoriteKind::Course).await);
        assert_eq!(store.count(None).await, 1);
    }

    #[tokio::test]
    async fn test_mutation_resolving_after_identity_change_is_not_committed() {
        let api = FakeApi::default();
        let gate = Arc::new(tokio::sync::Notify::new());
        *api.mutation_gate.lock().unwrap() = Some(gate.clone());
        let fixture = fixture_with(api);
        let store = Arc::clone(&fixture.store);
        sign_in(&fixture, 2);
        store.load().await.unwrap();

        // An authenticated add goes in flight and parks on the backend.
        let in_flight = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.add(&json!({"id": "5"}), FavoriteKind::Course).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fixture.api.add_calls.load(Ordering::SeqCst), 1);

        // Logout wins the race: the anonymous (empty) collection commits.
        sign_out(&fixture, 3);
        store.load().await.unwrap();
        assert_eq!(store.count(None).await, 0);

        // The slow add resolves afterwards and must not leak into the
        // anonymous collection.
        gate.notify_one();
        let outcome = in_flight.await.unwrap();

        assert_eq!(outcome, FavoriteMutation::NoOp);
        assert_eq!(store.count(None).await, 0);
        assert!(!store.is_favorite("5", FavoriteKind::Course).await);
    }

    #[tokio::test]
    async fn test_attach_reloads_on_identity_change() {
        let fixture = fixture_with(FakeApi::with_records(vec![course_record("99")]));
        let store = &fixture.store;

        let watcher = store.attach();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.count(None).await, 0);

        sign_in(&fixture, 2);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.is_favorite("99", FavoriteKind::Course).await);

        sign_out(&fixture, 3);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!store.is_favorite("99", FavoriteKind::Course).await);

        watcher.abort();
    }

    #[tokio::test]
    async fn test_remote_status_asks_the_backend() {
        let fixture = fixture_with(FakeApi::with_records(vec![course_record("99")]));
        let store = &fixture.store;
        sign_in(&fixture, 2);

        assert!(store.remote_status("99", FavoriteKind::Course).await.unwrap());
        assert!(!store.remote_status("1", FavoriteKind::Course).await.unwrap());
    }
}
