//! # Store
//!
//! The authoritative in-memory mirror of every collection, and the single
//! gateway between the UI collaborator and the two backing stores.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Store Data Flow                                │
//! │                                                                         │
//! │  UI collaborator                                                        │
//! │    │  with_data / ops            subscribe                              │
//! │    ▼                                ▲                                   │
//! │  ┌─────────────────────────────────┴───────────────────────────────┐   │
//! │  │                          Store                                  │   │
//! │  │                                                                 │   │
//! │  │  StoreData (RwLock)   ◄── mutate ── validate ── save ── events  │   │
//! │  │     ▲                                    │                      │   │
//! │  │     │ load/reload                        ▼                      │   │
//! │  │  ┌──┴───────────────┐        ┌────────────────────┐            │   │
//! │  │  │ SharedBackend    │        │ LocalStore         │            │   │
//! │  │  │ Remote | Local   │        │ (always mirrors)   │            │   │
//! │  │  └──────────────────┘        └────────────────────┘            │   │
//! │  │     ▲                                                           │   │
//! │  │     │ per-collection SSE listeners (remote mode only)           │   │
//! │  └─────┴───────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Mode Selection
//! The backend strategy is chosen once at startup from the capability
//! probe (a configured database URL that parses). The only transition
//! afterwards is Remote → Local, taken when the remote store answers with
//! a permission error; the session never re-enters remote mode.
//!
//! ## Consistency
//! Whole-value replaces on both backends, last write wins. Two writers
//! racing (two admin sessions, a double-submit) resolve in completion
//! order with no versioning; that is the documented contract of this
//! system, not an accident of this implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, Weak};

use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use haven_core::validation::{
    self, decode_collection, screen_banner, screen_categories, screen_orders, screen_products,
    screen_users, ValidationReport,
};
use haven_core::{AddressBook, CartItem, OfferBanner, ReviewMap, User};

use crate::config::StoreConfig;
use crate::data::{keys, SharedSnapshot, StoreData};
use crate::error::{StoreError, StoreResult};
use crate::local::LocalStore;
use crate::remote::{ListenerUpdate, RemoteStore};

// =============================================================================
// Events
// =============================================================================

/// Change notifications broadcast to subscribers.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// The shared collections changed (a save, a remote push, or a reload
    /// that found new data). Carries the post-change snapshot.
    DataChanged { snapshot: SharedSnapshot },

    /// Local storage was flushed; other clients of the same storage
    /// directory should refresh.
    StorageChanged { key: String },
}

// =============================================================================
// Backend Strategy
// =============================================================================

/// Which backend currently serves the shared collections.
enum SharedBackend {
    Remote(Arc<RemoteStore>),
    Local,
}

/// Background listener tasks, one per subscribed collection plus the
/// dispatcher draining their updates.
#[derive(Default)]
struct ListenerSet {
    dispatcher: Option<JoinHandle<()>>,
    by_key: HashMap<String, JoinHandle<()>>,
}

impl ListenerSet {
    fn abort_all(&mut self) {
        if let Some(handle) = self.dispatcher.take() {
            handle.abort();
        }
        for (_, handle) in self.by_key.drain() {
            handle.abort();
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// The store. Create with [`Store::open`], share as `Arc<Store>`.
pub struct Store {
    data: RwLock<StoreData>,
    local: LocalStore,
    backend: RwLock<SharedBackend>,
    events: broadcast::Sender<StoreEvent>,
    listeners: Mutex<ListenerSet>,
}

impl Store {
    /// Opens the store: probes the remote capability, hydrates every
    /// collection, and (in remote mode) installs the per-collection
    /// listeners.
    pub async fn open(config: StoreConfig) -> StoreResult<Arc<Self>> {
        let local = LocalStore::open(config.storage.resolve_dir()?)?;

        let backend = if config.remote.is_configured() {
            match RemoteStore::new(&config.remote) {
                Ok(remote) => {
                    info!("Remote store configured; cross-device sync enabled");
                    SharedBackend::Remote(Arc::new(remote))
                }
                Err(err) => {
                    warn!(error = %err, "Remote store unavailable; using local storage only");
                    SharedBackend::Local
                }
            }
        } else {
            info!("Remote store not configured; using local storage only");
            SharedBackend::Local
        };

        let (events, _) = broadcast::channel(64);
        let store = Arc::new(Store {
            data: RwLock::new(StoreData::default()),
            local,
            backend: RwLock::new(backend),
            events,
            listeners: Mutex::new(ListenerSet::default()),
        });

        store.load().await?;
        store.install_listeners();
        Ok(store)
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    /// Runs a closure with read access to the collections.
    pub fn with_data<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&StoreData) -> R,
    {
        let data = self.data.read().expect("store data lock poisoned");
        f(&data)
    }

    /// A point-in-time copy of the shared collections.
    pub fn snapshot(&self) -> SharedSnapshot {
        self.with_data(StoreData::shared_snapshot)
    }

    /// Subscribes to change notifications. Events sent while no receiver
    /// exists are dropped, matching fire-and-forget signal semantics.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// True while the shared collections are served by the remote store.
    pub fn is_remote(&self) -> bool {
        matches!(
            *self.backend.read().expect("backend lock poisoned"),
            SharedBackend::Remote(_)
        )
    }

    /// Number of live remote-collection listeners.
    pub fn active_listener_count(&self) -> usize {
        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .by_key
            .len()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Applies a mutation to the collections and persists it.
    ///
    /// The closure returning an error abandons the save, so domain checks
    /// must run before touching the data. On success the full
    /// validate → persist → broadcast pipeline of [`Store::save`] runs.
    pub async fn mutate<F, R>(&self, f: F) -> StoreResult<R>
    where
        F: FnOnce(&mut StoreData) -> StoreResult<R>,
    {
        let result = {
            let mut data = self.data.write().expect("store data lock poisoned");
            f(&mut data)?
        };
        self.save().await?;
        Ok(result)
    }

    /// Validates, persists, and broadcasts the current collections.
    ///
    /// ## Steps
    /// 1. Re-screen the five validated collections; rejected entries are
    ///    removed from memory and logged with their reasons
    /// 2. Write the four shared collections to the selected backend
    ///    (whole-value replace). A failed remote write degrades to the
    ///    local path for this call; the user-local collections go to
    ///    local storage unconditionally
    /// 3. Broadcast [`StoreEvent::DataChanged`] with the saved snapshot
    ///
    /// A quota failure aborts the write and surfaces as an error without
    /// rolling back the in-memory mutation that triggered the save.
    pub async fn save(&self) -> StoreResult<()> {
        let (shared_values, user_local_values, snapshot) = self.screen_and_serialize()?;

        match self.current_remote() {
            Some(remote) => match self.push_shared(&remote, &shared_values).await {
                Ok(()) => {
                    debug!("Shared collections saved to remote store");
                    // Local mirror is the backup copy for the next offline
                    // session.
                    self.write_shared_locally(&shared_values)?;
                }
                Err(err) => {
                    if err.is_permission_denied() {
                        self.demote_to_local(&err);
                    } else {
                        warn!(error = %err, "Remote save failed, falling back to local storage");
                    }
                    self.write_shared_locally(&shared_values)?;
                }
            },
            None => self.write_shared_locally(&shared_values)?,
        }

        // User-local collections never leave this machine, whether or not
        // the remote write succeeded.
        for (key, value) in &user_local_values {
            self.local.set_value(key, value)?;
        }

        let _ = self.events.send(StoreEvent::DataChanged { snapshot });
        Ok(())
    }

    /// Step 1 of save: screen the validated collections in place and
    /// serialize everything while the lock is held.
    #[allow(clippy::type_complexity)]
    fn screen_and_serialize(
        &self,
    ) -> StoreResult<(
        Vec<(&'static str, Value)>,
        Vec<(&'static str, Value)>,
        SharedSnapshot,
    )> {
        let mut data = self.data.write().expect("store data lock poisoned");

        let report = screen_users(std::mem::take(&mut data.users));
        log_rejects(keys::USERS, &report);
        data.users = report.into_valid();

        let report = screen_categories(std::mem::take(&mut data.categories));
        log_rejects(keys::CATEGORIES, &report);
        data.categories = report.into_valid();

        let report = screen_products(std::mem::take(&mut data.products));
        log_rejects(keys::PRODUCTS, &report);
        data.products = report.into_valid();

        let report = screen_orders(std::mem::take(&mut data.orders));
        log_rejects(keys::ORDERS, &report);
        data.orders = report.into_valid();

        data.offer_banner = screen_banner(data.offer_banner.take());

        let shared = vec![
            (keys::CATEGORIES, serde_json::to_value(&data.categories)?),
            (keys::PRODUCTS, serde_json::to_value(&data.products)?),
            (keys::ORDERS, serde_json::to_value(&data.orders)?),
            (keys::OFFER_BANNER, serde_json::to_value(&data.offer_banner)?),
        ];
        let user_local = vec![
            (keys::USERS, serde_json::to_value(&data.users)?),
            (keys::REVIEWS, serde_json::to_value(&data.reviews)?),
            (keys::CURRENT_USER, serde_json::to_value(&data.current_user)?),
            (keys::CART, serde_json::to_value(&data.cart)?),
            (keys::ADDRESSES, serde_json::to_value(&data.addresses)?),
        ];

        Ok((shared, user_local, data.shared_snapshot()))
    }

    async fn push_shared(
        &self,
        remote: &RemoteStore,
        values: &[(&'static str, Value)],
    ) -> StoreResult<()> {
        for (key, value) in values {
            remote.put(key, value).await?;
        }
        Ok(())
    }

    fn write_shared_locally(&self, values: &[(&'static str, Value)]) -> StoreResult<()> {
        for (key, value) in values {
            self.local.set_value(key, value)?;
        }
        self.local.touch_last_update()?;
        let _ = self.events.send(StoreEvent::StorageChanged {
            key: keys::LAST_UPDATE.to_string(),
        });
        Ok(())
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Initial hydration: user-local collections from local storage, then
    /// the shared collections from the selected backend.
    async fn load(&self) -> StoreResult<()> {
        self.load_user_local()?;
        self.load_shared().await
    }

    /// Forces a point-in-time refresh of the shared collections: the same
    /// fetch as initialization, without reinstalling listeners.
    ///
    /// Returns whether anything changed; a change is also broadcast as
    /// [`StoreEvent::DataChanged`].
    pub async fn reload(&self) -> StoreResult<bool> {
        let before = self.snapshot();
        self.load_shared().await?;
        let after = self.snapshot();

        let changed = before != after;
        if changed {
            let _ = self.events.send(StoreEvent::DataChanged { snapshot: after });
        }
        Ok(changed)
    }

    async fn load_shared(&self) -> StoreResult<()> {
        if let Some(remote) = self.current_remote() {
            match self.fetch_shared(&remote).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    if err.is_permission_denied() {
                        self.demote_to_local(&err);
                    } else {
                        warn!(error = %err, "Remote load failed, falling back to local storage");
                    }
                }
            }
        }
        self.load_shared_from_local()
    }

    /// Fetches the four shared collections from the remote store,
    /// overwrites memory with the screened result, and mirrors it to
    /// local storage.
    async fn fetch_shared(&self, remote: &RemoteStore) -> StoreResult<()> {
        let categories = remote.fetch(keys::CATEGORIES).await?;
        let products = remote.fetch(keys::PRODUCTS).await?;
        let orders = remote.fetch(keys::ORDERS).await?;
        let banner = remote.fetch(keys::OFFER_BANNER).await?;

        let categories =
            decode_logged(keys::CATEGORIES, categories, validation::validate_category);
        let products = decode_logged(keys::PRODUCTS, products, validation::validate_product);
        let orders = decode_logged(keys::ORDERS, orders, validation::validate_order);
        let banner = decode_banner(banner);

        let mut data = self.data.write().expect("store data lock poisoned");
        data.categories = categories;
        data.products = products;
        data.orders = orders;
        data.offer_banner = banner;

        // Mirror as the offline backup. The remote copy is authoritative
        // here, so a full disk only costs the backup, not the load.
        if let Err(err) = self.mirror_shared(&data) {
            warn!(error = %err, "Could not mirror remote data to local storage");
        }
        Ok(())
    }

    fn mirror_shared(&self, data: &StoreData) -> StoreResult<()> {
        self.local.set(keys::CATEGORIES, &data.categories)?;
        self.local.set(keys::PRODUCTS, &data.products)?;
        self.local.set(keys::ORDERS, &data.orders)?;
        self.local.set(keys::OFFER_BANNER, &data.offer_banner)?;
        Ok(())
    }

    /// Loads the shared collections from local storage. A missing or
    /// wrong-shaped entry is replaced with an empty collection, and the
    /// replacement is persisted back immediately.
    fn load_shared_from_local(&self) -> StoreResult<()> {
        let categories = self.load_local_collection(
            keys::CATEGORIES,
            validation::validate_category,
        )?;
        let products =
            self.load_local_collection(keys::PRODUCTS, validation::validate_product)?;
        let orders = self.load_local_collection(keys::ORDERS, validation::validate_order)?;

        let banner_value = self.local.get_value(keys::OFFER_BANNER)?;
        let banner_missing = banner_value.is_null();
        let banner = decode_banner(banner_value);
        if banner_missing || banner.is_none() {
            self.local.set(keys::OFFER_BANNER, &banner)?;
        }

        let mut data = self.data.write().expect("store data lock poisoned");
        data.categories = categories;
        data.products = products;
        data.orders = orders;
        data.offer_banner = banner;
        Ok(())
    }

    fn load_local_collection<T>(
        &self,
        key: &'static str,
        check: fn(&T) -> Result<(), haven_core::ValidationError>,
    ) -> StoreResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let value = self.local.get_value(key)?;
        let missing = value.is_null();
        let report = decode_collection(key, value, check);
        log_rejects(key, &report);

        let wrong_shape = report
            .rejected
            .iter()
            .any(|r| matches!(r.reason, haven_core::ValidationError::MalformedCollection { .. }));

        let items = report.into_valid();
        if missing || wrong_shape {
            // Replace the corrupt/absent entry with the empty collection
            // so the next load starts clean.
            self.local.set(key, &items)?;
        }
        Ok(items)
    }

    /// Loads the user-local collections. These never touch the remote
    /// store regardless of mode.
    fn load_user_local(&self) -> StoreResult<()> {
        let users_value = self.local.get_value(keys::USERS)?;
        let users_missing = users_value.is_null();
        let report = decode_collection(keys::USERS, users_value, validation::validate_user);
        log_rejects(keys::USERS, &report);
        let dropped_any = !report.is_clean();
        let users: Vec<User> = report.into_valid();
        if users_missing || dropped_any {
            self.local.set(keys::USERS, &users)?;
        }

        let reviews: ReviewMap = self.local.get(keys::REVIEWS)?.unwrap_or_default();
        let current_user = self.local.get(keys::CURRENT_USER)?;
        let cart_report = decode_collection::<CartItem, _>(
            keys::CART,
            self.local.get_value(keys::CART)?,
            |_| Ok(()),
        );
        let addresses: AddressBook = self.local.get(keys::ADDRESSES)?.unwrap_or_default();

        let mut data = self.data.write().expect("store data lock poisoned");
        data.users = users;
        data.reviews = reviews;
        data.current_user = current_user;
        data.cart = haven_core::Cart::from_items(cart_report.into_valid());
        data.addresses = addresses;
        Ok(())
    }

    // =========================================================================
    // Remote Subscriptions
    // =========================================================================

    fn current_remote(&self) -> Option<Arc<RemoteStore>> {
        match &*self.backend.read().expect("backend lock poisoned") {
            SharedBackend::Remote(remote) => Some(Arc::clone(remote)),
            SharedBackend::Local => None,
        }
    }

    /// Installs one listener per shared collection (remote mode only).
    ///
    /// Safe to call repeatedly: existing listeners are deregistered first,
    /// so repeated initialization cannot accumulate duplicate handlers.
    fn install_listeners(self: &Arc<Self>) {
        let Some(remote) = self.current_remote() else {
            return;
        };

        let mut set = self.listeners.lock().expect("listener lock poisoned");
        set.abort_all();

        let (tx, rx) = mpsc::channel::<ListenerUpdate>(16);
        for key in crate::data::SHARED_KEYS {
            set.by_key
                .insert(key.to_string(), remote.spawn_listener(key, tx.clone()));
        }

        let weak = Arc::downgrade(self);
        set.dispatcher = Some(tokio::spawn(dispatch_updates(weak, rx)));
        info!("Listening for remote updates on the shared collections");
    }

    /// Applies a value pushed by a remote listener.
    ///
    /// The new value is compared against the serialized in-memory value;
    /// only a difference replaces memory, mirrors to local storage, and
    /// broadcasts the change.
    fn apply_remote_value(&self, key: &str, value: Value) {
        let current = self.with_data(|data| shared_value(data, key));
        if current == value {
            return;
        }

        let snapshot = {
            let mut data = self.data.write().expect("store data lock poisoned");
            match key {
                keys::CATEGORIES => {
                    data.categories =
                        decode_logged(key, value, validation::validate_category);
                }
                keys::PRODUCTS => {
                    data.products = decode_logged(key, value, validation::validate_product);
                }
                keys::ORDERS => {
                    data.orders = decode_logged(key, value, validation::validate_order);
                }
                keys::OFFER_BANNER => {
                    data.offer_banner = decode_banner(value);
                }
                other => {
                    debug!(key = other, "Ignoring update for unknown collection");
                    return;
                }
            }

            if let Err(err) = self.mirror_one(&data, key) {
                warn!(key, error = %err, "Could not mirror remote update locally");
            }
            data.shared_snapshot()
        };

        info!(key, "Collection updated from remote store");
        let _ = self.events.send(StoreEvent::DataChanged { snapshot });
    }

    fn mirror_one(&self, data: &StoreData, key: &str) -> StoreResult<()> {
        match key {
            keys::CATEGORIES => self.local.set(key, &data.categories),
            keys::PRODUCTS => self.local.set(key, &data.products),
            keys::ORDERS => self.local.set(key, &data.orders),
            keys::OFFER_BANNER => self.local.set(key, &data.offer_banner),
            _ => Ok(()),
        }
    }

    /// Permanently drops to local-only mode after a permission failure.
    /// Remote mode is never re-entered within the session.
    fn demote_to_local(&self, cause: &StoreError) {
        {
            let mut backend = self.backend.write().expect("backend lock poisoned");
            if matches!(*backend, SharedBackend::Local) {
                return;
            }
            *backend = SharedBackend::Local;
        }

        error!(error = %cause, "Remote permission denied; using local storage for the rest of this session");
        error!("Check the remote database rules: the configured project refuses reads/writes");

        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .abort_all();
    }

    /// Stops background listener tasks. Called on shutdown; dropping the
    /// store without calling this only leaks until the tasks notice their
    /// channel closed.
    pub fn shutdown(&self) {
        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .abort_all();
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if let Ok(mut set) = self.listeners.lock() {
            set.abort_all();
        }
    }
}

// =============================================================================
// Listener Dispatch
// =============================================================================

async fn dispatch_updates(store: Weak<Store>, mut rx: mpsc::Receiver<ListenerUpdate>) {
    while let Some(update) = rx.recv().await {
        let Some(store) = store.upgrade() else {
            return;
        };
        match update {
            ListenerUpdate::Value { key, value } => store.apply_remote_value(&key, value),
            ListenerUpdate::PermissionDenied { key } => {
                let cause = StoreError::PermissionDenied(format!(
                    "subscription to '{}' was revoked",
                    key
                ));
                store.demote_to_local(&cause);
                return;
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn log_rejects<T>(collection: &str, report: &ValidationReport<T>) {
    for rejected in &report.rejected {
        warn!(
            collection,
            index = rejected.index,
            reason = %rejected.reason,
            "Dropping invalid entry"
        );
    }
}

fn decode_logged<T>(
    collection: &str,
    value: Value,
    check: fn(&T) -> Result<(), haven_core::ValidationError>,
) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
{
    let report = decode_collection(collection, value, check);
    log_rejects(collection, &report);
    report.into_valid()
}

fn decode_banner(value: Value) -> Option<OfferBanner> {
    match value {
        Value::Null => None,
        value => match serde_json::from_value::<OfferBanner>(value) {
            Ok(banner) => screen_banner(Some(banner)),
            Err(err) => {
                warn!(error = %err, "Discarding malformed offer banner");
                None
            }
        },
    }
}

/// Serializes one shared collection for the listener's changed-value
/// comparison.
fn shared_value(data: &StoreData, key: &str) -> Value {
    let result = match key {
        keys::CATEGORIES => serde_json::to_value(&data.categories),
        keys::PRODUCTS => serde_json::to_value(&data.products),
        keys::ORDERS => serde_json::to_value(&data.orders),
        keys::OFFER_BANNER => serde_json::to_value(&data.offer_banner),
        _ => Ok(Value::Null),
    };
    result.unwrap_or(Value::Null)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RemoteSettings, StorageSettings, StoreConfig};
    use haven_core::Product;

    fn temp_config() -> StoreConfig {
        let dir = std::env::temp_dir().join(format!("haven-store-{}", uuid::Uuid::new_v4()));
        StoreConfig {
            storage: StorageSettings { dir: Some(dir) },
            ..StoreConfig::default()
        }
    }

    fn poster(id: i64) -> Product {
        Product {
            id,
            name: format!("Poster {}", id),
            price: 2499.0,
            category: "Posters".to_string(),
            image: "https://example.com/poster.jpg".to_string(),
            description: Some("A poster.".to_string()),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_remote_means_local_mode() {
        let store = Store::open(temp_config()).await.unwrap();

        assert!(!store.is_remote());
        // No listener may ever be registered in local mode.
        assert_eq!(store.active_listener_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_probe_falls_back_to_local() {
        let mut config = temp_config();
        // Configured but unusable: the probe fails and the session runs
        // local-only from the start.
        config.remote = RemoteSettings {
            database_url: Some("not a parseable url".to_string()),
            api_key: None,
            project_id: None,
        };

        let store = Store::open(config).await.unwrap();
        assert!(!store.is_remote());
        assert_eq!(store.active_listener_count(), 0);

        // save() and reload() must run entirely on the local path.
        store
            .mutate(|data| {
                data.products.push(poster(1));
                Ok(())
            })
            .await
            .unwrap();
        store.reload().await.unwrap();
        assert_eq!(store.with_data(|d| d.products.len()), 1);
    }

    #[tokio::test]
    async fn test_product_round_trip() {
        let config = temp_config();
        let store = Store::open(config.clone()).await.unwrap();
        store
            .mutate(|data| {
                data.products.push(poster(1));
                Ok(())
            })
            .await
            .unwrap();
        drop(store);

        // A fresh store over the same directory sees a deep-equal product.
        let reopened = Store::open(config).await.unwrap();
        let products = reopened.with_data(|d| d.products.clone());
        assert_eq!(products, vec![poster(1)]);
    }

    #[tokio::test]
    async fn test_reload_is_idempotent() {
        let store = Store::open(temp_config()).await.unwrap();
        store
            .mutate(|data| {
                data.products.push(poster(1));
                data.products.push(poster(2));
                Ok(())
            })
            .await
            .unwrap();

        store.reload().await.unwrap();
        let first = store.snapshot();
        let changed = store.reload().await.unwrap();
        let second = store.snapshot();

        assert_eq!(first, second);
        assert!(!changed);
    }

    #[tokio::test]
    async fn test_save_drops_exactly_the_malformed_entries() {
        let store = Store::open(temp_config()).await.unwrap();

        let mut negative_price = poster(2);
        negative_price.price = -5.0;
        let mut nameless = poster(3);
        nameless.name = String::new();

        store
            .mutate(|data| {
                data.products =
                    vec![poster(1), negative_price, nameless, poster(4)];
                Ok(())
            })
            .await
            .unwrap();

        let ids: Vec<i64> = store.with_data(|d| d.products.iter().map(|p| p.id).collect());
        assert_eq!(ids, vec![1, 4]);
    }

    #[tokio::test]
    async fn test_malformed_local_collection_replaced_with_empty() {
        let config = temp_config();
        {
            let local = LocalStore::open(config.storage.resolve_dir().unwrap()).unwrap();
            // Wrong shape: a JSON object where an array is expected.
            local
                .set_value(keys::PRODUCTS, &serde_json::json!({"bogus": 1}))
                .unwrap();
        }

        let store = Store::open(config.clone()).await.unwrap();
        assert!(store.with_data(|d| d.products.is_empty()));

        // The replacement is persisted back immediately.
        let local = LocalStore::open(config.storage.resolve_dir().unwrap()).unwrap();
        assert_eq!(
            local.get_value(keys::PRODUCTS).unwrap(),
            serde_json::json!([])
        );
    }

    #[tokio::test]
    async fn test_malformed_user_entries_filtered_on_load() {
        let config = temp_config();
        {
            let local = LocalStore::open(config.storage.resolve_dir().unwrap()).unwrap();
            local
                .set_value(
                    keys::USERS,
                    &serde_json::json!([
                        {"id": 1, "name": "asha", "email": "asha@example.com", "password": "pw"},
                        {"id": 2, "name": "", "email": "empty@example.com", "password": "pw"},
                        {"id": 3, "name": "no-email"},
                    ]),
                )
                .unwrap();
        }

        let store = Store::open(config).await.unwrap();
        let names: Vec<String> =
            store.with_data(|d| d.users.iter().map(|u| u.name.clone()).collect());
        assert_eq!(names, vec!["asha".to_string()]);
    }

    #[tokio::test]
    async fn test_save_broadcasts_data_changed() {
        let store = Store::open(temp_config()).await.unwrap();
        let mut rx = store.subscribe();

        store
            .mutate(|data| {
                data.products.push(poster(9));
                Ok(())
            })
            .await
            .unwrap();

        // save() emits StorageChanged (local flush) and DataChanged.
        let mut saw_data_changed = false;
        while let Ok(event) = rx.try_recv() {
            if let StoreEvent::DataChanged { snapshot } = event {
                assert_eq!(snapshot.products.len(), 1);
                saw_data_changed = true;
            }
        }
        assert!(saw_data_changed);
    }

    #[tokio::test]
    async fn test_failed_mutation_does_not_persist() {
        let config = temp_config();
        let store = Store::open(config.clone()).await.unwrap();

        let result: StoreResult<()> = store
            .mutate(|_| Err(StoreError::Core(haven_core::CoreError::EmptyCart)))
            .await;
        assert!(result.is_err());

        // Nothing was saved.
        let local = LocalStore::open(config.storage.resolve_dir().unwrap()).unwrap();
        assert_eq!(local.get_value(keys::LAST_UPDATE).unwrap(), Value::Null);
    }
}
