//! # haven-store: Persistence + Synchronization Layer for DesignHaven
//!
//! This crate owns everything between the storefront's in-memory
//! collections and the two backing stores: a hosted realtime document
//! database (when configured) and local JSON key-value storage (always).
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Architecture                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    Store (Main Mirror)                           │  │
//! │  │                                                                  │  │
//! │  │  Owns the in-memory collections behind a RwLock                 │  │
//! │  │  Every mutation runs validate → persist → broadcast             │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │  RemoteStore   │  │   LocalStore   │  │     RefreshTask        │    │
//! │  │                │  │                │  │                        │    │
//! │  │ GET/PUT whole  │  │ One JSON file  │  │ Single coalesced       │    │
//! │  │ collections,   │  │ per key, temp  │  │ reload loop with an    │    │
//! │  │ SSE listeners  │  │ file + rename  │  │ explicit wake signal   │    │
//! │  │ with backoff   │  │ writes         │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  BACKEND SELECTION:                                                    │
//! │  ──────────────────                                                    │
//! │  The remote capability is probed once at startup (a configured         │
//! │  database URL that parses). The only later transition is               │
//! │  Remote → Local, taken on a permission error, never reversed.          │
//! │                                                                         │
//! │  CHANGE EVENTS (to the UI collaborator via broadcast channel):         │
//! │  • StoreEvent::DataChanged - shared collections changed (snapshot)     │
//! │  • StoreEvent::StorageChanged - local storage flushed (cross-client)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! ### Store core
//! - [`store`] - The `Store` mirror: init protocol, save/reload, listeners
//! - [`data`] - The in-memory collections and persisted key names
//! - [`config`] - TOML + `HAVEN_*` env configuration
//! - [`error`] - Store error types
//!
//! ### Backends
//! - [`local`] - Synchronous one-JSON-file-per-key storage
//! - [`remote`] - HTTPS client for the realtime document database
//! - [`sse`] - Incremental parser for the subscription event stream
//!
//! ### Background work
//! - [`refresh`] - The coalesced reload task (poll interval + wake)
//!
//! ### Domain operations
//! - [`ops`] - Catalog, cart, order, account, and review operations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use haven_store::{RefreshTask, Store, StoreConfig, StoreEvent};
//!
//! // Load configuration (file + environment overrides)
//! let config = StoreConfig::load()?;
//! let interval = std::time::Duration::from_secs(config.refresh.poll_interval_secs);
//!
//! // Open the store: probes the remote, hydrates, installs listeners
//! let store = Store::open(config).await?;
//!
//! // Background refresh replaces the storefront's 1-second blind polling
//! let (refresh, _task) = RefreshTask::spawn(store.clone(), interval);
//!
//! // React to changes
//! let mut events = store.subscribe();
//! while let Ok(StoreEvent::DataChanged { snapshot }) = events.recv().await {
//!     println!("{} products", snapshot.products.len());
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

// Store core
pub mod config;
pub mod data;
pub mod error;
pub mod store;

// Backends
pub mod local;
pub mod remote;
pub mod sse;

// Background work
pub mod refresh;

// Domain operations
pub mod ops;

// =============================================================================
// Re-exports
// =============================================================================

// Store core
pub use config::{RefreshSettings, RemoteSettings, StorageSettings, StoreConfig};
pub use data::{keys, SharedSnapshot, StoreData, SHARED_KEYS};
pub use error::{StoreError, StoreResult};
pub use store::{Store, StoreEvent};

// Backends
pub use local::LocalStore;
pub use remote::{ListenerUpdate, RemoteStore};
pub use sse::{EventStreamParser, ServerEvent};

// Background work
pub use refresh::{RefreshHandle, RefreshTask};
