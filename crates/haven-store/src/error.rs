//! # Store Error Types
//!
//! Error types for the persistence and synchronization layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Store Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │  Local Storage  │  │       Remote            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  LocalStorage   │  │  RemoteUnavailable      │ │
//! │  │  ConfigLoad/Save│  │  QuotaExceeded  │  │  PermissionDenied       │ │
//! │  └─────────────────┘  └─────────────────┘  │  RequestFailed          │ │
//! │                                            │  StreamClosed           │ │
//! │  ┌─────────────────┐  ┌─────────────────┐  └─────────────────────────┘ │
//! │  │   Serialization │  │     Domain      │                              │
//! │  │                 │  │                 │                              │
//! │  │  Serialization  │  │  Core (wrap)    │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Almost nothing here reaches the UI collaborator: the store catches its
//! own remote errors and degrades to the local path. The exceptions are
//! [`StoreError::QuotaExceeded`] (the write is aborted and the caller must
//! hear about it) and serialization failures of in-memory state.

use haven_core::CoreError;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store error type covering persistence and sync failures.
#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid store configuration.
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Local Storage Errors
    // =========================================================================
    /// Local key-value storage failed (I/O below the JSON layer).
    #[error("Local storage error: {0}")]
    LocalStorage(String),

    /// The storage device refused the write for lack of space.
    /// The in-memory state is NOT rolled back; the write is simply aborted.
    #[error("Storage quota exceeded while writing '{key}'")]
    QuotaExceeded { key: String },

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// Remote store is not configured or not reachable at startup.
    /// Expected in local-only deployments; triggers permanent fallback.
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote store refused the operation.
    /// Triggers permanent fallback to local-only mode for this session.
    #[error("Remote permission denied: {0}")]
    PermissionDenied(String),

    /// A remote request failed (network, server error, bad payload).
    #[error("Remote request failed: {0}")]
    RequestFailed(String),

    /// The remote event stream ended or was cancelled by the server.
    #[error("Remote event stream closed: {0}")]
    StreamClosed(String),

    // =========================================================================
    // Serialization Errors
    // =========================================================================
    /// Failed to serialize or deserialize a persisted value.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Domain rule violation (wraps haven-core errors).
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::LocalStorage(err.to_string())
    }
}

impl From<url::ParseError> for StoreError {
    fn from(err: url::ParseError) -> Self {
        StoreError::InvalidConfig(format!("invalid remote URL: {}", err))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status.as_u16() == 401 || status.as_u16() == 403 => {
                StoreError::PermissionDenied(err.to_string())
            }
            _ => StoreError::RequestFailed(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl StoreError {
    /// True when the remote store refused access. The store reacts by
    /// permanently dropping to local-only mode for the session.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, StoreError::PermissionDenied(_))
    }

    /// True when retrying the same remote operation later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::RequestFailed(_) | StoreError::StreamClosed(_)
        )
    }

    /// True when a local write was aborted for lack of space.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StoreError::QuotaExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(StoreError::RequestFailed("timeout".into()).is_retryable());
        assert!(StoreError::StreamClosed("eof".into()).is_retryable());

        assert!(!StoreError::PermissionDenied("rules".into()).is_retryable());
        assert!(!StoreError::InvalidConfig("bad".into()).is_retryable());
    }

    #[test]
    fn test_permission_denied_classification() {
        assert!(StoreError::PermissionDenied("rules".into()).is_permission_denied());
        assert!(!StoreError::RequestFailed("500".into()).is_permission_denied());
    }

    #[test]
    fn test_quota_error_display() {
        let err = StoreError::QuotaExceeded {
            key: "products".into(),
        };
        assert!(err.to_string().contains("products"));
        assert!(err.is_quota_exceeded());
    }
}
