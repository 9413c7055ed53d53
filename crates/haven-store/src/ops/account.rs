//! # Account Operations
//!
//! Registration, login/logout, and the saved-address book.
//!
//! ## Identity Rules
//! - Names and emails are unique case-insensitively
//! - The reserved admin name cannot be registered; logging in with it and
//!   the admin password opens the admin session without a users entry
//! - Login accepts either the name or the email as the identifier
//!
//! Passwords are stored and compared in plaintext. That is the documented
//! behavior of this system; see the notes on [`haven_core::User`].

use chrono::Utc;
use haven_core::validation::validate_user;
use haven_core::{
    Address, CoreError, SessionUser, User, ADMIN_EMAIL, ADMIN_NAME, ADMIN_PASSWORD,
};

use crate::error::StoreResult;
use crate::store::Store;

impl Store {
    /// Registers a new account.
    ///
    /// The name is trimmed and the email lowercased before any checks, so
    /// `" Asha "` and `"ASHA@example.com"` collide with existing entries
    /// the way a shopper would expect.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> StoreResult<User> {
        let name = name.trim();
        let email = email.trim().to_lowercase();

        if name.eq_ignore_ascii_case(ADMIN_NAME) {
            return Err(CoreError::ReservedName(name.to_string()).into());
        }

        let candidate = User {
            id: Utc::now().timestamp_millis(),
            name: name.to_string(),
            email,
            password: password.to_string(),
        };
        validate_user(&candidate).map_err(CoreError::from)?;

        self.mutate(move |data| {
            if let Some(existing) = data.users.iter().find(|u| {
                u.email.eq_ignore_ascii_case(&candidate.email)
                    || u.name.eq_ignore_ascii_case(&candidate.name)
            }) {
                let (field, value) = if existing.email.eq_ignore_ascii_case(&candidate.email) {
                    ("email", candidate.email.clone())
                } else {
                    ("name", candidate.name.clone())
                };
                return Err(CoreError::DuplicateUser {
                    field: field.to_string(),
                    value,
                }
                .into());
            }

            data.users.push(candidate.clone());
            Ok(candidate)
        })
        .await
    }

    /// Logs in with a name or email plus password, and persists the
    /// session under `currentUser`.
    pub async fn login(&self, identifier: &str, password: &str) -> StoreResult<SessionUser> {
        let identifier = identifier.trim();

        let session = if identifier.eq_ignore_ascii_case(ADMIN_NAME) && password == ADMIN_PASSWORD
        {
            SessionUser {
                name: ADMIN_NAME.to_string(),
                email: ADMIN_EMAIL.to_string(),
            }
        } else {
            self.with_data(|data| {
                data.users
                    .iter()
                    .find(|u| {
                        (u.email.eq_ignore_ascii_case(identifier)
                            || u.name.eq_ignore_ascii_case(identifier))
                            && u.password == password
                    })
                    .map(|u| SessionUser {
                        name: u.name.clone(),
                        email: u.email.clone(),
                    })
            })
            .ok_or(CoreError::InvalidCredentials)?
        };

        self.mutate(|data| {
            data.current_user = Some(session.clone());
            Ok(session.clone())
        })
        .await
    }

    /// Ends the current session.
    pub async fn logout(&self) -> StoreResult<()> {
        self.mutate(|data| {
            data.current_user = None;
            Ok(())
        })
        .await
    }

    /// The logged-in session, if any.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.with_data(|data| data.current_user.clone())
    }

    /// True when the current session belongs to the admin account.
    pub fn is_admin(&self) -> bool {
        self.with_data(|data| {
            data.current_user
                .as_ref()
                .map(SessionUser::is_admin)
                .unwrap_or(false)
        })
    }

    /// The saved checkout address for an account, if one exists.
    pub fn saved_address(&self, email: &str) -> Option<Address> {
        self.with_data(|data| data.addresses.get(email).cloned())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use haven_core::PaymentMethod;

    use crate::config::{StorageSettings, StoreConfig};
    use crate::store::Store;

    async fn test_store() -> Arc<Store> {
        let dir = std::env::temp_dir().join(format!("haven-account-{}", uuid::Uuid::new_v4()));
        let config = StoreConfig {
            storage: StorageSettings { dir: Some(dir) },
            ..StoreConfig::default()
        };
        Store::open(config).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_and_login_by_email_or_name() {
        let store = test_store().await;
        store
            .register("Asha", "Asha@Example.com", "secret")
            .await
            .unwrap();

        // Email is stored lowercased; both identifiers work, any case.
        let session = store.login("ASHA@example.COM", "secret").await.unwrap();
        assert_eq!(session.email, "asha@example.com");

        store.logout().await.unwrap();
        let session = store.login("asha", "secret").await.unwrap();
        assert_eq!(session.name, "Asha");
        assert!(store.current_user().is_some());
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let store = test_store().await;
        store
            .register("Asha", "asha@example.com", "secret")
            .await
            .unwrap();

        assert!(store.login("asha", "wrong").await.is_err());
        assert!(store.current_user().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_or_email_rejected() {
        let store = test_store().await;
        store
            .register("Asha", "asha@example.com", "secret")
            .await
            .unwrap();

        assert!(store
            .register("ASHA", "other@example.com", "pw")
            .await
            .is_err());
        assert!(store
            .register("Other", "ASHA@EXAMPLE.COM", "pw")
            .await
            .is_err());
        assert_eq!(store.with_data(|d| d.users.len()), 1);
    }

    #[tokio::test]
    async fn test_admin_name_reserved() {
        let store = test_store().await;
        assert!(store
            .register("Sridharani", "someone@example.com", "pw")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_admin_login_without_users_entry() {
        let store = test_store().await;
        let session = store.login("sridharani", "xyz@@21").await.unwrap();

        assert!(session.is_admin());
        assert!(store.is_admin());
        assert!(store.with_data(|d| d.users.is_empty()));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let store = test_store().await;
        store.login("sridharani", "xyz@@21").await.unwrap();
        store.logout().await.unwrap();

        assert!(store.current_user().is_none());
        assert!(!store.is_admin());
    }

    #[tokio::test]
    async fn test_checkout_saves_address_for_account() {
        let store = test_store().await;
        store
            .save_category(None, "Posters", "https://example.com/c.jpg")
            .await
            .unwrap();
        store
            .save_product(None, "Poster", 100.0, "Posters", "https://example.com/p.jpg", None)
            .await
            .unwrap();
        store
            .register("Asha", "asha@example.com", "secret")
            .await
            .unwrap();
        store.login("asha", "secret").await.unwrap();
        store.add_to_cart(1).await.unwrap();

        let address = haven_core::Address {
            full_name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            address_line1: "12 MG Road".to_string(),
            address_line2: String::new(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
            landmark: String::new(),
        };
        store
            .place_order(address.clone(), PaymentMethod::Cod, true)
            .await
            .unwrap();

        assert_eq!(store.saved_address("asha@example.com"), Some(address));
    }
}
