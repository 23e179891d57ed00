use dioxus::prelude::*;

use starshop_common::accounts::{Accounts, Session};
use starshop_common::settings::{SettingsStore, SiteSettings};

use super::storage::BrowserStore;

/// Session and site settings shared across all pages.
///
/// Loaded from storage once at startup and refreshed after login, logout,
/// or a settings save.
#[derive(Clone, Debug, PartialEq)]
pub struct UserState {
    pub session: Option<Session>,
    pub settings: SiteSettings,
    /// Set when a storage read failed to decode; surfaced as a banner.
    pub storage_error: Option<String>,
}

impl UserState {
    pub fn load() -> Self {
        let mut storage_error = None;

        let session = match Accounts::new(BrowserStore::new()).session() {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!("failed to read session: {err}");
                storage_error = Some(err.to_string());
                None
            }
        };

        let settings = match SettingsStore::new(BrowserStore::new()).get() {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("failed to read settings: {err}");
                storage_error = Some(err.to_string());
                SiteSettings::default()
            }
        };

        Self {
            session,
            settings,
            storage_error,
        }
    }

    pub fn refresh(&mut self) {
        *self = Self::load();
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }
}

/// Shared UserState signal provided at the top of the app.
pub fn use_user_state() -> Signal<UserState> {
    use_context::<Signal<UserState>>()
}
