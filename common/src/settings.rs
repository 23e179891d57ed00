use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::storage::{get_json, set_json, KeyValueStore, StoreError};

/// Storage key for the singleton settings record.
pub const SETTINGS_KEY: &str = "site_settings";

/// Storage key for the persisted admin access key.
pub const ADMIN_SECRET_KEY: &str = "admin_secret_key";

/// Length of a generated admin access key.
const SECRET_KEY_LEN: usize = 26;

/// Editable site parameters. Stored wholesale under [`SETTINGS_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    /// Price of one star, in kopecks.
    pub star_price_kopecks: u64,
    pub min_stars: u32,
    pub max_stars: u32,
    /// Company display name shown on payment details.
    pub company_name: String,
    /// Phone number payments are addressed to.
    pub phone_number: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            star_price_kopecks: 172,
            min_stars: 50,
            max_stars: 500,
            company_name: "IP Ivanov I.I.".to_string(),
            phone_number: "+7 988 311-56-45".to_string(),
        }
    }
}

impl SiteSettings {
    pub fn quantity_in_range(&self, star_count: u32) -> bool {
        (self.min_stars..=self.max_stars).contains(&star_count)
    }

    /// Total order price for `star_count` stars, in kopecks.
    pub fn total_kopecks(&self, star_count: u32) -> u64 {
        self.star_price_kopecks * u64::from(star_count)
    }

    /// Shallow merge: fields present in `patch` replace the current values.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.star_price_kopecks {
            self.star_price_kopecks = v;
        }
        if let Some(v) = patch.min_stars {
            self.min_stars = v;
        }
        if let Some(v) = patch.max_stars {
            self.max_stars = v;
        }
        if let Some(v) = patch.company_name {
            self.company_name = v;
        }
        if let Some(v) = patch.phone_number {
            self.phone_number = v;
        }
    }
}

/// Partial update for [`SiteSettings`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub star_price_kopecks: Option<u64>,
    pub min_stars: Option<u32>,
    pub max_stars: Option<u32>,
    pub company_name: Option<String>,
    pub phone_number: Option<String>,
}

/// Typed access to the settings record.
pub struct SettingsStore<S> {
    store: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current settings, or the defaults when none have been saved.
    pub fn get(&self) -> Result<SiteSettings, StoreError> {
        Ok(get_json(&self.store, SETTINGS_KEY)?.unwrap_or_default())
    }

    /// Merge `patch` into the stored settings and persist the result.
    pub fn update(&mut self, patch: SettingsPatch) -> Result<SiteSettings, StoreError> {
        let mut settings = self.get()?;
        settings.apply(patch);
        set_json(&mut self.store, SETTINGS_KEY, &settings)?;
        Ok(settings)
    }
}

/// Admin panel access control: a single shared secret compared for equality
/// against a URL path segment.
pub struct AdminAccess<S> {
    store: S,
}

impl<S: KeyValueStore> AdminAccess<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The persisted access key, generated and stored on first use.
    pub fn secret_key(&mut self) -> String {
        if let Some(key) = self.store.get(ADMIN_SECRET_KEY) {
            if !key.is_empty() {
                return key;
            }
        }
        let key = generate_secret_key();
        self.store.set(ADMIN_SECRET_KEY, &key);
        key
    }

    /// Exact string comparison against the persisted key.
    pub fn is_authorized(&mut self, candidate: &str) -> bool {
        candidate == self.secret_key()
    }
}

fn generate_secret_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_KEY_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn defaults_when_nothing_saved() {
        let store = SettingsStore::new(MemoryStore::new());
        let settings = store.get().unwrap();
        assert_eq!(settings.star_price_kopecks, 172);
        assert_eq!(settings.min_stars, 50);
        assert_eq!(settings.max_stars, 500);
    }

    #[test]
    fn update_merges_and_persists() {
        let mut store = SettingsStore::new(MemoryStore::new());
        let updated = store
            .update(SettingsPatch {
                star_price_kopecks: Some(200),
                company_name: Some("IP Petrov P.P.".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.star_price_kopecks, 200);
        assert_eq!(updated.company_name, "IP Petrov P.P.");
        // Untouched fields keep their previous values
        assert_eq!(updated.min_stars, 50);
        assert_eq!(store.get().unwrap(), updated);
    }

    #[test]
    fn quantity_range_is_inclusive() {
        let settings = SiteSettings::default();
        assert!(settings.quantity_in_range(50));
        assert!(settings.quantity_in_range(500));
        assert!(!settings.quantity_in_range(49));
        assert!(!settings.quantity_in_range(501));
    }

    #[test]
    fn secret_key_is_generated_once_and_persisted() {
        let mut access = AdminAccess::new(MemoryStore::new());
        let first = access.secret_key();
        let second = access.secret_key();
        assert_eq!(first, second);
        assert_eq!(first.len(), SECRET_KEY_LEN);
    }

    #[test]
    fn only_the_exact_key_is_authorized() {
        let mut access = AdminAccess::new(MemoryStore::new());
        let key = access.secret_key();
        assert!(access.is_authorized(&key));
        assert!(!access.is_authorized(""));
        assert!(!access.is_authorized(&format!("x{key}")));
        assert!(!access.is_authorized(&format!("{key} ")));
    }
}
