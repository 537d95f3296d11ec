//! In-memory settings provider.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::reservation::ports::{SettingKey, SettingsError, SettingsProvider};

/// Thread-safe in-memory settings provider.
///
/// Absent keys resolve to `None`, letting the config loader apply its
/// documented defaults.
#[derive(Debug, Clone, Default)]
pub struct InMemorySettingsProvider {
    values: Arc<RwLock<HashMap<SettingKey, String>>>,
}

impl InMemorySettingsProvider {
    /// Creates an empty provider; every key falls back to its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one key, replacing any previous value.
    #[must_use]
    pub fn with(self, key: SettingKey, value: impl Into<String>) -> Self {
        if let Ok(mut values) = self.values.write() {
            values.insert(key, value.into());
        }
        self
    }
}

#[async_trait]
impl SettingsProvider for InMemorySettingsProvider {
    async fn get(&self, key: SettingKey) -> Result<Option<String>, SettingsError> {
        let values = self
            .values
            .read()
            .map_err(|err| SettingsError::lookup(std::io::Error::other(err.to_string())))?;
        Ok(values.get(&key).cloned())
    }
}
