// Key/value persistence of user-owned draft data.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::names::NameOverrides;
use crate::tiers::TierList;

/// Storage key for the tier ranking.
pub const TIER_LIST_KEY: &str = "tierListData";

/// Storage key for display-name overrides.
pub const CUSTOM_NAMES_KEY: &str = "customPlayerNames";

/// A string-keyed store of JSON documents.
pub trait StateStore {
    fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>>;
    fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()>;
}

/// Process-local store, used by tests and when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let entries = self.entries.lock().expect("memory store mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let mut entries = self.entries.lock().expect("memory store mutex poisoned");
        entries.insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// Load the saved tier ranking, repaired against `catalog`.
///
/// Returns `None` when nothing is saved. A stored value that no longer
/// parses is logged and treated as absent.
pub fn load_tier_list(store: &dyn StateStore, catalog: &Catalog) -> Result<Option<TierList>> {
    let Some(value) = store
        .load_state(TIER_LIST_KEY)
        .context("failed to load tier list")?
    else {
        return Ok(None);
    };

    let mut list: TierList = match serde_json::from_value(value) {
        Ok(list) => list,
        Err(e) => {
            warn!("Discarding unreadable tier list: {e}");
            return Ok(None);
        }
    };
    if list.normalize(catalog) {
        info!("Saved tier list repaired against the current roster");
    }
    Ok(Some(list))
}

pub fn save_tier_list(store: &dyn StateStore, list: &TierList) -> Result<()> {
    let value = serde_json::to_value(list).context("failed to serialize tier list")?;
    store
        .save_state(TIER_LIST_KEY, &value)
        .context("failed to save tier list")
}

/// Load saved name overrides; empty when nothing is saved or unreadable.
pub fn load_name_overrides(store: &dyn StateStore) -> Result<NameOverrides> {
    let Some(value) = store
        .load_state(CUSTOM_NAMES_KEY)
        .context("failed to load custom player names")?
    else {
        return Ok(NameOverrides::default());
    };
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Discarding unreadable custom player names: {e}");
        NameOverrides::default()
    }))
}

pub fn save_name_overrides(store: &dyn StateStore, names: &NameOverrides) -> Result<()> {
    let value = serde_json::to_value(names).context("failed to serialize custom player names")?;
    store
        .save_state(CUSTOM_NAMES_KEY, &value)
        .context("failed to save custom player names")
}
