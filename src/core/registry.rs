//! String-keyed registry.
//!
//! Maps a key to an implementation handle (usually an `Arc<dyn Trait>` or a
//! constructor). A registry is an ordinary value: build it where the
//! application starts and pass it by reference or `Arc` to whatever needs it.

use crate::domain::model::{DuplicatePolicy, EntryInfo};
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::validate_key;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
struct Slot<V> {
    value: V,
    description: Option<String>,
    registered_at: DateTime<Utc>,
    sequence: u64,
}

/// Concurrent key → implementation map with aliases.
///
/// All methods take `&self`; the maps are sharded so lookups from many
/// threads do not serialize on a single lock. Changes that touch both keys
/// and aliases go through `writes` one at a time.
pub struct Registry<V> {
    name: String,
    policy: DuplicatePolicy,
    entries: DashMap<String, Slot<V>>,
    aliases: DashMap<String, String>,
    next_sequence: AtomicU64,
    writes: Mutex<()>,
}

impl<V: Clone> Registry<V> {
    /// Create an empty registry that rejects duplicate keys.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_policy(name, DuplicatePolicy::Reject)
    }

    pub fn with_policy(name: impl Into<String>, policy: DuplicatePolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            entries: DashMap::new(),
            aliases: DashMap::new(),
            next_sequence: AtomicU64::new(0),
            writes: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Register `value` under `key`.
    ///
    /// Returns the replaced implementation when the policy is `Replace` and
    /// the key was already present. A name taken by an alias is never
    /// overwritten, whatever the policy.
    pub fn register(&self, key: &str, value: V) -> Result<Option<V>> {
        self.insert(key, value, None)
    }

    pub fn register_with_description(
        &self,
        key: &str,
        value: V,
        description: impl Into<String>,
    ) -> Result<Option<V>> {
        self.insert(key, value, Some(description.into()))
    }

    fn insert(&self, key: &str, value: V, description: Option<String>) -> Result<Option<V>> {
        validate_key(key)?;
        let _writes = self.writes.lock();

        if self.aliases.contains_key(key) {
            return Err(RegistryError::DuplicateKey {
                registry: self.name.clone(),
                key: key.to_string(),
            });
        }

        match self.entries.entry(key.to_string()) {
            MapEntry::Occupied(mut occupied) => match self.policy {
                DuplicatePolicy::Reject => Err(RegistryError::DuplicateKey {
                    registry: self.name.clone(),
                    key: key.to_string(),
                }),
                DuplicatePolicy::Replace => {
                    tracing::warn!(registry = %self.name, key, "Replacing existing registration");
                    // 保留原本的註冊順序
                    let slot = Slot {
                        value,
                        description,
                        registered_at: Utc::now(),
                        sequence: occupied.get().sequence,
                    };
                    let previous = std::mem::replace(occupied.get_mut(), slot);
                    Ok(Some(previous.value))
                }
            },
            MapEntry::Vacant(vacant) => {
                vacant.insert(Slot {
                    value,
                    description,
                    registered_at: Utc::now(),
                    sequence: self.next_sequence.fetch_add(1, Ordering::Relaxed),
                });
                tracing::debug!(registry = %self.name, key, "Registered");
                Ok(None)
            }
        }
    }

    /// Canonical key for `name`, following an alias if needed.
    pub fn resolve(&self, name: &str) -> Option<String> {
        if self.entries.contains_key(name) {
            return Some(name.to_string());
        }
        let target = self.aliases.get(name).map(|t| t.value().clone())?;
        self.entries.contains_key(&target).then_some(target)
    }

    pub fn find(&self, name: &str) -> Option<V> {
        let key = self.resolve(name)?;
        self.entries.get(&key).map(|slot| slot.value.clone())
    }

    /// Look up an implementation by key or alias.
    pub fn get(&self, name: &str) -> Result<V> {
        self.find(name)
            .ok_or_else(|| RegistryError::not_found(&self.name, name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Remove a mapping (by key or alias) together with its aliases.
    pub fn unregister(&self, name: &str) -> Result<V> {
        let _writes = self.writes.lock();
        let key = self
            .resolve(name)
            .ok_or_else(|| RegistryError::not_found(&self.name, name))?;
        let (_, slot) = self
            .entries
            .remove(&key)
            .ok_or_else(|| RegistryError::not_found(&self.name, name))?;
        self.aliases.retain(|_, target| target != &key);

        tracing::debug!(registry = %self.name, key = %key, "Unregistered");
        Ok(slot.value)
    }

    /// Add `alias` as another name for `key`.
    ///
    /// Aliasing an alias points at the canonical key. Re-adding the same
    /// alias for the same target is a no-op.
    pub fn alias(&self, alias: &str, key: &str) -> Result<()> {
        validate_key(alias)?;
        let _writes = self.writes.lock();
        let target = self
            .resolve(key)
            .ok_or_else(|| RegistryError::not_found(&self.name, key))?;

        self.ensure_alias_free(alias, &target)?;
        self.aliases.insert(alias.to_string(), target);
        Ok(())
    }

    /// Whether `alias` could be added for `key` right now, without adding it.
    ///
    /// `key` does not have to be registered yet.
    pub fn check_alias(&self, alias: &str, key: &str) -> Result<()> {
        validate_key(alias)?;
        let target = self.resolve(key).unwrap_or_else(|| key.to_string());
        self.ensure_alias_free(alias, &target)
    }

    fn ensure_alias_free(&self, alias: &str, target: &str) -> Result<()> {
        if alias == target || self.entries.contains_key(alias) {
            return Err(RegistryError::AliasConflict {
                alias: alias.to_string(),
                existing: format!("key '{}'", alias),
            });
        }
        match self.aliases.get(alias) {
            Some(existing) if existing.value() != target => Err(RegistryError::AliasConflict {
                alias: alias.to_string(),
                existing: format!("alias for '{}'", existing.value()),
            }),
            _ => Ok(()),
        }
    }

    pub fn aliases_of(&self, key: &str) -> Vec<String> {
        let mut aliases: Vec<String> = self
            .aliases
            .iter()
            .filter(|pair| pair.value() == key)
            .map(|pair| pair.key().clone())
            .collect();
        aliases.sort();
        aliases
    }

    /// Keys in registration order.
    pub fn keys(&self) -> Vec<String> {
        self.values().into_iter().map(|(key, _)| key).collect()
    }

    /// `(key, implementation)` pairs in registration order.
    pub fn values(&self) -> Vec<(String, V)> {
        let mut pairs: Vec<(u64, String, V)> = self
            .entries
            .iter()
            .map(|slot| (slot.sequence, slot.key().clone(), slot.value.clone()))
            .collect();
        pairs.sort_by_key(|(sequence, _, _)| *sequence);
        pairs.into_iter().map(|(_, key, value)| (key, value)).collect()
    }

    /// Metadata snapshot in registration order.
    pub fn entries(&self) -> Vec<EntryInfo> {
        let mut aliases: HashMap<String, Vec<String>> = HashMap::new();
        for pair in self.aliases.iter() {
            aliases
                .entry(pair.value().clone())
                .or_default()
                .push(pair.key().clone());
        }

        let mut infos: Vec<EntryInfo> = self
            .entries
            .iter()
            .map(|slot| {
                let mut entry_aliases = aliases.remove(slot.key()).unwrap_or_default();
                entry_aliases.sort();
                EntryInfo {
                    key: slot.key().clone(),
                    aliases: entry_aliases,
                    description: slot.description.clone(),
                    registered_at: slot.registered_at,
                    sequence: slot.sequence,
                }
            })
            .collect();
        infos.sort_by_key(|info| info.sequence);
        infos
    }

    pub fn describe(&self, name: &str) -> Result<EntryInfo> {
        let key = self
            .resolve(name)
            .ok_or_else(|| RegistryError::not_found(&self.name, name))?;
        self.entries()
            .into_iter()
            .find(|info| info.key == key)
            .ok_or_else(|| RegistryError::not_found(&self.name, name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        let _writes = self.writes.lock();
        self.entries.clear();
        self.aliases.clear();
    }
}
