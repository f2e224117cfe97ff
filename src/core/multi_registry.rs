//! One key, several implementations (e.g. `rpm` → yum, dnf).

use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::validate_key;
use dashmap::DashMap;

pub struct MultiRegistry<V> {
    name: String,
    entries: DashMap<String, Vec<V>>,
}

impl<V: Clone> MultiRegistry<V> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an implementation under `key`. Never fails on duplicates.
    pub fn register(&self, key: &str, value: V) -> Result<()> {
        validate_key(key)?;
        let mut values = self.entries.entry(key.to_string()).or_default();
        values.push(value);
        tracing::debug!(registry = %self.name, key, count = values.len(), "Registered");
        Ok(())
    }

    /// All implementations for `key`, in registration order.
    pub fn get_all(&self, key: &str) -> Result<Vec<V>> {
        self.entries
            .get(key)
            .map(|values| values.value().clone())
            .filter(|values| !values.is_empty())
            .ok_or_else(|| RegistryError::not_found(&self.name, key))
    }

    pub fn first(&self, key: &str) -> Result<V> {
        self.entries
            .get(key)
            .and_then(|values| values.first().cloned())
            .ok_or_else(|| RegistryError::not_found(&self.name, key))
    }

    /// First implementation under `key` that satisfies `predicate`,
    /// e.g. the first package manager actually installed on the host.
    pub fn find_first<F>(&self, key: &str, predicate: F) -> Result<V>
    where
        F: Fn(&V) -> bool,
    {
        let values = self.get_all(key)?;
        values
            .into_iter()
            .find(|value| predicate(value))
            .ok_or_else(|| RegistryError::not_found(&self.name, key))
    }

    pub fn unregister(&self, key: &str) -> Result<Vec<V>> {
        let (_, values) = self
            .entries
            .remove(key)
            .ok_or_else(|| RegistryError::not_found(&self.name, key))?;
        tracing::debug!(registry = %self.name, key, count = values.len(), "Unregistered");
        Ok(values)
    }

    pub fn count(&self, key: &str) -> usize {
        self.entries.get(key).map(|values| values.len()).unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.count(key) > 0
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
