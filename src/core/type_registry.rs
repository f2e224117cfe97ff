//! Registry keyed by Rust type: at most one value per type.

use crate::domain::model::DuplicatePolicy;
use crate::utils::error::{RegistryError, Result};
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

struct TypedSlot {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

pub struct TypeRegistry {
    policy: DuplicatePolicy,
    slots: DashMap<TypeId, TypedSlot>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::Reject)
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            slots: DashMap::new(),
        }
    }

    pub fn register<T: Any + Send + Sync>(&self, value: T) -> Result<()> {
        self.register_arc(Arc::new(value))
    }

    pub fn register_arc<T: Any + Send + Sync>(&self, value: Arc<T>) -> Result<()> {
        let type_name = std::any::type_name::<T>();
        let slot = TypedSlot { type_name, value };

        match self.slots.entry(TypeId::of::<T>()) {
            MapEntry::Occupied(mut occupied) => match self.policy {
                DuplicatePolicy::Reject => Err(RegistryError::DuplicateKey {
                    registry: "types".to_string(),
                    key: type_name.to_string(),
                }),
                DuplicatePolicy::Replace => {
                    tracing::warn!(type_name, "Replacing registered value");
                    occupied.insert(slot);
                    Ok(())
                }
            },
            MapEntry::Vacant(vacant) => {
                vacant.insert(slot);
                tracing::debug!(type_name, "Registered type");
                Ok(())
            }
        }
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        let value = self
            .slots
            .get(&TypeId::of::<T>())
            .map(|slot| Arc::clone(&slot.value))
            .ok_or_else(|| RegistryError::TypeNotRegistered {
                type_name: std::any::type_name::<T>().to_string(),
            })?;
        downcast::<T>(value)
    }

    pub fn unregister<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        let (_, slot) = self.slots.remove(&TypeId::of::<T>()).ok_or_else(|| {
            RegistryError::TypeNotRegistered {
                type_name: std::any::type_name::<T>().to_string(),
            }
        })?;
        downcast::<T>(slot.value)
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<T>())
    }

    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.slots.iter().map(|slot| slot.type_name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast<T: Any + Send + Sync>(value: Arc<dyn Any + Send + Sync>) -> Result<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| RegistryError::TypeMismatch {
            type_name: std::any::type_name::<T>().to_string(),
        })
}
