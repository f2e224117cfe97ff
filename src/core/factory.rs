//! Named constructors that build fresh instances from JSON parameters.

use crate::core::registry::Registry;
use crate::domain::model::EntryInfo;
use crate::utils::error::{RegistryError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Receives the instance name and its parameters.
pub type Constructor<T> = Arc<dyn Fn(&str, &Value) -> Result<T> + Send + Sync>;

pub struct FactoryRegistry<T> {
    inner: Registry<Constructor<T>>,
}

impl<T> FactoryRegistry<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Registry::new(name),
        }
    }

    pub fn register_factory<F>(&self, name: &str, description: &str, constructor: F) -> Result<()>
    where
        F: Fn(&str, &Value) -> Result<T> + Send + Sync + 'static,
    {
        self.inner
            .register_with_description(name, Arc::new(constructor), description)?;
        Ok(())
    }

    pub fn alias(&self, alias: &str, name: &str) -> Result<()> {
        self.inner.alias(alias, name)
    }

    /// Build a new instance called `instance` with the named factory.
    pub fn create(&self, name: &str, instance: &str, params: &Value) -> Result<T> {
        let constructor = self.inner.get(name)?;
        let factory = self.inner.resolve(name).unwrap_or_else(|| name.to_string());

        tracing::debug!(factory = %factory, instance, "Creating instance");
        constructor(instance, params).map_err(|e| match e {
            // 參數錯誤直接往上拋，保留原始訊息
            RegistryError::InvalidParams { .. } | RegistryError::FactoryError { .. } => e,
            other => RegistryError::FactoryError {
                factory,
                message: other.to_string(),
            },
        })
    }

    pub fn unregister(&self, name: &str) -> Result<()> {
        self.inner.unregister(name).map(|_| ())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.inner.keys()
    }

    pub fn describe(&self, name: &str) -> Result<EntryInfo> {
        self.inner.describe(name)
    }

    pub fn entries(&self) -> Vec<EntryInfo> {
        self.inner.entries()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Decode factory parameters; `null` means "all defaults".
pub fn parse_params<P: DeserializeOwned + Default>(factory: &str, params: &Value) -> Result<P> {
    if params.is_null() {
        return Ok(P::default());
    }
    serde_json::from_value(params.clone()).map_err(|source| RegistryError::InvalidParams {
        factory: factory.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct GreeterParams {
        #[serde(default)]
        greeting: Option<String>,
    }

    fn greeter_factories() -> FactoryRegistry<String> {
        let factories = FactoryRegistry::new("greeters");
        factories
            .register_factory("greeter", "says hello", |_, params| {
                let p: GreeterParams = parse_params("greeter", params)?;
                Ok(p.greeting.unwrap_or_else(|| "hello".to_string()))
            })
            .unwrap();
        factories
            .register_factory("broken", "always fails", |_, _| {
                Err(RegistryError::ConfigError {
                    message: "boom".to_string(),
                })
            })
            .unwrap();
        factories
    }

    #[test]
    fn test_create_with_defaults_and_params() {
        let factories = greeter_factories();
        assert_eq!(factories.create("greeter", "g", &Value::Null).unwrap(), "hello");
        assert_eq!(
            factories
                .create("greeter", "g", &json!({"greeting": "hi"}))
                .unwrap(),
            "hi"
        );
    }

    #[test]
    fn test_each_create_builds_a_new_instance() {
        let factories: FactoryRegistry<Arc<String>> = FactoryRegistry::new("arcs");
        factories
            .register_factory("s", "", |instance, _| Ok(Arc::new(instance.to_string())))
            .unwrap();
        let a = factories.create("s", "first", &Value::Null).unwrap();
        let b = factories.create("s", "second", &Value::Null).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.as_str(), "first");
    }

    #[test]
    fn test_unknown_params_rejected() {
        let factories = greeter_factories();
        let err = factories
            .create("greeter", "g", &json!({"volume": 11}))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidParams { .. }));
    }

    #[test]
    fn test_constructor_failure_names_factory() {
        let factories = greeter_factories();
        factories.alias("fragile", "broken").unwrap();
        let err = factories.create("fragile", "f", &Value::Null).unwrap_err();
        match err {
            RegistryError::FactoryError { factory, message } => {
                assert_eq!(factory, "broken");
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_factory() {
        let factories = greeter_factories();
        assert!(matches!(
            factories.create("nope", "n", &Value::Null),
            Err(RegistryError::NotFound { .. })
        ));
        factories.unregister("greeter").unwrap();
        assert!(!factories.contains("greeter"));
        assert_eq!(factories.names(), vec!["broken"]);
    }
}
