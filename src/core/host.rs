use crate::core::registry::Registry;
use crate::domain::ports::Plugin;
use crate::utils::error::{RegistryError, Result};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Owns a plugin registry and drives the load/unload lifecycle.
///
/// Plugins are loaded in registration order and unloaded in reverse. The
/// host keeps the instances it loaded, so unloading reaches them even if
/// the registry entry was removed or replaced in the meantime.
pub struct PluginHost<P: ?Sized + Plugin> {
    registry: Registry<Arc<P>>,
    loaded: Mutex<Vec<(String, Arc<P>)>>,
}

impl<P: ?Sized + Plugin> PluginHost<P> {
    pub fn new(registry: Registry<Arc<P>>) -> Self {
        Self {
            registry,
            loaded: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &Registry<Arc<P>> {
        &self.registry
    }

    /// Register a plugin under its own name plus `aliases`.
    ///
    /// Aliases are checked before anything is registered. If a loaded plugin
    /// gets replaced, the old instance is unloaded once the new one is in.
    pub async fn install(
        &self,
        plugin: Arc<P>,
        aliases: &[String],
        description: Option<&str>,
    ) -> Result<()> {
        let name = plugin.name().to_string();
        for alias in aliases {
            self.registry.check_alias(alias, &name)?;
        }

        let previous = match description {
            Some(description) => self
                .registry
                .register_with_description(&name, plugin, description)?,
            None => self.registry.register(&name, plugin)?,
        };

        for alias in aliases {
            if let Err(e) = self.registry.alias(alias, &name) {
                // 別名在檢查後被搶走，還原註冊
                match previous {
                    Some(previous) => {
                        self.registry.register(&name, previous)?;
                    }
                    None => {
                        self.registry.unregister(&name)?;
                    }
                }
                return Err(e);
            }
        }

        if previous.is_some() {
            let mut loaded = self.loaded.lock().await;
            if let Some(pos) = loaded.iter().position(|(n, _)| n == &name) {
                let (_, old) = loaded.remove(pos);
                if let Err(e) = old.on_unload().await {
                    tracing::warn!("⚠️ Replaced plugin '{}' failed to unload: {}", name, e);
                }
            }
        }

        tracing::debug!("Installed plugin '{}' (aliases: {:?})", name, aliases);
        Ok(())
    }

    /// Load every installed plugin that is not loaded yet.
    ///
    /// On failure, plugins loaded by this call are unloaded again in
    /// reverse order before the error is returned.
    pub async fn start(&self) -> Result<usize> {
        let mut loaded = self.loaded.lock().await;
        let mut started: Vec<(String, Arc<P>)> = Vec::new();

        for (name, plugin) in self.registry.values() {
            if loaded.iter().any(|(n, _)| n == &name) {
                continue;
            }

            tracing::debug!("Loading plugin '{}'", name);
            if let Err(e) = plugin.on_load().await {
                tracing::error!("❌ Plugin '{}' failed to load: {}", name, e);

                // 回滾本次已載入的外掛
                for (started_name, started_plugin) in started.iter().rev() {
                    if let Err(unload_err) = started_plugin.on_unload().await {
                        tracing::warn!(
                            "⚠️ Rollback unload of '{}' failed: {}",
                            started_name,
                            unload_err
                        );
                    }
                    loaded.retain(|(n, _)| n != started_name);
                }

                return Err(RegistryError::PluginLifecycle {
                    plugin: name,
                    stage: "load".to_string(),
                    message: e.to_string(),
                });
            }

            loaded.push((name.clone(), Arc::clone(&plugin)));
            started.push((name, plugin));
        }

        tracing::info!("🔌 Loaded {} plugin(s) from '{}'", started.len(), self.registry.name());
        Ok(started.len())
    }

    /// Unload all loaded plugins in reverse order.
    ///
    /// Keeps going past failing hooks and returns the first failure.
    pub async fn shutdown(&self) -> Result<usize> {
        let mut loaded = self.loaded.lock().await;
        let mut first_error = None;
        let mut unloaded = 0;

        while let Some((name, plugin)) = loaded.pop() {
            match plugin.on_unload().await {
                Ok(()) => unloaded += 1,
                Err(e) => {
                    tracing::warn!("⚠️ Plugin '{}' failed to unload: {}", name, e);
                    first_error.get_or_insert(RegistryError::PluginLifecycle {
                        plugin: name,
                        stage: "unload".to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!("🔌 Unloaded {} plugin(s) from '{}'", unloaded, self.registry.name());
        match first_error {
            Some(e) => Err(e),
            None => Ok(unloaded),
        }
    }

    /// Unload (if needed) and remove a plugin.
    pub async fn uninstall(&self, name: &str) -> Result<Arc<P>> {
        let key = self
            .registry
            .resolve(name)
            .ok_or_else(|| RegistryError::not_found(self.registry.name(), name))?;

        let mut loaded = self.loaded.lock().await;
        if let Some(pos) = loaded.iter().position(|(n, _)| n == &key) {
            loaded[pos]
                .1
                .on_unload()
                .await
                .map_err(|e| RegistryError::PluginLifecycle {
                    plugin: key.clone(),
                    stage: "unload".to_string(),
                    message: e.to_string(),
                })?;
            loaded.remove(pos);
        }

        self.registry.unregister(&key)
    }

    pub fn get(&self, name: &str) -> Result<Arc<P>> {
        self.registry.get(name)
    }

    pub async fn is_loaded(&self, name: &str) -> bool {
        let key = self.registry.resolve(name).unwrap_or_else(|| name.to_string());
        self.loaded.lock().await.iter().any(|(n, _)| n == &key)
    }

    /// Names of the loaded plugins, in load order.
    pub async fn loaded(&self) -> Vec<String> {
        self.loaded
            .lock()
            .await
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}
