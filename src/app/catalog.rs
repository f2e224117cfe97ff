use crate::codecs::{register_builtin_factories, CodecFactories};
use crate::config::manifest::Manifest;
use crate::core::host::PluginHost;
use crate::core::registry::Registry;
use crate::domain::ports::Codec;
use crate::utils::error::Result;
use std::sync::Arc;

/// Codec factories plus the host holding the instances built from a manifest.
pub struct Catalog {
    factories: CodecFactories,
    host: PluginHost<dyn Codec>,
}

impl Catalog {
    pub async fn from_manifest(manifest: &Manifest) -> Result<Self> {
        let factories = CodecFactories::new("codec-factories");
        register_builtin_factories(&factories)?;

        let registry: Registry<Arc<dyn Codec>> = Registry::with_policy(
            manifest.registry.name.as_str(),
            manifest.registry.duplicate_policy,
        );
        let host = PluginHost::new(registry);

        for spec in manifest.enabled_plugins() {
            tracing::debug!("Building '{}' from factory '{}'", spec.name, spec.factory);
            let codec = factories.create(&spec.factory, &spec.name, &spec.params)?;

            // 沒寫描述時沿用工廠的描述
            let description = spec.description.clone().or_else(|| {
                factories
                    .describe(&spec.factory)
                    .ok()
                    .and_then(|info| info.description)
            });
            host.install(codec, &spec.aliases, description.as_deref())
                .await?;
        }

        tracing::info!(
            "📦 Catalog '{}' ready ({}): {} plugin(s), {} factories",
            manifest.registry.name,
            manifest.registry.duplicate_policy,
            host.registry().len(),
            factories.len()
        );
        Ok(Self { factories, host })
    }

    pub async fn builtin() -> Result<Self> {
        Self::from_manifest(&Manifest::builtin()).await
    }

    pub fn factories(&self) -> &CodecFactories {
        &self.factories
    }

    pub fn host(&self) -> &PluginHost<dyn Codec> {
        &self.host
    }

    pub fn codec(&self, name: &str) -> Result<Arc<dyn Codec>> {
        self.host.get(name)
    }

    pub async fn start(&self) -> Result<usize> {
        self.host.start().await
    }

    pub async fn shutdown(&self) -> Result<usize> {
        self.host.shutdown().await
    }
}
