use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// A component managed by a `PluginHost`.
///
/// Hooks default to no-ops so simple plugins only need a name.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    async fn on_load(&self) -> Result<()> {
        Ok(())
    }

    async fn on_unload(&self) -> Result<()> {
        Ok(())
    }
}

pub trait Codec: Plugin {
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>>;
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>>;
}
