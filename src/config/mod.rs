#[cfg(feature = "cli")]
pub mod cli;
pub mod manifest;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, CodecArgs, Command};
pub use manifest::{Manifest, PluginSpec, RegistrySection};
