pub mod adapters;
pub mod app;
pub mod codecs;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::LocalStorage;
pub use app::catalog::Catalog;
pub use config::Manifest;
pub use crate::core::{
    factory::FactoryRegistry, host::PluginHost, multi_registry::MultiRegistry,
    registry::Registry, type_registry::TypeRegistry, Codec, DuplicatePolicy, Plugin,
};
pub use utils::error::{RegistryError, Result};
