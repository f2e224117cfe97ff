pub mod factory;
pub mod host;
pub mod multi_registry;
pub mod registry;
pub mod type_registry;

pub use crate::domain::model::{DuplicatePolicy, EntryInfo};
pub use crate::domain::ports::{Codec, Plugin, Storage};
pub use crate::utils::error::Result;
