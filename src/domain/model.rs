use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happens when a key is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// The second registration fails with `DuplicateKey`.
    #[default]
    Reject,
    /// Last registration wins.
    Replace,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// Snapshot of a registry entry without the implementation itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryInfo {
    pub key: String,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub sequence: u64,
}

/// Listing row used by the CLI (entry metadata plus host state).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRow {
    pub name: String,
    pub aliases: String,
    pub description: String,
    pub loaded: bool,
    pub registered_at: String,
}

impl PluginRow {
    pub fn from_entry(info: &EntryInfo, loaded: bool) -> Self {
        Self {
            name: info.key.clone(),
            aliases: info.aliases.join(","),
            description: info.description.clone().unwrap_or_default(),
            loaded,
            registered_at: info.registered_at.to_rfc3339(),
        }
    }
}
