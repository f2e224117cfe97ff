use crate::codecs::BUILTIN_CODECS;
use crate::domain::model::DuplicatePolicy;
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::{validate_key, validate_non_empty_string, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub plugins: Vec<PluginSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySection {
    #[serde(default = "default_registry_name")]
    pub name: String,
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            name: default_registry_name(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSpec {
    pub name: String,
    pub factory: String,
    pub description: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub params: serde_json::Value,
}

fn default_registry_name() -> String {
    "codecs".to_string()
}

fn default_enabled() -> bool {
    true
}

impl Manifest {
    /// 從 TOML 檔案載入
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${CODEC_KEY})，找不到的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Every built-in codec under its own name, default params and aliases.
    pub fn builtin() -> Self {
        let plugins = BUILTIN_CODECS
            .iter()
            .map(|(name, description, aliases)| PluginSpec {
                name: name.to_string(),
                factory: name.to_string(),
                description: Some(description.to_string()),
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
                enabled: true,
                // xor 沒有預設金鑰
                params: if *name == "xor" {
                    serde_json::json!({ "key": 0x5a })
                } else {
                    serde_json::Value::Null
                },
            })
            .collect();

        Self {
            registry: RegistrySection::default(),
            plugins,
        }
    }

    pub fn enabled_plugins(&self) -> impl Iterator<Item = &PluginSpec> {
        self.plugins.iter().filter(|p| p.enabled)
    }
}

impl Validate for Manifest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("registry.name", &self.registry.name)?;

        let mut names: HashMap<&str, usize> = HashMap::new();
        let mut aliases: HashMap<&str, &str> = HashMap::new();

        for (index, plugin) in self.plugins.iter().enumerate().filter(|(_, p)| p.enabled) {
            validate_key(&plugin.name).map_err(|e| field_error(index, "name", e))?;
            validate_key(&plugin.factory).map_err(|e| field_error(index, "factory", e))?;

            if let Some(previous) = names.insert(&plugin.name, index) {
                if self.registry.duplicate_policy == DuplicatePolicy::Reject {
                    return Err(RegistryError::ConfigValidationError {
                        field: format!("plugins[{}].name", index),
                        message: format!(
                            "'{}' is already used by plugins[{}] and duplicate_policy is reject",
                            plugin.name, previous
                        ),
                    });
                }
            }

            for alias in &plugin.aliases {
                validate_key(alias).map_err(|e| field_error(index, "aliases", e))?;
                if alias == &plugin.name {
                    return Err(RegistryError::InvalidConfigValueError {
                        field: format!("plugins[{}].aliases", index),
                        value: alias.clone(),
                        reason: "Alias repeats the plugin name".to_string(),
                    });
                }
                if let Some(owner) = aliases.insert(alias, &plugin.name) {
                    if owner != plugin.name {
                        return Err(RegistryError::InvalidConfigValueError {
                            field: format!("plugins[{}].aliases", index),
                            value: alias.clone(),
                            reason: format!("Alias already used by '{}'", owner),
                        });
                    }
                }
            }
        }

        for (alias, _) in aliases.iter() {
            if names.contains_key(alias) {
                return Err(RegistryError::InvalidConfigValueError {
                    field: "plugins.aliases".to_string(),
                    value: alias.to_string(),
                    reason: "Alias shadows a plugin name".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn field_error(index: usize, field: &str, error: RegistryError) -> RegistryError {
    RegistryError::ConfigValidationError {
        field: format!("plugins[{}].{}", index, field),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[registry]
name = "media"
duplicate_policy = "replace"

[[plugins]]
name = "hex-upper"
factory = "hex"
description = "uppercase hex"
aliases = ["HEX"]
params = { uppercase = true }

[[plugins]]
name = "squash"
factory = "rle"
enabled = false
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_toml_str(SAMPLE).unwrap();
        assert_eq!(manifest.registry.name, "media");
        assert_eq!(manifest.registry.duplicate_policy, DuplicatePolicy::Replace);
        assert_eq!(manifest.plugins.len(), 2);
        assert_eq!(manifest.plugins[0].params["uppercase"], serde_json::json!(true));
        assert!(manifest.plugins[1].params.is_null());
        assert_eq!(manifest.enabled_plugins().count(), 1);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_empty_manifest() {
        let manifest = Manifest::from_toml_str("").unwrap();
        assert_eq!(manifest.registry.name, "codecs");
        assert_eq!(manifest.registry.duplicate_policy, DuplicatePolicy::Reject);
        assert!(manifest.plugins.is_empty());
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let err =
            Manifest::from_toml_str("[registry]\nduplicate_policy = \"ignore\"\n").unwrap_err();
        assert!(matches!(err, RegistryError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("PLUGBOX_TEST_REGISTRY", "from-env");
        let manifest =
            Manifest::from_toml_str("[registry]\nname = \"${PLUGBOX_TEST_REGISTRY}\"\n").unwrap();
        assert_eq!(manifest.registry.name, "from-env");

        let untouched =
            Manifest::from_toml_str("[registry]\nname = \"${PLUGBOX_TEST_UNSET_VAR}\"\n").unwrap();
        assert_eq!(untouched.registry.name, "${PLUGBOX_TEST_UNSET_VAR}");
    }

    #[test]
    fn test_duplicate_names_rejected_under_reject_policy() {
        let toml = r#"
[[plugins]]
name = "a"
factory = "raw"

[[plugins]]
name = "a"
factory = "hex"
"#;
        let manifest = Manifest::from_toml_str(toml).unwrap();
        assert!(matches!(
            manifest.validate(),
            Err(RegistryError::ConfigValidationError { .. })
        ));

        let replace = format!("[registry]\nduplicate_policy = \"replace\"\n{}", toml);
        assert!(Manifest::from_toml_str(&replace).unwrap().validate().is_ok());
    }

    #[test]
    fn test_alias_conflicts_rejected() {
        let toml = r#"
[[plugins]]
name = "a"
factory = "raw"
aliases = ["b"]

[[plugins]]
name = "b"
factory = "hex"
"#;
        let manifest = Manifest::from_toml_str(toml).unwrap();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_invalid_plugin_name() {
        let manifest =
            Manifest::from_toml_str("[[plugins]]\nname = \"bad name\"\nfactory = \"raw\"\n")
                .unwrap();
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("plugins[0].name"));
    }

    #[test]
    fn test_builtin_manifest_is_valid() {
        let manifest = Manifest::builtin();
        assert_eq!(manifest.plugins.len(), BUILTIN_CODECS.len());
        assert!(manifest.validate().is_ok());
    }
}
