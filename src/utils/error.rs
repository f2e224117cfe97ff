use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Key '{key}' is already registered in '{registry}'")]
    DuplicateKey { registry: String, key: String },

    #[error("Key '{key}' is not registered in '{registry}'")]
    NotFound { registry: String, key: String },

    #[error("Invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Alias '{alias}' conflicts with existing {existing}")]
    AliasConflict { alias: String, existing: String },

    #[error("Type '{type_name}' is not registered")]
    TypeNotRegistered { type_name: String },

    #[error("Stored value does not match type '{type_name}'")]
    TypeMismatch { type_name: String },

    #[error("Factory '{factory}' failed: {message}")]
    FactoryError { factory: String, message: String },

    #[error("Invalid parameters for '{factory}': {source}")]
    InvalidParams {
        factory: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Codec '{codec}' error: {message}")]
    CodecError { codec: String, message: String },

    #[error("Plugin '{plugin}' failed during {stage}: {message}")]
    PluginLifecycle {
        plugin: String,
        stage: String,
        message: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Registration,
    Lookup,
    Plugin,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RegistryError {
    pub fn not_found(registry: &str, key: &str) -> Self {
        Self::NotFound {
            registry: registry.to_string(),
            key: key.to_string(),
        }
    }

    pub fn codec(codec: &str, message: impl Into<String>) -> Self {
        Self::CodecError {
            codec: codec.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateKey { .. } | Self::InvalidKey { .. } | Self::AliasConflict { .. } => {
                ErrorCategory::Registration
            }
            Self::NotFound { .. } | Self::TypeNotRegistered { .. } | Self::TypeMismatch { .. } => {
                ErrorCategory::Lookup
            }
            Self::FactoryError { .. }
            | Self::InvalidParams { .. }
            | Self::PluginLifecycle { .. } => ErrorCategory::Plugin,
            Self::CodecError { .. } | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorCategory::Data
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Lookup | ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Registration | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Plugin => match self {
                Self::PluginLifecycle { .. } => ErrorSeverity::Critical,
                _ => ErrorSeverity::High,
            },
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::DuplicateKey { key, .. } => format!(
                "Rename '{}' or set duplicate_policy = \"replace\" in the manifest",
                key
            ),
            Self::NotFound { .. } => {
                "Run `plugbox list` to see the registered names and aliases".to_string()
            }
            Self::InvalidKey { .. } => {
                "Keys must start with a letter or digit and contain only letters, digits, '_', '.', ':' or '-'"
                    .to_string()
            }
            Self::AliasConflict { .. } => "Choose an alias that is not already in use".to_string(),
            Self::TypeNotRegistered { .. } | Self::TypeMismatch { .. } => {
                "Register the value before looking it up by type".to_string()
            }
            Self::FactoryError { .. } | Self::InvalidParams { .. } => {
                "Check the plugin params in the manifest against the factory description"
                    .to_string()
            }
            Self::CodecError { .. } => {
                "Make sure the input was produced by the same codec and parameters".to_string()
            }
            Self::PluginLifecycle { .. } => {
                "Inspect the plugin logs with --verbose and retry".to_string()
            }
            Self::IoError(_) => "Check that the file exists and is readable/writable".to_string(),
            Self::SerializationError(_) | Self::CsvError(_) => {
                "Report this as a bug together with the command line used".to_string()
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Fix the manifest file and run `plugbox check`".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Registration => format!("Registration failed: {}", self),
            ErrorCategory::Lookup => format!("Lookup failed: {}", self),
            ErrorCategory::Plugin => format!("Plugin error: {}", self),
            ErrorCategory::Data => format!("Data error: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

impl From<toml::de::Error> for RegistryError {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_errors_are_medium_severity() {
        let err = RegistryError::not_found("codecs", "missing");
        assert_eq!(err.category(), ErrorCategory::Lookup);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.to_string().contains("missing"));
        assert!(err.user_friendly_message().starts_with("Lookup failed"));
    }

    #[test]
    fn test_duplicate_suggests_replace_policy() {
        let err = RegistryError::DuplicateKey {
            registry: "codecs".to_string(),
            key: "hex".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("replace"));
    }

    #[test]
    fn test_toml_error_maps_to_configuration() {
        let parse_err = toml::from_str::<toml::Value>("key = ").unwrap_err();
        let err: RegistryError = parse_err.into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }
}
