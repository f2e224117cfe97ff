use crate::app::commands::OutputFormat;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extension, validate_path, Validate};
use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "plugbox")]
#[command(about = "Inspect a plugin registry and run its codecs")]
pub struct CliConfig {
    /// Path to a TOML plugin manifest (built-in codecs when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List installed plugins
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List available factories
    Factories,
    /// Show one plugin by name or alias
    Describe { name: String },
    /// Encode input with a codec
    Encode(CodecArgs),
    /// Decode input with a codec
    Decode(CodecArgs),
    /// Validate the manifest and start every plugin
    Check,
}

#[derive(Debug, Clone, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["input", "text"])))]
pub struct CodecArgs {
    /// Codec name or alias
    #[arg(long)]
    pub codec: String,

    /// Read input from this file
    #[arg(short, long)]
    pub input: Option<String>,

    /// Use this string as input
    #[arg(long)]
    pub text: Option<String>,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(config) = &self.config {
            validate_path("config", config)?;
            validate_file_extension("config", config, &["toml"])?;
        }

        if let Command::Encode(args) | Command::Decode(args) = &self.command {
            if let Some(input) = &args.input {
                validate_path("input", input)?;
            }
            if let Some(output) = &args.output {
                validate_path("output", output)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encode_command() {
        let config = CliConfig::try_parse_from([
            "plugbox", "--config", "plugins.toml", "encode", "--codec", "hex", "--text", "hi",
        ])
        .unwrap();
        assert_eq!(config.config.as_deref(), Some("plugins.toml"));
        match &config.command {
            Command::Encode(args) => {
                assert_eq!(args.codec, "hex");
                assert_eq!(args.text.as_deref(), Some("hi"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_codec_requires_one_source() {
        assert!(CliConfig::try_parse_from(["plugbox", "decode", "--codec", "hex"]).is_err());
        assert!(CliConfig::try_parse_from([
            "plugbox", "decode", "--codec", "hex", "--text", "a", "--input", "f"
        ])
        .is_err());
    }

    #[test]
    fn test_list_format() {
        let config = CliConfig::try_parse_from(["plugbox", "list", "--format", "csv"]).unwrap();
        assert!(matches!(
            config.command,
            Command::List {
                format: OutputFormat::Csv
            }
        ));
    }

    #[test]
    fn test_rejects_non_toml_config() {
        let config =
            CliConfig::try_parse_from(["plugbox", "--config", "plugins.yaml", "check"]).unwrap();
        assert!(config.validate().is_err());
    }
}
