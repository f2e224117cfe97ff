use anyhow::Context;
use clap::Parser;
use plugbox::app::commands;
use plugbox::config::{CodecArgs, Command};
use plugbox::core::Storage;
use plugbox::utils::error::ErrorSeverity;
use plugbox::utils::{logger, validation::Validate};
use plugbox::{Catalog, CliConfig, LocalStorage, Manifest, RegistryError};
use std::io::Write;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting plugbox");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證參數
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        let exit_code = match e.downcast_ref::<RegistryError>() {
            Some(err) => {
                tracing::error!(
                    "❌ plugbox failed: {} (Category: {:?}, Severity: {:?})",
                    err,
                    err.category(),
                    err.severity()
                );
                eprintln!("❌ {}", err.user_friendly_message());
                eprintln!("💡 Suggestion: {}", err.recovery_suggestion());

                // 根據錯誤嚴重程度決定退出碼
                match err.severity() {
                    ErrorSeverity::Low => 0,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                }
            }
            None => {
                tracing::error!("❌ plugbox failed: {:#}", e);
                eprintln!("❌ {:#}", e);
                3
            }
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(config: CliConfig) -> anyhow::Result<()> {
    let manifest = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading manifest from: {}", path);
            Manifest::from_file(path)?
        }
        None => {
            tracing::debug!("No manifest given, using built-in codecs");
            Manifest::builtin()
        }
    };
    manifest.validate()?;

    let catalog = Catalog::from_manifest(&manifest).await?;
    catalog.start().await?;

    let result = execute(&catalog, &config.command).await;
    let shutdown = catalog.shutdown().await;

    result?;
    shutdown?;
    Ok(())
}

async fn execute(catalog: &Catalog, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::List { format } => println!("{}", commands::list(catalog, *format).await?),
        Command::Factories => println!("{}", commands::factories(catalog)),
        Command::Describe { name } => println!("{}", commands::describe(catalog, name).await?),
        Command::Encode(args) => {
            let input = read_input(args).await?;
            let output = commands::encode(catalog, &args.codec, &input)?;
            write_output(args, &output).await?;
        }
        Command::Decode(args) => {
            let input = read_input(args).await?;
            let output = commands::decode(catalog, &args.codec, &input)?;
            write_output(args, &output).await?;
        }
        Command::Check => println!("{}", commands::check(catalog).await),
    }
    Ok(())
}

async fn read_input(args: &CodecArgs) -> anyhow::Result<Vec<u8>> {
    match (&args.input, &args.text) {
        (Some(path), _) => Ok(LocalStorage::new(".".to_string()).read_file(path).await?),
        (None, Some(text)) => Ok(text.as_bytes().to_vec()),
        (None, None) => anyhow::bail!("either --input or --text is required"),
    }
}

async fn write_output(args: &CodecArgs, data: &[u8]) -> anyhow::Result<()> {
    match &args.output {
        Some(path) => {
            LocalStorage::new(".".to_string())
                .write_file(path, data)
                .await?;
            tracing::info!("📁 Output saved to: {}", path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data).context("failed to write to stdout")?;
            stdout.flush().context("failed to flush stdout")?;
        }
    }
    Ok(())
}
