//! The `landmark config` command for configuration management.

use clap::{Args, Subcommand};
use landmark_core::{Config, Language};
use std::path::Path;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Resolve every service endpoint and report what is missing
    Check,

    /// Set a preference in the config file (comments are preserved)
    ///
    /// Supported keys: translation.enabled, translation.target_language,
    /// logging.level, logging.format
    Set {
        /// Dotted key, e.g. translation.target_language
        key: String,
        /// New value
        value: String,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs, config: Config) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let toml = Config::default().to_toml()?;
            std::fs::write(&path, toml)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::Check => {
            let services = config.services()?;
            println!("classifier   {}", services.classifier.url);
            println!("  key        {}", mask(&services.classifier.prediction_key));
            println!("generator    {}", services.generator.url);
            println!("  key        {}", mask(&services.generator.api_key));
            println!("translator   {}/translate", services.translator.base_url.trim_end_matches('/'));
            println!("  key        {}", mask(&services.translator.key));
            println!("  region     {}", services.translator.region);
            println!(
                "translation  {} (target: {})",
                if config.translation.enabled { "on" } else { "off" },
                config.translation.target_language
            );
        }

        ConfigCommand::Set { key, value } => {
            let path = Config::default_path();
            write_setting(&path, &key, &value)?;
            println!("Set {key} = {value} in {}", path.display());
        }
    }

    Ok(())
}

/// Show only the last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

/// Update one supported key in the config file at `path`, creating it if needed.
pub(crate) fn write_setting(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };

    let updated = apply_setting(&content, key, value)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, updated)?;
    Ok(())
}

/// Apply one setting to TOML source text, keeping everything else intact.
fn apply_setting(content: &str, key: &str, value: &str) -> anyhow::Result<String> {
    let mut doc: toml_edit::DocumentMut = content.parse()?;

    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| anyhow::anyhow!("Key must look like section.field, got '{key}'"))?;

    let item = match (section, field) {
        ("translation", "enabled") => {
            let enabled: bool = value
                .parse()
                .map_err(|_| anyhow::anyhow!("translation.enabled must be true or false"))?;
            toml_edit::value(enabled)
        }
        ("translation", "target_language") => {
            let language: Language = value.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            toml_edit::value(language.code())
        }
        ("logging", "level") => {
            let level = value.to_ascii_lowercase();
            if !matches!(level.as_str(), "error" | "warn" | "info" | "debug" | "trace") {
                anyhow::bail!("logging.level must be one of error, warn, info, debug, trace");
            }
            toml_edit::value(level)
        }
        ("logging", "format") => {
            if !matches!(value, "pretty" | "json") {
                anyhow::bail!("logging.format must be pretty or json");
            }
            toml_edit::value(value)
        }
        _ => anyhow::bail!("Unsupported key '{key}'. Edit the config file directly for service settings."),
    };

    match doc.get(section).map(toml_edit::Item::is_table_like) {
        None => doc[section] = toml_edit::Item::Table(toml_edit::Table::new()),
        Some(true) => {}
        Some(false) => anyhow::bail!(
            "'{section}' in the config file is not a table; fix it before setting {key}"
        ),
    }
    doc[section][field] = item;

    Ok(doc.to_string())
}
