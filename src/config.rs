use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::cli::{Cli, DEFAULT_CONCURRENCY, DEFAULT_FORMAT, DEFAULT_OUTPUT, DEFAULT_TIMEOUT_SECS};
use crate::rules::RulePolicy;

/// Configuration file structure that mirrors CLI arguments
/// All fields are optional to allow partial configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// The URLs to audit
    pub urls: Option<Vec<String>>,

    /// Path of the CSV report
    pub output: Option<String>,

    /// Path of the JSON report
    pub json: Option<String>,

    /// Console summary format: text or json
    pub format: Option<String>,

    /// Report pages without a canonical link as failures
    pub require_canonical: Option<bool>,

    /// Report pages without an og:url meta tag as failures
    pub require_og_url: Option<bool>,

    /// Number of pages loaded at once
    pub concurrency: Option<usize>,

    /// Rate limit for requests per second
    pub rate_limit: Option<f64>,

    /// Page load timeout in seconds
    pub timeout: Option<u64>,

    /// Verbose output
    pub verbose: Option<bool>,
}

/// Configuration file format based on file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "toml" => Some(ConfigFormat::Toml),
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                _ => None,
            })
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            ConfigFormat::Json => &["json"],
            ConfigFormat::Toml => &["toml"],
            ConfigFormat::Yaml => &["yaml", "yml"],
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let format = ConfigFormat::from_path(path)
            .with_context(|| format!("Unsupported config file format: {}", path.display()))?;

        let config = match format {
            ConfigFormat::Json => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            ConfigFormat::Toml => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            ConfigFormat::Yaml => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
        };

        Ok(config)
    }

    /// Get the default configuration file paths to check (in order of priority)
    /// Returns paths in order: current directory, user config directory
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
            for ext in format.extensions() {
                paths.push(PathBuf::from(format!("hreflint.{}", ext)));
            }
        }

        // Use XDG_CONFIG_HOME if set, otherwise fall back to ~/.config
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

        if let Some(config_home) = config_home {
            let config_dir = config_home.join("hreflint");
            for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
                for ext in format.extensions() {
                    paths.push(config_dir.join(format!("config.{}", ext)));
                }
            }
        }

        paths
    }

    /// Try to load configuration from default paths
    /// Returns the first configuration file found, or None if no config exists
    pub fn from_default_paths() -> Result<Option<Self>> {
        for path in Self::default_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                return Ok(Some(Self::from_file(&path)?));
            }
        }
        Ok(None)
    }

    /// Loads the file named by `--config`, or the first default config found,
    /// and merges it under the CLI arguments
    pub fn resolve(cli: &Cli) -> Result<Cli> {
        let config = match &cli.config {
            Some(path) => Some(Self::from_file(Path::new(path))?),
            None => Self::from_default_paths()?,
        };

        Ok(match config {
            Some(config) => config.merge_with_cli(cli),
            None => cli.clone(),
        })
    }

    /// Merge this configuration with CLI arguments
    /// CLI arguments take precedence over config file values
    pub fn merge_with_cli(&self, cli: &Cli) -> Cli {
        Cli {
            urls: if !cli.urls.is_empty() {
                cli.urls.clone()
            } else {
                self.urls.clone().unwrap_or_default()
            },
            output: if cli.output != DEFAULT_OUTPUT {
                cli.output.clone()
            } else {
                self.output.clone().unwrap_or_else(|| cli.output.clone())
            },
            json: cli.json.clone().or_else(|| self.json.clone()),
            format: if cli.format != DEFAULT_FORMAT {
                cli.format.clone()
            } else {
                self.format.clone().unwrap_or_else(|| cli.format.clone())
            },
            require_canonical: if cli.require_canonical {
                cli.require_canonical
            } else {
                self.require_canonical.unwrap_or(cli.require_canonical)
            },
            require_og_url: if cli.require_og_url {
                cli.require_og_url
            } else {
                self.require_og_url.unwrap_or(cli.require_og_url)
            },
            concurrency: if cli.concurrency != DEFAULT_CONCURRENCY {
                cli.concurrency
            } else {
                self.concurrency.unwrap_or(cli.concurrency)
            },
            rate_limit: cli.rate_limit.or(self.rate_limit),
            timeout: if cli.timeout != DEFAULT_TIMEOUT_SECS {
                cli.timeout
            } else {
                self.timeout.unwrap_or(cli.timeout)
            },
            verbose: if cli.verbose {
                cli.verbose
            } else {
                self.verbose.unwrap_or(cli.verbose)
            },
            config: cli.config.clone(),
        }
    }
}

/// Console summary format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Everything a run needs, resolved from CLI and config file
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub urls: Vec<String>,
    pub output: PathBuf,
    pub json_output: Option<PathBuf>,
    pub format: OutputFormat,
    pub policy: RulePolicy,
    pub concurrency: usize,
    pub rate_limit: Option<f64>,
    pub timeout_secs: u64,
    pub verbose: bool,
}

impl TryFrom<Cli> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(cli: Cli) -> Result<Self> {
        if cli.urls.is_empty() {
            bail!("No URLs to audit: pass them as arguments or list them under `urls` in a config file");
        }

        for url in &cli.urls {
            let valid = Url::parse(url)
                .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !valid {
                bail!("URL must start with http:// or https://: {}", url);
            }
        }

        let format = match cli.format.as_str() {
            "text" => OutputFormat::Text,
            "json" => OutputFormat::Json,
            other => bail!("Unknown output format '{}': expected text or json", other),
        };

        if cli.concurrency == 0 {
            bail!("Concurrency must be at least 1");
        }

        if let Some(rate) = cli.rate_limit
            && !(rate.is_finite() && rate > 0.0)
        {
            bail!("Rate limit must be greater than 0, got {}", rate);
        }

        Ok(Self {
            urls: cli.urls,
            output: PathBuf::from(cli.output),
            json_output: cli.json.map(PathBuf::from),
            format,
            policy: RulePolicy {
                require_canonical: cli.require_canonical,
                require_og_url: cli.require_og_url,
            },
            concurrency: cli.concurrency,
            rate_limit: cli.rate_limit,
            timeout_secs: cli.timeout,
            verbose: cli.verbose,
        })
    }
}
