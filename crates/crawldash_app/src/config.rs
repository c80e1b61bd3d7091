//! Operator configuration: an optional RON file overlaid by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use crawldash_core::DEFAULT_PAGE_SIZE;
use crawldash_gateway::DEFAULT_BASE_URL;
use crawldash_logging::{dash_info, LogDestination};
use serde::Deserialize;

pub(crate) const CONFIG_FILENAME: &str = "crawldash.ron";

/// On-disk shape of `crawldash.ron`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    api_url: Option<String>,
    page_size: Option<usize>,
    log: Option<String>,
    verbose: Option<bool>,
}

/// Values given on the command line; `None` leaves the file value in place.
#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub api_url: Option<String>,
    pub page_size: Option<usize>,
    pub log: Option<LogDestination>,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AppConfig {
    pub api_url: String,
    pub page_size: usize,
    pub log: LogDestination,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            log: LogDestination::default(),
            verbose: false,
        }
    }
}

impl AppConfig {
    /// Load `explicit` if given, otherwise `crawldash.ron` in `cwd` when it exists,
    /// then apply `overrides`.
    pub fn load(explicit: Option<&Path>, cwd: &Path, overrides: Overrides) -> Result<Self> {
        let file = match explicit {
            Some(path) => Some(read_file(path)?),
            None => {
                let path = cwd.join(CONFIG_FILENAME);
                if path.is_file() {
                    Some(read_file(&path)?)
                } else {
                    None
                }
            }
        };

        let mut config = AppConfig::default();
        if let Some(file) = file {
            config.apply_file(file)?;
        }
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) -> Result<()> {
        if let Some(api_url) = file.api_url {
            self.api_url = api_url;
        }
        if let Some(page_size) = file.page_size {
            self.page_size = page_size;
        }
        if let Some(log) = file.log {
            self.log = log
                .parse()
                .with_context(|| format!("invalid `log` value in config: {log}"))?;
        }
        if let Some(verbose) = file.verbose {
            self.verbose = verbose;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(api_url) = overrides.api_url {
            self.api_url = api_url;
        }
        if let Some(page_size) = overrides.page_size {
            self.page_size = page_size;
        }
        if let Some(log) = overrides.log {
            self.log = log;
        }
        self.verbose |= overrides.verbose;
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        if self.api_url.trim().is_empty() {
            bail!("api_url must not be empty");
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<ConfigFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let file = parse(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    dash_info!("Loaded configuration from {:?}", PathBuf::from(path));
    Ok(file)
}

fn parse(text: &str) -> Result<ConfigFile> {
    Ok(ron::from_str(text)?)
}
