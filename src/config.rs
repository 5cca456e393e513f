use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::period::PeriodSelector;

pub const KEY_DEFAULT_PERIOD: &str = "default_period";
pub const KEY_CURRENCY_SYMBOL: &str = "currency_symbol";

/// Reporting preferences, stored as JSON under `~/.ofmbase/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_period: PeriodSelector,
    pub currency_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_period: PeriodSelector::Monthly,
            currency_symbol: "$".to_string(),
        }
    }
}

impl Config {
    /// Default config location: `~/.ofmbase/config.json`.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".into()))?;
        Ok(home.join(".ofmbase").join("config.json"))
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            KEY_DEFAULT_PERIOD => Ok(self.default_period.to_key().to_string()),
            KEY_CURRENCY_SYMBOL => Ok(self.currency_symbol.clone()),
            _ => Err(Error::Config(format!("unknown config key: {key}"))),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            KEY_DEFAULT_PERIOD => {
                self.default_period = PeriodSelector::parse(value)?;
            }
            KEY_CURRENCY_SYMBOL => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(Error::Config("currency_symbol must not be empty".into()));
                }
                self.currency_symbol = value.to_string();
            }
            _ => return Err(Error::Config(format!("unknown config key: {key}"))),
        }
        Ok(())
    }

    /// All keys with their current values, in a stable order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (KEY_DEFAULT_PERIOD, self.default_period.to_key().to_string()),
            (KEY_CURRENCY_SYMBOL, self.currency_symbol.clone()),
        ]
    }
}
