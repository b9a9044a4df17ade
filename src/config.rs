use crate::dashboard::ChartPanel;
use crate::errors::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default = "default_assets")]
    pub assets: BTreeMap<String, AssetParams>,
    #[serde(default = "default_charts")]
    pub charts: Vec<ChartConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_update_interval")]
    pub update_interval_seconds: u64,
    #[serde(default = "default_timeframe")]
    pub default_timeframe: String,
    /// Fixed RNG seed, either a number or `${ENV_VAR}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            update_interval_seconds: default_update_interval(),
            default_timeframe: default_timeframe(),
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AssetParams {
    pub current_price: f64,
    pub volatility: f64,
    pub mean_reversion: f64,
}

impl AssetParams {
    pub fn is_valid(&self) -> bool {
        self.current_price.is_finite()
            && self.current_price > 0.0
            && self.volatility.is_finite()
            && self.volatility >= 0.0
            && self.mean_reversion.is_finite()
            && self.mean_reversion >= 0.0
    }
}

/// One `[[charts]]` entry: either `asset`, or `numerator` + `denominator`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numerator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denominator: Option<String>,
}

impl ChartConfig {
    fn asset(id: &str, title: &str, color: &str, symbol: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            color: color.to_string(),
            asset: Some(symbol.to_string()),
            numerator: None,
            denominator: None,
        }
    }

    fn ratio(id: &str, title: &str, color: &str, numerator: &str, denominator: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            color: color.to_string(),
            asset: None,
            numerator: Some(numerator.to_string()),
            denominator: Some(denominator.to_string()),
        }
    }

    pub fn to_panel(&self) -> Result<ChartPanel> {
        match (&self.asset, &self.numerator, &self.denominator) {
            (Some(symbol), None, None) => Ok(ChartPanel::asset(
                &self.id,
                &self.title,
                &self.color,
                symbol,
            )),
            (None, Some(numerator), Some(denominator)) => Ok(ChartPanel::ratio(
                &self.id,
                &self.title,
                &self.color,
                numerator,
                denominator,
            )),
            _ => Err(DashboardError::ConfigError(format!(
                "Chart '{}' must set either 'asset' or both 'numerator' and 'denominator'",
                self.id
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn default_update_interval() -> u64 {
    20
}

fn default_timeframe() -> String {
    "3d".to_string()
}

fn default_color() -> String {
    "#1f77b4".to_string()
}

fn default_assets() -> BTreeMap<String, AssetParams> {
    [
        ("Gold", 3330.0, 0.008, 0.02),
        ("Silver", 35.9, 0.015, 0.03),
        ("TSLA", 324.0, 0.025, 0.01),
        ("Bitcoin", 107000.0, 0.03, 0.015),
        ("Ethereum", 2400.0, 0.035, 0.02),
        ("XRP", 2.18, 0.025, 0.02),
    ]
    .into_iter()
    .map(|(symbol, current_price, volatility, mean_reversion)| {
        (
            symbol.to_string(),
            AssetParams {
                current_price,
                volatility,
                mean_reversion,
            },
        )
    })
    .collect()
}

fn default_charts() -> Vec<ChartConfig> {
    vec![
        ChartConfig::asset("gold", "Spot Gold (per oz)", "#FFD700", "Gold"),
        ChartConfig::asset("silver", "Spot Silver (per oz)", "#C0C0C0", "Silver"),
        ChartConfig::ratio("gold-silver-ratio", "Gold/Silver Ratio", "#B87333", "Gold", "Silver"),
        ChartConfig::asset("tsla", "Tesla (TSLA)", "#E31937", "TSLA"),
        ChartConfig::asset("bitcoin", "Bitcoin (BTC)", "#F7931A", "Bitcoin"),
        ChartConfig::asset("ethereum", "Ethereum (ETH)", "#627EEA", "Ethereum"),
        ChartConfig::ratio("btc-eth-ratio", "BTC/ETH Ratio", "#8A2BE2", "Bitcoin", "Ethereum"),
        ChartConfig::asset("xrp", "XRP", "#23292F", "XRP"),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            assets: default_assets(),
            charts: default_charts(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DashboardError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.general.update_interval_seconds == 0 {
            return Err(DashboardError::ConfigError(
                "update_interval_seconds must be greater than zero".to_string(),
            ));
        }

        for (symbol, params) in &self.assets {
            if !params.is_valid() {
                return Err(DashboardError::ConfigError(format!(
                    "Invalid parameters for asset {}: price must be positive, volatility and mean_reversion non-negative",
                    symbol
                )));
            }
        }

        if self.charts.is_empty() {
            return Err(DashboardError::ConfigError(
                "At least one chart must be configured".to_string(),
            ));
        }

        for chart in &self.charts {
            chart.to_panel()?;
        }

        Ok(())
    }

    /// Expand environment variables in configuration
    pub fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(ref seed) = self.general.seed {
            if seed.starts_with("${") && seed.ends_with('}') {
                let var_name = &seed[2..seed.len() - 1];
                self.general.seed = Some(std::env::var(var_name).map_err(|_| {
                    DashboardError::ConfigError(format!(
                        "Environment variable {} not set",
                        var_name
                    ))
                })?);
            }
        }

        Ok(())
    }

    /// Parsed RNG seed, `None` when the dashboard should seed from entropy
    pub fn seed(&self) -> Result<Option<u64>> {
        self.general
            .seed
            .as_deref()
            .map(|s| {
                s.trim().parse::<u64>().map_err(|e| {
                    DashboardError::ConfigError(format!("Invalid seed '{}': {}", s, e))
                })
            })
            .transpose()
    }

    pub fn panels(&self) -> Result<Vec<ChartPanel>> {
        self.charts.iter().map(ChartConfig::to_panel).collect()
    }
}
