use crate::config::AssetParams;
use crate::errors::{DashboardError, Result};
use crate::models::AssetProfile;
use std::collections::{BTreeMap, HashMap};

/// Symbol to profile lookup with an explicit fallback entry
#[derive(Clone, Debug)]
pub struct ProfileTable {
    profiles: HashMap<String, AssetProfile>,
    default_profile: AssetProfile,
}

impl ProfileTable {
    pub fn new() -> Self {
        Self {
            profiles: HashMap::new(),
            default_profile: AssetProfile::fallback(),
        }
    }

    /// Build the table from the `[assets]` section of the configuration
    pub fn from_assets(assets: &BTreeMap<String, AssetParams>) -> Result<Self> {
        let mut table = Self::new();
        for (symbol, params) in assets {
            table.insert(AssetProfile::new(
                symbol.clone(),
                params.current_price,
                params.volatility,
                params.mean_reversion,
            ))?;
        }
        Ok(table)
    }

    pub fn with_profile(mut self, profile: AssetProfile) -> Result<Self> {
        self.insert(profile)?;
        Ok(self)
    }

    pub fn with_default(mut self, profile: AssetProfile) -> Result<Self> {
        validate_profile(&profile)?;
        self.default_profile = profile;
        Ok(self)
    }

    pub fn insert(&mut self, profile: AssetProfile) -> Result<()> {
        validate_profile(&profile)?;
        self.profiles.insert(profile.symbol.clone(), profile);
        Ok(())
    }

    pub fn get(&self, symbol: &str) -> Option<&AssetProfile> {
        self.profiles.get(symbol)
    }

    /// Look up a symbol, falling back to the default profile
    pub fn resolve(&self, symbol: &str) -> &AssetProfile {
        self.profiles.get(symbol).unwrap_or(&self.default_profile)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.profiles.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_profile(profile: &AssetProfile) -> Result<()> {
    if !(profile.current_price.is_finite() && profile.current_price > 0.0) {
        return Err(DashboardError::InvalidProfile(format!(
            "{}: current_price must be positive, got {}",
            profile.symbol, profile.current_price
        )));
    }
    if !(profile.volatility.is_finite() && profile.volatility >= 0.0) {
        return Err(DashboardError::InvalidProfile(format!(
            "{}: volatility must be non-negative, got {}",
            profile.symbol, profile.volatility
        )));
    }
    if !(profile.mean_reversion_rate.is_finite() && profile.mean_reversion_rate >= 0.0) {
        return Err(DashboardError::InvalidProfile(format!(
            "{}: mean_reversion must be non-negative, got {}",
            profile.symbol, profile.mean_reversion_rate
        )));
    }
    Ok(())
}
