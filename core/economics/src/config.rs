// leadfive/core/economics/src/config.rs

use crate::allocator::{AllocationError, AllocatorConfig, CommissionAllocator};
use crate::catalog::{BonusSplits, CatalogError, PackageCatalog, PackageTier};
use crate::estimator::Estimator;
use crate::pricing::{PriceConverter, PricingError, RateBounds};
use crate::validation::{PreflightValidator, RegistrationRules};
use crate::withdrawal::{WithdrawalBand, WithdrawalError, WithdrawalRateModel};
use anyhow::Context;
use leadfive_primitives::decimals::{parse_units, DecimalError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Estimator configuration, as stored in TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub catalog: CatalogConfig,
    pub allocator: AllocatorConfig,
    pub withdrawal: WithdrawalConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub registration: RegistrationRules,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Precision of the stable token prices are quoted in
    pub stable_decimals: u32,

    /// Cap on cumulative earnings as a multiple of the investment
    #[serde(default = "default_cap_multiplier")]
    pub earnings_cap_multiplier: u32,

    pub tiers: Vec<TierConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    pub level: u16,

    #[serde(default)]
    pub name: String,

    /// Human readable price, e.g. "30" or "50.5"
    pub price: String,

    #[serde(default)]
    pub splits: BonusSplits,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalConfig {
    /// Fee on the withdrawn part, in basis points
    #[serde(default)]
    pub admin_fee_bps: u16,

    pub bands: Vec<WithdrawalBand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_native_decimals")]
    pub native_decimals: u32,

    /// Lowest accepted oracle price per native token, in stable units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rate: Option<String>,

    /// Highest accepted oracle price per native token, in stable units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rate: Option<String>,
}

fn default_cap_multiplier() -> u32 {
    4
}

fn default_native_decimals() -> u32 {
    18 // BNB
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            native_decimals: default_native_decimals(),
            min_rate: None,
            max_rate: None,
        }
    }
}

impl EstimatorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read estimator config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse estimator config {}", path.display()))?;

        info!(
            path = %path.display(),
            tiers = config.catalog.tiers.len(),
            bands = config.withdrawal.bands.len(),
            "loaded estimator config"
        );
        Ok(config)
    }

    /// Save to file
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).context("failed to serialize estimator config")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("failed to write estimator config {}", path.display()))?;
        Ok(())
    }

    pub fn build_catalog(&self) -> Result<PackageCatalog, ConfigError> {
        let decimals = self.catalog.stable_decimals;
        let tiers = self
            .catalog
            .tiers
            .iter()
            .map(|t| {
                let price = parse_units(&t.price, decimals).map_err(|source| ConfigError::Amount {
                    field: format!("catalog.tiers[level={}].price", t.level),
                    source,
                })?;
                Ok(PackageTier {
                    level: t.level,
                    name: t.name.clone(),
                    price,
                    splits: t.splits,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(PackageCatalog::new(
            tiers,
            decimals,
            self.catalog.earnings_cap_multiplier,
        )?)
    }

    pub fn build_converter(&self) -> Result<PriceConverter, ConfigError> {
        let stable_decimals = self.catalog.stable_decimals;
        let converter = PriceConverter::new(stable_decimals, self.pricing.native_decimals)?;

        let parse_rate = |field: &str, value: &str| {
            parse_units(value, stable_decimals).map_err(|source| ConfigError::Amount {
                field: format!("pricing.{}", field),
                source,
            })
        };

        match (&self.pricing.min_rate, &self.pricing.max_rate) {
            (None, None) => Ok(converter),
            (Some(min), Some(max)) => {
                let bounds = RateBounds {
                    min: parse_rate("min_rate", min)?,
                    max: parse_rate("max_rate", max)?,
                };
                Ok(converter.with_bounds(bounds)?)
            }
            _ => Err(ConfigError::Incomplete(
                "pricing.min_rate and pricing.max_rate must be set together".to_string(),
            )),
        }
    }

    /// Validate every section and assemble an estimator
    pub fn build(&self) -> Result<Estimator, ConfigError> {
        let built = self.try_build();
        if let Err(e) = &built {
            warn!(error = %e, "rejected estimator config");
        }
        built
    }

    fn try_build(&self) -> Result<Estimator, ConfigError> {
        let catalog = self.build_catalog()?;
        let allocator = CommissionAllocator::new(self.allocator.clone())?;
        let withdrawal = WithdrawalRateModel::new(self.withdrawal.bands.clone())?
            .with_admin_fee(self.withdrawal.admin_fee_bps)?;
        let validator = PreflightValidator::new(self.build_converter()?, self.registration.clone());

        Ok(Estimator::new(catalog, allocator, withdrawal, validator))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid amount in {field}: {source}")]
    Amount { field: String, source: DecimalError },

    #[error("Incomplete config: {0}")]
    Incomplete(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Withdrawal(#[from] WithdrawalError),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}
