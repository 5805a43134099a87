// leadfive/core/economics/src/catalog.rs

use leadfive_primitives::decimals::{check_decimals, DecimalError};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Denominator for every basis-point share
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Bonus categories a package payment is split into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusCategory {
    Direct,
    Level,
    Upline,
    Leader,
    Help,
    Club,
}

impl BonusCategory {
    /// All categories in ledger order
    pub const ALL: [BonusCategory; 6] = [
        BonusCategory::Direct,
        BonusCategory::Level,
        BonusCategory::Upline,
        BonusCategory::Leader,
        BonusCategory::Help,
        BonusCategory::Club,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BonusCategory::Direct => "direct",
            BonusCategory::Level => "level",
            BonusCategory::Upline => "upline",
            BonusCategory::Leader => "leader",
            BonusCategory::Help => "help",
            BonusCategory::Club => "club",
        }
    }
}

impl fmt::Display for BonusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basis-point share of a package payment per bonus category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusSplits {
    #[serde(default)]
    pub direct: u16,
    #[serde(default)]
    pub level: u16,
    #[serde(default)]
    pub upline: u16,
    #[serde(default)]
    pub leader: u16,
    #[serde(default)]
    pub help: u16,
    #[serde(default)]
    pub club: u16,
}

impl BonusSplits {
    pub fn get(&self, category: BonusCategory) -> u16 {
        match category {
            BonusCategory::Direct => self.direct,
            BonusCategory::Level => self.level,
            BonusCategory::Upline => self.upline,
            BonusCategory::Leader => self.leader,
            BonusCategory::Help => self.help,
            BonusCategory::Club => self.club,
        }
    }

    /// Sum of all shares in basis points
    pub fn total(&self) -> u32 {
        BonusCategory::ALL
            .iter()
            .map(|c| u32::from(self.get(*c)))
            .sum()
    }
}

/// A purchasable membership level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageTier {
    pub level: u16,
    pub name: String,
    /// Price in stable-token minimal units
    pub price: U256,
    pub splits: BonusSplits,
}

/// Validated, immutable tier table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageCatalog {
    tiers: Vec<PackageTier>,
    stable_decimals: u32,
    earnings_cap_multiplier: u32,
}

impl PackageCatalog {
    /// Build a catalog, rejecting inconsistent tier tables.
    ///
    /// Levels must run contiguously from 1, prices must be non-zero and
    /// every tier's splits must stay within 100%.
    pub fn new(
        mut tiers: Vec<PackageTier>,
        stable_decimals: u32,
        earnings_cap_multiplier: u32,
    ) -> Result<Self, CatalogError> {
        check_decimals(stable_decimals)?;

        if tiers.is_empty() {
            return Err(CatalogError::InvalidCatalog("catalog has no tiers".to_string()));
        }
        if earnings_cap_multiplier == 0 {
            return Err(CatalogError::InvalidCatalog(
                "earnings cap multiplier must be at least 1".to_string(),
            ));
        }

        tiers.sort_by_key(|t| t.level);

        for (index, tier) in tiers.iter().enumerate() {
            let expected = index + 1;
            if usize::from(tier.level) != expected {
                return Err(CatalogError::InvalidCatalog(format!(
                    "tier levels must be contiguous from 1: expected level {}, found {}",
                    expected, tier.level
                )));
            }
            if tier.price.is_zero() {
                return Err(CatalogError::InvalidCatalog(format!(
                    "tier {} has a zero price",
                    tier.level
                )));
            }
            let total = tier.splits.total();
            if total > BPS_DENOMINATOR {
                return Err(CatalogError::InvalidCatalog(format!(
                    "tier {} bonus splits sum to {} bps (max {})",
                    tier.level, total, BPS_DENOMINATOR
                )));
            }
        }

        Ok(Self {
            tiers,
            stable_decimals,
            earnings_cap_multiplier,
        })
    }

    /// Look up a tier by level
    pub fn get_tier(&self, level: u16) -> Result<&PackageTier, CatalogError> {
        if level == 0 {
            return Err(self.unknown(level));
        }
        self.tiers
            .get(usize::from(level) - 1)
            .ok_or_else(|| self.unknown(level))
    }

    /// All tiers, ascending by level
    pub fn tiers(&self) -> &[PackageTier] {
        &self.tiers
    }

    pub fn contains(&self, level: u16) -> bool {
        level >= 1 && usize::from(level) <= self.tiers.len()
    }

    pub fn max_level(&self) -> u16 {
        self.tiers.len() as u16
    }

    pub fn price_of(&self, level: u16) -> Result<U256, CatalogError> {
        self.get_tier(level).map(|t| t.price)
    }

    pub fn stable_decimals(&self) -> u32 {
        self.stable_decimals
    }

    pub fn earnings_cap_multiplier(&self) -> u32 {
        self.earnings_cap_multiplier
    }

    /// Maximum cumulative payout for a given total investment
    pub fn earnings_cap(&self, total_invested: U256) -> U256 {
        total_invested.saturating_mul(U256::from(self.earnings_cap_multiplier))
    }

    fn unknown(&self, level: u16) -> CatalogError {
        CatalogError::UnknownTier {
            level,
            max: self.max_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown package tier {level} (catalog has levels 1..={max})")]
    UnknownTier { level: u16, max: u16 },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error(transparent)]
    Decimals(#[from] DecimalError),
}
