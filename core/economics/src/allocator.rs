// leadfive/core/economics/src/allocator.rs

//! Commission allocation.
//!
//! Replays the contract's bonus split for a registration or upgrade payment
//! so callers can see which upline addresses and pools are credited before
//! the transaction is sent. All arithmetic is integer; every line item is
//! truncated and what truncation drops lands in the leftover pool, so the
//! ledger always sums back to the payment.

use crate::catalog::{BonusCategory, CatalogError, PackageCatalog, BPS_DENOMINATOR};
use leadfive_primitives::decimals::{mul_div, Rounding};
use leadfive_primitives::Address;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::debug;

/// Shared accumulators that receive pool-style bonuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Leader,
    Help,
    Club,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolKind::Leader => f.write_str("leader_pool"),
            PoolKind::Help => f.write_str("help_pool"),
            PoolKind::Club => f.write_str("club_pool"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    Account(Address),
    Pool(PoolKind),
}

/// One credit in a commission ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub recipient: Recipient,
    pub category: BonusCategory,
    pub amount: U256,
}

/// Where an unallocated amount came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeftoverSource {
    /// Missing upline or per-line truncation inside a category
    Category(BonusCategory),
    /// Splits below 100% and truncation of the category shares
    Unallocated,
}

/// Registration or upgrade payment to be split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionEvent {
    pub payer: Address,
    pub amount: U256,
    pub package_level: u16,
    /// Ancestors, nearest first
    pub upline_chain: Vec<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionLedger {
    pub entries: Vec<LedgerEntry>,
    pub leftover: BTreeMap<LeftoverSource, U256>,
}

impl CommissionLedger {
    fn credit(&mut self, recipient: Recipient, category: BonusCategory, amount: U256) {
        if !amount.is_zero() {
            self.entries.push(LedgerEntry {
                recipient,
                category,
                amount,
            });
        }
    }

    fn leave(&mut self, source: LeftoverSource, amount: U256) {
        if !amount.is_zero() {
            *self.leftover.entry(source).or_insert_with(U256::zero) += amount;
        }
    }

    /// Sum of all individual and pool credits
    pub fn total_credited(&self) -> U256 {
        self.entries
            .iter()
            .fold(U256::zero(), |acc, e| acc + e.amount)
    }

    /// Total amount left in the leftover pool
    pub fn leftover_total(&self) -> U256 {
        self.leftover.values().fold(U256::zero(), |acc, x| acc + *x)
    }

    pub fn leftover_from(&self, source: LeftoverSource) -> U256 {
        self.leftover.get(&source).copied().unwrap_or_default()
    }

    /// Credits + leftover; always equals the event amount
    pub fn total(&self) -> U256 {
        self.total_credited() + self.leftover_total()
    }

    /// Everything credited to one account across categories
    pub fn credits_for(&self, address: &Address) -> U256 {
        self.entries
            .iter()
            .filter(|e| e.recipient == Recipient::Account(*address))
            .fold(U256::zero(), |acc, e| acc + e.amount)
    }

    pub fn pool_total(&self, pool: PoolKind) -> U256 {
        self.entries
            .iter()
            .filter(|e| e.recipient == Recipient::Pool(pool))
            .fold(U256::zero(), |acc, e| acc + e.amount)
    }
}

/// Depth configuration for level and upline distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Share of the level bonus per depth, in basis points
    pub level_weights: Vec<u16>,

    /// Number of ancestors sharing the upline bonus evenly
    pub upline_depth: usize,

    /// Nearest ancestors skipped before level/upline distribution starts
    #[serde(default)]
    pub distribution_offset: usize,

    /// Longest upline chain accepted
    pub max_chain_depth: usize,
}

impl AllocatorConfig {
    pub fn validate(&self) -> Result<(), AllocationError> {
        let weights: u32 = self.level_weights.iter().map(|w| u32::from(*w)).sum();
        if weights > BPS_DENOMINATOR {
            return Err(AllocationError::InvalidConfig(format!(
                "level weights sum to {} bps (max {})",
                weights, BPS_DENOMINATOR
            )));
        }
        if self.max_chain_depth == 0 {
            return Err(AllocationError::InvalidConfig(
                "max chain depth must be at least 1".to_string(),
            ));
        }

        // Depths past the longest accepted chain can never be paid
        let reach = self
            .distribution_offset
            .checked_add(self.level_weights.len().max(self.upline_depth));
        match reach {
            Some(reach) if reach <= self.max_chain_depth => Ok(()),
            _ => Err(AllocationError::InvalidConfig(format!(
                "distribution offset {} plus depth {} exceeds max chain depth {}",
                self.distribution_offset,
                self.level_weights.len().max(self.upline_depth),
                self.max_chain_depth
            ))),
        }
    }
}

/// Why an upline chain was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UplineChainFault {
    TooDeep { len: usize, max: usize },
    Cycle { address: Address, first: usize, second: usize },
    ContainsPayer { index: usize },
    ZeroAddress { index: usize },
}

impl fmt::Display for UplineChainFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UplineChainFault::TooDeep { len, max } => {
                write!(f, "chain length {} exceeds max depth {}", len, max)
            }
            UplineChainFault::Cycle {
                address,
                first,
                second,
            } => write!(f, "{} appears at depths {} and {}", address, first, second),
            UplineChainFault::ContainsPayer { index } => {
                write!(f, "payer appears in its own upline at depth {}", index)
            }
            UplineChainFault::ZeroAddress { index } => {
                write!(f, "zero address at depth {}", index)
            }
        }
    }
}

pub struct CommissionAllocator {
    config: AllocatorConfig,
}

impl CommissionAllocator {
    pub fn new(config: AllocatorConfig) -> Result<Self, AllocationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Split `event.amount` across the upline chain and pools
    pub fn allocate(
        &self,
        catalog: &PackageCatalog,
        event: &CommissionEvent,
    ) -> Result<CommissionLedger, AllocationError> {
        if event.amount.is_zero() {
            return Err(AllocationError::NonPositiveAmount);
        }
        self.check_chain(event)?;

        let tier = catalog.get_tier(event.package_level)?;
        let chain = &event.upline_chain;
        let mut ledger = CommissionLedger::default();
        let mut distributed = U256::zero();

        for category in BonusCategory::ALL {
            let share = bps_of(event.amount, tier.splits.get(category))?;
            distributed += share;

            match category {
                BonusCategory::Direct => match chain.first() {
                    Some(sponsor) => ledger.credit(Recipient::Account(*sponsor), category, share),
                    None => ledger.leave(LeftoverSource::Category(category), share),
                },
                BonusCategory::Level => self.distribute_levels(&mut ledger, chain, share)?,
                BonusCategory::Upline => self.distribute_upline(&mut ledger, chain, share),
                BonusCategory::Leader => ledger.credit(Recipient::Pool(PoolKind::Leader), category, share),
                BonusCategory::Help => ledger.credit(Recipient::Pool(PoolKind::Help), category, share),
                BonusCategory::Club => ledger.credit(Recipient::Pool(PoolKind::Club), category, share),
            }
        }

        ledger.leave(LeftoverSource::Unallocated, event.amount - distributed);
        debug_assert_eq!(ledger.total(), event.amount);

        debug!(
            payer = %event.payer,
            level = event.package_level,
            amount = %event.amount,
            entries = ledger.entries.len(),
            leftover = %ledger.leftover_total(),
            "allocated commission"
        );

        Ok(ledger)
    }

    fn distribute_levels(
        &self,
        ledger: &mut CommissionLedger,
        chain: &[Address],
        share: U256,
    ) -> Result<(), AllocationError> {
        let source = LeftoverSource::Category(BonusCategory::Level);
        let mut paid = U256::zero();

        for (depth, weight) in self.config.level_weights.iter().enumerate() {
            let part = bps_of(share, *weight)?;
            paid += part;
            match chain.get(self.config.distribution_offset + depth) {
                Some(ancestor) => ledger.credit(Recipient::Account(*ancestor), BonusCategory::Level, part),
                None => ledger.leave(source, part),
            }
        }

        ledger.leave(source, share - paid);
        Ok(())
    }

    fn distribute_upline(&self, ledger: &mut CommissionLedger, chain: &[Address], share: U256) {
        let source = LeftoverSource::Category(BonusCategory::Upline);
        if self.config.upline_depth == 0 {
            ledger.leave(source, share);
            return;
        }

        let per_ancestor = share / U256::from(self.config.upline_depth);
        let mut paid = U256::zero();

        for depth in 0..self.config.upline_depth {
            paid += per_ancestor;
            match chain.get(self.config.distribution_offset + depth) {
                Some(ancestor) => {
                    ledger.credit(Recipient::Account(*ancestor), BonusCategory::Upline, per_ancestor)
                }
                None => ledger.leave(source, per_ancestor),
            }
        }

        ledger.leave(source, share - paid);
    }

    fn check_chain(&self, event: &CommissionEvent) -> Result<(), AllocationError> {
        let chain = &event.upline_chain;
        if chain.len() > self.config.max_chain_depth {
            return Err(AllocationError::InvalidUplineChain(UplineChainFault::TooDeep {
                len: chain.len(),
                max: self.config.max_chain_depth,
            }));
        }

        let mut seen = HashSet::with_capacity(chain.len());
        for (index, address) in chain.iter().enumerate() {
            if address.is_zero() {
                return Err(AllocationError::InvalidUplineChain(
                    UplineChainFault::ZeroAddress { index },
                ));
            }
            if *address == event.payer {
                return Err(AllocationError::InvalidUplineChain(
                    UplineChainFault::ContainsPayer { index },
                ));
            }
            if !seen.insert(*address) {
                let first = chain.iter().position(|a| a == address).unwrap_or(index);
                return Err(AllocationError::InvalidUplineChain(UplineChainFault::Cycle {
                    address: *address,
                    first,
                    second: index,
                }));
            }
        }

        Ok(())
    }
}

/// `amount * bps / 10_000`, truncated
fn bps_of(amount: U256, bps: u16) -> Result<U256, AllocationError> {
    mul_div(
        amount,
        U256::from(bps),
        U256::from(BPS_DENOMINATOR),
        Rounding::Down,
    )
    .map_err(|_| AllocationError::Overflow)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("Commission amount must be positive")]
    NonPositiveAmount,

    #[error("Invalid upline chain: {0}")]
    InvalidUplineChain(UplineChainFault),

    #[error("Commission amount overflows basis-point arithmetic")]
    Overflow,

    #[error("Invalid allocator config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
