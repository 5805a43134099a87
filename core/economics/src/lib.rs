// leadfive/core/economics/src/lib.rs

//! Off-chain mirror of the LeadFive package, commission and withdrawal
//! arithmetic. Everything here is pure: callers fetch catalog, user and
//! oracle snapshots themselves and pass them in.

pub mod allocator;
pub mod catalog;
pub mod config;
pub mod estimator;
pub mod pricing;
pub mod user;
pub mod validation;
pub mod withdrawal;

pub use allocator::{
    AllocationError, AllocatorConfig, CommissionAllocator, CommissionEvent, CommissionLedger,
    LedgerEntry, LeftoverSource, PoolKind, Recipient, UplineChainFault,
};
pub use catalog::{BonusCategory, BonusSplits, CatalogError, PackageCatalog, PackageTier, BPS_DENOMINATOR};
pub use config::{ConfigError, EstimatorConfig};
pub use estimator::{EstimateError, Estimator, RegistrationPreview};
pub use leadfive_primitives::{normalize_decimals, Address, DecimalError, U256};
pub use pricing::{ExchangeRate, PriceConverter, PricingError, RateBounds};
pub use user::UserSnapshot;
pub use validation::{
    Payment, PreflightValidator, RegistrationRules, SponsorFault, ValidationFailure,
    ValidationResult,
};
pub use withdrawal::{
    WithdrawalBand, WithdrawalError, WithdrawalQuote, WithdrawalRateModel, WithdrawalSplit,
};
