// leadfive/core/economics/src/estimator.rs

use crate::allocator::{AllocationError, CommissionAllocator, CommissionEvent, CommissionLedger};
use crate::catalog::{CatalogError, PackageCatalog};
use crate::pricing::{ExchangeRate, PricingError};
use crate::user::UserSnapshot;
use crate::validation::{Payment, PreflightValidator, ValidationResult};
use crate::withdrawal::{WithdrawalQuote, WithdrawalRateModel};
use leadfive_primitives::Address;
use primitive_types::U256;
use serde::Serialize;
use tracing::debug;

/// Everything a caller needs before submitting a registration or upgrade
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationPreview {
    pub validation: ValidationResult,
    /// Tier price in stable units, if the level exists
    pub price: Option<U256>,
    /// Native amount to send, rounded up
    pub native_cost: Option<U256>,
    /// Commission split, only when validation passed
    pub ledger: Option<CommissionLedger>,
}

/// Catalog, allocator, withdrawal bands and validator built from one config
pub struct Estimator {
    catalog: PackageCatalog,
    allocator: CommissionAllocator,
    withdrawal: WithdrawalRateModel,
    validator: PreflightValidator,
}

impl Estimator {
    pub fn new(
        catalog: PackageCatalog,
        allocator: CommissionAllocator,
        withdrawal: WithdrawalRateModel,
        validator: PreflightValidator,
    ) -> Self {
        Self {
            catalog,
            allocator,
            withdrawal,
            validator,
        }
    }

    pub fn catalog(&self) -> &PackageCatalog {
        &self.catalog
    }

    pub fn allocator(&self) -> &CommissionAllocator {
        &self.allocator
    }

    pub fn withdrawal(&self) -> &WithdrawalRateModel {
        &self.withdrawal
    }

    pub fn validator(&self) -> &PreflightValidator {
        &self.validator
    }

    pub fn quote(&self, user: &UserSnapshot) -> WithdrawalQuote {
        self.withdrawal.quote_for(user)
    }

    /// Native amount required for a tier
    pub fn native_price(&self, level: u16, rate: &ExchangeRate) -> Result<U256, EstimateError> {
        let price = self.catalog.price_of(level)?;
        Ok(self.validator.converter().to_native_amount(price, rate)?)
    }

    pub fn preview_registration(
        &self,
        user: &UserSnapshot,
        package_level: u16,
        payment: &Payment,
        upline_chain: &[Address],
        rate: &ExchangeRate,
    ) -> Result<RegistrationPreview, EstimateError> {
        let validation =
            self.validator
                .validate_registration(user, package_level, payment, &self.catalog)?;
        self.preview(user, package_level, validation, upline_chain, rate)
    }

    pub fn preview_upgrade(
        &self,
        user: &UserSnapshot,
        new_level: u16,
        payment: &Payment,
        upline_chain: &[Address],
        rate: &ExchangeRate,
    ) -> Result<RegistrationPreview, EstimateError> {
        let validation =
            self.validator
                .validate_upgrade_payment(user, new_level, payment, &self.catalog)?;
        self.preview(user, new_level, validation, upline_chain, rate)
    }

    fn preview(
        &self,
        user: &UserSnapshot,
        level: u16,
        validation: ValidationResult,
        upline_chain: &[Address],
        rate: &ExchangeRate,
    ) -> Result<RegistrationPreview, EstimateError> {
        if let Some(sponsor) = user.sponsor.filter(|s| !s.is_zero()) {
            match upline_chain.first() {
                None => return Err(EstimateError::MissingUpline { sponsor }),
                Some(first) if *first != sponsor => {
                    return Err(EstimateError::SponsorMismatch {
                        sponsor,
                        chain_head: *first,
                    })
                }
                Some(_) => {}
            }
        }

        let price = self.catalog.price_of(level).ok();
        let native_cost = price
            .map(|p| self.validator.converter().to_native_amount(p, rate))
            .transpose()?;

        let ledger = match (&validation, price) {
            (ValidationResult::Ok, Some(amount)) => {
                let event = CommissionEvent {
                    payer: user.address,
                    amount,
                    package_level: level,
                    upline_chain: upline_chain.to_vec(),
                };
                Some(self.allocator.allocate(&self.catalog, &event)?)
            }
            _ => None,
        };

        debug!(
            user = %user.address,
            level,
            passed = validation.is_ok(),
            "built pre-flight preview"
        );

        Ok(RegistrationPreview {
            validation,
            price,
            native_cost,
            ledger,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimateError {
    #[error("Sponsor {sponsor} does not head the upline chain (found {chain_head})")]
    SponsorMismatch { sponsor: Address, chain_head: Address },

    #[error("Sponsor {sponsor} is set but the upline chain is empty")]
    MissingUpline { sponsor: Address },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}
