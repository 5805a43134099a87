// leadfive/core/economics/src/validation.rs

//! Pre-flight checks mirroring the contract's `require` guards.
//!
//! Business-rule failures come back as [`ValidationResult::Failed`]; only
//! broken inputs such as an unusable exchange rate are `Err`.

use crate::catalog::PackageCatalog;
use crate::pricing::{ExchangeRate, PriceConverter, PricingError};
use crate::user::UserSnapshot;
use leadfive_primitives::Address;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Amount offered for a registration or upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payment {
    /// Stable-token minimal units
    Stable(U256),
    /// Native minimal units, valued at `rate`
    Native { amount: U256, rate: ExchangeRate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SponsorFault {
    SelfReferral,
    MissingSponsor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
    AlreadyRegistered,
    NotRegistered,
    InvalidTier { level: u16, max: u16 },
    InsufficientPayment { required: U256, provided: U256 },
    InvalidSponsor(SponsorFault),
    DowngradeNotAllowed { current: u16, requested: u16 },
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFailure::AlreadyRegistered => write!(f, "user is already registered"),
            ValidationFailure::NotRegistered => write!(f, "user is not registered"),
            ValidationFailure::InvalidTier { level, max } => {
                write!(f, "package level {} is not in 1..={}", level, max)
            }
            ValidationFailure::InsufficientPayment { required, provided } => {
                write!(f, "payment {} is below required {}", provided, required)
            }
            ValidationFailure::InvalidSponsor(SponsorFault::SelfReferral) => {
                write!(f, "sponsor cannot be the registering address")
            }
            ValidationFailure::InvalidSponsor(SponsorFault::MissingSponsor) => {
                write!(f, "a sponsor is required")
            }
            ValidationFailure::DowngradeNotAllowed { current, requested } => write!(
                f,
                "cannot move from package {} to package {}",
                current, requested
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationResult {
    Ok,
    Failed(ValidationFailure),
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationResult::Ok)
    }

    pub fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            ValidationResult::Ok => None,
            ValidationResult::Failed(reason) => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<(), ValidationFailure> {
        match self {
            ValidationResult::Ok => Ok(()),
            ValidationResult::Failed(reason) => Err(reason),
        }
    }
}

/// Sponsor requirements for new registrations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRules {
    /// Non-root registrations must name a sponsor
    #[serde(default)]
    pub require_sponsor: bool,

    /// Root account allowed to register without a sponsor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Address>,
}

pub struct PreflightValidator {
    converter: PriceConverter,
    rules: RegistrationRules,
}

impl PreflightValidator {
    pub fn new(converter: PriceConverter, rules: RegistrationRules) -> Self {
        Self { converter, rules }
    }

    pub fn converter(&self) -> &PriceConverter {
        &self.converter
    }

    pub fn rules(&self) -> &RegistrationRules {
        &self.rules
    }

    pub fn validate_registration(
        &self,
        user: &UserSnapshot,
        package_level: u16,
        payment: &Payment,
        catalog: &PackageCatalog,
    ) -> Result<ValidationResult, PricingError> {
        let result = self.check_registration(user, package_level, payment, catalog)?;
        log_outcome("registration", &user.address, &result);
        Ok(result)
    }

    pub fn validate_upgrade(
        &self,
        user: &UserSnapshot,
        new_level: u16,
        catalog: &PackageCatalog,
    ) -> ValidationResult {
        let result = check_upgrade(user, new_level, catalog);
        log_outcome("upgrade", &user.address, &result);
        result
    }

    /// Upgrade checks plus payment against the new tier's price
    pub fn validate_upgrade_payment(
        &self,
        user: &UserSnapshot,
        new_level: u16,
        payment: &Payment,
        catalog: &PackageCatalog,
    ) -> Result<ValidationResult, PricingError> {
        let mut result = check_upgrade(user, new_level, catalog);
        if result.is_ok() {
            result = self.check_payment(new_level, payment, catalog)?;
        }
        log_outcome("upgrade", &user.address, &result);
        Ok(result)
    }

    fn check_registration(
        &self,
        user: &UserSnapshot,
        package_level: u16,
        payment: &Payment,
        catalog: &PackageCatalog,
    ) -> Result<ValidationResult, PricingError> {
        if user.is_registered() {
            return Ok(ValidationResult::Failed(ValidationFailure::AlreadyRegistered));
        }
        if let Some(failure) = tier_failure(package_level, catalog) {
            return Ok(ValidationResult::Failed(failure));
        }
        if let Some(fault) = self.sponsor_fault(user) {
            return Ok(ValidationResult::Failed(ValidationFailure::InvalidSponsor(fault)));
        }
        self.check_payment(package_level, payment, catalog)
    }

    fn sponsor_fault(&self, user: &UserSnapshot) -> Option<SponsorFault> {
        let sponsor = user.sponsor.filter(|s| !s.is_zero());
        match sponsor {
            Some(s) if s == user.address => Some(SponsorFault::SelfReferral),
            Some(_) => None,
            None => {
                let is_root = self.rules.root == Some(user.address);
                if self.rules.require_sponsor && !is_root {
                    Some(SponsorFault::MissingSponsor)
                } else {
                    None
                }
            }
        }
    }

    fn check_payment(
        &self,
        package_level: u16,
        payment: &Payment,
        catalog: &PackageCatalog,
    ) -> Result<ValidationResult, PricingError> {
        let required = match catalog.price_of(package_level) {
            Ok(price) => price,
            Err(_) => {
                return Ok(ValidationResult::Failed(ValidationFailure::InvalidTier {
                    level: package_level,
                    max: catalog.max_level(),
                }))
            }
        };

        let provided = match payment {
            Payment::Stable(amount) => *amount,
            Payment::Native { amount, rate } => self.converter.to_stable_amount(*amount, rate)?,
        };

        if provided < required {
            return Ok(ValidationResult::Failed(ValidationFailure::InsufficientPayment {
                required,
                provided,
            }));
        }
        Ok(ValidationResult::Ok)
    }
}

fn check_upgrade(user: &UserSnapshot, new_level: u16, catalog: &PackageCatalog) -> ValidationResult {
    if !user.is_registered() {
        return ValidationResult::Failed(ValidationFailure::NotRegistered);
    }
    if let Some(failure) = tier_failure(new_level, catalog) {
        return ValidationResult::Failed(failure);
    }
    if new_level <= user.package_level {
        return ValidationResult::Failed(ValidationFailure::DowngradeNotAllowed {
            current: user.package_level,
            requested: new_level,
        });
    }
    ValidationResult::Ok
}

fn tier_failure(level: u16, catalog: &PackageCatalog) -> Option<ValidationFailure> {
    if catalog.contains(level) {
        None
    } else {
        Some(ValidationFailure::InvalidTier {
            level,
            max: catalog.max_level(),
        })
    }
}

fn log_outcome(operation: &str, address: &Address, result: &ValidationResult) {
    match result.failure() {
        None => debug!(operation, user = %address, "pre-flight passed"),
        Some(reason) => debug!(operation, user = %address, %reason, "pre-flight failed"),
    }
}
