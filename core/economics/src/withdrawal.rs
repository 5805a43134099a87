// leadfive/core/economics/src/withdrawal.rs

use crate::catalog::BPS_DENOMINATOR;
use crate::user::UserSnapshot;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Referral-count threshold mapped to a withdraw percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalBand {
    pub min_referrals: u32,
    pub withdraw_percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalQuote {
    pub withdraw_percent: u8,
    pub reinvest_percent: u8,
    /// Earnings cap reached; distinct from a 0% band
    pub capped: bool,
    /// `min_referrals` of the band that matched
    pub band_min_referrals: u32,
    pub remaining_cap: U256,
    /// Fee taken from the withdrawn part, in basis points
    pub admin_fee_bps: u16,
}

/// Concrete amounts for one withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalSplit {
    /// Gross withdrawn part, `admin_fee + received`
    pub withdrawn: U256,
    pub admin_fee: U256,
    /// Paid out to the user after the admin fee
    pub received: U256,
    pub reinvested: U256,
}

impl WithdrawalQuote {
    /// Divide `amount` by this quote. The withdrawn part is truncated, the
    /// reinvested part takes the remainder. The admin fee is charged on the
    /// withdrawn part only, truncated in the user's favour.
    pub fn split(&self, amount: U256) -> WithdrawalSplit {
        let withdrawn = fraction_of(amount, u32::from(self.withdraw_percent), 100);
        let admin_fee = fraction_of(withdrawn, u32::from(self.admin_fee_bps), BPS_DENOMINATOR);

        WithdrawalSplit {
            withdrawn,
            admin_fee,
            received: withdrawn - admin_fee,
            reinvested: amount - withdrawn,
        }
    }
}

/// floor(amount * numerator / denominator) without overflowing on large amounts
fn fraction_of(amount: U256, numerator: u32, denominator: u32) -> U256 {
    let numerator = U256::from(numerator);
    let denominator = U256::from(denominator);
    amount / denominator * numerator + amount % denominator * numerator / denominator
}

/// Withdraw/reinvest split by referral band
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRateModel {
    /// Sorted by `min_referrals`, descending
    bands: Vec<WithdrawalBand>,
    admin_fee_bps: u16,
}

impl WithdrawalRateModel {
    pub fn new(mut bands: Vec<WithdrawalBand>) -> Result<Self, WithdrawalError> {
        if bands.is_empty() {
            return Err(WithdrawalError::InvalidBands("no bands configured".to_string()));
        }

        let mut seen = HashSet::new();
        for band in &bands {
            if band.withdraw_percent > 100 {
                return Err(WithdrawalError::InvalidBands(format!(
                    "band at {} referrals withdraws {}%",
                    band.min_referrals, band.withdraw_percent
                )));
            }
            if !seen.insert(band.min_referrals) {
                return Err(WithdrawalError::InvalidBands(format!(
                    "duplicate band at {} referrals",
                    band.min_referrals
                )));
            }
        }

        bands.sort_by(|a, b| b.min_referrals.cmp(&a.min_referrals));

        // More referrals must never mean a lower withdraw rate
        for pair in bands.windows(2) {
            let (higher, lower) = (pair[0], pair[1]);
            if higher.withdraw_percent < lower.withdraw_percent {
                return Err(WithdrawalError::InvalidBands(format!(
                    "band at {} referrals ({}%) is below band at {} referrals ({}%)",
                    higher.min_referrals,
                    higher.withdraw_percent,
                    lower.min_referrals,
                    lower.withdraw_percent
                )));
            }
        }

        Ok(Self {
            bands,
            admin_fee_bps: 0,
        })
    }

    /// Charge `admin_fee_bps` on every withdrawn amount
    pub fn with_admin_fee(mut self, admin_fee_bps: u16) -> Result<Self, WithdrawalError> {
        if u32::from(admin_fee_bps) > BPS_DENOMINATOR {
            return Err(WithdrawalError::InvalidAdminFee(admin_fee_bps));
        }
        self.admin_fee_bps = admin_fee_bps;
        Ok(self)
    }

    pub fn admin_fee_bps(&self) -> u16 {
        self.admin_fee_bps
    }

    /// Bands, highest threshold first
    pub fn bands(&self) -> &[WithdrawalBand] {
        &self.bands
    }

    /// Quote the split for a user's current position
    pub fn quote(
        &self,
        direct_referrals: u32,
        current_earnings: U256,
        earnings_cap: U256,
    ) -> WithdrawalQuote {
        let band = self.band_for(direct_referrals);

        let quote = if current_earnings >= earnings_cap {
            WithdrawalQuote {
                withdraw_percent: 0,
                reinvest_percent: 100,
                capped: true,
                band_min_referrals: band.min_referrals,
                remaining_cap: U256::zero(),
                admin_fee_bps: self.admin_fee_bps,
            }
        } else {
            WithdrawalQuote {
                withdraw_percent: band.withdraw_percent,
                reinvest_percent: 100 - band.withdraw_percent,
                capped: false,
                band_min_referrals: band.min_referrals,
                remaining_cap: earnings_cap - current_earnings,
                admin_fee_bps: self.admin_fee_bps,
            }
        };

        debug!(
            direct_referrals,
            withdraw = quote.withdraw_percent,
            capped = quote.capped,
            "withdrawal quote"
        );
        quote
    }

    pub fn quote_for(&self, user: &UserSnapshot) -> WithdrawalQuote {
        self.quote(user.direct_referrals, user.total_earnings, user.earnings_cap)
    }

    fn band_for(&self, direct_referrals: u32) -> WithdrawalBand {
        let lowest = self.bands[self.bands.len() - 1];
        self.bands
            .iter()
            .find(|b| direct_referrals >= b.min_referrals)
            .copied()
            .unwrap_or(lowest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WithdrawalError {
    #[error("Invalid withdrawal bands: {0}")]
    InvalidBands(String),

    #[error("Admin fee of {0} bps exceeds 100%")]
    InvalidAdminFee(u16),
}
