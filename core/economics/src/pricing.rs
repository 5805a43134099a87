// leadfive/core/economics/src/pricing.rs

use leadfive_primitives::decimals::{
    check_decimals, mul_div, normalize_decimals, pow10, DecimalError, Rounding,
};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Oracle price of one native token, in stable units with its own precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub price: U256,
    pub decimals: u32,
}

impl ExchangeRate {
    pub fn new(price: U256, decimals: u32) -> Self {
        Self { price, decimals }
    }

    /// Whole-unit rate, e.g. `ExchangeRate::whole(600)` for $600 per BNB
    pub fn whole(price: u64) -> Self {
        Self::new(U256::from(price), 0)
    }
}

/// Accepted oracle range, in stable-token minimal units per native token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBounds {
    pub min: U256,
    pub max: U256,
}

/// Converts tier prices between the stable token and the native gas token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceConverter {
    stable_decimals: u32,
    native_decimals: u32,
    bounds: Option<RateBounds>,
}

impl PriceConverter {
    pub fn new(stable_decimals: u32, native_decimals: u32) -> Result<Self, PricingError> {
        check_decimals(stable_decimals)?;
        check_decimals(native_decimals)?;

        Ok(Self {
            stable_decimals,
            native_decimals,
            bounds: None,
        })
    }

    /// Reject oracle rates outside `bounds`
    pub fn with_bounds(mut self, bounds: RateBounds) -> Result<Self, PricingError> {
        if bounds.min > bounds.max {
            return Err(PricingError::InvalidBounds);
        }
        self.bounds = Some(bounds);
        Ok(self)
    }

    pub fn stable_decimals(&self) -> u32 {
        self.stable_decimals
    }

    pub fn native_decimals(&self) -> u32 {
        self.native_decimals
    }

    pub fn bounds(&self) -> Option<&RateBounds> {
        self.bounds.as_ref()
    }

    /// Native amount needed to cover `price`.
    ///
    /// Rounds up to the next native minimal unit: an underpaid registration
    /// reverts on-chain, an overpaid one does not.
    pub fn to_native_amount(&self, price: U256, rate: &ExchangeRate) -> Result<U256, PricingError> {
        self.check_rate(rate)?;

        // native = price * 10^(native + rate) / (rate * 10^stable)
        let numerator_scale = pow10(self.native_decimals + rate.decimals)?;
        let denominator = rate
            .price
            .checked_mul(pow10(self.stable_decimals)?)
            .ok_or(DecimalError::Overflow)?;

        let native = mul_div(price, numerator_scale, denominator, Rounding::Up)?;
        debug!(%price, rate = %rate.price, %native, "converted stable price to native amount");
        Ok(native)
    }

    /// Stable value of a native amount, rounded down
    pub fn to_stable_amount(&self, native: U256, rate: &ExchangeRate) -> Result<U256, PricingError> {
        self.check_rate(rate)?;

        let numerator_scale = pow10(self.stable_decimals)?;
        let denominator = pow10(self.native_decimals + rate.decimals)?;
        let scaled = native.checked_mul(rate.price).ok_or(DecimalError::Overflow)?;

        Ok(mul_div(scaled, numerator_scale, denominator, Rounding::Down)?)
    }

    fn check_rate(&self, rate: &ExchangeRate) -> Result<(), PricingError> {
        check_decimals(rate.decimals)?;

        if rate.price.is_zero() {
            return Err(PricingError::ZeroRate);
        }

        if let Some(bounds) = &self.bounds {
            let normalized = normalize_decimals(rate.price, rate.decimals, self.stable_decimals)?;
            if normalized < bounds.min || normalized > bounds.max {
                warn!(
                    rate = %normalized,
                    min = %bounds.min,
                    max = %bounds.max,
                    "exchange rate outside configured bounds"
                );
                return Err(PricingError::RateOutOfBounds {
                    rate: normalized,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Exchange rate is zero")]
    ZeroRate,

    #[error("Exchange rate {rate} outside accepted range [{min}, {max}]")]
    RateOutOfBounds { rate: U256, min: U256, max: U256 },

    #[error("Rate bounds have min above max")]
    InvalidBounds,

    #[error(transparent)]
    Decimals(#[from] DecimalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(decimals: u32) -> U256 {
        pow10(decimals).unwrap()
    }

    #[test]
    fn test_whole_dollar_conversion() {
        let converter = PriceConverter::new(18, 18).unwrap();
        let native = converter
            .to_native_amount(U256::from(30) * e(18), &ExchangeRate::whole(600))
            .unwrap();
        // 30 / 600 = 0.05 BNB
        assert_eq!(native, U256::from(5) * e(16));
    }

    #[test]
    fn test_inexact_conversion_rounds_up() {
        let converter = PriceConverter::new(18, 18).unwrap();
        let native = converter
            .to_native_amount(U256::from(31) * e(18), &ExchangeRate::whole(600))
            .unwrap();
        // 31 / 600 = 0.051666...
        assert_eq!(native, U256::from(51_666_666_666_666_667u64));
    }

    #[test]
    fn test_six_decimal_stable_token() {
        let converter = PriceConverter::new(6, 18).unwrap();
        let price = U256::from(30_000_000u64); // 30 USDT
        let rate = ExchangeRate::new(U256::from(600) * e(8), 8); // Chainlink style
        assert_eq!(
            converter.to_native_amount(price, &rate).unwrap(),
            U256::from(5) * e(16)
        );
    }

    #[test]
    fn test_stable_value_rounds_down() {
        let converter = PriceConverter::new(18, 18).unwrap();
        let rate = ExchangeRate::whole(600);
        let native = U256::from(51_666_666_666_666_667u64);
        let stable = converter.to_stable_amount(native, &rate).unwrap();
        assert!(stable >= U256::from(31) * e(18));
        assert_eq!(
            converter.to_stable_amount(U256::from(5) * e(16), &rate).unwrap(),
            U256::from(30) * e(18)
        );
    }

    #[test]
    fn test_zero_rate_rejected() {
        let converter = PriceConverter::new(18, 18).unwrap();
        assert_eq!(
            converter.to_native_amount(U256::one(), &ExchangeRate::whole(0)),
            Err(PricingError::ZeroRate)
        );
    }

    #[test]
    fn test_rate_bounds() {
        let converter = PriceConverter::new(6, 18)
            .unwrap()
            .with_bounds(RateBounds {
                min: U256::from(100) * e(6),
                max: U256::from(2_000) * e(6),
            })
            .unwrap();

        assert!(converter
            .to_native_amount(U256::from(30) * e(6), &ExchangeRate::whole(600))
            .is_ok());
        assert!(matches!(
            converter.to_native_amount(U256::from(30) * e(6), &ExchangeRate::whole(5_000)),
            Err(PricingError::RateOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let result = PriceConverter::new(18, 18).unwrap().with_bounds(RateBounds {
            min: U256::from(10),
            max: U256::from(1),
        });
        assert_eq!(result.unwrap_err(), PricingError::InvalidBounds);
    }

    #[test]
    fn test_unreasonable_decimals() {
        assert!(PriceConverter::new(31, 18).is_err());
        let converter = PriceConverter::new(18, 18).unwrap();
        assert!(matches!(
            converter.to_native_amount(U256::one(), &ExchangeRate::new(U256::one(), 40)),
            Err(PricingError::Decimals(DecimalError::DecimalMismatch { .. }))
        ));
    }
}
