// leadfive/core/economics/src/user.rs

use leadfive_primitives::Address;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Read-only view of a user's on-chain state at estimation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub address: Address,

    /// Current tier, 0 when unregistered
    #[serde(default)]
    pub package_level: u16,

    #[serde(default)]
    pub sponsor: Option<Address>,

    #[serde(default)]
    pub direct_referrals: u32,

    #[serde(default)]
    pub total_earnings: U256,

    #[serde(default)]
    pub earnings_cap: U256,
}

impl UserSnapshot {
    /// Snapshot of an address that has never registered
    pub fn unregistered(address: Address, sponsor: Option<Address>) -> Self {
        Self {
            address,
            package_level: 0,
            sponsor,
            direct_referrals: 0,
            total_earnings: U256::zero(),
            earnings_cap: U256::zero(),
        }
    }

    pub fn is_registered(&self) -> bool {
        self.package_level > 0
    }

    /// Earnings still payable before the cap is hit
    pub fn remaining_cap(&self) -> U256 {
        self.earnings_cap.saturating_sub(self.total_earnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_snapshot() {
        let user = UserSnapshot::unregistered(Address([1; 20]), Some(Address([2; 20])));
        assert!(!user.is_registered());
        assert!(user.remaining_cap().is_zero());
    }

    #[test]
    fn test_remaining_cap_saturates() {
        let mut user = UserSnapshot::unregistered(Address([1; 20]), None);
        user.package_level = 1;
        user.earnings_cap = U256::from(120);
        user.total_earnings = U256::from(50);
        assert_eq!(user.remaining_cap(), U256::from(70));

        user.total_earnings = U256::from(130);
        assert!(user.remaining_cap().is_zero());
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = format!(
            r#"{{"address":"0x{}","package_level":2,"sponsor":"0x{}","direct_referrals":6}}"#,
            "11".repeat(20),
            "22".repeat(20)
        );
        let user: UserSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(user.address, Address([0x11; 20]));
        assert_eq!(user.sponsor, Some(Address([0x22; 20])));
        assert_eq!(user.direct_referrals, 6);
        assert!(user.total_earnings.is_zero());
    }
}
