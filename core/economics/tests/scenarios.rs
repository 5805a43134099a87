// End-to-end scenarios driven by the shipped example configuration

use leadfive_economics::*;

const EXAMPLE_CONFIG: &str = include_str!("../../../config/estimator.example.toml");

fn usd(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

fn addr(n: u8) -> Address {
    Address([n; 20])
}

fn estimator() -> Estimator {
    EstimatorConfig::from_toml_str(EXAMPLE_CONFIG)
        .unwrap()
        .build()
        .unwrap()
}

#[cfg(test)]
mod catalog_scenarios {
    use super::*;

    #[test_log::test]
    fn test_example_catalog_loads() {
        let estimator = estimator();
        let catalog = estimator.catalog();

        let prices: Vec<U256> = catalog.tiers().iter().map(|t| t.price).collect();
        assert_eq!(prices, vec![usd(30), usd(50), usd(100), usd(200)]);
        assert!(catalog.tiers().iter().all(|t| t.splits.total() == BPS_DENOMINATOR));
        assert_eq!(catalog.earnings_cap(usd(30)), usd(120));
    }

    #[test_log::test]
    fn test_example_config_from_disk() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../config/estimator.example.toml");
        let config = EstimatorConfig::from_file(path).unwrap();
        assert_eq!(config.catalog.tiers.len(), 4);
        assert!(config.build().is_ok());
    }
}

#[cfg(test)]
mod allocation_scenarios {
    use super::*;

    /// $30 package, sponsor only: direct to the sponsor, leader and help to
    /// their pools, level and upline unfilled.
    #[test_log::test]
    fn test_thirty_dollar_package_single_sponsor() {
        let estimator = estimator();
        let event = CommissionEvent {
            payer: addr(0x10),
            amount: usd(30),
            package_level: 1,
            upline_chain: vec![addr(0xa1)],
        };

        let ledger = estimator
            .allocator()
            .allocate(estimator.catalog(), &event)
            .unwrap();

        let lines: Vec<(Recipient, BonusCategory, U256)> = ledger
            .entries
            .iter()
            .map(|e| (e.recipient, e.category, e.amount))
            .collect();
        assert_eq!(
            lines,
            vec![
                (Recipient::Account(addr(0xa1)), BonusCategory::Direct, usd(12)),
                (Recipient::Pool(PoolKind::Leader), BonusCategory::Leader, usd(3)),
                (Recipient::Pool(PoolKind::Help), BonusCategory::Help, usd(9)),
            ]
        );
        assert_eq!(ledger.leftover_total(), usd(6));
        assert_eq!(ledger.total(), usd(30));
    }

    #[test_log::test]
    fn test_deep_chain_fills_every_depth() {
        let estimator = estimator();
        let chain: Vec<Address> = (1..=31).map(addr).collect();
        let event = CommissionEvent {
            payer: addr(0xff),
            amount: usd(200),
            package_level: 4,
            upline_chain: chain,
        };

        let ledger = estimator
            .allocator()
            .allocate(estimator.catalog(), &event)
            .unwrap();

        // $20 upline bonus over 30 ancestors does not divide evenly
        let upline_residue = usd(20) - usd(20) / U256::from(30) * U256::from(30);
        assert_eq!(
            ledger.leftover_from(LeftoverSource::Category(BonusCategory::Upline)),
            upline_residue
        );
        assert!(ledger
            .leftover_from(LeftoverSource::Category(BonusCategory::Level))
            .is_zero());
        assert!(ledger
            .leftover_from(LeftoverSource::Category(BonusCategory::Direct))
            .is_zero());
        assert_eq!(ledger.total(), usd(200));
    }

    #[test_log::test]
    fn test_identical_inputs_give_identical_ledgers() {
        let estimator = estimator();
        let event = CommissionEvent {
            payer: addr(0x10),
            amount: usd(100),
            package_level: 3,
            upline_chain: vec![addr(1), addr(2), addr(3)],
        };
        let first = estimator.allocator().allocate(estimator.catalog(), &event).unwrap();
        let second = estimator.allocator().allocate(estimator.catalog(), &event).unwrap();
        assert_eq!(first, second);
    }
}

#[cfg(test)]
mod withdrawal_scenarios {
    use super::*;

    #[test_log::test]
    fn test_new_member_gets_lowest_band() {
        let quote = estimator().withdrawal().quote(0, usd(50), usd(120));
        assert_eq!(quote.withdraw_percent, 70);
        assert_eq!(quote.reinvest_percent, 30);
        assert!(!quote.capped);
    }

    #[test_log::test]
    fn test_withdrawal_pays_admin_fee() {
        let quote = estimator().withdrawal().quote(0, usd(50), usd(120));
        let split = quote.split(usd(100));

        assert_eq!(split.withdrawn, usd(70));
        assert_eq!(split.admin_fee, usd(35) / U256::from(10));
        assert_eq!(split.received, usd(665) / U256::from(10));
        assert_eq!(split.reinvested, usd(30));
    }

    #[test_log::test]
    fn test_cap_reached_overrides_top_band() {
        let quote = estimator().withdrawal().quote(25, usd(120), usd(120));
        assert_eq!(quote.withdraw_percent, 0);
        assert_eq!(quote.reinvest_percent, 100);
        assert!(quote.capped);
    }
}

#[cfg(test)]
mod pricing_scenarios {
    use super::*;

    #[test_log::test]
    fn test_thirty_dollars_at_six_hundred() {
        let native = estimator()
            .native_price(1, &ExchangeRate::whole(600))
            .unwrap();
        assert_eq!(native, U256::from(5) * U256::exp10(16));
    }

    #[test_log::test]
    fn test_oracle_outside_configured_range() {
        let err = estimator()
            .native_price(1, &ExchangeRate::whole(50))
            .unwrap_err();
        assert!(matches!(
            err,
            EstimateError::Pricing(PricingError::RateOutOfBounds { .. })
        ));
    }
}

#[cfg(test)]
mod validation_scenarios {
    use super::*;

    #[test_log::test]
    fn test_registered_user_cannot_register_again() {
        let estimator = estimator();
        let mut user = UserSnapshot::unregistered(addr(0x10), Some(addr(1)));
        user.package_level = 1;

        let result = estimator
            .validator()
            .validate_registration(&user, 1, &Payment::Stable(usd(30)), estimator.catalog())
            .unwrap();
        assert_eq!(
            result,
            ValidationResult::Failed(ValidationFailure::AlreadyRegistered)
        );
    }

    #[test_log::test]
    fn test_full_preview_with_native_payment() {
        let estimator = estimator();
        let rate = ExchangeRate::whole(600);
        let user = UserSnapshot::unregistered(addr(0x10), Some(addr(1)));
        let cost = estimator.native_price(2, &rate).unwrap();

        let preview = estimator
            .preview_registration(
                &user,
                2,
                &Payment::Native { amount: cost, rate },
                &[addr(1), addr(2)],
                &rate,
            )
            .unwrap();

        assert!(preview.validation.is_ok());
        assert_eq!(preview.native_cost, Some(cost));
        let ledger = preview.ledger.unwrap();
        assert_eq!(ledger.credits_for(&addr(1)), usd(20));
        assert_eq!(ledger.total(), usd(50));
    }
}
