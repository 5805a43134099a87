use leadfive_primitives::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_downscale_loses_less_than_one_unit(amount in 0u128..=u128::MAX) {
        let amount = U256::from(amount);
        let six = normalize_decimals(amount, 18, 6).unwrap();
        let back = normalize_decimals(six, 6, 18).unwrap();

        prop_assert!(back <= amount);
        prop_assert!(amount - back < U256::exp10(12));
    }
}

proptest! {
    #[test]
    fn prop_rounding_up_brackets_truncation(amount in 0u128..=u128::MAX, drop in 1u32..=12) {
        let amount = U256::from(amount);
        let down = normalize_decimals_rounded(amount, 18, 18 - drop, Rounding::Down).unwrap();
        let up = normalize_decimals_rounded(amount, 18, 18 - drop, Rounding::Up).unwrap();

        prop_assert!(up >= down);
        prop_assert!(up - down <= U256::one());
    }
}

proptest! {
    #[test]
    fn prop_formatted_amount_parses_back(amount in 0u128..=u128::MAX, decimals in 0u32..=MAX_DECIMALS) {
        let amount = U256::from(amount);
        let text = format_units(amount, decimals).unwrap();
        prop_assert_eq!(parse_units(&text, decimals).unwrap(), amount);
    }
}
