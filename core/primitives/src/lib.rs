// leadfive/core/primitives/src/lib.rs

pub mod address;
pub mod decimals;

pub use address::{Address, AddressError};
pub use decimals::{
    format_units, normalize_decimals, normalize_decimals_rounded, parse_units, pow10,
    DecimalError, Rounding, MAX_DECIMALS,
};
pub use primitive_types::U256;
