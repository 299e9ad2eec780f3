//! Money helpers
//!
//! All monetary amounts are `rust_decimal::Decimal` in PHP with two
//! decimal places. Arithmetic stays in `Decimal` end to end; rounding is
//! applied once, when a total is frozen onto an order.

use rust_decimal::prelude::*;

/// Monetary precision (centavos)
pub const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price per product (₱100,000)
pub const MAX_UNIT_PRICE: i64 = 100_000;

/// Maximum allowed quantity per order line
pub const MAX_QUANTITY: u32 = 99;

/// Maximum allowed single ledger entry amount (₱1,000,000)
pub const MAX_ENTRY_AMOUNT: i64 = 1_000_000;

/// Round a monetary value to centavo precision, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Whether a value is acceptable as a captured unit price.
pub fn is_valid_unit_price(price: Decimal) -> bool {
    price >= Decimal::ZERO && price <= Decimal::from(MAX_UNIT_PRICE)
}

/// Whether a value is acceptable as a ledger entry amount.
///
/// Entry amounts are strictly positive; direction is carried by the
/// entry kind, never by sign.
pub fn is_valid_entry_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount <= Decimal::from(MAX_ENTRY_AMOUNT)
}
