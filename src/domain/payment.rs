use rust_decimal::Decimal;
use serde::Serialize;

/// One suggested transfer: `from` pays `to` the given `amount`.
///
/// Payments are derived from balances on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub from: usize,
    pub to: usize,
    pub amount: Decimal,
}

impl Payment {
    pub fn new(from: usize, to: usize, amount: Decimal) -> Self {
        debug_assert_ne!(from, to, "participant cannot pay themselves");
        debug_assert!(amount > Decimal::ZERO, "payment amount must be positive");
        Self { from, to, amount }
    }
}
