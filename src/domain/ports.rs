use super::money::Balance;
use super::payment::Payment;

/// Turns a balances vector into the payments that settle it.
///
/// Implementations must be deterministic for a given input and must
/// terminate even when the balances do not sum to zero.
pub trait SettlementStrategy: Send + Sync {
    fn settle(&self, balances: &[Balance]) -> Vec<Payment>;
}

pub type SettlementStrategyBox = Box<dyn SettlementStrategy>;
