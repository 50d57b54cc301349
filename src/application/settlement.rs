use crate::domain::money::{Balance, EPSILON};
use crate::domain::payment::Payment;
use crate::domain::ports::SettlementStrategy;
use rust_decimal::Decimal;

/// Settles balances with the default [`RosterOrder`] sweep.
pub fn settle(balances: &[Balance]) -> Vec<Payment> {
    RosterOrder::default().settle(balances)
}

/// Single sweep over the roster in index order.
///
/// Each creditor, taken in roster order, collects from each debtor, again in
/// roster order, as much as both sides allow. The pairing depends only on
/// positions, never on magnitudes, so the same ledger always produces the
/// same payments. It does not minimise the number of transfers.
#[derive(Debug, Clone, Copy)]
pub struct RosterOrder {
    pub epsilon: Decimal,
}

/// Pairs the largest creditor with the largest debtor until nothing is left.
///
/// Usually needs fewer transfers than [`RosterOrder`], at the cost of
/// payments that move around when a single expense changes. Ties go to the
/// lower roster index.
#[derive(Debug, Clone, Copy)]
pub struct LargestFirst {
    pub epsilon: Decimal,
}

impl Default for RosterOrder {
    fn default() -> Self {
        Self { epsilon: EPSILON }
    }
}

impl Default for LargestFirst {
    fn default() -> Self {
        Self { epsilon: EPSILON }
    }
}

impl SettlementStrategy for RosterOrder {
    fn settle(&self, balances: &[Balance]) -> Vec<Payment> {
        let mut remaining = balances.to_vec();
        let mut payments = Vec::new();

        for creditor in 0..remaining.len() {
            if remaining[creditor] <= Balance::ZERO {
                continue;
            }
            for debtor in 0..remaining.len() {
                if remaining[debtor] >= Balance::ZERO {
                    continue;
                }
                let amount = remaining[creditor].value().min(-remaining[debtor].value());
                if amount > self.epsilon {
                    transfer(&mut remaining, &mut payments, debtor, creditor, amount);
                }
            }
        }

        payments
    }
}

impl SettlementStrategy for LargestFirst {
    fn settle(&self, balances: &[Balance]) -> Vec<Payment> {
        let mut remaining = balances.to_vec();
        let mut payments = Vec::new();

        // Every round zeroes one side exactly, so this runs at most n times.
        while let (Some(creditor), Some(debtor)) = (
            extreme(&remaining, |b| b.is_credit(self.epsilon), |a, b| a > b),
            extreme(&remaining, |b| b.is_debit(self.epsilon), |a, b| a < b),
        ) {
            let amount = remaining[creditor].value().min(-remaining[debtor].value());
            transfer(&mut remaining, &mut payments, debtor, creditor, amount);
        }

        payments
    }
}

fn transfer(
    remaining: &mut [Balance],
    payments: &mut Vec<Payment>,
    from: usize,
    to: usize,
    amount: Decimal,
) {
    tracing::trace!(from, to, %amount, "settlement payment");
    remaining[to] -= Balance::new(amount);
    remaining[from] += Balance::new(amount);
    payments.push(Payment::new(from, to, amount));
}

/// First index holding the most extreme balance among those passing `keep`.
fn extreme(
    balances: &[Balance],
    keep: impl Fn(&Balance) -> bool,
    beats: impl Fn(&Balance, &Balance) -> bool,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, balance) in balances.iter().enumerate() {
        if !keep(balance) {
            continue;
        }
        match best {
            Some(current) if !beats(balance, &balances[current]) => {}
            _ => best = Some(index),
        }
    }
    best
}
