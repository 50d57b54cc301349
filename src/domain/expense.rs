use super::money::{Quantity, UnitCost};
use crate::error::LedgerError;
use rust_decimal::Decimal;

/// One shared purchase.
///
/// `paid_by` advanced the money; everyone in `paid_for` benefits and carries
/// an equal share of [`Expense::total`]. Indices refer to the roster of the
/// ledger the expense belongs to and are checked when it is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    item: String,
    amount: Quantity,
    cost: UnitCost,
    paid_by: usize,
    paid_for: Vec<usize>,
    total: Decimal,
}

impl Expense {
    /// Builds an expense, dropping repeated beneficiaries.
    ///
    /// Fails when nobody benefits, since the total could not be split, or
    /// when `amount × cost` does not fit in a `Decimal`.
    pub fn new(
        item: impl Into<String>,
        amount: Quantity,
        cost: UnitCost,
        paid_by: usize,
        paid_for: impl IntoIterator<Item = usize>,
    ) -> Result<Self, LedgerError> {
        let mut beneficiaries = Vec::new();
        for index in paid_for {
            if !beneficiaries.contains(&index) {
                beneficiaries.push(index);
            }
        }
        if beneficiaries.is_empty() {
            return Err(LedgerError::NoBeneficiaries);
        }
        let total = amount
            .value()
            .checked_mul(cost.value())
            .ok_or(LedgerError::TotalOverflow {
                amount: amount.value(),
                cost: cost.value(),
            })?;

        Ok(Self {
            item: item.into(),
            amount,
            cost,
            paid_by,
            paid_for: beneficiaries,
            total,
        })
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn amount(&self) -> Quantity {
        self.amount
    }

    pub fn cost(&self) -> UnitCost {
        self.cost
    }

    pub fn paid_by(&self) -> usize {
        self.paid_by
    }

    pub fn paid_for(&self) -> &[usize] {
        &self.paid_for
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    /// What each beneficiary is charged.
    pub fn share(&self) -> Decimal {
        self.total() / Decimal::from(self.paid_for.len())
    }

    pub fn references(&self, participant: usize) -> bool {
        self.paid_by == participant || self.paid_for.contains(&participant)
    }

    /// Largest participant index this expense refers to.
    pub(crate) fn max_index(&self) -> usize {
        self.paid_for
            .iter()
            .copied()
            .fold(self.paid_by, usize::max)
    }

    /// Shifts every index above `removed` down by one.
    pub(crate) fn remap_after_removal(&mut self, removed: usize) {
        let shift = |index: &mut usize| {
            if *index > removed {
                *index -= 1;
            }
        };
        shift(&mut self.paid_by);
        self.paid_for.iter_mut().for_each(shift);
    }
}
