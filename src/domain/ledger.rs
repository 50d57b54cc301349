use super::expense::Expense;
use super::money::Balance;
use super::participant::Participant;
use super::payment::Payment;
use super::ports::SettlementStrategy;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use std::iter;

/// Derives the net balance of every participant from the expense list.
///
/// Each expense credits its full total to the payer and debits an equal
/// share from every beneficiary. A payer who is also a beneficiary is
/// debited like anyone else and so nets only the shares of the others.
///
/// # Panics
///
/// Panics if an expense refers to an index outside `participants`, or if
/// the expense totals together overflow a `Decimal`. [`Ledger`] never lets
/// such an expense in.
pub fn compute_balances(participants: &[Participant], expenses: &[Expense]) -> Vec<Balance> {
    let mut balances = vec![Balance::ZERO; participants.len()];

    for expense in expenses {
        let share = Balance::new(expense.share());
        for &beneficiary in expense.paid_for() {
            balances[beneficiary] -= share;
        }
        balances[expense.paid_by()] += Balance::new(expense.total());
    }

    balances
}

/// The roster and the expenses that refer to it, kept in sync.
///
/// Expenses refer to participants by roster position, so the ledger is the
/// only place where both are mutated. Every index an expense holds is valid
/// for as long as the expense is part of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    participants: Vec<Participant>,
    expenses: Vec<Expense>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a ledger, checking every expense against the roster.
    pub fn from_parts(participants: Vec<Participant>, expenses: Vec<Expense>) -> Result<Self> {
        let ledger = Self {
            participants,
            expenses: Vec::new(),
        };
        for expense in &expenses {
            ledger.check_participant(expense.max_index())?;
        }
        volume(&expenses)?;
        tracing::debug!(
            participants = ledger.participants.len(),
            expenses = expenses.len(),
            "assembled ledger"
        );
        Ok(Self { expenses, ..ledger })
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty() && self.expenses.is_empty()
    }

    /// Position of the first participant called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.participants.iter().position(|p| p.name() == name)
    }

    /// Appends a participant and returns their index.
    pub fn add_participant(&mut self, name: impl Into<String>) -> Result<usize> {
        let participant = Participant::new(name)?;
        tracing::debug!(name = participant.name(), "adding participant");
        self.participants.push(participant);
        Ok(self.participants.len() - 1)
    }

    /// Removes a participant nobody's expenses refer to.
    ///
    /// Indices of later participants shift down by one, and every expense is
    /// remapped accordingly.
    pub fn remove_participant(&mut self, index: usize) -> Result<Participant> {
        self.check_participant(index)?;
        if self.expenses.iter().any(|e| e.references(index)) {
            return Err(LedgerError::ParticipantInUse(index));
        }

        let removed = self.participants.remove(index);
        for expense in &mut self.expenses {
            expense.remap_after_removal(index);
        }
        tracing::debug!(name = removed.name(), index, "removed participant");
        Ok(removed)
    }

    /// Appends an expense and returns its index.
    pub fn add_expense(&mut self, expense: Expense) -> Result<usize> {
        self.check_participant(expense.max_index())?;
        volume(self.expenses.iter().chain(iter::once(&expense)))?;
        tracing::debug!(
            item = expense.item(),
            total = %expense.total(),
            beneficiaries = expense.paid_for().len(),
            "adding expense"
        );
        self.expenses.push(expense);
        Ok(self.expenses.len() - 1)
    }

    pub fn remove_expense(&mut self, index: usize) -> Result<Expense> {
        if index >= self.expenses.len() {
            return Err(LedgerError::ExpenseOutOfRange {
                index,
                len: self.expenses.len(),
            });
        }
        Ok(self.expenses.remove(index))
    }

    pub fn balances(&self) -> Vec<Balance> {
        compute_balances(&self.participants, &self.expenses)
    }

    pub fn settle(&self, strategy: &dyn SettlementStrategy) -> Vec<Payment> {
        strategy.settle(&self.balances())
    }

    fn check_participant(&self, index: usize) -> Result<()> {
        if index < self.participants.len() {
            Ok(())
        } else {
            Err(LedgerError::ParticipantOutOfRange {
                index,
                len: self.participants.len(),
            })
        }
    }
}

/// Sum of every expense total.
///
/// Any partial balance is bounded by this sum, so a ledger whose volume fits
/// in a `Decimal` can always derive its balances.
fn volume<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Result<Decimal> {
    expenses
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, expense| sum.checked_add(expense.total()))
        .ok_or(LedgerError::VolumeOverflow)
}
