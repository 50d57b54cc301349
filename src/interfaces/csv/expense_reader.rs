use crate::domain::expense::Expense;
use crate::domain::ledger::Ledger;
use crate::domain::money::{Quantity, UnitCost};
use crate::error::{LedgerError, Result};
use serde::Deserialize;
use std::io::Read;

/// Separator between beneficiary names in the `paid_for` column.
pub const BENEFICIARY_SEPARATOR: char = ';';

/// One CSV row: `item, amount, cost, paid_by, paid_for`.
///
/// Participants are named rather than indexed; names are resolved against
/// the ledger roster when the row is added. An empty `amount` means one unit.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ExpenseRecord {
    pub item: String,
    pub amount: Option<Quantity>,
    pub cost: UnitCost,
    pub paid_by: String,
    pub paid_for: String,
}

impl ExpenseRecord {
    /// Resolves participant names and builds the expense.
    pub fn to_expense(&self, ledger: &Ledger) -> Result<Expense> {
        let resolve = |name: &str| {
            ledger
                .position(name)
                .ok_or_else(|| LedgerError::UnknownParticipant(name.to_owned()))
        };

        let paid_by = resolve(self.paid_by.trim())?;
        let paid_for = self
            .paid_for
            .split(BENEFICIARY_SEPARATOR)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(resolve)
            .collect::<Result<Vec<_>>>()?;

        Expense::new(
            self.item.clone(),
            self.amount.unwrap_or_default(),
            self.cost,
            paid_by,
            paid_for,
        )
    }
}

/// Reads expenses from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace around every field.
pub struct ExpenseReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ExpenseReader<R> {
    /// Creates a new `ExpenseReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily deserializes rows.
    pub fn records(self) -> impl Iterator<Item = Result<ExpenseRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }

    /// Adds every row to `ledger`, stopping at the first bad one.
    ///
    /// Rows already added stay in the ledger. Returns how many were added.
    pub fn read_into(self, ledger: &mut Ledger) -> Result<usize> {
        let mut added = 0;
        for record in self.records() {
            let expense = record?.to_expense(ledger)?;
            ledger.add_expense(expense)?;
            added += 1;
        }
        tracing::debug!(added, "read expenses from CSV");
        Ok(added)
    }
}
