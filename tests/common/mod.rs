#![allow(dead_code)]

use quanto::domain::expense::Expense;
use quanto::domain::money::{Quantity, UnitCost};
use quanto::Ledger;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;

/// Builds a ledger with up to `max_participants` people and `expenses`
/// random purchases. Costs are whole cents, quantities tenths of a unit.
pub fn random_ledger(seed: u64, max_participants: usize, expenses: usize) -> Ledger {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ledger = Ledger::new();

    let participants = rng.gen_range(1..=max_participants);
    for i in 0..participants {
        ledger.add_participant(format!("P{i}")).unwrap();
    }

    for i in 0..expenses {
        let amount = Quantity::new(Decimal::new(rng.gen_range(1..500), 1)).unwrap();
        let cost = UnitCost::new(Decimal::new(rng.gen_range(0..100_000), 2)).unwrap();
        let paid_by = rng.gen_range(0..participants);
        let mut paid_for: Vec<usize> = (0..participants).filter(|_| rng.gen_bool(0.5)).collect();
        if paid_for.is_empty() {
            paid_for.push(rng.gen_range(0..participants));
        }
        let expense = Expense::new(format!("item {i}"), amount, cost, paid_by, paid_for).unwrap();
        ledger.add_expense(expense).unwrap();
    }

    ledger
}

/// Writes `ledger` as an expenses CSV, naming participants.
pub fn write_expenses_csv(path: &Path, ledger: &Ledger) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["item", "amount", "cost", "paid_by", "paid_for"])?;

    let name = |index: usize| ledger.participants()[index].name();
    for expense in ledger.expenses() {
        let amount = expense.amount().value().to_string();
        let cost = expense.cost().value().to_string();
        let paid_for: Vec<&str> = expense.paid_for().iter().map(|&i| name(i)).collect();
        let paid_for = paid_for.join(";");
        wtr.write_record([
            expense.item(),
            amount.as_str(),
            cost.as_str(),
            name(expense.paid_by()),
            paid_for.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
