//! JSON shape carried inside a share token.
//!
//! Field names are single letters to keep tokens short:
//! `{"u": [name, ...], "c": [[item, amount, cost, paidBy, [paidFor, ...]], ...]}`.

use super::codec::DecodeFailure;
use crate::domain::expense::Expense;
use crate::domain::ledger::Ledger;
use crate::domain::money::{Quantity, UnitCost};
use crate::domain::participant::Participant;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct WireLedger {
    u: Vec<String>,
    c: Vec<WireExpense>,
}

/// `[item, amount, cost, paidBy, paidFor]`, serialized as a JSON array.
#[derive(Debug, Serialize, Deserialize)]
struct WireExpense(String, WireNumber, WireNumber, usize, Vec<usize>);

/// Older tokens carry the cost as a numeric string, so both forms are read.
/// Numbers are written unless the value has more precision than an `f64`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum WireNumber {
    Number(Number),
    Text(String),
}

impl From<Decimal> for WireNumber {
    /// Shortest JSON number that reads back as exactly `value`; a numeric
    /// string when no JSON number does.
    fn from(value: Decimal) -> Self {
        let value = value.normalize();
        let number = if value.scale() == 0 {
            value
                .to_i64()
                .map(Number::from)
                .or_else(|| value.to_u64().map(Number::from))
        } else {
            None
        };
        number
            .or_else(|| value.to_f64().and_then(Number::from_f64))
            .filter(|number| parse_decimal(&number.to_string()) == Some(value))
            .map_or_else(|| Self::Text(value.to_string()), Self::Number)
    }
}

impl WireExpense {
    fn into_expense(self) -> Result<Expense, DecodeFailure> {
        let Self(item, amount, cost, paid_by, paid_for) = self;
        let amount = Quantity::new(amount.to_decimal()?)?;
        let cost = UnitCost::new(cost.to_decimal()?)?;
        Ok(Expense::new(item, amount, cost, paid_by, paid_for)?)
    }
}

impl WireNumber {
    fn to_decimal(&self) -> Result<Decimal, DecodeFailure> {
        let parsed = match self {
            Self::Number(number) => match (number.as_i64(), number.as_u64()) {
                (Some(int), _) => Some(Decimal::from(int)),
                (None, Some(int)) => Some(Decimal::from(int)),
                (None, None) => parse_decimal(&number.to_string()),
            },
            Self::Text(text) => parse_decimal(text.trim()),
        };
        parsed.ok_or_else(|| DecodeFailure::InvalidNumber(format!("{self:?}")))
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

impl From<&Ledger> for WireLedger {
    fn from(ledger: &Ledger) -> Self {
        Self {
            u: ledger
                .participants()
                .iter()
                .map(|p| p.name().to_owned())
                .collect(),
            c: ledger
                .expenses()
                .iter()
                .map(|e| {
                    WireExpense(
                        e.item().to_owned(),
                        e.amount().value().into(),
                        e.cost().value().into(),
                        e.paid_by(),
                        e.paid_for().to_vec(),
                    )
                })
                .collect(),
        }
    }
}

impl WireLedger {
    /// Validates the decoded shape and rebuilds the ledger from it.
    pub(super) fn into_ledger(self) -> Result<Ledger, DecodeFailure> {
        let participants = self
            .u
            .into_iter()
            .map(Participant::new)
            .collect::<Result<Vec<_>, _>>()?;

        let expenses = self
            .c
            .into_iter()
            .map(WireExpense::into_expense)
            .collect::<Result<Vec<_>, DecodeFailure>>()?;

        Ok(Ledger::from_parts(participants, expenses)?)
    }
}
