use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Participant name must not be empty")]
    EmptyName,
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(rust_decimal::Decimal),
    #[error("Unit cost must not be negative, got {0}")]
    NegativeCost(rust_decimal::Decimal),
    #[error("Expense must be paid for at least one participant")]
    NoBeneficiaries,
    #[error("Expense total of {amount} x {cost} is too large to represent")]
    TotalOverflow {
        amount: rust_decimal::Decimal,
        cost: rust_decimal::Decimal,
    },
    #[error("Ledger totals would exceed the representable range")]
    VolumeOverflow,
    #[error("Participant index {index} is out of range for a roster of {len}")]
    ParticipantOutOfRange { index: usize, len: usize },
    #[error("Participant {0} is referenced by an expense")]
    ParticipantInUse(usize),
    #[error("Expense index {index} is out of range for {len} expenses")]
    ExpenseOutOfRange { index: usize, len: usize },
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// The single failure signal of the share codec.
///
/// Callers only learn that the token was unusable; the cause is logged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Share token could not be decoded")]
pub struct DecodeError;
