//! Shared expense tracking without a backend.
//!
//! The crate is split the same way the data flows:
//!
//! - [`domain`] - participants, expenses, balances and the [`Ledger`] that
//!   keeps roster indices consistent.
//! - [`application`] - settlement strategies turning balances into payments.
//! - [`interfaces`] - the URL-safe share token codec and CSV input/output.

pub mod application;
pub mod domain;
pub mod error;
pub mod interfaces;

pub use application::settlement::{LargestFirst, RosterOrder, settle};
pub use domain::ledger::{Ledger, compute_balances};
pub use domain::money::{Balance, EPSILON, Quantity, UnitCost};
pub use domain::payment::Payment;
pub use error::{DecodeError, LedgerError, Result};
pub use interfaces::share::{ShareCodec, ShareToken, decode, decode_or_empty, encode};
