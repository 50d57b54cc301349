//! Data model shared by settlement and the share codec.

pub mod expense;
pub mod ledger;
pub mod money;
pub mod participant;
pub mod payment;
pub mod ports;
