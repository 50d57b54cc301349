//! Settlement of derived balances into payments.
//!
//! [`settlement::RosterOrder`] is the default and the one every caller gets
//! through [`settlement::settle`]. [`settlement::LargestFirst`] exists as an
//! explicit opt-in and is never substituted behind the caller's back.

pub mod settlement;
