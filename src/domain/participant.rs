use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A member of the roster.
///
/// Participants have no identifier of their own; everything else refers to
/// them by their position in the [`Ledger`](super::ledger::Ledger) roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Participant {
    name: String,
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Result<Self, LedgerError> {
        let name = name.into();
        if name.is_empty() {
            return Err(LedgerError::EmptyName);
        }
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TryFrom<String> for Participant {
    type Error = LedgerError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl From<Participant> for String {
    fn from(participant: Participant) -> Self {
        participant.name
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
