//! Event and participant types
//!
//! An event is a shared-expense group; participants are its members. Neither
//! carries balance state: balances are always derived from invoices.

use super::error::SettlementError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Event identifier
pub type EventId = String;

/// Participant identifier
pub type ParticipantId = String;

/// Invoice identifier
pub type InvoiceId = String;

/// Currencies an event can be denominated in
///
/// The currency is display context only; it never enters the arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Colombian peso
    Cop,
    /// US dollar
    Usd,
    /// Euro
    Eur,
}

impl Currency {
    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Cop => "COP",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = SettlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "COP" => Ok(Currency::Cop),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(SettlementError::validation(
                "currency",
                "Currency must be one of COP, USD, EUR",
            )),
        }
    }
}

/// A shared-expense group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub currency: Currency,
}

impl Event {
    /// Create an event, rejecting blank ids and names
    pub fn new(id: &str, name: &str, currency: Currency) -> Result<Self, SettlementError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(SettlementError::validation("eventId", "Event id is required"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(SettlementError::validation("name", "Event name is required"));
        }

        Ok(Event {
            id: id.to_string(),
            name: name.to_string(),
            currency,
        })
    }
}

/// A member of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
}

impl Participant {
    /// Create a participant, rejecting blank ids and names
    pub fn new(id: &str, name: &str) -> Result<Self, SettlementError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(SettlementError::validation("participantId", "Participant id is required"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(SettlementError::validation("name", "Name is required"));
        }

        Ok(Participant {
            id: id.to_string(),
            name: name.to_string(),
        })
    }
}
