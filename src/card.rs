//! Membership cards and library staff

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of membership a card grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Teacher,
    Student,
}

impl CardType {
    /// Get the stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Teacher => "Teacher",
            CardType::Student => "Student",
        }
    }
}

impl FromStr for CardType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "teacher" | "t" => Ok(CardType::Teacher),
            "student" | "s" => Ok(CardType::Student),
            _ => Err(Error::InvalidCardType(s.to_string())),
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A library card as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub card_type: CardType,
}

/// Information needed to issue a new card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    pub name: String,
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub card_type: CardType,
}

/// A staff member who can issue loans.
///
/// The password is never carried out of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    pub id: i64,
    pub name: String,
}
