//! Memory collections.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, independent partition of stored memory records.
///
/// Collections are restricted to a fixed enumeration; any other name is a
/// validation error at the boundary, never a silently created partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Conversation history and dialogue context.
    Conversations,
    /// Facts, preferences, and learned knowledge.
    Knowledge,
    /// Open and completed tasks.
    Tasks,
}

impl Collection {
    /// Returns all collection variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Conversations, Self::Knowledge, Self::Tasks]
    }

    /// Returns the collection name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Conversations => "conversations",
            Self::Knowledge => "knowledge",
            Self::Tasks => "tasks",
        }
    }

    /// Parses a collection name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for names outside the fixed
    /// enumeration.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "conversations" => Ok(Self::Conversations),
            "knowledge" => Ok(Self::Knowledge),
            "tasks" => Ok(Self::Tasks),
            other => Err(Error::InvalidInput(format!(
                "invalid collection '{other}': use conversations, knowledge, or tasks"
            ))),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
