//! Record type stored by the database facade.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A database row: numeric identifier plus a text payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub data: String,
}

impl Record {
    /// Create a new record
    pub fn new(id: i64, data: impl Into<String>) -> Self {
        Self {
            id,
            data: data.into(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID: {}, Data: {}", self.id, self.data)
    }
}
