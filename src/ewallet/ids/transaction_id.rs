use std::fmt;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

/// Identifier handed out by a `TransactionRepository` when an entry is appended
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn generate() -> Self {
        return Self(Uuid::new_v4().to_string());
    }

    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        return Self(id.to_string());
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(f, "{}", self.0);
    }
}
