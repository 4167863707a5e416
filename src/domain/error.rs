use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Error value kept in page and query state.
///
/// Source chains are flattened into `message` so the value stays cloneable
/// and serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorableError {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl StorableError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn from_error(name: impl Into<String>, error: &dyn StdError) -> Self {
        let mut message = error.to_string();
        let mut current = error.source();
        while let Some(inner) = current {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            current = inner.source();
        }
        Self::new(name, message)
    }
}

impl fmt::Display for StorableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({status}): {}", self.name, self.message),
            None => write!(f, "{}: {}", self.name, self.message),
        }
    }
}

impl StdError for StorableError {}
