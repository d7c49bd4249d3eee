use std::fmt;

use serde::{Deserialize, Serialize};

/// A single SQL statement produced by the query synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqlStatement(String);

impl SqlStatement {
    /// Wrap a statement, trimming surrounding whitespace.
    pub fn new(sql: impl Into<String>) -> Self {
        let sql: String = sql.into();
        Self(sql.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SqlStatement {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
