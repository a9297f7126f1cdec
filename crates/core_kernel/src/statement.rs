//! Parameterized SQL statements
//!
//! The warehouse client consumes SQL text with `@name` named placeholders
//! plus a bindings map. Values always travel through the bindings map; only
//! identifiers originating from trusted configuration are ever part of the
//! SQL text itself.

use serde_json::Value;
use std::collections::BTreeMap;

/// Named parameter bindings. Ordered map so statement rendering and test
/// assertions are deterministic.
pub type Params = BTreeMap<String, Value>;

/// A parameterized SQL statement ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Params,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Params) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// A statement with no bindings.
    pub fn bare(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Params::new(),
        }
    }
}
