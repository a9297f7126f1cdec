//! Uniform operation result envelope
//!
//! Every operation returns `{success: true, data}` or
//! `{success: false, code, errors: [message]}`. Failures are converted at the
//! operation boundary; nothing is rethrown to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl Envelope {
    pub fn ok(data: impl Into<Value>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            code: None,
            errors: Vec::new(),
        }
    }

    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            code: Some(code),
            errors: vec![message.into()],
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}
