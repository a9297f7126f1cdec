//! Operation error taxonomy
//!
//! Three failure families map onto the envelope codes: missing rows on a read
//! (400), an insert that unexpectedly reports rows (500), and a failed
//! metadata refresh (500). Transport failures from the warehouse client also
//! surface as 500.

use serde_json::Value;
use thiserror::Error;

use crate::envelope::Envelope;
use crate::ports::WarehouseError;

#[derive(Debug, Error)]
pub enum OperationError {
    /// A read query returned zero rows.
    #[error("No rows found in {relation}")]
    NotFound { relation: String },

    /// An insert reported rows where the client's success convention is an
    /// empty result set.
    #[error("Insert into {relation} reported unexpected rows; attempted data: {data}")]
    WriteAnomaly { relation: String, data: Value },

    /// The downstream metadata refresh failed.
    #[error("{0}")]
    MetadataRefresh(String),

    /// Warehouse transport or execution failure.
    #[error(transparent)]
    Storage(#[from] WarehouseError),
}

impl OperationError {
    /// Envelope code for this failure.
    pub fn code(&self) -> u16 {
        match self {
            OperationError::NotFound { .. } => 400,
            OperationError::WriteAnomaly { .. }
            | OperationError::MetadataRefresh(_)
            | OperationError::Storage(_) => 500,
        }
    }
}

impl From<OperationError> for Envelope {
    fn from(error: OperationError) -> Self {
        Envelope::failure(error.code(), error.to_string())
    }
}
