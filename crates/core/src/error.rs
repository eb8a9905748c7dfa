use crate::types::RecordId;

/// Error taxonomy shared by every layer of the feedback core.
///
/// `PermissionDenied` and `NotFound` are deliberately distinct: acting on
/// another account's record must never be reported as the record not
/// existing.
#[derive(Debug, thiserror::Error)]
pub enum FeedoError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: RecordId },

    #[error("Permission denied: {entity} with id {id} belongs to another account")]
    PermissionDenied { entity: &'static str, id: RecordId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Partial failure: {0}")]
    PartialFailure(String),
}

impl From<validator::ValidationErrors> for FeedoError {
    fn from(errors: validator::ValidationErrors) -> Self {
        FeedoError::Validation(errors.to_string())
    }
}
