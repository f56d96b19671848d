use crate::model::Collection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DekError {
    #[error("{} {id} not found", .collection.singular())]
    RecordNotFound { collection: Collection, id: u64 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Could not save {0}")]
    SaveFailed(Collection),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store error: {0}")]
    Store(String),
}

impl DekError {
    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            DekError::RecordNotFound { .. } | DekError::NotFound(_) => 404,
            DekError::Validation(_) => 400,
            DekError::Conflict(_) => 409,
            DekError::Unauthorized => 401,
            DekError::Forbidden(_) => 403,
            DekError::SaveFailed(_)
            | DekError::Io(_)
            | DekError::Serialization(_)
            | DekError::Database(_)
            | DekError::Store(_) => 500,
        }
    }

    /// Expected conditions are reported to the caller; the rest are failures worth logging.
    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }
}

pub type Result<T> = std::result::Result<T, DekError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        let not_found = DekError::RecordNotFound {
            collection: Collection::Books,
            id: 9,
        };
        assert_eq!(not_found.status_code(), 404);
        assert_eq!(not_found.to_string(), "book 9 not found");
        assert_eq!(DekError::Validation("x".into()).status_code(), 400);
        assert_eq!(DekError::Conflict("x".into()).status_code(), 409);
        assert_eq!(DekError::Unauthorized.status_code(), 401);
        assert_eq!(DekError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(DekError::SaveFailed(Collection::Quotes).status_code(), 500);
        assert!(DekError::SaveFailed(Collection::Quotes).is_internal());
        assert!(!DekError::Validation("x".into()).is_internal());
    }
}
