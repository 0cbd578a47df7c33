//! Object store and gallery error types

use thiserror::Error;

/// Errors from the object store or from gallery operations on it
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GalleryError {
    /// The object store rejected or failed the request
    #[error("Object store error: {0}")]
    Backend(String),

    /// No object under the given key
    #[error("Object not found: {0}")]
    NotFound(String),

    /// A rendered key that cannot be used as an object key
    #[error("Invalid object key: {0:?}")]
    InvalidKey(String),

    /// A lock guarding in-process state was poisoned
    #[error("Object store lock poisoned")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            GalleryError::NotFound("a.jpg".into()).to_string(),
            "Object not found: a.jpg"
        );
        assert_eq!(
            GalleryError::InvalidKey(String::new()).to_string(),
            "Invalid object key: \"\""
        );
    }
}
