//! Error types and result types for collection operations.
//!
//! Every fallible collection operation returns a [`CollectionResult<T>`]. Errors are
//! reported synchronously to the caller that triggered them; event publication never
//! produces an error (a full event channel only drops the event).

use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// A mutation was attempted after the collection was closed.
    /// The argument is the collection name.
    #[error("Collection {0} is closed")]
    CollectionClosed(String),
    /// A document with the given key already exists in the collection.
    /// The first argument is the document key, the second is the collection name.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// The requested document was not found in the collection.
    /// The first argument is the document key, the second is the collection name.
    #[error("Document not found {0} in collection {1}")]
    DocumentNotFound(String, String),
    /// No document in the collection satisfied the predicate.
    #[error("No matching document in collection {0}")]
    NoMatchingDocument(String),
}

impl CollectionError {
    /// Returns true for both lookup-by-key and lookup-by-predicate misses.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CollectionError::DocumentNotFound(..) | CollectionError::NoMatchingDocument(_)
        )
    }

    /// Returns true if the error was caused by a closed collection.
    pub fn is_closed(&self) -> bool {
        matches!(self, CollectionError::CollectionClosed(_))
    }
}

/// A specialized `Result` type for collection operations.
pub type CollectionResult<T> = Result<T, CollectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CollectionError::DocumentNotFound("42".to_string(), "users".to_string());
        assert_eq!(err.to_string(), "Document not found 42 in collection users");

        let err = CollectionError::CollectionClosed("users".to_string());
        assert_eq!(err.to_string(), "Collection users is closed");
    }

    #[test]
    fn test_not_found_kinds() {
        assert!(CollectionError::DocumentNotFound("1".into(), "c".into()).is_not_found());
        assert!(CollectionError::NoMatchingDocument("c".into()).is_not_found());
        assert!(!CollectionError::DocumentAlreadyExists("1".into(), "c".into()).is_not_found());
        assert!(!CollectionError::CollectionClosed("c".into()).is_not_found());
    }

    #[test]
    fn test_closed_kind() {
        assert!(CollectionError::CollectionClosed("c".into()).is_closed());
        assert!(!CollectionError::NoMatchingDocument("c".into()).is_closed());
    }
}
