//! Storage entity traits

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

/// Trait for types that can be used as document keys
pub trait StorageKey: Clone + Debug + Send + Sync + Eq + std::hash::Hash {
    /// Returns the key as a string for backends that require string keys
    fn as_str(&self) -> &str;
}

/// Trait for documents kept in a collection
///
/// The serialized JSON form of the entity is what queries are evaluated
/// against, so field names in filters use the serde names (camelCase).
pub trait StorageEntity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned {
    type Key: StorageKey;

    fn key(&self) -> &Self::Key;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    struct NoteId(String);

    impl StorageKey for NoteId {
        fn as_str(&self) -> &str {
            &self.0
        }
    }

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    struct Note {
        id: NoteId,
        body: String,
    }

    impl StorageEntity for Note {
        type Key = NoteId;

        fn key(&self) -> &Self::Key {
            &self.id
        }
    }

    #[test]
    fn test_entity_key() {
        let note = Note {
            id: NoteId("note-1".to_string()),
            body: "hello".to_string(),
        };
        assert_eq!(note.key().as_str(), "note-1");
    }
}
