//! Saved playground code

use crate::error::SetuError;
use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SNIPPET_KEY_PREFIX: &str = "code_";

/// Code saved from the playground
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub code: String,
    pub language: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Snippet persistence on top of a key-value store
pub struct SnippetStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SnippetStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Save code and return its id
    pub fn save(&mut self, code: &str, language: &str, user_id: &str) -> Result<String, SetuError> {
        let id = Uuid::new_v4().simple().to_string();
        let snippet = Snippet {
            code: code.to_string(),
            language: language.to_string(),
            user_id: user_id.to_string(),
            timestamp: Utc::now(),
        };
        self.store
            .write(&Self::key(&id), &serde_json::to_string(&snippet)?)?;
        Ok(id)
    }

    /// Load a snippet by id
    pub fn load(&self, id: &str) -> Result<Option<Snippet>, SetuError> {
        match self.store.read(&Self::key(id))? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn key(id: &str) -> String {
        format!("{}{}", SNIPPET_KEY_PREFIX, id)
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_save_and_load() {
        let mut snippets = SnippetStore::new(MemoryStore::new());
        let id = snippets.save("print('hi')", "python", "student-1").unwrap();

        let loaded = snippets.load(&id).unwrap().unwrap();
        assert_eq!(loaded.code, "print('hi')");
        assert_eq!(loaded.language, "python");
        assert_eq!(loaded.user_id, "student-1");

        let raw = snippets.into_inner().read(&format!("code_{}", id)).unwrap();
        assert!(raw.is_some());
    }

    #[test]
    fn test_unknown_id() {
        let snippets = SnippetStore::new(MemoryStore::new());
        assert!(snippets.load("missing").unwrap().is_none());
    }

    #[test]
    fn test_save_fails_when_storage_unavailable() {
        let mut store = MemoryStore::new();
        store.set_unavailable(true);
        let mut snippets = SnippetStore::new(store);
        assert!(matches!(
            snippets.save("x", "python", "u"),
            Err(SetuError::StorageUnavailable(_))
        ));
    }
}
