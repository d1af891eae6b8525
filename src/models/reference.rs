//! Object references held by owning documents.
//!
//! A document never stores a URL, only the key returned by the gateway. The
//! field is either empty or bound to one key; a replacement upload rebinds it
//! to a fresh key and the previous object stays in the bucket.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key of a stored object, `<prefix>/<unix_ms>-<original name>`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State of a reference field on a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    Empty,
    Bound(ObjectKey),
}

impl Reference {
    pub fn key(&self) -> Option<&ObjectKey> {
        match self {
            Reference::Empty => None,
            Reference::Bound(key) => Some(key),
        }
    }

    /// Bind to a freshly uploaded key. Returns the key it replaced, if any.
    pub fn rebind(&mut self, key: ObjectKey) -> Option<ObjectKey> {
        match std::mem::replace(self, Reference::Bound(key)) {
            Reference::Empty => None,
            Reference::Bound(previous) => Some(previous),
        }
    }
}

impl From<Option<ObjectKey>> for Reference {
    fn from(value: Option<ObjectKey>) -> Self {
        value.map_or(Reference::Empty, Reference::Bound)
    }
}

impl From<Reference> for Option<ObjectKey> {
    fn from(value: Reference) -> Self {
        match value {
            Reference::Empty => None,
            Reference::Bound(key) => Some(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebinding_returns_previous_key() {
        let mut field = Reference::Empty;
        assert_eq!(field.rebind(ObjectKey::new("avatars/1-a.png")), None);

        let previous = field.rebind(ObjectKey::new("avatars/2-a.png"));
        assert_eq!(previous.as_ref().map(ObjectKey::as_str), Some("avatars/1-a.png"));
        assert_eq!(field.key().map(ObjectKey::as_str), Some("avatars/2-a.png"));
    }
}
