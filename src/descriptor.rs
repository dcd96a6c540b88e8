//! Identity and payload types shared by producers and the registry.
//!
//! Everything here is an opaque, immutable value: the registry stores
//! descriptors exactly as the fragment generator rendered them and never
//! looks inside.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Name of the library (crate, package) a set of implementors belongs to.
pub struct LibraryKey(pub String);

impl LibraryKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LibraryKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LibraryKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for LibraryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Pre-rendered markup describing one type that implements one interface,
/// generics and `where` clauses included.
pub struct Descriptor(pub String);

impl Descriptor {
    pub fn as_markup(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Descriptor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Descriptor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One producer's complete submission for a single library.
pub struct Contribution {
    pub library: LibraryKey,
    pub descriptors: Vec<Descriptor>,
}

impl Contribution {
    pub fn new<L, I, D>(library: L, descriptors: I) -> Self
    where
        L: Into<LibraryKey>,
        I: IntoIterator<Item = D>,
        D: Into<Descriptor>,
    {
        Self {
            library: library.into(),
            descriptors: descriptors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contribution_keeps_descriptor_order() {
        let contribution = Contribution::new("petgraph", ["impl b", "impl a", "impl b"]);
        let markup: Vec<&str> = contribution
            .descriptors
            .iter()
            .map(Descriptor::as_markup)
            .collect();
        assert_eq!(markup, vec!["impl b", "impl a", "impl b"]);
        assert_eq!(contribution.library.as_str(), "petgraph");
    }

    #[test]
    fn keys_serialize_as_plain_strings() {
        let json = serde_json::to_string(&Contribution::new("libA", ["impl1"])).unwrap();
        assert_eq!(json, r#"{"library":"libA","descriptors":["impl1"]}"#);
    }
}
