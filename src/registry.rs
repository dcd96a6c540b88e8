//! Merged index of implementor descriptors keyed by library.
//!
//! The registry is a passive, append-only aggregator. It never deduplicates,
//! reorders, or validates what producers hand it; a library's sequence is the
//! concatenation of every contribution registered for it, in call order.

use crate::descriptor::{Descriptor, LibraryKey};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registry {
    by_library: BTreeMap<LibraryKey, Vec<Descriptor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `descriptors` under `library`, creating the entry if needed.
    ///
    /// An empty sequence is tolerated and leaves the index untouched, so a
    /// library only shows up in [`Registry::keys`] once it has implementors.
    pub fn register(&mut self, library: LibraryKey, descriptors: Vec<Descriptor>) {
        if descriptors.is_empty() {
            trace!(library = %library, "ignoring empty contribution");
            return;
        }
        trace!(library = %library, count = descriptors.len(), "registering descriptors");
        self.by_library
            .entry(library)
            .or_default()
            .extend(descriptors);
    }

    /// Descriptors registered for `library`; empty when the key is unknown.
    pub fn lookup(&self, library: &LibraryKey) -> &[Descriptor] {
        self.by_library
            .get(library)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterates known libraries in stable order.
    pub fn keys(&self) -> impl Iterator<Item = &LibraryKey> {
        self.by_library.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LibraryKey, &[Descriptor])> {
        self.by_library
            .iter()
            .map(|(library, descriptors)| (library, descriptors.as_slice()))
    }

    /// Number of libraries with at least one descriptor.
    pub fn len(&self) -> usize {
        self.by_library.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_library.is_empty()
    }

    pub fn descriptor_count(&self) -> usize {
        self.by_library.values().map(Vec::len).sum()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            libraries: self.by_library.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
/// Owned, serialisable copy of the index for output and comparisons.
pub struct RegistrySnapshot {
    pub libraries: BTreeMap<LibraryKey, Vec<Descriptor>>,
}
