//! Read-only view handed to the rendering layer.
//!
//! A `QueryView` never exposes the pending buffer or the activation state.
//! Before activation there is no registry behind it and every query comes
//! back empty.

use crate::descriptor::{Descriptor, LibraryKey};
use crate::registry::{Registry, RegistrySnapshot};

#[derive(Debug, Clone, Copy)]
pub struct QueryView<'a> {
    registry: Option<&'a Registry>,
}

impl<'a> QueryView<'a> {
    pub(crate) fn new(registry: Option<&'a Registry>) -> Self {
        Self { registry }
    }

    /// View with nothing behind it, used for pages that do not exist.
    pub fn empty() -> Self {
        Self { registry: None }
    }

    pub fn lookup(&self, library: &LibraryKey) -> &'a [Descriptor] {
        match self.registry {
            Some(registry) => registry.lookup(library),
            None => &[],
        }
    }

    pub fn keys(self) -> impl Iterator<Item = &'a LibraryKey> {
        self.registry
            .into_iter()
            .flat_map(|registry| registry.keys())
    }

    pub fn iter(self) -> impl Iterator<Item = (&'a LibraryKey, &'a [Descriptor])> {
        self.registry
            .into_iter()
            .flat_map(|registry| registry.iter())
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry
            .map(Registry::snapshot)
            .unwrap_or_else(|| Registry::new().snapshot())
    }
}
