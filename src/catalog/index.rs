//! Per-interface pages, each with its own activation protocol and registry.
//!
//! Pages are created lazily on first submission. Before the site signals
//! readiness they start out buffering, the same way a documentation page's
//! fragments may run before its scripts have set up the registry; once the
//! signal has been seen, new pages are created already direct. Queries
//! against unknown interfaces return empty views.

use crate::activation::{Activation, ActivationOutcome, FragmentSink};
use crate::catalog::InterfacePath;
use crate::descriptor::{Contribution, Descriptor, LibraryKey};
use crate::query::QueryView;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct Catalog {
    pages: BTreeMap<InterfacePath, Activation>,
    ready: bool,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a contribution to the page documenting `interface`.
    pub fn submit(&mut self, interface: &InterfacePath, contribution: Contribution) {
        self.page_mut(interface).submit(contribution);
    }

    /// Signal that the page for `interface` is ready.
    pub fn activate(&mut self, interface: &InterfacePath) -> ActivationOutcome {
        self.page_mut(interface).activate()
    }

    /// Signal readiness on every known page and on every page created later;
    /// returns how many existing pages switched.
    pub fn activate_all(&mut self) -> usize {
        self.ready = true;
        let mut activated = 0;
        for (interface, page) in &mut self.pages {
            if let ActivationOutcome::Activated { replayed } = page.activate() {
                debug!(interface = %interface, replayed, "page activated");
                activated += 1;
            }
        }
        activated
    }

    pub fn query(&self, interface: &InterfacePath) -> QueryView<'_> {
        self.pages
            .get(interface)
            .map(Activation::query)
            .unwrap_or_else(QueryView::empty)
    }

    /// Iterates interfaces with a page, in stable order.
    pub fn interfaces(&self) -> impl Iterator<Item = &InterfacePath> {
        self.pages.keys()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn page(&self, interface: &InterfacePath) -> Option<&Activation> {
        self.pages.get(interface)
    }

    /// Every interface `library` implements, with its descriptors.
    pub fn implementors_by_library(
        &self,
        library: &LibraryKey,
    ) -> Vec<(&InterfacePath, &[Descriptor])> {
        self.pages
            .iter()
            .filter_map(|(interface, page)| {
                let descriptors = page.query().lookup(library);
                (!descriptors.is_empty()).then_some((interface, descriptors))
            })
            .collect()
    }

    /// Descriptors from every library except the ones documented on the page
    /// itself; a crate's own implementations are listed elsewhere on its page.
    pub fn foreign_implementors(
        &self,
        interface: &InterfacePath,
        local: &[LibraryKey],
    ) -> Vec<(&LibraryKey, &[Descriptor])> {
        self.query(interface)
            .iter()
            .filter(|(library, _)| !local.contains(*library))
            .collect()
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            interfaces: self
                .pages
                .iter()
                .map(|(interface, page)| {
                    (interface.clone(), page.query().snapshot().libraries)
                })
                .collect(),
        }
    }

    fn page_mut(&mut self, interface: &InterfacePath) -> &mut Activation {
        let ready = self.ready;
        self.pages.entry(interface.clone()).or_insert_with(|| {
            let mut page = Activation::new();
            if ready {
                page.activate();
                debug!(interface = %interface, "page created after ready signal");
            }
            page
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CatalogSnapshot {
    pub interfaces: BTreeMap<InterfacePath, BTreeMap<LibraryKey, Vec<Descriptor>>>,
}
