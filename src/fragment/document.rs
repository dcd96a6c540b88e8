use crate::catalog::InterfacePath;
use crate::descriptor::{Contribution, Descriptor, LibraryKey};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// JSON form of a fragment, already validated against the fragment schema.
pub struct FragmentDocument {
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    pub implementors: BTreeMap<LibraryKey, Vec<Descriptor>>,
}

impl FragmentDocument {
    pub fn interface(&self) -> Result<Option<InterfacePath>> {
        self.interface
            .as_deref()
            .map(InterfacePath::parse)
            .transpose()
    }

    /// One contribution per library, in key order.
    pub fn into_contributions(self) -> Vec<Contribution> {
        self.implementors
            .into_iter()
            .map(|(library, descriptors)| Contribution {
                library,
                descriptors,
            })
            .collect()
    }
}
