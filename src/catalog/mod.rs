//! Site-wide view over interface pages.
//!
//! Every documented interface gets its own page, and every page owns an
//! [`Activation`](crate::Activation) that merges the fragments emitted for
//! it. Callers use `InterfacePath` to address pages and `Catalog` to submit,
//! activate, and query them.

pub mod identity;
pub mod index;

pub use identity::InterfacePath;
pub use index::{Catalog, CatalogSnapshot};

/// Directory under the documentation root that holds generated fragments.
pub const IMPLEMENTORS_DIR: &str = "implementors";
