//! In-memory implementors index for a documentation site.
//!
//! Generated fragments (one per interface page, per library) hand their
//! descriptors to an [`Activation`] without knowing whether the page's
//! registry exists yet. Contributions queue until the page signals readiness,
//! are replayed in submission order, and go straight to the [`Registry`]
//! afterwards. The rendering side only ever sees a [`QueryView`].
//!
//! [`Catalog`] groups one activation per [`InterfacePath`];
//! [`FragmentLoader`] reads fragment files from an `implementors/` tree and
//! [`LoadPlan`] replays them with the ready signal at a chosen point.

pub mod activation;
pub mod catalog;
pub mod descriptor;
pub mod fragment;
pub mod load_plan;
pub mod query;
pub mod registry;
mod schema_loader;

pub use activation::{Activation, ActivationOutcome, ActivationState, FragmentSink};
pub use catalog::{Catalog, CatalogSnapshot, IMPLEMENTORS_DIR, InterfacePath};
pub use descriptor::{Contribution, Descriptor, LibraryKey};
pub use fragment::{Fragment, FragmentDocument, FragmentFormat, FragmentLoader, discover_fragments};
pub use load_plan::{LoadEvent, LoadOrder, LoadPlan};
pub use query::QueryView;
pub use registry::{Registry, RegistrySnapshot};
pub use schema_loader::FRAGMENT_SCHEMA_VERSION;

use anyhow::{Context, Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub const ENV_DOC_ROOT: &str = "IMPLEMENTORS_ROOT";

fn is_doc_root(candidate: &Path) -> bool {
    candidate.join(IMPLEMENTORS_DIR).is_dir()
}

/// Nearest of `start` and its ancestors holding an `implementors/` directory.
fn enclosing_doc_root(start: &Path) -> Option<&Path> {
    start.ancestors().find(|dir| is_doc_root(dir))
}

/// Locate the documentation root, the directory holding `implementors/`.
///
/// `explicit` (the CLI flag) wins, then `IMPLEMENTORS_ROOT`; a root named
/// either way must be valid. Without one, the current directory and its
/// ancestors are searched.
pub fn find_doc_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let named = match explicit {
        Some(path) => Some((path.to_path_buf(), "--root")),
        None => env::var_os(ENV_DOC_ROOT)
            .filter(|raw| !raw.is_empty())
            .map(|raw| (PathBuf::from(raw), ENV_DOC_ROOT)),
    };

    let root = match named {
        Some((path, source)) => {
            if !is_doc_root(&path) {
                bail!(
                    "{} (from {source}) does not contain an '{IMPLEMENTORS_DIR}' directory",
                    path.display()
                );
            }
            path
        }
        None => {
            let cwd = env::current_dir().context("reading current directory")?;
            let Some(found) = enclosing_doc_root(&cwd) else {
                bail!(
                    "no '{IMPLEMENTORS_DIR}' directory in {} or its ancestors. Pass --root or set {ENV_DOC_ROOT}.",
                    cwd.display()
                );
            };
            found.to_path_buf()
        }
    };
    fs::canonicalize(&root).with_context(|| format!("resolving {}", root.display()))
}

/// Load every fragment under `doc_root` and replay it into a fresh catalog,
/// signalling page readiness after `activate_after` fragments.
pub fn build_catalog(
    doc_root: &Path,
    order: LoadOrder,
    activate_after: Option<usize>,
) -> Result<Catalog> {
    let loader = FragmentLoader::new()?;
    let fragments = loader.load_all(&doc_root.join(IMPLEMENTORS_DIR))?;
    let plan = LoadPlan::new(fragments.len(), order, activate_after);
    let mut catalog = Catalog::new();
    plan.apply(&fragments, &mut catalog)?;
    Ok(catalog)
}

/// Split a `--exclude` style list on commas and whitespace.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
