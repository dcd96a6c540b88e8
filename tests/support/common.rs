#![allow(dead_code)]

use anyhow::{Context, Result};
use implementors::{Activation, Contribution, FragmentSink, LibraryKey, RegistrySnapshot};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// Temporary documentation root with an `implementors/` tree that tests can
// populate with script or JSON fragments.
pub struct DocTree {
    dir: TempDir,
}

impl DocTree {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("creating temporary doc root")?;
        fs::create_dir_all(dir.path().join("implementors"))?;
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn implementors_dir(&self) -> PathBuf {
        self.dir.path().join("implementors")
    }

    /// Write `contents` at `relative` under `implementors/`.
    pub fn write(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.implementors_dir().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)
            .with_context(|| format!("writing fragment {}", path.display()))?;
        Ok(path)
    }

    /// Write a fragment in the generated script form.
    pub fn write_script(&self, relative: &str, libraries: &[(&str, &[&str])]) -> Result<PathBuf> {
        self.write(relative, &script_fragment(libraries))
    }

    /// Write a schema-conforming JSON fragment.
    pub fn write_json(&self, relative: &str, libraries: &[(&str, &[&str])]) -> Result<PathBuf> {
        let implementors: serde_json::Map<String, serde_json::Value> = libraries
            .iter()
            .map(|(library, descriptors)| (library.to_string(), json!(descriptors)))
            .collect();
        let body = json!({
            "schema_version": implementors::FRAGMENT_SCHEMA_VERSION,
            "implementors": implementors,
        });
        self.write(relative, &serde_json::to_string_pretty(&body)?)
    }
}

/// Render libraries the way the documentation generator does.
pub fn script_fragment(libraries: &[(&str, &[&str])]) -> String {
    let mut body = String::from("(function() {var implementors = {};\n");
    for (library, descriptors) in libraries {
        let items: String = descriptors
            .iter()
            .map(|d| format!("{},", serde_json::to_string(d).unwrap_or_default()))
            .collect();
        body.push_str(&format!("implementors['{library}'] = [{items}];\n"));
    }
    body.push_str(
        "\n            if (window.register_implementors) {\n                window.register_implementors(implementors);\n            } else {\n                window.pending_implementors = implementors;\n            }\n        \n})()\n",
    );
    body
}

pub fn contribution(library: &str, descriptors: &[&str]) -> Contribution {
    Contribution::new(library, descriptors.iter().copied())
}

pub fn markup(activation: &Activation, library: &str) -> Vec<String> {
    activation
        .query()
        .lookup(&LibraryKey::from(library))
        .iter()
        .map(|d| d.as_markup().to_string())
        .collect()
}

/// Feed `contributions` through a fresh protocol, activating after the first
/// `activate_after` of them, and return the final registry contents.
pub fn merged_with_activation_at(
    contributions: &[Contribution],
    activate_after: usize,
) -> RegistrySnapshot {
    let mut activation = Activation::new();
    for (index, contribution) in contributions.iter().enumerate() {
        if index == activate_after {
            activation.activate();
        }
        activation.submit(contribution.clone());
    }
    activation.activate();
    activation.query().snapshot()
}
