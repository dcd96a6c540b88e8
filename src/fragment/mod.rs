//! Fragment discovery and loading.
//!
//! Fragments live under `<doc root>/implementors/`, one file per interface
//! page, mirroring the interface's module path
//! (`implementors/core/fmt/trait.Display.js`). Both the generated script form
//! and a JSON form are accepted; JSON fragments are checked against the
//! bundled schema before they are read.

pub mod document;
pub mod script;

pub use document::FragmentDocument;
pub use script::ScriptParser;

use crate::catalog::InterfacePath;
use crate::descriptor::Contribution;
use crate::schema_loader::FragmentSchema;
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentFormat {
    Script,
    Json,
}

impl FragmentFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("js") => Some(FragmentFormat::Script),
            Some("json") => Some(FragmentFormat::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Everything one fragment file contributes to one interface page.
pub struct Fragment {
    /// Path relative to the implementors directory.
    pub path: PathBuf,
    pub interface: InterfacePath,
    pub contributions: Vec<Contribution>,
}

/// Parses fragment files; holds the compiled pattern and schema so a whole
/// tree can be read without recompiling either.
pub struct FragmentLoader {
    script: ScriptParser,
    schema: FragmentSchema,
}

impl FragmentLoader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            script: ScriptParser::new()?,
            schema: FragmentSchema::bundled()?,
        })
    }

    /// Load every fragment under `implementors_dir`, in discovery order.
    pub fn load_all(&self, implementors_dir: &Path) -> Result<Vec<Fragment>> {
        discover_fragments(implementors_dir)?
            .iter()
            .map(|path| self.load(implementors_dir, path))
            .collect()
    }

    /// Load one fragment. The interface comes from the path relative to
    /// `implementors_dir` unless a JSON fragment names it explicitly.
    pub fn load(&self, implementors_dir: &Path, path: &Path) -> Result<Fragment> {
        let relative = path.strip_prefix(implementors_dir).with_context(|| {
            format!(
                "fragment {} is outside {}",
                path.display(),
                implementors_dir.display()
            )
        })?;
        let (declared, contributions) = self.read(path)?;
        let interface = match declared {
            Some(interface) => interface,
            None => InterfacePath::from_fragment_path(relative)?,
        };
        debug!(
            path = %relative.display(),
            interface = %interface,
            contributions = contributions.len(),
            "loaded fragment"
        );
        Ok(Fragment {
            path: relative.to_path_buf(),
            interface,
            contributions,
        })
    }

    /// Parse a fragment file on its own, without deriving an interface from
    /// its location. Returns the interface only when the fragment declares it.
    pub fn read(&self, path: &Path) -> Result<(Option<InterfacePath>, Vec<Contribution>)> {
        let Some(format) = FragmentFormat::from_path(path) else {
            bail!(
                "unsupported fragment {} (expected .js or .json)",
                path.display()
            );
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading fragment {}", path.display()))?;
        self.parse(format, &text, &path.display().to_string())
    }

    pub fn parse(
        &self,
        format: FragmentFormat,
        text: &str,
        origin: &str,
    ) -> Result<(Option<InterfacePath>, Vec<Contribution>)> {
        match format {
            FragmentFormat::Script => {
                let contributions = self
                    .script
                    .parse(text)
                    .with_context(|| format!("parsing fragment script {origin}"))?;
                Ok((None, contributions))
            }
            FragmentFormat::Json => {
                let value: Value = serde_json::from_str(text)
                    .with_context(|| format!("parsing fragment JSON {origin}"))?;
                self.schema.validate(&value, origin)?;
                let document: FragmentDocument = serde_json::from_value(value)
                    .with_context(|| format!("decoding fragment {origin}"))?;
                let interface = document.interface()?;
                Ok((interface, document.into_contributions()))
            }
        }
    }
}

/// Recursively list fragment files under `implementors_dir`, sorted by path.
pub fn discover_fragments(implementors_dir: &Path) -> Result<Vec<PathBuf>> {
    if !implementors_dir.is_dir() {
        bail!(
            "implementors directory {} does not exist",
            implementors_dir.display()
        );
    }
    let mut found = Vec::new();
    collect_fragments(implementors_dir, &mut found)?;
    found.sort();
    Ok(found)
}

fn collect_fragments(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("reading entry in {}", dir.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("inspecting {}", path.display()))?;
        if file_type.is_dir() {
            collect_fragments(&path, found)?;
        } else if FragmentFormat::from_path(&path).is_some() {
            found.push(path);
        }
    }
    Ok(())
}
