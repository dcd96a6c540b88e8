use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

/// File-name prefix rustdoc uses for trait pages.
const TRAIT_ITEM_PREFIX: &str = "trait.";
const PATH_SEPARATOR: &str = "::";

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Fully qualified path of a documented interface, e.g. `core::fmt::Display`.
pub struct InterfacePath(pub String);

impl InterfacePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the interface from a fragment path relative to `implementors/`.
    ///
    /// `core/fmt/trait.Display.js` becomes `core::fmt::Display`.
    pub fn from_fragment_path(relative: &Path) -> Result<Self> {
        let mut segments: Vec<&str> = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => segments.push(
                    part.to_str()
                        .with_context(|| format!("non UTF-8 segment in {}", relative.display()))?,
                ),
                Component::CurDir => {}
                _ => bail!(
                    "fragment path {} must be relative to the implementors directory",
                    relative.display()
                ),
            }
        }

        let Some(file_name) = segments.pop() else {
            bail!("empty fragment path");
        };
        let stem = file_name
            .rsplit_once('.')
            .map(|(stem, _ext)| stem)
            .unwrap_or(file_name);
        let Some(item) = stem.strip_prefix(TRAIT_ITEM_PREFIX) else {
            bail!(
                "fragment {} is not a trait page (expected a '{}' prefix)",
                relative.display(),
                TRAIT_ITEM_PREFIX
            );
        };
        if item.is_empty() {
            bail!("fragment {} names no trait", relative.display());
        }
        segments.push(item);
        Self::parse(&segments.join(PATH_SEPARATOR))
    }

    /// Validate a `::`-separated path supplied by a user or a JSON fragment.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            bail!("interface path must not be empty");
        }
        for segment in trimmed.split(PATH_SEPARATOR) {
            if segment.is_empty()
                || !segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                bail!("invalid interface path '{trimmed}'");
            }
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for InterfacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_path_from_nested_fragment() {
        let path = InterfacePath::from_fragment_path(Path::new("core/fmt/trait.Display.js")).unwrap();
        assert_eq!(path.as_str(), "core::fmt::Display");
    }

    #[test]
    fn derives_path_for_json_fragments() {
        let path =
            InterfacePath::from_fragment_path(Path::new("./core/iter/trait.Extend.json")).unwrap();
        assert_eq!(path.as_str(), "core::iter::Extend");
    }

    #[test]
    fn rejects_non_trait_pages() {
        assert!(InterfacePath::from_fragment_path(Path::new("core/fmt/struct.Formatter.js")).is_err());
        assert!(InterfacePath::from_fragment_path(Path::new("core/fmt/trait..js")).is_err());
    }

    #[test]
    fn rejects_escaping_paths() {
        assert!(InterfacePath::from_fragment_path(Path::new("../core/trait.Display.js")).is_err());
    }

    #[test]
    fn segments_are_ascii_identifiers() {
        assert!(InterfacePath::parse("core::fmt::Dïsplay").is_err());
        assert!(InterfacePath::from_fragment_path(Path::new("core/fmt/trait.Dïsplay.js")).is_err());
        assert!(InterfacePath::parse("core::fmt::Display_2").is_ok());
    }

    #[test]
    fn parse_rejects_malformed_paths() {
        assert!(InterfacePath::parse("").is_err());
        assert!(InterfacePath::parse("core::::Display").is_err());
        assert!(InterfacePath::parse("core::fmt::Display<T>").is_err());
        assert_eq!(
            InterfacePath::parse(" std::io::Write ").unwrap().as_str(),
            "std::io::Write"
        );
    }
}
