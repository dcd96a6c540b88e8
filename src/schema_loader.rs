//! JSON Schema gate for JSON fragments.
//!
//! The fragment contract ships inside the binary. Its `schema_version` const
//! must match the version this crate understands before it is compiled, so a
//! stale schema cannot silently accept documents the loader then misreads.

use anyhow::{Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

/// Version marker every JSON fragment must carry.
pub const FRAGMENT_SCHEMA_VERSION: &str = "implementors_fragment_v1";

const BUNDLED_FRAGMENT_SCHEMA: &str =
    include_str!("../schema/implementors_fragment.schema.json");

/// Compiled fragment contract.
pub(crate) struct FragmentSchema {
    compiled: JSONSchema,
}

impl FragmentSchema {
    pub(crate) fn bundled() -> Result<Self> {
        let schema: Value = serde_json::from_str(BUNDLED_FRAGMENT_SCHEMA)
            .map_err(|err| anyhow!("parsing bundled fragment schema: {err}"))?;
        Self::compile(&schema, "bundled fragment schema")
    }

    pub(crate) fn compile(schema: &Value, origin: &str) -> Result<Self> {
        let schema_version =
            extract_schema_version(schema, "/properties/schema_version/const")
                .ok_or_else(|| anyhow!("{origin} missing schema_version const"))?;
        if schema_version != FRAGMENT_SCHEMA_VERSION {
            bail!(
                "{origin} declares schema_version '{}', expected {}",
                schema_version,
                FRAGMENT_SCHEMA_VERSION
            );
        }

        let compiled =
            JSONSchema::compile(schema).map_err(|err| anyhow!("compiling {origin}: {err}"))?;
        Ok(Self { compiled })
    }

    pub(crate) fn validate(&self, instance: &Value, origin: &str) -> Result<()> {
        if let Err(errors) = self.compiled.validate(instance) {
            let details = errors
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            bail!("{origin} failed fragment schema validation:\n{details}");
        }
        Ok(())
    }
}

fn extract_schema_version(schema: &Value, pointer: &str) -> Option<String> {
    let version = schema.pointer(pointer).and_then(Value::as_str)?;
    if version
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        Some(version.to_string())
    } else {
        None
    }
}
