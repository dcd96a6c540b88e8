//! Reader for generated fragment scripts.
//!
//! The documentation build step emits one script per interface page:
//!
//! ```text
//! (function() {var implementors = {};
//! implementors['petgraph'] = ["impl … Display for Dot<…>", …,];
//! if (window.register_implementors) { … } else { … }
//! })()
//! ```
//!
//! Only the `implementors[...] = [...]` assignments carry data; the wrapper
//! and the registration handshake around them are ignored. Array elements are
//! JSON string literals, and a trailing comma before `]` is accepted.

use crate::descriptor::{Contribution, Descriptor};
use anyhow::{Context, Result, bail};
use regex::Regex;

const ASSIGNMENT_PATTERN: &str =
    r#"implementors\[\s*(?:'([^']*)'|"([^"]*)")\s*\]\s*=\s*\["#;

pub struct ScriptParser {
    assignment: Regex,
}

impl ScriptParser {
    pub fn new() -> Result<Self> {
        let assignment =
            Regex::new(ASSIGNMENT_PATTERN).context("compiling implementors assignment pattern")?;
        Ok(Self { assignment })
    }

    /// Extract every library assignment, in source order.
    pub fn parse(&self, source: &str) -> Result<Vec<Contribution>> {
        let mut contributions = Vec::new();
        let mut cursor = 0;

        while let Some(captures) = self.assignment.captures_at(source, cursor) {
            let Some(whole) = captures.get(0) else {
                break;
            };
            let library = captures
                .get(1)
                .or_else(|| captures.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            if library.is_empty() {
                bail!("implementors assignment at byte {} has an empty library key", whole.start());
            }

            let (descriptors, consumed) = parse_string_array(&source[whole.end()..])
                .with_context(|| format!("parsing implementors of '{library}'"))?;
            contributions.push(Contribution {
                library: library.into(),
                descriptors,
            });
            cursor = whole.end() + consumed;
        }

        if contributions.is_empty() {
            bail!("no implementors assignment found");
        }
        Ok(contributions)
    }
}

/// Parse the body of a string array whose opening `[` was already consumed.
/// Returns the descriptors and the number of bytes read, closing `]` included.
fn parse_string_array(rest: &str) -> Result<(Vec<Descriptor>, usize)> {
    let mut items = Vec::new();
    let mut offset = skip_whitespace(rest, 0);

    loop {
        match rest[offset..].chars().next() {
            None => bail!("unterminated descriptor array"),
            Some(']') => return Ok((items, offset + 1)),
            Some('"') => {
                let mut stream =
                    serde_json::Deserializer::from_str(&rest[offset..]).into_iter::<String>();
                let item = stream
                    .next()
                    .context("missing descriptor literal")?
                    .with_context(|| format!("invalid descriptor literal at byte {offset}"))?;
                offset += stream.byte_offset();
                items.push(Descriptor(item));

                offset = skip_whitespace(rest, offset);
                match rest[offset..].chars().next() {
                    Some(',') => offset = skip_whitespace(rest, offset + 1),
                    Some(']') => {}
                    Some(other) => bail!("unexpected '{other}' after descriptor at byte {offset}"),
                    None => bail!("unterminated descriptor array"),
                }
            }
            Some(other) => bail!("unexpected '{other}' in descriptor array at byte {offset}"),
        }
    }
}

fn skip_whitespace(text: &str, offset: usize) -> usize {
    let tail = &text[offset..];
    offset + (tail.len() - tail.trim_start().len())
}
