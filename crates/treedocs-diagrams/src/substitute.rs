//! Inline diagram reference substitution.
//!
//! Scans Markdown text for image references whose target ends in the diagram
//! source extension and replaces each with the resolved fragment. Matches
//! are resolved concurrently but substituted back in source order: results
//! are collected indexed by match position, never by completion order.

use rayon::prelude::*;
use regex::Regex;
use std::sync::LazyLock;

use treedocs_tree::Node;

use crate::error::DiagramError;
use crate::resolver::DiagramResolver;

/// Image syntax with a diagram-source target, e.g. `![flow](flow.puml)`.
static DIAGRAM_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)\s]+\.puml)\)").unwrap());

/// Result of substituting inline diagram references.
#[derive(Debug)]
pub struct Substitution {
    /// Rewritten Markdown text.
    pub text: String,
    /// Names of diagram files consumed by inline references. The caller
    /// drops these from the node's pending diagram set so they are not also
    /// appended as trailing images.
    pub consumed: Vec<String>,
}

/// Replace every inline diagram reference in `text` with its resolved
/// Markdown fragment.
///
/// References whose target has no matching diagram file in the node are left
/// untouched and not marked consumed.
pub fn substitute_inline(
    resolver: &DiagramResolver,
    node: &Node,
    text: &str,
    flatten: bool,
) -> Result<Substitution, DiagramError> {
    struct Match<'a> {
        start: usize,
        end: usize,
        name: String,
        source: Option<&'a str>,
    }

    let matches: Vec<Match<'_>> = DIAGRAM_REF
        .captures_iter(text)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            let target = caps.get(2).unwrap().as_str();
            let name = diagram_name(target);
            let source = node
                .diagram_files
                .iter()
                .find(|d| d.name == name)
                .map(|d| d.source.as_str());
            Match {
                start: whole.start(),
                end: whole.end(),
                name,
                source,
            }
        })
        .collect();

    // Resolve concurrently; the indexed collect keeps results in match order
    // regardless of completion order.
    let fragments: Vec<Option<String>> = matches
        .par_iter()
        .map(|m| {
            m.source
                .map(|source| resolver.resolve(node, &m.name, source, flatten))
                .transpose()
        })
        .collect::<Result<_, DiagramError>>()?;

    let mut out = String::with_capacity(text.len());
    let mut consumed = Vec::new();
    let mut cursor = 0;
    for (m, fragment) in matches.iter().zip(fragments) {
        out.push_str(&text[cursor..m.start]);
        match fragment {
            Some(fragment) => {
                out.push_str(fragment.trim_end());
                consumed.push(m.name.clone());
            }
            // No matching diagram file: keep the original reference.
            None => out.push_str(&text[m.start..m.end]),
        }
        cursor = m.end;
    }
    out.push_str(&text[cursor..]);

    Ok(Substitution {
        text: out,
        consumed,
    })
}

/// Diagram file name for a reference target: the final path segment without
/// the diagram extension.
fn diagram_name(target: &str) -> String {
    let base = target.rsplit('/').next().unwrap_or(target);
    base.strip_suffix(".puml").unwrap_or(base).to_owned()
}
