//! Text-level inspection of SPARQL queries: prefix injection, query form
//! and declared prefixes. Nothing here parses SPARQL properly.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::graph::PrefixMap;

static RE_PREFIX_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^PREFIX\s+([^\s:]*)\s*:\s*<?([^>]*)>?").unwrap()
});

/// Prepend a `PREFIX` line for every `(name, namespace)` the query does not
/// already declare.
///
/// A declaration counts as present when `PREFIX NAME:` occurs anywhere in
/// the uppercased query text. A name given twice takes its last namespace.
pub fn inject_prefixes<'a>(query: &str, prefixes: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let prefixes: PrefixMap = prefixes.into_iter().collect();
    let upper = query.to_uppercase();
    let declarations: Vec<String> = prefixes
        .iter()
        .filter(|(name, _)| !upper.contains(&format!("PREFIX {}:", name.to_uppercase())))
        .map(|(name, namespace)| format!("PREFIX {name}: <{namespace}>"))
        .collect();

    if declarations.is_empty() {
        query.to_string()
    } else {
        format!("{}\n\n{query}", declarations.join("\n"))
    }
}

/// Leading keyword of the trimmed query: `SELECT`, `CONSTRUCT`, `ASK`,
/// `DESCRIBE`, or `UNKNOWN`.
pub fn query_type(query: &str) -> &'static str {
    let upper = query.trim().to_uppercase();
    ["SELECT", "CONSTRUCT", "ASK", "DESCRIBE"]
        .into_iter()
        .find(|keyword| upper.starts_with(keyword))
        .unwrap_or("UNKNOWN")
}

/// `PREFIX name: <iri>` declarations, one per line.
pub fn extract_prefixes(query: &str) -> BTreeMap<String, String> {
    query
        .lines()
        .filter_map(|line| RE_PREFIX_LINE.captures(line.trim()))
        .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
        .collect()
}
