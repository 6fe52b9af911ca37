//! Inversion of lexical → surface mappings.

use std::collections::{BTreeSet, HashMap};

/// Surface form → set of lexical keys, in order of first appearance.
pub type InvertedGroup = Vec<(String, BTreeSet<String>)>;

/// Invert a `key → values` mapping into `value → {keys}`.
///
/// Every value becomes a key of the output; a value listed under several
/// keys collects all of them. Output order is the order in which each value
/// is first seen.
pub fn invert<'a, I, V>(entries: I) -> InvertedGroup
where
    I: IntoIterator<Item = (&'a String, V)>,
    V: IntoIterator<Item = &'a String>,
{
    let mut out: InvertedGroup = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for (key, values) in entries {
        for value in values {
            let slot = *index.entry(value.as_str()).or_insert_with(|| {
                out.push((value.clone(), BTreeSet::new()));
                out.len() - 1
            });
            out[slot].1.insert(key.clone());
        }
    }

    out
}
