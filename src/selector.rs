use std::collections::HashMap;

use crate::{
    entry::Entry,
    error::{Error, Result},
    library::Library,
    resolver,
};

/// Pick the entry for `key`, with its arXiv identifier resolved.
pub fn select_one(library: &Library, key: &str) -> Result<Entry> {
    let mut entry = library
        .get(key)
        .cloned()
        .ok_or_else(|| Error::UnknownCitationKey(key.to_string()))?;
    resolver::resolve(&mut entry);
    tracing::debug!(key, arxiv = ?entry.arxiv_org_id, "selected entry");
    Ok(entry)
}

/// Pick every entry in `keys`. Fails on the first key the library does not know.
///
/// The map does not remember the order of `keys`; iterate `keys` again to render in order.
pub fn select<S: AsRef<str>>(library: &Library, keys: &[S]) -> Result<HashMap<String, Entry>> {
    keys.iter()
        .map(|key| {
            let key = key.as_ref();
            select_one(library, key).map(|entry| (key.to_string(), entry))
        })
        .collect()
}
