use std::{collections::BTreeMap, fmt};

use serde::Deserialize;

use crate::{
    authors,
    badge::{Badge, BadgeSpec},
    entry::Entry,
    error::{Error, Result},
    resolver,
};

/// Fields the arXiv identifier is recovered from. Patching any of them re-resolves it.
const RESOLVER_FIELDS: &[&str] = &["eprint", "eprinttype", "doi", "url"];

/// Per-entry overrides from the configuration file.
///
/// Any key other than `author` and `badges` sets the field of that name. An empty string hides
/// the field from the rendered entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Patch {
    #[serde(default)]
    pub author: Option<AuthorList>,
    /// Replaces the badges of the entry.
    #[serde(default)]
    pub badges: Option<Vec<BadgeSpec>>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AuthorList {
    /// BibTeX style, names separated by ` and `.
    Joined(String),
    List(Vec<String>),
}

impl AuthorList {
    fn names(&self) -> Vec<String> {
        match self {
            AuthorList::Joined(raw) => authors::split_list(raw),
            AuthorList::List(names) => names.clone(),
        }
    }

    fn raw(&self) -> String {
        match self {
            AuthorList::Joined(raw) => raw.clone(),
            AuthorList::List(names) => names.join(" and "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{n}"),
        }
    }
}

/// An entry written directly in the configuration rather than taken from the bibliography.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomEntry {
    pub id: String,
    #[serde(rename = "type", default)]
    pub entry_type: Option<String>,
    #[serde(flatten)]
    pub patch: Patch,
}

impl CustomEntry {
    pub fn build(&self) -> Result<Entry> {
        let mut base = Entry::new(self.id.clone());
        if let Some(t) = &self.entry_type {
            base.entry_type = t.clone();
        }
        let mut entry = apply(&base, &self.patch)?;
        resolver::resolve(&mut entry);
        Ok(entry)
    }
}

/// A copy of `base` with `patch` applied. `base` itself is never modified.
pub fn apply(base: &Entry, patch: &Patch) -> Result<Entry> {
    let mut entry = base.clone();

    let mut sources_changed = false;
    for (name, value) in &patch.fields {
        let name = name.to_ascii_lowercase();
        sources_changed |= RESOLVER_FIELDS.contains(&name.as_str());
        entry.set_field(&name, value.to_string());
    }

    if let Some(author) = &patch.author {
        entry.set_field("author", author.raw());
        entry.author = author.names();
    }

    if let Some(badges) = &patch.badges {
        entry.badges = badges
            .iter()
            .cloned()
            .map(Badge::try_from)
            .collect::<Result<_, _>>()
            .map_err(|source| Error::MalformedBadge {
                key: base.key.clone(),
                source,
            })?;
    }

    if sources_changed {
        entry.arxiv_org_id = None;
        resolver::resolve(&mut entry);
    }
    Ok(entry)
}
