use std::collections::BTreeMap;

use biblatex::{ChunksExt, Person};

use crate::{authors, badge::Badge};

/// Field aliases written by BibLaTeX exporters, mapped onto the BibTeX names we render.
const FIELD_ALIASES: &[(&str, &str)] = &[("journaltitle", "journal"), ("archiveprefix", "eprinttype")];

/// One bibliography record, owned by this crate and decoupled from the parser's types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Citation key.
    pub key: String,
    pub entry_type: String,
    fields: BTreeMap<String, String>,
    /// Names in `von Last, Jr, First` form.
    pub author: Vec<String>,
    pub badges: Vec<Badge>,
    /// arXiv identifier recovered from the other fields, once resolved.
    pub arxiv_org_id: Option<String>,
}

impl Entry {
    pub fn new(key: impl Into<String>) -> Self {
        Entry {
            key: key.into(),
            entry_type: "misc".to_string(),
            ..Entry::default()
        }
    }

    /// The value of `name`. Absent and blank values are both reported as `None`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn with_author(mut self, raw: &str) -> Self {
        self.set_field("author", raw);
        self.author = authors::split_list(raw);
        self
    }

    pub fn from_biblatex(entry: &biblatex::Entry) -> Self {
        let mut out = Entry::new(entry.key.clone());
        out.entry_type = entry.entry_type.to_string();
        for (name, chunks) in &entry.fields {
            out.set_field(name, chunks.format_verbatim());
        }

        for (alias, canonical) in FIELD_ALIASES {
            if out.field(canonical).is_none()
                && let Some(value) = out.field(alias).map(str::to_string)
            {
                out.set_field(canonical, value);
            }
        }
        if out.field("year").is_none()
            && let Some(year) = out
                .field("date")
                .and_then(|d| d.get(..4))
                .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
                .map(str::to_string)
        {
            out.set_field("year", year);
        }

        out.author = match entry.author() {
            Ok(people) => people.iter().map(person_name).collect(),
            Err(_) => out.field("author").map(authors::split_list).unwrap_or_default(),
        };
        out
    }
}

/// `von Last, Jr, First`, with a trailing comma for mononyms so corporate names stay whole.
fn person_name(p: &Person) -> String {
    let last = if p.prefix.is_empty() {
        p.name.clone()
    } else {
        format!("{} {}", p.prefix, p.name)
    };
    match (p.suffix.is_empty(), p.given_name.is_empty()) {
        (true, true) => format!("{last},"),
        (true, false) => format!("{last}, {}", p.given_name),
        (false, _) => format!("{last}, {}, {}", p.suffix, p.given_name),
    }
}
