use crate::entry::Entry;

type SourceFn = fn(&Entry) -> Option<&str>;

/// Where an arXiv identifier can be recovered from.
///
/// NOTE: Ordering is important here, as it signifies priority. The typed eprint fields are the
/// most authoritative, a DOI minted by arXiv comes next, and a raw URL is the last resort.
static SOURCES: &[SourceFn] = &[from_eprint, from_doi, from_url];

fn from_eprint(entry: &Entry) -> Option<&str> {
    let kind = entry.field("eprinttype")?;
    if !kind.eq_ignore_ascii_case("arxiv") {
        return None;
    }
    entry.field("eprint")
}

fn from_doi(entry: &Entry) -> Option<&str> {
    after(entry.field("doi")?, "arXiv.")
}

fn from_url(entry: &Entry) -> Option<&str> {
    // The full `arxiv.org/abs/` token, so bioRxiv and medRxiv links never match.
    after(entry.field("url")?, "arxiv.org/abs/")
}

fn after<'a>(haystack: &'a str, marker: &str) -> Option<&'a str> {
    haystack
        .split_once(marker)
        .map(|(_, rest)| rest)
        .filter(|rest| !rest.is_empty())
}

/// Guess the arXiv identifier of `entry` without touching it.
pub fn arxiv_id(entry: &Entry) -> Option<&str> {
    SOURCES.iter().find_map(|f| f(entry))
}

/// Resolve the arXiv identifier of `entry` and store it on the entry.
///
/// Nothing is written when no identifier is found. Calling this again is harmless.
pub fn resolve(entry: &mut Entry) -> Option<&str> {
    if let Some(id) = arxiv_id(entry).map(str::to_string) {
        entry.arxiv_org_id = Some(id);
    }
    entry.arxiv_org_id.as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eprint_pair_wins_over_doi() {
        let mut e = Entry::new("k")
            .with_field("eprint", "2004.01105")
            .with_field("eprinttype", "ArXiv")
            .with_field("doi", "10.48550/arXiv.1111.22222");
        assert_eq!(resolve(&mut e), Some("2004.01105"));
        assert_eq!(e.arxiv_org_id.as_deref(), Some("2004.01105"));
    }

    #[test]
    fn eprint_without_arxiv_type_is_ignored() {
        let mut e = Entry::new("k")
            .with_field("eprint", "12345")
            .with_field("eprinttype", "pubmed")
            .with_field("url", "https://arxiv.org/abs/1910.09984");
        assert_eq!(resolve(&mut e), Some("1910.09984"));

        let mut e = Entry::new("k").with_field("eprint", "2004.01105");
        assert_eq!(resolve(&mut e), None);
    }

    #[test]
    fn doi_wins_over_url() {
        let mut e = Entry::new("k")
            .with_field("doi", "10.48550/arXiv.2009.05732")
            .with_field("url", "https://arxiv.org/abs/1111.2222");
        assert_eq!(resolve(&mut e), Some("2009.05732"));
    }

    #[test]
    fn other_preprint_servers_do_not_resolve() {
        let mut e = Entry::new("k")
            .with_field("url", "https://www.biorxiv.org/content/early/2018/04/11/299859");
        assert_eq!(resolve(&mut e), None);
        assert!(e.arxiv_org_id.is_none());

        let mut e = Entry::new("k").with_field("doi", "10.1101/2020.04.01.20050062");
        assert_eq!(resolve(&mut e), None);
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut e = Entry::new("k").with_field("url", "https://arxiv.org/abs/1708.02296");
        let first = resolve(&mut e).map(str::to_string);
        let snapshot = e.clone();
        let second = resolve(&mut e).map(str::to_string);
        assert_eq!(first, second);
        assert_eq!(e, snapshot);
    }

    #[test]
    fn urls_without_abs_token_never_resolve() {
        proptest::proptest!(|(host in "[a-z]{0,8}rxiv\\.org", path in "[a-z0-9/.]{0,24}")| {
            proptest::prop_assume!(!format!("{host}/{path}").contains("arxiv.org/abs/"));
            let e = Entry::new("k").with_field("url", format!("https://{host}/{path}"));
            proptest::prop_assert!(arxiv_id(&e).is_none());
        })
    }
}
