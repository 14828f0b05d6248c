use std::{collections::HashMap, fs, path::Path};

use biblatex::Bibliography;

use crate::{
    entry::Entry,
    error::{Error, Result},
};

/// The bibliography database: every record of one file, in file order. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct Library {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Library {
    pub fn load(path: &Path) -> Result<Self> {
        let src = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let library = Self::parse_from(&src, path)?;
        tracing::info!(
            path = %path.display(),
            entries = library.len(),
            "loaded bibliography"
        );
        Ok(library)
    }

    pub fn parse(src: &str) -> Result<Self> {
        Self::parse_from(src, Path::new("<input>"))
    }

    fn parse_from(src: &str, path: &Path) -> Result<Self> {
        let bib = Bibliography::parse(src).map_err(|e| Error::Bibliography {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(bib.iter().map(Entry::from_biblatex).collect())
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Entries whose raw author field mentions any of `needles`, ignoring case.
    pub fn by_author<'a, S: AsRef<str>>(&'a self, needles: &'a [S]) -> impl Iterator<Item = &'a Entry> {
        let needles: Vec<String> = needles.iter().map(|n| n.as_ref().to_lowercase()).collect();
        self.entries.iter().filter(move |e| {
            e.field("author").is_some_and(|a| {
                let a = a.to_lowercase();
                needles.iter().any(|n| a.contains(n.as_str()))
            })
        })
    }
}

impl FromIterator<Entry> for Library {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let entries: Vec<Entry> = iter.into_iter().collect();
        // First occurrence wins for duplicated keys.
        let mut index = HashMap::with_capacity(entries.len());
        for (i, e) in entries.iter().enumerate() {
            index.entry(e.key.clone()).or_insert(i);
        }
        Library { entries, index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BIB: &str = r#"
        @article{dehning_inferring_2020,
            author = {Dehning, Jonas and Zierenberg, Johannes and Spitzner, F. Paul},
            title = {Inferring change points in the spread of {COVID}-19},
            journal = {Science},
            year = {2020},
        }
        @phdthesis{other_2019,
            author = {Doe, Jane},
            title = {Something else},
            year = {2019},
        }
    "#;

    #[test]
    fn parse_keeps_file_order() {
        let lib = Library::parse(BIB).unwrap();
        assert_eq!(lib.len(), 2);
        let keys: Vec<&str> = lib.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["dehning_inferring_2020", "other_2019"]);
        assert_eq!(lib.get("other_2019").unwrap().field("year"), Some("2019"));
        assert!(lib.get("missing").is_none());
    }

    #[test]
    fn load_reads_file_and_reports_missing_file() {
        let mut tmp = NamedTempFile::new().expect("tmp file");
        tmp.write_all(BIB.as_bytes()).unwrap();
        let lib = Library::load(tmp.path()).unwrap();
        assert_eq!(lib.len(), 2);

        let err = Library::load(Path::new("/definitely/not/here.bib")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn by_author_is_case_insensitive() {
        let lib = Library::parse(BIB).unwrap();
        let found: Vec<&str> = lib
            .by_author(&["spitzner"])
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(found, ["dehning_inferring_2020"]);

        let found = lib.by_author(&["DOE", "Zierenberg"]).count();
        assert_eq!(found, 2);
    }
}
