use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    error::{Error, Result},
    text,
};

pub const DEFAULT_PREFIX: &str = r#"
<!doctype html>
<html lang="en">
<head>
<title>My Publications</title>
</head>

<body>
<div class="row">
<div id="content-publications" class="content animate col-12 pt-lg-2">

<h2 class="d-inline d-sm-none">Publications</h2>
"#;

pub const DEFAULT_SUFFIX: &str = r#"
</div>
</div>
</body>
"#;

/// One headed list of rendered entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    /// Rendered `<li>` blocks, in display order.
    pub items: Vec<String>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Section {
            title: title.into(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub prefix: String,
    pub sections: Vec<Section>,
    pub suffix: String,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            prefix: DEFAULT_PREFIX.to_string(),
            sections: Vec::new(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl Page {
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    pub fn assemble(&self) -> String {
        let mut html = self.prefix.clone();
        for section in &self.sections {
            html.push_str(&format!("<h3>{}</h3>\n", text::clean(&section.title)));
            html.push_str("<ul class=\"pub_list\">\n");
            for item in &section.items {
                html.push_str(item);
            }
            html.push_str("</ul>\n\n");
        }
        html.push_str(&self.suffix);
        html
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut out = BufWriter::new(file);
        out.write_all(self.assemble().as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| Error::io(path, e))?;
        tracing::info!(path = %path.display(), entries = self.item_count(), "wrote publication list");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        Page {
            prefix: "<body>\n".to_string(),
            sections: vec![
                Section {
                    title: "Journal Articles".to_string(),
                    items: vec!["<li>b</li>\n".to_string(), "<li>a</li>\n".to_string()],
                },
                Section::new("Other"),
            ],
            suffix: "</body>\n".to_string(),
        }
    }

    #[test]
    fn sections_keep_caller_order() {
        assert_eq!(
            page().assemble(),
            "<body>\n\
             <h3>Journal Articles</h3>\n<ul class=\"pub_list\">\n<li>b</li>\n<li>a</li>\n</ul>\n\n\
             <h3>Other</h3>\n<ul class=\"pub_list\">\n</ul>\n\n\
             </body>\n"
        );
        assert_eq!(page().item_count(), 2);
    }

    #[test]
    fn default_shell_wraps_content() {
        let html = Page::default().assemble();
        assert!(html.starts_with(DEFAULT_PREFIX));
        assert!(html.ends_with(DEFAULT_SUFFIX));
    }

    #[test]
    fn write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        page().write(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), page().assemble());

        let err = page().write(&dir.path().join("missing/out.html")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
