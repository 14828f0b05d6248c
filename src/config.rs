use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    customize::{CustomEntry, Patch},
    error::{Error, Result},
    page::{DEFAULT_PREFIX, DEFAULT_SUFFIX},
    render::RenderOptions,
};

/// Run configuration, read from a TOML file.
///
/// Relative paths are taken relative to the directory of that file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    pub bibliography: Option<PathBuf>,
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub options: RenderOptions,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default, rename = "section")]
    pub sections: Vec<SectionConfig>,
    /// Patches keyed by citation key.
    #[serde(default)]
    pub overrides: BTreeMap<String, Patch>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SectionConfig {
    pub title: String,
    /// Citation keys, rendered in this order.
    #[serde(default)]
    pub keys: Vec<String>,
    /// Entries that are not in the bibliography, rendered after `keys`.
    #[serde(default, rename = "entry")]
    pub entries: Vec<CustomEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageConfig {
    pub prefix: Option<String>,
    pub prefix_file: Option<PathBuf>,
    pub suffix: Option<String>,
    pub suffix_file: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let src = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::parse(&src, path)?;
        tracing::debug!(
            path = %path.display(),
            sections = config.sections.len(),
            overrides = config.overrides.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Parse `src` as if read from `path`.
    pub fn parse(src: &str, path: &Path) -> Result<Self> {
        let mut config: Config = toml::from_str(src).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or(Path::new(""));
        config.rebase(base);
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        let paths = [
            &mut self.bibliography,
            &mut self.output,
            &mut self.page.prefix_file,
            &mut self.page.suffix_file,
        ];
        for p in paths.into_iter().flatten() {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }

    /// Every citation key the sections ask for, in section order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|s| s.keys.iter().map(String::as_str))
    }
}

impl PageConfig {
    pub fn prefix(&self) -> Result<String> {
        shell_part("prefix", self.prefix.as_deref(), self.prefix_file.as_deref(), DEFAULT_PREFIX)
    }

    pub fn suffix(&self) -> Result<String> {
        shell_part("suffix", self.suffix.as_deref(), self.suffix_file.as_deref(), DEFAULT_SUFFIX)
    }
}

fn shell_part(name: &str, inline: Option<&str>, file: Option<&Path>, default: &str) -> Result<String> {
    match (inline, file) {
        (Some(text), file) => {
            if let Some(file) = file {
                tracing::warn!(part = name, file = %file.display(), "inline text given, ignoring file");
            }
            Ok(text.to_string())
        }
        (None, Some(file)) => fs::read_to_string(file).map_err(|e| Error::io(file, e)),
        (None, None) => Ok(default.to_string()),
    }
}
