use std::collections::HashSet;

use crate::{
    config::Config,
    customize,
    entry::Entry,
    error::{Error, Result},
    library::Library,
    page::{Page, Section},
    render::Renderer,
    selector,
};

/// Select, customize and render every section of `config` into a page.
pub fn build_page(config: &Config, library: &Library) -> Result<Page> {
    let keys: Vec<&str> = config.keys().collect();
    let selected = selector::select(library, &keys)?;
    check_overrides(config, library)?;

    let renderer = Renderer::new(config.options);
    let mut sections = Vec::with_capacity(config.sections.len());
    for sc in &config.sections {
        let mut section = Section::new(sc.title.clone());
        for key in &sc.keys {
            let entry = selected
                .get(key)
                .ok_or_else(|| Error::UnknownCitationKey(key.clone()))?;
            section.items.push(renderer.render(&patched(entry, config)?).html);
        }
        for custom in &sc.entries {
            let entry = custom.build()?;
            section.items.push(renderer.render(&patched(&entry, config)?).html);
        }
        sections.push(section);
    }

    Ok(Page {
        prefix: config.page.prefix()?,
        sections,
        suffix: config.page.suffix()?,
    })
}

fn patched(entry: &Entry, config: &Config) -> Result<Entry> {
    match config.overrides.get(&entry.key) {
        Some(patch) => customize::apply(entry, patch),
        None => Ok(entry.clone()),
    }
}

/// Overrides must name an entry that exists. Ones for entries that are not on the page are
/// only reported.
fn check_overrides(config: &Config, library: &Library) -> Result<()> {
    let listed: HashSet<&str> = config
        .keys()
        .chain(config.sections.iter().flat_map(|s| s.entries.iter().map(|e| e.id.as_str())))
        .collect();
    for key in config.overrides.keys() {
        if listed.contains(key.as_str()) {
            continue;
        }
        if library.get(key).is_none() {
            return Err(Error::UnknownCitationKey(key.clone()));
        }
        tracing::warn!(key = %key, "override for an entry that is not on the page");
    }
    Ok(())
}
