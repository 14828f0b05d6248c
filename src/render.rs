use std::fmt;

use serde::Deserialize;

use crate::{
    authors::{self, AuthorStyle},
    badge::{self, Badge},
    entry::Entry,
    identifier::{Identifier, doi::Doi},
    text,
};

/// Switches for the rendered page. Read once from the configuration and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    pub show_abstracts: bool,
    pub show_altmetric: bool,
    pub show_arxiv_badge: bool,
    pub use_shieldsio_for_badges: bool,
    pub use_bootstrap_button_for_abstract: bool,
    pub abbreviate_first: bool,
    pub et_al_at: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        let authors = AuthorStyle::default();
        RenderOptions {
            show_abstracts: true,
            show_altmetric: false,
            show_arxiv_badge: false,
            use_shieldsio_for_badges: false,
            use_bootstrap_button_for_abstract: false,
            abbreviate_first: authors.abbreviate_first,
            et_al_at: authors.et_al_at,
        }
    }
}

impl RenderOptions {
    pub fn author_style(&self) -> AuthorStyle {
        AuthorStyle {
            abbreviate_first: self.abbreviate_first,
            et_al_at: self.et_al_at,
        }
    }
}

/// A piece of the list item that is only emitted when its data is there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Authors,
    Title,
    Journal,
    Year,
    AbstractToggle,
    Badge,
    ArxivBadge,
    Altmetric,
    Abstract,
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Part::Authors => "authors",
            Part::Title => "title",
            Part::Journal => "journal",
            Part::Year => "year",
            Part::AbstractToggle => "abstract-toggle",
            Part::Badge => "badge",
            Part::ArxivBadge => "arxiv-badge",
            Part::Altmetric => "altmetric",
            Part::Abstract => "abstract",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    /// What ended up in `html`, in emission order.
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Renderer { options }
    }

    /// Render one `<li>` block for `entry`.
    pub fn render(&self, entry: &Entry) -> Rendered {
        let opts = &self.options;
        let mut out = Rendered {
            html: String::from("<li>\n"),
            parts: Vec::new(),
        };

        let authors = authors::format_authors(&entry.author, &opts.author_style(), &entry.key);
        if !authors.is_empty() {
            out.push(Part::Authors, format!("<div class=\"pub_author\">\n{authors}\n</div>\n"));
        }

        if let Some(title) = entry.field("title") {
            let title = text::clean(title);
            let html = match entry.field("url") {
                Some(url) => format!(
                    "<a class=\"pub_title\"\nhref=\"{}\"\n>\n{title}\n</a>\n",
                    badge::attr_url(url)
                ),
                None => format!("<em class=\"pub_title\">\n{title}\n</em>\n"),
            };
            out.push(Part::Title, html);
        }

        out.html.push_str("<div class=\"pub_journal_group\">\n");
        if let Some(journal) = entry.field("journal") {
            let mut journal = journal.to_string();
            if let Some(volume) = entry.field("volume") {
                journal.push(' ');
                journal.push_str(volume);
            }
            if let Some(pages) = entry.field("pages") {
                journal.push_str(", ");
                journal.push_str(pages);
            }
            out.push(
                Part::Journal,
                format!("<span class=\"pub_journal\">\n{}\n</span>\n", text::clean(&journal)),
            );
        }
        if let Some(year) = entry.field("year") {
            out.push(
                Part::Year,
                format!("<span class=\"pub_year\">\n({})\n</span>\n", text::clean(year)),
            );
        }
        out.html.push_str("<br class=\"d-block d-lg-none\">\n");

        let abstract_text = entry.field("abstract").filter(|_| opts.show_abstracts);
        let anchor = format!("abstract_{}", anchor_id(&entry.key));
        if abstract_text.is_some() {
            out.push(Part::AbstractToggle, self.abstract_toggle(&anchor));
        }

        for b in &entry.badges {
            out.push(Part::Badge, b.render(opts.use_shieldsio_for_badges));
        }

        if opts.show_arxiv_badge
            && let Some(id) = entry.arxiv_org_id.as_deref()
            && !entry.badges.iter().any(|b| b.arxiv_id().as_deref() == Some(id))
        {
            out.push(Part::ArxivBadge, Badge::arxiv(id).render(opts.use_shieldsio_for_badges));
        }

        if opts.show_altmetric
            && let Some(marker) = altmetric(entry)
        {
            out.push(Part::Altmetric, marker);
        }
        out.html.push_str("</div>\n");

        if let Some(abs) = abstract_text {
            out.push(
                Part::Abstract,
                format!(
                    "<div class=\"collapse\" id=\"{anchor}\">\n<div class=\"pub_abstract\">\n{}\n</div>\n</div>\n",
                    text::clean(abs)
                ),
            );
        }

        out.html.push_str("</li>\n\n");

        tracing::debug!(
            key = %entry.key,
            parts = %out.parts.iter().map(Part::to_string).collect::<Vec<_>>().join(","),
            "rendered entry"
        );
        out
    }

    fn abstract_toggle(&self, anchor: &str) -> String {
        let control = if self.options.use_bootstrap_button_for_abstract {
            format!(
                "<button class=\"btn btn-outline-secondary btn-sm pub_abstract_button\" type=\"button\" \
                 data-toggle=\"collapse\" aria-expanded=\"false\" data-target=\"#{anchor}\" \
                 aria-controls=\"{anchor}\">Abstract</button>"
            )
        } else {
            format!(
                "[<span class=\"fake_a pub_badge_link\" data-toggle=\"collapse\" \
                 aria-expanded=\"false\" data-target=\"#{anchor}\">Abstract</span>]"
            )
        };
        format!("<span class=\"pub_badge\">\n{control}\n</span>\n")
    }
}

impl Rendered {
    fn push(&mut self, part: Part, html: String) {
        self.html.push_str(&html);
        self.parts.push(part);
    }
}

/// Metrics widget marker. The embedding page loads the script that fills it in.
fn altmetric(entry: &Entry) -> Option<String> {
    let (attr, id) = match entry.arxiv_org_id.as_deref() {
        Some(id) => ("data-arxiv-id", id.to_string()),
        None => ("data-doi", Doi::parse(entry.field("doi")?)?.to_string()),
    };
    Some(format!(
        "<span class=\"altmetric-embed\" data-badge-type=\"2\" data-hide-no-mentions=\"true\" {attr}=\"{}\"></span>\n",
        badge::attr_url(&id)
    ))
}

/// Citation keys may contain `:` or `/`, which break CSS selectors.
fn anchor_id(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_entry() -> Entry {
        let mut e = Entry::new("dehning:2020")
            .with_author("Dehning, Jonas and Zierenberg, Johannes and Spitzner, F. Paul")
            .with_field("title", "Inferring change points in the spread of {COVID}-19")
            .with_field("journal", "Science")
            .with_field("volume", "369")
            .with_field("pages", "eabb9789")
            .with_field("year", "2020")
            .with_field("url", "https://science.sciencemag.org/content/369/6500/eabb9789")
            .with_field("doi", "10.1126/science.abb9789")
            .with_field("abstract", "We \\emph{infer} \"things\".");
        e.badges.push(Badge::new("GitHub", "https://github.com/Priesemann-Group/covid19_inference").unwrap());
        e
    }

    #[test]
    fn renders_every_part_in_order() {
        let opts = RenderOptions {
            show_altmetric: true,
            ..RenderOptions::default()
        };
        let r = Renderer::new(opts).render(&full_entry());

        assert_eq!(
            r.parts,
            [
                Part::Authors,
                Part::Title,
                Part::Journal,
                Part::Year,
                Part::AbstractToggle,
                Part::Badge,
                Part::Altmetric,
                Part::Abstract,
            ]
        );
        assert!(r.html.starts_with("<li>\n<div class=\"pub_author\">\nJ. Dehning, J. Zierenberg and F. Paul Spitzner\n</div>\n"));
        assert!(r.html.contains("<a class=\"pub_title\"\nhref=\"https://science.sciencemag.org/content/369/6500/eabb9789\"\n>\nInferring change points in the spread of COVID-19\n</a>"));
        assert!(r.html.contains("<span class=\"pub_journal\">\nScience 369, eabb9789\n</span>"));
        assert!(r.html.contains("<span class=\"pub_year\">\n(2020)\n</span>"));
        assert!(r.html.contains("data-target=\"#abstract_dehning_2020\""));
        assert!(r.html.contains("<div class=\"collapse\" id=\"abstract_dehning_2020\">"));
        assert!(r.html.contains("We infer 'things'."));
        assert!(r.html.contains("data-doi=\"10.1126/science.abb9789\""));
        assert!(r.html.ends_with("</div>\n</li>\n\n"));
    }

    #[test]
    fn absent_and_empty_fields_are_omitted() {
        let e = Entry::new("bare")
            .with_field("title", "Only a title")
            .with_field("journal", "")
            .with_field("abstract", "  ");
        let r = Renderer::default().render(&e);
        assert_eq!(r.parts, [Part::Title]);
        assert!(r.html.contains("<em class=\"pub_title\">\nOnly a title\n</em>"));
        assert!(!r.html.contains("pub_journal\""));
        assert!(!r.html.contains("pub_year"));
        assert!(!r.html.contains("pub_author"));
        assert!(!r.html.contains("abstract_"));
    }

    #[test]
    fn abstracts_can_be_switched_off() {
        let opts = RenderOptions {
            show_abstracts: false,
            ..RenderOptions::default()
        };
        let r = Renderer::new(opts).render(&full_entry());
        assert!(!r.parts.contains(&Part::AbstractToggle));
        assert!(!r.parts.contains(&Part::Abstract));
        assert!(!r.html.contains("Abstract"));
    }

    #[test]
    fn bootstrap_toggle() {
        let opts = RenderOptions {
            use_bootstrap_button_for_abstract: true,
            ..RenderOptions::default()
        };
        let r = Renderer::new(opts).render(&full_entry());
        assert!(r.html.contains("<button class=\"btn btn-outline-secondary btn-sm pub_abstract_button\""));
        assert!(!r.html.contains("fake_a"));
    }

    #[test]
    fn arxiv_badge_and_altmetric_prefer_resolved_id() {
        let mut e = full_entry();
        e.arxiv_org_id = Some("2004.01105".to_string());
        let opts = RenderOptions {
            show_arxiv_badge: true,
            show_altmetric: true,
            ..RenderOptions::default()
        };
        let r = Renderer::new(opts).render(&e);
        assert!(r.parts.contains(&Part::ArxivBadge));
        assert!(r.html.contains("href=\"https://arxiv.org/abs/2004.01105\">arXiv</a>"));
        assert!(r.html.contains("data-arxiv-id=\"2004.01105\""));
        assert!(!r.html.contains("data-doi"));

        let off = Renderer::default().render(&e);
        assert!(!off.parts.contains(&Part::ArxivBadge));
        assert!(!off.parts.contains(&Part::Altmetric));
    }

    #[test]
    fn arxiv_badge_is_not_duplicated() {
        let mut e = full_entry();
        e.arxiv_org_id = Some("2004.01105".to_string());
        e.badges.push(Badge::new("arXiv", "https://arxiv.org/abs/2004.01105").unwrap());
        let opts = RenderOptions {
            show_arxiv_badge: true,
            ..RenderOptions::default()
        };
        let r = Renderer::new(opts).render(&e);
        assert!(!r.parts.contains(&Part::ArxivBadge));
        assert_eq!(r.html.matches("arxiv.org/abs/2004.01105").count(), 1);
    }

    #[test]
    fn shields_mode_renders_images() {
        let opts = RenderOptions {
            use_shieldsio_for_badges: true,
            ..RenderOptions::default()
        };
        let r = Renderer::new(opts).render(&full_entry());
        assert!(r.html.contains("src=\"https://img.shields.io/badge/-GitHub-066da5?logo=github\""));
    }

    #[test]
    fn options_reject_unknown_keys() {
        let opts: RenderOptions = toml::from_str("show_altmetric = true\net_al_at = 3").unwrap();
        assert!(opts.show_altmetric);
        assert!(opts.show_abstracts);
        assert_eq!(opts.author_style().et_al_at, 3);

        assert!(toml::from_str::<RenderOptions>("show_altmetrics = true").is_err());
    }
}
