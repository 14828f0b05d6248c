use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    identifier::{Identifier, arxiv::{self, Arxiv}},
    text,
};

const SHIELDS_BASE: &str = "https://img.shields.io/badge";
const DEFAULT_COLOR: &str = "lightgrey";

/// Characters escaped in a shields.io path segment, on top of its own `-`/`_` doubling.
const SHIELD_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const QUERY_ENCODE_SET: &AsciiSet = &SHIELD_SEGMENT_ENCODE_SET.add(b'+').add(b'=');

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BadgeError {
    #[error("badge has no description")]
    MissingDescription,
    #[error("badge `{0}` has no url")]
    MissingUrl(String),
}

/// A small link attached to an entry, e.g. to its preprint or code repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    description: String,
    url: String,
    style: BadgeStyle,
}

/// Optional styling for image badges. Unset fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BadgeStyle {
    pub left: Option<String>,
    pub right: Option<String>,
    pub color: Option<String>,
    pub logo: Option<String>,
    #[serde(rename = "logoColor", alias = "logo_color")]
    pub logo_color: Option<String>,
}

/// Resolved parts of a shields.io badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shield {
    pub left: String,
    pub right: String,
    pub color: String,
    pub logo: Option<String>,
    pub logo_color: Option<String>,
}

impl Badge {
    pub fn new(description: impl Into<String>, url: impl Into<String>) -> Result<Self, BadgeError> {
        let (description, url): (String, String) = (description.into(), url.into());
        let (description, url) = (description.trim().to_string(), url.trim().to_string());
        if description.is_empty() {
            return Err(BadgeError::MissingDescription);
        }
        if url.is_empty() {
            return Err(BadgeError::MissingUrl(description));
        }
        Ok(Badge {
            description,
            url,
            style: BadgeStyle::default(),
        })
    }

    pub fn with_style(mut self, style: BadgeStyle) -> Self {
        self.style = style;
        self
    }

    /// The badge linking to an arXiv abstract page.
    pub fn arxiv(id: &str) -> Self {
        Badge {
            description: "arXiv".to_string(),
            url: arxiv::abs_url(id),
            style: BadgeStyle::default(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn style(&self) -> &BadgeStyle {
        &self.style
    }

    /// The arXiv id this badge links to, if it links to an arXiv abstract or PDF.
    pub fn arxiv_id(&self) -> Option<String> {
        Arxiv::parse(&self.url).map(|a| a.to_string())
    }

    /// Fill in the shields.io parts, substituting defaults for well-known badges.
    pub fn shield(&self) -> Shield {
        let style = &self.style;
        if style.left.is_some() || style.right.is_some() {
            return Shield {
                left: style.left.clone().unwrap_or_default(),
                right: style.right.clone().unwrap_or_default(),
                color: style.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_string()),
                logo: style.logo.clone(),
                logo_color: style.logo_color.clone(),
            };
        }

        let (left, right, color, logo) = if self.description.eq_ignore_ascii_case("arxiv") {
            let id = self.arxiv_id().unwrap_or_else(|| {
                self.url
                    .split_once("arxiv.org/abs/")
                    .map_or(self.url.as_str(), |(_, id)| id)
                    .to_string()
            });
            ("arXiv".to_string(), id, "b31b1b", None)
        } else if self.description.eq_ignore_ascii_case("github") {
            (String::new(), "GitHub".to_string(), "066da5", Some("github"))
        } else {
            (String::new(), self.description.clone(), DEFAULT_COLOR, None)
        };

        Shield {
            left,
            right,
            color: style.color.clone().unwrap_or_else(|| color.to_string()),
            logo: style.logo.clone().or_else(|| logo.map(str::to_string)),
            logo_color: style.logo_color.clone(),
        }
    }

    /// Plain bracketed link, or a clickable shields.io image when `shields` is set.
    pub fn render(&self, shields: bool) -> String {
        let mut html = String::new();
        html.push_str("<span class=\"pub_badge\">\n");
        if shields {
            html.push_str(&format!(
                "<a class=\"pub_badge_link\" href=\"{}\"><img class=\"pub_shield\" alt=\"{}\" src=\"{}\"></a>",
                attr_url(&self.url),
                text::clean(&self.description),
                self.shield().url(),
            ));
        } else {
            html.push_str(&format!(
                "[<a class=\"pub_badge_link\" href=\"{}\">{}</a>]",
                attr_url(&self.url),
                text::clean(&self.description),
            ));
        }
        html.push_str("\n</span>\n");
        html
    }
}

impl Shield {
    /// Image URL of the badge, escaped for use inside an HTML attribute.
    pub fn url(&self) -> String {
        let mut url = format!(
            "{SHIELDS_BASE}/{}-{}-{}",
            shield_segment(&self.left),
            shield_segment(&self.right),
            shield_segment(&self.color),
        );
        let query: Vec<String> = [("logo", &self.logo), ("logoColor", &self.logo_color)]
            .into_iter()
            .filter_map(|(k, v)| {
                v.as_deref()
                    .map(|v| format!("{k}={}", utf8_percent_encode(v, QUERY_ENCODE_SET)))
            })
            .collect();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&amp;"));
        }
        url
    }
}

/// Badge record as written in the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BadgeSpec {
    #[serde(alias = "desc", alias = "name")]
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(flatten)]
    pub style: BadgeStyle,
}

impl TryFrom<BadgeSpec> for Badge {
    type Error = BadgeError;

    fn try_from(spec: BadgeSpec) -> Result<Self, Self::Error> {
        let description = spec.description.unwrap_or_default();
        let badge = Badge::new(description, spec.url.unwrap_or_default())?;
        Ok(badge.with_style(spec.style))
    }
}

/// shields.io doubles `-` and `_` and reads a single `_` as a space.
fn shield_segment(s: &str) -> String {
    let escaped = s.replace('-', "--").replace('_', "__").replace(' ', "_");
    utf8_percent_encode(&escaped, SHIELD_SEGMENT_ENCODE_SET).to_string()
}

/// Make a URL safe to place inside a double-quoted attribute.
pub(crate) fn attr_url(url: &str) -> String {
    url.trim().replace('"', "%22")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_requires_description_and_url() {
        assert_eq!(
            Badge::new("", "https://example.org"),
            Err(BadgeError::MissingDescription)
        );
        assert_eq!(
            Badge::new("GitHub", "  "),
            Err(BadgeError::MissingUrl("GitHub".to_string()))
        );

        let spec = BadgeSpec {
            url: Some("https://example.org".to_string()),
            ..BadgeSpec::default()
        };
        assert_eq!(Badge::try_from(spec), Err(BadgeError::MissingDescription));
    }

    #[test]
    fn plain_badge() {
        let b = Badge::new("GitHub", "https://github.com/x/y").unwrap();
        let html = b.render(false);
        assert!(html.contains(r#"[<a class="pub_badge_link" href="https://github.com/x/y">GitHub</a>]"#));
        assert!(!html.contains("img.shields.io"));
    }

    #[test]
    fn github_defaults() {
        let b = Badge::new("GitHub", "https://github.com/x/y").unwrap();
        let shield = b.shield();
        assert_eq!(
            shield,
            Shield {
                left: String::new(),
                right: "GitHub".to_string(),
                color: "066da5".to_string(),
                logo: Some("github".to_string()),
                logo_color: None,
            }
        );
        assert_eq!(shield.url(), "https://img.shields.io/badge/-GitHub-066da5?logo=github");
        assert!(b.render(true).contains(
            r#"src="https://img.shields.io/badge/-GitHub-066da5?logo=github""#
        ));
    }

    #[test]
    fn arxiv_defaults() {
        let b = Badge::new("arXiv", "https://arxiv.org/abs/1234.5678").unwrap();
        let shield = b.shield();
        assert_eq!(shield.left, "arXiv");
        assert_eq!(shield.right, "1234.5678");
        assert_eq!(shield.color, "b31b1b");
        assert_eq!(shield.url(), "https://img.shields.io/badge/arXiv-1234.5678-b31b1b");

        // Case-insensitive description, trailing whitespace in the url.
        let b = Badge::new("ARXIV", "https://arxiv.org/abs/1703.10368 ").unwrap();
        assert_eq!(b.shield().right, "1703.10368");
    }

    #[test]
    fn other_descriptions_get_plain_defaults() {
        let b = Badge::new("Data set", "https://zenodo.org/record/1").unwrap();
        let shield = b.shield();
        assert_eq!(shield.left, "");
        assert_eq!(shield.right, "Data set");
        assert_eq!(shield.color, "lightgrey");
        assert_eq!(shield.url(), "https://img.shields.io/badge/-Data_set-lightgrey");
    }

    #[test]
    fn explicit_sides_bypass_defaults() {
        let b = Badge::new("arXiv", "https://arxiv.org/abs/1234.5678")
            .unwrap()
            .with_style(BadgeStyle {
                left: Some("pre-print".to_string()),
                right: Some("v2_final".to_string()),
                logo: Some("arxiv".to_string()),
                logo_color: Some("white".to_string()),
                ..BadgeStyle::default()
            });
        let shield = b.shield();
        assert_eq!(shield.color, "lightgrey");
        assert_eq!(
            shield.url(),
            "https://img.shields.io/badge/pre--print-v2__final-lightgrey?logo=arxiv&amp;logoColor=white"
        );
    }

    #[test]
    fn spec_accepts_aliases() {
        let spec: BadgeSpec =
            toml::from_str("name = \"GitHub\"\nurl = \"https://github.com/x\"\nlogoColor = \"white\"")
                .unwrap();
        let badge = Badge::try_from(spec).unwrap();
        assert_eq!(badge.description(), "GitHub");
        assert_eq!(badge.style().logo_color.as_deref(), Some("white"));

        let spec: BadgeSpec = toml::from_str("desc = \"arXiv\"\nurl = \"https://arxiv.org/abs/1\"").unwrap();
        assert_eq!(spec.description.as_deref(), Some("arXiv"));
    }

    #[test]
    fn rendering_is_idempotent() {
        proptest::proptest!(|(desc in "[A-Za-z0-9 -]{1,16}", path in "[a-z0-9/]{0,16}", shields in proptest::bool::ANY)| {
            proptest::prop_assume!(!desc.trim().is_empty());
            let b = Badge::new(desc, format!("https://example.org/{path}")).unwrap();
            proptest::prop_assert_eq!(b.render(shields), b.render(shields));
        })
    }
}
