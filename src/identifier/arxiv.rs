use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::identifier::Identifier;

pub const ABS_URL_PREFIX: &str = "https://arxiv.org/abs/";

/// An arXiv identifier or URL, normalised to its canonical ID and optional version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arxiv {
    /// Canonical arXiv ID without version (e.g., "1810.04805" or "astro-ph/0603274").
    canonical_id: String,
    /// Optional explicit version number when present in the input (e.g., Some("2")).
    version: Option<String>,
}

impl<'a> Identifier<'a> for Arxiv {
    fn parse(identifier: &'a str) -> Option<Self> {
        let mut s = identifier.trim();

        if let Some(rest) = s
            .strip_prefix("arXiv:")
            .or_else(|| s.strip_prefix("arxiv:"))
        {
            s = rest.trim_start();
        }

        // arXiv abs/pdf pages, including the legacy host alias:
        //  - https://arxiv.org/abs/1810.04805v2
        //  - https://arxiv.org/pdf/1810.04805v2.pdf
        //  - https://xxx.lanl.gov/abs/astro-ph/0603274v1
        let path;
        if let Ok(url) = Url::parse(s)
            && matches!(url.scheme(), "http" | "https")
        {
            let host = url.host_str()?.to_ascii_lowercase();
            // Anchored on the host so bioRxiv/medRxiv never match.
            if host != "arxiv.org" && !host.ends_with(".arxiv.org") && !host.ends_with("xxx.lanl.gov")
            {
                return None;
            }
            let p = url.path().trim_start_matches('/');
            path = if let Some(rest) = p.strip_prefix("abs/") {
                rest.to_string()
            } else if let Some(rest) = p.strip_prefix("pdf/") {
                rest.strip_suffix(".pdf").unwrap_or(rest).to_string()
            } else {
                // Listing and search pages carry no single identifier.
                return None;
            };
            s = &path;
        }

        static NEWSTYLE_RE: Lazy<Regex> = Lazy::new(|| {
            // YYMM.NNNN(vN)? or YYMM.NNNNN(vN)?
            Regex::new(r"^(?P<core>\d{4}\.[0-9]{4,5})(?:v(?P<v>\d+))?$").unwrap()
        });
        static LEGACY_RE: Lazy<Regex> = Lazy::new(|| {
            // archive(.subject)?/NNNNNNN(vN)?, e.g. math.GT/0309136
            Regex::new(r"^(?P<core>[A-Za-z-]+(?:\.[A-Za-z-]+)?/[0-9]{7})(?:v(?P<v>\d+))?$").unwrap()
        });

        let s = s.trim_matches('/');
        let caps = NEWSTYLE_RE
            .captures(s)
            .or_else(|| LEGACY_RE.captures(s))?;

        Some(Arxiv {
            canonical_id: caps.name("core")?.as_str().to_string(),
            version: caps.name("v").map(|m| m.as_str().to_string()),
        })
    }
}

impl fmt::Display for Arxiv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}v{}", self.canonical_id, v),
            None => f.write_str(&self.canonical_id),
        }
    }
}

/// Link to the abstract page of an arXiv preprint.
pub fn abs_url(id: &str) -> String {
    format!("{ABS_URL_PREFIX}{id}")
}
