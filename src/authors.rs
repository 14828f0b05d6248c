use crate::text;

/// How author lists are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorStyle {
    /// Reduce the leading given name to an initial.
    pub abbreviate_first: bool,
    /// Collapse to "first et al." when there are more names than this.
    pub et_al_at: usize,
}

impl Default for AuthorStyle {
    fn default() -> Self {
        AuthorStyle {
            abbreviate_first: true,
            et_al_at: 1000,
        }
    }
}

/// A personal name split BibTeX-style into its four parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name {
    pub first: Vec<String>,
    pub von: Vec<String>,
    pub last: Vec<String>,
    pub jr: Vec<String>,
}

impl Name {
    /// Split `First von Last`, `von Last, First` or `von Last, Jr, First`.
    pub fn parse(name: &str) -> Name {
        let parts: Vec<&str> = split_top_level(name, |c| c == ',')
            .into_iter()
            .map(str::trim)
            .collect();

        match parts.as_slice() {
            [] => Name::default(),
            [whole] => {
                let tokens = tokens(whole);
                if tokens.len() <= 1 {
                    return Name {
                        last: tokens,
                        ..Name::default()
                    };
                }
                // `von` runs from the first to the last lowercase token, never taking the final one.
                let head = &tokens[..tokens.len() - 1];
                match head.iter().position(|t| is_lowercase(t)) {
                    Some(start) => {
                        let end = head.iter().rposition(|t| is_lowercase(t)).unwrap_or(start);
                        Name {
                            first: tokens[..start].to_vec(),
                            von: tokens[start..=end].to_vec(),
                            last: tokens[end + 1..].to_vec(),
                            jr: Vec::new(),
                        }
                    }
                    None => Name {
                        first: head.to_vec(),
                        last: vec![tokens[tokens.len() - 1].clone()],
                        ..Name::default()
                    },
                }
            }
            [von_last, rest @ ..] => {
                let (von, last) = split_von_last(tokens(von_last));
                let (jr, first) = match rest {
                    [first] => (Vec::new(), tokens(first)),
                    [jr, first @ ..] => (tokens(jr), first.iter().flat_map(|f| tokens(f)).collect()),
                    [] => (Vec::new(), Vec::new()),
                };
                Name {
                    first,
                    von,
                    last,
                    jr,
                }
            }
        }
    }
}

/// Split a raw BibTeX author field on the top-level ` and ` separators.
pub fn split_list(raw: &str) -> Vec<String> {
    let words = split_top_level(raw, |c| c.is_ascii_whitespace());
    let mut out = Vec::new();
    let mut cur: Vec<&str> = Vec::new();
    for word in words.into_iter().filter(|w| !w.is_empty()) {
        if word.eq_ignore_ascii_case("and") && !cur.is_empty() {
            out.push(cur.join(" "));
            cur.clear();
        } else {
            cur.push(word);
        }
    }
    if !cur.is_empty() {
        out.push(cur.join(" "));
    }
    out
}

/// Format a list of `Last, First` names into a one-line author string.
///
/// `key` only labels the warning emitted for given names the abbreviation cannot classify.
pub fn format_authors(names: &[String], style: &AuthorStyle, key: &str) -> String {
    let authors: Vec<String> = names
        .iter()
        .map(|n| format_name(&Name::parse(n), style, key))
        .filter(|n| !n.is_empty())
        .collect();

    let res = match authors.as_slice() {
        [] => String::new(),
        [first, ..] if authors.len() > style.et_al_at => format!("{first} et al."),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    };
    text::clean(&res)
}

fn format_name(name: &Name, style: &AuthorStyle, key: &str) -> String {
    let given: Vec<String> = name.first.iter().map(|f| text::clean(f)).collect();
    let first = if style.abbreviate_first {
        given
            .iter()
            .enumerate()
            .map(|(i, f)| if i == 0 { abbreviate(f, key) } else { f.clone() })
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        given.join(" ")
    };

    let mut parts = Vec::with_capacity(4);
    if !first.is_empty() {
        parts.push(title_case(&first));
    }
    if !name.von.is_empty() {
        parts.push(name.von.join(" ").to_lowercase());
    }
    // Surnames are not re-cased, that would break e.g. "de Heuvel" spelled inside the last name.
    if !name.last.is_empty() {
        parts.push(name.last.join(" "));
    }
    if !name.jr.is_empty() {
        parts.push(name.jr.join(" "));
    }
    parts.join(" ")
}

fn abbreviate(given: &str, key: &str) -> String {
    let mut chars = given.chars();
    let Some(initial) = chars.next() else {
        return String::new();
    };
    let len = given.chars().count();
    if len > 2 || given.ends_with(['.', ':', ';']) {
        format!("{initial}.")
    } else {
        tracing::warn!(
            key,
            given,
            "cannot tell whether this given name is an initial, leaving it as written"
        );
        given.to_string()
    }
}

/// Uppercase the first letter of every alphabetic run and lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

fn split_von_last(tokens: Vec<String>) -> (Vec<String>, Vec<String>) {
    if tokens.len() <= 1 {
        return (Vec::new(), tokens);
    }
    let head = &tokens[..tokens.len() - 1];
    match head.iter().rposition(|t| is_lowercase(t)) {
        Some(end) if head[..=end].iter().all(|t| is_lowercase(t)) => {
            (tokens[..=end].to_vec(), tokens[end + 1..].to_vec())
        }
        _ => {
            let lead = head.iter().take_while(|t| is_lowercase(t)).count();
            (tokens[..lead].to_vec(), tokens[lead..].to_vec())
        }
    }
}

fn tokens(s: &str) -> Vec<String> {
    split_top_level(s, |c| c.is_ascii_whitespace() || c == '~')
        .into_iter()
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// A token counts as lowercase when its first letter is. Fully braced tokens are caseless.
fn is_lowercase(token: &str) -> bool {
    if token.starts_with('{') && !token.starts_with("{\\") {
        return false;
    }
    text::clean(token)
        .chars()
        .find(|c| c.is_alphabetic())
        .is_some_and(char::is_lowercase)
}

/// Split on `sep` characters that are not inside braces.
fn split_top_level(s: &str, sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && sep(c) => {
                out.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    out.push(&s[start..]);
    out
}
