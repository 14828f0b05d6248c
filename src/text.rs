use std::{iter::Peekable, str::Chars};

/// Turn LaTeX-escaped bibliography text into flat text that can be dropped into an HTML fragment.
///
/// The expansion is best-effort: macros we do not know are left in the output as written. Double
/// quotes become single quotes since every attribute we emit is delimited by `"`.
pub fn clean(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    Expander {
        chars: raw.chars().peekable(),
        nesting: 0,
    }
    .run(&mut out, false);
    normalize_ws(&out).replace('"', "'")
}

/// Macro arguments nested deeper than this are copied as written instead of expanded.
const MAX_NESTING: usize = 64;

struct Expander<'a> {
    chars: Peekable<Chars<'a>>,
    /// Macro arguments currently being expanded.
    nesting: usize,
}

impl Expander<'_> {
    /// Expand until the input ends, or until the closing brace of the current group.
    fn run(&mut self, out: &mut String, in_group: bool) {
        // Plain grouping braces only change the depth.
        let mut depth = 0usize;
        while let Some(c) = self.chars.next() {
            match c {
                '{' => depth += 1,
                '}' if depth > 0 => depth -= 1,
                '}' if in_group => return,
                // Stray closing brace or math delimiter.
                '}' | '$' => {}
                '\\' => self.command(out),
                '~' => out.push('\u{a0}'),
                '-' => {
                    if self.eat('-') {
                        out.push(if self.eat('-') { '—' } else { '–' });
                    } else {
                        out.push('-');
                    }
                }
                '`' => out.push(if self.eat('`') { '“' } else { '‘' }),
                '\'' => out.push(if self.eat('\'') { '”' } else { '\'' }),
                c => out.push(c),
            }
        }
    }

    fn command(&mut self, out: &mut String) {
        let Some(&first) = self.chars.peek() else {
            out.push('\\');
            return;
        };

        if !first.is_ascii_alphabetic() {
            self.chars.next();
            match first {
                '&' | '%' | '$' | '#' | '_' | '{' | '}' => out.push(first),
                '\\' | ' ' | ',' | ';' | ':' => out.push(' '),
                // Discretionary hyphen, italic correction, negative space, math mode switches.
                '-' | '/' | '!' | '(' | ')' | '[' | ']' => {}
                '"' | '\'' | '`' | '^' | '~' | '=' | '.' => {
                    let arg = self.argument();
                    out.push_str(&accent(first, &arg));
                }
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
            return;
        }

        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_alphabetic() {
                break;
            }
            name.push(c);
            self.chars.next();
        }

        match name.as_str() {
            "c" | "v" | "u" | "H" | "r" | "k" | "d" | "b" | "t" => {
                let arg = self.argument();
                let mark = name.chars().next().unwrap_or_default();
                out.push_str(&accent(mark, &arg));
            }
            "url" => {
                self.skip_spaces();
                if self.eat('{') {
                    self.raw_group(out);
                }
            }
            "href" => {
                self.skip_spaces();
                if self.eat('{') {
                    self.raw_group(&mut String::new());
                }
                out.push_str(&self.argument());
            }
            n if STYLE_WRAPPERS.contains(&n) => out.push_str(&self.argument()),
            n if DECLARATIONS.contains(&n) => self.skip_spaces(),
            n => match symbol(n) {
                Some(sym) => out.push_str(sym),
                None => {
                    out.push('\\');
                    out.push_str(n);
                }
            },
        }
    }

    /// A macro argument: a braced group, another macro, or a single character.
    fn argument(&mut self) -> String {
        self.skip_spaces();
        let mut arg = String::new();
        if self.nesting >= MAX_NESTING {
            match self.chars.next() {
                Some('{') => self.raw_group(&mut arg),
                Some(c) => arg.push(c),
                None => {}
            }
            return arg;
        }
        self.nesting += 1;
        match self.chars.next() {
            Some('{') => self.run(&mut arg, true),
            Some('\\') => self.command(&mut arg),
            Some(c) => arg.push(c),
            None => {}
        }
        self.nesting -= 1;
        arg
    }

    /// Copy a group verbatim up to its matching closing brace.
    fn raw_group(&mut self, out: &mut String) {
        let mut depth = 0usize;
        for c in self.chars.by_ref() {
            match c {
                '{' => depth += 1,
                '}' if depth == 0 => return,
                '}' => depth -= 1,
                _ => {}
            }
            out.push(c);
        }
    }

    fn skip_spaces(&mut self) {
        while self.chars.next_if(|c| c.is_ascii_whitespace()).is_some() {}
    }

    fn eat(&mut self, c: char) -> bool {
        self.chars.next_if_eq(&c).is_some()
    }
}

static STYLE_WRAPPERS: &[&str] = &[
    "emph",
    "textit",
    "textbf",
    "textsc",
    "textrm",
    "textsf",
    "texttt",
    "textup",
    "textsl",
    "textmd",
    "textnormal",
    "textsuperscript",
    "textsubscript",
    "underline",
    "uline",
    "text",
    "mbox",
    "hbox",
    "ensuremath",
    "mathrm",
    "mathit",
    "mathbf",
    "mathsf",
    "mathtt",
    "mathcal",
    "mathbb",
    "operatorname",
    "NoCaseChange",
];

static DECLARATIONS: &[&str] = &[
    "it",
    "bf",
    "em",
    "sc",
    "rm",
    "sf",
    "tt",
    "sl",
    "up",
    "itshape",
    "bfseries",
    "scshape",
    "upshape",
    "normalfont",
    "small",
    "footnotesize",
    "large",
    "Large",
    "left",
    "right",
    "big",
    "Big",
    "relax",
    "noindent",
    "displaystyle",
];

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "ss" => "ß",
        "SS" => "SS",
        "o" => "ø",
        "O" => "Ø",
        "ae" => "æ",
        "AE" => "Æ",
        "oe" => "œ",
        "OE" => "Œ",
        "aa" => "å",
        "AA" => "Å",
        "l" => "ł",
        "L" => "Ł",
        "i" => "ı",
        "j" => "ȷ",
        "dh" => "ð",
        "DH" => "Ð",
        "th" => "þ",
        "TH" => "Þ",
        "ng" => "ŋ",
        "NG" => "Ŋ",
        "TeX" => "TeX",
        "LaTeX" => "LaTeX",
        "BibTeX" => "BibTeX",
        "textendash" => "–",
        "textemdash" => "—",
        "dots" | "ldots" | "textellipsis" => "…",
        "textasciitilde" => "~",
        "textbackslash" => "\\",
        "S" => "§",
        "P" => "¶",
        "copyright" | "textcopyright" => "©",
        "textregistered" => "®",
        "texttrademark" => "™",
        "degree" | "textdegree" => "°",
        "euro" | "texteuro" => "€",
        "pounds" | "textsterling" => "£",
        "quad" | "qquad" => " ",
        "textquoteleft" => "‘",
        "textquoteright" => "’",
        "textquotedblleft" => "“",
        "textquotedblright" => "”",
        "guillemotleft" => "«",
        "guillemotright" => "»",
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" => "ϵ",
        "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" => "θ",
        "iota" => "ι",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "upsilon" => "υ",
        "phi" => "ϕ",
        "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Xi" => "Ξ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        "pm" => "±",
        "mp" => "∓",
        "times" => "×",
        "cdot" => "·",
        "approx" => "≈",
        "sim" => "~",
        "le" | "leq" => "≤",
        "ge" | "geq" => "≥",
        "ne" | "neq" => "≠",
        "infty" => "∞",
        "to" | "rightarrow" => "→",
        "leftarrow" => "←",
        "propto" => "∝",
        "partial" => "∂",
        "nabla" => "∇",
        "ell" => "ℓ",
        "hbar" => "ℏ",
        "prime" => "′",
        "circ" => "∘",
        "ast" => "∗",
        "langle" => "⟨",
        "rangle" => "⟩",
        _ => return None,
    })
}

/// Accent marks with their precomposed forms, `(mark, bases, composed)`, index-aligned.
static ACCENTS: &[(char, &str, &str)] = &[
    ('"', "aeiouyAEIOUY", "äëïöüÿÄËÏÖÜŸ"),
    ('\'', "aeiouyAEIOUYcnszCNSZ", "áéíóúýÁÉÍÓÚÝćńśźĆŃŚŹ"),
    ('`', "aeiouAEIOU", "àèìòùÀÈÌÒÙ"),
    ('^', "aeiouAEIOU", "âêîôûÂÊÎÔÛ"),
    ('~', "anoANO", "ãñõÃÑÕ"),
    ('=', "aeiouAEIOU", "āēīōūĀĒĪŌŪ"),
    ('.', "zZeEI", "żŻėĖİ"),
    ('c', "cCsStT", "çÇşŞţŢ"),
    ('v', "cCsSzZrRnNeEdDtT", "čČšŠžŽřŘňŇěĚďĎťŤ"),
    ('u', "aAgGeEoO", "ăĂğĞĕĔŏŎ"),
    ('H', "oOuU", "őŐűŰ"),
    ('r', "aAuU", "åÅůŮ"),
    ('k', "aAeE", "ąĄęĘ"),
];

fn combining(mark: char) -> Option<char> {
    Some(match mark {
        '"' => '\u{308}',
        '\'' => '\u{301}',
        '`' => '\u{300}',
        '^' => '\u{302}',
        '~' => '\u{303}',
        '=' => '\u{304}',
        '.' => '\u{307}',
        'c' => '\u{327}',
        'v' => '\u{30c}',
        'u' => '\u{306}',
        'H' => '\u{30b}',
        'r' => '\u{30a}',
        'k' => '\u{328}',
        'd' => '\u{323}',
        'b' => '\u{331}',
        't' => '\u{361}',
        _ => return None,
    })
}

fn accent(mark: char, arg: &str) -> String {
    let mut chars = arg.chars();
    let Some(base) = chars.next() else {
        return combining(mark).map(String::from).unwrap_or_default();
    };
    // Dotless i/j from `\i`/`\j` take accents like their dotted forms.
    let base = match base {
        'ı' => 'i',
        'ȷ' => 'j',
        b => b,
    };

    let composed = ACCENTS
        .iter()
        .find(|(m, _, _)| *m == mark)
        .and_then(|(_, bases, composed)| {
            let idx = bases.chars().position(|b| b == base)?;
            composed.chars().nth(idx)
        });

    let mut out = String::with_capacity(arg.len() + 2);
    match (composed, combining(mark)) {
        (Some(c), _) => out.push(c),
        (None, Some(m)) => {
            out.push(base);
            out.push(m);
        }
        (None, None) => out.push(base),
    }
    out.push_str(chars.as_str());
    out
}

/// Collapse runs of ASCII whitespace. No-break spaces from `~` survive.
fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_ascii_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim_matches(|c: char| c.is_ascii_whitespace()).to_string()
}
