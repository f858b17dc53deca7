//! Exclusion pattern parsing and matching.

use wildmatch::WildMatchPattern;

/// Glob where only `*` is special; `'\0'` never occurs in a URL, so there is
/// no single-character wildcard.
pub type StarGlob = WildMatchPattern<'*', '\0'>;

/// Strips an `http://`/`https://` prefix and exactly one trailing `/`.
pub fn normalize_url(url: &str) -> &str {
    let trimmed = url.trim();
    let without_scheme = strip_scheme(trimmed);
    without_scheme.strip_suffix('/').unwrap_or(without_scheme)
}

fn strip_scheme(url: &str) -> &str {
    for scheme in ["https://", "http://"] {
        if let Some(head) = url.get(..scheme.len()) {
            if head.eq_ignore_ascii_case(scheme) {
                return &url[scheme.len()..];
            }
        }
    }
    url
}

fn has_wildcard(s: &str) -> bool {
    s.contains('*')
}

/// A compiled exclusion pattern.
///
/// Matching is case-insensitive: patterns and URLs are lowercased after
/// normalisation.
#[derive(Debug, Clone)]
pub enum ExclusionPattern {
    /// No wildcard: the normalised URL must equal the pattern.
    Exact(String),
    /// Single trailing `*`: the normalised URL must start with the prefix.
    Prefix(String),
    /// Wildcards anywhere: full glob, `*` also spans `/`. `?` is literal.
    Glob(StarGlob),
}

impl ExclusionPattern {
    /// Compiles a raw pattern. Blank patterns yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_url(raw).to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        if !has_wildcard(&normalized) {
            return Some(ExclusionPattern::Exact(normalized));
        }
        if let Some(prefix) = normalized.strip_suffix('*') {
            if !has_wildcard(prefix) {
                return Some(ExclusionPattern::Prefix(prefix.to_string()));
            }
        }
        Some(ExclusionPattern::Glob(StarGlob::new(&normalized)))
    }

    /// Tests an already normalised, lowercased URL.
    pub fn matches_normalized(&self, url: &str) -> bool {
        match self {
            ExclusionPattern::Exact(exact) => url == exact,
            ExclusionPattern::Prefix(prefix) => url.starts_with(prefix.as_str()),
            ExclusionPattern::Glob(glob) => glob.matches(url),
        }
    }

    /// Normalises `url` and tests it.
    pub fn matches(&self, url: &str) -> bool {
        self.matches_normalized(&normalize_url(url).to_lowercase())
    }
}

/// Compiles every non-blank pattern, preserving document order.
pub fn compile_patterns<S: AsRef<str>>(raw: &[S]) -> Vec<ExclusionPattern> {
    raw.iter()
        .filter_map(|p| ExclusionPattern::parse(p.as_ref()))
        .collect()
}
