//! Canonical cache keys for tile URLs.
//!
//! Tile providers rotate subdomains (`a.tile…`, `b.tile…`, `c.tile…`) to get
//! more parallel connections. The same tile is therefore reachable through
//! several URLs, and all of them must land in one cache slot. The key is the
//! URL with its subdomain rewritten to the first configured subdomain.
//!
//! A subdomain is recognised when an alphabet entry followed by `.` starts at
//! the beginning of the URL or right after a non-alphanumeric character, so
//! `https://b.tile.example/…` matches `b` while `https://data.example/…` never
//! matches `a`. URLs without a recognisable subdomain are used as-is.

use regex::Regex;

/// Rewrites tile URLs to their canonical cache key.
///
/// Compile once per layer and reuse; [`resolve_key`] is the one-shot form.
#[derive(Debug, Clone)]
pub struct KeyResolver {
    canonical: Option<String>,
    pattern: Option<Regex>,
}

impl KeyResolver {
    /// Builds a resolver for the given subdomain alphabet.
    ///
    /// The first entry is the canonical subdomain. An empty alphabet yields a
    /// pass-through resolver.
    pub fn new<S: AsRef<str>>(subdomains: &[S]) -> Self {
        let canonical = subdomains
            .iter()
            .map(AsRef::as_ref)
            .find(|s| !s.is_empty())
            .map(str::to_string);

        let mut alternatives: Vec<&str> = subdomains
            .iter()
            .map(AsRef::as_ref)
            .filter(|s| !s.is_empty())
            .collect();
        // Longest first so `mt10` wins over `mt1` at the same position.
        alternatives.sort_by_key(|s| std::cmp::Reverse(s.len()));
        alternatives.dedup();

        let pattern = if alternatives.is_empty() {
            None
        } else {
            let body = alternatives
                .iter()
                .map(|s| regex::escape(s))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"(?:^|[^A-Za-z0-9])({})\.", body)).ok()
        };

        Self { canonical, pattern }
    }

    /// Returns the cache key for a fully substituted tile URL.
    pub fn resolve(&self, url: &str) -> String {
        let (Some(pattern), Some(canonical)) = (&self.pattern, &self.canonical) else {
            return url.to_string();
        };

        match pattern.captures(url).and_then(|caps| caps.get(1)) {
            Some(token) => {
                let mut key = String::with_capacity(url.len());
                key.push_str(&url[..token.start()]);
                key.push_str(canonical);
                key.push_str(&url[token.end()..]);
                key
            }
            None => url.to_string(),
        }
    }
}

/// Maps a tile URL to its canonical cache key.
///
/// # Arguments
///
/// * `url` - Tile URL with the subdomain already substituted
/// * `subdomains` - Ordered subdomain alphabet configured for the layer
pub fn resolve_key<S: AsRef<str>>(url: &str, subdomains: &[S]) -> String {
    KeyResolver::new(subdomains).resolve(url)
}
