//! # Public Suffix List
//!
//! Parses `public_suffix_list.dat` into a label tree keyed by reversed
//! labels (`co.uk` is stored as `uk` → `co`) and splits host names into the
//! registrable part and the public suffix.
//!
//! Matching follows the list's rules: the longest matching rule wins, `*`
//! matches any single label, and `!` exception rules take precedence and
//! drop their leftmost label.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use ronin_common::config::Config;
use thiserror::Error;
use tracing::info;

use crate::home;

pub const FILE_NAME: &str = "public_suffix_list.dat";

const ICANN_MARKER: &str = "===BEGIN ICANN DOMAINS===";
const PRIVATE_MARKER: &str = "===BEGIN PRIVATE DOMAINS===";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hostname '{0}': no registrable domain under a known public suffix")]
pub struct InvalidHostname(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuffixKind {
    Icann,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Suffix {
    pub name: String,
    pub kind: SuffixKind,
}

impl Suffix {
    pub fn new(name: impl Into<String>, kind: SuffixKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.name.starts_with("*.")
    }

    pub fn is_exception(&self) -> bool {
        self.name.starts_with('!')
    }

    pub fn is_icann(&self) -> bool {
        self.kind == SuffixKind::Icann
    }

    pub fn is_private(&self) -> bool {
        self.kind == SuffixKind::Private
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Default, Clone)]
struct Node {
    children: HashMap<String, Node>,
    /// Index into `List::suffixes` when a rule ends here.
    rule: Option<usize>,
}

/// Best rule found while walking the tree for one host.
#[derive(Debug, Default, Clone, Copy)]
struct Match {
    /// Labels of the host that form the suffix.
    labels: usize,
    rule: Option<usize>,
    exception: bool,
}

impl Match {
    fn consider(&mut self, labels: usize, rule: usize, exception: bool) {
        let better = match (self.exception, exception) {
            (false, true) => true,
            (true, false) => false,
            _ => self.rule.is_none() || labels > self.labels,
        };
        if better {
            *self = Match {
                labels,
                rule: Some(rule),
                exception,
            };
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct List {
    suffixes: Vec<Suffix>,
    root: Node,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Self {
        let mut list = Self::new();
        let mut kind = SuffixKind::Icann;

        for line in text.lines() {
            let line = line.trim();
            if let Some(comment) = line.strip_prefix("//") {
                let comment = comment.trim();
                if comment.starts_with(ICANN_MARKER) {
                    kind = SuffixKind::Icann;
                } else if comment.starts_with(PRIVATE_MARKER) {
                    kind = SuffixKind::Private;
                }
                continue;
            }
            // Rules end at the first whitespace.
            if let Some(rule) = line.split_whitespace().next() {
                list.insert(Suffix::new(rule.to_lowercase(), kind));
            }
        }

        list
    }

    pub fn insert(&mut self, suffix: Suffix) {
        let index = self.suffixes.len();
        let mut node = &mut self.root;
        for label in suffix.name.rsplit('.') {
            node = node.children.entry(label.to_string()).or_default();
        }
        node.rule = Some(index);
        self.suffixes.push(suffix);
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Suffix> {
        self.suffixes.iter()
    }

    pub fn icann(&self) -> impl Iterator<Item = &Suffix> {
        self.iter().filter(|suffix| suffix.is_icann())
    }

    pub fn private(&self) -> impl Iterator<Item = &Suffix> {
        self.iter().filter(|suffix| suffix.is_private())
    }

    fn find(&self, labels: &[&str]) -> Match {
        let mut best = Match::default();
        walk(&self.root, labels, 0, &mut best);
        best
    }

    /// The public suffix of `host` and the rule that produced it.
    pub fn suffix_of(&self, host: &str) -> Option<(String, &Suffix)> {
        let host = normalize(host);
        let labels: Vec<&str> = host.rsplit('.').collect();
        let found = self.find(&labels);
        let rule = &self.suffixes[found.rule?];

        let mut suffix: Vec<&str> = labels[..found.labels].to_vec();
        suffix.reverse();
        Some((suffix.join("."), rule))
    }

    /// Splits `host` into `(name, suffix)`, e.g. `www.example.co.uk` into
    /// `("www.example", "co.uk")`.
    pub fn split(&self, host: &str) -> Result<(String, String), InvalidHostname> {
        let normalized = normalize(host);
        let invalid = || InvalidHostname(host.to_string());

        let (suffix, _) = self.suffix_of(&normalized).ok_or_else(invalid)?;
        let name = normalized
            .strip_suffix(suffix.as_str())
            .and_then(|name| name.strip_suffix('.'))
            .filter(|name| !name.is_empty())
            .ok_or_else(invalid)?;

        Ok((name.to_string(), suffix))
    }

    /// The registrable domain: the suffix plus one more label.
    pub fn domain(&self, host: &str) -> Result<String, InvalidHostname> {
        let (name, suffix) = self.split(host)?;
        let label = name.rsplit('.').next().unwrap_or(&name);
        Ok(format!("{label}.{suffix}"))
    }

    pub fn path(config: &Config) -> PathBuf {
        home::cache_path(config, FILE_NAME)
    }

    pub fn is_stale(path: &Path, max_age: Duration) -> bool {
        home::is_stale(path, max_age)
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub async fn download(config: &Config) -> anyhow::Result<()> {
        home::download(config, &config.public_suffix_url, &Self::path(config)).await
    }

    pub async fn update(config: &Config) -> anyhow::Result<bool> {
        home::update(config, &config.public_suffix_url, &Self::path(config)).await
    }

    pub async fn load(config: &Config) -> anyhow::Result<Self> {
        Self::update(config).await?;
        let list = Self::open(&Self::path(config))?;
        info!("loaded {} public suffixes", list.len());
        Ok(list)
    }
}

fn normalize(host: &str) -> String {
    host.trim().trim_end_matches('.').to_lowercase()
}

/// `labels` are the host labels right to left; `depth` of them matched so far.
fn walk(node: &Node, labels: &[&str], depth: usize, best: &mut Match) {
    let Some(label) = labels.get(depth) else {
        return;
    };

    if let Some(exception) = node.children.get(&format!("!{label}")) {
        if let Some(rule) = exception.rule {
            best.consider(depth, rule, true);
        }
    }

    for key in [*label, "*"] {
        if let Some(child) = node.children.get(key) {
            if let Some(rule) = child.rule {
                best.consider(depth + 1, rule, false);
            }
            walk(child, labels, depth + 1, best);
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
// This Source Code Form is subject to the terms of the Mozilla Public License.

// ===BEGIN ICANN DOMAINS===

com
uk
co.uk
jp
*.kobe.jp
!city.kobe.jp

// ck : https://en.wikipedia.org/wiki/.ck
*.ck
!www.ck

// ===END ICANN DOMAINS===
// ===BEGIN PRIVATE DOMAINS===

blogspot.com
github.io   trailing comments are ignored

// ===END PRIVATE DOMAINS===
";

    fn list() -> List {
        List::parse(SAMPLE)
    }

    fn split(host: &str) -> (String, String) {
        list().split(host).unwrap()
    }

    #[test]
    fn parses_sections() {
        let list = list();
        assert_eq!(list.len(), 10);
        assert_eq!(list.icann().count(), 8);
        assert_eq!(
            list.private().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["blogspot.com", "github.io"]
        );
        assert!(list.iter().any(|s| s.is_wildcard() && s.name == "*.ck"));
        assert!(list.iter().any(|s| s.is_exception() && s.name == "!www.ck"));
    }

    #[test]
    fn splits_simple_suffixes() {
        assert_eq!(split("www.example.com"), ("www.example".into(), "com".into()));
        assert_eq!(split("example.com"), ("example".into(), "com".into()));
    }

    #[test]
    fn longest_suffix_wins() {
        assert_eq!(split("www.example.co.uk"), ("www.example".into(), "co.uk".into()));
        assert_eq!(split("example.uk"), ("example".into(), "uk".into()));
    }

    #[test]
    fn private_suffixes() {
        assert_eq!(split("me.blogspot.com"), ("me".into(), "blogspot.com".into()));
        let list = list();
        let (_, rule) = list.suffix_of("me.github.io").unwrap();
        assert_eq!(rule.kind, SuffixKind::Private);
    }

    #[test]
    fn wildcards_and_exceptions() {
        assert_eq!(split("www.shop.kobe.jp"), ("www".into(), "shop.kobe.jp".into()));
        assert_eq!(split("www.city.kobe.jp"), ("www.city".into(), "kobe.jp".into()));
        assert_eq!(split("a.b.ck"), ("a".into(), "b.ck".into()));
        assert_eq!(split("www.ck"), ("www".into(), "ck".into()));
    }

    #[test]
    fn normalizes_case_and_trailing_dot() {
        assert_eq!(split("WWW.Example.COM."), ("www.example".into(), "com".into()));
    }

    #[test]
    fn invalid_hostnames() {
        let list = list();
        assert_eq!(list.split("co.uk"), Err(InvalidHostname("co.uk".to_string())));
        assert!(list.split("example.invalidtld").is_err());
        assert!(list.split("shop.kobe.jp").is_err());
    }

    #[test]
    fn registrable_domain() {
        assert_eq!(list().domain("a.b.example.co.uk").unwrap(), "example.co.uk");
    }

    #[tokio::test]
    #[ignore]
    async fn loads_published_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_cache_dir(dir.path());
        let list = List::load(&config).await.unwrap();
        assert_eq!(list.split("www.google.co.uk").unwrap().1, "co.uk");
    }
}
