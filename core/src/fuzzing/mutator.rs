use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use regex::Regex;
use ronin_common::utils::product::Product;
use thiserror::Error;
use tracing::warn;

/// Masks are `u64`, so at most this many matches take part in a mutation.
pub const MAX_MATCHES: usize = 63;

#[derive(Debug, Error)]
pub enum FuzzError {
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("rule '{0}' is not of the form REGEX=VALUE[,VALUE...]")]
    InvalidRule(String),
}

pub type MutationFn = Arc<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// What a match gets replaced with.
#[derive(Clone)]
pub enum Mutation {
    Values(Vec<String>),
    /// Computed from the matched text.
    Function(MutationFn),
}

impl Mutation {
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Values(values.into_iter().map(Into::into).collect())
    }

    pub fn function(f: impl Fn(&str) -> Vec<String> + Send + Sync + 'static) -> Self {
        Self::Function(Arc::new(f))
    }

    pub fn apply(&self, matched: &str) -> Vec<String> {
        match self {
            Self::Values(values) => values.clone(),
            Self::Function(f) => f(matched),
        }
    }
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Values(values) => f.debug_tuple("Values").field(values).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: Regex,
    pub mutation: Mutation,
}

impl Rule {
    pub fn new(pattern: Regex, mutation: Mutation) -> Self {
        Self { pattern, mutation }
    }

    pub fn values<I, S>(pattern: &str, values: I) -> Result<Self, FuzzError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(Regex::new(pattern)?, Mutation::values(values)))
    }

    /// Parses `REGEX=VALUE,VALUE`. The split is on the last `=`, so the
    /// pattern may contain `=` but the values may not.
    pub fn parse(rule: &str) -> Result<Self, FuzzError> {
        let (pattern, values) = rule
            .rsplit_once('=')
            .filter(|(pattern, _)| !pattern.is_empty())
            .ok_or_else(|| FuzzError::InvalidRule(rule.to_string()))?;
        Self::values(pattern, values.split(','))
    }
}

fn splice(text: &str, range: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..range.start]);
    out.push_str(replacement);
    out.push_str(&text[range.end..]);
    out
}

/// Replaces one match at a time: for every rule, every match and every
/// substitution, yields the text with only that match replaced.
#[derive(Debug, Clone, Default)]
pub struct Fuzzer {
    rules: Vec<Rule>,
}

impl Fuzzer {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn each<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.rules.iter().flat_map(move |rule| {
            rule.pattern.find_iter(text).flat_map(move |found| {
                rule.mutation
                    .apply(found.as_str())
                    .into_iter()
                    .map(move |replacement| splice(text, found.range(), &replacement))
            })
        })
    }
}

#[derive(Debug, Clone)]
struct Site {
    range: Range<usize>,
    values: Vec<String>,
}

/// Replaces every non-empty combination of matches with every combination
/// of their substitutions.
#[derive(Debug, Clone, Default)]
pub struct Mutator {
    rules: Vec<Rule>,
}

impl Mutator {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Matches are numbered rule by rule, then left to right, and match `i`
    /// is bit `i` of the subset mask. Masks run from 1 upwards; subsets whose
    /// matches overlap are skipped.
    pub fn each<'a>(&self, text: &'a str) -> Mutations<'a> {
        let mut sites: Vec<Site> = self
            .rules
            .iter()
            .flat_map(|rule| {
                rule.pattern.find_iter(text).map(move |found| Site {
                    range: found.range(),
                    values: rule.mutation.apply(found.as_str()),
                })
            })
            .collect();

        if sites.len() > MAX_MATCHES {
            warn!(
                "{} matches found, only the first {MAX_MATCHES} are mutated",
                sites.len()
            );
            sites.truncate(MAX_MATCHES);
        }

        let end = 1u64 << sites.len();
        Mutations {
            text,
            sites,
            mask: 1,
            end,
            current: None,
        }
    }
}

pub struct Mutations<'a> {
    text: &'a str,
    sites: Vec<Site>,
    mask: u64,
    end: u64,
    current: Option<(Vec<usize>, Product<String>)>,
}

impl Mutations<'_> {
    /// Indices of the matches in `mask`, ordered by position, or `None`
    /// when two of them overlap.
    fn select(&self, mask: u64) -> Option<Vec<usize>> {
        let mut selected: Vec<usize> = (0..self.sites.len())
            .filter(|i| mask >> i & 1 == 1)
            .collect();
        selected.sort_by_key(|&i| (self.sites[i].range.start, self.sites[i].range.end));

        let disjoint = selected
            .windows(2)
            .all(|pair| self.sites[pair[0]].range.end <= self.sites[pair[1]].range.start);
        disjoint.then_some(selected)
    }

    fn render(&self, selected: &[usize], replacements: &[String]) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for (&index, replacement) in selected.iter().zip(replacements) {
            let range = &self.sites[index].range;
            out.push_str(&self.text[cursor..range.start]);
            out.push_str(replacement);
            cursor = range.end;
        }
        out.push_str(&self.text[cursor..]);
        out
    }
}

impl Iterator for Mutations<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some((selected, mut product)) = self.current.take()
                && let Some(replacements) = product.next()
            {
                let out = self.render(&selected, &replacements);
                self.current = Some((selected, product));
                return Some(out);
            }

            if self.mask >= self.end {
                return None;
            }
            let mask = self.mask;
            self.mask += 1;

            if let Some(selected) = self.select(mask) {
                let sets = selected
                    .iter()
                    .map(|&i| self.sites[i].values.clone())
                    .collect();
                self.current = Some((selected, Product::new(sets)));
            }
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

    fn rule(pattern: &str, values: &[&str]) -> Rule {
        Rule::values(pattern, values.iter().copied()).unwrap()
    }

    #[test]
    fn parses_rules() {
        let rule = Rule::parse("a=1,2").unwrap();
        assert_eq!(rule.pattern.as_str(), "a");
        assert_eq!(rule.mutation.apply("a"), vec!["1", "2"]);

        let rule = Rule::parse("x=y=z").unwrap();
        assert_eq!(rule.pattern.as_str(), "x=y");

        assert!(matches!(Rule::parse("novalues"), Err(FuzzError::InvalidRule(_))));
        assert!(matches!(Rule::parse("=a"), Err(FuzzError::InvalidRule(_))));
        assert!(matches!(Rule::parse("(=a"), Err(FuzzError::Pattern(_))));
    }

    #[test]
    fn fuzzer_replaces_one_match_at_a_time() {
        let fuzzer = Fuzzer::new(vec![rule("a", &["1", "2"])]);
        let out: Vec<String> = fuzzer.each("a-a").collect();
        assert_eq!(out, vec!["1-a", "2-a", "a-1", "a-2"]);
    }

    #[test]
    fn fuzzer_rules_in_order() {
        let fuzzer = Fuzzer::new(vec![rule("a", &["A"]), rule("b", &["B"])]);
        let out: Vec<String> = fuzzer.each("ab").collect();
        assert_eq!(out, vec!["Ab", "aB"]);
    }

    #[test]
    fn fuzzer_without_matches() {
        let fuzzer = Fuzzer::new(vec![rule("z", &["1"])]);
        assert_eq!(fuzzer.each("abc").count(), 0);
    }

    #[test]
    fn function_mutations() {
        let upper = Rule::new(
            Regex::new("[a-z]+").unwrap(),
            Mutation::function(|s| vec![s.to_uppercase(), format!("{s}{s}")]),
        );
        let out: Vec<String> = Fuzzer::new(vec![upper]).each("ab 12").collect();
        assert_eq!(out, vec!["AB 12", "abab 12"]);
    }

    #[test]
    fn mutator_power_set_in_mask_order() {
        let mutator = Mutator::new(vec![rule("a", &["1", "2"])]);
        let out: Vec<String> = mutator.each("a-a").collect();
        assert_eq!(
            out,
            vec![
                // mask 0b01
                "1-a", "2-a",
                // mask 0b10
                "a-1", "a-2",
                // mask 0b11
                "1-1", "1-2", "2-1", "2-2",
            ]
        );
    }

    #[test]
    fn mutator_skips_overlapping_subsets() {
        let mutator = Mutator::new(vec![rule("ab", &["X"]), rule("b", &["Y"])]);
        let out: Vec<String> = mutator.each("ab").collect();
        assert_eq!(out, vec!["X", "aY"]);
    }

    #[test]
    fn mutator_orders_replacements_by_position() {
        let mutator = Mutator::new(vec![rule("c", &["3"]), rule("a", &["1"])]);
        let out: Vec<String> = mutator.each("abc").collect();
        assert_eq!(out, vec!["ab3", "1bc", "1b3"]);
    }

    #[test]
    fn mutator_combines_empty_match_with_match_at_same_offset() {
        let mutator = Mutator::new(vec![rule("a", &["b"]), rule("^", &["X"])]);
        let out: Vec<String> = mutator.each("ab").collect();
        assert_eq!(out, vec!["bb", "Xab", "Xbb"]);
    }

    #[test]
    fn mutator_without_matches_yields_nothing() {
        let mutator = Mutator::new(vec![rule("z", &["1"])]);
        assert_eq!(mutator.each("abc").count(), 0);
    }

    #[test]
    fn empty_value_lists_yield_nothing_for_that_subset() {
        let empty = Rule::new(Regex::new("b").unwrap(), Mutation::Values(vec![]));
        let mutator = Mutator::new(vec![rule("a", &["1"]), empty]);
        let out: Vec<String> = mutator.each("ab").collect();
        assert_eq!(out, vec!["1b"]);
    }
}
