//! Reference selection
//!
//! An ordered list of include/exclude rules decides which references seed
//! the scan. The last matching rule wins; a reference no rule matches is
//! excluded.

use regex::Regex;

use crate::error::FilterError;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Polarity {
    Include,
    Exclude,
}

impl Polarity {
    pub fn inverted(self) -> Self {
        match self {
            Polarity::Include => Polarity::Exclude,
            Polarity::Exclude => Polarity::Include,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches the prefix itself and anything below it on a `/` boundary
    Prefix(String),
    /// Must match the entire reference name
    Regex(Regex),
}

impl Pattern {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Pattern::Prefix(prefix.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, FilterError> {
        Regex::new(&format!("^(?:{pattern})$"))
            .map(Pattern::Regex)
            .map_err(|source| FilterError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn matches(&self, refname: &str) -> bool {
        match self {
            Pattern::Prefix(prefix) => {
                if prefix.ends_with('/') {
                    return refname.starts_with(prefix.as_str());
                }
                match refname.strip_prefix(prefix.as_str()) {
                    Some(rest) => rest.is_empty() || rest.starts_with('/'),
                    None => false,
                }
            }
            Pattern::Regex(re) => re.is_match(refname),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub polarity: Polarity,
    pub pattern: Pattern,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceFilter {
    rules: Vec<Rule>,
}

impl ReferenceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter that selects every reference
    pub fn all() -> Self {
        let mut filter = Self::new();
        filter.include(Pattern::prefix("refs/"));
        filter
    }

    pub fn include(&mut self, pattern: Pattern) -> &mut Self {
        self.push(Polarity::Include, pattern)
    }

    pub fn exclude(&mut self, pattern: Pattern) -> &mut Self {
        self.push(Polarity::Exclude, pattern)
    }

    pub fn push(&mut self, polarity: Polarity, pattern: Pattern) -> &mut Self {
        self.rules.push(Rule { polarity, pattern });
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn matches(&self, refname: &str) -> bool {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.pattern.matches(refname))
            .is_some_and(|rule| rule.polarity == Polarity::Include)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_boundary() {
        let p = Pattern::prefix("refs/foo");
        assert!(p.matches("refs/foo"));
        assert!(p.matches("refs/foo/bar"));
        assert!(!p.matches("refs/foobar"));
        assert!(!p.matches("refs/fo"));
    }

    #[test]
    fn test_prefix_with_trailing_slash() {
        let p = Pattern::prefix("refs/foo/");
        assert!(p.matches("refs/foo/bar"));
        assert!(!p.matches("refs/foo"));
    }

    #[test]
    fn test_regex_must_match_full_name() {
        let p = Pattern::regex("refs/tags/release-.*").unwrap();
        assert!(p.matches("refs/tags/release-1.0"));
        assert!(!p.matches("xrefs/tags/release-1.0"));

        let partial = Pattern::regex("release").unwrap();
        assert!(!partial.matches("refs/tags/release"));
    }

    #[test]
    fn test_regex_alternation_is_anchored() {
        let p = Pattern::regex("refs/heads/a|refs/heads/b").unwrap();
        assert!(p.matches("refs/heads/b"));
        assert!(!p.matches("refs/heads/bc"));
    }

    #[test]
    fn test_invalid_regex() {
        let err = Pattern::regex("refs/(").unwrap_err();
        assert!(matches!(err, FilterError::InvalidRegex { ref pattern, .. } if pattern == "refs/("));
    }

    #[test]
    fn test_last_rule_wins() {
        let mut f = ReferenceFilter::new();
        f.include(Pattern::prefix("refs/heads"))
            .exclude(Pattern::prefix("refs/heads/archive"));

        assert!(f.matches("refs/heads/main"));
        assert!(!f.matches("refs/heads/archive/old"));
        assert!(!f.matches("refs/headsbranch"));
        assert!(!f.matches("refs/tags/v1"));
    }

    #[test]
    fn test_reinclude_after_exclude() {
        let mut f = ReferenceFilter::new();
        f.include(Pattern::prefix("refs/heads"))
            .exclude(Pattern::prefix("refs/heads/archive"))
            .include(Pattern::regex("refs/heads/archive/keep-.*").unwrap());

        assert!(f.matches("refs/heads/archive/keep-me"));
        assert!(!f.matches("refs/heads/archive/drop-me"));
    }

    #[test]
    fn test_empty_filter_excludes() {
        assert!(!ReferenceFilter::new().matches("refs/heads/main"));
        assert!(ReferenceFilter::all().matches("refs/heads/main"));
    }
}
