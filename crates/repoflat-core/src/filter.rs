//! Entry filtering: hidden paths, size limit and ordered regex rules.
//!
//! The filter never opens an entry; it decides from the archive path and
//! the declared uncompressed size alone. Logging the decision is left to
//! the caller.

use regex::Regex;

use crate::Result;

/// Whether a matching rule admits or rejects an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Matching entries are accepted.
    Include,
    /// Matching entries are rejected.
    Exclude,
}

/// One inclusion or exclusion pattern.
#[derive(Debug, Clone)]
pub struct FilterRule {
    pattern: Regex,
    kind: RuleKind,
}

impl FilterRule {
    /// Compiles an inclusion rule.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the regex does not compile.
    pub fn include(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            kind: RuleKind::Include,
        })
    }

    /// Compiles an exclusion rule.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the regex does not compile.
    pub fn exclude(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            kind: RuleKind::Exclude,
        })
    }

    /// Returns the rule kind.
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Returns the source pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Outcome of evaluating one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// Entry should be extracted.
    Accept,
    /// A path segment starts with `.`.
    Hidden,
    /// Declared size is above the limit.
    Oversized {
        /// Declared uncompressed size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },
    /// An exclusion rule matched first.
    Excluded,
    /// Inclusion rules exist and none matched.
    NotIncluded,
}

impl FilterDecision {
    /// Returns `true` for [`FilterDecision::Accept`].
    #[must_use]
    pub const fn is_accept(self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Ordered set of filter rules.
///
/// Rules are evaluated in insertion order and the first match decides.
/// With no rules every visible, small-enough entry is accepted.
///
/// # Examples
///
/// ```
/// use repoflat_core::filter::{EntryFilter, FilterRule};
///
/// # fn main() -> Result<(), repoflat_core::FlattenError> {
/// let filter = EntryFilter::new()
///     .with_rule(FilterRule::exclude("/test/")?)
///     .with_rule(FilterRule::include(r"\.java$")?);
///
/// assert!(filter.accept("proj/src/Main.java", 100, 1024));
/// assert!(!filter.accept("proj/src/test/MainTest.java", 100, 1024));
/// assert!(!filter.accept("proj/README.md", 100, 1024));
/// assert!(!filter.accept("proj/.github/Build.java", 100, 1024));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    rules: Vec<FilterRule>,
}

impl EntryFilter {
    /// Creates a filter with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: FilterRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends a rule in place.
    pub fn push(&mut self, rule: FilterRule) {
        self.rules.push(rule);
    }

    /// Returns the configured rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Returns `true` if the entry should be extracted.
    #[must_use]
    pub fn accept(&self, entry_path: &str, entry_size: u64, size_limit: u64) -> bool {
        self.evaluate(entry_path, entry_size, size_limit).is_accept()
    }

    /// Evaluates an entry and reports why it was accepted or rejected.
    #[must_use]
    pub fn evaluate(&self, entry_path: &str, entry_size: u64, size_limit: u64) -> FilterDecision {
        if is_hidden(entry_path) {
            return FilterDecision::Hidden;
        }

        if entry_size > size_limit {
            return FilterDecision::Oversized {
                size: entry_size,
                limit: size_limit,
            };
        }

        if let Some(rule) = self.rules.iter().find(|r| r.pattern.is_match(entry_path)) {
            return match rule.kind {
                RuleKind::Include => FilterDecision::Accept,
                RuleKind::Exclude => FilterDecision::Excluded,
            };
        }

        if self.rules.iter().any(|r| r.kind == RuleKind::Include) {
            FilterDecision::NotIncluded
        } else {
            FilterDecision::Accept
        }
    }
}

/// Checks whether any `/`-separated segment of the path starts with `.`.
///
/// This covers `.git/`, `.github/`, dotfiles and `..` components alike.
///
/// # Examples
///
/// ```
/// use repoflat_core::filter::is_hidden;
///
/// assert!(is_hidden("proj/.git/config"));
/// assert!(is_hidden("proj/src/.env"));
/// assert!(!is_hidden("proj/src/main.rs"));
/// ```
#[must_use]
pub fn is_hidden(entry_path: &str) -> bool {
    entry_path.split('/').any(|segment| segment.starts_with('.'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rules_accepts_everything_visible() {
        let filter = EntryFilter::new();
        assert!(filter.accept("proj/anything.bin", 10, 10));
        assert!(filter.accept("proj/a/b/c/d.txt", 0, 0));
    }

    #[test]
    fn test_hidden_rejected_first() {
        let filter = EntryFilter::new().with_rule(FilterRule::include(".*").unwrap());
        assert_eq!(
            filter.evaluate("proj/.git/config", 20, 1000),
            FilterDecision::Hidden
        );
        assert_eq!(filter.evaluate(".hidden/x", 1, 1000), FilterDecision::Hidden);
        assert_eq!(filter.evaluate("proj/../x", 1, 1000), FilterDecision::Hidden);
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let filter = EntryFilter::new();
        assert!(filter.accept("proj/a.txt", 1000, 1000));
        assert_eq!(
            filter.evaluate("proj/a.txt", 1001, 1000),
            FilterDecision::Oversized {
                size: 1001,
                limit: 1000
            }
        );
    }

    #[test]
    fn test_include_pattern() {
        let filter = EntryFilter::new().with_rule(FilterRule::include(r"\.txt$").unwrap());
        assert!(filter.accept("proj-abc123/src/Main.txt", 40, 1000));
        assert_eq!(
            filter.evaluate("proj-abc123/src/Main.rs", 40, 1000),
            FilterDecision::NotIncluded
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let filter = EntryFilter::new()
            .with_rule(FilterRule::exclude("/test/").unwrap())
            .with_rule(FilterRule::include(r"\.java$").unwrap());
        assert_eq!(
            filter.evaluate("p/src/test/A.java", 1, 10),
            FilterDecision::Excluded
        );
        assert!(filter.accept("p/src/main/A.java", 1, 10));

        let reversed = EntryFilter::new()
            .with_rule(FilterRule::include(r"\.java$").unwrap())
            .with_rule(FilterRule::exclude("/test/").unwrap());
        assert!(reversed.accept("p/src/test/A.java", 1, 10));
    }

    #[test]
    fn test_exclude_only_accepts_unmatched() {
        let filter = EntryFilter::new().with_rule(FilterRule::exclude(r"\.min\.js$").unwrap());
        assert!(filter.accept("p/app.js", 1, 10));
        assert!(!filter.accept("p/app.min.js", 1, 10));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(FilterRule::include("[unclosed").is_err());
        assert!(FilterRule::exclude("(").is_err());
    }

    #[test]
    fn test_rule_accessors() {
        let rule = FilterRule::exclude("/vendor/").unwrap();
        assert_eq!(rule.kind(), RuleKind::Exclude);
        assert_eq!(rule.as_str(), "/vendor/");

        let mut filter = EntryFilter::new();
        filter.push(rule);
        assert_eq!(filter.rules().len(), 1);
    }
}
