//! Bundle selection rules.
//!
//! A [`MatchRule`] decides whether a catalog entry belongs to the install
//! set. Rules come in four shapes: glob-style name patterns, regular
//! expressions, nested rule lists (OR semantics), and caller-supplied
//! predicates over the full entry. Predicates return a boxed future so the
//! same rule surface serves both synchronous checks and rules that need to
//! consult async state; the matcher's control flow does not care which.
//!
//! Selection is a two-pass filter: an entry is installed iff it matches the
//! include rules (everything matches when none are given) and does not
//! match the exclude rules (nothing is excluded when none are given). See
//! [`is_selected`].

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::catalog::{BoxFuture, CatalogEntry};

/// Boxed future returned by predicate rules.
pub type PredicateFuture = Pin<Box<dyn Future<Output = bool> + Send>>;

/// Caller-supplied predicate over a catalog entry.
pub type PredicateFn = dyn Fn(&CatalogEntry) -> PredicateFuture + Send + Sync;

/// One bundle selection rule.
pub enum MatchRule {
    /// Glob-style pattern over the bundle name (`*`, `?`, `[...]`). A
    /// pattern without metacharacters matches the name literally; a
    /// pattern that fails to compile falls back to literal comparison.
    Name(String),
    /// Regular expression over the bundle name.
    Regex(regex::Regex),
    /// Matches when any nested rule matches. An empty list is treated as
    /// absent by the matcher.
    Any(Vec<MatchRule>),
    /// Caller-supplied predicate over the full entry.
    Predicate(Box<PredicateFn>),
}

impl MatchRule {
    /// Glob-style name pattern rule.
    pub fn name(pattern: impl Into<String>) -> Self {
        Self::Name(pattern.into())
    }

    /// Regular expression rule.
    pub fn regex(regex: regex::Regex) -> Self {
        Self::Regex(regex)
    }

    /// OR-list of nested rules.
    pub fn any(rules: Vec<MatchRule>) -> Self {
        Self::Any(rules)
    }

    /// Asynchronous predicate rule.
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&CatalogEntry) -> PredicateFuture + Send + Sync + 'static,
    {
        Self::Predicate(Box::new(predicate))
    }

    /// Synchronous predicate rule, wrapped into the async predicate shape.
    pub fn predicate_fn<F>(predicate: F) -> Self
    where
        F: Fn(&CatalogEntry) -> bool + Send + Sync + 'static,
    {
        Self::predicate(move |entry| {
            let matched = predicate(entry);
            Box::pin(std::future::ready(matched))
        })
    }

    /// An `Any` rule with no elements carries no selection information.
    fn is_empty_list(&self) -> bool {
        matches!(self, Self::Any(rules) if rules.is_empty())
    }

    /// Evaluate this rule against one entry.
    ///
    /// Boxed because `Any` rules recurse.
    fn eval<'a>(&'a self, entry: &'a CatalogEntry) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            match self {
                Self::Name(pattern) => match glob::Pattern::new(pattern) {
                    Ok(glob) => glob.matches(&entry.name),
                    Err(_) => pattern == &entry.name,
                },
                Self::Regex(regex) => regex.is_match(&entry.name),
                Self::Any(rules) => {
                    for rule in rules {
                        if rule.eval(entry).await {
                            return true;
                        }
                    }
                    false
                }
                Self::Predicate(predicate) => predicate(entry).await,
            }
        })
    }
}

impl fmt::Debug for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(pattern) => f.debug_tuple("Name").field(pattern).finish(),
            Self::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            Self::Any(rules) => f.debug_tuple("Any").field(rules).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Evaluate a rule set against one entry.
///
/// Empty `Any` rules are dropped first; if nothing remains the result is
/// `default_when_empty`. Otherwise rules are evaluated in caller order and
/// the first match wins.
pub async fn matches(
    entry: &CatalogEntry,
    rules: &[MatchRule],
    default_when_empty: bool,
) -> bool {
    let rules: Vec<&MatchRule> = rules.iter().filter(|rule| !rule.is_empty_list()).collect();
    if rules.is_empty() {
        return default_when_empty;
    }
    for rule in rules {
        if rule.eval(entry).await {
            return true;
        }
    }
    false
}

/// Two-pass install-set membership: included and not excluded.
///
/// No include rules means everything is eligible; no exclude rules means
/// nothing is excluded.
pub async fn is_selected(
    entry: &CatalogEntry,
    include: &[MatchRule],
    exclude: &[MatchRule],
) -> bool {
    matches(entry, include, true).await && !matches(entry, exclude, false).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(name: &str) -> CatalogEntry {
        CatalogEntry::new(name, "1.0.0")
    }

    #[tokio::test]
    async fn test_literal_name_matches_itself() {
        assert!(matches(&entry("app"), &[MatchRule::name("app")], false).await);
        assert!(!matches(&entry("app"), &[MatchRule::name("docs")], false).await);
    }

    #[tokio::test]
    async fn test_glob_pattern() {
        let rules = [MatchRule::name("app-*")];
        assert!(matches(&entry("app-core"), &rules, false).await);
        assert!(matches(&entry("app-"), &rules, false).await);
        assert!(!matches(&entry("docs"), &rules, false).await);
    }

    #[tokio::test]
    async fn test_invalid_glob_falls_back_to_literal() {
        // "[app" is not a valid glob pattern
        let rules = [MatchRule::name("[app")];
        assert!(matches(&entry("[app"), &rules, false).await);
        assert!(!matches(&entry("app"), &rules, false).await);
    }

    #[tokio::test]
    async fn test_regex_rule() {
        let rules = [MatchRule::regex(regex::Regex::new(r"^app-\d+$").unwrap())];
        assert!(matches(&entry("app-12"), &rules, false).await);
        assert!(!matches(&entry("app-beta"), &rules, false).await);
    }

    #[tokio::test]
    async fn test_list_rule_is_or() {
        let rules = [MatchRule::any(vec![
            MatchRule::name("docs"),
            MatchRule::name("app"),
        ])];
        assert!(matches(&entry("app"), &rules, false).await);
        assert!(matches(&entry("docs"), &rules, false).await);
        assert!(!matches(&entry("assets"), &rules, false).await);
    }

    #[tokio::test]
    async fn test_predicate_rules() {
        let sync_rule = MatchRule::predicate_fn(|e| e.version.starts_with("1."));
        assert!(matches(&entry("app"), &[sync_rule], false).await);

        let async_rule = MatchRule::predicate(|e| {
            let name = e.name.clone();
            Box::pin(async move {
                tokio::task::yield_now().await;
                name == "app"
            })
        });
        assert!(matches(&entry("app"), &[async_rule], false).await);
    }

    #[tokio::test]
    async fn test_empty_rules_return_default() {
        assert!(matches(&entry("app"), &[], true).await);
        assert!(!matches(&entry("app"), &[], false).await);
    }

    #[tokio::test]
    async fn test_empty_list_rule_is_treated_as_absent() {
        // A lone empty Any rule leaves no rules, so the default applies.
        let rules = [MatchRule::any(vec![])];
        assert!(matches(&entry("app"), &rules, true).await);
        assert!(!matches(&entry("app"), &rules, false).await);
    }

    #[tokio::test]
    async fn test_selection_defaults_install_everything() {
        assert!(is_selected(&entry("app"), &[], &[]).await);
    }

    #[tokio::test]
    async fn test_selection_exclude_wins_over_include() {
        let include = [MatchRule::name("app*")];
        let exclude = [MatchRule::name("app-beta")];
        assert!(is_selected(&entry("app-core"), &include, &exclude).await);
        assert!(!is_selected(&entry("app-beta"), &include, &exclude).await);
        assert!(!is_selected(&entry("docs"), &include, &exclude).await);
    }

    proptest! {
        #[test]
        fn prop_literal_pattern_always_matches_own_name(
            name in "[a-z0-9_.-]{1,24}",
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let matched = rt.block_on(matches(
                &entry(&name),
                &[MatchRule::name(name.clone())],
                false,
            ));
            prop_assert!(matched);
        }

        #[test]
        fn prop_empty_rule_sets_select_everything(
            name in "[a-z0-9_.-]{1,24}",
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            prop_assert!(rt.block_on(is_selected(&entry(&name), &[], &[])));
        }
    }
}
