use core::fmt;

use crate::{
    Level,
    filter::{ParseError, Pattern, Rule, parse_clauses},
};

/// An ordered set of [Rule]s, used to decide the level of every logger by name.
///
/// Rules are kept in the order they were declared. When a rule is inserted whose pattern is
/// identical to an existing one, the old rule is removed and the new one takes the last position,
/// so the most recently declared rule for a pattern always wins.
///
/// ## Example
///
/// ```
/// use logfacet::{Level, filter::Rules};
///
/// let rules = Rules::parse("*=WRN,svcA=ERR").unwrap();
/// assert_eq!(rules.resolve("svcA"), Level::Error);
/// assert_eq!(rules.resolve("svcA-sub"), Level::Error);
/// assert_eq!(rules.resolve("svcB"), Level::Warn);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// A rule set consisting of the single rule `*=<level>`
    pub fn with_default(level: Level) -> Self {
        Self {
            rules: vec![Rule::any(level)],
        }
    }

    /// Parse a rule string, see the crate documentation for the syntax.
    pub fn parse(spec: &str) -> Result<Self, ParseError> {
        let mut rules = Self::new();
        for rule in parse_clauses(spec)? {
            rules.insert(rule);
        }
        Ok(rules)
    }

    /// Parse a rule string, falling back to `*=<default>` if it contains no rules at all.
    pub fn parse_or_default(spec: Option<&str>, default: Level) -> Result<Self, ParseError> {
        let rules = match spec {
            Some(spec) => Self::parse(spec)?,
            None => Self::new(),
        };
        if rules.is_empty() {
            Ok(Self::with_default(default))
        } else {
            Ok(rules)
        }
    }

    /// Insert `rule`, replacing any rule with the identical pattern
    pub fn insert(&mut self, rule: Rule) -> &mut Self {
        self.rules.retain(|r| r.pattern != rule.pattern);
        self.rules.push(rule);
        self
    }

    /// Resolve the level for the logger called `name`.
    ///
    /// The last rule which matches `name` wins. If no rule matches, the result is
    /// [Level::Error], so that an incomplete rule set never turns on verbose output.
    pub fn resolve(&self, name: &str) -> Level {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(name))
            .map(|rule| rule.level)
            .unwrap_or(Level::Error)
    }

    /// The most verbose level any logger can resolve to.
    ///
    /// Unless some rule matches every name, names matched by no rule resolve to [Level::Error],
    /// so that level is always included.
    pub fn max_level(&self) -> Level {
        let unmatched = if self.rules.iter().any(|rule| rule.pattern == Pattern::Any) {
            Level::Off
        } else {
            Level::Error
        };
        self.rules.iter().map(|rule| rule.level).fold(unmatched, Level::min)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a Rules {
    type Item = &'a Rule;
    type IntoIter = core::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Rule> for Rules {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        let mut rules = Self::new();
        for rule in iter {
            rules.insert(rule);
        }
        rules
    }
}

impl fmt::Display for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::Rules;
    use crate::{
        Level,
        filter::{Pattern, Rule},
    };

    #[test]
    fn resolve_without_rules_fails_closed() {
        let rules = Rules::new();
        assert_eq!(rules.resolve(""), Level::Error);
        assert_eq!(rules.resolve("anything"), Level::Error);
    }

    #[test]
    fn resolve_prefix_overrides() {
        let rules = Rules::parse("*=WRN,svcA=ERR").unwrap();
        assert_eq!(rules.resolve("svcA"), Level::Error);
        assert_eq!(rules.resolve("svcB"), Level::Warn);
        assert_eq!(rules.resolve("svcA-sub"), Level::Error);
    }

    #[test]
    fn resolve_last_match_wins() {
        // A wildcard declared last overrides the more specific rule before it
        let rules = Rules::parse("svcA=ERR,*=DBG").unwrap();
        assert_eq!(rules.resolve("svcA"), Level::Debug);

        let rules = Rules::parse("svc=INF,svcA=ERR").unwrap();
        assert_eq!(rules.resolve("svcA"), Level::Error);
        assert_eq!(rules.resolve("svcB"), Level::Info);

        let rules = Rules::parse("svcA=ERR,svc=INF").unwrap();
        assert_eq!(rules.resolve("svcA"), Level::Info);
    }

    #[test]
    fn resolve_unmatched_name_is_error() {
        let rules = Rules::parse("db=DBG").unwrap();
        assert_eq!(rules.resolve("db"), Level::Debug);
        assert_eq!(rules.resolve("cache"), Level::Error);
    }

    #[test]
    fn insert_replaces_identical_pattern_and_moves_it_last() {
        let rules = Rules::parse("svc=ERR,svcA=INF,svc=DBG").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules.iter().cloned().collect::<Vec<_>>(),
            vec![
                Rule::new(Pattern::prefix("svcA"), Level::Info),
                Rule::new(Pattern::prefix("svc"), Level::Debug),
            ]
        );
        assert_eq!(rules.resolve("svcA"), Level::Debug);
        assert_eq!(rules.to_string(), "svcA=INF,svc=DBG");
    }

    #[test]
    fn parse_or_default_uses_default_for_empty_specs() {
        let rules = Rules::parse_or_default(None, Level::Warn).unwrap();
        assert_eq!(rules, Rules::with_default(Level::Warn));

        let rules = Rules::parse_or_default(Some(" , "), Level::Error).unwrap();
        assert_eq!(rules, Rules::with_default(Level::Error));

        let rules = Rules::parse_or_default(Some("*=DBG"), Level::Error).unwrap();
        assert_eq!(rules.resolve("x"), Level::Debug);

        assert!(Rules::parse_or_default(Some("foo=BOGUS"), Level::Error).is_err());
    }

    #[test]
    fn max_level() {
        assert_eq!(Rules::new().max_level(), Level::Error);
        assert_eq!(Rules::parse("*=WRN,db=DBG").unwrap().max_level(), Level::Debug);
        assert_eq!(Rules::parse("*=OFF").unwrap().max_level(), Level::Off);
        assert_eq!(Rules::parse("*=OFF,db=INF").unwrap().max_level(), Level::Info);
    }

    #[test]
    fn max_level_includes_unmatched_names() {
        let rules = Rules::parse("db=OFF").unwrap();
        assert_eq!(rules.resolve("app"), Level::Error);
        assert_eq!(rules.max_level(), Level::Error);
        assert_eq!(Rules::parse("db=OFF,web=OFF").unwrap().max_level(), Level::Error);
        assert_eq!(Rules::parse("db=DBG").unwrap().max_level(), Level::Debug);
    }

    const PATTERNS: [&str; 6] = ["*", "svc", "svcA", "svcA-sub", "db", "db:pool"];

    fn clause() -> impl Strategy<Value = (usize, Level)> {
        (
            0..PATTERNS.len(),
            prop_oneof![
                Just(Level::Debug),
                Just(Level::Info),
                Just(Level::Warn),
                Just(Level::Error),
                Just(Level::Off),
            ],
        )
    }

    proptest! {
        #[test]
        fn resolve_returns_last_matching_clause(clauses in prop::collection::vec(clause(), 1..12)) {
            let spec = clauses
                .iter()
                .map(|(pattern, level)| format!("{}={}", PATTERNS[*pattern], level))
                .collect::<Vec<_>>()
                .join(",");
            let rules = Rules::parse(&spec).unwrap();

            for (pattern, _) in clauses.iter() {
                let name = PATTERNS[*pattern];
                let expected = clauses
                    .iter()
                    .rev()
                    .find(|(p, _)| PATTERNS[*p] == "*" || name.starts_with(PATTERNS[*p]))
                    .map(|(_, level)| *level)
                    .unwrap_or(Level::Error);
                prop_assert_eq!(rules.resolve(name), expected, "spec: {}, name: {}", &spec, name);
            }
        }
    }
}
