use core::fmt;

use crate::Level;

/// A single `pattern=LEVEL` clause of a rule string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub pattern: Pattern,
    pub level: Level,
}

impl Rule {
    pub fn new(pattern: Pattern, level: Level) -> Self {
        Self { pattern, level }
    }

    /// A rule which applies `level` to every logger
    pub fn any(level: Level) -> Self {
        Self::new(Pattern::Any, level)
    }

    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.matches(name)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", &self.pattern, &self.level)
    }
}

/// The logger names a [Rule] applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// `*`, matches every logger
    Any,
    /// Matches any logger whose name starts with the given prefix, including the prefix itself
    Prefix(String),
}

impl Pattern {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Prefix(prefix) => name.starts_with(prefix.as_str()),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Prefix(prefix) => f.write_str(prefix),
        }
    }
}
