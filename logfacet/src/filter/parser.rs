use std::{
    error::Error,
    fmt::{Display, Formatter},
};

use super::{Pattern, Rule};
use crate::Level;

/// Error during logging configuration parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseError {
    details: String,
}

impl ParseError {
    pub(crate) fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "error parsing logging spec: {}", self.details)
    }
}

impl Error for ParseError {}

/// Parse a rule string (e.g. `*=WRN,db=DBG,-db:pool`) into its rules, in the order they were
/// written.
///
/// Parsing is all-or-nothing: the first malformed clause aborts with an error naming it.
pub(crate) fn parse_clauses(spec: &str) -> Result<Vec<Rule>, ParseError> {
    let mut rules = Vec::new();

    for clause in spec.split(',').map(|s| s.trim()) {
        if clause.is_empty() {
            continue;
        }

        let rule = match clause.split_once('=') {
            Some((pattern, level)) => {
                if level.contains('=') {
                    return Err(ParseError::new(format!(
                        "invalid logging spec '{clause}': '=' is not allowed in patterns"
                    )));
                }
                let pattern = pattern.trim();
                if pattern.starts_with('-') {
                    return Err(ParseError::new(format!(
                        "invalid logging spec '{clause}': a negated pattern cannot be given a level"
                    )));
                }
                let pattern = parse_pattern(clause, pattern)?;
                let level = level
                    .trim()
                    .parse::<Level>()
                    .map_err(|err| ParseError::new(format!("invalid logging spec '{clause}': {err}")))?;
                Rule::new(pattern, level)
            }
            // A bare pattern enables everything for it, a negated one disables it
            None => match clause.strip_prefix('-') {
                Some(pattern) => Rule::new(parse_pattern(clause, pattern.trim())?, Level::Off),
                None => Rule::new(parse_pattern(clause, clause)?, Level::Debug),
            },
        };

        rules.push(rule);
    }

    Ok(rules)
}

fn parse_pattern(clause: &str, pattern: &str) -> Result<Pattern, ParseError> {
    if pattern.is_empty() {
        return Err(ParseError::new(format!("invalid logging spec '{clause}': empty pattern")));
    }
    if pattern == "*" {
        return Ok(Pattern::Any);
    }

    let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
    if prefix.contains('*') {
        return Err(ParseError::new(format!(
            "invalid logging spec '{clause}': '*' is only allowed at the end of a pattern"
        )));
    }
    Ok(Pattern::Prefix(prefix.to_owned()))
}

#[cfg(test)]
mod tests {
    use snapbox::{Data, IntoData, assert_data_eq, str};

    use super::{ParseError, parse_clauses};
    use crate::{
        Level,
        filter::{Pattern, Rule},
    };

    impl IntoData for ParseError {
        fn into_data(self) -> Data {
            self.to_string().into_data()
        }
    }

    #[test]
    fn parse_clauses_valid() {
        let rules = parse_clauses("*=WRN,svcA=ERR,db=dbg,cache=InF,noisy=off").unwrap();

        assert_eq!(
            rules,
            vec![
                Rule::any(Level::Warn),
                Rule::new(Pattern::prefix("svcA"), Level::Error),
                Rule::new(Pattern::prefix("db"), Level::Debug),
                Rule::new(Pattern::prefix("cache"), Level::Info),
                Rule::new(Pattern::prefix("noisy"), Level::Off),
            ]
        );
    }

    #[test]
    fn parse_clauses_keeps_declaration_order() {
        let rules = parse_clauses("svc=ERR,*=DBG,svc=INF").unwrap();

        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0], Rule::new(Pattern::prefix("svc"), Level::Error));
        assert_eq!(rules[1], Rule::any(Level::Debug));
        assert_eq!(rules[2], Rule::new(Pattern::prefix("svc"), Level::Info));
    }

    #[test]
    fn parse_clauses_long_level_names() {
        let rules = parse_clauses("a=debug,b=WARN,c=Error").unwrap();
        let levels = rules.iter().map(|rule| rule.level).collect::<Vec<_>>();
        assert_eq!(levels, [Level::Debug, Level::Warn, Level::Error]);
    }

    #[test]
    fn parse_clauses_trims_whitespace() {
        let rules = parse_clauses("  * = wrn ,  svcA=ERR  ").unwrap();
        assert_eq!(
            rules,
            vec![Rule::any(Level::Warn), Rule::new(Pattern::prefix("svcA"), Level::Error)]
        );
    }

    #[test]
    fn parse_clauses_bare_pattern_enables_debug() {
        let rules = parse_clauses("models").unwrap();
        assert_eq!(rules, vec![Rule::new(Pattern::prefix("models"), Level::Debug)]);

        let rules = parse_clauses("*").unwrap();
        assert_eq!(rules, vec![Rule::any(Level::Debug)]);
    }

    #[test]
    fn parse_clauses_negated_pattern_is_off() {
        let rules = parse_clauses("*,-models").unwrap();
        assert_eq!(
            rules,
            vec![Rule::any(Level::Debug), Rule::new(Pattern::prefix("models"), Level::Off)]
        );
    }

    #[test]
    fn parse_clauses_trailing_wildcard_is_a_prefix() {
        let rules = parse_clauses("svc*=INF").unwrap();
        assert_eq!(rules, vec![Rule::new(Pattern::prefix("svc"), Level::Info)]);
    }

    #[test]
    fn parse_clauses_empty_isolated() {
        assert!(parse_clauses("").unwrap().is_empty());
        assert!(parse_clauses("     ").unwrap().is_empty());
        assert!(parse_clauses(",").unwrap().is_empty());
        assert!(parse_clauses(",     ").unwrap().is_empty());
    }

    #[test]
    fn parse_clauses_skips_blank_clauses() {
        let rules = parse_clauses("a=DBG,,b=ERR,").unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn parse_clauses_invalid_level() {
        let error = parse_clauses("foo=BOGUS").unwrap_err();
        assert_data_eq!(
            error,
            str![
                "error parsing logging spec: invalid logging spec 'foo=BOGUS': attempted to \
                 convert a string that doesn't match an existing log level"
            ]
        );
    }

    #[test]
    fn parse_clauses_empty_level() {
        let error = parse_clauses("*=WRN,foo=").unwrap_err();
        assert_data_eq!(
            error,
            str![
                "error parsing logging spec: invalid logging spec 'foo=': attempted to convert a \
                 string that doesn't match an existing log level"
            ]
        );
    }

    #[test]
    fn parse_clauses_empty_pattern() {
        let error = parse_clauses("=ERR").unwrap_err();
        assert_data_eq!(
            error,
            str!["error parsing logging spec: invalid logging spec '=ERR': empty pattern"]
        );

        let error = parse_clauses("a=DBG,-").unwrap_err();
        assert_data_eq!(error, str!["error parsing logging spec: invalid logging spec '-': empty pattern"]);
    }

    #[test]
    fn parse_clauses_too_many_equals() {
        let error = parse_clauses("crate1=warn=info,crate2=debug").unwrap_err();
        assert_data_eq!(
            error,
            str![
                "error parsing logging spec: invalid logging spec 'crate1=warn=info': '=' is not \
                 allowed in patterns"
            ]
        );
    }

    #[test]
    fn parse_clauses_negated_with_level() {
        let error = parse_clauses("-db=ERR").unwrap_err();
        assert_data_eq!(
            error,
            str![
                "error parsing logging spec: invalid logging spec '-db=ERR': a negated pattern \
                 cannot be given a level"
            ]
        );
    }

    #[test]
    fn parse_clauses_inner_wildcard() {
        let error = parse_clauses("s*c=ERR").unwrap_err();
        assert_data_eq!(
            error,
            str![
                "error parsing logging spec: invalid logging spec 's*c=ERR': '*' is only allowed \
                 at the end of a pattern"
            ]
        );
    }

    #[test]
    fn parse_clauses_reports_first_error_only() {
        let error = parse_clauses("a=DBG,b=nope,c=DBG=ERR").unwrap_err();
        assert_data_eq!(
            error,
            str![
                "error parsing logging spec: invalid logging spec 'b=nope': attempted to convert \
                 a string that doesn't match an existing log level"
            ]
        );
    }
}
