//! Rule strings and level resolution.
//!
//! A rule string is a comma-separated list of `pattern=LEVEL` clauses, for example
//! `*=WRN,db=DBG,db:pool=OFF`. Each pattern is either `*`, which matches every logger, or a
//! prefix of the logger names it applies to. Levels are one of `DBG`, `INF`, `WRN`, `ERR` or `OFF`,
//! in any case.
//!
//! You can use [`Rules`] directly if you want to resolve levels the same way `logfacet` does:
//!
//! ```
//! use logfacet::{Level, filter::Rules};
//!
//! let rules = Rules::parse("*=ERR,http=INF,http:client=DBG").unwrap();
//! assert_eq!(rules.resolve("http:server"), Level::Info);
//! assert_eq!(rules.resolve("http:client"), Level::Debug);
//! assert_eq!(rules.resolve("db"), Level::Error);
//! ```

mod parser;
mod rule;
mod rules;

pub use parser::ParseError;
use parser::parse_clauses;
pub use rule::{Pattern, Rule};
pub use rules::Rules;

/// Parse a rule string into an ordered set of [Rules].
///
/// This is equivalent to [Rules::parse].
pub fn parse_spec(spec: &str) -> Result<Rules, ParseError> {
    Rules::parse(spec)
}
