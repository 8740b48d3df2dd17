use std::{collections::BTreeMap, sync::Arc};

use crate::{
    Error, Level, SourcePaths,
    env::Defaults,
    filter::{Rule, Rules},
    fmt::{ColorScheme, FormatId, FormatOptions, FormatRegistry, FormatSpec},
    writer::WriteStyle,
};

/// The raw configuration a [Config] is resolved from.
///
/// Usually populated from the environment by [crate::Builder], but may be constructed directly.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    /// A rule string, e.g. `*=WRN,db=DBG`
    pub filters: Option<String>,
    /// Rules added programmatically, applied after those in `filters`
    pub rules: Vec<Rule>,
    /// A format selection, e.g. `happy,t=%H:%M:%S,maxcol=120`
    pub format: Option<String>,
    /// A color scheme, e.g. `key=cyan+h,ERR=red+h`
    pub colors: Option<String>,
    /// Formats for specific loggers, by exact name
    pub overrides: BTreeMap<String, FormatId>,
    pub write_style: WriteStyle,
}

/// The resolved, immutable configuration shared by every logger of a [crate::Logging] instance.
#[derive(Debug, Clone)]
pub struct Config {
    rules: Rules,
    format: FormatId,
    overrides: BTreeMap<String, FormatId>,
    options: FormatOptions,
    paths: Arc<SourcePaths>,
}

impl Config {
    /// The configuration used when nothing was configured at all
    pub fn fallback(defaults: &Defaults) -> Self {
        Self {
            rules: defaults.rules(),
            format: defaults.format.clone(),
            overrides: BTreeMap::new(),
            options: FormatOptions {
                time_format: defaults.time_format.to_string(),
                max_col: defaults.max_col,
                colors: defaults.colors,
                scheme: defaults.color_scheme(),
            },
            paths: Arc::default(),
        }
    }

    /// Resolve `sources` on top of `defaults`.
    ///
    /// Each source is validated on its own: one that is malformed, or names a format missing from
    /// `formats`, is replaced by its default and the error is returned alongside the
    /// configuration. Nothing from a malformed source is ever partially applied.
    pub fn resolve(
        defaults: &Defaults,
        sources: &Sources,
        formats: &FormatRegistry,
    ) -> (Self, Vec<Error>) {
        let mut config = Self::fallback(defaults);
        let mut errors = Vec::new();

        match Rules::parse_or_default(sources.filters.as_deref(), defaults.level) {
            Ok(rules) => config.rules = rules,
            Err(err) => errors.push(err.into()),
        }
        for rule in &sources.rules {
            config.rules.insert(rule.clone());
        }

        if let Some(spec) = sources.format.as_deref() {
            match FormatSpec::parse(spec) {
                Ok(spec) => {
                    let format = spec.format.unwrap_or_else(|| defaults.format.clone());
                    if formats.contains(&format) {
                        config.format = format;
                        if let Some(time_format) = spec.time_format {
                            config.options.time_format = time_format;
                        }
                        if let Some(max_col) = spec.max_col {
                            config.options.max_col = max_col;
                        }
                    } else {
                        errors.push(Error::UnknownFormat {
                            format: format.to_string(),
                        });
                    }
                }
                Err(err) => errors.push(err.into()),
            }
        }

        for (name, format) in &sources.overrides {
            if formats.contains(format) {
                config.overrides.insert(name.clone(), format.clone());
            } else {
                errors.push(Error::UnknownFormat {
                    format: format.to_string(),
                });
            }
        }

        if let Some(colors) = sources.colors.as_deref() {
            match ColorScheme::parse(colors) {
                Ok(scheme) => config.options.scheme = scheme,
                Err(err) => errors.push(err.into()),
            }
        }
        config.options.colors = sources.write_style.enabled(defaults.colors);

        (config, errors)
    }

    pub(crate) fn with_paths(mut self, paths: SourcePaths) -> Self {
        self.paths = Arc::new(paths);
        self
    }

    #[inline]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// The level of the logger called `name`
    #[inline]
    pub fn level_for(&self, name: &str) -> Level {
        self.rules.resolve(name)
    }

    /// The format used by loggers without an override
    #[inline]
    pub fn format(&self) -> &FormatId {
        &self.format
    }

    /// The format of the logger called `name`.
    ///
    /// Rules only ever decide levels; the format is the default one unless the logger was given
    /// its own.
    pub fn format_for(&self, name: &str) -> &FormatId {
        self.overrides.get(name).unwrap_or(&self.format)
    }

    #[inline]
    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    #[inline]
    pub fn paths(&self) -> &Arc<SourcePaths> {
        &self.paths
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use snapbox::{assert_data_eq, str};

    use super::{Config, Sources};
    use crate::{
        Error, Level,
        env::{Defaults, Terminal},
        filter::{Pattern, Rule},
        fmt::{FormatId, FormatRegistry},
        writer::WriteStyle,
    };

    fn resolve(terminal: Terminal, sources: Sources) -> (Config, Vec<Error>) {
        Config::resolve(&Defaults::for_terminal(&terminal), &sources, &FormatRegistry::new())
    }

    fn filters(filters: &str) -> Sources {
        Sources {
            filters: Some(filters.to_string()),
            ..Sources::default()
        }
    }

    #[test]
    fn nothing_configured() {
        let (config, errors) = resolve(Terminal::piped(), Sources::default());
        assert!(errors.is_empty());
        assert_eq!(config.rules().to_string(), "*=ERR");
        assert_eq!(config.format(), &FormatId::JSON);
        assert!(!config.options().colors);

        let (config, _) = resolve(Terminal::interactive(None), Sources::default());
        assert_eq!(config.rules().to_string(), "*=WRN");
        assert_eq!(config.format(), &FormatId::HAPPY);
        assert_eq!(config.options().time_format, "%H:%M:%S%.6f");
        assert!(config.options().colors);
    }

    #[test]
    fn debug_everything_when_piped() {
        let (config, errors) = resolve(Terminal::piped(), filters("*=DBG"));
        assert!(errors.is_empty());
        assert_eq!(config.level_for("anything"), Level::Debug);
        assert_eq!(config.format_for("anything"), &FormatId::JSON);
    }

    #[test]
    fn resolve_levels() {
        let (config, _) = resolve(Terminal::piped(), filters("*=WRN,svcA=ERR"));
        assert_eq!(config.level_for("svcA"), Level::Error);
        assert_eq!(config.level_for("svcB"), Level::Warn);
        assert_eq!(config.level_for("svcA-sub"), Level::Error);
    }

    #[test]
    fn malformed_rules_fall_back() {
        let (config, errors) = resolve(Terminal::interactive(None), filters("*=INF,foo=BOGUS"));
        assert_eq!(config.rules().to_string(), "*=WRN");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], Error::Parse(_)));
        assert_data_eq!(
            errors[0].to_string(),
            str![[r#"error parsing logging spec: invalid logging spec 'foo=BOGUS': attempted to convert a string that doesn't match an existing log level"#]]
        );
    }

    #[test]
    fn programmatic_rules_apply_last() {
        let sources = Sources {
            rules: vec![Rule::new(Pattern::prefix("db"), Level::Off)],
            ..filters("*=INF,db=DBG")
        };
        let (config, _) = resolve(Terminal::piped(), sources);
        assert_eq!(config.level_for("db.pool"), Level::Off);
        assert_eq!(config.rules().to_string(), "*=INF,db=OFF");
    }

    #[test]
    fn format_selection() {
        let sources = Sources {
            format: Some("TEXT,t=%H:%M,maxcol=120".to_string()),
            ..Sources::default()
        };
        let (config, errors) = resolve(Terminal::interactive(None), sources);
        assert!(errors.is_empty());
        assert_eq!(config.format(), &FormatId::TEXT);
        assert_eq!(config.options().time_format, "%H:%M");
        assert_eq!(config.options().max_col, 120);
    }

    #[test]
    fn options_without_format_keep_default_format() {
        let sources = Sources {
            format: Some("maxcol=100".to_string()),
            ..Sources::default()
        };
        let (config, errors) = resolve(Terminal::piped(), sources);
        assert!(errors.is_empty());
        assert_eq!(config.format(), &FormatId::JSON);
        assert_eq!(config.options().max_col, 100);
    }

    #[test]
    fn unknown_format() {
        let sources = Sources {
            format: Some("xml,maxcol=100".to_string()),
            ..Sources::default()
        };
        let (config, errors) = resolve(Terminal::piped(), sources);
        assert_eq!(config.format(), &FormatId::JSON);
        assert_eq!(config.options().max_col, 80);
        assert!(matches!(&errors[..], [Error::UnknownFormat { format }] if format == "xml"));
    }

    #[test]
    fn format_overrides() {
        let mut sources = Sources::default();
        sources.overrides.insert("audit".to_string(), FormatId::TEXT);
        sources.overrides.insert("other".to_string(), FormatId::new("missing"));
        let (config, errors) = resolve(Terminal::piped(), sources);
        assert_eq!(config.format_for("audit"), &FormatId::TEXT);
        assert_eq!(config.format_for("audit.sub"), &FormatId::JSON);
        assert_eq!(config.format_for("other"), &FormatId::JSON);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn colors() {
        let sources = Sources {
            colors: Some("key=red".to_string()),
            write_style: WriteStyle::Always,
            ..Sources::default()
        };
        let (config, errors) = resolve(Terminal::piped(), sources);
        assert!(errors.is_empty());
        assert!(config.options().colors);
        assert_eq!(config.options().scheme.key, anstyle::AnsiColor::Red.on_default());

        let sources = Sources {
            colors: Some("key=nocolor".to_string()),
            write_style: WriteStyle::Never,
            ..Sources::default()
        };
        let (config, errors) = resolve(Terminal::interactive(None), sources);
        assert_eq!(errors.len(), 1);
        assert!(!config.options().colors);
        let defaults = Defaults::for_terminal(&Terminal::interactive(None));
        assert_eq!(config.options().scheme, defaults.color_scheme());
    }
}
