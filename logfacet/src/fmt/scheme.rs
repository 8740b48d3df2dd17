use core::str::FromStr;

use anstyle::{Ansi256Color, AnsiColor, Color, Style};

use crate::{Level, filter::ParseError};

/// The styles used for each part of a rendered record.
///
/// A scheme is written as comma-separated `role=style` entries, e.g.
/// `key=cyan+h,value,misc=blue,source=88,DBG,WRN=yellow,INF=green+h,ERR=red+h`. Roles are `key`,
/// `value`, `misc`, `source` and the level tokens `DBG`, `INF`, `WRN`, `ERR`. A role without a
/// style is rendered plain.
///
/// A style is `<fg>[+attrs][:<bg>]`, where a color is one of `black`, `red`, `green`, `yellow`,
/// `blue`, `magenta`, `cyan`, `white` or an ANSI-256 index, and attrs are any of `h` (bright),
/// `b` (bold), `d` (dim), `i` (italic) and `u` (underline).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorScheme {
    pub key: Style,
    pub value: Style,
    pub misc: Style,
    pub source: Style,
    pub debug: Style,
    pub info: Style,
    pub warn: Style,
    pub error: Style,
}

impl ColorScheme {
    pub fn parse(spec: &str) -> Result<Self, ParseError> {
        let mut scheme = Self::default();

        for entry in spec.split(',').map(|s| s.trim()) {
            if entry.is_empty() {
                continue;
            }
            let (role, style) = entry.split_once('=').unwrap_or((entry, ""));
            let style = parse_style(style.trim()).map_err(|err| {
                ParseError::new(format!("invalid color scheme entry '{entry}': {err}"))
            })?;
            let slot = match role.trim() {
                "key" => &mut scheme.key,
                "value" => &mut scheme.value,
                "misc" => &mut scheme.misc,
                "source" => &mut scheme.source,
                role => match role.parse::<Level>() {
                    Ok(Level::Debug) => &mut scheme.debug,
                    Ok(Level::Info) => &mut scheme.info,
                    Ok(Level::Warn) => &mut scheme.warn,
                    Ok(Level::Error) => &mut scheme.error,
                    Ok(Level::Off) | Err(_) => {
                        return Err(ParseError::new(format!(
                            "invalid color scheme entry '{entry}': unknown role '{role}'"
                        )));
                    }
                },
            };
            *slot = style;
        }

        Ok(scheme)
    }

    /// The style used for the level token of records at `level`
    pub fn level(&self, level: Level) -> Style {
        match level {
            Level::Debug => self.debug,
            Level::Info => self.info,
            Level::Warn => self.warn,
            Level::Error => self.error,
            Level::Off => Style::new(),
        }
    }
}

impl FromStr for ColorScheme {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_style(spec: &str) -> Result<Style, String> {
    let (fg, bg) = spec.split_once(':').unwrap_or((spec, ""));
    let (fg, attrs) = fg.split_once('+').unwrap_or((fg, ""));

    let mut style = Style::new();
    for attr in attrs.chars() {
        style = match attr {
            'h' => style,
            'b' => style.bold(),
            'd' => style.dimmed(),
            'i' => style.italic(),
            'u' => style.underline(),
            other => return Err(format!("unknown attribute '{other}'")),
        };
    }
    if !fg.is_empty() {
        style = style.fg_color(Some(parse_color(fg, attrs.contains('h'))?));
    }
    if !bg.is_empty() {
        style = style.bg_color(Some(parse_color(bg, false)?));
    }
    Ok(style)
}

fn parse_color(spec: &str, bright: bool) -> Result<Color, String> {
    if let Ok(index) = spec.parse::<u8>() {
        return Ok(Color::Ansi256(Ansi256Color(index)));
    }
    let color = match spec.to_ascii_lowercase().as_str() {
        "black" => AnsiColor::Black,
        "red" => AnsiColor::Red,
        "green" => AnsiColor::Green,
        "yellow" => AnsiColor::Yellow,
        "blue" => AnsiColor::Blue,
        "magenta" => AnsiColor::Magenta,
        "cyan" => AnsiColor::Cyan,
        "white" => AnsiColor::White,
        _ => return Err(format!("unknown color '{spec}'")),
    };
    Ok(Color::Ansi(color.bright(bright)))
}
