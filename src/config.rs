//! Application configuration
//!
//! Settings are layered: built-in defaults, then `EVERGREEN_*` environment
//! variables, then command line flags. Flags accept both `--flag value` and
//! `--flag=value`.

use crate::{
    error::{EvergreenError, Result},
    logging::LoggingConfig,
    scene::{greeting::MAX_GREETING_CHARS, Greeting, PaletteIndex, SceneSettings},
};

pub const PALETTE_ENV: &str = "EVERGREEN_PALETTE";
pub const GREETING_ENV: &str = "EVERGREEN_GREETING";

pub const USAGE: &str = "\
Usage: evergreen [OPTIONS]

Options:
  --palette N        Initial color theme, 0-7 (env: EVERGREEN_PALETTE)
  --greeting TEXT    Initial greeting, at most 30 characters (env: EVERGREEN_GREETING)
  --vsync            Synchronize presentation with the display (default)
  --no-vsync         Present as fast as possible
  --width W          Initial window width in pixels (default 1280)
  --height H         Initial window height in pixels (default 800)
  --log FILTER       Log filter in env_logger syntax (env: RUST_LOG)
  --help             Print this help and exit

Controls: drag to orbit, scroll to zoom, Esc to quit.";

/// Largest accepted window dimension
const MAX_WINDOW_DIMENSION: u32 = 8192;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Evergreen".to_string(),
            width: 1280,
            height: 800,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub window: WindowConfig,
    /// Initial palette and greeting
    pub settings: SceneSettings,
    pub logging: LoggingConfig,
    /// `--help` was passed; the caller prints [`USAGE`] and exits
    pub show_help: bool,
    /// Problems that were corrected while parsing. Logging is not up yet at
    /// that point, so the caller reports these after `init_logging`.
    pub warnings: Vec<String>,
}

impl AppConfig {
    /// Reads the process environment and arguments
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_sources(|key| std::env::var(key).ok(), std::env::args().skip(1))
    }

    /// Builds a config from an environment lookup and the arguments after
    /// the program name. Command line flags win over the environment.
    pub fn from_sources<E, I, S>(env: E, args: I) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::default();

        if let Some(value) = env(PALETTE_ENV) {
            config.settings.palette = parse_palette(&value)?;
        }
        if let Some(value) = env(GREETING_ENV) {
            config.settings.greeting = parse_greeting(GREETING_ENV, value, &mut config.warnings);
        }

        let mut args = args.into_iter().map(Into::into);
        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg.clone(), None),
            };
            let mut value = |name: &str| {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .ok_or_else(|| EvergreenError::Config(format!("{name} expects a value")))
            };

            match flag.as_str() {
                "--palette" => config.settings.palette = parse_palette(&value("--palette")?)?,
                "--greeting" => {
                    config.settings.greeting =
                        parse_greeting("--greeting", value("--greeting")?, &mut config.warnings)
                }
                "--vsync" => config.window.vsync = true,
                "--no-vsync" => config.window.vsync = false,
                "--width" => config.window.width = parse_dimension("--width", &value("--width")?)?,
                "--height" => {
                    config.window.height = parse_dimension("--height", &value("--height")?)?
                }
                "--log" => config.logging.env_filter = Some(value("--log")?),
                "--help" | "-h" => config.show_help = true,
                other => {
                    return Err(EvergreenError::Config(format!(
                        "unknown argument '{other}' (see --help)"
                    )))
                }
            }
        }

        Ok(config)
    }
}

fn parse_palette(value: &str) -> Result<PaletteIndex> {
    let index = value
        .trim()
        .parse::<usize>()
        .map_err(|_| EvergreenError::Config(format!("palette must be a number, got '{value}'")))?;
    PaletteIndex::new(index)
}

fn parse_greeting(source: &str, value: String, warnings: &mut Vec<String>) -> Greeting {
    if Greeting::exceeds_limit(&value) {
        warnings.push(format!(
            "{source}: greeting is longer than {MAX_GREETING_CHARS} characters and was truncated"
        ));
    }
    Greeting::new(value)
}

fn parse_dimension(name: &str, value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(v) if (1..=MAX_WINDOW_DIMENSION).contains(&v) => Ok(v),
        _ => Err(EvergreenError::Config(format!(
            "{name} must be between 1 and {MAX_WINDOW_DIMENSION}, got '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(env: &[(&str, &str)], args: &[&str]) -> Result<AppConfig> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_sources(|key| env.get(key).cloned(), args.iter().copied())
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[], &[]).unwrap();
        assert_eq!(config.window, WindowConfig::default());
        assert_eq!(config.settings, SceneSettings::default());
        assert!(!config.show_help);
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = parse(
            &[(PALETTE_ENV, "2"), (GREETING_ENV, "Season's greetings")],
            &["--palette", "5"],
        )
        .unwrap();
        assert_eq!(config.settings.palette.get(), 5);
        assert_eq!(config.settings.greeting.as_str(), "Season's greetings");
    }

    #[test]
    fn test_inline_values_and_flags() {
        let config = parse(
            &[],
            &["--width=640", "--height", "480", "--no-vsync", "--greeting=Hi", "--log=debug"],
        )
        .unwrap();
        assert_eq!((config.window.width, config.window.height), (640, 480));
        assert!(!config.window.vsync);
        assert_eq!(config.settings.greeting.as_str(), "Hi");
        assert_eq!(config.logging.env_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            parse(&[], &["--palette", "8"]),
            Err(EvergreenError::PaletteIndexOutOfRange { index: 8, .. })
        ));
        assert!(parse(&[(PALETTE_ENV, "red")], &[]).is_err());
        assert!(parse(&[], &["--width", "0"]).is_err());
        assert!(parse(&[], &["--height"]).is_err());
        assert!(parse(&[], &["--fullscreen"]).is_err());
    }

    #[test]
    fn test_long_greeting_is_truncated() {
        let long = "a".repeat(45);
        let config = parse(&[], &["--greeting", long.as_str()]).unwrap();
        assert_eq!(config.settings.greeting.char_count(), 30);
        assert_eq!(config.warnings.len(), 1);
        assert!(config.warnings[0].starts_with("--greeting"));

        let config = parse(&[(GREETING_ENV, long.as_str())], &[]).unwrap();
        assert!(config.warnings[0].starts_with(GREETING_ENV));
    }

    #[test]
    fn test_help_flag() {
        assert!(parse(&[], &["--help"]).unwrap().show_help);
        assert!(USAGE.contains("--palette"));
    }
}
