// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, fs, path::PathBuf, str::FromStr};

use calendula_ical::Strictness;

pub const APP_NAME: &str = "calendula";

const CALENDULA_CONFIG_ENV: &str = "CALENDULA_CONFIG";

/// Load the configuration from `path`, `$CALENDULA_CONFIG` or the user config
/// directory, in that order. A missing default file yields the defaults.
#[tracing::instrument]
pub fn parse_config(path: Option<PathBuf>) -> Result<Config, Box<dyn Error>> {
    let path = if let Some(path) = path {
        path
    } else if let Ok(env_path) = std::env::var(CALENDULA_CONFIG_ENV) {
        PathBuf::from(env_path)
    } else {
        let Some(dir) = get_config_dir() else {
            tracing::debug!("user config directory not found, using defaults");
            return Ok(Config::default());
        };
        let config = dir.join(format!("{APP_NAME}/config.toml"));
        if !config.exists() {
            tracing::debug!(path = %config.display(), "no config found, using defaults");
            return Ok(Config::default());
        }
        config
    };

    fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?
        .parse()
}

/// Configuration for the Calendula application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Parse in strict mode unless overridden on the command line
    pub strict: bool,

    /// Number of occurrences printed per component by `expand`
    pub expand_limit: usize,

    /// Colored output
    pub color: bool,
}

impl Config {
    pub const DEFAULT_EXPAND_LIMIT: usize = 20;

    /// The parsing mode selected by `strict`.
    pub fn strictness(&self) -> Strictness {
        if self.strict {
            Strictness::Strict
        } else {
            Strictness::Loose
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: false,
            expand_limit: Self::DEFAULT_EXPAND_LIMIT,
            color: true,
        }
    }
}

impl FromStr for Config {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

fn get_config_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(not(unix))]
    let config_dir = dirs::config_dir();
    config_dir
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use tempfile::TempDir;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parses_config_text() {
        #[rustfmt::skip]
        let success_cases = [
            ("",                                    Config::default()),
            ("strict = true",                       Config { strict: true, ..Config::default() }),
            ("expand_limit = 5\ncolor = false",     Config { expand_limit: 5, color: false, ..Config::default() }),
        ];
        for (text, expected) in success_cases {
            let config: Config = text.parse().unwrap();
            assert_eq!(config, expected, "{text:?}");
        }

        #[rustfmt::skip]
        let fail_cases = [
            "strict = \"yes\"",
            "expand_limit = -1",
            "unknown = 1",
            "strict = ",
        ];
        for text in fail_cases {
            assert!(text.parse::<Config>().is_err(), "{text:?}");
        }
    }

    #[test]
    fn strict_selects_strictness() {
        let config = Config {
            strict: true,
            ..Config::default()
        };
        assert_eq!(config.strictness(), Strictness::Strict);
        assert_eq!(Config::default().strictness(), Strictness::Loose);
    }

    #[test]
    fn cli_flag_overrides_env_var() {
        let temp_dir = TempDir::new().unwrap();
        let cli_path = write_config(&temp_dir, "cli.toml", "expand_limit = 1");
        let env_path = write_config(&temp_dir, "env.toml", "expand_limit = 2");

        let _guard = env_lock();
        unsafe { std::env::set_var(CALENDULA_CONFIG_ENV, &env_path) };

        let config = parse_config(Some(cli_path)).unwrap();
        assert_eq!(config.expand_limit, 1);

        let config = parse_config(None).unwrap();
        assert_eq!(config.expand_limit, 2);

        unsafe { std::env::remove_var(CALENDULA_CONFIG_ENV) };
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");

        let err = parse_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[cfg(unix)]
    #[test]
    fn missing_default_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let _guard = env_lock();
        unsafe {
            std::env::remove_var(CALENDULA_CONFIG_ENV);
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        let config = parse_config(None).unwrap();
        assert_eq!(config, Config::default());

        fs::create_dir(temp_dir.path().join(APP_NAME)).unwrap();
        write_config(&temp_dir, "calendula/config.toml", "color = false");
        let config = parse_config(None).unwrap();
        assert!(!config.color);

        unsafe { std::env::remove_var("XDG_CONFIG_HOME") };
    }
}
