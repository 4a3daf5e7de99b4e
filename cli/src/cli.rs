// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, io, path::PathBuf, process::ExitCode};

use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use crate::cmd_check::CmdCheck;
use crate::cmd_expand::CmdExpand;
use crate::cmd_format::CmdFormat;
use crate::cmd_generate_completion::CmdGenerateCompletion;
use crate::config::{APP_NAME, Config, parse_config};

/// Run the Calendula command-line interface.
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().and_then(Cli::run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Check, format and expand iCalendar files.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $CALENDULA_CONFIG, then \
$XDG_CONFIG_HOME/calendula/config.toml on Linux and MacOS, \
%APPDATA%/calendula/config.toml on Windows.",
                    )
                    .global(true)
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .subcommand(CmdCheck::command())
            .subcommand(CmdExpand::command())
            .subcommand(CmdFormat::command())
            .subcommand(CmdGenerateCompletion::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Self::from(&matches)
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Self::from(&matches)
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        use Commands::*;
        let (command, sub) = match matches.subcommand() {
            Some((CmdCheck::NAME, matches)) => (Check(CmdCheck::from(matches)), matches),
            Some((CmdExpand::NAME, matches)) => (Expand(CmdExpand::from(matches)), matches),
            Some((CmdFormat::NAME, matches)) => (Format(CmdFormat::from(matches)), matches),
            Some((CmdGenerateCompletion::NAME, matches)) => (
                GenerateCompletion(CmdGenerateCompletion::from(matches)),
                matches,
            ),
            Some((name, _)) => return Err(format!("Unknown command: {name}").into()),
            None => return Err("No command given".into()),
        };

        // global args are propagated to the subcommand matches
        let config = sub.get_one("config").cloned();
        Ok(Cli { config, command })
    }

    /// Run the command
    pub fn run(self) -> Result<(), Box<dyn Error>> {
        if let Commands::GenerateCompletion(a) = self.command {
            return a.run();
        }

        tracing::debug!("parsing configuration...");
        let config = parse_config(self.config)?;
        if !config.color {
            colored::control::set_override(false);
        }
        self.command.run(&config)
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// Report the errors in a calendar file
    Check(CmdCheck),

    /// List occurrences of recurring components
    Expand(CmdExpand),

    /// Normalize a calendar file
    Format(CmdFormat),

    /// Generate shell completion
    GenerateCompletion(CmdGenerateCompletion),
}

impl Commands {
    /// Run the command with the given configuration
    #[rustfmt::skip]
    pub fn run(self, config: &Config) -> Result<(), Box<dyn Error>> {
        use Commands::*;
        match self {
            Check(a)              => a.run(config),
            Expand(a)             => a.run(config),
            Format(a)             => a.run(config),
            GenerateCompletion(a) => a.run(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calendula_ical::Strictness;

    #[test]
    fn test_parse_config() {
        let args = ["test", "-c", "/tmp/config.toml", "check", "a.ics"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.toml")));
        assert!(matches!(cli.command, Commands::Check(_)));
    }

    #[test]
    fn test_parse_config_after_subcommand() {
        let cli = Cli::try_parse_from(["test", "format", "a.ics", "--config", "c.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Commands::Format(_)));
    }

    #[test]
    fn test_parse_requires_subcommand() {
        assert!(Cli::try_parse_from(["test"]).is_err());
        assert!(Cli::try_parse_from(["test", "unknown"]).is_err());
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from(["test", "check", "a.ics", "--loose"]).unwrap();
        match cli.command {
            Commands::Check(cmd) => {
                assert_eq!(cmd.file, PathBuf::from("a.ics"));
                assert_eq!(cmd.strictness, Some(Strictness::Loose));
            }
            _ => panic!("Expected Check command"),
        }
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_parse_expand() {
        let cli = Cli::try_parse_from(["test", "expand", "a.ics", "--limit", "7"]).unwrap();
        match cli.command {
            Commands::Expand(cmd) => assert_eq!(cmd.limit, Some(7)),
            _ => panic!("Expected Expand command"),
        }
    }

    #[test]
    fn test_parse_generate_completion() {
        let cli = Cli::try_parse_from(["test", "generate-completion", "zsh"]).unwrap();
        assert!(matches!(cli.command, Commands::GenerateCompletion(_)));
    }

    #[test]
    fn check_fails_on_errors() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = temp_dir.path().join("config.toml");
        std::fs::write(&config, "strict = true\ncolor = false").unwrap();

        let good = temp_dir.path().join("good.ics");
        std::fs::write(
            &good,
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:x\r\nEND:VCALENDAR\r\n",
        )
        .unwrap();
        let bad = temp_dir.path().join("bad.ics");
        std::fs::write(&bad, "BEGIN:VCALENDAR\r\nPRODID:x\r\nEND:VCALENDAR\r\n").unwrap();

        let run = |file: &PathBuf, extra: &[&str]| {
            let mut args = vec!["test".into(), "-c".into(), config.clone().into_os_string()];
            args.push("check".into());
            args.push(file.clone().into_os_string());
            args.extend(extra.iter().map(OsString::from));
            Cli::try_parse_from(args).unwrap().run()
        };

        assert!(run(&good, &[]).is_ok());

        // strict from the config file reports the missing VERSION
        let err = run(&bad, &[]).unwrap_err();
        assert_eq!(err.to_string(), "1 error reported");

        // the command line wins over the config file
        assert!(run(&bad, &["--loose"]).is_ok());
    }
}
