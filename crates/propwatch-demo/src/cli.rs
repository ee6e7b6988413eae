#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args manually to keep the binary lean.
//! Supports environment variable overrides via the `PROPWATCH_DEMO_*` prefix;
//! explicit flags win over the environment.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
propwatch demo: observable name/age properties driven by text commands

USAGE:
    propwatch-demo [OPTIONS]

OPTIONS:
    --log=FILTER         tracing filter directive (default: warn)
    --json-logs          Emit logs as JSON lines on stderr
    --script=CMDS        Run ';'-separated commands instead of reading stdin
    --no-load            Start with the labels unbound
    --help, -h           Show this help message
    --version, -V        Show version

COMMANDS:
    name                 Cycle the name through Maria, Jade, Christina, Ash
    age                  Cycle the age through 36, 27, 52, 48
    update KIND          Cycle any property by kind (name, age, input-text)
    text STRING          Set the input text
    clear                Clear the input text
    load / unload        Bind or release the labels
    show                 Print the labels
    quit                 Stop

ENVIRONMENT VARIABLES:
    PROPWATCH_DEMO_LOG        Override the default --log filter
    PROPWATCH_DEMO_JSON_LOGS  Enable JSON logs (1/true)
    PROPWATCH_DEMO_SCRIPT     Commands to run (same format as --script)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
    /// Format logs as JSON instead of text.
    pub json_logs: bool,
    /// Inline command script; `None` means read stdin.
    pub script: Option<String>,
    /// Bind the labels before the first command.
    pub load: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            log_filter: "warn".into(),
            json_logs: false,
            script: None,
            load: true,
        }
    }
}

impl Opts {
    /// Parse command-line arguments and environment variables, exiting on
    /// `--help`, `--version` or bad input.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("propwatch-demo {VERSION}");
                process::exit(0);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(1);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Script commands, split on `;`, trimmed, blanks dropped.
    #[must_use]
    pub fn script_commands(&self) -> Option<Vec<String>> {
        self.script.as_ref().map(|script| {
            script
                .split(';')
                .map(str::trim)
                .filter(|cmd| !cmd.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = get_env("PROPWATCH_DEMO_LOG")
            && !val.trim().is_empty()
        {
            opts.log_filter = val;
        }
        if let Some(val) = get_env("PROPWATCH_DEMO_JSON_LOGS") {
            opts.json_logs = val == "1" || val.eq_ignore_ascii_case("true");
        }
        if let Some(val) = get_env("PROPWATCH_DEMO_SCRIPT")
            && !val.trim().is_empty()
        {
            opts.script = Some(val);
        }

        // Parse command-line args (override env vars)
        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                "--json-logs" => opts.json_logs = true,
                "--no-load" => opts.load = false,
                other => {
                    if let Some(val) = other.strip_prefix("--log=") {
                        if val.trim().is_empty() {
                            return Err(ParseError::InvalidValue {
                                flag: "--log",
                                value: val.to_string(),
                            });
                        }
                        opts.log_filter = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--script=") {
                        opts.script = Some(val.to_string());
                    } else {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    }
                }
            }
        }

        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_with_env(args: &[&str], env: &[(&str, &str)]) -> Result<Opts, ParseError> {
        Opts::parse_from_env_and_args(args.iter().copied(), |key| {
            env.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn defaults() {
        let opts = parse_with_env(&[], &[]).expect("parse");
        assert_eq!(opts, Opts::default());
        assert_eq!(opts.log_filter, "warn");
        assert!(opts.load);
        assert_eq!(opts.script_commands(), None);
    }

    #[test]
    fn env_overrides_apply() {
        let env = [
            ("PROPWATCH_DEMO_LOG", "propwatch_core=debug"),
            ("PROPWATCH_DEMO_JSON_LOGS", "TRUE"),
            ("PROPWATCH_DEMO_SCRIPT", "name;age"),
        ];
        let opts = parse_with_env(&[], &env).expect("parse");
        assert_eq!(
            opts.log_filter, "propwatch_core=debug",
            "env={env:?} expected log filter override, got {}",
            opts.log_filter
        );
        assert!(opts.json_logs, "env={env:?} expected json_logs=true");
        assert_eq!(opts.script.as_deref(), Some("name;age"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let env = [("PROPWATCH_DEMO_LOG", "  "), ("PROPWATCH_DEMO_SCRIPT", "")];
        let opts = parse_with_env(&[], &env).expect("parse");
        assert_eq!(opts.log_filter, "warn");
        assert_eq!(opts.script, None);
    }

    #[test]
    fn args_override_env() {
        let env = [("PROPWATCH_DEMO_LOG", "info"), ("PROPWATCH_DEMO_SCRIPT", "age")];
        let opts =
            parse_with_env(&["--log=trace", "--script=name; ;text hi", "--no-load"], &env)
                .expect("parse");
        assert_eq!(opts.log_filter, "trace");
        assert!(!opts.load);
        assert_eq!(
            opts.script_commands(),
            Some(vec!["name".to_string(), "text hi".to_string()])
        );
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse_with_env(&["-h"], &[]), Err(ParseError::Help));
        assert_eq!(
            parse_with_env(&["--version", "--bogus"], &[]),
            Err(ParseError::Version)
        );
        assert!(HELP_TEXT.contains("PROPWATCH_DEMO_SCRIPT"));
    }

    #[test]
    fn invalid_value_reports_flag() {
        assert_eq!(
            parse_with_env(&["--log="], &[]),
            Err(ParseError::InvalidValue {
                flag: "--log",
                value: String::new(),
            })
        );
    }

    #[test]
    fn unknown_arg_reports_error() {
        assert_eq!(
            parse_with_env(&["--screen=2"], &[]),
            Err(ParseError::UnknownArg("--screen=2".into()))
        );
    }
}
