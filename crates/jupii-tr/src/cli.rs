#![forbid(unsafe_code)]

//! Command-line argument parsing for `jupii-tr`.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable defaults via the `JUPII_TR_*` prefix; explicit flags win.

use std::env;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
jupii-tr: inspect and query Jupii translation catalogs

USAGE:
    jupii-tr <COMMAND> [OPTIONS] [SOURCE]

COMMANDS:
    lookup     Translate SOURCE within --context
    stats      Print entry counts and per-context coverage
    check      Report placeholder and plural form problems (exit 1 if any)
    compile    Write a JSON snapshot of the catalog to --out

CATALOG SELECTION:
    --file=PATH          Read this .ts or .json catalog
    --dir=DIR            Directory searched by --locale (default: translations)
    --locale=TAG         Locale tag, e.g. de or de_DE.UTF-8
    --no-unfinished      Ignore translations still marked unfinished

LOOKUP OPTIONS:
    --context=CTX        UI context of the string (required)
    --n=N                Count used to pick the plural form and fill %n
    --disambiguation=D   Prefer the entry carrying this comment
    --arg=VALUE          Value for %1, %2, ... (repeatable, in order)
    --raw                Print the stored text without substitutions

OTHER OPTIONS:
    --json               stats: print JSON instead of text
    --out=PATH           compile: snapshot output path
    --log=FILTER         Log filter for stderr output (default: warn)
    --log-json           Emit logs as JSON lines
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    JUPII_TR_FILE            Default for --file
    JUPII_TR_DIR             Default for --dir
    JUPII_TR_LOCALE          Default for --locale (falls back to LANG)
    JUPII_TR_NO_UNFINISHED   Ignore unfinished translations (1/true)
    JUPII_TR_LOG             Default for --log
    JUPII_TR_LOG_JSON        Emit JSON logs (1/true)

EXIT STATUS:
    0  success
    1  catalog error, or issues found by check
    2  usage error";

/// Subcommand to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Lookup,
    Stats,
    Check,
    Compile,
}

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "lookup" => Some(Self::Lookup),
            "stats" => Some(Self::Stats),
            "check" => Some(Self::Check),
            "compile" => Some(Self::Compile),
            _ => None,
        }
    }
}

/// Parsed command-line options.
#[derive(Debug, Clone)]
pub struct Opts {
    pub command: Command,
    /// Explicit catalog file; takes precedence over `locale`.
    pub file: Option<PathBuf>,
    /// Directory searched when resolving `locale`.
    pub dir: PathBuf,
    pub locale: Option<String>,
    /// Whether non-empty unfinished translations answer lookups.
    pub include_unfinished: bool,
    pub context: Option<String>,
    pub source: Option<String>,
    pub n: Option<i64>,
    pub disambiguation: Option<String>,
    /// Positional arguments for `%1`, `%2`, ...
    pub args: Vec<String>,
    pub raw: bool,
    pub json: bool,
    pub out: Option<PathBuf>,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
    pub log_json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Help,
    Version,
    MissingCommand,
    UnknownCommand(String),
    Missing(&'static str),
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            command: Command::Stats,
            file: None,
            dir: PathBuf::from("translations"),
            locale: None,
            include_unfinished: true,
            context: None,
            source: None,
            n: None,
            disambiguation: None,
            args: Vec::new(),
            raw: false,
            json: false,
            out: None,
            log_filter: "warn".into(),
            log_json: false,
        }
    }
}

fn truthy(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("jupii-tr {VERSION}");
                process::exit(0);
            }
            Err(ParseError::MissingCommand) => {
                eprintln!("Missing command: expected lookup, stats, check or compile");
                eprintln!("Run with --help for usage information.");
                process::exit(2);
            }
            Err(ParseError::UnknownCommand(name)) => {
                eprintln!("Unknown command: {name}");
                eprintln!("Run with --help for usage information.");
                process::exit(2);
            }
            Err(ParseError::Missing(what)) => {
                eprintln!("Missing {what}");
                eprintln!("Run with --help for usage information.");
                process::exit(2);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(2);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(2);
            }
        }
    }

    pub fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = get_env("JUPII_TR_FILE")
            && !val.trim().is_empty()
        {
            opts.file = Some(PathBuf::from(val));
        }
        if let Some(val) = get_env("JUPII_TR_DIR")
            && !val.trim().is_empty()
        {
            opts.dir = PathBuf::from(val);
        }
        if let Some(val) = get_env("JUPII_TR_LOCALE").or_else(|| get_env("LANG"))
            && !val.trim().is_empty()
        {
            opts.locale = Some(val);
        }
        if let Some(val) = get_env("JUPII_TR_NO_UNFINISHED") {
            opts.include_unfinished = !truthy(&val);
        }
        if let Some(val) = get_env("JUPII_TR_LOG")
            && !val.trim().is_empty()
        {
            opts.log_filter = val;
        }
        if let Some(val) = get_env("JUPII_TR_LOG_JSON") {
            opts.log_json = truthy(&val);
        }

        // Parse command-line args (override env vars)
        let args: Vec<String> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string())
            .collect();
        let mut command = None;
        let mut positional = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            match arg.as_str() {
                "--help" | "-h" => {
                    return Err(ParseError::Help);
                }
                "--version" | "-V" => {
                    return Err(ParseError::Version);
                }
                "--no-unfinished" => {
                    opts.include_unfinished = false;
                }
                "--raw" => {
                    opts.raw = true;
                }
                "--json" => {
                    opts.json = true;
                }
                "--log-json" => {
                    opts.log_json = true;
                }
                "--" => {
                    positional.extend(args[i + 1..].iter().cloned());
                    break;
                }
                other => {
                    if let Some(val) = other.strip_prefix("--file=") {
                        opts.file = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--dir=") {
                        opts.dir = PathBuf::from(val);
                    } else if let Some(val) = other.strip_prefix("--locale=") {
                        if val.trim().is_empty() {
                            return Err(ParseError::InvalidValue {
                                flag: "--locale",
                                value: val.to_string(),
                            });
                        }
                        opts.locale = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--context=") {
                        opts.context = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--n=") {
                        match val.parse() {
                            Ok(n) => opts.n = Some(n),
                            Err(_) => {
                                return Err(ParseError::InvalidValue {
                                    flag: "--n",
                                    value: val.to_string(),
                                });
                            }
                        }
                    } else if let Some(val) = other.strip_prefix("--disambiguation=") {
                        if !val.is_empty() {
                            opts.disambiguation = Some(val.to_string());
                        }
                    } else if let Some(val) = other.strip_prefix("--arg=") {
                        opts.args.push(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--out=") {
                        if val.trim().is_empty() {
                            return Err(ParseError::InvalidValue {
                                flag: "--out",
                                value: val.to_string(),
                            });
                        }
                        opts.out = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--log=") {
                        opts.log_filter = val.to_string();
                    } else if other.starts_with("--") {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    } else if command.is_none() {
                        match Command::from_name(other) {
                            Some(cmd) => command = Some(cmd),
                            None => return Err(ParseError::UnknownCommand(other.to_string())),
                        }
                    } else {
                        positional.push(other.to_string());
                    }
                }
            }
            i += 1;
        }

        opts.command = command.ok_or(ParseError::MissingCommand)?;
        let mut positional = positional.into_iter();
        opts.source = positional.next();
        if let Some(extra) = positional.next() {
            return Err(ParseError::UnknownArg(extra));
        }
        opts.validate()?;
        Ok(opts)
    }

    fn validate(&self) -> Result<(), ParseError> {
        if self.file.is_none() && self.locale.is_none() {
            return Err(ParseError::Missing("--file or --locale"));
        }
        match self.command {
            Command::Lookup => {
                if self.context.is_none() {
                    return Err(ParseError::Missing("--context"));
                }
                if self.source.is_none() {
                    return Err(ParseError::Missing("SOURCE"));
                }
            }
            Command::Compile => {
                if self.out.is_none() {
                    return Err(ParseError::Missing("--out"));
                }
            }
            Command::Stats | Command::Check => {}
        }
        if self.command != Command::Lookup
            && let Some(source) = &self.source
        {
            return Err(ParseError::UnknownArg(source.clone()));
        }
        Ok(())
    }
}
