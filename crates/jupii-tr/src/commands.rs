//! Subcommand implementations.
//!
//! Every command loads one catalog and writes its result to the given
//! writer, so tests can capture the output without spawning a process.

use std::fmt;
use std::io::{self, Write};

use jupii_i18n::loader::write_snapshot;
use jupii_i18n::{
    Catalog, CatalogError, LoadOptions, apply_args, load_file, load_for_locale, substitute_count,
};

use crate::cli::{Command, Opts};

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// `check` found problems.
    IssuesFound,
}

impl Outcome {
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::IssuesFound => 1,
        }
    }
}

/// Failure of a subcommand.
#[derive(Debug)]
pub enum CommandError {
    Catalog(CatalogError),
    /// No catalog file matched the requested locale.
    NoCatalog { locale: String },
    /// `compile` was asked to run without an output path.
    MissingOutput,
    Output(io::Error),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog(err) => write!(f, "{err}"),
            Self::NoCatalog { locale } => write!(f, "no translation catalog for locale {locale}"),
            Self::MissingOutput => write!(f, "compile needs an output path (--out)"),
            Self::Output(err) => write!(f, "cannot write output: {err}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            Self::Output(err) => Some(err),
            Self::NoCatalog { .. } | Self::MissingOutput => None,
        }
    }
}

impl From<CatalogError> for CommandError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<io::Error> for CommandError {
    fn from(err: io::Error) -> Self {
        Self::Output(err)
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.into())
    }
}

/// Run the command selected in `opts`, flushing `out` before returning.
pub fn run<W: Write>(opts: &Opts, out: &mut W) -> Result<Outcome, CommandError> {
    tracing::debug!(command = ?opts.command, "running");
    let outcome = match opts.command {
        Command::Lookup => lookup(opts, out),
        Command::Stats => stats(opts, out),
        Command::Check => check(opts, out),
        Command::Compile => compile(opts, out),
    }?;
    out.flush()?;
    Ok(outcome)
}

fn load_options(opts: &Opts) -> LoadOptions {
    LoadOptions {
        directory: opts.dir.clone(),
        include_unfinished: opts.include_unfinished,
        ..LoadOptions::default()
    }
}

/// Catalog named by `--file`, or found for `--locale`.
///
/// With `identity_fallback`, a locale without a catalog yields an empty
/// catalog that answers every lookup with its source string.
fn load_catalog(opts: &Opts, identity_fallback: bool) -> Result<Catalog, CommandError> {
    let options = load_options(opts);
    if let Some(path) = &opts.file {
        return Ok(load_file(path, &options)?);
    }

    let locale = opts.locale.clone().unwrap_or_default();
    match load_for_locale(&options, &locale)? {
        Some(catalog) => Ok(catalog),
        None if identity_fallback => Ok(Catalog::empty(locale)),
        None => Err(CommandError::NoCatalog { locale }),
    }
}

fn lookup<W: Write>(opts: &Opts, out: &mut W) -> Result<Outcome, CommandError> {
    let catalog = load_catalog(opts, true)?;
    let context = opts.context.as_deref().unwrap_or_default();
    let source = opts.source.as_deref().unwrap_or_default();

    let text = catalog.lookup_disambiguated(context, source, opts.disambiguation.as_deref(), opts.n);
    if opts.raw {
        writeln!(out, "{text}")?;
        return Ok(Outcome::Clean);
    }

    let counted = match opts.n {
        Some(n) => substitute_count(text, n, catalog.language()),
        None => text.to_owned(),
    };
    let args: Vec<&str> = opts.args.iter().map(String::as_str).collect();
    writeln!(out, "{}", apply_args(&counted, &args))?;
    Ok(Outcome::Clean)
}

fn stats<W: Write>(opts: &Opts, out: &mut W) -> Result<Outcome, CommandError> {
    let catalog = load_catalog(opts, false)?;
    let stats = catalog.stats();
    let coverage = catalog.coverage_report();

    if opts.json {
        let value = serde_json::json!({
            "stats": stats,
            "coverage": coverage,
        });
        serde_json::to_writer_pretty(&mut *out, &value)?;
        writeln!(out)?;
        return Ok(Outcome::Clean);
    }

    writeln!(out, "language:     {}", stats.language)?;
    if let Some(version) = catalog.version() {
        writeln!(out, "version:      {version}")?;
    }
    writeln!(out, "plural rule:  {}", stats.plural_rule)?;
    writeln!(out, "contexts:     {}", stats.contexts)?;
    writeln!(
        out,
        "entries:      {} ({} finished, {} unfinished, {} obsolete, {} plural)",
        stats.entries, stats.finished, stats.unfinished, stats.obsolete, stats.plural
    )?;
    if stats.dropped_duplicates > 0 {
        writeln!(out, "duplicates:   {} dropped", stats.dropped_duplicates)?;
    }
    writeln!(
        out,
        "coverage:     {}/{} ({:.1}%)",
        coverage.translated_entries, coverage.total_entries, coverage.coverage_percent
    )?;
    writeln!(out)?;
    for context in &coverage.contexts {
        writeln!(
            out,
            "{:<28} {:>4}/{:<4} {:>6.1}%",
            context.context, context.translated, context.total, context.coverage_percent
        )?;
        for source in &context.untranslated {
            writeln!(out, "    untranslated: {source:?}")?;
        }
    }
    Ok(Outcome::Clean)
}

fn check<W: Write>(opts: &Opts, out: &mut W) -> Result<Outcome, CommandError> {
    let catalog = load_catalog(opts, false)?;
    let issues = catalog.placeholder_issues();
    if issues.is_empty() {
        writeln!(out, "no issues in {} entries", catalog.len())?;
        return Ok(Outcome::Clean);
    }

    for issue in &issues {
        writeln!(out, "{}: {:?}: {}", issue.context, issue.source, issue.kind)?;
    }
    writeln!(out, "{} issue(s)", issues.len())?;
    tracing::warn!(issues = issues.len(), "catalog check failed");
    Ok(Outcome::IssuesFound)
}

fn compile<W: Write>(opts: &Opts, out: &mut W) -> Result<Outcome, CommandError> {
    let Some(path) = opts.out.as_deref() else {
        return Err(CommandError::MissingOutput);
    };
    let catalog = load_catalog(opts, false)?;
    write_snapshot(&catalog, path)?;
    writeln!(out, "wrote {} entries to {}", catalog.len(), path.display())?;
    Ok(Outcome::Clean)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::*;

    const GERMAN: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="de">
<context>
    <name>AboutPage</name>
    <message>
        <source>About</source>
        <translation>Über</translation>
    </message>
    <message>
        <source>Copyright &amp;copy; %1 %2</source>
        <translation type="unfinished"></translation>
    </message>
</context>
<context>
    <name>AlbumsPage</name>
    <message numerus="yes">
        <source>%n track(s)</source>
        <translation>
            <numerusform>%n Titel</numerusform>
            <numerusform>%n Titel</numerusform>
        </translation>
    </message>
</context>
<context>
    <name>CoverPage</name>
    <message>
        <source>Unknown</source>
        <translation type="unfinished">Unbekannt</translation>
    </message>
</context>
</TS>
"#;

    const BROKEN_PLACEHOLDER: &str = r#"<TS version="2.1" language="de">
<context>
    <name>AboutPage</name>
    <message>
        <source>Version %1</source>
        <translation>Version</translation>
    </message>
</context>
</TS>
"#;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn opts(command: Command, file: PathBuf) -> Opts {
        Opts {
            command,
            file: Some(file),
            ..Opts::default()
        }
    }

    fn run_to_string(opts: &Opts) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = run(opts, &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    fn lookup_opts(file: PathBuf, context: &str, source: &str) -> Opts {
        Opts {
            context: Some(context.into()),
            source: Some(source.into()),
            ..opts(Command::Lookup, file)
        }
    }

    #[test]
    fn lookup_prints_translation() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "de.ts", GERMAN);
        let (outcome, text) = run_to_string(&lookup_opts(file, "AboutPage", "About"));
        assert_eq!(outcome, Outcome::Clean);
        assert_eq!(text, "Über\n");
    }

    #[test]
    fn lookup_substitutes_count_unless_raw() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "de.ts", GERMAN);
        let mut opts = lookup_opts(file, "AlbumsPage", "%n track(s)");
        opts.n = Some(1);
        assert_eq!(run_to_string(&opts).1, "1 Titel\n");
        opts.raw = true;
        assert_eq!(run_to_string(&opts).1, "%n Titel\n");
    }

    #[test]
    fn lookup_applies_args_to_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "de.ts", GERMAN);
        let mut opts = lookup_opts(file, "AboutPage", "Copyright &copy; %1 %2");
        opts.args = vec!["2018-2019".into(), "Michal Kosciesza".into()];
        assert_eq!(
            run_to_string(&opts).1,
            "Copyright &copy; 2018-2019 Michal Kosciesza\n"
        );
    }

    #[test]
    fn lookup_respects_no_unfinished() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "de.ts", GERMAN);
        let mut opts = lookup_opts(file, "CoverPage", "Unknown");
        assert_eq!(run_to_string(&opts).1, "Unbekannt\n");
        opts.include_unfinished = false;
        assert_eq!(run_to_string(&opts).1, "Unknown\n");
    }

    #[test]
    fn lookup_without_locale_file_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let opts = Opts {
            command: Command::Lookup,
            dir: dir.path().to_path_buf(),
            locale: Some("ja_JP".into()),
            context: Some("AboutPage".into()),
            source: Some("About".into()),
            ..Opts::default()
        };
        assert_eq!(run_to_string(&opts).1, "About\n");
    }

    #[test]
    fn stats_requires_a_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let opts = Opts {
            command: Command::Stats,
            dir: dir.path().to_path_buf(),
            locale: Some("ja_JP".into()),
            ..Opts::default()
        };
        let err = run(&opts, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CommandError::NoCatalog { ref locale } if locale == "ja_JP"));
    }

    #[test]
    fn stats_text_lists_untranslated() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "harbour-jupii-de.ts", GERMAN);
        let opts = Opts {
            command: Command::Stats,
            dir: dir.path().to_path_buf(),
            locale: Some("de_DE.UTF-8".into()),
            ..Opts::default()
        };
        let (_, text) = run_to_string(&opts);
        assert!(text.contains("language:     de"));
        assert!(text.contains("entries:      4 (2 finished, 2 unfinished, 0 obsolete, 1 plural)"));
        assert!(text.contains("coverage:     3/4"));
        assert!(text.contains("untranslated: \"Copyright &copy; %1 %2\""));
    }

    #[test]
    fn stats_json_is_parseable() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "de.ts", GERMAN);
        let opts = Opts {
            json: true,
            ..opts(Command::Stats, file)
        };
        let (_, text) = run_to_string(&opts);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["stats"]["entries"], 4);
        assert_eq!(value["stats"]["plural_rule"], "germanic");
        assert_eq!(value["coverage"]["translated_entries"], 3);
    }

    #[test]
    fn check_clean_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "de.ts", GERMAN);
        let (outcome, text) = run_to_string(&opts(Command::Check, file));
        assert_eq!(outcome, Outcome::Clean);
        assert_eq!(text, "no issues in 4 entries\n");
    }

    #[test]
    fn check_reports_issues() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "de.ts", BROKEN_PLACEHOLDER);
        let (outcome, text) = run_to_string(&opts(Command::Check, file));
        assert_eq!(outcome, Outcome::IssuesFound);
        assert_eq!(outcome.exit_code(), 1);
        assert!(text.starts_with("AboutPage: \"Version %1\": "));
        assert!(text.ends_with("1 issue(s)\n"));
    }

    #[test]
    fn compile_writes_loadable_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "de.ts", GERMAN);
        let snapshot = dir.path().join("de.json");
        let opts = Opts {
            out: Some(snapshot.clone()),
            ..opts(Command::Compile, file.clone())
        };
        let (_, text) = run_to_string(&opts);
        assert!(text.starts_with("wrote 4 entries to "));

        let options = LoadOptions::default();
        let original = load_file(&file, &options).unwrap();
        let compiled = load_file(&snapshot, &options).unwrap();
        assert_eq!(compiled.entries(), original.entries());
        assert_eq!(compiled.lookup("AboutPage", "About", None), "Über");
    }

    #[test]
    fn compile_without_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "de.ts", GERMAN);
        let err = run(&opts(Command::Compile, file), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CommandError::MissingOutput));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn failed_flush_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "de.ts", GERMAN);
        let err = run(&lookup_opts(file, "AboutPage", "About"), &mut ClosedPipe).unwrap_err();
        assert!(
            matches!(err, CommandError::Output(ref e) if e.kind() == io::ErrorKind::BrokenPipe)
        );
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "de.ts", "<TS language=\"de\"><context>");
        let err = run(&opts(Command::Stats, file), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CommandError::Catalog(ref e) if e.is_malformed()));
    }
}
