#![forbid(unsafe_code)]

//! `jupii-tr` binary entry point.

use std::io;
use std::process::ExitCode;

use jupii_tr::{cli, commands, logging};

fn main() -> ExitCode {
    let opts = cli::Opts::parse();
    logging::init(&opts.log_filter, opts.log_json);

    let stdout = io::stdout();
    match commands::run(&opts, &mut stdout.lock()) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("jupii-tr: {err}");
            ExitCode::FAILURE
        }
    }
}
