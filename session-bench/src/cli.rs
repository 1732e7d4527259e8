use core::num::NonZeroUsize;
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

use clap::Parser;

use crate::bench::{run_benchmark, BenchConfig, OutputMode};
use crate::clock::MonotonicClock;
use crate::error::Error;
use crate::session::SessionContext;

#[derive(Parser, Debug)]
#[command(
    about = "Measures the cost of creating and releasing TLS server sessions",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    #[arg(short = 't', help = "Terse output: print only the average")]
    terse: bool,

    #[arg(allow_negative_numbers = true, help = "Number of threads to use")]
    threadcount: Option<String>,
}

/// A validated command line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Options {
    pub output: OutputMode,
    pub threads: NonZeroUsize,
}

impl Options {
    /// Parses `[-t] threadcount`; the first item is the program path.
    pub fn parse_from<I, T>(args: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = args.into_iter().map(Into::into).collect::<Vec<OsString>>();

        let parsed = Args::try_parse_from(&args).map_err(|_| Error::Usage {
            program: program_name(args.first()),
        })?;

        let threadcount = parsed.threadcount.ok_or(Error::MissingThreadCount)?;

        Ok(Self {
            output: if parsed.terse {
                OutputMode::Terse
            } else {
                OutputMode::Verbose
            },
            threads: parse_thread_count(&threadcount)?,
        })
    }
}

fn parse_thread_count(value: &str) -> Result<NonZeroUsize, Error> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|n| usize::try_from(n).ok())
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| Error::InvalidThreadCount(value.to_owned()))
}

fn program_name(argv0: Option<&OsString>) -> String {
    argv0
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "session-new".to_owned())
}

/// Creates the context, runs the benchmark and prints the result line.
///
/// Nothing is written to `out` unless the whole run succeeded.  The context
/// lives until after the result is printed.
pub fn execute<C, F>(
    options: &Options,
    make_context: F,
    clock: &dyn MonotonicClock,
    out: &mut dyn Write,
) -> Result<(), Error>
where
    C: SessionContext,
    F: FnOnce() -> Result<C, Error>,
{
    let context = make_context()?;
    let report = run_benchmark(&BenchConfig::new(options.threads), &context, clock)?;
    report.write_result(options.output, out)?;
    Ok(())
}
