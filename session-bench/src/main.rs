// This program measures how long it takes to create and release a rustls
// server session with a pair of in-memory buffers bound to it.
//
// Usage: session-new [-t] threadcount
//
// Exactly one line is printed to stdout: the result, or why there is none.

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use rustls_session_bench::cli::{execute, Options};
use rustls_session_bench::clock::SystemClock;
use rustls_session_bench::session::ServerContext;

fn main() -> ExitCode {
    env_logger::init();

    let mut stdout = io::stdout().lock();

    let result = Options::parse_from(env::args_os()).and_then(|options| {
        execute(
            &options,
            ServerContext::with_default_provider,
            &SystemClock::new(),
            &mut stdout,
        )
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(stdout, "{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;
