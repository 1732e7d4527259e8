//! # rustls-session-bench
//!
//! A microbenchmark for the cost of creating a rustls server session, binding
//! a pair of in-memory buffers to it, and releasing it again.
//!
//! A fixed budget of [`bench::NOMINAL_CALLS`] create/release cycles is spread
//! evenly over a number of threads (rounding the budget up so every thread
//! does the same amount of work).  Each thread times its own loop; the
//! per-thread times are summed after all threads have joined and divided by
//! the number of cycles to give an average cost per call in microseconds.
//!
//! The pieces are:
//!
//! - [`session`]: the shared [`session::ServerContext`] and the sessions it
//!   creates, behind the [`session::SessionContext`] trait so other
//!   implementations can be measured or mocked.
//! - [`buffer`]: [`buffer::MemBuffer`], the duplex byte buffer bound into
//!   each session.
//! - [`workload`]: the loop each worker thread runs.
//! - [`threads`]: spawns the workers and joins them.
//! - [`bench`]: iteration budget, aggregation and the result line.
//! - [`cli`]: the `[-t] threadcount` command line.
//!
//! Diagnostics go through the `log` crate; the binary installs `env_logger`,
//! so `RUST_LOG=debug` shows per-thread times on stderr.

#![warn(
    clippy::manual_let_else,
    clippy::use_self,
    elided_lifetimes_in_paths,
    trivial_numeric_casts,
    unreachable_pub,
    unused_import_braces,
    unused_extern_crates,
    unused_qualifications
)]

extern crate alloc;

pub mod bench;
pub mod buffer;
pub mod cli;
pub mod clock;
pub mod error;
pub mod session;
pub mod threads;
pub mod workload;

pub use crate::error::Error;
