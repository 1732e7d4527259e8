//! Error types used throughout the benchmark.

use core::fmt;
use std::io;

/// Every way a benchmark run can be abandoned.
///
/// All of these are terminal: the binary prints the `Display` form as a single
/// line and exits with a failure status.
#[non_exhaustive]
#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// The command line did not match `[-t] threadcount`.
    Usage {
        /// Base name of the executable, for the usage line.
        program: String,
    },

    /// No thread count was given.
    MissingThreadCount,

    /// The thread count was not a positive integer.
    InvalidThreadCount(String),

    /// This build has no crypto provider enabled.
    NoProvider,

    /// The shared server context could not be created.
    Context(rustls::Error),

    /// A session could not be created from the context.
    Session(rustls::Error),

    /// A duplex buffer could not be created.
    BufferAllocation,

    /// The session has no buffers bound to it yet.
    Unbound,

    /// A bound session rejected the bytes it was fed.
    Tls(rustls::Error),

    /// I/O on an in-memory buffer or on the output stream failed.
    Io(io::ErrorKind),

    /// There was no memory for one timing slot per thread.
    SlotAllocation,

    /// The thread with this index could not be started.
    ThreadSpawn {
        /// Index of the first thread that failed to start.
        index: usize,
        /// Why the OS refused.
        kind: io::ErrorKind,
    },

    /// The thread with this index panicked before reporting its time.
    ThreadPanicked {
        /// Index of the thread.
        index: usize,
    },

    /// At least one iteration failed to allocate its session or buffers.
    IterationFailed,
}

impl Error {
    /// Whether this error came from the multi-thread runner.
    pub fn is_thread_failure(&self) -> bool {
        matches!(
            self,
            Self::SlotAllocation | Self::ThreadSpawn { .. } | Self::ThreadPanicked { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage { program } => write!(f, "Usage: {program} [-t] threadcount"),
            Self::MissingThreadCount => write!(f, "threadcount is missing"),
            Self::InvalidThreadCount(_) => write!(f, "threadcount must be > 0"),
            Self::NoProvider => {
                write!(f, "Failure to create server context: no crypto provider in this build")
            }
            Self::Context(err) => write!(f, "Failure to create server context: {err}"),
            Self::Session(err) => write!(f, "cannot create session: {err}"),
            Self::BufferAllocation => write!(f, "cannot create memory buffer"),
            Self::Unbound => write!(f, "session has no buffers bound"),
            Self::Tls(err) => write!(f, "session rejected input: {err}"),
            Self::Io(kind) => write!(f, "i/o failure: {kind}"),
            Self::SlotAllocation => write!(f, "Failed to create times array"),
            Self::ThreadSpawn { index, kind } => {
                write!(f, "Failed to run the test: cannot start thread {index}: {kind}")
            }
            Self::ThreadPanicked { index } => {
                write!(f, "Failed to run the test: thread {index} panicked")
            }
            Self::IterationFailed => write!(f, "Error during test"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err.kind())
    }
}
