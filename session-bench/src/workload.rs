use core::hint::black_box;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use log::{debug, trace};

use crate::clock::MonotonicClock;
use crate::error::Error;
use crate::session::{Session, SessionContext};

/// A flag any worker may raise, read only after every worker has joined.
///
/// Relaxed ordering is sufficient: the join establishes happens-before for the
/// final read, and workers never read it.
#[derive(Debug, Default)]
pub struct ErrorLatch(AtomicBool);

impl ErrorLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Everything a worker thread needs, borrowed from the driver for the
/// duration of the run.
#[derive(Debug)]
pub struct Workload<'a, C> {
    context: &'a C,
    clock: &'a dyn MonotonicClock,
    iterations_per_thread: u64,
    errors: &'a ErrorLatch,
}

impl<'a, C: SessionContext> Workload<'a, C> {
    pub fn new(
        context: &'a C,
        clock: &'a dyn MonotonicClock,
        iterations_per_thread: u64,
        errors: &'a ErrorLatch,
    ) -> Self {
        Self {
            context,
            clock,
            iterations_per_thread,
            errors,
        }
    }

    pub fn iterations_per_thread(&self) -> u64 {
        self.iterations_per_thread
    }

    /// Runs this thread's share of create/bind/release cycles and returns how
    /// long they took.
    ///
    /// A failed cycle raises the shared latch; the loop still runs to the end
    /// so the thread's time slot is always filled.
    pub fn run(&self, thread_index: usize) -> Duration {
        let start = self.clock.now();

        for _ in 0..self.iterations_per_thread {
            if let Err(err) = self.cycle() {
                trace!("thread {thread_index}: {err}");
                self.errors.raise();
            }
        }

        let elapsed = self.clock.now().duration_since(start);
        debug!(
            "thread {thread_index}: {} cycles in {elapsed:?}",
            self.iterations_per_thread
        );
        elapsed
    }

    /// One session plus two buffers, bound together, then released.
    ///
    /// Anything created before a failure is dropped on the early return.
    fn cycle(&self) -> Result<(), Error> {
        let mut session = self.context.new_session()?;
        let rbuf = self.context.new_buffer()?;
        let wbuf = self.context.new_buffer()?;

        session.bind(rbuf, wbuf);
        drop(black_box(session));
        Ok(())
    }
}
