use core::num::{NonZeroU64, NonZeroUsize};
use core::time::Duration;
use std::io::{self, Write};

use log::debug;

use crate::clock::{duration_to_ticks, sum_durations, MonotonicClock, TICKS_PER_MICROSECOND};
use crate::error::Error;
use crate::session::SessionContext;
use crate::threads::run_multi_thread;
use crate::workload::{ErrorLatch, Workload};

/// How many create/release cycles a run aims for, before rounding up to a
/// multiple of the thread count.
pub const NOMINAL_CALLS: NonZeroU64 = match NonZeroU64::new(1_000_000) {
    Some(calls) => calls,
    None => panic!("nominal call count must be non-zero"),
};

/// The shape of one benchmark run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BenchConfig {
    threads: NonZeroUsize,
    nominal_calls: NonZeroU64,
}

impl BenchConfig {
    /// A run of [`NOMINAL_CALLS`] cycles spread over `threads`.
    pub fn new(threads: NonZeroUsize) -> Self {
        Self {
            threads,
            nominal_calls: NOMINAL_CALLS,
        }
    }

    pub fn with_nominal_calls(mut self, nominal_calls: NonZeroU64) -> Self {
        self.nominal_calls = nominal_calls;
        self
    }

    pub fn threads(&self) -> NonZeroUsize {
        self.threads
    }

    /// The smallest multiple of the thread count not below the nominal total.
    pub fn total_iterations(&self) -> u64 {
        let threads = self.threads.get() as u64;
        self.nominal_calls.get().div_ceil(threads) * threads
    }

    /// How many cycles each thread runs.
    pub fn iterations_per_thread(&self) -> u64 {
        self.total_iterations() / self.threads.get() as u64
    }
}

/// Whether to label the printed result.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum OutputMode {
    #[default]
    Verbose,
    Terse,
}

/// The outcome of a successful run.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub total_iterations: u64,

    /// Time each thread spent in its loop, by thread index.
    pub thread_times: Vec<Duration>,

    /// Wall time of the whole multi-threaded section, including spawning and
    /// joining.  Reported for information; the average does not use it.
    pub wall_time: Duration,
}

impl Report {
    /// Sum of every thread's time.
    pub fn total_time(&self) -> Duration {
        sum_durations(&self.thread_times)
    }

    /// Average cost of one cycle, in microseconds.
    ///
    /// This divides by the rounded-up iteration total, which is the number of
    /// cycles actually run.
    pub fn average_call_micros(&self) -> f64 {
        let ticks = duration_to_ticks(self.total_time()) as f64;
        (ticks / self.total_iterations as f64) / TICKS_PER_MICROSECOND as f64
    }

    /// Prints the single result line.
    pub fn write_result(&self, mode: OutputMode, out: &mut dyn Write) -> io::Result<()> {
        let average = self.average_call_micros();
        match mode {
            OutputMode::Terse => writeln!(out, "{average:.6}"),
            OutputMode::Verbose => writeln!(
                out,
                "Average time per TLS session/buffer creation call: {average:.6}us"
            ),
        }
    }
}

/// Runs the benchmark against an already-created `context`.
///
/// Fails if the threads could not all run to completion, or if any cycle on
/// any thread failed; in both cases there is no report.
pub fn run_benchmark<C: SessionContext>(
    config: &BenchConfig,
    context: &C,
    clock: &dyn MonotonicClock,
) -> Result<Report, Error> {
    let errors = ErrorLatch::new();
    let workload = Workload::new(context, clock, config.iterations_per_thread(), &errors);

    debug!(
        "running {} cycles on {} threads ({} each)",
        config.total_iterations(),
        config.threads(),
        workload.iterations_per_thread()
    );

    let run = run_multi_thread(config.threads(), clock, |index| workload.run(index))?;

    if errors.is_raised() {
        return Err(Error::IterationFailed);
    }

    let report = Report {
        total_iterations: config.total_iterations(),
        thread_times: run.results,
        wall_time: run.wall_time,
    };
    debug!(
        "summed thread time {:?}, wall time {:?}",
        report.total_time(),
        report.wall_time
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(threads: usize) -> BenchConfig {
        BenchConfig::new(NonZeroUsize::new(threads).unwrap())
    }

    #[test]
    fn divisible_thread_count_does_not_round() {
        let c = config(4);
        assert_eq!(c.total_iterations(), 1_000_000);
        assert_eq!(c.iterations_per_thread(), 250_000);

        assert_eq!(config(1).total_iterations(), NOMINAL_CALLS.get());
        assert_eq!(config(8).total_iterations(), NOMINAL_CALLS.get());
    }

    #[test]
    fn indivisible_thread_count_rounds_up() {
        let c = config(3);
        assert_eq!(c.total_iterations(), 1_000_002);
        assert_eq!(c.iterations_per_thread(), 333_334);

        let c = config(7);
        assert_eq!(c.total_iterations(), 1_000_006);
        assert_eq!(c.iterations_per_thread(), 142_858);
    }

    #[test]
    fn total_is_minimal_multiple() {
        for threads in 1..=257 {
            let c = config(threads);
            let total = c.total_iterations();
            let threads = threads as u64;
            assert_eq!(total % threads, 0);
            assert!(total >= NOMINAL_CALLS.get());
            assert!(total - threads < NOMINAL_CALLS.get());
            assert_eq!(c.iterations_per_thread() * threads, total);
        }
    }

    #[test]
    fn more_threads_than_calls() {
        let c = config(5).with_nominal_calls(NonZeroU64::new(2).unwrap());
        assert_eq!(c.total_iterations(), 5);
        assert_eq!(c.iterations_per_thread(), 1);
    }

    #[test]
    fn average_of_synthetic_durations() {
        let report = Report {
            total_iterations: 1_000_002,
            thread_times: vec![
                Duration::from_millis(300),
                Duration::from_millis(310),
                Duration::from_millis(290),
            ],
            wall_time: Duration::from_secs(5),
        };

        assert_eq!(report.total_time(), Duration::from_millis(900));
        let expected = (900_000_000.0 / 1_000_002.0) / 1_000.0;
        assert!((report.average_call_micros() - expected).abs() < 1e-12);
    }

    #[test]
    fn average_ignores_wall_time() {
        let mut report = Report {
            total_iterations: 4,
            thread_times: vec![Duration::from_micros(2), Duration::from_micros(6)],
            wall_time: Duration::ZERO,
        };
        assert_eq!(report.average_call_micros(), 2.0);

        report.wall_time = Duration::from_secs(100);
        assert_eq!(report.average_call_micros(), 2.0);
    }

    #[test]
    fn result_lines() {
        let report = Report {
            total_iterations: 8,
            thread_times: vec![Duration::from_micros(10), Duration::from_micros(10)],
            wall_time: Duration::ZERO,
        };

        let mut terse = Vec::new();
        report.write_result(OutputMode::Terse, &mut terse).unwrap();
        assert_eq!(String::from_utf8(terse).unwrap(), "2.500000\n");

        let mut verbose = Vec::new();
        report
            .write_result(OutputMode::Verbose, &mut verbose)
            .unwrap();
        assert_eq!(
            String::from_utf8(verbose).unwrap(),
            "Average time per TLS session/buffer creation call: 2.500000us\n"
        );
    }
}
