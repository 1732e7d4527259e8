use core::num::NonZeroUsize;
use core::time::Duration;
use std::thread;

use log::debug;

use crate::clock::MonotonicClock;
use crate::error::Error;

/// What [`run_multi_thread`] hands back once every thread has joined.
#[derive(Debug)]
pub struct ThreadRun<T> {
    /// Each thread's return value, in thread-index order.
    pub results: Vec<T>,

    /// Wall time from before the first spawn until after the last join.
    pub wall_time: Duration,
}

/// Run `f` on `count` freshly spawned threads, each called once with its
/// index, and then return what each thread produced.
///
/// Every thread that was started is joined before this returns, whether or
/// not the run succeeded.  If a thread cannot be started no further threads
/// are spawned and the run fails.
pub fn run_multi_thread<T, F>(
    count: NonZeroUsize,
    clock: &dyn MonotonicClock,
    f: F,
) -> Result<ThreadRun<T>, Error>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    run_with_builder(count, clock, worker_builder, f)
}

fn worker_builder(index: usize) -> thread::Builder {
    thread::Builder::new().name(format!("worker-{index}"))
}

fn run_with_builder<T, F, B>(
    count: NonZeroUsize,
    clock: &dyn MonotonicClock,
    builder: B,
    f: F,
) -> Result<ThreadRun<T>, Error>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
    B: Fn(usize) -> thread::Builder,
{
    let f = &f;
    let start = clock.now();

    let results = thread::scope(|s| {
        let mut threads = Vec::new();
        threads
            .try_reserve_exact(count.get())
            .map_err(|_| Error::SlotAllocation)?;
        let mut spawn_error = None;

        for index in 0..count.get() {
            match builder(index).spawn_scoped(s, move || f(index)) {
                Ok(thread) => threads.push(thread),
                Err(err) => {
                    spawn_error = Some(Error::ThreadSpawn {
                        index,
                        kind: err.kind(),
                    });
                    break;
                }
            }
        }

        let joined = threads
            .into_iter()
            .map(|thread| thread.join())
            .collect::<Vec<_>>();

        if let Some(err) = spawn_error {
            return Err(err);
        }

        joined
            .into_iter()
            .enumerate()
            .map(|(index, result)| result.map_err(|_| Error::ThreadPanicked { index }))
            .collect::<Result<Vec<T>, Error>>()
    })?;

    let wall_time = clock.now().duration_since(start);
    debug!("{} threads joined after {wall_time:?}", results.len());

    Ok(ThreadRun { results, wall_time })
}
