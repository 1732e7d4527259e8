#![allow(dead_code)]

use core::cell::Cell;
use core::time::Duration;
use std::sync::atomic::{AtomicIsize, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use rustls_session_bench::clock::{MonotonicClock, Timestamp};
use rustls_session_bench::session::{Session, SessionContext};
use rustls_session_bench::Error;

thread_local! {
    static NOW: Cell<Duration> = const { Cell::new(Duration::ZERO) };
}

/// A clock that advances by `step` on every call, independently per thread.
///
/// Any two consecutive calls on one thread are exactly `step` apart, so every
/// worker's loop appears to take `step`.
#[derive(Debug)]
pub struct StepClock {
    step: Duration,
    calls: AtomicUsize,
}

impl StepClock {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl MonotonicClock for StepClock {
    fn now(&self) -> Timestamp {
        self.calls.fetch_add(1, Ordering::Relaxed);
        NOW.with(|now| {
            let t = now.get() + self.step;
            now.set(t);
            Timestamp::from_origin(t)
        })
    }
}

/// Counts objects that are still alive.
#[derive(Debug)]
pub struct Tracked(Arc<AtomicIsize>);

impl Tracked {
    fn new(live: &Arc<AtomicIsize>) -> Self {
        live.fetch_add(1, Ordering::Relaxed);
        Self(live.clone())
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

#[derive(Debug)]
pub struct MockBuffer(Tracked);

#[derive(Debug)]
pub struct MockSession {
    _tracked: Tracked,
    rbuf: Option<MockBuffer>,
    wbuf: Option<MockBuffer>,
}

impl Session for MockSession {
    type Buffer = MockBuffer;

    fn bind(&mut self, rbuf: MockBuffer, wbuf: MockBuffer) {
        self.rbuf = Some(rbuf);
        self.wbuf = Some(wbuf);
    }
}

/// Which creation, counted from zero across all threads, should fail.
#[derive(Clone, Copy, Debug, Default)]
pub enum FailAt {
    #[default]
    Never,
    Session(u64),
    Buffer(u64),
}

/// A context whose sessions and buffers only count themselves.
#[derive(Debug, Default)]
pub struct MockContext {
    live: Arc<AtomicIsize>,
    sessions: AtomicU64,
    buffers: AtomicU64,
    fail_at: FailAt,
}

impl MockContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(fail_at: FailAt) -> Self {
        Self {
            fail_at,
            ..Self::default()
        }
    }

    /// Sessions and buffers not yet dropped.
    pub fn live(&self) -> isize {
        self.live.load(Ordering::Relaxed)
    }

    pub fn sessions_created(&self) -> u64 {
        self.sessions.load(Ordering::Relaxed)
    }

    pub fn buffers_created(&self) -> u64 {
        self.buffers.load(Ordering::Relaxed)
    }
}

impl SessionContext for MockContext {
    type Buffer = MockBuffer;
    type Session = MockSession;

    fn new_session(&self) -> Result<MockSession, Error> {
        let n = self.sessions.fetch_add(1, Ordering::Relaxed);
        if let FailAt::Session(at) = self.fail_at {
            if n == at {
                return Err(Error::Session(rustls::Error::General(
                    "mock session failure".into(),
                )));
            }
        }

        Ok(MockSession {
            _tracked: Tracked::new(&self.live),
            rbuf: None,
            wbuf: None,
        })
    }

    fn new_buffer(&self) -> Result<MockBuffer, Error> {
        let n = self.buffers.fetch_add(1, Ordering::Relaxed);
        if let FailAt::Buffer(at) = self.fail_at {
            if n == at {
                return Err(Error::BufferAllocation);
            }
        }

        Ok(MockBuffer(Tracked::new(&self.live)))
    }
}
