use alloc::collections::VecDeque;
use core::cmp;
use std::io;

/// An in-memory byte channel standing in for a socket.
///
/// Bytes written are read back in order.  Reading from an empty buffer, or
/// writing to one at its limit, fails with [`io::ErrorKind::WouldBlock`] so a
/// reader never mistakes "nothing yet" for end of stream.
#[derive(Debug, Default)]
pub struct MemBuffer {
    data: VecDeque<u8>,
    limit: Option<usize>,
}

impl MemBuffer {
    /// Makes an empty, unlimited buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the upper limit on how many bytes this buffer can hold.
    ///
    /// Setting a lower limit than the currently stored data is not an error.
    ///
    /// A [`None`] limit is interpreted as no limit.
    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    /// How many bytes are waiting to be read.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// For a proposed append of `len` bytes, how many can be accepted now.
    fn apply_limit(&self, len: usize) -> usize {
        match self.limit {
            Some(limit) => cmp::min(len, limit.saturating_sub(self.data.len())),
            None => len,
        }
    }
}

impl io::Read for MemBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.data.is_empty() {
            return Err(io::ErrorKind::WouldBlock.into());
        }

        self.data.read(buf)
    }
}

impl io::Write for MemBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = self.apply_limit(buf.len());
        if len == 0 && !buf.is_empty() {
            return Err(io::ErrorKind::WouldBlock.into());
        }

        self.data.extend(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
