//! An append-and-consume byte reservoir feeding the framer.
//!
//! Storage is one backing buffer with `start`/`end` indices — a ring
//! without wrap. Appends that no longer fit at the tail first compact the
//! live bytes to the front; only when the live bytes plus the incoming
//! chunk exceed capacity does the buffer reallocate (doubling, or to the
//! exact requirement if larger). Steady-state streaming therefore does not
//! allocate per call.

const DEFAULT_CAPACITY: usize = 4096;

#[derive(Debug)]
pub struct StreamBuffer {
    data: Vec<u8>,
    start: usize,
    end: usize,
}

impl StreamBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity.max(1)],
            start: 0,
            end: 0,
        }
    }

    /// Number of live (unconsumed) bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn append(&mut self, bytes: &[u8]) {
        let live = self.len();
        if live + bytes.len() > self.data.len() {
            let mut grown = vec![0u8; (self.data.len() * 2).max(live + bytes.len())];
            grown[..live].copy_from_slice(&self.data[self.start..self.end]);
            self.data = grown;
            self.start = 0;
            self.end = live;
        } else if self.end + bytes.len() > self.data.len() {
            self.data.copy_within(self.start..self.end, 0);
            self.start = 0;
            self.end = live;
        }
        self.data[self.end..self.end + bytes.len()].copy_from_slice(bytes);
        self.end += bytes.len();
    }

    /// The live range. The borrow must end before the next `append`.
    pub fn contents(&self) -> &[u8] {
        &self.data[self.start..self.end]
    }

    /// Drops `n` bytes from the front. Callers only consume bytes they
    /// actually read, so `n` beyond the live length is a logic error; it
    /// saturates in release builds.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.len(), "consumed {n} of {} live bytes", self.len());
        self.start = (self.start + n).min(self.end);
        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        }
    }

    pub fn reset(&mut self) {
        self.start = 0;
        self.end = 0;
    }
}

impl Default for StreamBuffer {
    fn default() -> Self {
        Self::new()
    }
}
