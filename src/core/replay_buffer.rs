//! Uniform replay buffer with ring storage.
//!
//! Fixed-capacity buffer for off-policy training:
//! - **O(1) insertion**, overwriting the oldest transition when full
//! - **Uniform sampling without replacement** via a partial Fisher-Yates
//!   shuffle over indices
//!
//! Sampling returns `None` when the buffer holds fewer transitions than the
//! requested batch; the training loop checks occupancy before updating, so an
//! underfilled buffer is a skipped update, not an error.

use crate::core::transition::Transition;

// ============================================================================
// Ring Buffer (Internal)
// ============================================================================

/// Ring buffer with O(1) insert and random access.
///
/// Grows up to capacity, then overwrites the oldest element.
struct RingBuffer<T> {
    buffer: Vec<T>,
    capacity: usize,
    /// Next position to overwrite once full (circular).
    write_pos: usize,
}

impl<T: Clone> RingBuffer<T> {
    fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring buffer capacity must be positive");
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
            write_pos: 0,
        }
    }

    fn push(&mut self, item: T) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(item);
        } else {
            self.buffer[self.write_pos] = item;
        }
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    #[inline]
    fn get(&self, idx: usize) -> &T {
        debug_assert!(
            idx < self.buffer.len(),
            "index out of bounds: {} >= {}",
            idx,
            self.buffer.len()
        );
        &self.buffer[idx]
    }

    #[inline]
    fn len(&self) -> usize {
        self.buffer.len()
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.write_pos = 0;
    }
}

// ============================================================================
// Replay Buffer
// ============================================================================

/// Uniform replay buffer over [`Transition`]s.
///
/// Single-threaded; the trainer owns it and interleaves insertion with
/// sampling on one thread.
pub struct ReplayBuffer {
    storage: RingBuffer<Transition>,
}

impl ReplayBuffer {
    /// Create a buffer that holds at most `capacity` transitions.
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: RingBuffer::new(capacity),
        }
    }

    /// Insert a transition, evicting the oldest when at capacity.
    pub fn add(&mut self, transition: Transition) {
        self.storage.push(transition);
    }

    /// Current number of stored transitions.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.len() == 0
    }

    /// Maximum number of transitions the buffer can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity
    }

    /// Fraction of capacity currently filled (0.0 to 1.0).
    pub fn utilization(&self) -> f32 {
        self.storage.len() as f32 / self.storage.capacity as f32
    }

    /// Sample `batch_size` distinct transitions uniformly at random.
    ///
    /// Returns `None` if the buffer holds fewer than `batch_size` items.
    pub fn sample_batch(&self, batch_size: usize) -> Option<Vec<Transition>> {
        if self.storage.len() < batch_size {
            return None;
        }

        // Partial Fisher-Yates: only the first batch_size slots are settled.
        let mut indices: Vec<usize> = (0..self.storage.len()).collect();
        for i in 0..batch_size {
            let j = fastrand::usize(i..indices.len());
            indices.swap(i, j);
        }

        let samples: Vec<Transition> = indices[..batch_size]
            .iter()
            .map(|&idx| self.storage.get(idx).clone())
            .collect();

        Some(samples)
    }

    /// Drop all stored transitions.
    pub fn clear(&mut self) {
        self.storage.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================
