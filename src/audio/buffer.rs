//! Fixed-capacity ring buffer holding the audio just before speech starts.
//!
//! The segmenter keeps the most recent few hundred milliseconds of silence
//! here so a phrase's soft onset, which rarely clears the energy threshold,
//! is not cut off.  Once full, each push overwrites the oldest samples.
//!
//! # Example
//!
//! ```rust
//! use memegen_live::audio::RingBuffer;
//!
//! let mut buf = RingBuffer::new(4);
//! buf.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);
//! assert_eq!(buf.drain(), vec![2.0, 3.0, 4.0, 5.0]);
//! ```

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: Copy> RingBuffer<T> {
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be > 0");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `data`, dropping the oldest samples beyond capacity.
    pub fn push_slice(&mut self, data: &[T]) {
        let tail = &data[data.len().saturating_sub(self.capacity)..];
        let overflow = (self.items.len() + tail.len()).saturating_sub(self.capacity);
        self.items.drain(..overflow);
        self.items.extend(tail.iter().copied());
    }

    /// Take every stored sample, oldest first, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_order_below_capacity() {
        let mut pre_roll = RingBuffer::new(8);
        pre_roll.push_slice(&[0.1_f32, 0.2, 0.3]);
        assert_eq!(pre_roll.len(), 3);
        assert_eq!(pre_roll.drain(), vec![0.1, 0.2, 0.3]);
        assert!(pre_roll.is_empty());
    }

    #[test]
    fn long_push_keeps_only_tail() {
        let mut pre_roll = RingBuffer::new(4);
        pre_roll.push_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(pre_roll.drain(), vec![6, 7, 8, 9]);
    }

    #[test]
    fn oldest_samples_fall_out_across_pushes() {
        let mut pre_roll = RingBuffer::new(3);
        pre_roll.push_slice(&[1, 2]);
        pre_roll.push_slice(&[3, 4]);
        assert_eq!(pre_roll.len(), 3);
        pre_roll.push_slice(&[5]);
        assert_eq!(pre_roll.drain(), vec![3, 4, 5]);
        assert_eq!(pre_roll.drain(), Vec::<i32>::new());
    }

    #[test]
    fn clear_then_reuse() {
        let mut pre_roll = RingBuffer::new(2);
        pre_roll.push_slice(&[1, 2, 3]);
        pre_roll.clear();
        assert!(pre_roll.is_empty());
        assert_eq!(pre_roll.capacity(), 2);
        pre_roll.push_slice(&[9]);
        assert_eq!(pre_roll.drain(), vec![9]);
    }

    #[test]
    #[should_panic(expected = "RingBuffer capacity must be > 0")]
    fn zero_capacity_panics() {
        let _buf: RingBuffer<f32> = RingBuffer::new(0);
    }
}
