use std::collections::VecDeque;

use super::Sample;

/// Bounded FIFO of the most recent samples, oldest first.
///
/// Once full, each push evicts exactly one sample from the front.
/// A capacity of zero keeps the ring permanently empty.
#[derive(Debug, Clone)]
pub struct SampleRing {
    samples: VecDeque<Sample>,
    capacity: usize,
    evicted: u64,
}

/// Cap on the up-front allocation; larger rings grow on demand.
const MAX_PREALLOC: usize = 4096;

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(MAX_PREALLOC)),
            capacity,
            evicted: 0,
        }
    }

    pub fn push(&mut self, sample: Sample) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
            self.evicted += 1;
        }
        self.samples.push_back(sample);
    }

    /// Point-in-time copy; later pushes do not show up in it.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples pushed out to make room since this ring was created.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}

impl Default for SampleRing {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::{CallbackHandle, TickType};

    fn sample(start: u64) -> Sample {
        Sample::new(
            TickType::TimerFired,
            CallbackHandle::handler(start, "t"),
            start,
            start + 1,
        )
    }

    fn starts(ring: &SampleRing) -> Vec<u64> {
        ring.snapshot().iter().map(Sample::start_time).collect()
    }

    #[test]
    fn zero_capacity_stays_empty() {
        let mut ring = SampleRing::new(0);
        for i in 0..10 {
            ring.push(sample(i));
        }
        assert!(ring.is_empty());
        assert_eq!(ring.evicted(), 0);
        assert!(ring.snapshot().is_empty());
    }

    #[test]
    fn capacity_one_keeps_latest() {
        let mut ring = SampleRing::new(1);
        ring.push(sample(1));
        ring.push(sample(2));
        ring.push(sample(3));
        assert_eq!(starts(&ring), vec![3]);
        assert_eq!(ring.evicted(), 2);
    }

    #[test]
    fn capacity_two_keeps_two_most_recent_in_order() {
        let mut ring = SampleRing::new(2);
        for i in 1..=5 {
            ring.push(sample(i));
        }
        assert_eq!(starts(&ring), vec![4, 5]);
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.capacity(), 2);
    }

    #[test]
    fn below_capacity_keeps_everything() {
        let mut ring = SampleRing::new(10);
        for i in 0..4 {
            ring.push(sample(i));
        }
        assert_eq!(starts(&ring), vec![0, 1, 2, 3]);
        assert_eq!(ring.evicted(), 0);
    }

    #[test]
    fn snapshot_is_detached_from_later_pushes() {
        let mut ring = SampleRing::new(3);
        ring.push(sample(1));
        let snap = ring.snapshot();
        ring.push(sample(2));
        ring.push(sample(3));
        ring.push(sample(4));
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].start_time(), 1);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut ring = SampleRing::new(3);
        ring.push(sample(1));
        ring.clear();
        assert!(ring.is_empty());
        ring.push(sample(9));
        assert_eq!(starts(&ring), vec![9]);
        assert_eq!(ring.capacity(), 3);
    }

    #[test]
    fn huge_capacity_does_not_preallocate_everything() {
        let mut ring = SampleRing::new(usize::MAX);
        ring.push(sample(1));
        assert_eq!(ring.len(), 1);
    }
}
