//! Performance counters. The GPU kernel atomically increments a small
//! fixed-size `u32` array (triangle-intersection tests, among others); the
//! host reads and resets it once per second and reports throughput.

use std::sync::atomic::{AtomicU32, Ordering};

/// Index into the counter array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Counter {
    TriangleTests = 0,
    SphereTests = 1,
    NodeVisits = 2,
    StackOverflows = 3,
}

pub const NUM_COUNTERS: usize = 4;

/// CPU-side mirror of the GPU counter buffer, for the reference integrator
/// and for reporting after a readback.
#[derive(Debug, Default)]
pub struct Counters {
    values: [AtomicU32; NUM_COUNTERS],
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&self, counter: Counter, n: u32) {
        self.values[counter as usize].fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> [u32; NUM_COUNTERS] {
        std::array::from_fn(|i| self.values[i].load(Ordering::Relaxed))
    }

    pub fn reset(&self) {
        for v in &self.values {
            v.store(0, Ordering::Relaxed);
        }
    }
}

/// Throughput in tests/sec given a counter delta and the elapsed interval.
pub fn tests_per_second(counter_delta: u32, elapsed_secs: f32) -> f32 {
    if elapsed_secs <= 0.0 {
        0.0
    } else {
        counter_delta as f32 / elapsed_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_reset_round_trip() {
        let c = Counters::new();
        c.add(Counter::TriangleTests, 10);
        c.add(Counter::TriangleTests, 5);
        c.add(Counter::SphereTests, 2);
        let snap = c.snapshot();
        assert_eq!(snap[Counter::TriangleTests as usize], 15);
        assert_eq!(snap[Counter::SphereTests as usize], 2);
        c.reset();
        assert_eq!(c.snapshot(), [0; NUM_COUNTERS]);
    }

    #[test]
    fn tests_per_second_handles_zero_interval() {
        assert_eq!(tests_per_second(1000, 0.0), 0.0);
        assert!((tests_per_second(1000, 2.0) - 500.0).abs() < 1e-6);
    }
}
