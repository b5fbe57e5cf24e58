//! Progressive accumulation of the kernel's per-frame radiance estimate
//! into a running average, and the CPU reference blend used by tests.

pub mod accumulator;

pub use accumulator::blend;

#[cfg(feature = "gpu")]
pub use accumulator::Accumulator;
