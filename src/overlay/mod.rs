//! Debug wireframe overlay pass, drawn over the accumulator's display
//! texture. Disabled (zero vertices) when debug mode is off.

pub mod wireframe;

#[cfg(feature = "gpu")]
pub use wireframe::{OverlayUniforms, WireframeOverlay};
