//! Reusable query buffers.
//!
//! The cast and penetration queries run every sub-step of every frame, so
//! they must not allocate. Each character owns one `Scratch` and passes it
//! by mutable reference into every query; nothing is shared across
//! characters, which keeps the buffers free of cross-call aliasing.

use parry3d::shape::Segment;

use super::types::Point3;

/// Per-character scratch buffers for collision queries.
pub struct Scratch {
    /// Candidate triangle indices from the BVH, reused across queries.
    pub(crate) candidates: Vec<usize>,
    /// World-space medial segment, reused across queries.
    pub(crate) segment: Segment,
}

impl Scratch {
    pub fn new() -> Self {
        Self {
            candidates: Vec::with_capacity(32),
            segment: Segment::new(Point3::origin(), Point3::origin()),
        }
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new()
    }
}
