//! Read-only snapshots for debug visualization.
//!
//! Renderers pull a [`DebugSnapshot`] per character and draw the bounding
//! capsule, box, last contact, and ground normal. The snapshot is a plain
//! value copied out of the character, so consumers cannot mutate the live
//! geometry no matter what they do with it.

use parry3d::bounding_volume::Aabb;
use parry3d::shape::Segment;

use crate::collision::{Point3, Vec3};
use crate::controller::MoveMode;

/// One character's debug view for the current frame.
#[derive(Clone, Copy, Debug)]
pub struct DebugSnapshot {
    /// World-space medial segment of the bounding capsule.
    pub segment: Segment,
    /// Capsule radius around `segment`.
    pub radius: f32,
    /// World-space bounding box.
    pub bounds: Aabb,
    /// Best known surface normal under the character.
    pub ground_normal: Vec3,
    /// Last penetration contact point, if any collision has happened yet.
    pub contact: Option<Point3>,
    pub grounded: bool,
    pub sliding: bool,
    pub near_ground: bool,
    pub mode: MoveMode,
}
