/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- world (triangle mesh + BVH candidate queries)
- cast (super-sampled swept capsule queries)
- penetration (single-pose MTD solver)
- the character controller

All queries work on the capsule's medial segment: the world-space line
segment between the centers of the two cap spheres. A point is inside the
capsule iff its distance to that segment is below the radius.
*/

use nalgebra as na;
use parry3d::shape::Segment;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point3 = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// A rigid transform (isometry) in world space.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Translation-only transform with identity rotation.
    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::identity(),
        }
    }

    /// Convert to nalgebra `Isometry3` for transforming points into world space.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation,
        )
    }
}

/// Vertical capsule for kinematic characters.
///
/// `half_height` is the full half-height of the capsule *including* the cap,
/// so the medial segment endpoints sit at `±(half_height - radius)` along the
/// local Y axis. (parry's `Capsule::new_y` takes the cylinder half-length
/// instead; convert with `half_height - radius` when interfacing.)
///
/// A capsule is degenerate when `half_height <= radius` (the segment would
/// invert); all queries against a degenerate capsule return `None`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    radius: f32,
    half_height: f32,
}

impl Capsule {
    #[inline]
    pub fn new(radius: f32, half_height: f32) -> Self {
        Self {
            radius,
            half_height,
        }
    }

    /// Replace both parameters. Callers re-validate with [`Capsule::is_valid`].
    #[inline]
    pub fn set(&mut self, radius: f32, half_height: f32) {
        self.radius = radius;
        self.half_height = half_height;
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    #[inline]
    pub fn diameter(&self) -> f32 {
        self.radius * 2.0
    }

    /// A capsule is valid iff `half_height > radius` and the radius is
    /// positive. Queries against invalid capsules are no-ops.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.half_height > self.radius && self.radius > 0.0
    }

    /// Write the local-space medial segment: `(0, half_height - radius, 0)`
    /// down to `(0, -(half_height - radius), 0)`.
    #[inline]
    pub fn to_segment(&self, out: &mut Segment) {
        let offset = self.half_height - self.radius;
        out.a = Point3::new(0.0, offset, 0.0);
        out.b = Point3::new(0.0, -offset, 0.0);
    }

    /// Medial segment in world space under `transform`.
    #[inline]
    pub fn world_segment(&self, transform: &Transform, out: &mut Segment) {
        self.to_segment(out);
        let iso = transform.iso();
        out.a = iso * out.a;
        out.b = iso * out.b;
    }
}

/// Contact information recorded by a swept capsule cast.
///
/// Value type, no identity; recreated on every query.
#[derive(Clone, Copy, Debug)]
pub struct HitInfo {
    /// World-space contact point on the triangle.
    pub point: Point3,
    /// Triangle face normal, oriented toward the capsule.
    pub normal: Vec3,
    /// Corrected capsule center at the recorded contact (already pushed out
    /// of the surface).
    pub position: Vec3,
    /// Distance traveled along the cast direction when the contact was
    /// recorded.
    pub distance: f32,
}

/// Minimum-translation record resolving a capsule/triangle overlap.
#[derive(Clone, Copy, Debug)]
pub struct Mtd {
    /// Unit direction that moves the capsule out of the surface.
    pub direction: Vec3,
    /// Overlap depth along `direction` (meters, > 0).
    pub depth: f32,
    /// World-space point on the triangle closest to the capsule segment.
    pub point: Point3,
    /// Triangle face normal, oriented toward the capsule.
    pub normal: Vec3,
    /// Index of the triangle in the world mesh.
    pub triangle: usize,
}

impl Mtd {
    /// The translation that resolves the overlap.
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.direction * self.depth
    }
}
