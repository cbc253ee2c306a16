/*!
Collision root module.

This module re-exports submodules that implement the capsule-vs-triangle-mesh
collision engine. The code is split for clarity:

- types:       shared data types (Transform, Capsule, HitInfo, Mtd)
- geometry:    closest-point primitives (point/segment/triangle)
- world:       static merged triangle mesh + BVH candidate queries
- scratch:     reusable per-character query buffers
- cast:        super-sampled swept capsule cast (CCD)
- penetration: single-pose minimum-translation solver
*/

pub mod cast;
pub mod geometry;
pub mod penetration;
pub mod scratch;
pub mod types;
pub mod world;

// Re-export commonly used types and functions.
pub use cast::{capsule_cast, cast_steps};
pub use penetration::compute_penetration;
pub use scratch::Scratch;
pub use types::{Capsule, HitInfo, Iso, Mtd, Point3, Quat, Transform, Vec3};
pub use world::{WorldMesh, quad};
