/*!
Static world collider: a merged triangle mesh plus a BVH over per-triangle
AABBs for bounds-pruned candidate queries.

Notes:
- The mesh is immutable once built. Characters only read it, so no locking
  is needed anywhere in the crate.
- `WorldMesh::new()` is the *unready* state (level still loading). Queries
  against an unready mesh return nothing; that is a valid, non-fatal
  condition the controller degrades through, not an error.
*/

use nalgebra as na;
use parry3d::{
    bounding_volume::Aabb,
    partitioning::{Bvh, BvhBuildStrategy},
    shape::Triangle,
};

use super::types::{Point3, Vec3};

/// Immutable triangle-mesh world with a BVH acceleration structure.
pub struct WorldMesh {
    triangles: Vec<Triangle>,
    bvh: Option<Bvh>,
}

impl WorldMesh {
    /// An unready mesh: no geometry, all queries return nothing.
    #[inline]
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
            bvh: None,
        }
    }

    /// Build from a merged triangle list. An empty list stays unready.
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        if triangles.is_empty() {
            return Self::new();
        }

        let aabbs: Vec<Aabb> = triangles.iter().map(triangle_aabb).collect();
        let bvh = Bvh::from_leaves(BvhBuildStrategy::Binned, &aabbs);

        Self {
            triangles,
            bvh: Some(bvh),
        }
    }

    /// Build from indexed geometry, the shape mesh assets arrive in.
    /// Indices out of range are skipped.
    pub fn from_indexed(positions: &[Point3], indices: &[[u32; 3]]) -> Self {
        let triangles: Vec<Triangle> = indices
            .iter()
            .filter_map(|idx| {
                let a = positions.get(idx[0] as usize)?;
                let b = positions.get(idx[1] as usize)?;
                let c = positions.get(idx[2] as usize)?;
                Some(Triangle::new(*a, *b, *c))
            })
            .collect();
        Self::from_triangles(triangles)
    }

    /// True once geometry and the BVH are in place.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.bvh.is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    #[inline]
    pub fn triangle(&self, idx: usize) -> &Triangle {
        &self.triangles[idx]
    }

    /// Collect indices of triangles whose bounds intersect `aabb` into `out`.
    ///
    /// `out` is cleared first and reused across calls to keep hot paths free
    /// of per-call allocation. Unready meshes produce no candidates.
    pub fn candidates_into(&self, aabb: &Aabb, out: &mut Vec<usize>) {
        out.clear();
        let Some(bvh) = &self.bvh else {
            return;
        };
        for leaf_idx in bvh.intersect_aabb(aabb) {
            out.push(leaf_idx as usize);
        }
    }
}

impl Default for WorldMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// AABB of a single triangle.
fn triangle_aabb(tri: &Triangle) -> Aabb {
    let mins = Point3::new(
        tri.a.x.min(tri.b.x).min(tri.c.x),
        tri.a.y.min(tri.b.y).min(tri.c.y),
        tri.a.z.min(tri.b.z).min(tri.c.z),
    );
    let maxs = Point3::new(
        tri.a.x.max(tri.b.x).max(tri.c.x),
        tri.a.y.max(tri.b.y).max(tri.c.y),
        tri.a.z.max(tri.b.z).max(tri.c.z),
    );
    Aabb { mins, maxs }
}

/// AABB of a segment inflated by `pad` on all sides (a capsule's bounds when
/// `pad` is the radius).
pub(crate) fn segment_aabb(a: &Point3, b: &Point3, pad: f32) -> Aabb {
    let delta = na::Vector3::new(pad, pad, pad);
    let mins = Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)) - delta;
    let maxs = Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)) + delta;
    Aabb { mins, maxs }
}

/// Two triangles covering the axis-aligned rectangle spanned by `center`
/// and the two half-extent vectors. Convenience for building test floors,
/// walls, and ramps.
pub fn quad(center: Point3, half_u: Vec3, half_v: Vec3) -> [Triangle; 2] {
    let p00 = center - half_u - half_v;
    let p10 = center + half_u - half_v;
    let p11 = center + half_u + half_v;
    let p01 = center - half_u + half_v;
    [
        Triangle::new(p00, p10, p11),
        Triangle::new(p00, p11, p01),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_floor() -> WorldMesh {
        let tris = quad(
            Point3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 10.0),
        );
        WorldMesh::from_triangles(tris.to_vec())
    }

    #[test]
    fn unready_mesh_yields_no_candidates() {
        let mesh = WorldMesh::new();
        assert!(!mesh.is_ready());

        let aabb = segment_aabb(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
            0.5,
        );
        let mut out = vec![1, 2, 3];
        mesh.candidates_into(&aabb, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn candidates_are_bounds_pruned() {
        let mesh = flat_floor();
        assert!(mesh.is_ready());
        assert_eq!(mesh.len(), 2);

        // Near the floor: both triangles are candidates.
        let near = segment_aabb(
            &Point3::new(0.0, 0.2, 0.0),
            &Point3::new(0.0, 0.5, 0.0),
            0.25,
        );
        let mut out = Vec::new();
        mesh.candidates_into(&near, &mut out);
        assert!(!out.is_empty());

        // Far above: pruned away entirely.
        let far = segment_aabb(
            &Point3::new(0.0, 50.0, 0.0),
            &Point3::new(0.0, 51.0, 0.0),
            0.25,
        );
        mesh.candidates_into(&far, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn from_indexed_skips_out_of_range_indices() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let indices = [[0, 1, 2], [0, 1, 9]];
        let mesh = WorldMesh::from_indexed(&positions, &indices);

        assert_eq!(mesh.len(), 1);
        assert!(mesh.is_ready());
    }
}
