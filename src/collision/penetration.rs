/*!
Single-pose penetration solver.

Tests the capsule at its current pose against every BVH candidate triangle
and reports the minimum-translation record for the *deepest* overlap. The
deepest-wins policy makes the result independent of BVH traversal order;
shallower simultaneous overlaps are resolved by the following sub-steps,
which re-run the solver from the corrected pose.
*/

use super::{
    geometry::{closest_points_segment_triangle, triangle_normal},
    scratch::Scratch,
    types::{Capsule, Mtd, Point3, Transform, Vec3},
    world::{WorldMesh, segment_aabb},
};
use crate::settings::DIST_EPS;

/// Overlap test at a single pose.
///
/// Returns the deepest penetration as an [`Mtd`], or `None` when the capsule
/// is clear of the mesh. Degenerate capsules and unready worlds return
/// `None` without error.
pub fn compute_penetration(
    world: &WorldMesh,
    capsule: &Capsule,
    transform: &Transform,
    scratch: &mut Scratch,
) -> Option<Mtd> {
    if !capsule.is_valid() || !world.is_ready() {
        return None;
    }

    let radius = capsule.radius();
    capsule.world_segment(transform, &mut scratch.segment);
    let seg = scratch.segment;

    let aabb = segment_aabb(&seg.a, &seg.b, radius);
    world.candidates_into(&aabb, &mut scratch.candidates);

    let mut best: Option<Mtd> = None;

    for i in 0..scratch.candidates.len() {
        let idx = scratch.candidates[i];
        let tri = world.triangle(idx);
        let (on_seg, on_tri) = closest_points_segment_triangle(&seg, tri);
        let delta = on_seg - on_tri;
        let dist = delta.norm();
        if dist >= radius {
            continue;
        }

        let (direction, depth) = if dist > DIST_EPS {
            (delta / dist, radius - dist)
        } else {
            // Segment lies on the triangle: push along the face normal,
            // toward the segment midpoint, a full radius.
            let mid = na_mid(&seg.a, &seg.b);
            let n = match triangle_normal(tri) {
                Some(n) if n.dot(&(mid - on_tri.coords)) < 0.0 => -n,
                Some(n) => n,
                None => continue,
            };
            (n, radius)
        };

        if best.as_ref().is_none_or(|b| depth > b.depth) {
            let normal = match triangle_normal(tri) {
                Some(n) if n.dot(&direction) < 0.0 => -n,
                Some(n) => n,
                None => direction,
            };
            best = Some(Mtd {
                direction,
                depth,
                point: on_tri,
                normal,
                triangle: idx,
            });
        }
    }

    best
}

#[inline]
fn na_mid(a: &Point3, b: &Point3) -> Vec3 {
    (a.coords + b.coords) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::world::quad;
    use crate::settings::TOLERANCE;
    use approx::assert_relative_eq;

    fn flat_floor() -> WorldMesh {
        WorldMesh::from_triangles(
            quad(
                Point3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 10.0),
            )
            .to_vec(),
        )
    }

    #[test]
    fn overlap_reports_depth_and_upward_direction() {
        let world = flat_floor();
        let capsule = Capsule::new(0.25, 0.325);
        // Segment bottom at y = 0.245: 0.005 into the radius envelope.
        let transform = Transform::from_translation(Vec3::new(0.0, 0.32, 0.0));
        let mut scratch = Scratch::new();

        let mtd = compute_penetration(&world, &capsule, &transform, &mut scratch)
            .expect("capsule overlaps the floor");

        assert!(mtd.direction.y > 0.99);
        assert_relative_eq!(mtd.depth, 0.005, epsilon = 1.0e-5);
        assert_relative_eq!(mtd.point.y, 0.0, epsilon = 1.0e-6);
    }

    #[test]
    fn one_mtd_application_resolves_the_overlap() {
        // Applying the returned translation once must leave the capsule
        // clear (or within float dust of clear) of the same geometry.
        let world = flat_floor();
        let capsule = Capsule::new(0.25, 0.325);
        let transform = Transform::from_translation(Vec3::new(0.0, 0.30, 0.0));
        let mut scratch = Scratch::new();

        let mtd = compute_penetration(&world, &capsule, &transform, &mut scratch)
            .expect("capsule overlaps the floor");
        let resolved = Transform::from_translation(transform.translation + mtd.translation());

        let residual = compute_penetration(&world, &capsule, &resolved, &mut scratch);
        assert!(residual.is_none_or(|m| m.depth <= TOLERANCE));
    }

    #[test]
    fn deepest_overlap_wins_over_traversal_order() {
        // Two stacked floors under the capsule; the higher one is penetrated
        // deeper. The original controller kept whichever triangle the BVH
        // happened to visit last; this solver deliberately returns the
        // deepest overlap instead, so the result is traversal-order
        // independent.
        let mut tris = quad(
            Point3::new(0.0, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 5.0),
        )
        .to_vec();
        tris.extend(quad(
            Point3::new(0.0, 0.05, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 5.0),
        ));
        let world = WorldMesh::from_triangles(tris);

        let capsule = Capsule::new(0.25, 0.325);
        // Segment bottom at y = 0.245: depth 0.005 vs the lower floor,
        // 0.055 vs the upper one.
        let transform = Transform::from_translation(Vec3::new(0.0, 0.32, 0.0));
        let mut scratch = Scratch::new();

        let mtd = compute_penetration(&world, &capsule, &transform, &mut scratch)
            .expect("capsule overlaps both floors");

        assert_relative_eq!(mtd.depth, 0.055, epsilon = 1.0e-5);
        assert!(mtd.triangle >= 2, "deepest overlap is in the upper quad");
    }

    #[test]
    fn clear_or_invalid_poses_return_none() {
        let world = flat_floor();
        let capsule = Capsule::new(0.25, 0.325);
        let mut scratch = Scratch::new();

        // Well above the floor.
        let clear = Transform::from_translation(Vec3::new(0.0, 2.0, 0.0));
        assert!(compute_penetration(&world, &capsule, &clear, &mut scratch).is_none());

        // Degenerate capsule at an overlapping pose.
        let bad = Capsule::new(0.4, 0.3);
        let overlapping = Transform::from_translation(Vec3::new(0.0, 0.1, 0.0));
        assert!(compute_penetration(&world, &bad, &overlapping, &mut scratch).is_none());

        // Unready world.
        let unready = WorldMesh::new();
        assert!(compute_penetration(&unready, &capsule, &overlapping, &mut scratch).is_none());
    }
}
