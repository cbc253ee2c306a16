/*!
Super-sampled swept capsule cast.

Instead of an analytic time-of-impact query, the capsule's medial segment is
advanced along the cast direction in equal sub-distances sized so that each
advance covers less than 80% of the capsule diameter. At every sample the
BVH is queried for nearby triangles and any triangle closer to the segment
than the radius is treated as a contact: the segment is pushed out
immediately and the contact is recorded. Sampling this densely bounds the
tunneling risk for thin geometry while keeping the per-cast cost capped.

The cast accumulates corrections across samples and returns the *last*
contact state recorded, not necessarily the first along the path. Callers
that need "the surface I ended up resting against" (ground probes, wall
checks) get exactly that; callers must not rely on first-in-time ordering.
*/

use parry3d::shape::Segment;

use super::{
    geometry::{closest_points_segment_triangle, triangle_normal},
    scratch::Scratch,
    types::{Capsule, HitInfo, Mtd, Point3, Transform, Vec3},
    world::{WorldMesh, segment_aabb},
};
use crate::settings::{DIST_EPS, MAX_CAST_STEPS, MIN_CAST_STEPS, OVERLAP_RATIO};

/// Number of sweep samples for a cast of `max_distance` with a capsule of
/// `diameter`. Guarantees each sub-advance stays below
/// `diameter * (1 - OVERLAP_RATIO)`, clamped to `[MIN_CAST_STEPS, MAX_CAST_STEPS]`.
pub fn cast_steps(max_distance: f32, diameter: f32) -> u32 {
    if diameter <= 0.0 {
        return MIN_CAST_STEPS;
    }
    let advance = diameter * (1.0 - OVERLAP_RATIO);
    let raw = (max_distance / advance).ceil();
    // f32 -> u32 saturates, so absurd distances land on MAX_CAST_STEPS.
    (raw as u32).clamp(MIN_CAST_STEPS, MAX_CAST_STEPS)
}

/// Sweep a capsule from `transform` along `direction` over `max_distance`.
///
/// Returns the last recorded contact as a `(HitInfo, Mtd)` pair, or `None`
/// when nothing was hit. Degenerate capsules, unready worlds, zero-length
/// directions, and non-positive distances all return `None` without error.
pub fn capsule_cast(
    world: &WorldMesh,
    capsule: &Capsule,
    transform: &Transform,
    direction: Vec3,
    max_distance: f32,
    scratch: &mut Scratch,
) -> Option<(HitInfo, Mtd)> {
    if !capsule.is_valid() || !world.is_ready() || max_distance <= 0.0 {
        return None;
    }
    let dir_len_sq = direction.norm_squared();
    if dir_len_sq <= DIST_EPS * DIST_EPS {
        return None;
    }
    let dir = direction / dir_len_sq.sqrt();

    let radius = capsule.radius();
    let steps = cast_steps(max_distance, capsule.diameter());
    let step_len = max_distance / steps as f32;

    capsule.world_segment(transform, &mut scratch.segment);
    let mut seg_a = scratch.segment.a;
    let mut seg_b = scratch.segment.b;

    let mut traveled = 0.0;
    let mut result: Option<(HitInfo, Mtd)> = None;

    for _ in 0..steps {
        seg_a += dir * step_len;
        seg_b += dir * step_len;
        traveled += step_len;

        let aabb = segment_aabb(&seg_a, &seg_b, radius);
        world.candidates_into(&aabb, &mut scratch.candidates);

        for i in 0..scratch.candidates.len() {
            let idx = scratch.candidates[i];
            let tri = world.triangle(idx);
            let seg = Segment::new(seg_a, seg_b);
            let (on_seg, on_tri) = closest_points_segment_triangle(&seg, tri);
            let delta = on_seg - on_tri;
            let dist = delta.norm();
            if dist >= radius {
                continue;
            }

            let depth = radius - dist;
            let push = if dist > DIST_EPS {
                delta / dist
            } else {
                // Segment on the surface: push along the face normal, away
                // from the motion.
                match triangle_normal(tri) {
                    Some(n) if n.dot(&dir) > 0.0 => -n,
                    Some(n) => n,
                    None => -dir,
                }
            };

            // Immediate correction; later samples sweep from the resolved pose.
            seg_a += push * depth;
            seg_b += push * depth;

            let normal = match triangle_normal(tri) {
                Some(n) if n.dot(&push) < 0.0 => -n,
                Some(n) => n,
                None => push,
            };
            let center = na_center(&seg_a, &seg_b);

            result = Some((
                HitInfo {
                    point: on_tri,
                    normal,
                    position: center,
                    distance: traveled,
                },
                Mtd {
                    direction: push,
                    depth,
                    point: on_tri,
                    normal,
                    triangle: idx,
                },
            ));
        }
    }

    result
}

#[inline]
fn na_center(a: &Point3, b: &Point3) -> Vec3 {
    (a.coords + b.coords) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::penetration::compute_penetration;
    use crate::collision::world::quad;
    use crate::settings::TOLERANCE;
    use approx::assert_relative_eq;

    /// A pose counts as resolved when a fresh overlap query finds nothing,
    /// or only float dust below the controller's jitter tolerance.
    fn is_resolved(world: &WorldMesh, capsule: &Capsule, position: Vec3) -> bool {
        let mut scratch = Scratch::new();
        let transform = Transform::from_translation(position);
        compute_penetration(world, capsule, &transform, &mut scratch)
            .is_none_or(|m| m.depth <= TOLERANCE)
    }

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

    fn wall_at_x(x: f32) -> WorldMesh {
        WorldMesh::from_triangles(
            quad(
                Point3::new(x, 0.0, 0.0),
                Vec3::new(0.0, 5.0, 0.0),
                Vec3::new(0.0, 0.0, 5.0),
            )
            .to_vec(),
        )
    }

    #[test]
    fn step_count_respects_the_tunneling_bound() {
        // steps >= ceil(distance / (0.8 * diameter)), clamped to [5, 20].
        let cases = [
            (0.1_f32, 0.5_f32),
            (1.0, 0.5),
            (4.0, 0.5),
            (10.0, 0.5),
            (100.0, 0.5),
            (2.0, 0.1),
        ];
        for (dist, diameter) in cases {
            let steps = cast_steps(dist, diameter);
            let required = (dist / (0.8 * diameter)).ceil() as u32;
            assert!(
                steps >= required.clamp(MIN_CAST_STEPS, MAX_CAST_STEPS),
                "dist {dist} diameter {diameter}: steps {steps}"
            );
            assert!((MIN_CAST_STEPS..=MAX_CAST_STEPS).contains(&steps));
        }
    }

    #[test]
    fn zero_direction_casts_return_nothing() {
        let world = flat_floor();
        let capsule = Capsule::new(0.25, 0.325);
        let transform = Transform::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let mut scratch = Scratch::new();

        for max_distance in [0.1, 1.0, 100.0] {
            let hit = capsule_cast(
                &world,
                &capsule,
                &transform,
                Vec3::zeros(),
                max_distance,
                &mut scratch,
            );
            assert!(hit.is_none());
        }
    }

    #[test]
    fn degenerate_capsule_and_unready_world_short_circuit() {
        let world = flat_floor();
        let mut scratch = Scratch::new();
        let transform = Transform::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let down = Vec3::new(0.0, -1.0, 0.0);

        let bad = Capsule::new(0.5, 0.5);
        assert!(capsule_cast(&world, &bad, &transform, down, 2.0, &mut scratch).is_none());

        let good = Capsule::new(0.25, 0.325);
        let unready = WorldMesh::new();
        assert!(capsule_cast(&unready, &good, &transform, down, 2.0, &mut scratch).is_none());
    }

    #[test]
    fn downward_cast_onto_a_floor_reports_an_upward_normal() {
        let world = flat_floor();
        let capsule = Capsule::new(0.25, 0.325);
        let transform = Transform::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let mut scratch = Scratch::new();

        let (hit, mtd) = capsule_cast(
            &world,
            &capsule,
            &transform,
            Vec3::new(0.0, -1.0, 0.0),
            1.0,
            &mut scratch,
        )
        .expect("floor in range");

        assert!(hit.normal.y > 0.99);
        assert!(mtd.depth > 0.0);
        assert!(hit.distance <= 1.0 + 1.0e-5);
        assert_relative_eq!(hit.point.y, 0.0, epsilon = 1.0e-5);

        // The corrected capsule pose is resolved, not penetrating.
        assert!(is_resolved(&world, &capsule, hit.position));
    }

    #[test]
    fn multi_contact_sweeps_end_in_a_resolved_pose() {
        // Sweep into a wall: several samples collide and each applies its
        // correction. The contract is about the final state, not contact
        // order: the returned pose must be depenetrated.
        let world = wall_at_x(0.5);
        let capsule = Capsule::new(0.25, 0.325);
        let transform = Transform::from_translation(Vec3::zeros());
        let mut scratch = Scratch::new();

        let (hit, _mtd) = capsule_cast(
            &world,
            &capsule,
            &transform,
            Vec3::new(1.0, 0.0, 0.0),
            1.0,
            &mut scratch,
        )
        .expect("wall in range");

        assert!(hit.normal.x < -0.99);
        // Pushed back to the wall surface minus the radius.
        assert_relative_eq!(hit.position.x, 0.25, epsilon = 1.0e-3);
        assert!(is_resolved(&world, &capsule, hit.position));
    }
}
