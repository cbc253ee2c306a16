/*!
Closest-point primitives between points, segments, and triangles.

These are the scalar building blocks of the capsule queries: a capsule
collides with a triangle iff the distance between its medial segment and the
triangle drops below the radius, and the witness points give the push-out
direction. The decomposition (face test first, then edge/vertex candidates)
mirrors the standard capsule-vs-triangle pair test.
*/

use parry3d::shape::{Segment, Triangle};

use super::types::{Point3, Vec3};
use crate::settings::DIST_EPS;

/// Unit face normal of a triangle, or `None` when the triangle is
/// degenerate (zero area).
#[inline]
pub fn triangle_normal(tri: &Triangle) -> Option<Vec3> {
    let n = (tri.b - tri.a).cross(&(tri.c - tri.a));
    let len_sq = n.norm_squared();
    if len_sq <= DIST_EPS * DIST_EPS {
        return None;
    }
    Some(n / len_sq.sqrt())
}

/// Closest point on a triangle to a point, via barycentric region tests.
pub fn closest_point_on_triangle(p: &Point3, tri: &Triangle) -> Point3 {
    let (a, b, c) = (tri.a, tri.b, tri.c);
    let ab = b - a;
    let ac = c - a;

    // Vertex region A.
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    // Vertex region B.
    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    // Edge region AB.
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    // Vertex region C.
    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    // Edge region AC.
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    // Edge region BC.
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    // Interior: project with barycentric coordinates.
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Closest points between two segments, with clamping to both ranges.
pub fn closest_points_segments(seg1: &Segment, seg2: &Segment) -> (Point3, Point3) {
    let p1 = seg1.a;
    let p2 = seg2.a;
    let d1 = seg1.b - seg1.a;
    let d2 = seg2.b - seg2.a;
    let r = p1 - p2;

    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    let eps = DIST_EPS * DIST_EPS;
    let (s, t);
    if a <= eps && e <= eps {
        // Both degenerate to points.
        return (p1, p2);
    }
    if a <= eps {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(&r);
        if e <= eps {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let mut s_local = if denom > eps {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                // Parallel: pick an arbitrary point on seg1.
                0.0
            };
            let mut t_local = (b * s_local + f) / e;
            if t_local < 0.0 {
                t_local = 0.0;
                s_local = (-c / a).clamp(0.0, 1.0);
            } else if t_local > 1.0 {
                t_local = 1.0;
                s_local = ((b - c) / a).clamp(0.0, 1.0);
            }
            s = s_local;
            t = t_local;
        }
    }

    (p1 + d1 * s, p2 + d2 * t)
}

/// Closest points between a segment and a triangle, `(on_segment, on_triangle)`.
///
/// When the segment pierces the triangle interior both points coincide at
/// the crossing (distance zero); callers needing a direction there must fall
/// back to the face normal.
pub fn closest_points_segment_triangle(seg: &Segment, tri: &Triangle) -> (Point3, Point3) {
    // Fast path: the segment crosses the triangle's plane inside the triangle.
    let n = (tri.b - tri.a).cross(&(tri.c - tri.a));
    if n.norm_squared() > DIST_EPS * DIST_EPS {
        let d0 = n.dot(&(seg.a - tri.a));
        let d1 = n.dot(&(seg.b - tri.a));
        if d0 * d1 < 0.0 {
            let t = d0 / (d0 - d1);
            let crossing = seg.a + (seg.b - seg.a) * t;
            if point_in_triangle(&crossing, tri, &n) {
                return (crossing, crossing);
            }
        }
    }

    // Otherwise the closest feature pair involves a segment endpoint or a
    // triangle edge; take the best of all candidates.
    let mut best = {
        let on_tri = closest_point_on_triangle(&seg.a, tri);
        (seg.a, on_tri, (seg.a - on_tri).norm_squared())
    };

    let on_tri = closest_point_on_triangle(&seg.b, tri);
    let d = (seg.b - on_tri).norm_squared();
    if d < best.2 {
        best = (seg.b, on_tri, d);
    }

    for edge in [
        Segment::new(tri.a, tri.b),
        Segment::new(tri.b, tri.c),
        Segment::new(tri.c, tri.a),
    ] {
        let (on_seg, on_edge) = closest_points_segments(seg, &edge);
        let d = (on_seg - on_edge).norm_squared();
        if d < best.2 {
            best = (on_seg, on_edge, d);
        }
    }

    (best.0, best.1)
}

/// Same-side test of `p` against every edge, using the (unnormalized) face
/// normal for orientation. Assumes `p` lies on the triangle's plane.
fn point_in_triangle(p: &Point3, tri: &Triangle, n: &Vec3) -> bool {
    let edges = [(tri.a, tri.b), (tri.b, tri.c), (tri.c, tri.a)];
    for (from, to) in edges {
        if (to - from).cross(&(p - from)).dot(n) < 0.0 {
            return false;
        }
    }
    true
}
