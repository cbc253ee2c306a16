/*!
Ground and slope classification.

The classifier turns the frame's depenetration result plus a pair of short
downward probe casts into the transient contact flags the movement-mode
machine runs on. Grounded state is *derived* every frame, never trusted from
the previous one.

The probes use a thinner capsule (quarter radius) so they sample the surface
under the capsule center rather than whatever the flank is leaning against:
on a steep slope the wide capsule touches laterally while the thin center
probe finds nothing below, which is exactly the signal that separates
"standing on" from "leaning on".
*/

use crate::collision::{Capsule, Scratch, Transform, Vec3, WorldMesh, capsule_cast};
use crate::settings::{
    DEFAULT_GROUND_OFFSET, DEFAULT_SLOPE_LIMIT_DEG, FLAT_SLOPE_DEG, GROUND_EVIDENCE_RATIO,
    PROBE_RADIUS_SCALE,
};

/// Classifier configuration, plain numbers passed at controller construction.
#[derive(Clone, Copy, Debug)]
pub struct GroundConfig {
    /// Length of the downward ground probe (meters).
    pub ground_offset: f32,
    /// Optional distance for the "almost landed" probe; `None` disables it.
    pub near_ground: Option<f32>,
    /// Steepest walkable surface angle (degrees).
    pub slope_limit_deg: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            ground_offset: DEFAULT_GROUND_OFFSET,
            near_ground: None,
            slope_limit_deg: DEFAULT_SLOPE_LIMIT_DEG,
        }
    }
}

/// Per-frame contact flags derived by [`classify`].
#[derive(Clone, Copy, Debug)]
pub struct GroundState {
    pub grounded: bool,
    pub falling: bool,
    pub sliding: bool,
    pub near_ground: bool,
    /// Best known surface normal under the character (world up when nothing
    /// has been touched yet).
    pub normal: Vec3,
    /// Angle between world up and `normal`, degrees.
    pub slope_deg: f32,
}

impl Default for GroundState {
    fn default() -> Self {
        Self {
            grounded: false,
            falling: false,
            sliding: false,
            near_ground: false,
            normal: Vec3::y(),
            slope_deg: 0.0,
        }
    }
}

/// Derive the contact flags for the current pose.
///
/// - `depen_raw`: the unclamped depenetration vector applied this sub-step
///   (zero when nothing was resolved).
/// - `last_solver_normal`: fallback surface normal from the most recent
///   penetration solve, if any.
/// - `movement`: the frame's velocity; `dt` is the sub-step delta.
pub fn classify(
    world: Option<&WorldMesh>,
    capsule: &Capsule,
    transform: &Transform,
    depen_raw: Vec3,
    last_solver_normal: Option<Vec3>,
    movement: Vec3,
    dt: f32,
    config: &GroundConfig,
    scratch: &mut Scratch,
) -> GroundState {
    // A vertical correction beyond a quarter of the intended vertical
    // movement is evidence of ground contact.
    let mut grounded = depen_raw.y > (dt * movement.y * GROUND_EVIDENCE_RATIO).abs();

    // The probe inherits the capsule's validity: a degenerate character
    // capsule must not come back "grounded" through a still-valid thin probe.
    let probe = Capsule::new(capsule.radius() * PROBE_RADIUS_SCALE, capsule.half_height());
    let down = -Vec3::y();
    let probe_hit = world.filter(|_| capsule.is_valid()).and_then(|w| {
        capsule_cast(w, &probe, transform, down, config.ground_offset, scratch)
    });

    let normal = probe_hit
        .map(|(hit, _)| hit.normal)
        .or(last_solver_normal)
        .unwrap_or_else(Vec3::y);
    let slope_deg = slope_degrees(&normal);

    // Nothing under the center and a slope outside the tolerated band:
    // whatever we are touching is not ground under us.
    if probe_hit.is_none() && !(slope_deg > FLAT_SLOPE_DEG && slope_deg <= config.slope_limit_deg) {
        grounded = false;
    }

    // Exact 0 and 90 degree readings come from degenerate or uninitialized
    // normals; they never mark a slide.
    let sliding = slope_deg > config.slope_limit_deg && slope_deg != 0.0 && slope_deg != 90.0;

    let mut near_ground = false;
    if let (Some(w), Some(distance)) = (world.filter(|_| capsule.is_valid()), config.near_ground) {
        if movement.y <= 0.0 {
            near_ground = capsule_cast(w, &probe, transform, down, distance, scratch).is_some();
        }
    }

    GroundState {
        grounded,
        falling: !grounded && movement.y < 0.0,
        sliding,
        near_ground,
        normal,
        slope_deg,
    }
}

/// Angle between world up and `normal` in degrees. Assumes a unit normal.
#[inline]
fn slope_degrees(normal: &Vec3) -> f32 {
    normal.y.clamp(-1.0, 1.0).acos().to_degrees()
}
