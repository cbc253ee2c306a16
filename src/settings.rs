/*!
Collision and controller settings.

These constants centralize the parameters used by the swept capsule cast,
the penetration solver, the ground classifier, and the movement integrator.
Keeping them together makes tuning easier and helps ensure deterministic
behavior across platforms.

Notes
- Distances are in meters, time in seconds, angles in degrees unless noted.
- Favor practical world-space tolerances over machine epsilon for robust
  behavior.
- Per-character customization goes through `CharacterConfig`; these are the
  defaults it pulls from.
*/

use std::time::Duration;

/// Fraction of the capsule diameter that consecutive sweep samples are
/// allowed to overlap. Each cast step advances `diameter * (1 - ratio)`,
/// so 0.2 bounds every sub-advance to 80% of the diameter.
pub const OVERLAP_RATIO: f32 = 0.2;

/// Minimum number of sweep samples per cast, regardless of distance.
pub const MIN_CAST_STEPS: u32 = 5;

/// Maximum number of sweep samples per cast, capping query cost.
pub const MAX_CAST_STEPS: u32 = 20;

/// Residual depenetration components below this are clamped to zero to
/// avoid positional jitter (meters).
pub const TOLERANCE: f32 = 1.0e-5;

/// Practical small distance for comparisons (meters).
/// Use for dot-product guards, equality checks in world space, etc.
pub const DIST_EPS: f32 = 1.0e-6;

/// Fixed number of integration sub-steps per frame. Stabilizes collision
/// response independent of frame rate.
pub const INTEGRATION_STEPS: u32 = 5;

/// Lockout after entering the walking or falling mode. Transitions signaled
/// inside this window are rejected, which filters single-frame
/// ground-detection noise.
pub const MODE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Gravity magnitude in meters per second squared (positive value).
pub const GRAVITY_MPS2: f32 = 9.81;

/// Cap on accumulated fall speed (positive magnitude, m/s).
pub const TERMINAL_FALL_SPEED_MPS: f32 = 55.0;

/// Default walking speed in meters per second for characters that don't
/// override it.
pub const DEFAULT_MOVEMENT_SPEED: f32 = 5.0;

/// Air-control multiplier for planar (XZ) movement while airborne.
///
/// Convention:
/// - 1.0 = full ground control in air (arcade / very floaty)
/// - 0.0 = no air control
///
/// Typical values: 0.1 .. 0.4
pub const AIR_CONTROL_MULTIPLIER: f32 = 0.4;

/// Default vertical takeoff speed for jumps (m/s).
pub const DEFAULT_JUMP_SPEED: f32 = 5.0;

/// Tangential speed applied while sliding down a steep surface (m/s).
pub const SLIDE_SPEED_MPS: f32 = 3.0;

/// Damping applied to the horizontal reflection when colliding mid-air.
/// 0 = kill the reflection entirely, 1 = perfectly elastic.
pub const AIR_REFLECT_DAMPING: f32 = 0.2;

/// Default length of the downward ground probe (meters).
pub const DEFAULT_GROUND_OFFSET: f32 = 0.1;

/// Steepest surface angle that still counts as walkable ground (degrees).
pub const DEFAULT_SLOPE_LIMIT_DEG: f32 = 45.0;

/// Surfaces flatter than this never veto grounding even when the probe
/// misses (degrees). See the classifier's empty-space check.
pub const FLAT_SLOPE_DEG: f32 = 10.0;

/// Scale applied to the capsule radius for ground probe casts.
/// A thinner probe samples the surface under the capsule center instead of
/// whatever the capsule flank is leaning on.
pub const PROBE_RADIUS_SCALE: f32 = 0.25;

/// Fraction of a frame's intended vertical movement that an upward
/// depenetration must exceed to count as evidence of ground contact.
pub const GROUND_EVIDENCE_RATIO: f32 = 0.25;
