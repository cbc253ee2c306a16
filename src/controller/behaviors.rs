/*!
Gameplay behaviors feeding the modifier registry.

Each behavior owns exactly one modifier and rewrites it once per frame from
the explicit [`ControlBlock`] handed to it: mode, ground flags, input,
config, last contact. Behaviors never read each other's values; the
integrator sums the registry afterwards.

Tuning notes:
- While walking, gravity holds a single tick's worth of downward pull
  instead of zero. The resulting sub-millimeter sink is resolved by the
  penetration solver every sub-step, and that upward correction is exactly
  the evidence the classifier keeps grounding on. Resetting to zero would
  starve the classifier and flicker the ground state.
- The jump impulse stays constant while airborne; gravity's accumulation
  provides the arc. The impulse clears on the first grounded frame after
  takeoff.
*/

use crate::collision::Vec3;
use crate::settings::{AIR_CONTROL_MULTIPLIER, AIR_REFLECT_DAMPING, DIST_EPS};

use super::character::{CharacterConfig, InputState};
use super::ground::GroundState;
use super::modifiers::{ModifierHandle, Modifiers};
use super::state::MoveMode;

/// Everything a behavior may read or write during one frame.
pub struct ControlBlock<'a> {
    pub modifiers: &'a mut Modifiers,
    pub mode: MoveMode,
    pub ground: &'a GroundState,
    pub input: &'a InputState,
    pub config: &'a CharacterConfig,
    /// Velocity summed at the end of the previous frame.
    pub velocity: Vec3,
    /// Push-out direction of the last penetration solve, if any.
    pub contact_normal: Option<Vec3>,
}

/// Downward pull: accumulates while airborne, holds a one-tick bias while
/// supported.
pub struct GravityBehavior {
    handle: ModifierHandle,
}

impl GravityBehavior {
    pub fn new(modifiers: &mut Modifiers) -> Self {
        Self {
            handle: modifiers.register("gravity"),
        }
    }

    pub fn update(&self, ctl: &mut ControlBlock<'_>, dt: f32) {
        let mut value = ctl.modifiers.value(self.handle);
        match ctl.mode {
            MoveMode::Falling => {
                value.y = (value.y - ctl.config.gravity * dt).max(-ctl.config.terminal_fall_speed);
            }
            MoveMode::Walking | MoveMode::Sliding => {
                value.y = -ctl.config.gravity * dt;
            }
        }
        value.x = 0.0;
        value.z = 0.0;
        ctl.modifiers.set(self.handle, value);
    }
}

/// Planar movement from input, attenuated while airborne.
pub struct WalkBehavior {
    handle: ModifierHandle,
}

impl WalkBehavior {
    pub fn new(modifiers: &mut Modifiers) -> Self {
        Self {
            handle: modifiers.register("walk"),
        }
    }

    pub fn update(&self, ctl: &mut ControlBlock<'_>, _dt: f32) {
        let planar = Vec3::new(ctl.input.move_dir.x, 0.0, ctl.input.move_dir.z);
        let len_sq = planar.norm_squared();
        let value = if len_sq > DIST_EPS * DIST_EPS {
            let control = match ctl.mode {
                MoveMode::Walking => 1.0,
                MoveMode::Falling | MoveMode::Sliding => AIR_CONTROL_MULTIPLIER,
            };
            planar / len_sq.sqrt() * ctl.config.walk_speed * control
        } else {
            Vec3::zeros()
        };
        ctl.modifiers.set(self.handle, value);
    }
}

/// Jump impulse, latched until the character lands again.
pub struct JumpBehavior {
    handle: ModifierHandle,
    airborne_seen: bool,
}

impl JumpBehavior {
    pub fn new(modifiers: &mut Modifiers) -> Self {
        Self {
            handle: modifiers.register("jump"),
            airborne_seen: false,
        }
    }

    pub fn update(&mut self, ctl: &mut ControlBlock<'_>, _dt: f32) {
        let mut value = ctl.modifiers.value(self.handle);
        if value.y > 0.0 {
            if !ctl.ground.grounded {
                self.airborne_seen = true;
            } else if self.airborne_seen {
                // Landed: the impulse is spent.
                value.y = 0.0;
                self.airborne_seen = false;
            }
        } else if ctl.input.jump && ctl.ground.grounded && ctl.mode == MoveMode::Walking {
            value.y = ctl.config.jump_speed;
            self.airborne_seen = false;
        }
        ctl.modifiers.set(self.handle, value);
    }
}

/// Downhill push while the classifier reports a slide.
pub struct SlideBehavior {
    handle: ModifierHandle,
}

impl SlideBehavior {
    pub fn new(modifiers: &mut Modifiers) -> Self {
        Self {
            handle: modifiers.register("slide"),
        }
    }

    pub fn update(&self, ctl: &mut ControlBlock<'_>, _dt: f32) {
        let value = if ctl.ground.sliding {
            let n = ctl.ground.normal;
            let down = Vec3::new(0.0, -1.0, 0.0);
            let tangent = down - n * down.dot(&n);
            let len_sq = tangent.norm_squared();
            if len_sq > DIST_EPS * DIST_EPS {
                tangent / len_sq.sqrt() * ctl.config.slide_speed
            } else {
                Vec3::zeros()
            }
        } else {
            Vec3::zeros()
        };
        ctl.modifiers.set(self.handle, value);
    }
}

/// Damped horizontal reflection off steep contacts while airborne.
pub struct AirCollisionBehavior {
    handle: ModifierHandle,
}

impl AirCollisionBehavior {
    pub fn new(modifiers: &mut Modifiers) -> Self {
        Self {
            handle: modifiers.register("air"),
        }
    }

    pub fn update(&self, ctl: &mut ControlBlock<'_>, _dt: f32) {
        // Previous reflection decays quickly once the contact is gone.
        let mut value = ctl.modifiers.value(self.handle) * 0.5;
        if value.norm_squared() < DIST_EPS * DIST_EPS {
            value = Vec3::zeros();
        }

        if ctl.mode == MoveMode::Falling {
            if let Some(n) = ctl.contact_normal {
                // Wall-ish contacts only; floors and ceilings are handled by
                // gravity and the ground classifier.
                if n.y.abs() < 0.5 {
                    let planar = Vec3::new(ctl.velocity.x, 0.0, ctl.velocity.z);
                    let toward = planar.dot(&n);
                    if toward < 0.0 {
                        let reflected = planar - n * (2.0 * toward);
                        value = reflected * AIR_REFLECT_DAMPING - planar;
                    }
                }
            }
        }
        ctl.modifiers.set(self.handle, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ground::GroundState;
    use approx::assert_relative_eq;

    fn block<'a>(
        modifiers: &'a mut Modifiers,
        mode: MoveMode,
        ground: &'a GroundState,
        input: &'a InputState,
        config: &'a CharacterConfig,
    ) -> ControlBlock<'a> {
        ControlBlock {
            modifiers,
            mode,
            ground,
            input,
            config,
            velocity: Vec3::zeros(),
            contact_normal: None,
        }
    }

    #[test]
    fn gravity_accumulates_while_falling_and_holds_a_bias_while_walking() {
        let mut modifiers = Modifiers::new();
        let gravity = GravityBehavior::new(&mut modifiers);
        let ground = GroundState::default();
        let input = InputState::default();
        let config = CharacterConfig::default();
        let dt = 1.0 / 60.0;

        for _ in 0..3 {
            let mut ctl = block(&mut modifiers, MoveMode::Falling, &ground, &input, &config);
            gravity.update(&mut ctl, dt);
        }
        let fall = modifiers.value_of("gravity").unwrap();
        assert_relative_eq!(fall.y, -3.0 * config.gravity * dt, epsilon = 1.0e-5);

        let mut ctl = block(&mut modifiers, MoveMode::Walking, &ground, &input, &config);
        gravity.update(&mut ctl, dt);
        let walk = modifiers.value_of("gravity").unwrap();
        assert_relative_eq!(walk.y, -config.gravity * dt, epsilon = 1.0e-6);
    }

    #[test]
    fn walk_control_is_attenuated_in_the_air() {
        let mut modifiers = Modifiers::new();
        let walk = WalkBehavior::new(&mut modifiers);
        let ground = GroundState::default();
        let input = InputState {
            move_dir: Vec3::new(1.0, 0.0, 0.0),
            jump: false,
        };
        let config = CharacterConfig::default();

        let mut ctl = block(&mut modifiers, MoveMode::Walking, &ground, &input, &config);
        walk.update(&mut ctl, 0.0);
        let on_ground = modifiers.value_of("walk").unwrap();
        assert_relative_eq!(on_ground.x, config.walk_speed, epsilon = 1.0e-5);

        let mut ctl = block(&mut modifiers, MoveMode::Falling, &ground, &input, &config);
        walk.update(&mut ctl, 0.0);
        let airborne = modifiers.value_of("walk").unwrap();
        assert_relative_eq!(
            airborne.x,
            config.walk_speed * AIR_CONTROL_MULTIPLIER,
            epsilon = 1.0e-5
        );
    }

    #[test]
    fn jump_latches_until_landing() {
        let mut modifiers = Modifiers::new();
        let mut jump = JumpBehavior::new(&mut modifiers);
        let input_jump = InputState {
            move_dir: Vec3::zeros(),
            jump: true,
        };
        let input_idle = InputState::default();
        let config = CharacterConfig::default();

        let grounded = GroundState {
            grounded: true,
            ..GroundState::default()
        };
        let airborne = GroundState::default();

        // Trigger on the ground.
        let mut ctl = block(&mut modifiers, MoveMode::Walking, &grounded, &input_jump, &config);
        jump.update(&mut ctl, 0.0);
        assert_relative_eq!(
            modifiers.value_of("jump").unwrap().y,
            config.jump_speed,
            epsilon = 1.0e-6
        );

        // Stays latched in the air.
        let mut ctl = block(&mut modifiers, MoveMode::Falling, &airborne, &input_idle, &config);
        jump.update(&mut ctl, 0.0);
        assert!(modifiers.value_of("jump").unwrap().y > 0.0);

        // Clears on the first grounded frame after takeoff.
        let mut ctl = block(&mut modifiers, MoveMode::Walking, &grounded, &input_idle, &config);
        jump.update(&mut ctl, 0.0);
        assert_relative_eq!(modifiers.value_of("jump").unwrap().y, 0.0);
    }

    #[test]
    fn slide_pushes_downhill_along_the_surface() {
        let mut modifiers = Modifiers::new();
        let slide = SlideBehavior::new(&mut modifiers);
        let a = 60.0_f32.to_radians();
        let ground = GroundState {
            sliding: true,
            normal: Vec3::new(a.sin(), a.cos(), 0.0),
            slope_deg: 60.0,
            ..GroundState::default()
        };
        let input = InputState::default();
        let config = CharacterConfig::default();

        let mut ctl = block(&mut modifiers, MoveMode::Sliding, &ground, &input, &config);
        slide.update(&mut ctl, 0.0);
        let value = modifiers.value_of("slide").unwrap();

        // Downhill on this incline points toward +x and down.
        assert!(value.x > 0.0);
        assert!(value.y < 0.0);
        assert_relative_eq!(value.norm(), config.slide_speed, epsilon = 1.0e-4);
        // Tangential: no component along the surface normal.
        assert_relative_eq!(value.dot(&ground.normal), 0.0, epsilon = 1.0e-4);
    }
}
