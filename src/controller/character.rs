/*!
Character state and the per-frame movement integrator.

One `Character` per controlled entity. Each frame:
1. Behaviors rewrite their modifiers from the explicit control block.
2. A fixed number of sub-steps integrate velocity and immediately resolve
   penetration against the world mesh, clamping float-dust corrections.
3. The ground classifier derives the contact flags from the last
   depenetration and short downward probes.
4. The flags drive the debounced movement-mode machine.

An unready (or absent) world mesh skips step 2's resolution for the frame:
the character keeps integrating freely and recovers as soon as the mesh is
built. A degenerate capsule makes every collision query a no-op.
*/

use std::time::Instant;

use parry3d::bounding_volume::Aabb;
use parry3d::shape::Segment;

use crate::collision::{
    Capsule, Mtd, Point3, Quat, Scratch, Transform, Vec3, WorldMesh, compute_penetration,
    world::segment_aabb,
};
use crate::debug::DebugSnapshot;
use crate::settings::{
    DEFAULT_JUMP_SPEED, DEFAULT_MOVEMENT_SPEED, GRAVITY_MPS2, INTEGRATION_STEPS, SLIDE_SPEED_MPS,
    TERMINAL_FALL_SPEED_MPS, TOLERANCE,
};

use super::behaviors::{
    AirCollisionBehavior, ControlBlock, GravityBehavior, JumpBehavior, SlideBehavior, WalkBehavior,
};
use super::ground::{GroundConfig, GroundState, classify};
use super::modifiers::Modifiers;
use super::state::{ModeMachine, MoveMode};

/// Plain numeric character configuration, set once at construction.
#[derive(Clone, Copy, Debug)]
pub struct CharacterConfig {
    pub radius: f32,
    pub half_height: f32,
    /// Gravity magnitude, m/s^2 (positive).
    pub gravity: f32,
    /// Cap on accumulated fall speed, m/s (positive).
    pub terminal_fall_speed: f32,
    pub walk_speed: f32,
    pub jump_speed: f32,
    pub slide_speed: f32,
    pub ground: GroundConfig,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            radius: 0.25,
            half_height: 0.325,
            gravity: GRAVITY_MPS2,
            terminal_fall_speed: TERMINAL_FALL_SPEED_MPS,
            walk_speed: DEFAULT_MOVEMENT_SPEED,
            jump_speed: DEFAULT_JUMP_SPEED,
            slide_speed: SLIDE_SPEED_MPS,
            ground: GroundConfig::default(),
        }
    }
}

/// Per-frame input sampled by the embedding layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputState {
    /// Desired planar movement direction (y is ignored). Need not be unit.
    pub move_dir: Vec3,
    pub jump: bool,
}

/// A kinematic capsule character.
pub struct Character {
    position: Vec3,
    rotation: Quat,
    capsule: Capsule,
    config: CharacterConfig,
    input: InputState,

    velocity: Vec3,
    depen_raw: Vec3,
    last_mtd: Option<Mtd>,
    ground: GroundState,
    machine: ModeMachine,

    modifiers: Modifiers,
    gravity: GravityBehavior,
    walk: WalkBehavior,
    jump: JumpBehavior,
    slide: SlideBehavior,
    air: AirCollisionBehavior,

    // Cached world-space bounds for the debug surface.
    bounding_segment: Segment,
    bounding_box: Aabb,

    scratch: Scratch,
}

impl Character {
    pub fn new(config: CharacterConfig) -> Self {
        let mut modifiers = Modifiers::new();
        let gravity = GravityBehavior::new(&mut modifiers);
        let walk = WalkBehavior::new(&mut modifiers);
        let jump = JumpBehavior::new(&mut modifiers);
        let slide = SlideBehavior::new(&mut modifiers);
        let air = AirCollisionBehavior::new(&mut modifiers);

        let capsule = Capsule::new(config.radius, config.half_height);
        if !capsule.is_valid() {
            log::warn!(
                "degenerate capsule (radius {}, half_height {}): collision queries disabled",
                config.radius,
                config.half_height
            );
        }

        let mut character = Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            capsule,
            config,
            input: InputState::default(),
            velocity: Vec3::zeros(),
            depen_raw: Vec3::zeros(),
            last_mtd: None,
            ground: GroundState::default(),
            machine: ModeMachine::new(),
            modifiers,
            gravity,
            walk,
            jump,
            slide,
            air,
            bounding_segment: Segment::new(Point3::origin(), Point3::origin()),
            bounding_box: Aabb::new_invalid(),
            scratch: Scratch::new(),
        };
        character.refresh_bounds();
        character
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.refresh_bounds();
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.refresh_bounds();
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn capsule(&self) -> &Capsule {
        &self.capsule
    }

    /// Reconfigure the capsule. A degenerate pair disables collision queries
    /// until fixed; it is a configuration error, not a runtime fault.
    pub fn set_capsule(&mut self, radius: f32, half_height: f32) {
        self.capsule.set(radius, half_height);
        self.config.radius = radius;
        self.config.half_height = half_height;
        self.refresh_bounds();
    }

    #[inline]
    pub fn config(&self) -> &CharacterConfig {
        &self.config
    }

    #[inline]
    pub fn ground(&self) -> &GroundState {
        &self.ground
    }

    #[inline]
    pub fn mode(&self) -> MoveMode {
        self.machine.mode()
    }

    #[inline]
    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    #[inline]
    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }

    /// Advance one frame against the wall clock.
    pub fn update(&mut self, world: Option<&WorldMesh>, dt: f32) {
        self.update_at(world, dt, Instant::now());
    }

    /// Advance one frame with an explicit clock, the deterministic entry
    /// point used by the simulation registry and by tests.
    pub fn update_at(&mut self, world: Option<&WorldMesh>, dt: f32, now: Instant) {
        if dt <= 0.0 {
            return;
        }

        // 1. Behaviors rewrite their modifiers.
        {
            let mut ctl = ControlBlock {
                modifiers: &mut self.modifiers,
                mode: self.machine.mode(),
                ground: &self.ground,
                input: &self.input,
                config: &self.config,
                velocity: self.velocity,
                contact_normal: self.last_mtd.as_ref().map(|m| m.direction),
            };
            self.gravity.update(&mut ctl, dt);
            self.walk.update(&mut ctl, dt);
            self.jump.update(&mut ctl, dt);
            self.slide.update(&mut ctl, dt);
            self.air.update(&mut ctl, dt);
        }

        // 2. Fixed sub-steps: integrate, then depenetrate.
        let sub_dt = dt / INTEGRATION_STEPS as f32;
        let ready_world = world.filter(|w| w.is_ready());
        if world.is_some() && ready_world.is_none() {
            log::debug!("world mesh not ready; skipping collision resolution this frame");
        }

        self.depen_raw = Vec3::zeros();
        for _ in 0..INTEGRATION_STEPS {
            self.velocity = self.modifiers.sum();
            self.position += self.velocity * sub_dt;

            if let Some(w) = ready_world {
                let transform = Transform::new(self.position, self.rotation);
                match compute_penetration(w, &self.capsule, &transform, &mut self.scratch) {
                    Some(mtd) => {
                        let raw = mtd.translation();
                        self.depen_raw = raw;
                        self.position += clamp_residual(raw);
                        self.last_mtd = Some(mtd);
                    }
                    None => {
                        self.depen_raw = Vec3::zeros();
                    }
                }
            }
        }

        // 3. Classify ground contact from the final sub-step's correction.
        let transform = self.transform();
        self.ground = classify(
            world,
            &self.capsule,
            &transform,
            self.depen_raw,
            self.last_mtd.as_ref().map(|m| m.direction),
            self.velocity,
            sub_dt,
            &self.config.ground,
            &mut self.scratch,
        );

        // 4. Drive the mode machine (subject to its debounce lockout).
        if self.ground.sliding {
            self.machine.signal(MoveMode::Sliding, now);
        } else if self.ground.grounded {
            self.machine.signal(MoveMode::Walking, now);
        } else {
            self.machine.signal(MoveMode::Falling, now);
        }

        self.refresh_bounds();
    }

    /// Read-only snapshot for debug rendering.
    pub fn debug_snapshot(&self) -> DebugSnapshot {
        DebugSnapshot {
            segment: self.bounding_segment,
            radius: self.capsule.radius(),
            bounds: self.bounding_box,
            ground_normal: self.ground.normal,
            contact: self.last_mtd.as_ref().map(|m| m.point),
            grounded: self.ground.grounded,
            sliding: self.ground.sliding,
            near_ground: self.ground.near_ground,
            mode: self.machine.mode(),
        }
    }

    fn refresh_bounds(&mut self) {
        let transform = self.transform();
        self.capsule
            .world_segment(&transform, &mut self.bounding_segment);
        self.bounding_box = segment_aabb(
            &self.bounding_segment.a,
            &self.bounding_segment.b,
            self.capsule.radius().max(0.0),
        );
    }
}

/// Zero out correction components below the jitter tolerance.
#[inline]
fn clamp_residual(v: Vec3) -> Vec3 {
    Vec3::new(
        if v.x.abs() < TOLERANCE { 0.0 } else { v.x },
        if v.y.abs() < TOLERANCE { 0.0 } else { v.y },
        if v.z.abs() < TOLERANCE { 0.0 } else { v.z },
    )
}
