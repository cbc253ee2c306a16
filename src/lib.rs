/*!
Kinematic capsule character collision core.

A capsule character is swept and depenetrated against a static triangle-mesh
world held in a BVH. The crate covers the collision-resolution pipeline and
the movement loop around it:

- super-sampled swept capsule casts (CCD against thin geometry)
- a single-pose minimum-translation penetration solver
- ground/slope classification from depenetration evidence and probe casts
- a fixed-sub-step movement integrator with named velocity modifiers and a
  debounced movement-mode machine

Rendering, asset import, and input devices are out of scope; the crate
exposes plain numeric configuration on the way in and read-only debug
snapshots on the way out.

# Quick start

```
use capsule_kcc::{CharacterConfig, Point3, Simulation, Vec3, WorldMesh, quad};

let mut sim = Simulation::new();
sim.set_world_mesh(WorldMesh::from_triangles(
    quad(
        Point3::new(0.0, 0.0, 0.0),
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 10.0),
    )
    .to_vec(),
));

let id = sim.add_character(CharacterConfig::default());
sim.character_mut(id).unwrap().set_position(Vec3::new(0.0, 2.0, 0.0));
sim.update(1.0 / 60.0);
```
*/

pub mod collision;
pub mod controller;
pub mod debug;
pub mod settings;

pub use collision::{
    Capsule, HitInfo, Iso, Mtd, Point3, Quat, Scratch, Transform, Vec3, WorldMesh, capsule_cast,
    cast_steps, compute_penetration, quad,
};
pub use controller::{
    Character, CharacterConfig, CharacterId, GroundConfig, GroundState, InputState, ModeMachine,
    ModifierHandle, Modifiers, MoveMode, Simulation, classify,
};
pub use debug::DebugSnapshot;
