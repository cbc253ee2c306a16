/*!
Character controller root module.

- ground:     grounded/sliding/near-ground classification from probes
- state:      debounced movement-mode machine
- modifiers:  named velocity-modifier registry
- behaviors:  gravity/walk/jump/slide/air-collision modifier writers
- character:  per-character state + the per-frame integrator
- simulation: explicit character registry owning the world mesh
*/

pub mod behaviors;
pub mod character;
pub mod ground;
pub mod modifiers;
pub mod simulation;
pub mod state;

// Re-export the surface most callers need.
pub use behaviors::ControlBlock;
pub use character::{Character, CharacterConfig, InputState};
pub use ground::{GroundConfig, GroundState, classify};
pub use modifiers::{ModifierHandle, Modifiers};
pub use simulation::{CharacterId, Simulation};
pub use state::{ModeMachine, MoveMode};
