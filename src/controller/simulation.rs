/*!
Simulation world: the explicit character registry.

Owns the world mesh and a map from character id to character state, with
plain add/remove lifecycle calls. Iteration order is the id order
(`BTreeMap`), so stepping the world is deterministic regardless of insertion
history.

The mesh starts unready; characters added before the level finishes loading
simply integrate without collision until `set_world_mesh` installs the built
mesh.
*/

use std::collections::BTreeMap;
use std::time::Instant;

use crate::collision::WorldMesh;

use super::character::{Character, CharacterConfig, InputState};

/// Stable identifier of a registered character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharacterId(u64);

/// The simulation world: one static mesh, many kinematic characters.
pub struct Simulation {
    mesh: WorldMesh,
    characters: BTreeMap<CharacterId, Character>,
    next_id: u64,
}

impl Simulation {
    /// New world with an unready mesh.
    pub fn new() -> Self {
        Self {
            mesh: WorldMesh::new(),
            characters: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Install the built level mesh. Called once at level load.
    pub fn set_world_mesh(&mut self, mesh: WorldMesh) {
        self.mesh = mesh;
    }

    #[inline]
    pub fn world_mesh(&self) -> &WorldMesh {
        &self.mesh
    }

    /// Register a new character and return its id.
    pub fn add_character(&mut self, config: CharacterConfig) -> CharacterId {
        let id = CharacterId(self.next_id);
        self.next_id += 1;
        self.characters.insert(id, Character::new(config));
        id
    }

    /// Remove a character, returning its final state if it existed.
    pub fn remove_character(&mut self, id: CharacterId) -> Option<Character> {
        self.characters.remove(&id)
    }

    #[inline]
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    #[inline]
    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(&id)
    }

    /// Set a character's input for the coming frames. Returns false for
    /// unknown ids.
    pub fn set_input(&mut self, id: CharacterId, input: InputState) -> bool {
        match self.characters.get_mut(&id) {
            Some(character) => {
                character.set_input(input);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Step every character one frame against the wall clock.
    pub fn update(&mut self, dt: f32) {
        self.update_at(dt, Instant::now());
    }

    /// Step every character one frame with an explicit clock.
    pub fn update_at(&mut self, dt: f32, now: Instant) {
        for character in self.characters.values_mut() {
            character.update_at(Some(&self.mesh), dt, now);
        }
    }

    /// Iterate characters in id order.
    pub fn iter(&self) -> impl Iterator<Item = (CharacterId, &Character)> {
        self.characters.iter().map(|(id, c)| (*id, c))
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
