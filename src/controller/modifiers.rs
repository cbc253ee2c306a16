/*!
Named velocity modifiers.

Each gameplay behavior (gravity, walking, jumping, sliding, air collision)
registers one named 3-vector and updates only its own value once per frame;
the integrator sums whatever is currently registered into the frame's
velocity. An explicit slot registry replaces any kind of reactive
subscription: registration returns a handle, and the handle is the only way
to touch the value.

Using a handle after `unregister` is a programmer error and panics; expected
gameplay conditions never go through this path.
*/

use crate::collision::Vec3;

/// Handle to a registered modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModifierHandle(usize);

struct Slot {
    name: &'static str,
    value: Vec3,
    live: bool,
}

/// Registry of named velocity contributions.
#[derive(Default)]
pub struct Modifiers {
    slots: Vec<Slot>,
}

impl Modifiers {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register a named modifier with a zero value. Dead slots are reused.
    pub fn register(&mut self, name: &'static str) -> ModifierHandle {
        if let Some(idx) = self.slots.iter().position(|slot| !slot.live) {
            self.slots[idx] = Slot {
                name,
                value: Vec3::zeros(),
                live: true,
            };
            return ModifierHandle(idx);
        }
        self.slots.push(Slot {
            name,
            value: Vec3::zeros(),
            live: true,
        });
        ModifierHandle(self.slots.len() - 1)
    }

    /// Release a modifier. The handle must not be used afterwards.
    pub fn unregister(&mut self, handle: ModifierHandle) {
        let slot = self.live_slot_mut(handle);
        slot.live = false;
        slot.value = Vec3::zeros();
    }

    #[inline]
    pub fn set(&mut self, handle: ModifierHandle, value: Vec3) {
        self.live_slot_mut(handle).value = value;
    }

    #[inline]
    pub fn value(&self, handle: ModifierHandle) -> Vec3 {
        let slot = &self.slots[handle.0];
        assert!(slot.live, "modifier handle used after unregister");
        slot.value
    }

    /// Current value of a modifier by name, for debug surfaces.
    pub fn value_of(&self, name: &str) -> Option<Vec3> {
        self.slots
            .iter()
            .find(|slot| slot.live && slot.name == name)
            .map(|slot| slot.value)
    }

    /// Sum of all live modifier values.
    pub fn sum(&self) -> Vec3 {
        self.slots
            .iter()
            .filter(|slot| slot.live)
            .fold(Vec3::zeros(), |acc, slot| acc + slot.value)
    }

    fn live_slot_mut(&mut self, handle: ModifierHandle) -> &mut Slot {
        let slot = &mut self.slots[handle.0];
        assert!(slot.live, "modifier handle used after unregister");
        slot
    }
}
