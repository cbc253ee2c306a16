/*!
Movement-mode state machine.

An explicit enum with guarded transitions, no FSM framework. Entering
`Walking` or `Falling` arms a 100ms lockout during which further transitions
are rejected; single-frame flickers in ground detection therefore cannot
bounce the mode back and forth. The lockout is a wall-clock deadline check
against the `Instant` handed in by the caller, which also makes the machine
fully deterministic under test.
*/

use std::time::Instant;

use crate::settings::MODE_DEBOUNCE;

/// Canonical movement modes. `Walking` covers standing still.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveMode {
    Walking,
    Falling,
    Sliding,
}

/// Debounced mode holder.
#[derive(Debug)]
pub struct ModeMachine {
    mode: MoveMode,
    locked_until: Option<Instant>,
}

impl ModeMachine {
    /// Characters spawn airborne until the classifier proves otherwise.
    pub fn new() -> Self {
        Self {
            mode: MoveMode::Falling,
            locked_until: None,
        }
    }

    #[inline]
    pub fn mode(&self) -> MoveMode {
        self.mode
    }

    /// True when the lockout from the last transition has expired.
    #[inline]
    pub fn is_ready(&self, now: Instant) -> bool {
        self.locked_until.is_none_or(|deadline| now >= deadline)
    }

    /// Request a transition to `target`. Returns whether it was honored.
    ///
    /// Re-signaling the current mode is a no-op and does not touch the
    /// lockout. Transitions into `Walking` and `Falling` arm the lockout;
    /// `Sliding` does not.
    pub fn signal(&mut self, target: MoveMode, now: Instant) -> bool {
        if target == self.mode {
            return false;
        }
        if !self.is_ready(now) {
            return false;
        }

        log::debug!("movement mode {:?} -> {:?}", self.mode, target);
        self.mode = target;
        self.locked_until = match target {
            MoveMode::Walking | MoveMode::Falling => Some(now + MODE_DEBOUNCE),
            MoveMode::Sliding => None,
        };
        true
    }
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn two_flips_inside_the_lockout_only_honor_the_first() {
        let mut machine = ModeMachine::new();
        let t0 = Instant::now();

        assert!(machine.signal(MoveMode::Walking, t0));
        assert_eq!(machine.mode(), MoveMode::Walking);

        // A flip 50ms later is still inside the lockout and is dropped.
        let t1 = t0 + Duration::from_millis(50);
        assert!(!machine.signal(MoveMode::Falling, t1));
        assert_eq!(machine.mode(), MoveMode::Walking);

        // After the lockout expires the next flip goes through.
        let t2 = t0 + Duration::from_millis(150);
        assert!(machine.signal(MoveMode::Falling, t2));
        assert_eq!(machine.mode(), MoveMode::Falling);
    }

    #[test]
    fn resignaling_the_current_mode_is_a_no_op() {
        let mut machine = ModeMachine::new();
        let t0 = Instant::now();

        assert!(!machine.signal(MoveMode::Falling, t0));
        assert_eq!(machine.mode(), MoveMode::Falling);
        // No lockout was armed by the no-op.
        assert!(machine.is_ready(t0));
    }

    #[test]
    fn sliding_transitions_do_not_arm_the_lockout() {
        let mut machine = ModeMachine::new();
        let t0 = Instant::now();

        // Falling -> Sliding is immediate and leaves the machine ready.
        assert!(machine.signal(MoveMode::Sliding, t0));
        assert!(machine.is_ready(t0));

        // Sliding -> Walking is allowed right away.
        assert!(machine.signal(MoveMode::Walking, t0));
        assert_eq!(machine.mode(), MoveMode::Walking);
        assert!(!machine.is_ready(t0 + Duration::from_millis(50)));
    }
}
