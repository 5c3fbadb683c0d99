//! CooldownGate: per-key throttle shared by the click, swipe and navigation paths.

use std::collections::HashMap;
use std::time::Duration;

/// Key for pinch clicks.
pub const CLICK: &str = "click";
/// Key for swipe navigation and any other discrete gesture action.
pub const NAVIGATE: &str = "navigate";

/// Remembers the last time each action key fired.
#[derive(Debug, Default, Clone)]
pub struct CooldownGate {
    last_fire: HashMap<String, Duration>,
}

impl CooldownGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `key` may fire at `now`, and records `now` as its
    /// last-fire time. A key that has never fired is always allowed.
    ///
    /// The elapsed time must be strictly greater than `window`.
    pub fn allow(&mut self, key: &str, window: Duration, now: Duration) -> bool {
        if let Some(&last) = self.last_fire.get(key) {
            if now.saturating_sub(last) <= window {
                return false;
            }
        }
        self.last_fire.insert(key.to_string(), now);
        true
    }

    /// Last recorded fire time for `key`, if any.
    pub fn last_fire(&self, key: &str) -> Option<Duration> {
        self.last_fire.get(key).copied()
    }

    pub fn reset(&mut self) {
        self.last_fire.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn first_fire_is_allowed() {
        let mut gate = CooldownGate::new();
        assert!(gate.allow(CLICK, ms(500), ms(0)));
        assert_eq!(gate.last_fire(CLICK), Some(ms(0)));
    }

    #[test]
    fn blocks_inside_window_and_does_not_record() {
        let mut gate = CooldownGate::new();
        assert!(gate.allow(CLICK, ms(500), ms(1_000)));
        assert!(!gate.allow(CLICK, ms(500), ms(1_300)));
        // A rejected attempt must not push the window forward.
        assert_eq!(gate.last_fire(CLICK), Some(ms(1_000)));
        assert!(gate.allow(CLICK, ms(500), ms(1_501)));
    }

    #[test]
    fn window_boundary_is_exclusive() {
        let mut gate = CooldownGate::new();
        assert!(gate.allow(NAVIGATE, ms(800), ms(0)));
        assert!(!gate.allow(NAVIGATE, ms(800), ms(800)));
        assert!(gate.allow(NAVIGATE, ms(800), ms(801)));
    }

    #[test]
    fn keys_are_independent() {
        let mut gate = CooldownGate::new();
        assert!(gate.allow(CLICK, ms(500), ms(0)));
        assert!(gate.allow(NAVIGATE, ms(800), ms(10)));
        assert!(!gate.allow(CLICK, ms(500), ms(20)));
    }

    #[test]
    fn reset_forgets_history() {
        let mut gate = CooldownGate::new();
        assert!(gate.allow(CLICK, ms(500), ms(0)));
        gate.reset();
        assert!(gate.allow(CLICK, ms(500), ms(1)));
    }
}
