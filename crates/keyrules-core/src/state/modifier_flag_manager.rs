// Keyrules Modifier Flag Manager
// Tracks which modifier flags are currently held

use strum::{EnumCount, IntoEnumIterator};

use crate::key::KeyCode;
use crate::modifier::{ModifierFlag, ModifierFlags, ModifierState};

/// Live modifier state fed by key events.
///
/// Presses are counted per flag because two devices can hold the same
/// modifier at once; a flag stays pressed until every press is released.
/// Caps lock additionally counts as pressed while its lock state is on.
#[derive(Debug, Default, Clone)]
pub struct ModifierFlagManager {
    counts: [u32; ModifierFlag::COUNT],
    caps_lock_locked: bool,
}

impl ModifierFlagManager {
    /// Create a manager with nothing held
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press of a modifier
    pub fn press(&mut self, flag: ModifierFlag) {
        self.counts[flag as usize] += 1;
    }

    /// Record a release of a modifier; extra releases are ignored
    pub fn release(&mut self, flag: ModifierFlag) {
        let count = &mut self.counts[flag as usize];
        *count = count.saturating_sub(1);
    }

    /// Update from a key event.
    ///
    /// Returns false when the key is not a modifier key.
    pub fn handle_key_code(&mut self, key_code: KeyCode, pressed: bool) -> bool {
        let Some(flag) = ModifierFlag::from_key_code(key_code) else {
            return false;
        };
        if pressed {
            self.press(flag);
        } else {
            self.release(flag);
        }
        true
    }

    /// Set the caps lock LED/lock state
    pub fn set_caps_lock_state(&mut self, locked: bool) {
        self.caps_lock_locked = locked;
    }

    pub fn caps_lock_locked(&self) -> bool {
        self.caps_lock_locked
    }

    /// Snapshot of every pressed flag
    pub fn pressed_flags(&self) -> ModifierFlags {
        ModifierFlag::iter().filter(|f| self.is_pressed(*f)).collect()
    }

    /// Forget all presses and the lock state
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl ModifierState for ModifierFlagManager {
    fn is_pressed(&self, flag: ModifierFlag) -> bool {
        if flag == ModifierFlag::CapsLock && self.caps_lock_locked {
            return true;
        }
        self.counts[flag as usize] > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_new() {
        let manager = ModifierFlagManager::new();
        assert!(manager.pressed_flags().is_empty());
        assert!(!manager.caps_lock_locked());
    }

    #[test]
    fn test_press_release_counts() {
        let mut manager = ModifierFlagManager::new();
        manager.press(ModifierFlag::LeftShift);
        manager.press(ModifierFlag::LeftShift);
        manager.release(ModifierFlag::LeftShift);
        assert!(manager.is_pressed(ModifierFlag::LeftShift));

        manager.release(ModifierFlag::LeftShift);
        assert!(!manager.is_pressed(ModifierFlag::LeftShift));

        // Unbalanced release must not underflow
        manager.release(ModifierFlag::LeftShift);
        manager.press(ModifierFlag::LeftShift);
        assert!(manager.is_pressed(ModifierFlag::LeftShift));
    }

    #[test]
    fn test_handle_key_code() {
        let mut manager = ModifierFlagManager::new();
        assert!(manager.handle_key_code(KeyCode(0xe7), true)); // right_command
        assert!(!manager.handle_key_code(KeyCode(0x04), true)); // a
        assert_eq!(
            manager.pressed_flags(),
            ModifierFlags::from([ModifierFlag::RightCommand])
        );

        manager.handle_key_code(KeyCode(0xe7), false);
        assert!(manager.pressed_flags().is_empty());
    }

    #[test]
    fn test_caps_lock_state() {
        let mut manager = ModifierFlagManager::new();
        manager.set_caps_lock_state(true);
        assert!(manager.is_pressed(ModifierFlag::CapsLock));

        manager.clear();
        assert!(!manager.is_pressed(ModifierFlag::CapsLock));
    }
}
