//! Key-state set polled once per frame
//!
//! Event handlers flip entries as keys go down and up; the game loop reads
//! the set before each update.

/// Logical keys used by both demos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Launch,
    Escape,
    /// Toggle autopilot
    Idle,
}

impl Key {
    pub const COUNT: usize = 7;

    fn index(self) -> usize {
        match self {
            Key::Left => 0,
            Key::Right => 1,
            Key::Up => 2,
            Key::Down => 3,
            Key::Launch => 4,
            Key::Escape => 5,
            Key::Idle => 6,
        }
    }

    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "a" | "A" | "ArrowLeft" => Some(Key::Left),
            "d" | "D" | "ArrowRight" => Some(Key::Right),
            "w" | "W" | "ArrowUp" => Some(Key::Up),
            "s" | "S" | "ArrowDown" => Some(Key::Down),
            " " | "Spacebar" => Some(Key::Launch),
            "Escape" => Some(Key::Escape),
            "i" | "I" => Some(Key::Idle),
            _ => None,
        }
    }
}

/// What happened to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Repeat,
    Release,
}

/// Currently pressed keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keys {
    down: [bool; Key::COUNT],
}

impl Keys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.down[key.index()]
    }

    pub fn set(&mut self, key: Key, down: bool) {
        self.down[key.index()] = down;
    }

    /// Record a key event
    pub fn apply(&mut self, key: Key, action: KeyAction) {
        self.set(key, action != KeyAction::Release);
    }

    /// Release everything (focus lost)
    pub fn clear(&mut self) {
        self.down = [false; Key::COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_key_mapping() {
        assert_eq!(Key::from_dom_key("a"), Some(Key::Left));
        assert_eq!(Key::from_dom_key("ArrowRight"), Some(Key::Right));
        assert_eq!(Key::from_dom_key(" "), Some(Key::Launch));
        assert_eq!(Key::from_dom_key("Escape"), Some(Key::Escape));
        assert_eq!(Key::from_dom_key("q"), None);
    }

    #[test]
    fn test_press_and_release() {
        let mut keys = Keys::new();
        keys.apply(Key::Left, KeyAction::Press);
        assert!(keys.is_down(Key::Left));
        assert!(!keys.is_down(Key::Right));
        keys.apply(Key::Left, KeyAction::Repeat);
        assert!(keys.is_down(Key::Left));
        keys.apply(Key::Left, KeyAction::Release);
        assert!(!keys.is_down(Key::Left));
    }

    #[test]
    fn test_clear() {
        let mut keys = Keys::new();
        keys.set(Key::Launch, true);
        keys.set(Key::Right, true);
        keys.clear();
        assert_eq!(keys, Keys::new());
    }
}
