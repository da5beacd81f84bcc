use std::collections::{HashMap, HashSet};
use std::fmt;

use winit::keyboard::{Key, NamedKey};

const SPACE_KEY_NAME: &str = "Space";

/// Normalized key identity. Space is always tracked as `"Space"`, single
/// characters are lower-cased and named keys keep their canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyName(String);

impl KeyName {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref();
        if raw == " " || raw.eq_ignore_ascii_case(SPACE_KEY_NAME) {
            return Self(SPACE_KEY_NAME.to_string());
        }
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(single), None) => Self(single.to_lowercase().collect()),
            _ => Self(raw.to_string()),
        }
    }

    pub fn space() -> Self {
        Self(SPACE_KEY_NAME.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_logical(key: &Key) -> Option<Self> {
        match key {
            Key::Named(NamedKey::Space) => Some(Self::space()),
            Key::Named(named) => Some(Self(format!("{named:?}"))),
            Key::Character(text) => {
                let text = text.as_str();
                if text.is_empty() {
                    None
                } else {
                    Some(Self::new(text))
                }
            }
            _ => None,
        }
    }

    fn suppresses_default(&self) -> bool {
        matches!(self.as_str(), "ArrowLeft" | "ArrowRight" | SPACE_KEY_NAME)
    }

    pub fn disposition(&self) -> KeyDisposition {
        if self.suppresses_default() {
            KeyDisposition::SuppressDefault
        } else {
            KeyDisposition::PassThrough
        }
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Whether a key-down should be kept away from the host's default handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    PassThrough,
    SuppressDefault,
}

#[derive(Debug, Clone, Default)]
pub struct InputLatch {
    held: HashMap<KeyName, bool>,
    toggle_keys: HashSet<KeyName>,
    toggled: HashMap<KeyName, bool>,
}

impl InputLatch {
    pub fn with_toggle_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = KeyName>,
    {
        let mut latch = Self::default();
        for key in keys {
            latch.register_toggle(key);
        }
        latch
    }

    pub fn register_toggle(&mut self, key: KeyName) {
        self.held.remove(&key);
        self.toggled.entry(key.clone()).or_insert(false);
        self.toggle_keys.insert(key);
    }

    pub fn press(&mut self, key: &KeyName) -> KeyDisposition {
        if self.toggle_keys.contains(key) {
            let state = self.toggled.entry(key.clone()).or_insert(false);
            *state = !*state;
        } else {
            self.held.insert(key.clone(), true);
        }

        key.disposition()
    }

    pub fn release(&mut self, key: &KeyName) {
        if self.toggle_keys.contains(key) {
            return;
        }
        self.held.insert(key.clone(), false);
    }

    /// Drops every held key, e.g. when the window loses focus and key-up
    /// events would never arrive. Toggle state is left alone.
    pub fn release_all(&mut self) {
        for state in self.held.values_mut() {
            *state = false;
        }
    }

    pub fn is_held(&self, key: &KeyName) -> bool {
        self.held.get(key).copied().unwrap_or(false)
    }

    pub fn is_toggled(&self, key: &KeyName) -> bool {
        self.toggled.get(key).copied().unwrap_or(false)
    }

    pub fn is_toggle_key(&self, key: &KeyName) -> bool {
        self.toggle_keys.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use winit::keyboard::SmolStr;

    use super::*;

    fn key(name: &str) -> KeyName {
        KeyName::new(name)
    }

    #[test]
    fn regular_key_tracks_physical_state() {
        let mut latch = InputLatch::default();
        latch.press(&key("a"));
        assert!(latch.is_held(&key("a")));

        latch.release(&key("a"));
        assert!(!latch.is_held(&key("a")));
    }

    #[test]
    fn unknown_keys_read_as_released() {
        let latch = InputLatch::default();
        assert!(!latch.is_held(&key("q")));
        assert!(!latch.is_toggled(&key("F3")));
    }

    #[test]
    fn toggle_key_flips_on_press_and_ignores_release() {
        let mut latch = InputLatch::with_toggle_keys([key("F3")]);

        latch.press(&key("F3"));
        assert!(latch.is_toggled(&key("F3")));
        latch.release(&key("F3"));
        assert!(latch.is_toggled(&key("F3")));
        assert!(!latch.is_held(&key("F3")));
    }

    #[test]
    fn two_presses_without_release_restore_toggle() {
        let mut latch = InputLatch::with_toggle_keys([key("h")]);
        let before = latch.is_toggled(&key("h"));

        latch.press(&key("h"));
        latch.press(&key("h"));

        assert_eq!(latch.is_toggled(&key("h")), before);
    }

    #[test]
    fn toggle_key_never_reports_held() {
        let mut latch = InputLatch::default();
        latch.press(&key("h"));
        latch.register_toggle(key("h"));
        assert!(!latch.is_held(&key("h")));
        latch.press(&key("h"));
        assert!(!latch.is_held(&key("h")));
        assert!(latch.is_toggled(&key("h")));
    }

    #[test]
    fn arrows_and_space_suppress_default_action() {
        let mut latch = InputLatch::default();
        assert_eq!(
            latch.press(&key("ArrowLeft")),
            KeyDisposition::SuppressDefault
        );
        assert_eq!(
            latch.press(&key("ArrowRight")),
            KeyDisposition::SuppressDefault
        );
        assert_eq!(latch.press(&key(" ")), KeyDisposition::SuppressDefault);
        assert_eq!(latch.press(&key("ArrowUp")), KeyDisposition::PassThrough);
        assert_eq!(latch.press(&key("r")), KeyDisposition::PassThrough);
    }

    #[test]
    fn space_is_tracked_under_normalized_name() {
        let mut latch = InputLatch::default();
        latch.press(&key(" "));
        assert!(latch.is_held(&KeyName::space()));
        assert_eq!(KeyName::space().as_str(), "Space");
    }

    #[test]
    fn character_keys_are_case_insensitive() {
        assert_eq!(key("W"), key("w"));
        assert_eq!(key("ArrowLeft").as_str(), "ArrowLeft");
    }

    #[test]
    fn logical_keys_normalize_to_names() {
        assert_eq!(
            KeyName::from_logical(&Key::Named(NamedKey::Space)),
            Some(KeyName::space())
        );
        assert_eq!(
            KeyName::from_logical(&Key::Named(NamedKey::ArrowLeft)),
            Some(key("ArrowLeft"))
        );
        assert_eq!(
            KeyName::from_logical(&Key::Character(SmolStr::new("D"))),
            Some(key("d"))
        );
        assert_eq!(
            KeyName::from_logical(&Key::Character(SmolStr::new(" "))),
            Some(KeyName::space())
        );
    }

    #[test]
    fn release_all_clears_held_but_keeps_toggles() {
        let mut latch = InputLatch::with_toggle_keys([key("F3")]);
        latch.press(&key("a"));
        latch.press(&key("F3"));

        latch.release_all();

        assert!(!latch.is_held(&key("a")));
        assert!(latch.is_toggled(&key("F3")));
    }
}
