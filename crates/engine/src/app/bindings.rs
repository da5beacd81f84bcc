use crate::content::LaneSide;

use super::{InputLatch, KeyName, PlayerIntent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerControls {
    pub left: KeyName,
    pub right: KeyName,
    pub jump: KeyName,
}

impl PlayerControls {
    pub fn new(left: &str, right: &str, jump: &str) -> Self {
        Self {
            left: KeyName::new(left),
            right: KeyName::new(right),
            jump: KeyName::new(jump),
        }
    }

    pub fn intent(&self, latch: &InputLatch) -> PlayerIntent {
        let left = latch.is_held(&self.left);
        let right = latch.is_held(&self.right);
        let horizontal = match (left, right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        };
        PlayerIntent {
            horizontal,
            jump: latch.is_held(&self.jump),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    pub top: PlayerControls,
    pub bottom: PlayerControls,
    pub debug_overlay: KeyName,
    pub help_overlay: KeyName,
    pub return_to_title: KeyName,
    pub reload: KeyName,
    pub menu_up: KeyName,
    pub menu_down: KeyName,
    pub menu_confirm: KeyName,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            top: PlayerControls::new("a", "d", "w"),
            bottom: PlayerControls::new("ArrowLeft", "ArrowRight", "Space"),
            debug_overlay: KeyName::new("F3"),
            help_overlay: KeyName::new("h"),
            return_to_title: KeyName::new("Escape"),
            reload: KeyName::new("r"),
            menu_up: KeyName::new("ArrowUp"),
            menu_down: KeyName::new("ArrowDown"),
            menu_confirm: KeyName::new("Enter"),
        }
    }
}

impl KeyBindings {
    pub fn controls(&self, side: LaneSide) -> &PlayerControls {
        match side {
            LaneSide::Top => &self.top,
            LaneSide::Bottom => &self.bottom,
        }
    }

    pub fn toggle_keys(&self) -> [KeyName; 2] {
        [self.debug_overlay.clone(), self.help_overlay.clone()]
    }
}
