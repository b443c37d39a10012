//! Mutable scene state carried between scroll updates.
//!
//! The host owns one `SceneContext` and hands it to the mapper on every
//! update. All changes go through the transition methods below.

use glam::Vec3;

use crate::camera::CameraRig;

/// The timeline card currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveCard {
    #[default]
    None,
    Entry(usize),
}

impl ActiveCard {
    pub fn id(self) -> Option<usize> {
        match self {
            ActiveCard::None => None,
            ActiveCard::Entry(id) => Some(id),
        }
    }
}

/// A card change produced by a selection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTransition {
    Show(usize),
    Hide,
}

#[derive(Debug, Clone)]
pub struct SceneContext {
    pub camera: CameraRig,
    active_card: ActiveCard,
    fate_revealed: bool,
    closing_visible: bool,
}

impl SceneContext {
    pub fn new(camera_start: Vec3) -> Self {
        Self {
            camera: CameraRig::new(camera_start),
            active_card: ActiveCard::None,
            fate_revealed: false,
            closing_visible: false,
        }
    }

    pub fn active_card(&self) -> ActiveCard {
        self.active_card
    }

    pub fn fate_revealed(&self) -> bool {
        self.fate_revealed
    }

    pub fn closing_visible(&self) -> bool {
        self.closing_visible
    }

    /// Move the active card to `matched`, reporting a change only when it differs.
    pub fn select_card(&mut self, matched: Option<usize>) -> Option<CardTransition> {
        match (self.active_card, matched) {
            (ActiveCard::Entry(current), Some(id)) if current == id => None,
            (_, Some(id)) => {
                self.active_card = ActiveCard::Entry(id);
                Some(CardTransition::Show(id))
            }
            (ActiveCard::Entry(_), None) => {
                self.active_card = ActiveCard::None;
                Some(CardTransition::Hide)
            }
            (ActiveCard::None, None) => None,
        }
    }

    /// Progress-driven closing visibility. Returns the new value if it changed.
    ///
    /// Frozen while the fate latch is set.
    pub fn drive_closing(&mut self, wanted: bool) -> Option<bool> {
        if self.fate_revealed || self.closing_visible == wanted {
            return None;
        }
        self.closing_visible = wanted;
        Some(wanted)
    }

    /// Set the latch and hide the closing section. Returns false if already set.
    pub fn reveal_fate(&mut self) -> bool {
        if self.fate_revealed {
            return false;
        }
        self.fate_revealed = true;
        self.closing_visible = false;
        true
    }

    /// Clear the latch so progress drives the closing section again.
    pub fn replay(&mut self) -> bool {
        let was_set = self.fate_revealed;
        self.fate_revealed = false;
        was_set
    }
}
