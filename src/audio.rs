//! Background music control.
//!
//! Browsers reject playback that does not follow a user gesture, so nothing
//! plays until the start action. A rejected play request leaves the track
//! `Blocked` until the user toggles it.

use serde::Serialize;

use crate::events::SceneEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Not yet started by the user.
    #[default]
    Idle,
    Playing,
    Paused,
    /// The host refused a play request.
    Blocked,
}

#[derive(Debug, Clone)]
pub struct AudioControl {
    src: String,
    volume: f32,
    state: PlaybackState,
}

impl AudioControl {
    pub fn new(src: impl Into<String>, volume: f32) -> Self {
        Self {
            src: src.into(),
            volume: volume.clamp(0.0, 1.0),
            state: PlaybackState::Idle,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    fn play(&mut self) -> SceneEvent {
        self.state = PlaybackState::Playing;
        SceneEvent::PlayAudio {
            src: self.src.clone(),
            volume: self.volume,
            looped: true,
        }
    }

    /// First playback after the start action.
    pub fn start(&mut self) -> Option<SceneEvent> {
        match self.state {
            PlaybackState::Playing => None,
            _ => Some(self.play()),
        }
    }

    /// User toggle. Does nothing before the track was started.
    pub fn toggle(&mut self) -> Option<SceneEvent> {
        match self.state {
            PlaybackState::Idle => None,
            PlaybackState::Playing => {
                self.state = PlaybackState::Paused;
                Some(SceneEvent::PauseAudio)
            }
            PlaybackState::Paused | PlaybackState::Blocked => Some(self.play()),
        }
    }

    pub fn playback_rejected(&mut self, reason: &str) {
        log::info!("Audio autoplay prevented: {}", reason);
        self.state = PlaybackState::Blocked;
    }
}
