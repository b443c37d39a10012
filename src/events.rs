//! Side effects for the page to apply.
//!
//! The engine never touches the DOM or the audio element. It queues these
//! events and the host drains and applies them.

use serde::Serialize;

use crate::timeline::CardView;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneEvent {
    /// Fill the card panel with an entry and make it active.
    ShowCard(CardView),
    HideCard,
    ClosingSection { visible: bool },
    EndMessage { visible: bool },
    LoaderFadeOut { duration: f32 },
    LoaderHidden,
    HeroFadeIn { duration: f32 },
    /// Smooth-scroll the page to a progress value.
    ScrollTo { progress: f32, duration: f32 },
    PlayAudio { src: String, volume: f32, looped: bool },
    PauseAudio,
}
