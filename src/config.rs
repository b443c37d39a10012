//! Scene tuning constants.
//!
//! Every magic number the scroll mapping depends on lives here, with the
//! reference values as defaults. A config file only needs to name the fields
//! it overrides.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::easing::EasingFunction;

/// Progress at which the camera leaves the curve and heads for the terminal point.
pub const ARRIVAL_THRESHOLD: f32 = 0.92;
/// Progress above which the closing section is shown.
pub const CLOSING_THRESHOLD: f32 = 0.95;
/// Half-width of the progress band around an entry's `t` that activates its card.
pub const CARD_BAND: f32 = 0.04;
/// Number of divisions used when sampling the rendered path.
pub const PATH_SAMPLE_COUNT: usize = 1000;
/// Upper bound on path samples accepted from a config file.
pub const MAX_PATH_SAMPLES: usize = 100_000;
/// Upper bound on any single particle layer or burst.
pub const MAX_PARTICLES: usize = 200_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Material parameters the renderer applies to a whole layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    /// Point size, or line width for the path.
    pub size: f32,
    pub opacity: f32,
    /// Packed `0xRRGGBB` colour.
    pub color: u32,
}

/// Scene-wide look handed to the renderer in one piece.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneStyle {
    pub background_color: u32,
    /// Exponential-squared fog density.
    pub fog_density: f32,
    pub path: LayerStyle,
    pub drift: LayerStyle,
    pub stars: LayerStyle,
    pub sparkles: LayerStyle,
}

/// Parameters of a single particle burst.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstSpec {
    pub origin: Vec3,
    pub count: usize,
    pub spread: f32,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    // Curve
    pub curve_scale: f32,
    pub path_sample_count: usize,
    pub look_ahead: f32,

    // Timeline placement
    pub timeline_start: f32,
    pub timeline_span: f32,
    pub card_band: f32,

    // Camera
    pub camera_start: Vec3,
    pub arrival_threshold: f32,
    pub terminal_point: Vec3,
    pub travel_smoothing: f32,
    pub arrival_smoothing: f32,
    pub sway_amplitude: f32,
    pub roll_factor: f32,

    // Sections
    pub hero_fade_end: f32,
    pub path_reveal_lead: f32,
    pub closing_threshold: f32,

    // Markers
    pub marker_scale: f32,
    pub marker_pulse_scale: f32,
    pub marker_pulse_secs: f32,
    pub marker_color: u32,
    pub marker_pulse_easing: EasingFunction,

    // Effects
    pub start_burst: BurstSpec,
    pub reveal_burst: BurstSpec,
    pub burst_step: f32,
    pub burst_speed: f32,
    pub burst_color: u32,

    // Ambient layers
    pub drift_count: usize,
    pub drift_extent: f32,
    /// Per-frame upward speed range of drifting particles.
    pub drift_rise: [f32; 2],
    pub drift_sway: f32,
    pub star_count: usize,
    pub star_extent: f32,
    pub sparkle_count: usize,
    pub sparkle_extent: f32,
    pub star_rotation_speed: f32,

    // Styles
    pub background_color: u32,
    pub fog_density: f32,
    pub path_style: LayerStyle,
    pub drift_style: LayerStyle,
    pub star_style: LayerStyle,
    pub sparkle_style: LayerStyle,

    // Intro / outro timings (seconds)
    pub loader_fade_secs: f32,
    pub hero_fade_in_secs: f32,
    pub replay_scroll_secs: f32,

    // Audio
    pub audio_src: String,
    pub audio_volume: f32,

    /// Directory card media paths are resolved against.
    pub media_dir: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            curve_scale: 18.0,
            path_sample_count: PATH_SAMPLE_COUNT,
            look_ahead: 0.02,

            timeline_start: 0.12,
            timeline_span: 0.75,
            card_band: CARD_BAND,

            camera_start: Vec3::new(0.0, 0.0, 5.0),
            arrival_threshold: ARRIVAL_THRESHOLD,
            terminal_point: Vec3::new(0.0, 0.0, 45.0),
            travel_smoothing: 0.1,
            arrival_smoothing: 0.05,
            sway_amplitude: 0.3,
            roll_factor: std::f32::consts::PI * 0.1,

            hero_fade_end: 0.1,
            path_reveal_lead: 0.05,
            closing_threshold: CLOSING_THRESHOLD,

            marker_scale: 1.5,
            marker_pulse_scale: 3.0,
            marker_pulse_secs: 1.0,
            marker_color: 0xff1493,
            marker_pulse_easing: EasingFunction::QuadraticOut,

            start_burst: BurstSpec {
                origin: Vec3::new(0.0, 0.0, 5.0),
                count: 500,
                spread: 2.0,
                size: 0.4,
            },
            reveal_burst: BurstSpec {
                origin: Vec3::new(0.0, 0.0, 38.0),
                count: 2000,
                spread: 5.0,
                size: 0.4,
            },
            burst_step: 0.01,
            burst_speed: 0.1,
            burst_color: 0xff1493,

            drift_count: 1500,
            drift_extent: 200.0,
            drift_rise: [0.01, 0.03],
            drift_sway: 0.02,
            star_count: 6000,
            star_extent: 400.0,
            sparkle_count: 4000,
            sparkle_extent: 300.0,
            star_rotation_speed: 0.01,

            background_color: 0x05050a,
            fog_density: 0.002,
            path_style: LayerStyle {
                size: 2.0,
                opacity: 0.6,
                color: 0xff69b4,
            },
            drift_style: LayerStyle {
                size: 0.35,
                opacity: 0.6,
                color: 0xff69b4,
            },
            star_style: LayerStyle {
                size: 0.15,
                opacity: 0.8,
                color: 0xffffff,
            },
            sparkle_style: LayerStyle {
                size: 0.08,
                opacity: 0.6,
                color: 0xffffff,
            },

            loader_fade_secs: 1.0,
            hero_fade_in_secs: 2.0,
            replay_scroll_secs: 3.0,

            audio_src: "assets/music.mp3".to_string(),
            audio_volume: 0.5,

            media_dir: "assets/images".to_string(),
        }
    }
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn scene_style(&self) -> SceneStyle {
        SceneStyle {
            background_color: self.background_color,
            fog_density: self.fog_density,
            path: self.path_style,
            drift: self.drift_style,
            stars: self.star_style,
            sparkles: self.sparkle_style,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Reject values the mapper cannot work with.
    ///
    /// Every float must be finite; JSON numbers beyond `f32::MAX` parse to
    /// infinity and would poison the camera state.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Curve
        check_positive("curve_scale", self.curve_scale)?;
        check_count("path_sample_count", self.path_sample_count, 1, MAX_PATH_SAMPLES)?;
        check_unit("look_ahead", self.look_ahead)?;

        // Timeline placement
        check_unit("timeline_start", self.timeline_start)?;
        check_positive("timeline_span", self.timeline_span)?;
        if self.timeline_start + self.timeline_span > 1.0 {
            return Err(ConfigError::Invalid {
                field: "timeline_span",
                reason: format!(
                    "timeline_start + timeline_span = {} exceeds 1",
                    self.timeline_start + self.timeline_span
                ),
            });
        }
        if !(self.card_band > 0.0 && self.card_band < 0.5) {
            return Err(ConfigError::Invalid {
                field: "card_band",
                reason: format!("{} is not in (0, 0.5)", self.card_band),
            });
        }

        // Camera
        check_vec3("camera_start", self.camera_start)?;
        check_unit("arrival_threshold", self.arrival_threshold)?;
        check_vec3("terminal_point", self.terminal_point)?;
        check_unit("travel_smoothing", self.travel_smoothing)?;
        check_unit("arrival_smoothing", self.arrival_smoothing)?;
        check_non_negative("sway_amplitude", self.sway_amplitude)?;
        check_finite("roll_factor", self.roll_factor)?;

        // Sections
        if !(self.hero_fade_end > 0.0 && self.hero_fade_end <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "hero_fade_end",
                reason: format!("{} is not in (0, 1]", self.hero_fade_end),
            });
        }
        check_unit("path_reveal_lead", self.path_reveal_lead)?;
        check_unit("closing_threshold", self.closing_threshold)?;

        // Markers
        check_positive("marker_scale", self.marker_scale)?;
        check_positive("marker_pulse_scale", self.marker_pulse_scale)?;
        check_positive("marker_pulse_secs", self.marker_pulse_secs)?;
        check_color("marker_color", self.marker_color)?;

        // Effects
        check_burst("start_burst", &self.start_burst)?;
        check_burst("reveal_burst", &self.reveal_burst)?;
        check_positive("burst_step", self.burst_step)?;
        if self.burst_step > 1.0 {
            return Err(ConfigError::Invalid {
                field: "burst_step",
                reason: format!("{} would end a burst before its first step", self.burst_step),
            });
        }
        check_non_negative("burst_speed", self.burst_speed)?;
        check_color("burst_color", self.burst_color)?;

        // Ambient layers
        check_count("drift_count", self.drift_count, 0, MAX_PARTICLES)?;
        check_positive("drift_extent", self.drift_extent)?;
        let [rise_min, rise_max] = self.drift_rise;
        check_non_negative("drift_rise", rise_min)?;
        check_non_negative("drift_rise", rise_max)?;
        if rise_min > rise_max {
            return Err(ConfigError::Invalid {
                field: "drift_rise",
                reason: format!("min {} is above max {}", rise_min, rise_max),
            });
        }
        check_non_negative("drift_sway", self.drift_sway)?;
        check_count("star_count", self.star_count, 0, MAX_PARTICLES)?;
        check_positive("star_extent", self.star_extent)?;
        check_count("sparkle_count", self.sparkle_count, 0, MAX_PARTICLES)?;
        check_positive("sparkle_extent", self.sparkle_extent)?;
        check_finite("star_rotation_speed", self.star_rotation_speed)?;

        // Styles
        check_color("background_color", self.background_color)?;
        check_non_negative("fog_density", self.fog_density)?;
        check_style("path_style", &self.path_style)?;
        check_style("drift_style", &self.drift_style)?;
        check_style("star_style", &self.star_style)?;
        check_style("sparkle_style", &self.sparkle_style)?;

        // Timings
        check_non_negative("loader_fade_secs", self.loader_fade_secs)?;
        check_non_negative("hero_fade_in_secs", self.hero_fade_in_secs)?;
        check_non_negative("replay_scroll_secs", self.replay_scroll_secs)?;

        check_unit("audio_volume", self.audio_volume)?;
        Ok(())
    }

    /// Smallest distance between neighbouring entry `t` values for `count` entries.
    pub fn entry_spacing(&self, count: usize) -> f32 {
        if count == 0 {
            return self.timeline_span;
        }
        self.timeline_span / count as f32
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn check_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is not in [0, 1]", value)))
    }
}

fn check_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is not finite", value)))
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is not positive", value)))
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is negative", value)))
    }
}

fn check_vec3(field: &'static str, value: Vec3) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is not finite", value)))
    }
}

fn check_count(field: &'static str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is not in [{}, {}]", value, min, max)))
    }
}

fn check_color(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value <= 0xffffff {
        Ok(())
    } else {
        Err(invalid(field, format!("{:#x} is not a 0xRRGGBB colour", value)))
    }
}

fn check_style(field: &'static str, style: &LayerStyle) -> Result<(), ConfigError> {
    check_non_negative(field, style.size)?;
    check_unit(field, style.opacity)?;
    check_color(field, style.color)
}

fn check_burst(field: &'static str, burst: &BurstSpec) -> Result<(), ConfigError> {
    check_vec3(field, burst.origin)?;
    check_count(field, burst.count, 0, MAX_PARTICLES)?;
    check_non_negative(field, burst.spread)?;
    check_positive(field, burst.size)
}

/// Split a packed `0xRRGGBB` colour into linear RGBA components.
pub fn color_to_rgba(color: u32, alpha: f32) -> [f32; 4] {
    [
        ((color >> 16) & 0xff) as f32 / 255.0,
        ((color >> 8) & 0xff) as f32 / 255.0,
        (color & 0xff) as f32 / 255.0,
        alpha,
    ]
}
