//! Scroll-to-scene mapping.
//!
//! One call per scroll update turns a progress value into the hero opacity,
//! camera pose, path reveal, card selection and closing visibility. State
//! that must persist between calls lives in [`SceneContext`].

use serde::Serialize;

use crate::camera::CameraPose;
use crate::config::SceneConfig;
use crate::context::{CardTransition, SceneContext};
use crate::curve::HeartCurve;
use crate::events::SceneEvent;
use crate::timeline::{Timeline, TimelineEntry};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollInput {
    /// Normalized scroll position.
    pub progress: f32,
    /// Seconds since the session's first reported instant.
    pub time: f32,
}

/// Everything derived from one scroll update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput {
    pub progress: f32,
    pub hero_opacity: f32,
    pub camera: CameraPose,
    pub path_draw_count: usize,
    pub active_card: Option<usize>,
    pub closing_visible: bool,
    pub fate_revealed: bool,
    /// Set when this update started a card's marker pulse.
    #[serde(skip)]
    pub pulsed_marker: Option<usize>,
    /// Events raised by this update. `Session::on_scroll` moves them into
    /// its queue, so hosts only ever receive them through `take_events`.
    #[serde(skip)]
    pub events: Vec<SceneEvent>,
}

/// Clamp into [0, 1]; NaN counts as the top of the page.
pub fn sanitize_progress(progress: f32) -> f32 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

/// `1 - progress / fade_end` until `fade_end`, then zero.
pub fn hero_opacity(progress: f32, fade_end: f32) -> f32 {
    if progress < fade_end {
        (1.0 - progress / fade_end).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Number of path samples to draw, never more than exist.
pub fn path_draw_count(progress: f32, lead: f32, sample_count: usize, available: usize) -> usize {
    let count = ((progress + lead) * sample_count as f32).floor().max(0.0) as usize;
    count.min(available)
}

/// First entry whose band contains `progress`.
pub fn match_card(progress: f32, entries: &[TimelineEntry], band: f32) -> Option<usize> {
    entries
        .iter()
        .find(|entry| (progress - entry.t).abs() < band)
        .map(|entry| entry.id)
}

pub struct ScrollMapper<'a> {
    pub config: &'a SceneConfig,
    pub curve: &'a HeartCurve,
    pub timeline: &'a Timeline,
    /// Total points in the rendered path.
    pub path_points: usize,
}

impl<'a> ScrollMapper<'a> {
    pub fn update(&self, ctx: &mut SceneContext, input: ScrollInput) -> FrameOutput {
        let progress = sanitize_progress(input.progress);
        let config = self.config;
        let mut events = Vec::new();
        let mut pulsed_marker = None;

        let camera = ctx.camera.update(self.curve, config, progress, input.time);

        let matched = match_card(progress, self.timeline.entries(), config.card_band);
        match ctx.select_card(matched) {
            Some(CardTransition::Show(id)) => {
                if let Some(entry) = self.timeline.get(id) {
                    log::debug!("Show card {} ({}) at progress {:.4}", id, entry.title, progress);
                    events.push(SceneEvent::ShowCard(entry.card_view(&config.media_dir)));
                    pulsed_marker = Some(id);
                }
            }
            Some(CardTransition::Hide) => {
                log::debug!("Hide card at progress {:.4}", progress);
                events.push(SceneEvent::HideCard);
            }
            None => {}
        }

        if let Some(visible) = ctx.drive_closing(progress > config.closing_threshold) {
            events.push(SceneEvent::ClosingSection { visible });
        }

        FrameOutput {
            progress,
            hero_opacity: hero_opacity(progress, config.hero_fade_end),
            camera,
            path_draw_count: path_draw_count(
                progress,
                config.path_reveal_lead,
                config.path_sample_count,
                self.path_points,
            ),
            active_card: ctx.active_card().id(),
            closing_visible: ctx.closing_visible(),
            fate_revealed: ctx.fate_revealed(),
            pulsed_marker,
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraRegime;
    use crate::timeline::TimelineRecord;

    struct Fixture {
        config: SceneConfig,
        curve: HeartCurve,
        timeline: Timeline,
        path_points: usize,
    }

    impl Fixture {
        fn new(entries: usize) -> Self {
            let config = SceneConfig::default();
            let curve = HeartCurve::new(config.curve_scale);
            let records = (0..entries)
                .map(|i| TimelineRecord {
                    title: format!("entry {}", i),
                    ..Default::default()
                })
                .collect();
            let timeline = Timeline::from_records(records, &config).unwrap();
            let path_points = curve.sample(config.path_sample_count).len();
            Self {
                config,
                curve,
                timeline,
                path_points,
            }
        }

        fn mapper(&self) -> ScrollMapper<'_> {
            ScrollMapper {
                config: &self.config,
                curve: &self.curve,
                timeline: &self.timeline,
                path_points: self.path_points,
            }
        }

        fn context(&self) -> SceneContext {
            SceneContext::new(self.config.camera_start)
        }
    }

    fn at(progress: f32) -> ScrollInput {
        ScrollInput { progress, time: 0.0 }
    }

    #[test]
    fn test_hero_opacity_bounds_and_monotonic() {
        let mut last = f32::INFINITY;
        for i in 0..=1000 {
            let p = i as f32 / 1000.0;
            let o = hero_opacity(p, 0.1);
            assert!((0.0..=1.0).contains(&o));
            if p <= 0.1 {
                assert!(o <= last);
            } else {
                assert_eq!(o, 0.0);
            }
            last = o;
        }
        assert_eq!(hero_opacity(0.0, 0.1), 1.0);
        assert!((hero_opacity(0.05, 0.1) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_path_draw_count_monotonic_and_bounded() {
        let mut last = 0;
        for i in 0..=1000 {
            let p = i as f32 / 1000.0;
            let n = path_draw_count(p, 0.05, 1000, 1001);
            assert!(n >= last);
            assert!(n <= 1001);
            last = n;
        }
        assert_eq!(path_draw_count(0.0, 0.05, 1000, 1001), 50);
        assert_eq!(path_draw_count(1.0, 0.05, 1000, 1001), 1001);
    }

    #[test]
    fn test_regime_follows_threshold() {
        let fx = Fixture::new(3);
        let mapper = fx.mapper();
        let mut ctx = fx.context();
        assert_eq!(mapper.update(&mut ctx, at(0.9199)).camera.regime, CameraRegime::Traveling);
        assert_eq!(mapper.update(&mut ctx, at(0.92)).camera.regime, CameraRegime::Arriving);
    }

    #[test]
    fn test_card_band_crossing_fires_once() {
        let fx = Fixture::new(3);
        let mapper = fx.mapper();
        let mut ctx = fx.context();
        let t = fx.timeline.entries()[1].t;

        let mut shows = 0;
        let mut hides = 0;
        // Enter the band, wander inside it twice, then leave.
        let sweep = [t - 0.06, t - 0.03, t, t + 0.03, t - 0.02, t + 0.035, t + 0.06];
        for p in sweep {
            for event in mapper.update(&mut ctx, at(p)).events {
                match event {
                    SceneEvent::ShowCard(view) => {
                        assert_eq!(view.id, 1);
                        shows += 1;
                    }
                    SceneEvent::HideCard => hides += 1,
                    _ => {}
                }
            }
        }
        assert_eq!(shows, 1);
        assert_eq!(hides, 1);
    }

    #[test]
    fn test_at_most_one_active_card() {
        let fx = Fixture::new(9);
        for i in 0..=1000 {
            let p = i as f32 / 1000.0;
            let active = fx
                .timeline
                .entries()
                .iter()
                .filter(|e| (p - e.t).abs() < fx.config.card_band)
                .count();
            assert!(active <= 1, "progress {} activates {} cards", p, active);
        }
    }

    #[test]
    fn test_overlapping_bands_first_match_wins() {
        let fx = Fixture::new(12);
        let entries = fx.timeline.entries();
        // Midway between entries 3 and 4 both bands match.
        let p = (entries[3].t + entries[4].t) / 2.0;
        assert_eq!(match_card(p, entries, fx.config.card_band), Some(3));
    }

    #[test]
    fn test_moving_between_cards_shows_next_without_hide() {
        let fx = Fixture::new(12);
        let mapper = fx.mapper();
        let mut ctx = fx.context();
        let entries = fx.timeline.entries();

        mapper.update(&mut ctx, at(entries[3].t));
        let out = mapper.update(&mut ctx, at(entries[4].t));
        assert_eq!(out.events.len(), 1);
        assert!(matches!(&out.events[0], SceneEvent::ShowCard(v) if v.id == 4));
        assert_eq!(out.pulsed_marker, Some(4));
    }

    #[test]
    fn test_closing_section_toggles_on_threshold() {
        let fx = Fixture::new(3);
        let mapper = fx.mapper();
        let mut ctx = fx.context();

        assert!(!mapper.update(&mut ctx, at(0.95)).closing_visible);
        let out = mapper.update(&mut ctx, at(0.951));
        assert!(out.closing_visible);
        assert_eq!(out.events, vec![SceneEvent::ClosingSection { visible: true }]);
        let out = mapper.update(&mut ctx, at(0.94));
        assert_eq!(out.events, vec![SceneEvent::ClosingSection { visible: false }]);
    }

    #[test]
    fn test_latch_freezes_closing_section() {
        let fx = Fixture::new(3);
        let mapper = fx.mapper();
        let mut ctx = fx.context();

        mapper.update(&mut ctx, at(0.97));
        ctx.reveal_fate();
        for p in [0.9, 0.99, 0.9, 0.99] {
            let out = mapper.update(&mut ctx, at(p));
            assert!(!out.closing_visible);
            assert!(out.events.is_empty());
        }

        ctx.replay();
        assert!(mapper.update(&mut ctx, at(0.99)).closing_visible);
    }

    #[test]
    fn test_out_of_range_progress_is_clamped() {
        let fx = Fixture::new(3);
        let mapper = fx.mapper();
        let mut ctx = fx.context();
        assert_eq!(mapper.update(&mut ctx, at(1.5)).progress, 1.0);
        assert_eq!(mapper.update(&mut ctx, at(-0.2)).progress, 0.0);
        assert_eq!(mapper.update(&mut ctx, at(f32::NAN)).progress, 0.0);
    }
}
