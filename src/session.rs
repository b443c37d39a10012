//! The host-owned scene session.
//!
//! A `Session` owns every piece of scene state. Hosts feed it scroll updates,
//! render ticks and user actions, then drain the queued [`SceneEvent`]s and
//! read the buffers they need for drawing. Events reach the host only
//! through [`Session::take_events`].

use glam::{Mat4, Vec3};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::audio::AudioControl;
use crate::camera::{CameraPose, CameraRegime};
use crate::config::{BurstSpec, SceneConfig};
use crate::context::SceneContext;
use crate::curve::HeartCurve;
use crate::drift::DriftLayer;
use crate::events::SceneEvent;
use crate::mapper::{FrameOutput, ScrollInput, ScrollMapper};
use crate::markers::MarkerSet;
use crate::particle::{BurstList, BurstMotion};
use crate::starfield::Starfield;
use crate::timeline::Timeline;

/// Discrete user actions from the page's buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    RevealFate,
    Replay,
    ToggleAudio,
}

/// Loader → hero sequence run by the start action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intro {
    Waiting,
    FadingLoader { remaining: f32 },
    Started,
}

/// Host wall-clock seconds narrowed to scene time.
///
/// Hosts report epoch seconds (around 1.7e9), where an `f32` only resolves
/// steps of 128 s. Scene time counts from the first reported instant and
/// deltas are taken in `f64`.
#[derive(Debug, Clone, Copy, Default)]
struct SceneClock {
    origin: Option<f64>,
    last_tick: Option<f64>,
}

impl SceneClock {
    fn scene_time(&mut self, time: f64) -> f32 {
        let origin = *self.origin.get_or_insert(time);
        (time - origin) as f32
    }

    fn tick_delta(&mut self, time: f64) -> f32 {
        let dt = match self.last_tick {
            Some(last) => (time - last).max(0.0),
            None => 0.0,
        };
        self.last_tick = Some(time);
        dt as f32
    }
}

pub struct Session {
    config: SceneConfig,
    curve: HeartCurve,
    path: Vec<Vec3>,
    timeline: Timeline,
    markers: MarkerSet,
    context: SceneContext,
    camera: CameraPose,
    drift: DriftLayer,
    starfield: Starfield,
    bursts: BurstList,
    audio: AudioControl,
    intro: Intro,
    rng: SmallRng,
    events: Vec<SceneEvent>,
    clock: SceneClock,
}

impl Session {
    pub fn new(config: SceneConfig, timeline: Timeline, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let curve = HeartCurve::new(config.curve_scale);
        let path = curve.sample(config.path_sample_count);
        let markers = MarkerSet::new(&timeline, &curve, &config);
        let drift = DriftLayer::new(&config, &mut rng);
        let starfield = Starfield::new(&config, &mut rng);
        let audio = AudioControl::new(config.audio_src.clone(), config.audio_volume);
        let context = SceneContext::new(config.camera_start);
        let camera = CameraPose {
            position: config.camera_start,
            look_at: curve.tangent_target(0.0, config.look_ahead),
            roll: 0.0,
            regime: CameraRegime::Traveling,
        };

        log::info!(
            "Session ready: {} timeline entries, {} path points, curve length {:.1}",
            timeline.len(),
            path.len(),
            curve.length()
        );

        Self {
            config,
            curve,
            path,
            timeline,
            markers,
            context,
            camera,
            drift,
            starfield,
            bursts: BurstList::new(),
            audio,
            intro: Intro::Waiting,
            rng,
            events: Vec::new(),
            clock: SceneClock::default(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn curve(&self) -> &HeartCurve {
        &self.curve
    }

    /// Points of the rendered path line.
    pub fn path(&self) -> &[Vec3] {
        &self.path
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn context(&self) -> &SceneContext {
        &self.context
    }

    /// Camera pose from the latest scroll update.
    pub fn camera(&self) -> &CameraPose {
        &self.camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    pub fn drift(&self) -> &DriftLayer {
        &self.drift
    }

    pub fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub fn bursts(&self) -> &BurstList {
        &self.bursts
    }

    pub fn audio(&self) -> &AudioControl {
        &self.audio
    }

    pub fn intro(&self) -> Intro {
        self.intro
    }

    /// Swap in a timeline that arrived after startup.
    pub fn set_timeline(&mut self, timeline: Timeline) {
        if self.context.select_card(None).is_some() {
            self.events.push(SceneEvent::HideCard);
        }
        self.markers = MarkerSet::new(&timeline, &self.curve, &self.config);
        self.timeline = timeline;
    }

    /// Scroll callback: map progress to scene state.
    ///
    /// `time` is host wall-clock seconds. The returned output carries no
    /// events; they are queued for [`Session::take_events`].
    pub fn on_scroll(&mut self, progress: f32, time: f64) -> FrameOutput {
        let time = self.clock.scene_time(time);
        let mapper = ScrollMapper {
            config: &self.config,
            curve: &self.curve,
            timeline: &self.timeline,
            path_points: self.path.len(),
        };
        let mut output = mapper.update(&mut self.context, ScrollInput { progress, time });

        if let Some(id) = output.pulsed_marker {
            self.markers
                .pulse(id, self.config.marker_pulse_scale, self.config.marker_pulse_secs);
        }
        self.camera = output.camera;
        self.events.append(&mut output.events);
        output
    }

    /// Render-loop callback at host wall-clock `time` seconds.
    pub fn tick(&mut self, time: f64) {
        let dt = self.clock.tick_delta(time);
        let scene_time = self.clock.scene_time(time);

        self.starfield.update(scene_time);
        self.drift.step(scene_time);
        let finished = self.bursts.step_all();
        if finished > 0 {
            log::debug!("{} burst(s) finished, {} live", finished, self.bursts.len());
        }
        self.markers.advance(dt);
        self.advance_intro(dt);
    }

    pub fn dispatch(&mut self, action: Action) {
        log::info!("Action: {:?}", action);
        match action {
            Action::Start => self.start(),
            Action::RevealFate => self.reveal_fate(),
            Action::Replay => self.replay(),
            Action::ToggleAudio => {
                if let Some(event) = self.audio.toggle() {
                    self.events.push(event);
                }
            }
        }
    }

    /// The audio collaborator refused to play.
    pub fn playback_rejected(&mut self, reason: &str) {
        self.audio.playback_rejected(reason);
    }

    /// Drain queued events for the host to apply.
    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    fn spawn_burst(&mut self, params: BurstSpec) {
        let motion = BurstMotion {
            step: self.config.burst_step,
            speed: self.config.burst_speed,
            color: self.config.burst_color,
        };
        self.bursts.spawn(&params, motion, &mut self.rng);
    }

    fn start(&mut self) {
        if self.intro != Intro::Waiting {
            log::debug!("Start ignored, intro already {:?}", self.intro);
            return;
        }
        self.spawn_burst(self.config.start_burst);
        self.events.push(SceneEvent::LoaderFadeOut {
            duration: self.config.loader_fade_secs,
        });
        self.intro = Intro::FadingLoader {
            remaining: self.config.loader_fade_secs,
        };
    }

    fn advance_intro(&mut self, dt: f32) {
        if let Intro::FadingLoader { remaining } = self.intro {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                self.intro = Intro::FadingLoader { remaining };
                return;
            }
            self.intro = Intro::Started;
            self.events.push(SceneEvent::LoaderHidden);
            if let Some(event) = self.audio.start() {
                self.events.push(event);
            }
            self.events.push(SceneEvent::HeroFadeIn {
                duration: self.config.hero_fade_in_secs,
            });
        }
    }

    /// Every press celebrates again; only the first one sets the latch and
    /// hides the closing section.
    fn reveal_fate(&mut self) {
        if self.context.reveal_fate() {
            self.events.push(SceneEvent::ClosingSection { visible: false });
        }
        self.events.push(SceneEvent::EndMessage { visible: true });
        self.spawn_burst(self.config.reveal_burst);
    }

    fn replay(&mut self) {
        self.context.replay();
        self.events.push(SceneEvent::ScrollTo {
            progress: 0.0,
            duration: self.config.replay_scroll_secs,
        });
        self.events.push(SceneEvent::EndMessage { visible: false });
    }
}
