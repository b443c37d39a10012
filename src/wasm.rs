use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::config::{color_to_rgba, SceneConfig};
use crate::session::{Action, Session};
use crate::timeline::{Timeline, TimelineError};

#[wasm_bindgen]
pub struct WasmScene {
    inner: Rc<RefCell<Session>>,
}

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

fn js_error(value: JsValue) -> TimelineError {
    TimelineError::Fetch(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

async fn fetch_text(url: &str) -> Result<String, TimelineError> {
    let window = web_sys::window().ok_or_else(|| TimelineError::Fetch("no window".to_string()))?;
    let resp_value = JsFuture::from(window.fetch_with_str(url)).await.map_err(js_error)?;
    let resp: Response = resp_value.dyn_into().map_err(js_error)?;
    if !resp.ok() {
        return Err(TimelineError::Fetch(format!("{} returned {}", url, resp.status())));
    }
    let text = JsFuture::from(resp.text().map_err(js_error)?).await.map_err(js_error)?;
    text.as_string()
        .ok_or_else(|| TimelineError::Fetch("response body is not text".to_string()))
}

async fn fetch_timeline(url: &str, config: &SceneConfig) -> Result<Timeline, TimelineError> {
    let text = fetch_text(url).await?;
    Timeline::from_json_str(&text, config)
}

#[wasm_bindgen]
impl WasmScene {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        panic!("Use create_scene async constructor");
    }

    /// Replace the timeline with JSON supplied by the host.
    /// Returns true if successful, false if parsing failed.
    pub fn load_timeline_json(&self, json: &str) -> bool {
        let mut session = self.inner.borrow_mut();
        match Timeline::from_json_str(json, session.config()) {
            Ok(timeline) => {
                log::info!("Timeline set: {} entries", timeline.len());
                session.set_timeline(timeline);
                true
            }
            Err(e) => {
                log::error!("Failed to parse timeline: {}", e);
                false
            }
        }
    }

    /// Scroll callback at wall-clock `time` seconds. Returns the frame state
    /// as JSON; events raised by it come from `take_events_json`.
    pub fn on_scroll(&self, progress: f32, time: f64) -> String {
        let output = self.inner.borrow_mut().on_scroll(progress, time);
        serde_json::to_string(&output).unwrap_or_else(|e| {
            log::error!("Failed to serialize frame: {}", e);
            "{}".to_string()
        })
    }

    /// Render-loop callback. `time` is wall-clock seconds.
    pub fn tick(&self, time: f64) {
        self.inner.borrow_mut().tick(time);
    }

    pub fn start(&self) {
        self.inner.borrow_mut().dispatch(Action::Start);
    }

    pub fn reveal_fate(&self) {
        self.inner.borrow_mut().dispatch(Action::RevealFate);
    }

    pub fn replay(&self) {
        self.inner.borrow_mut().dispatch(Action::Replay);
    }

    pub fn toggle_audio(&self) {
        self.inner.borrow_mut().dispatch(Action::ToggleAudio);
    }

    /// The page's audio element rejected a play request.
    pub fn playback_rejected(&self, reason: &str) {
        self.inner.borrow_mut().playback_rejected(reason);
    }

    /// Drain queued scene events as a JSON array.
    pub fn take_events_json(&self) -> String {
        let events = self.inner.borrow_mut().take_events();
        serde_json::to_string(&events).unwrap_or_else(|e| {
            log::error!("Failed to serialize events: {}", e);
            "[]".to_string()
        })
    }

    /// Column-major view matrix of the latest camera pose.
    pub fn camera_view_matrix(&self) -> Vec<f32> {
        self.inner.borrow().view_matrix().to_cols_array().to_vec()
    }

    pub fn camera_pose_json(&self) -> String {
        serde_json::to_string(self.inner.borrow().camera()).unwrap_or_else(|e| {
            log::error!("Failed to serialize camera pose: {}", e);
            "{}".to_string()
        })
    }

    /// Column-major model matrix of the rotating star layer.
    pub fn star_transform(&self) -> Vec<f32> {
        self.inner.borrow().starfield().star_transform().to_cols_array().to_vec()
    }

    /// Background, fog and per-layer material styles as JSON.
    pub fn scene_style_json(&self) -> String {
        serde_json::to_string(&self.inner.borrow().config().scene_style()).unwrap_or_else(|e| {
            log::error!("Failed to serialize scene style: {}", e);
            "{}".to_string()
        })
    }

    // Vertex buffers, flattened xyz.

    pub fn path_positions(&self) -> Vec<f32> {
        bytemuck::cast_slice(self.inner.borrow().path()).to_vec()
    }

    pub fn drift_positions(&self) -> Vec<f32> {
        bytemuck::cast_slice(self.inner.borrow().drift().positions()).to_vec()
    }

    pub fn star_positions(&self) -> Vec<f32> {
        bytemuck::cast_slice(self.inner.borrow().starfield().stars.positions()).to_vec()
    }

    pub fn star_sizes(&self) -> Vec<f32> {
        self.inner
            .borrow()
            .starfield()
            .stars
            .sizes()
            .map(|sizes| sizes.to_vec())
            .unwrap_or_default()
    }

    pub fn sparkle_positions(&self) -> Vec<f32> {
        bytemuck::cast_slice(self.inner.borrow().starfield().sparkles.positions()).to_vec()
    }

    pub fn star_rotation(&self) -> f32 {
        self.inner.borrow().starfield().rotation_y()
    }

    pub fn burst_count(&self) -> usize {
        self.inner.borrow().bursts().len()
    }

    /// Burst particles as (x, y, z, size) quadruples.
    pub fn burst_vertices(&self, index: usize) -> Vec<f32> {
        self.inner
            .borrow()
            .bursts()
            .get(index)
            .map(|burst| bytemuck::cast_slice(&burst.vertices()).to_vec())
            .unwrap_or_default()
    }

    /// RGBA with the burst's current fade applied to alpha.
    pub fn burst_color(&self, index: usize) -> Vec<f32> {
        self.inner
            .borrow()
            .bursts()
            .get(index)
            .map(|burst| color_to_rgba(burst.color, burst.opacity()).to_vec())
            .unwrap_or_default()
    }

    /// Marker vertices as (x, y, z, size) quadruples.
    pub fn marker_vertices(&self) -> Vec<f32> {
        let vertices = self.inner.borrow().markers().vertices();
        bytemuck::cast_slice(&vertices).to_vec()
    }

    pub fn marker_color(&self) -> Vec<f32> {
        color_to_rgba(self.inner.borrow().config().marker_color, 1.0).to_vec()
    }
}

/// Build a scene, fetching the timeline from `timeline_url`.
///
/// A failed fetch or parse falls back to the placeholder timeline; a bad
/// config is an error.
#[wasm_bindgen]
pub async fn create_scene(
    timeline_url: String,
    config_json: Option<String>,
    seed: u32,
) -> Result<WasmScene, JsValue> {
    init_panic_hook();

    let config = match config_json {
        Some(json) => SceneConfig::from_json_str(&json)
            .map_err(|e| JsValue::from_str(&format!("Invalid scene config: {}", e)))?,
        None => SceneConfig::default(),
    };

    let timeline = Timeline::or_placeholder(fetch_timeline(&timeline_url, &config).await, &config);
    let session = Session::new(config, timeline, seed as u64);

    Ok(WasmScene {
        inner: Rc::new(RefCell::new(session)),
    })
}
