use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::SceneConfig;
use crate::curve::HeartCurve;
use crate::events::SceneEvent;
use crate::input::ScrollTrace;
use crate::mapper::FrameOutput;
use crate::session::{Action, Session};
use crate::timeline::Timeline;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scene config JSON (fields not given keep their defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scroll trace and write per-frame scene state as JSON lines
    Simulate {
        /// Timeline data file
        #[arg(long, default_value = "data/timeline.json")]
        timeline: PathBuf,

        /// Scroll trace (JSON array of progress values, or whitespace separated floats)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Sample rate of the scroll trace in Hz
        #[arg(long, default_value_t = 60.0)]
        rate: f32,

        /// Frames per second
        #[arg(long, default_value_t = 60.0)]
        fps: f32,

        /// Duration in seconds (overrides trace duration; default 10 s for a linear sweep)
        #[arg(long)]
        duration: Option<f32>,

        /// Press the start button on the first frame
        #[arg(long)]
        start: bool,

        /// Press the reveal button once progress reaches this value
        #[arg(long)]
        reveal_at: Option<f32>,

        /// Random seed for particle layers
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print timeline entries with their curve positions
    Timeline {
        /// Timeline data file
        #[arg(long, default_value = "data/timeline.json")]
        timeline: PathBuf,
    },
    /// Dump the rendered path samples as JSON
    Path {
        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    frame: usize,
    time: f32,
    #[serde(flatten)]
    output: &'a FrameOutput,
    events: Vec<SceneEvent>,
    bursts: usize,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate {
            timeline,
            input,
            rate,
            fps,
            duration,
            start,
            reveal_at,
            seed,
            out,
        } => {
            let timeline = Timeline::or_placeholder(Timeline::load(&timeline, &config), &config);
            let trace = match input {
                Some(path) => {
                    let contents = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read scroll trace {:?}", path))?;
                    ScrollTrace::parse(&contents, rate)?
                }
                None => ScrollTrace::linear_sweep(duration.unwrap_or(10.0), fps),
            };
            let options = SimulateOptions {
                fps,
                duration,
                start,
                reveal_at,
                seed,
            };
            let mut writer = open_output(out.as_deref())?;
            simulate(config, timeline, &trace, &options, &mut writer)?;
            writer.flush()?;
        }
        Commands::Timeline { timeline } => {
            let timeline = Timeline::or_placeholder(Timeline::load(&timeline, &config), &config);
            write_timeline(&timeline, &config, &mut io::stdout().lock())?;
        }
        Commands::Path { out } => {
            let mut writer = open_output(out.as_deref())?;
            write_path(&config, &mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path).with_context(|| format!("Failed to load config {:?}", path)),
        None => Ok(SceneConfig::default()),
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(std::io::stdout())),
    })
}

/// Upper bound on frames a single simulation may write.
pub const MAX_FRAMES: usize = 10_000_000;

pub struct SimulateOptions {
    pub fps: f32,
    pub duration: Option<f32>,
    pub start: bool,
    pub reveal_at: Option<f32>,
    pub seed: u64,
}

/// Drive a session through a scroll trace, one JSON line per frame.
///
/// Returns the number of frames written.
pub fn simulate<W: Write>(
    config: SceneConfig,
    timeline: Timeline,
    trace: &ScrollTrace,
    options: &SimulateOptions,
    writer: &mut W,
) -> Result<usize> {
    if !(options.fps.is_finite() && options.fps > 0.0) {
        anyhow::bail!("fps must be a positive finite number, got {}", options.fps);
    }
    let render_duration = options.duration.unwrap_or(trace.get_duration());
    if !(render_duration.is_finite() && render_duration >= 0.0) {
        anyhow::bail!("duration must be a non-negative finite number, got {}", render_duration);
    }
    let frame_estimate = (render_duration as f64 * options.fps as f64).ceil();
    if frame_estimate >= MAX_FRAMES as f64 {
        anyhow::bail!(
            "{} s at {} fps is more than {} frames",
            render_duration,
            options.fps,
            MAX_FRAMES
        );
    }
    let total_frames = frame_estimate as usize + 1;
    let dt = 1.0 / options.fps as f64;

    let mut session = Session::new(config, timeline, options.seed);
    let mut revealed = false;

    log::info!("Simulating {} frames at {} fps", total_frames, options.fps);

    for frame in 0..total_frames {
        let time = frame as f64 * dt;
        let progress = trace.sample(time as f32);

        if frame == 0 && options.start {
            session.dispatch(Action::Start);
        }
        if let Some(at) = options.reveal_at {
            if !revealed && progress >= at {
                session.dispatch(Action::RevealFate);
                revealed = true;
            }
        }

        let output = session.on_scroll(progress, time);
        session.tick(time);

        let record = FrameRecord {
            frame,
            time: time as f32,
            output: &output,
            events: session.take_events(),
            bursts: session.bursts().len(),
        };
        serde_json::to_writer(&mut *writer, &record)?;
        writeln!(writer)?;
    }

    Ok(total_frames)
}

/// Timeline entries with their curve positions, then any band overlaps.
pub fn write_timeline<W: Write>(timeline: &Timeline, config: &SceneConfig, writer: &mut W) -> io::Result<()> {
    if timeline.is_placeholder() {
        writeln!(writer, "(placeholder timeline)")?;
    }
    for entry in timeline.entries() {
        writeln!(
            writer,
            "{:>3}  t={:.4}  {}  {}{}",
            entry.id,
            entry.t,
            entry.date,
            entry.title,
            entry
                .image
                .as_deref()
                .map(|image| format!("  [{}]", image))
                .unwrap_or_default()
        )?;
    }
    for (a, b) in timeline.overlapping_bands(config.card_band) {
        writeln!(writer, "warning: card bands of entries {} and {} overlap", a, b)?;
    }
    Ok(())
}

/// The rendered path samples as one JSON array of `[x, y, z]` points.
pub fn write_path<W: Write>(config: &SceneConfig, writer: &mut W) -> Result<()> {
    let path = HeartCurve::new(config.curve_scale).sample(config.path_sample_count);
    serde_json::to_writer(&mut *writer, &path)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_writes_one_line_per_frame() {
        let config = SceneConfig {
            drift_count: 10,
            star_count: 10,
            sparkle_count: 10,
            ..Default::default()
        };
        let timeline = Timeline::placeholder(&config);
        let trace = ScrollTrace::linear_sweep(2.0, 30.0);
        let options = SimulateOptions {
            fps: 30.0,
            duration: None,
            start: true,
            reveal_at: Some(0.99),
            seed: 3,
        };

        let mut buffer = Vec::new();
        let frames = simulate(config, timeline, &trace, &options, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), frames);
        assert_eq!(frames, 61);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["frame"], 0);
        assert_eq!(first["hero_opacity"], 1.0);
        assert_eq!(first["events"][0]["type"], "loader_fade_out");

        let last: serde_json::Value = serde_json::from_str(lines[frames - 1]).unwrap();
        assert_eq!(last["camera"]["regime"], "arriving");
        assert_eq!(last["fate_revealed"], true);
        assert_eq!(last["path_draw_count"], 1001);
    }

    fn run_with(fps: f32, duration: Option<f32>) -> Result<usize> {
        let config = SceneConfig {
            drift_count: 10,
            star_count: 10,
            sparkle_count: 10,
            ..Default::default()
        };
        let timeline = Timeline::placeholder(&config);
        let trace = ScrollTrace::linear_sweep(1.0, 10.0);
        let options = SimulateOptions {
            fps,
            duration,
            start: false,
            reveal_at: None,
            seed: 0,
        };
        simulate(config, timeline, &trace, &options, &mut Vec::new())
    }

    #[test]
    fn test_zero_fps_rejected() {
        assert!(run_with(0.0, None).is_err());
        assert!(run_with(-30.0, None).is_err());
    }

    #[test]
    fn test_non_finite_fps_rejected() {
        assert!(run_with(f32::INFINITY, None).is_err());
        assert!(run_with(f32::NAN, None).is_err());
    }

    #[test]
    fn test_bad_duration_rejected() {
        assert!(run_with(60.0, Some(f32::INFINITY)).is_err());
        assert!(run_with(60.0, Some(-1.0)).is_err());
        assert!(run_with(1.0e30, Some(1.0)).is_err());
        assert_eq!(run_with(10.0, Some(0.0)).unwrap(), 1);
    }

    #[test]
    fn test_events_appear_once_per_record() {
        let config = SceneConfig {
            drift_count: 10,
            star_count: 10,
            sparkle_count: 10,
            ..Default::default()
        };
        let timeline = Timeline::placeholder(&config);
        let trace = ScrollTrace::linear_sweep(1.0, 10.0);
        let options = SimulateOptions {
            fps: 10.0,
            duration: None,
            start: false,
            reveal_at: None,
            seed: 0,
        };
        let mut buffer = Vec::new();
        simulate(config, timeline, &trace, &options, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let shows: usize = text
            .lines()
            .map(|line| {
                let record: serde_json::Value = serde_json::from_str(line).unwrap();
                record["events"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .filter(|e| e["type"] == "show_card")
                    .count()
            })
            .sum();
        assert_eq!(shows, 1);
    }

    #[test]
    fn test_write_timeline_lists_entries() {
        let config = SceneConfig::default();
        let timeline = Timeline::from_json_str(
            r#"[{"date":"Jan","title":"First","image":"a.jpg"},{"date":"Feb","title":"Second"}]"#,
            &config,
        )
        .unwrap();
        let mut buffer = Vec::new();
        write_timeline(&timeline, &config, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  0  t=0.1200  Jan  First  [a.jpg]"));
        assert!(lines[1].contains("Second"));
        assert!(!text.contains("warning"));
    }

    #[test]
    fn test_write_timeline_marks_placeholder_and_overlaps() {
        let config = SceneConfig::default();
        let mut buffer = Vec::new();
        write_timeline(&Timeline::placeholder(&config), &config, &mut buffer).unwrap();
        assert!(String::from_utf8(buffer).unwrap().starts_with("(placeholder timeline)\n"));

        let records = (0..12)
            .map(|i| format!(r#"{{"date":"d{}","title":"t{}"}}"#, i, i))
            .collect::<Vec<_>>()
            .join(",");
        let timeline = Timeline::from_json_str(&format!("[{}]", records), &config).unwrap();
        let mut buffer = Vec::new();
        write_timeline(&timeline, &config, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("warning: card bands of entries 0 and 1 overlap"));
    }

    #[test]
    fn test_write_path_dumps_samples() {
        let config = SceneConfig::default();
        let mut buffer = Vec::new();
        write_path(&config, &mut buffer).unwrap();
        let points: Vec<[f32; 3]> = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(points.len(), config.path_sample_count + 1);
        let end = HeartCurve::new(config.curve_scale).point(1.0);
        let last = points[points.len() - 1];
        assert!((last[0] - end.x).abs() < 1e-3 && (last[2] - end.z).abs() < 1e-3);
    }
}
