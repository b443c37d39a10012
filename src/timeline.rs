//! Timeline memory cards.
//!
//! Records come from a static JSON array. Each one becomes an entry with a
//! position `t` along the curve, spaced evenly over the usable span.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SceneConfig;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("failed to read timeline: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse timeline: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("timeline has no entries")]
    Empty,
    /// The host could not fetch the data file at all.
    #[error("failed to fetch timeline: {0}")]
    Fetch(String),
}

/// A record as stored in the data file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineRecord {
    pub date: String,
    pub image: Option<String>,
    pub title: String,
    pub note: String,
}

impl TimelineRecord {
    /// The record shown when no timeline could be loaded.
    pub fn placeholder() -> Self {
        Self {
            date: "Start".to_string(),
            image: Some("sample.png".to_string()),
            title: "Us".to_string(),
            note: "Start".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub id: usize,
    pub date: String,
    pub title: String,
    pub note: String,
    pub image: Option<String>,
    /// Arc-length position along the curve.
    pub t: f32,
}

/// What the card panel should show for an entry's media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "src", rename_all = "snake_case")]
pub enum CardMedia {
    Image(String),
    Video(String),
}

/// Everything the card panel needs to display an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub id: usize,
    pub date: String,
    pub title: String,
    pub note: String,
    pub media: Option<CardMedia>,
}

impl TimelineEntry {
    pub fn card_view(&self, media_dir: &str) -> CardView {
        let media = self.image.as_deref().filter(|s| !s.is_empty()).map(|image| {
            let src = format!("{}/{}", media_dir.trim_end_matches('/'), image);
            if image.to_ascii_lowercase().ends_with(".mp4") {
                CardMedia::Video(src)
            } else {
                CardMedia::Image(src)
            }
        });
        CardView {
            id: self.id,
            date: self.date.clone(),
            title: self.title.clone(),
            note: self.note.clone(),
            media,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    /// True when the entries are the built-in placeholder.
    placeholder: bool,
}

impl Timeline {
    /// Assign `t = start + index / count * span` to each record.
    pub fn from_records(records: Vec<TimelineRecord>, config: &SceneConfig) -> Result<Self, TimelineError> {
        if records.is_empty() {
            return Err(TimelineError::Empty);
        }
        let count = records.len();
        let entries = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| TimelineEntry {
                id: index,
                date: record.date,
                title: record.title,
                note: record.note,
                image: record.image,
                t: config.timeline_start + (index as f32 / count as f32) * config.timeline_span,
            })
            .collect();

        let timeline = Self {
            entries,
            placeholder: false,
        };
        timeline.warn_on_overlap(config);
        Ok(timeline)
    }

    pub fn from_json_str(json: &str, config: &SceneConfig) -> Result<Self, TimelineError> {
        let records: Vec<TimelineRecord> = serde_json::from_str(json)?;
        Self::from_records(records, config)
    }

    pub fn load(path: &Path, config: &SceneConfig) -> Result<Self, TimelineError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents, config)
    }

    /// The single-card timeline used when the data source is unavailable.
    pub fn placeholder(config: &SceneConfig) -> Self {
        let mut timeline = Self::from_records(vec![TimelineRecord::placeholder()], config)
            .unwrap_or_else(|_| Self {
                entries: Vec::new(),
                placeholder: true,
            });
        timeline.placeholder = true;
        timeline
    }

    /// Keep a loaded timeline, or fall back to the placeholder on any error.
    pub fn or_placeholder(result: Result<Self, TimelineError>, config: &SceneConfig) -> Self {
        match result {
            Ok(timeline) => {
                log::info!("Timeline loaded: {} entries", timeline.len());
                timeline
            }
            Err(e) => {
                log::warn!("{}; using placeholder timeline", e);
                Self::placeholder(config)
            }
        }
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn get(&self, id: usize) -> Option<&TimelineEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Pairs of neighbouring entries whose activation bands overlap.
    pub fn overlapping_bands(&self, band: f32) -> Vec<(usize, usize)> {
        self.entries
            .windows(2)
            .filter(|pair| pair[1].t - pair[0].t < 2.0 * band)
            .map(|pair| (pair[0].id, pair[1].id))
            .collect()
    }

    fn warn_on_overlap(&self, config: &SceneConfig) {
        let overlaps = self.overlapping_bands(config.card_band);
        if !overlaps.is_empty() {
            log::warn!(
                "{} entries spaced {:.4} apart overlap their ±{} card bands; the earlier entry wins",
                self.entries.len(),
                config.entry_spacing(self.entries.len()),
                config.card_band
            );
        }
    }
}
