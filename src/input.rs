/// A recorded scroll position over time, used to replay a session offline.
#[derive(Clone, Debug)]
pub struct ScrollTrace {
    samples: Vec<f32>,
    sample_rate: f32,
    duration: f32,
}

impl ScrollTrace {
    pub fn new(samples: Vec<f32>, sample_rate: f32) -> Self {
        let samples: Vec<f32> = samples
            .into_iter()
            .map(crate::mapper::sanitize_progress)
            .collect();
        let duration = if samples.len() > 1 && sample_rate > 0.0 {
            (samples.len() - 1) as f32 / sample_rate
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    /// Scroll from top to bottom at constant speed.
    pub fn linear_sweep(duration: f32, sample_rate: f32) -> Self {
        let count = ((duration * sample_rate).ceil() as usize).max(1);
        let samples = (0..=count).map(|i| i as f32 / count as f32).collect();
        Self::new(samples, count as f32 / duration.max(f32::EPSILON))
    }

    /// Parse a JSON array of floats, or whitespace separated floats.
    pub fn parse(contents: &str, sample_rate: f32) -> anyhow::Result<Self> {
        let samples: Vec<f32> = serde_json::from_str(contents)
            .or_else(|_| {
                contents
                    .split_whitespace()
                    .map(|s| s.parse::<f32>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(|_| {
                anyhow::anyhow!("Failed to parse scroll trace as JSON list of floats or whitespace separated floats")
            })?;
        if samples.is_empty() {
            anyhow::bail!("Scroll trace has no samples");
        }
        Ok(Self::new(samples, sample_rate))
    }

    pub fn get_duration(&self) -> f32 {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Progress at `time`, held at the first/last sample outside the trace.
    pub fn sample(&self, time: f32) -> f32 {
        let Some(&last) = self.samples.last() else {
            return 0.0;
        };
        if time <= 0.0 || self.samples.len() == 1 {
            return self.samples[0];
        }
        if time >= self.duration {
            return last;
        }

        let index = time * self.sample_rate;
        let i = index as usize;
        let frac = index.fract();

        if i + 1 >= self.samples.len() {
            return last;
        }

        let v0 = self.samples[i];
        let v1 = self.samples[i + 1];

        // Linear interpolation
        v0 + (v1 - v0) * frac
    }
}
