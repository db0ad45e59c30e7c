//! Estimated playback timeline for scrubber display.

use crate::PlaybackConfig;
use recital_core::{DurationManifest, Script};
use std::time::Duration;
use tracing::debug;

/// Estimated timeline of a script at the current rate.
///
/// Each line gets a duration: the measured one from a [`DurationManifest`]
/// when available, otherwise `max(min_line_secs, chars / chars_per_second)`.
/// Both are divided by the playback rate.
///
/// `current_time` is the start of the current line plus the time elapsed
/// since the line began, capped at the line's end. It snaps to the exact line
/// start on every transition, so interpolation error never accumulates.
#[derive(Debug, Clone)]
pub struct ProgressModel {
    base: Vec<Duration>,
    starts: Vec<Duration>,
    rate: f32,
    line: usize,
    frozen: Duration,
    running_since: Option<Duration>,
}

impl ProgressModel {
    /// Estimates the timeline of `script`.
    pub fn new(
        script: &Script,
        config: &PlaybackConfig,
        manifest: Option<&DurationManifest>,
        rate: f32,
    ) -> Self {
        let mut measured = 0;
        let base: Vec<Duration> = script
            .sections()
            .iter()
            .flat_map(|section| section.lines().iter().map(move |line| (section, line)))
            .map(|(section, line)| {
                if let Some(duration) =
                    manifest.and_then(|m| m.duration_of(section.id(), line.id()))
                {
                    measured += 1;
                    return duration;
                }
                let secs = line.spoken_len() as f64 / f64::from(config.chars_per_second);
                Duration::try_from_secs_f64(secs.max(f64::from(config.min_line_secs)))
                    .unwrap_or(Duration::MAX)
            })
            .collect();

        debug!(lines = base.len(), measured, rate, "Estimated line durations");

        let mut model = Self {
            base,
            starts: Vec::new(),
            rate,
            line: 0,
            frozen: Duration::ZERO,
            running_since: None,
        };
        model.rebuild();
        model
    }

    /// Sum of all line durations at the current rate.
    pub fn total_duration(&self) -> Duration {
        self.starts.last().copied().unwrap_or_default()
    }

    /// Playback time at `now`, never past [`total_duration`](Self::total_duration).
    pub fn current_time(&self, now: Duration) -> Duration {
        match self.running_since {
            Some(since) => {
                let elapsed = now.saturating_sub(since).min(self.line_duration(self.line));
                self.line_start(self.line)
                    .saturating_add(elapsed)
                    .min(self.total_duration())
            }
            None => self.frozen,
        }
    }

    /// The current line starts playing at `now`.
    pub fn begin_line(&mut self, line: usize, now: Duration) {
        self.line = line.min(self.base.len());
        self.frozen = self.line_start(self.line);
        self.running_since = Some(now);
    }

    /// Stops interpolating, keeping the time reached at `now`.
    pub fn freeze(&mut self, now: Duration) {
        self.frozen = self.current_time(now);
        self.running_since = None;
    }

    /// Moves to the start of a line without playing it.
    pub fn snap_to_line(&mut self, line: usize) {
        self.line = line.min(self.base.len());
        self.frozen = self.line_start(self.line);
        self.running_since = None;
    }

    /// Moves past the last line.
    pub fn finish(&mut self) {
        self.snap_to_line(self.base.len());
    }

    /// Rescales every duration to a new rate and snaps to the current line's start.
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
        self.rebuild();
        self.snap_to_line(self.line);
    }

    /// Index of the line playing at time `time`, counted across sections.
    ///
    /// Times past the end map to the last line.
    pub fn line_at_time(&self, time: Duration) -> usize {
        let ends = self.starts.get(1..).unwrap_or_default();
        ends.partition_point(|end| *end <= time)
            .min(self.base.len().saturating_sub(1))
    }

    /// Start of a line; `line == len` gives the total duration.
    pub fn line_start(&self, line: usize) -> Duration {
        self.starts
            .get(line)
            .copied()
            .unwrap_or_else(|| self.total_duration())
    }

    /// Duration of a line at the current rate.
    pub fn line_duration(&self, line: usize) -> Duration {
        self.base
            .get(line)
            .map(|base| scale(*base, self.rate))
            .unwrap_or_default()
    }

    /// Number of lines on the timeline.
    pub fn len(&self) -> usize {
        self.base.len()
    }

    /// Whether the timeline has no lines.
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    fn rebuild(&mut self) {
        let mut acc = Duration::ZERO;
        self.starts = std::iter::once(Duration::ZERO)
            .chain(self.base.iter().map(|base| {
                acc = acc.saturating_add(scale(*base, self.rate));
                acc
            }))
            .collect();
    }
}

// Duration at `rate`, saturating instead of overflowing.
fn scale(base: Duration, rate: f32) -> Duration {
    Duration::try_from_secs_f64(base.as_secs_f64() / f64::from(rate)).unwrap_or(Duration::MAX)
}
