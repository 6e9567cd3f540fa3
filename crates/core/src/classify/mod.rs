//! Pure, time-only classification of lines relative to the playback cursor.
//!
//! Nothing here remembers previous calls: any `current_time`, reached by
//! playback or by a seek in either direction, yields the same answer.

use serde::{Deserialize, Serialize};

use crate::{EngineConfig, LyricLine};

/// Perceptual state of a line relative to the playback cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineState {
    #[default]
    Future,
    Active,
    Past,
}

/// Result of classifying one line at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub state: LineState,
    /// Fraction of the line's span already played, in `[0, 1]`. Future lines
    /// report 0 and past lines 1.
    pub progress: f32,
    /// Span used to compute `progress`, in seconds.
    pub duration: f32,
}

/// Maps `(line index, current time)` to a [`Classification`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineClassifier {
    timing_offset: f32,
    last_line_min_duration: f32,
    default_line_duration: f32,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self {
            timing_offset: Self::DEFAULT_TIMING_OFFSET,
            last_line_min_duration: 2.0,
            default_line_duration: 5.0,
        }
    }
}

impl LineClassifier {
    /// Highlights lines slightly ahead of their timestamp to hide output lag.
    pub const DEFAULT_TIMING_OFFSET: f32 = -0.3;

    pub fn new(timing_offset: f32) -> Self {
        Self {
            timing_offset,
            ..Self::default()
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            timing_offset: config.timing_offset,
            last_line_min_duration: config.last_line_min_duration,
            default_line_duration: config.default_line_duration,
        }
    }

    /// Classifies line `index` at `current_time` seconds.
    ///
    /// Out-of-range indices and a NaN clock classify as `Future`.
    pub fn classify(&self, lines: &[LyricLine], index: usize, current_time: f32) -> Classification {
        let Some(line) = lines.get(index) else {
            return Classification {
                state: LineState::Future,
                progress: 0.0,
                duration: 0.0,
            };
        };

        let duration = self.line_duration(lines, index);
        let adjusted = current_time + self.timing_offset;

        let state = if adjusted.is_nan() || adjusted < line.time {
            LineState::Future
        } else if lines.get(index + 1).is_some_and(|next| adjusted >= next.time) {
            LineState::Past
        } else {
            LineState::Active
        };

        let progress = match state {
            LineState::Future => 0.0,
            LineState::Past => 1.0,
            LineState::Active if duration > 0.0 => ((adjusted - line.time) / duration).clamp(0.0, 1.0),
            LineState::Active => 1.0,
        };

        Classification {
            state,
            progress,
            duration,
        }
    }

    /// Span of line `index` in seconds.
    ///
    /// The last line has no successor, so it borrows the gap to its
    /// predecessor (never shorter than the configured floor) or falls back to
    /// the default duration when it is alone.
    pub fn line_duration(&self, lines: &[LyricLine], index: usize) -> f32 {
        let Some(line) = lines.get(index) else {
            return 0.0;
        };

        if let Some(next) = lines.get(index + 1) {
            return next.time - line.time;
        }

        match index.checked_sub(1).and_then(|prev| lines.get(prev)) {
            Some(previous) => (line.time - previous.time).max(self.last_line_min_duration),
            None => self.default_line_duration,
        }
    }

    /// Index of the single active line at `current_time`, if any.
    ///
    /// Agrees with [`classify`](Self::classify) but runs in `O(log n)`.
    pub fn active_index(&self, lines: &[LyricLine], current_time: f32) -> Option<usize> {
        let adjusted = current_time + self.timing_offset;
        if adjusted.is_nan() {
            return None;
        }
        lines
            .partition_point(|line| line.time <= adjusted)
            .checked_sub(1)
    }
}
