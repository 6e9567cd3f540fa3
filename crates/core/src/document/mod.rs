use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// One time-indexed line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    /// Start time in seconds.
    pub time: f32,
    pub text: String,
}

impl LyricLine {
    pub fn new(time: f32, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }
}

/// A whole track's worth of lines. Replaced wholesale on track change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct LyricsDocument {
    synced: bool,
    lines: Vec<LyricLine>,
    source: String,
}

impl LyricsDocument {
    /// Creates a document, restoring the non-decreasing time order.
    ///
    /// Negative or non-finite times are clamped to zero before sorting; the
    /// sort is stable so lines sharing a timestamp keep their order.
    pub fn new(synced: bool, mut lines: Vec<LyricLine>, source: impl Into<String>) -> Self {
        for line in &mut lines {
            if !(line.time.is_finite() && line.time >= 0.0) {
                line.time = 0.0;
            }
        }
        if lines.windows(2).any(|pair| pair[1].time < pair[0].time) {
            tracing::debug!("lyric lines out of order, sorting by time");
            lines.sort_by(|a, b| a.time.total_cmp(&b.time));
        }

        Self {
            synced,
            lines,
            source: source.into(),
        }
    }

    /// Convenience constructor for a synced document.
    pub fn synced(lines: Vec<LyricLine>, source: impl Into<String>) -> Self {
        Self::new(true, lines, source)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default = "default_synced")]
    synced: bool,
    #[serde(default)]
    lines: Vec<LyricLine>,
    #[serde(default)]
    source: String,
}

fn default_synced() -> bool {
    true
}

impl From<RawDocument> for LyricsDocument {
    fn from(raw: RawDocument) -> Self {
        Self::new(raw.synced, raw.lines, raw.source)
    }
}
