//! Per-frame orchestration: classification, range filtering, spring
//! stepping and scroll following.
//!
//! The scheduler exclusively owns the per-line arena. Hosts feed it the
//! document and playback signals, call [`AnimationScheduler::tick`] (or
//! [`AnimationScheduler::run_frame`]) once per display frame, and read back
//! [`LineStyle`]s and the scroll offset in between.

use std::fmt;

use serde::Serialize;

use crate::{
    animation::transition_between, Classification, EasingCurves, EngineConfig, LineAnimation,
    LineClassifier, LineLayout, LineState, LineStyle, LyricsDocument, Result, ScrollFollower,
    Transition, UniformLayout,
};

/// Handle for one requested frame. Tokens from before a document change or
/// an unmount are stale and rejected by [`AnimationScheduler::run_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken {
    generation: u64,
}

/// What happened during the most recent tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TickStats {
    pub active_index: Option<usize>,
    /// Lines that went through the spring integrator.
    pub stepped_lines: usize,
    /// Lines that received their targets directly.
    pub assigned_lines: usize,
    /// Whether any stepped line is still in motion.
    pub animating: bool,
}

/// Serializable view of one line for hosts that consume JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineSnapshot {
    pub index: usize,
    pub state: LineState,
    #[serde(flatten)]
    pub style: LineStyle,
}

/// Serializable view of a frame: the lines around the active one plus the
/// scroll offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub time: f32,
    pub active_index: Option<usize>,
    pub scroll_offset: f32,
    pub lines: Vec<LineSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Idle,
    Running,
}

pub struct AnimationScheduler {
    config: EngineConfig,
    classifier: LineClassifier,
    curves: EasingCurves,
    layout: Box<dyn LineLayout>,
    document: Option<LyricsDocument>,
    lines: Vec<LineAnimation>,
    classifications: Vec<Classification>,
    scroll: ScrollFollower,
    current_time: f32,
    is_playing: bool,
    generation: u64,
    loop_state: LoopState,
    stop_requested: bool,
    stats: TickStats,
}

impl AnimationScheduler {
    /// Creates a scheduler after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            classifier: LineClassifier::from_config(&config),
            curves: EasingCurves::standard(),
            layout: Box::new(UniformLayout::from(config.layout)),
            document: None,
            lines: Vec::new(),
            classifications: Vec::new(),
            scroll: ScrollFollower::new(config.springs.scroll),
            current_time: 0.0,
            is_playing: false,
            generation: 0,
            loop_state: LoopState::Idle,
            stop_requested: false,
            stats: TickStats::default(),
            config,
        }
    }

    pub fn with_layout(mut self, layout: impl LineLayout + 'static) -> Self {
        self.set_layout(layout);
        self
    }

    pub fn with_curves(mut self, curves: EasingCurves) -> Self {
        self.curves = curves;
        self
    }

    /// Replaces the layout used to compute scroll goals. The next change of
    /// active line picks it up.
    pub fn set_layout(&mut self, layout: impl LineLayout + 'static) {
        self.layout = Box::new(layout);
    }

    /// Assigns a new document, discarding all per-line state.
    ///
    /// Any outstanding [`FrameToken`] becomes stale. Unsynced or empty
    /// documents leave the engine idle.
    pub fn set_document(&mut self, document: Option<LyricsDocument>) {
        self.generation += 1;
        self.stop_requested = false;
        self.loop_state = LoopState::Idle;
        self.scroll.reset();
        self.stats = TickStats::default();
        self.classifications.clear();

        let animatable = document
            .as_ref()
            .filter(|doc| doc.is_synced())
            .map_or(0, LyricsDocument::len);
        let smooth = self.config.springs.smooth;
        self.lines = (0..animatable).map(|_| LineAnimation::new(smooth)).collect();
        self.classifications.reserve(animatable);

        if let Some(doc) = &document {
            tracing::debug!(
                lines = doc.len(),
                synced = doc.is_synced(),
                source = doc.source(),
                generation = self.generation,
                "lyrics document assigned"
            );
        }
        self.document = document;
        self.wake();
    }

    pub fn document(&self) -> Option<&LyricsDocument> {
        self.document.as_ref()
    }

    /// Updates the playback position and wakes an idle loop if it moved.
    /// Continuous playback and seeks look the same here; classification is
    /// recomputed from scratch every tick.
    pub fn set_current_time(&mut self, seconds: f32) {
        if seconds != self.current_time {
            self.current_time = seconds;
            self.wake();
        }
    }

    /// Same as [`set_current_time`](Self::set_current_time) but logged as a
    /// user-initiated jump.
    pub fn seek(&mut self, seconds: f32) {
        tracing::debug!(from = self.current_time, to = seconds, "seek");
        self.set_current_time(seconds);
    }

    pub fn set_playing(&mut self, playing: bool) {
        if playing != self.is_playing {
            self.is_playing = playing;
            self.wake();
        }
    }

    /// Updates both playback signals at once. Like the individual setters,
    /// only an actual change wakes an idle loop.
    pub fn sync_playback(&mut self, seconds: f32, playing: bool) {
        self.set_current_time(seconds);
        self.set_playing(playing);
    }

    /// Tears the engine down for good: cancels pending frames and drops the
    /// document and every per-line state.
    pub fn unmount(&mut self) {
        self.stop_requested = true;
        self.generation += 1;
        self.loop_state = LoopState::Idle;
        self.document = None;
        self.lines.clear();
        self.classifications.clear();
        self.scroll.reset();
        tracing::debug!(generation = self.generation, "animation scheduler unmounted");
    }

    fn has_animatable_document(&self) -> bool {
        !self.lines.is_empty()
    }

    fn wake(&mut self) {
        if !self.stop_requested && self.has_animatable_document() {
            self.loop_state = LoopState::Running;
        }
    }

    pub fn is_running(&self) -> bool {
        self.loop_state == LoopState::Running
    }

    /// Returns a token while the loop wants another frame.
    pub fn pending_frame(&self) -> Option<FrameToken> {
        (self.is_running() && !self.stop_requested).then_some(FrameToken {
            generation: self.generation,
        })
    }

    /// Runs a frame requested through [`pending_frame`](Self::pending_frame).
    /// Stale tokens are ignored and return `false`.
    pub fn run_frame(&mut self, token: FrameToken, dt: f32) -> bool {
        if token.generation != self.generation {
            tracing::debug!(
                token = token.generation,
                current = self.generation,
                "dropping stale frame"
            );
            return false;
        }
        self.tick(dt)
    }

    /// Advances every animation by `dt` seconds and reports whether another
    /// frame should be requested.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.stop_requested || !self.has_animatable_document() {
            self.loop_state = LoopState::Idle;
            return false;
        }
        let Some(document) = self.document.as_ref() else {
            self.loop_state = LoopState::Idle;
            return false;
        };

        let dt = if dt.is_nan() {
            0.0
        } else {
            dt.clamp(0.0, self.config.max_frame_delta)
        };

        // Every line is classified before any spring sees a new target.
        let lines = document.lines();
        let classifier = self.classifier;
        let now = self.current_time;
        self.classifications.clear();
        self.classifications
            .extend((0..lines.len()).map(|index| classifier.classify(lines, index, now)));

        let active = classifier.active_index(lines, now);
        if active != self.stats.active_index {
            tracing::debug!(?active, previous = ?self.stats.active_index, time = now, "active line changed");
        }

        let range = self.config.animation_range;
        let presets = self.config.springs;
        let fast_threshold = self.config.fast_line_threshold;
        let mut stepped_lines = 0;
        let mut assigned_lines = 0;
        let mut animating = false;

        for (index, (line, classification)) in self
            .lines
            .iter_mut()
            .zip(&self.classifications)
            .enumerate()
        {
            let targets = self.curves.targets_for(classification);
            let near = active.is_some_and(|active| active.abs_diff(index) <= range);

            if near {
                let glow = if classification.state == LineState::Active
                    && classification.duration < fast_threshold
                {
                    presets.fast
                } else {
                    presets.smooth
                };
                line.set_glow_config(glow);

                let transition = transition_between(line.last_state(), classification.state);
                if transition == Transition::Snap {
                    tracing::trace!(
                        index,
                        from = ?line.last_state(),
                        to = ?classification.state,
                        "snapping line"
                    );
                }
                line.set_targets(targets, transition);
                line.step(dt);
                stepped_lines += 1;
                animating |= !line.is_at_rest();
            } else {
                line.set_targets(targets, Transition::Snap);
                assigned_lines += 1;
            }

            line.set_last_state(classification.state);
        }

        if let Some(active) = active {
            if self.scroll.follow(active, self.layout.as_ref()) {
                tracing::debug!(active, goal = self.scroll.goal(), "scroll goal moved");
            }
        }
        if active.is_some() || !self.scroll.is_at_rest() {
            self.scroll.step(dt);
        }

        self.stats = TickStats {
            active_index: active,
            stepped_lines,
            assigned_lines,
            animating,
        };
        tracing::trace!(stepped_lines, assigned_lines, animating, "tick");

        let keep_going = self.is_playing || animating || !self.scroll.is_at_rest();
        self.loop_state = if keep_going {
            LoopState::Running
        } else {
            LoopState::Idle
        };
        keep_going
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Active line as of the most recent tick.
    pub fn active_index(&self) -> Option<usize> {
        self.stats.active_index
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll.offset()
    }

    pub fn scroll(&self) -> &ScrollFollower {
        &self.scroll
    }

    pub fn line(&self, index: usize) -> Option<&LineAnimation> {
        self.lines.get(index)
    }

    pub fn line_state(&self, index: usize) -> Option<LineState> {
        self.lines.get(index).map(LineAnimation::last_state)
    }

    pub fn line_style(&self, index: usize) -> Option<LineStyle> {
        self.lines.get(index).map(LineAnimation::style)
    }

    pub fn styles(&self) -> impl Iterator<Item = LineStyle> + '_ {
        self.lines.iter().map(LineAnimation::style)
    }

    /// Lines within the animation range of the active line.
    pub fn snapshot(&self) -> FrameSnapshot {
        let lines = match self.stats.active_index {
            Some(active) => {
                let range = self.config.animation_range;
                let start = active.saturating_sub(range);
                let end = active.saturating_add(range).min(self.lines.len().saturating_sub(1));
                (start..=end)
                    .filter_map(|index| {
                        self.lines.get(index).map(|line| LineSnapshot {
                            index,
                            state: line.last_state(),
                            style: line.style(),
                        })
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        FrameSnapshot {
            time: self.current_time,
            active_index: self.stats.active_index,
            scroll_offset: self.scroll.offset(),
            lines,
        }
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("config", &self.config)
            .field("lines", &self.lines.len())
            .field("current_time", &self.current_time)
            .field("is_playing", &self.is_playing)
            .field("generation", &self.generation)
            .field("loop_state", &self.loop_state)
            .field("stop_requested", &self.stop_requested)
            .field("stats", &self.stats)
            .finish()
    }
}
