//! Per-line animated properties and the easing curves that feed them.

use serde::{Deserialize, Serialize};

use crate::{Classification, LineState, SplineCurve, Spring, SpringConfig, Transition};

/// The four numbers a rendering shell applies to one line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub scale: f32,
    /// Vertical offset in a caller-defined unit.
    pub y_offset: f32,
    pub opacity: f32,
    pub glow: f32,
}

impl LineStyle {
    /// Resting look of lines that have not started yet.
    pub const FUTURE: Self = Self {
        scale: 0.95,
        y_offset: 0.01,
        opacity: 0.35,
        glow: 0.0,
    };

    /// Resting look of lines that already finished.
    pub const PAST: Self = Self {
        scale: 0.92,
        y_offset: 0.0,
        opacity: 0.3,
        glow: 0.0,
    };
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::FUTURE
    }
}

/// Easing curves mapping progress through the active line to target values.
#[derive(Debug, Clone, PartialEq)]
pub struct EasingCurves {
    pub scale: SplineCurve,
    pub y_offset: SplineCurve,
    pub opacity: SplineCurve,
    pub glow: SplineCurve,
}

impl EasingCurves {
    pub fn standard() -> Self {
        Self {
            // Ease into full size, then hold.
            scale: SplineCurve::from_validated(&[0.0, 0.5, 1.0], &[0.95, 1.0, 1.0]),
            // Small downward settle, then rest.
            y_offset: SplineCurve::from_validated(&[0.0, 0.5, 1.0], &[0.01, 0.0, 0.0]),
            // Most of the fade-in happens early.
            opacity: SplineCurve::from_validated(&[0.0, 0.3, 1.0], &[0.35, 0.7, 1.0]),
            glow: SplineCurve::from_validated(&[0.0, 0.3, 0.7, 1.0], &[0.0, 0.3, 0.7, 1.0]),
        }
    }

    pub fn sample(&self, progress: f32) -> LineStyle {
        let progress = progress.clamp(0.0, 1.0);
        LineStyle {
            scale: self.scale.at(progress),
            y_offset: self.y_offset.at(progress),
            opacity: self.opacity.at(progress),
            glow: self.glow.at(progress),
        }
    }

    /// Target style for a line given its classification.
    pub fn targets_for(&self, classification: &Classification) -> LineStyle {
        match classification.state {
            LineState::Future => LineStyle::FUTURE,
            LineState::Active => self.sample(classification.progress),
            LineState::Past => LineStyle::PAST,
        }
    }
}

impl Default for EasingCurves {
    fn default() -> Self {
        Self::standard()
    }
}

/// Chooses how a line's new targets are applied after a state change.
///
/// Entering or leaving `Past` is treated as discontinuous and snaps; every
/// other change keeps the springs travelling.
pub fn transition_between(previous: LineState, current: LineState) -> Transition {
    let entered_past = previous != LineState::Past && current == LineState::Past;
    let left_past = previous == LineState::Past && current != LineState::Past;
    if entered_past || left_past {
        Transition::Snap
    } else {
        Transition::Continuous
    }
}

/// Animation state of a single line: four independent springs plus the
/// state it was classified as on the previous tick.
#[derive(Debug, Clone)]
pub struct LineAnimation {
    scale: Spring,
    y_offset: Spring,
    opacity: Spring,
    glow: Spring,
    last_state: LineState,
}

impl LineAnimation {
    /// A line resting at the future style.
    pub fn new(config: SpringConfig) -> Self {
        let style = LineStyle::FUTURE;
        Self {
            scale: Spring::new(style.scale, config),
            y_offset: Spring::new(style.y_offset, config),
            opacity: Spring::new(style.opacity, config),
            glow: Spring::new(style.glow, config),
            last_state: LineState::Future,
        }
    }

    pub fn set_targets(&mut self, targets: LineStyle, transition: Transition) {
        self.scale.set_goal(targets.scale, transition);
        self.y_offset.set_goal(targets.y_offset, transition);
        self.opacity.set_goal(targets.opacity, transition);
        self.glow.set_goal(targets.glow, transition);
    }

    pub fn set_glow_config(&mut self, config: SpringConfig) {
        self.glow.set_config(config);
    }

    pub fn step(&mut self, dt: f32) {
        self.scale.step(dt);
        self.y_offset.step(dt);
        self.opacity.step(dt);
        self.glow.step(dt);
    }

    pub fn is_at_rest(&self) -> bool {
        self.scale.is_at_rest()
            && self.y_offset.is_at_rest()
            && self.opacity.is_at_rest()
            && self.glow.is_at_rest()
    }

    /// Current values of all four springs.
    pub fn style(&self) -> LineStyle {
        LineStyle {
            scale: self.scale.value(),
            y_offset: self.y_offset.value(),
            opacity: self.opacity.value(),
            glow: self.glow.value(),
        }
    }

    pub fn last_state(&self) -> LineState {
        self.last_state
    }

    pub(crate) fn set_last_state(&mut self, state: LineState) {
        self.last_state = state;
    }

    pub fn scale(&self) -> &Spring {
        &self.scale
    }

    pub fn y_offset(&self) -> &Spring {
        &self.y_offset
    }

    pub fn opacity(&self) -> &Spring {
        &self.opacity
    }

    pub fn glow(&self) -> &Spring {
        &self.glow
    }
}
