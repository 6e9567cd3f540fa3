//! Scroll follower that keeps the active line vertically centered.

use crate::{LayoutConfig, Spring, SpringConfig, Transition};

/// Reports where lines sit inside the scrolling container.
///
/// Implemented by the rendering shell; the engine only asks for the scroll
/// offset that centers a given line.
pub trait LineLayout {
    fn center_offset(&self, index: usize) -> f32;
}

impl<F> LineLayout for F
where
    F: Fn(usize) -> f32,
{
    fn center_offset(&self, index: usize) -> f32 {
        self(index)
    }
}

/// Every line has the same height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformLayout {
    pub line_height: f32,
    pub viewport_height: f32,
}

impl From<LayoutConfig> for UniformLayout {
    fn from(config: LayoutConfig) -> Self {
        Self {
            line_height: config.line_height,
            viewport_height: config.viewport_height,
        }
    }
}

impl LineLayout for UniformLayout {
    fn center_offset(&self, index: usize) -> f32 {
        let line_center = index as f32 * self.line_height + self.line_height / 2.0;
        (line_center - self.viewport_height / 2.0).max(0.0)
    }
}

/// Spring-driven scroll position. The goal only moves when the followed line
/// changes, so layout jitter never restarts the motion.
#[derive(Debug, Clone)]
pub struct ScrollFollower {
    spring: Spring,
    followed: Option<usize>,
}

impl ScrollFollower {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            spring: Spring::new(0.0, config),
            followed: None,
        }
    }

    /// Points the follower at line `index`. Returns `true` when the goal moved.
    pub fn follow(&mut self, index: usize, layout: &dyn LineLayout) -> bool {
        if self.followed == Some(index) {
            return false;
        }
        self.followed = Some(index);
        self.spring
            .set_goal(layout.center_offset(index), Transition::Continuous);
        true
    }

    pub fn step(&mut self, dt: f32) -> f32 {
        self.spring.step(dt)
    }

    pub fn offset(&self) -> f32 {
        self.spring.value()
    }

    pub fn goal(&self) -> f32 {
        self.spring.target()
    }

    pub fn followed_index(&self) -> Option<usize> {
        self.followed
    }

    pub fn is_at_rest(&self) -> bool {
        self.spring.is_at_rest()
    }

    /// Returns to the top of the container and forgets the followed line.
    pub fn reset(&mut self) {
        self.spring.set_goal(0.0, Transition::Snap);
        self.followed = None;
    }
}

impl Default for ScrollFollower {
    fn default() -> Self {
        Self::new(SpringConfig::SCROLL)
    }
}
