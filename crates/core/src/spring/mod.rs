//! Damped spring integrator used for every animated property in the engine.
//!
//! Each [`Spring`] advances one scalar toward its target with semi-implicit
//! Euler integration. Springs come to rest by snapping once both the distance
//! to the target and the velocity fall under the config's `precision`.
//!
//! A frame is split into equal sub-steps short enough for the integrator to
//! stay stable, so stiff or heavily damped configs converge at any frame rate.

use serde::{Deserialize, Serialize};

use crate::{LyricMotionError, Result};

/// Sub-steps allowed per call to [`Spring::step`]. A config that needs more
/// cannot be resolved at this frame rate and settles on its target at once.
const MAX_SUBSTEPS: f32 = 1024.0;

/// Physical parameters of a spring. All four values are positive and finite;
/// the only way to build one is through [`SpringConfig::new`] or the presets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSpringConfig")]
pub struct SpringConfig {
    stiffness: f32,
    damping: f32,
    mass: f32,
    precision: f32,
}

impl SpringConfig {
    /// Preset for normally paced lines.
    pub const SMOOTH: Self = Self {
        stiffness: 170.0,
        damping: 26.0,
        mass: 1.0,
        precision: 0.001,
    };

    /// Preset for lines shorter than the fast-line threshold.
    pub const FAST: Self = Self {
        stiffness: 300.0,
        damping: 34.0,
        mass: 1.0,
        precision: 0.001,
    };

    /// Preset for the scroll follower. Precision is in layout units.
    pub const SCROLL: Self = Self {
        stiffness: 120.0,
        damping: 30.0,
        mass: 1.0,
        precision: 0.5,
    };

    pub fn new(stiffness: f32, damping: f32, mass: f32, precision: f32) -> Result<Self> {
        let config = Self {
            stiffness: positive("stiffness", stiffness)?,
            damping: positive("damping", damping)?,
            mass: positive("mass", mass)?,
            precision: positive("precision", precision)?,
        };
        Ok(config)
    }

    pub fn stiffness(&self) -> f32 {
        self.stiffness
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn precision(&self) -> f32 {
        self.precision
    }

    /// Ratio of the configured damping to critical damping.
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    /// Longest integration step that keeps semi-implicit Euler stable, with
    /// a factor of two to spare.
    ///
    /// The step stays stable while `h²·k/m + 2·h·c/m < 4`; bounding both
    /// `h·sqrt(k/m)` and `h·c/m` by one half satisfies it.
    pub fn max_substep(&self) -> f32 {
        let natural_frequency = (self.stiffness / self.mass).sqrt();
        let decay = self.damping / self.mass;
        0.5 / natural_frequency.max(decay)
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::SMOOTH
    }
}

fn positive(field: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(LyricMotionError::InvalidSpring { field, value })
    }
}

#[derive(Deserialize)]
struct RawSpringConfig {
    stiffness: f32,
    damping: f32,
    #[serde(default = "default_mass")]
    mass: f32,
    #[serde(default = "default_precision")]
    precision: f32,
}

fn default_mass() -> f32 {
    1.0
}

fn default_precision() -> f32 {
    SpringConfig::SMOOTH.precision
}

impl TryFrom<RawSpringConfig> for SpringConfig {
    type Error = LyricMotionError;

    fn try_from(raw: RawSpringConfig) -> Result<Self> {
        Self::new(raw.stiffness, raw.damping, raw.mass, raw.precision)
    }
}

/// How a new goal is applied to a spring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    /// Keep the current value and velocity and let the spring travel.
    #[default]
    Continuous,
    /// Jump straight to the goal and come to rest.
    Snap,
}

/// A single damped harmonic oscillator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    value: f32,
    velocity: f32,
    target: f32,
    config: SpringConfig,
}

impl Spring {
    /// Creates a spring resting at `value`.
    pub fn new(value: f32, config: SpringConfig) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
            config,
        }
    }

    /// Advances the simulation by `dt` seconds and returns the new value.
    ///
    /// Non-positive or non-finite steps leave the spring untouched. Steps
    /// longer than [`SpringConfig::max_substep`] are integrated in equal
    /// slices.
    pub fn step(&mut self, dt: f32) -> f32 {
        if !(dt.is_finite() && dt > 0.0) {
            return self.value;
        }
        if self.value == self.target && self.velocity == 0.0 {
            return self.value;
        }

        let substeps = (dt / self.config.max_substep()).ceil();
        if !(substeps <= MAX_SUBSTEPS) {
            tracing::trace!(
                config = ?self.config,
                dt,
                "spring too stiff for this frame, settling on target"
            );
            self.value = self.target;
            self.velocity = 0.0;
            return self.value;
        }

        let substeps = substeps.max(1.0) as u32;
        let h = dt / substeps as f32;
        for _ in 0..substeps {
            self.integrate(h);
            if self.is_at_rest() {
                self.value = self.target;
                self.velocity = 0.0;
                break;
            }
        }

        self.value
    }

    fn integrate(&mut self, h: f32) {
        let SpringConfig {
            stiffness,
            damping,
            mass,
            ..
        } = self.config;

        let spring_force = -stiffness * (self.value - self.target);
        let damping_force = -damping * self.velocity;
        let acceleration = (spring_force + damping_force) / mass;

        self.velocity += acceleration * h;
        self.value += self.velocity * h;
    }

    pub fn set_goal(&mut self, target: f32, transition: Transition) {
        self.target = target;
        if transition == Transition::Snap {
            self.value = target;
            self.velocity = 0.0;
        }
    }

    /// Swaps the physical parameters mid-flight without resetting motion.
    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }

    pub fn is_at_rest(&self) -> bool {
        let precision = self.config.precision;
        (self.value - self.target).abs() < precision && self.velocity.abs() < precision
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }
}
