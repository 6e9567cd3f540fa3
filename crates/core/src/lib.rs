//! Core library for the Lyric Motion engine.
//!
//! Given a time-synced lyrics document and a moving playback clock, the
//! engine computes per-line style values (scale, vertical offset, opacity,
//! glow) and a scroll offset every frame. Lines near the active one are
//! driven by damped springs whose targets come from cubic easing curves;
//! distant lines take their targets directly so per-frame cost stays bounded
//! by the animation range rather than the document length.

pub mod animation;
pub mod classify;
pub mod config;
pub mod document;
pub mod error;
pub mod scheduler;
pub mod scroll;
pub mod spline;
pub mod spring;
pub mod timeline;

pub use animation::{transition_between, EasingCurves, LineAnimation, LineStyle};
pub use classify::{Classification, LineClassifier, LineState};
pub use config::{EngineConfig, LayoutConfig, SpringPresets};
pub use document::{LyricLine, LyricsDocument};
pub use error::{LyricMotionError, Result};
pub use scheduler::{AnimationScheduler, FrameSnapshot, FrameToken, LineSnapshot, TickStats};
pub use scroll::{LineLayout, ScrollFollower, UniformLayout};
pub use spline::SplineCurve;
pub use spring::{Spring, SpringConfig, Transition};
pub use timeline::{
    FrameLoop, FrameSource, LoopReport, ManualFrames, PlaybackAction, PlaybackClock,
    PlaybackScript, RealtimeFrames, ScheduledEvent,
};
