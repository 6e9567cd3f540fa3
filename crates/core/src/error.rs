/// Result alias that carries the custom [`LyricMotionError`] type.
pub type Result<T> = std::result::Result<T, LyricMotionError>;

/// Common error type for the core crate.
///
/// Only the edges of the engine produce these: building spring configs and
/// easing curves from user data, or loading documents and configuration from
/// disk. The per-frame path clamps instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum LyricMotionError {
    /// Free-form message, mostly surfaced by the command line front-end.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON document or configuration.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// A spring parameter was zero, negative, or not finite.
    #[error("invalid spring config: {field} must be positive and finite, got {value}")]
    InvalidSpring { field: &'static str, value: f32 },
    /// Control points cannot form a natural cubic spline.
    #[error("invalid easing curve: {0}")]
    InvalidCurve(&'static str),
    /// Engine configuration failed validation.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

impl LyricMotionError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for LyricMotionError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}
