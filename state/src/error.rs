use thiserror::Error;

/// Rejected setup data. Only ever produced when building simulation components, never
/// during a frame step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} must be in {range}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        range: &'static str,
    },

    #[error("{name} must be finite")]
    NotFinite { name: &'static str },

    #[error("a track needs at least {required} checkpoints, got {count}")]
    TooFewCheckpoints { count: usize, required: usize },

    #[error("checkpoints {0} and {1} are at the same position")]
    DuplicateCheckpoint(usize, usize),
}
