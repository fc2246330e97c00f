//! Configuration errors surfaced at construction time.

use thiserror::Error;

/// Invalid configuration detected while building a component.
///
/// These are fatal at initialization: callers surface them immediately and
/// never substitute defaults.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A duration was negative, NaN or infinite.
    #[error("{name} must be a finite, non-negative duration (got {value})")]
    InvalidDuration {
        /// Field being validated.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A `[min, max]` range was inverted, non-finite or not strictly positive.
    #[error("{name} must satisfy 0 < min <= max (got {min}..={max})")]
    InvalidRange {
        /// Field being validated.
        name: &'static str,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },
    /// A probability, gain or intensity fell outside `[0, 1]`.
    #[error("{name} must lie within [0, 1] (got {value})")]
    OutOfUnitRange {
        /// Field being validated.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A value that must be finite and non-negative was not.
    #[error("{name} must be finite and non-negative (got {value})")]
    Negative {
        /// Field being validated.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A value that must be finite was NaN or infinite.
    #[error("{name} must be finite (got {value})")]
    NonFinite {
        /// Field being validated.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A required set was empty.
    #[error("{name} requires at least one entry")]
    EmptySet {
        /// Field being validated.
        name: &'static str,
    },
    /// A weather condition name or index did not match any condition.
    #[error("unknown weather condition: {0}")]
    UnknownCondition(String),
    /// An index into a configured list was out of range.
    #[error("{name} index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// List being indexed.
        name: &'static str,
        /// Requested index.
        index: usize,
        /// List length.
        len: usize,
    },
}

/// Validate a duration: finite and `>= 0`.
pub fn validate_duration(name: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidDuration { name, value })
    }
}

/// Validate a wait range used by a randomized scheduler.
pub fn validate_range(name: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min > 0.0 && min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { name, min, max })
    }
}

/// Validate a value in `[0, 1]`.
pub fn validate_unit(name: &'static str, value: f32) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfUnitRange { name, value })
    }
}

/// Validate a finite, non-negative magnitude.
pub fn validate_non_negative(name: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
