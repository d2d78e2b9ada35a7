//! Error types shared by the track model and the solver.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

/// The three error kinds of the simulation pipeline: configuration errors are
/// recoverable at the caller, numerical errors abort a run in progress, and
/// postprocessing conditions are soft (clamp-and-warn, see [`Warning`]).
#[derive(Error, Debug)]
pub enum SimError {
    #[error("configuration error in field `{field}`: {message}")]
    Configuration { field: String, message: String },

    #[error("numerical error: {0}")]
    Numerical(String),
}

impl SimError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        SimError::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn numerical(message: impl Into<String>) -> Self {
        SimError::Numerical(message.into())
    }
}

/// A soft, non-fatal condition recorded during postprocessing: the caller
/// gets a clamped/truncated result plus this explanation rather than an
/// aborted run.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub code: &'static str,
    pub message: String,
}

impl Warning {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Warning {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_formats_field_and_message() {
        let err = SimError::config("mount_count", "must be nonzero");
        assert_eq!(
            err.to_string(),
            "configuration error in field `mount_count`: must be nonzero"
        );
    }

    #[test]
    fn warning_formats_with_code() {
        let w = Warning::new("response_clamped", "x_r outside domain, clamped to boundary");
        assert_eq!(
            w.to_string(),
            "[response_clamped] x_r outside domain, clamped to boundary"
        );
    }
}
