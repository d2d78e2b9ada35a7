//! Error type for rail-io: wraps the shared simulation error plus the
//! I/O- and serialization-specific failures this crate can hit.

use rail_model::SimError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown rail profile: {0}")]
    UnknownProfile(String),

    #[error("malformed data file: {0}")]
    MalformedData(String),
}
