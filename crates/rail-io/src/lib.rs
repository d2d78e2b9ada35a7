//! External interfaces for the track vibration simulator (§6, A3): the rail
//! profile table, the serializable run configuration, persisted deflection
//! and response artifacts, and validation-dataset loading.

pub mod config;
pub mod error;
pub mod persist;
pub mod rail_table;
pub mod validation;

pub use config::{
    DistanceArrangementSpec, ExcitationSpec, PadArrangementSpec, PadSpec, RunConfig,
    SleeperArrangementSpec, TrackLayoutSpec,
};
pub use error::{IoError, Result};
pub use persist::{
    read_deflection_binary, write_deflection_binary, write_response_csv, DeflectionMatrix,
    ResponseRow,
};
pub use rail_table::RailProfileTable;
pub use validation::{load_path as load_validation_path, load_str as load_validation_str, ValidationDataset};
