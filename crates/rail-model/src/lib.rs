//! Track configuration model: immutable component records (C1), the track
//! builder and its mount map (C2), arrangement generators for non-uniform
//! tracks, and exact-decimal mount-position arithmetic.

pub mod arrangement;
pub mod components;
pub mod decimal;
pub mod error;
pub mod track;

pub use components::{
    Ballast, ContinuousPad, DiscretePad, Rail, RailRoughness, Sleeper, Slab, Wheel,
    WheelGreensfunc, WheelRoughness, RIGID_SLAB_MASS,
};
pub use error::{Result, SimError, Warning};
pub use track::{MountMap, MountPoint, Track, TrackKind};
