//! Time-domain finite-difference simulator of a two-layer Euler-Bernoulli
//! beam on an elastic foundation, plus FFT-based frequency-domain
//! postprocessing.
//!
//! Component order mirrors the dependency chain: a [`Track`](rail_model::Track)
//! from `rail-model` is turned into a [`discretization::Discretization`] (C3,
//! consuming the [`boundary`] PML ramp of C4), an [`excitation::Excitation`]
//! (C5) is chosen independently, the two are handed to
//! [`solver::Solver`] (C6) to produce a [`solver::DeflectionResult`], and
//! [`postprocess`] (C7) turns that into receptance/mobility/accelerance and
//! track decay rate.

pub mod analytical;
pub mod boundary;
pub mod discretization;
pub mod excitation;
pub mod postprocess;
pub mod solver;

pub use analytical::{AnalyticalReference, StubAnalyticalReference};
pub use boundary::pml_ramp;
pub use discretization::Discretization;
pub use excitation::Excitation;
pub use postprocess::{
    pinned_pinned_frequency, sleeper_passing_frequency, track_decay_rate, Response, TrackDecayRatePoint,
};
pub use solver::{DeflectionResult, Solver};
