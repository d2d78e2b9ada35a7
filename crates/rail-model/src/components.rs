//! Immutable parameter bundles for rail, pad, sleeper/slab and ballast.
//!
//! Every field here is a required scalar: unlike a deck-parsed material
//! definition, these records are always fully specified before a track is
//! built (see [`crate::track`]).

use serde::{Deserialize, Serialize};

/// A named wavelength/amplitude roughness spectrum attached to a rail
/// profile. Carried for wheel/rail contact analyses outside this core; the
/// discretizer and solver never read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RailRoughness {
    pub name: String,
    pub wavelengths_m: Vec<f64>,
    pub amplitudes_m: Vec<f64>,
}

/// Bending-relevant rail scalars plus secondary geometric attributes that
/// the core carries but never reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rail {
    pub name: String,
    /// Young's modulus [Pa]
    pub e: f64,
    /// Shear modulus [Pa]
    pub g: f64,
    /// Poisson ratio
    pub nu: f64,
    /// Shear correction factor
    pub kappa: f64,
    /// Mass per unit length [kg/m]
    pub m_r: f64,
    /// Material density [kg/m^3]
    pub rho: f64,
    /// Loss factor
    pub eta_r: f64,
    /// Viscous damping coefficient [N*s/m^2]
    pub d_r: f64,
    /// Area moment about the bending axis [m^4]
    pub iy: f64,
    /// Secondary area moment, unused by the core [m^4]
    pub iz: f64,
    /// Torsional constant, unused by the core [m^4]
    pub it: f64,
    /// Cross-sectional area [m^2]
    pub area: f64,
    /// Shear area [m^2]
    pub shear_area: f64,
    /// Rail volume per unit length [m^3/m]
    pub volume_per_length: f64,
    pub roughness: Option<RailRoughness>,
}

impl Rail {
    /// UIC60, the reference profile used throughout the testable-scenario
    /// table: E=210 GPa, m_r=60.2 kg/m, Iy=3038.30 cm^4.
    pub fn uic60() -> Self {
        Rail {
            name: "UIC60".to_string(),
            e: 210.0e9,
            g: 81.0e9,
            nu: 0.3,
            kappa: 0.4,
            m_r: 60.2,
            rho: 7850.0,
            eta_r: 0.01,
            d_r: 1000.0,
            iy: 3038.30e-8,
            iz: 512.30e-8,
            it: 209.20e-8,
            area: 76.70e-4,
            shear_area: 0.688,
            volume_per_length: 7670.00e-6,
            roughness: None,
        }
    }

    /// UIC54, the lighter companion profile.
    pub fn uic54() -> Self {
        Rail {
            name: "UIC54".to_string(),
            e: 210.0e9,
            g: 81.0e9,
            nu: 0.3,
            kappa: 0.4,
            m_r: 54.0,
            rho: 7850.0,
            eta_r: 0.01,
            d_r: 1000.0,
            iy: 2337.90e-8,
            iz: 436.00e-8,
            it: 180.60e-8,
            area: 69.34e-4,
            shear_area: 0.62,
            volume_per_length: 6934.00e-6,
            roughness: None,
        }
    }
}

/// A stiffness/damping pair per transverse direction, `[vertical, lateral]`.
/// Discrete pads carry total values [N/m, N*s/m]; continuous pads carry
/// per-unit-length values [N/m^2, N*s/m^2]. The core only ever reads the
/// vertical component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscretePad {
    pub stiffness: [f64; 2],
    pub damping: [f64; 2],
    pub loss_factor: Option<f64>,
}

impl DiscretePad {
    pub fn new(stiffness_vertical: f64, damping_vertical: f64) -> Self {
        DiscretePad {
            stiffness: [stiffness_vertical, 0.0],
            damping: [damping_vertical, 0.0],
            loss_factor: None,
        }
    }

    pub fn vertical_stiffness(&self) -> f64 {
        self.stiffness[0]
    }

    pub fn vertical_damping(&self) -> f64 {
        self.damping[0]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousPad {
    pub stiffness: [f64; 2],
    pub damping: [f64; 2],
    pub loss_factor: Option<f64>,
}

impl ContinuousPad {
    pub fn new(stiffness_vertical: f64, damping_vertical: f64) -> Self {
        ContinuousPad {
            stiffness: [stiffness_vertical, 0.0],
            damping: [damping_vertical, 0.0],
            loss_factor: None,
        }
    }

    pub fn vertical_stiffness(&self) -> f64 {
        self.stiffness[0]
    }

    pub fn vertical_damping(&self) -> f64 {
        self.damping[0]
    }
}

/// Sentinel mass used to model a rigid slab: the second-layer equation
/// collapses to zero motion when m_s is set this large. Preserved exactly
/// to match the reference model's mechanical trick.
pub const RIGID_SLAB_MASS: f64 = 1.0e20;

/// A lumped mass sleeper plus secondary geometric attributes, unused by the
/// core, carried for completeness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sleeper {
    pub mass: f64,
    pub bearing_area: f64,
    pub length: f64,
    pub width: f64,
}

impl Sleeper {
    pub fn new(mass: f64) -> Self {
        Sleeper {
            mass,
            bearing_area: 0.0,
            length: 0.0,
            width: 0.0,
        }
    }
}

/// A lumped mass slab, simpler than [`Sleeper`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slab {
    pub mass: f64,
    pub length: f64,
}

impl Slab {
    pub fn new(mass: f64) -> Self {
        Slab { mass, length: 0.0 }
    }

    /// A rigid slab: mass is set to [`RIGID_SLAB_MASS`].
    pub fn rigid() -> Self {
        Slab {
            mass: RIGID_SLAB_MASS,
            length: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ballast {
    pub stiffness: [f64; 2],
    pub damping: [f64; 2],
}

impl Ballast {
    pub fn new(stiffness_vertical: f64, damping_vertical: f64) -> Self {
        Ballast {
            stiffness: [stiffness_vertical, 0.0],
            damping: [damping_vertical, 0.0],
        }
    }

    pub fn vertical_stiffness(&self) -> f64 {
        self.stiffness[0]
    }

    pub fn vertical_damping(&self) -> f64 {
        self.damping[0]
    }
}

/// Inert data carriers for wheel/rail contact mechanics. Non-goal per the
/// core's scope: constructed and stored alongside track components by the
/// originating system, but never read by the discretizer, solver, or
/// postprocessing in this repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wheel {
    pub name: String,
    pub mass: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelRoughness {
    pub name: String,
    pub wavelengths_m: Vec<f64>,
    pub amplitudes_m: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelGreensfunc {
    pub name: String,
    pub frequencies_hz: Vec<f64>,
    pub receptance: Vec<f64>,
}
