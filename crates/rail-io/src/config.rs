//! Run configuration: a serializable track + simulation specification,
//! loadable from a file or constructed in-process, so the CLI front end and
//! test fixtures share one representation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "layout")]
pub enum TrackLayoutSpec {
    ContSlab {
        sp: f64,
        dp: f64,
        l_track: f64,
    },
    ContBallasted {
        sp: f64,
        dp: f64,
        slab_mass: f64,
        sb: f64,
        db: f64,
        l_track: f64,
    },
    PeriodicSlab {
        sp: f64,
        dp: f64,
        distance: f64,
        count: u64,
    },
    PeriodicBallasted {
        sp: f64,
        dp: f64,
        sleeper_mass: f64,
        sb: f64,
        db: f64,
        distance: f64,
        count: u64,
    },
    ArrangedSlab {
        pad: PadArrangementSpec,
        distance: DistanceArrangementSpec,
        count: u64,
    },
    ArrangedBallasted {
        pad: PadArrangementSpec,
        sleeper: SleeperArrangementSpec,
        sb: f64,
        db: f64,
        distance: DistanceArrangementSpec,
        count: u64,
    },
}

/// A serializable `[sp, dp]` pair, the unit of a per-mount pad in an
/// arranged track.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PadSpec {
    pub sp: f64,
    pub dp: f64,
}

/// One of the two [`rail_model::arrangement::Arrangement`] generator
/// shapes, over a catalog of pads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PadArrangementSpec {
    #[serde(rename = "periodic")]
    Periodic { items: Vec<PadSpec> },
    #[serde(rename = "random")]
    Random { items: Vec<PadSpec>, seed: u64 },
}

/// Sleeper-catalog arrangement, used only by [`TrackLayoutSpec::ArrangedBallasted`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SleeperArrangementSpec {
    #[serde(rename = "periodic")]
    Periodic { masses: Vec<f64> },
    #[serde(rename = "random")]
    Random { masses: Vec<f64>, seed: u64 },
}

/// Mount-distance arrangement: a cyclic catalog, a uniform draw from a
/// catalog, or a truncated-normal continuous sampler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DistanceArrangementSpec {
    #[serde(rename = "periodic")]
    Periodic { items: Vec<f64> },
    #[serde(rename = "random")]
    Random { items: Vec<f64>, seed: u64 },
    #[serde(rename = "truncated-normal")]
    TruncatedNormal {
        mean: f64,
        sd: f64,
        min: f64,
        max: f64,
        seed: u64,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ExcitationSpec {
    #[serde(rename = "stationary-gaussian")]
    StationaryGaussian {
        x_excit: f64,
        sigma: f64,
        amplitude: f64,
    },
    #[serde(rename = "moving-constant")]
    MovingConstant {
        x0: f64,
        velocity: f64,
        amplitude: f64,
        ramp_fraction: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub rail_name: String,
    pub track: TrackLayoutSpec,
    pub boundary_length: f64,
    pub boundary_alpha: f64,
    pub dt: f64,
    pub t_req: f64,
    pub bx: f64,
    pub excitation: ExcitationSpec,
}

impl RunConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_path(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn sample_config() -> RunConfig {
        RunConfig {
            rail_name: "UIC60".to_string(),
            track: TrackLayoutSpec::PeriodicSlab {
                sp: 1.8e8,
                dp: 3.0e4,
                distance: 0.6,
                count: 150,
            },
            boundary_length: 32.73,
            boundary_alpha: 7.0,
            dt: 2.0e-5,
            t_req: 0.4,
            bx: 1.0,
            excitation: ExcitationSpec::StationaryGaussian {
                x_excit: 45.3,
                sigma: 7.0e-5,
                amplitude: 50.0,
            },
        }
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = sample_config();
        let path = unique_temp_file("run_config");
        cfg.write_path(&path).expect("config should write");
        let loaded = RunConfig::from_path(&path).expect("config should load");
        assert_eq!(loaded.rail_name, "UIC60");
        match loaded.track {
            TrackLayoutSpec::PeriodicSlab { count, .. } => assert_eq!(count, 150),
            _ => panic!("unexpected track layout"),
        }
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn arranged_track_round_trips_through_json() {
        let mut cfg = sample_config();
        cfg.track = TrackLayoutSpec::ArrangedSlab {
            pad: PadArrangementSpec::Periodic {
                items: vec![PadSpec { sp: 1.8e8, dp: 3.0e4 }],
            },
            distance: DistanceArrangementSpec::TruncatedNormal {
                mean: 0.6,
                sd: 0.05,
                min: 0.5,
                max: 0.7,
                seed: 7,
            },
            count: 120,
        };
        let path = unique_temp_file("run_config_arranged");
        cfg.write_path(&path).expect("config should write");
        let loaded = RunConfig::from_path(&path).expect("config should load");
        match loaded.track {
            TrackLayoutSpec::ArrangedSlab { count, distance, .. } => {
                assert_eq!(count, 120);
                assert!(matches!(distance, DistanceArrangementSpec::TruncatedNormal { seed: 7, .. }));
            }
            _ => panic!("unexpected track layout"),
        }
        let _ = std::fs::remove_file(&path);
    }

    fn unique_temp_file(prefix: &str) -> std::path::PathBuf {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be valid")
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}_{pid}_{nanos}.json"))
    }
}
