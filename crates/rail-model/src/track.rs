//! Track builder (C2): assembles a concrete track and its mount map.
//!
//! The source models tracks through a class hierarchy with runtime
//! `isinstance` dispatch inside the discretizer. Here the track is a tagged
//! variant; the discretizer (in `rail-solver`) pattern-matches it once to
//! build per-node property vectors.

use crate::arrangement::Arrangement;
use crate::components::{Ballast, ContinuousPad, DiscretePad, Rail, Sleeper, Slab, RIGID_SLAB_MASS};
use crate::decimal::{uniform_position, Microns};
use crate::error::{Result, SimError};

/// A single discrete mounting point: position plus the support it carries.
/// `sleeper` is `None` for slab tracks (the slab itself is shared, not
/// per-mount); `ballast` is `None` for unballasted tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct MountPoint {
    pub position: f64,
    pub pad: DiscretePad,
    pub sleeper: Option<Sleeper>,
    pub ballast: Option<Ballast>,
}

/// An ordered, strictly increasing sequence of mount points. Empty for
/// continuous tracks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountMap {
    points: Vec<MountPoint>,
}

impl MountMap {
    pub fn points(&self) -> &[MountPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn l_track(&self) -> f64 {
        self.points.last().map(|p| p.position).unwrap_or(0.0)
    }

    /// Builds a mount map from position/support pairs, validating the
    /// strictly-increasing, non-negative, deduplicated invariant from
    /// `SPEC_FULL.md` section 3.
    fn from_points(points: Vec<MountPoint>) -> Result<Self> {
        let mut last: Option<f64> = None;
        for p in &points {
            if p.position < 0.0 {
                return Err(SimError::config(
                    "mount_position",
                    format!("mount position {} is negative", p.position),
                ));
            }
            if let Some(prev) = last {
                if p.position <= prev {
                    return Err(SimError::config(
                        "mount_position",
                        format!(
                            "mount positions must be strictly increasing, got {} after {}",
                            p.position, prev
                        ),
                    ));
                }
            }
            last = Some(p.position);
        }
        Ok(MountMap { points })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackKind {
    ContSlab {
        pad: ContinuousPad,
        slab: Slab,
        l_track: f64,
    },
    ContBallasted {
        pad: ContinuousPad,
        slab: Slab,
        ballast: Ballast,
        l_track: f64,
    },
    PeriodicSlab {
        mounts: MountMap,
    },
    PeriodicBallasted {
        mounts: MountMap,
    },
    ArrangedSlab {
        mounts: MountMap,
    },
    ArrangedBallasted {
        mounts: MountMap,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub rail: Rail,
    pub kind: TrackKind,
}

impl Track {
    pub fn l_track(&self) -> f64 {
        match &self.kind {
            TrackKind::ContSlab { l_track, .. } => *l_track,
            TrackKind::ContBallasted { l_track, .. } => *l_track,
            TrackKind::PeriodicSlab { mounts }
            | TrackKind::PeriodicBallasted { mounts }
            | TrackKind::ArrangedSlab { mounts }
            | TrackKind::ArrangedBallasted { mounts } => mounts.l_track(),
        }
    }

    pub fn is_continuous(&self) -> bool {
        matches!(
            self.kind,
            TrackKind::ContSlab { .. } | TrackKind::ContBallasted { .. }
        )
    }

    pub fn has_ballast(&self) -> bool {
        matches!(
            self.kind,
            TrackKind::ContBallasted { .. }
                | TrackKind::PeriodicBallasted { .. }
                | TrackKind::ArrangedBallasted { .. }
        )
    }

    pub fn mounts(&self) -> Option<&MountMap> {
        match &self.kind {
            TrackKind::PeriodicSlab { mounts }
            | TrackKind::PeriodicBallasted { mounts }
            | TrackKind::ArrangedSlab { mounts }
            | TrackKind::ArrangedBallasted { mounts } => Some(mounts),
            _ => None,
        }
    }
}

/// Continuous rail on pad on rigid slab (1 support layer, no ballast).
pub fn build_cont_slab(rail: Rail, pad: ContinuousPad, l_track: f64) -> Result<Track> {
    if l_track <= 0.0 {
        return Err(SimError::config("l_track", "track length must be positive"));
    }
    Ok(Track {
        rail,
        kind: TrackKind::ContSlab {
            pad,
            slab: Slab::rigid(),
            l_track,
        },
    })
}

/// Continuous rail on pad on slab on ballast (2 support layers).
pub fn build_cont_ballasted(
    rail: Rail,
    pad: ContinuousPad,
    slab: Slab,
    ballast: Ballast,
    l_track: f64,
) -> Result<Track> {
    if l_track <= 0.0 {
        return Err(SimError::config("l_track", "track length must be positive"));
    }
    if slab.mass <= 0.0 {
        return Err(SimError::config("slab.mass", "slab mass must be positive"));
    }
    Ok(Track {
        rail,
        kind: TrackKind::ContBallasted {
            pad,
            slab,
            ballast,
            l_track,
        },
    })
}

fn uniform_mount_points(
    distance: f64,
    count: u64,
    pad: DiscretePad,
    sleeper: Option<Sleeper>,
    ballast: Option<Ballast>,
) -> Result<Vec<MountPoint>> {
    if count == 0 {
        return Err(SimError::config("mount_count", "mount count must be nonzero"));
    }
    if distance <= 0.0 {
        return Err(SimError::config("distance", "mount distance must be positive"));
    }
    let spacing = Microns::from_meters(distance);
    Ok((0..count)
        .map(|i| MountPoint {
            position: uniform_position(i, spacing).to_meters(),
            pad,
            sleeper,
            ballast,
        })
        .collect())
}

/// Uniformly, periodically mounted rail on pad on rigid slab.
pub fn build_periodic_slab(rail: Rail, pad: DiscretePad, distance: f64, count: u64) -> Result<Track> {
    let points = uniform_mount_points(distance, count, pad, None, None)?;
    let mounts = MountMap::from_points(points)?;
    Ok(Track {
        rail,
        kind: TrackKind::PeriodicSlab { mounts },
    })
}

/// Uniformly, periodically mounted rail on pad on sleeper on ballast.
pub fn build_periodic_ballasted(
    rail: Rail,
    pad: DiscretePad,
    sleeper: Sleeper,
    ballast: Ballast,
    distance: f64,
    count: u64,
) -> Result<Track> {
    let points = uniform_mount_points(distance, count, pad, Some(sleeper), Some(ballast))?;
    let mounts = MountMap::from_points(points)?;
    Ok(Track {
        rail,
        kind: TrackKind::PeriodicBallasted { mounts },
    })
}

/// Builds mount positions by exact-decimal accumulation of a lazily
/// generated distance sequence (the first mount sits at x=0; each
/// subsequent one is offset by the next drawn distance).
fn arranged_positions(distances: &[f64]) -> Result<Vec<f64>> {
    if distances.is_empty() {
        return Err(SimError::config(
            "distance_arrangement",
            "arrangement generator produced no distances before reaching the requested count",
        ));
    }
    let mut acc = Microns::ZERO;
    let mut out = Vec::with_capacity(distances.len());
    out.push(acc.to_meters());
    for d in &distances[..distances.len() - 1] {
        if *d <= 0.0 {
            return Err(SimError::config(
                "distance_arrangement",
                format!("arranged mount distance {} must be positive", d),
            ));
        }
        acc = acc + Microns::from_meters(*d);
        out.push(acc.to_meters());
    }
    Ok(out)
}

/// Rail on pad on rigid slab, with per-mount pad and spacing drawn from
/// arrangement generators.
pub fn build_arranged_slab(
    rail: Rail,
    pad_arr: &dyn Arrangement<DiscretePad>,
    distance_arr: &dyn Arrangement<f64>,
    count: u64,
) -> Result<Track> {
    if count == 0 {
        return Err(SimError::config("mount_count", "mount count must be nonzero"));
    }
    let count = count as usize;
    let pads = pad_arr.generate(count);
    if pads.len() < count {
        return Err(SimError::config(
            "pad_arrangement",
            "arrangement generator produced fewer pads than the requested count",
        ));
    }
    let distances = distance_arr.generate(count);
    let positions = arranged_positions(&distances)?;
    let points = positions
        .into_iter()
        .zip(pads.into_iter())
        .map(|(position, pad)| MountPoint {
            position,
            pad,
            sleeper: None,
            ballast: None,
        })
        .collect();
    let mounts = MountMap::from_points(points)?;
    Ok(Track {
        rail,
        kind: TrackKind::ArrangedSlab { mounts },
    })
}

/// Rail on pad on sleeper on ballast, with per-mount pad, sleeper and
/// spacing drawn from arrangement generators; ballast is shared (ballast
/// normally varies far more slowly than pad/sleeper spacing in practice).
pub fn build_arranged_ballasted(
    rail: Rail,
    pad_arr: &dyn Arrangement<DiscretePad>,
    sleeper_arr: &dyn Arrangement<Sleeper>,
    ballast: Ballast,
    distance_arr: &dyn Arrangement<f64>,
    count: u64,
) -> Result<Track> {
    if count == 0 {
        return Err(SimError::config("mount_count", "mount count must be nonzero"));
    }
    let count = count as usize;
    let pads = pad_arr.generate(count);
    let sleepers = sleeper_arr.generate(count);
    if pads.len() < count || sleepers.len() < count {
        return Err(SimError::config(
            "component_arrangement",
            "arrangement generator produced fewer items than the requested count",
        ));
    }
    let distances = distance_arr.generate(count);
    let positions = arranged_positions(&distances)?;
    let points = positions
        .into_iter()
        .zip(pads.into_iter())
        .zip(sleepers.into_iter())
        .map(|((position, pad), sleeper)| MountPoint {
            position,
            pad,
            sleeper: Some(sleeper),
            ballast: Some(ballast),
        })
        .collect();
    let mounts = MountMap::from_points(points)?;
    Ok(Track {
        rail,
        kind: TrackKind::ArrangedBallasted { mounts },
    })
}
