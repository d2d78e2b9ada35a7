use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rail_io::{
    read_deflection_binary, write_deflection_binary, write_response_csv, DistanceArrangementSpec,
    PadArrangementSpec, RailProfileTable, ResponseRow, RunConfig, SleeperArrangementSpec,
    TrackLayoutSpec,
};
use rail_model::arrangement::{Arrangement, PeriodicArrangement, StochasticArrangement, TruncatedNormalArrangement};
use rail_model::track::{
    build_arranged_ballasted, build_arranged_slab, build_cont_ballasted, build_cont_slab,
    build_periodic_ballasted, build_periodic_slab,
};
use rail_model::{Ballast, ContinuousPad, DiscretePad, Sleeper, Slab, Track};
use rail_solver::{Discretization, Excitation, Response, Solver};

fn pad_arrangement(spec: &PadArrangementSpec) -> Box<dyn Arrangement<DiscretePad>> {
    match spec {
        PadArrangementSpec::Periodic { items } => {
            Box::new(PeriodicArrangement::new(items.iter().map(|p| DiscretePad::new(p.sp, p.dp)).collect()))
        }
        PadArrangementSpec::Random { items, seed } => {
            Box::new(StochasticArrangement::new(items.iter().map(|p| DiscretePad::new(p.sp, p.dp)).collect(), *seed))
        }
    }
}

fn sleeper_arrangement(spec: &SleeperArrangementSpec) -> Box<dyn Arrangement<Sleeper>> {
    match spec {
        SleeperArrangementSpec::Periodic { masses } => {
            Box::new(PeriodicArrangement::new(masses.iter().map(|&m| Sleeper::new(m)).collect()))
        }
        SleeperArrangementSpec::Random { masses, seed } => {
            Box::new(StochasticArrangement::new(masses.iter().map(|&m| Sleeper::new(m)).collect(), *seed))
        }
    }
}

fn distance_arrangement(spec: &DistanceArrangementSpec) -> Box<dyn Arrangement<f64>> {
    match spec {
        DistanceArrangementSpec::Periodic { items } => Box::new(PeriodicArrangement::new(items.clone())),
        DistanceArrangementSpec::Random { items, seed } => {
            Box::new(StochasticArrangement::new(items.clone(), *seed))
        }
        DistanceArrangementSpec::TruncatedNormal { mean, sd, min, max, seed } => {
            Box::new(TruncatedNormalArrangement::new(*mean, *sd, *min, *max, *seed))
        }
    }
}

fn usage() {
    eprintln!("usage:");
    eprintln!("  rail-cli run <config.json> <deflection_out.bin> [response_out.csv]");
    eprintln!("  rail-cli dump-rail-profiles [profiles.csv]");
    eprintln!("  rail-cli inspect-deflection <deflection.bin>");
    eprintln!("  rail-cli --help");
    eprintln!("  rail-cli --version");
    eprintln!();
    eprintln!("examples:");
    eprintln!("  rail-cli run run_config.json out/deflection.bin out/response.csv");
    eprintln!("  rail-cli dump-rail-profiles");
    eprintln!("  rail-cli inspect-deflection out/deflection.bin");
}

fn track_from_layout(rail: rail_model::Rail, layout: &TrackLayoutSpec) -> Result<Track, String> {
    match layout {
        TrackLayoutSpec::ContSlab { sp, dp, l_track } => {
            build_cont_slab(rail, ContinuousPad::new(*sp, *dp), *l_track).map_err(|err| err.to_string())
        }
        TrackLayoutSpec::ContBallasted { sp, dp, slab_mass, sb, db, l_track } => build_cont_ballasted(
            rail,
            ContinuousPad::new(*sp, *dp),
            Slab::new(*slab_mass),
            Ballast::new(*sb, *db),
            *l_track,
        )
        .map_err(|err| err.to_string()),
        TrackLayoutSpec::PeriodicSlab { sp, dp, distance, count } => {
            build_periodic_slab(rail, DiscretePad::new(*sp, *dp), *distance, *count).map_err(|err| err.to_string())
        }
        TrackLayoutSpec::PeriodicBallasted { sp, dp, sleeper_mass, sb, db, distance, count } => {
            build_periodic_ballasted(
                rail,
                DiscretePad::new(*sp, *dp),
                Sleeper::new(*sleeper_mass),
                Ballast::new(*sb, *db),
                *distance,
                *count,
            )
            .map_err(|err| err.to_string())
        }
        TrackLayoutSpec::ArrangedSlab { pad, distance, count } => {
            let pad_arr = pad_arrangement(pad);
            let distance_arr = distance_arrangement(distance);
            build_arranged_slab(rail, pad_arr.as_ref(), distance_arr.as_ref(), *count).map_err(|err| err.to_string())
        }
        TrackLayoutSpec::ArrangedBallasted { pad, sleeper, sb, db, distance, count } => {
            let pad_arr = pad_arrangement(pad);
            let sleeper_arr = sleeper_arrangement(sleeper);
            let distance_arr = distance_arrangement(distance);
            build_arranged_ballasted(
                rail,
                pad_arr.as_ref(),
                sleeper_arr.as_ref(),
                Ballast::new(*sb, *db),
                distance_arr.as_ref(),
                *count,
            )
            .map_err(|err| err.to_string())
        }
    }
}

fn excitation_from_spec(spec: rail_io::ExcitationSpec) -> (Excitation, f64) {
    match spec {
        rail_io::ExcitationSpec::StationaryGaussian { x_excit, sigma, amplitude } => {
            (Excitation::StationaryGaussian { x_excit, sigma, amplitude }, x_excit)
        }
        rail_io::ExcitationSpec::MovingConstant { x0, velocity, amplitude, ramp_fraction } => (
            Excitation::MovingConstant { x_excit: vec![x0], velocity, amplitude, ramp_fraction },
            x0,
        ),
    }
}

fn run_simulation(
    config_path: &Path,
    deflection_out: &Path,
    response_out: Option<&Path>,
) -> Result<(), String> {
    let config = RunConfig::from_path(config_path).map_err(|err| err.to_string())?;

    let table = RailProfileTable::embedded();
    let rail = table.get(&config.rail_name).map_err(|err| err.to_string())?.clone();
    let track = track_from_layout(rail, &config.track)?;

    println!("building discretization for {}", config.rail_name);
    let disc = Discretization::build(&track, config.boundary_length, config.boundary_alpha, config.dt, config.t_req, config.bx)
        .map_err(|err| err.to_string())?;
    println!("nx={} nt={} dx={:.6}", disc.nx, disc.nt, disc.dx);

    let (excitation, driving_point) = excitation_from_spec(config.excitation);

    let solver = Solver::new(&disc).map_err(|err| err.to_string())?;
    let result = solver.run(&excitation).map_err(|err| err.to_string())?;
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    let rows = result.u.nrows();
    let cols = result.u.ncols();
    let mut data = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            data.push(result.u[(r, c)]);
        }
    }
    write_deflection_binary(deflection_out, rows, cols, &data).map_err(|err| err.to_string())?;
    println!("wrote deflection history to {}", deflection_out.display());

    if let Some(response_path) = response_out {
        let response = Response::compute(&result, disc.dx, disc.n_b, disc.l_track(), &[driving_point], 1.0, 2000.0, 0.05);
        let csv_rows: Vec<ResponseRow> = response
            .frequencies_hz
            .iter()
            .enumerate()
            .map(|(i, &frequency_hz)| ResponseRow {
                frequency_hz,
                receptance_magnitude: response.receptance[0][i].norm(),
                mobility_magnitude: response.mobility[0][i].norm(),
            })
            .collect();
        write_response_csv(response_path, &csv_rows).map_err(|err| err.to_string())?;
        println!("wrote frequency response to {}", response_path.display());
    }

    Ok(())
}

fn dump_rail_profiles(out: Option<&Path>) -> Result<(), String> {
    let table = RailProfileTable::embedded();
    let mut lines = vec!["name,e,m_r,iy,d_r".to_string()];
    for name in table.names() {
        let rail = table.get(name).map_err(|err| err.to_string())?;
        lines.push(format!("{},{},{},{},{}", rail.name, rail.e, rail.m_r, rail.iy, rail.d_r));
    }
    let text = lines.join("\n");
    match out {
        Some(path) => {
            std::fs::write(path, text).map_err(|err| err.to_string())?;
            println!("wrote rail profile table to {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn inspect_deflection(path: &Path) -> Result<(), String> {
    let matrix = read_deflection_binary(path).map_err(|err| err.to_string())?;
    println!("rows: {}", matrix.rows);
    println!("cols: {}", matrix.cols);
    let min = matrix.data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = matrix.data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    println!("min: {min:e}");
    println!("max: {max:e}");
    Ok(())
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("help") | Some("-h") | Some("--help") => {
            usage();
            ExitCode::SUCCESS
        }
        Some("--version") | Some("-V") => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Some("run") => {
            if args.len() != 4 && args.len() != 5 {
                usage();
                return ExitCode::from(2);
            }
            let config_path = Path::new(&args[2]);
            let deflection_out = Path::new(&args[3]);
            let response_out = args.get(4).map(|s| Path::new(s.as_str()));
            match run_simulation(config_path, deflection_out, response_out) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("run error: {err}");
                    ExitCode::from(1)
                }
            }
        }
        Some("dump-rail-profiles") => {
            if args.len() > 3 {
                usage();
                return ExitCode::from(2);
            }
            let out = args.get(2).map(|s| Path::new(s.as_str()));
            match dump_rail_profiles(out) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("dump-rail-profiles error: {err}");
                    ExitCode::from(1)
                }
            }
        }
        Some("inspect-deflection") => {
            if args.len() != 3 {
                usage();
                return ExitCode::from(2);
            }
            let path = Path::new(&args[2]);
            match inspect_deflection(path) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("inspect-deflection error: {err}");
                    ExitCode::from(1)
                }
            }
        }
        _ => {
            usage();
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_file(prefix: &str, ext: &str) -> PathBuf {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be valid")
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}_{pid}_{nanos}.{ext}"))
    }

    fn sample_config() -> RunConfig {
        RunConfig {
            rail_name: "UIC60".to_string(),
            track: TrackLayoutSpec::ContSlab { sp: 3.0e8, dp: 3.0e4, l_track: 90.0 },
            boundary_length: 32.73,
            boundary_alpha: 7.0,
            dt: 2.0e-5,
            t_req: 0.02,
            bx: 1.0,
            excitation: rail_io::ExcitationSpec::StationaryGaussian { x_excit: 45.3, sigma: 7.0e-5, amplitude: 50.0 },
        }
    }

    #[test]
    fn track_from_layout_builds_cont_slab() {
        let rail = rail_model::Rail::uic60();
        let layout = TrackLayoutSpec::ContSlab { sp: 3.0e8, dp: 3.0e4, l_track: 90.0 };
        let track = track_from_layout(rail, &layout).expect("track should build");
        assert!(track.is_continuous());
        assert!(!track.has_ballast());
    }

    #[test]
    fn track_from_layout_builds_arranged_slab() {
        let rail = rail_model::Rail::uic60();
        let layout = TrackLayoutSpec::ArrangedSlab {
            pad: rail_io::PadArrangementSpec::Periodic {
                items: vec![rail_io::PadSpec { sp: 1.8e8, dp: 3.0e4 }],
            },
            distance: rail_io::DistanceArrangementSpec::Periodic { items: vec![0.6] },
            count: 50,
        };
        let track = track_from_layout(rail, &layout).expect("track should build");
        assert!(!track.is_continuous());
        assert!(!track.has_ballast());
        assert_eq!(track.mounts().unwrap().points().len(), 50);
    }

    #[test]
    fn run_simulation_writes_deflection_and_response_files() {
        let config_path = unique_temp_file("rail_cli_run_config", "json");
        let deflection_path = unique_temp_file("rail_cli_run_deflection", "bin");
        let response_path = unique_temp_file("rail_cli_run_response", "csv");

        sample_config().write_path(&config_path).expect("config should write");

        run_simulation(&config_path, &deflection_path, Some(&response_path)).expect("run should succeed");

        let matrix = read_deflection_binary(&deflection_path).expect("deflection should read back");
        assert!(matrix.rows > 0);
        assert!(matrix.cols > 0);
        assert!(response_path.exists());

        let _ = std::fs::remove_file(&config_path);
        let _ = std::fs::remove_file(&deflection_path);
        let _ = std::fs::remove_file(&response_path);
    }

    #[test]
    fn dump_rail_profiles_writes_known_names() {
        let out_path = unique_temp_file("rail_cli_profiles", "csv");
        dump_rail_profiles(Some(&out_path)).expect("dump should succeed");
        let text = std::fs::read_to_string(&out_path).expect("file should exist");
        assert!(text.contains("UIC60"));
        assert!(text.contains("UIC54"));
        let _ = std::fs::remove_file(&out_path);
    }
}
