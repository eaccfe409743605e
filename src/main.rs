//! Argon cluster molecular-dynamics CLI.
//!
//! Reads a YAML parameter file (falling back to the documented defaults on
//! invalid input), runs the thermalization + production loop and writes the
//! trajectory, observable table and final means under the output directory.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};

use argon_md::output::{setup_output, ObservableWriter, XyzWriter};
use argon_md::{Simulation, SystemConfig};

/// Molecular dynamics of a soft-wall confined argon cluster
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML parameter file; defaults apply when absent
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Directory for trajectory and observable files
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,

    /// Override the RNG seed for momentum sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Log file (default: stdout)
    #[arg(short, long)]
    log_file: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    setup_output(args.log_file.as_ref());

    let mut config = load_config(args.config_file.as_deref());
    if let Some(seed) = args.seed {
        info!("Overriding RNG seed with: {}", seed);
        config.seed = Some(seed);
    }
    info!(
        "Simulating {} atoms for {} + {} steps (tau = {})",
        config.n_atoms(),
        config.thermalization_steps,
        config.production_steps,
        config.time_step
    );

    fs::create_dir_all(&args.out_dir)
        .wrap_err_with(|| format!("Unable to create output directory: {:?}", args.out_dir))?;

    let mut sim = Simulation::new(config)?;
    sim.initialize_state();

    // Initial positions and momenta, one labeled record per atom
    let mut r0 = XyzWriter::new(writer(&args.out_dir, "r0.txt")?);
    r0.write_frame(&sim.system().positions)?;
    r0.flush()?;
    let mut p0 = XyzWriter::new(writer(&args.out_dir, "p0.txt")?);
    p0.write_frame(&sim.system().momenta)?;
    p0.flush()?;

    sim.initialize_forces()
        .wrap_err("Initial force evaluation failed")?;

    let mut trajectory = XyzWriter::new(writer(&args.out_dir, "rt.txt")?);
    let mut observables = ObservableWriter::new(writer(&args.out_dir, "htp.txt")?);
    let means = sim
        .run(&mut trajectory, &mut observables)
        .wrap_err("Simulation run failed")?;

    let mut mean_out = ObservableWriter::new(writer(&args.out_dir, "htp-mean.txt")?);
    mean_out.write_means(&means)?;
    mean_out.flush()?;

    info!("Results written to {:?}", args.out_dir);
    Ok(())
}

/// Load the parameter file, substituting the full default configuration when
/// it is missing or invalid. Configuration errors are never fatal here.
fn load_config(path: Option<&Path>) -> SystemConfig {
    match path {
        Some(path) => match SystemConfig::from_file(path) {
            Ok(config) => {
                info!("Configuration loaded from {:?}", path);
                config
            }
            Err(err) => {
                warn!("{}", err);
                warn!("Falling back to default parameters");
                SystemConfig::default()
            }
        },
        None => {
            info!("No parameter file given, using default parameters");
            SystemConfig::default()
        }
    }
}

fn writer(dir: &Path, name: &str) -> Result<BufWriter<File>> {
    let path = dir.join(name);
    let file =
        File::create(&path).wrap_err_with(|| format!("Unable to create output file: {:?}", path))?;
    Ok(BufWriter::new(file))
}
