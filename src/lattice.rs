//! Initial condition generation: lattice placement and momentum sampling.

use nalgebra::Vector3;
use rand::Rng;
use rand_distr::OpenClosed01;
use tracing::info;

use crate::config::SystemConfig;
use crate::system::{ParticleSystem, Phase};

/// The three primitive cell edges of the close-packed lattice, scaled by the
/// spacing `a`.
pub fn basis_vectors(a: f64) -> [Vector3<f64>; 3] {
    [
        Vector3::new(a, 0.0, 0.0),
        Vector3::new(0.5 * a, 0.5 * a * 3.0_f64.sqrt(), 0.0),
        Vector3::new(0.5 * a, a * 3.0_f64.sqrt() / 6.0, a * 6.0_f64.sqrt() / 3.0),
    ]
}

/// Place atoms on the lattice and sample initial momenta consistent with the
/// target temperature, then remove the net momentum so the center of mass is
/// at rest. Transitions the system to `PositionsReady`.
pub fn initialize<R: Rng>(system: &mut ParticleSystem, config: &SystemConfig, rng: &mut R) {
    place_on_lattice(system, config);
    sample_momenta(system, config, rng);
    remove_net_momentum(system);
    system.set_phase(Phase::PositionsReady);
    info!("initial positions and momenta ready ({} atoms)", system.n_atoms());
}

/// Positions atom `i = i0 + i1*n + i2*n^2` at
/// `(i0 - (n-1)/2)*b0 + (i1 - (n-1)/2)*b1 + (i2 - (n-1)/2)*b2`, centering the
/// cluster at the origin.
fn place_on_lattice(system: &mut ParticleSystem, config: &SystemConfig) {
    let n = config.edge_count;
    let [b0, b1, b2] = basis_vectors(config.spacing);
    let shift = 0.5 * (n as f64 - 1.0);

    for i2 in 0..n {
        for i1 in 0..n {
            for i0 in 0..n {
                let i = i0 + i1 * n + i2 * n * n;
                system.positions[i] = b0 * (i0 as f64 - shift)
                    + b1 * (i1 as f64 - shift)
                    + b2 * (i2 as f64 - shift);
            }
        }
    }
}

/// Per particle and axis, |p| = sqrt(-k T0 m ln u) with u in (0, 1] and a
/// uniform random sign. One generator drives both draws so a run is fully
/// reproducible from its seed.
fn sample_momenta<R: Rng>(system: &mut ParticleSystem, config: &SystemConfig, rng: &mut R) {
    let kt_m = config.k_boltzmann * config.initial_temperature * config.mass;

    for p in &mut system.momenta {
        for axis in 0..3 {
            let u: f64 = rng.sample(OpenClosed01);
            let magnitude = (-kt_m * u.ln()).sqrt();
            p[axis] = if rng.gen_bool(0.5) { magnitude } else { -magnitude };
        }
    }
}

/// Subtract the mean momentum per axis from every particle. The integrator
/// conserves total momentum, so any residual drift would bias the temperature
/// and pressure estimates for the whole run.
fn remove_net_momentum(system: &mut ParticleSystem) {
    let n = system.n_atoms() as f64;
    let total: Vector3<f64> = system.momenta.iter().sum();
    let correction = total / n;
    for p in &mut system.momenta {
        *p -= correction;
    }
}
