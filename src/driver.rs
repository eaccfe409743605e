//! Run orchestration: phase sequencing, the main loop and sampling cadence.

use std::io::Write;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use crate::config::SystemConfig;
use crate::error::Error;
use crate::forces::ForceField;
use crate::integrate::VelocityVerlet;
use crate::lattice;
use crate::observables::{MeanObservables, ObservableSnapshot, RunningMeans};
use crate::output::{ObservableWriter, XyzWriter};
use crate::system::{ParticleSystem, Phase};

/// One simulation run over a validated configuration.
///
/// Phases are strictly ordered: `initialize_state` places the lattice and
/// samples momenta, `initialize_forces` performs the first force pass, and
/// `run` executes the thermalization + production loop. Calling them out of
/// order returns `Error::NotReady` and performs no physics.
pub struct Simulation {
    config: SystemConfig,
    system: ParticleSystem,
    field: ForceField,
    integrator: VelocityVerlet,
}

impl Simulation {
    pub fn new(config: SystemConfig) -> Result<Self, Error> {
        config.validate()?;
        let system = ParticleSystem::new(&config);
        let field = ForceField::from_config(&config);
        let integrator = VelocityVerlet::new(config.time_step, config.mass);
        Ok(Self {
            config,
            system,
            field,
            integrator,
        })
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    /// Phase 1: lattice placement and momentum sampling.
    pub fn initialize_state(&mut self) {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        lattice::initialize(&mut self.system, &self.config, &mut rng);
    }

    /// Phase 2: force pass over the initial configuration.
    pub fn initialize_forces(&mut self) -> Result<(), Error> {
        self.require_phase(Phase::PositionsReady)?;

        let eval = self.field.evaluate(&self.system.positions)?;
        self.system.apply_forces(eval);
        self.system.set_phase(Phase::ForcesReady);
        info!(
            "initial forces ready, total potential = {:.5}",
            self.system.potential
        );
        Ok(())
    }

    /// Phase 3: the main loop over `So + Sd` steps.
    ///
    /// Emits the t=0 records first, then per step: a trajectory frame every
    /// `Sxyz` steps, an observable record every `Sout` steps, and for
    /// `s >= So` feeds the instantaneous observables into the running means.
    /// Returns the finalized means.
    pub fn run<WT: Write, WO: Write>(
        &mut self,
        trajectory: &mut XyzWriter<WT>,
        observables: &mut ObservableWriter<WO>,
    ) -> Result<MeanObservables, Error> {
        self.require_phase(Phase::ForcesReady)?;

        let initial = ObservableSnapshot::measure(&self.system, &self.config, 0.0);
        observables.write_header()?;
        observables.write_snapshot(&initial)?;
        trajectory.write_frame(&self.system.positions)?;
        log_checkpoint(&initial);

        let so = self.config.thermalization_steps;
        let sd = self.config.production_steps;
        let tau = self.config.time_step;
        let checkpoint_every = (sd / 10).max(1);

        let mut means = RunningMeans::default();

        for s in 1..=(so + sd) {
            self.integrator.step(&mut self.system, &self.field)?;
            let time = s as f64 * tau;

            if s % checkpoint_every == 0 {
                log_checkpoint(&ObservableSnapshot::measure(&self.system, &self.config, time));
            }
            if self.config.trajectory_interval != 0 && s % self.config.trajectory_interval == 0 {
                trajectory.write_frame(&self.system.positions)?;
            }
            if self.config.observable_interval != 0 && s % self.config.observable_interval == 0 {
                observables
                    .write_snapshot(&ObservableSnapshot::measure(&self.system, &self.config, time))?;
            }
            if s >= so {
                means.accumulate(&ObservableSnapshot::measure(&self.system, &self.config, time));
            }
        }

        trajectory.flush()?;
        observables.flush()?;
        self.system.set_phase(Phase::Complete);

        let means = means.finalize(sd);
        info!(
            "run complete: <H> = {:.5}, <T> = {:.5}, <P> = {:.5}",
            means.hamiltonian, means.temperature, means.pressure
        );
        Ok(means)
    }

    fn require_phase(&self, required: Phase) -> Result<(), Error> {
        let current = self.system.phase();
        if current != required {
            error!(
                "phase {} requested while system is {}; run aborted",
                required, current
            );
            return Err(Error::NotReady { required, current });
        }
        Ok(())
    }
}

fn log_checkpoint(snap: &ObservableSnapshot) {
    info!(
        "t = {:.5}: H = {:.5}, V = {:.5}, T = {:.5}, P = {:.5}",
        snap.time, snap.hamiltonian, snap.potential, snap.temperature, snap.pressure
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tiny_config() -> SystemConfig {
        let mut config = SystemConfig::default();
        config.edge_count = 2;
        config.initial_temperature = 0.0;
        config.thermalization_steps = 0;
        config.production_steps = 1;
        config.observable_interval = 1;
        config.trajectory_interval = 1;
        config.seed = Some(1);
        config
    }

    fn sinks() -> (XyzWriter<Vec<u8>>, ObservableWriter<Vec<u8>>) {
        (XyzWriter::new(Vec::new()), ObservableWriter::new(Vec::new()))
    }

    #[test]
    fn run_before_initialization_is_rejected() {
        let mut sim = Simulation::new(tiny_config()).unwrap();
        let (mut traj, mut obs) = sinks();
        assert!(matches!(
            sim.run(&mut traj, &mut obs),
            Err(Error::NotReady { .. })
        ));
    }

    #[test]
    fn forces_before_state_are_rejected() {
        let mut sim = Simulation::new(tiny_config()).unwrap();
        assert!(matches!(
            sim.initialize_forces(),
            Err(Error::NotReady { .. })
        ));
    }

    #[test]
    fn run_requires_initial_forces() {
        let mut sim = Simulation::new(tiny_config()).unwrap();
        sim.initialize_state();
        let (mut traj, mut obs) = sinks();
        assert!(matches!(
            sim.run(&mut traj, &mut obs),
            Err(Error::NotReady { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let mut config = tiny_config();
        config.time_step = 0.0;
        assert!(matches!(Simulation::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn cold_start_single_step_conserves_initial_potential() {
        let mut sim = Simulation::new(tiny_config()).unwrap();
        sim.initialize_state();

        // T0 = 0 drives every sampled momentum to zero
        assert!(sim.system().momenta.iter().all(|p| p.norm() == 0.0));

        sim.initialize_forces().unwrap();
        let v0 = sim.system().potential;
        let r0 = sim.system().positions.clone();

        let (mut traj, mut obs) = sinks();
        let means = sim.run(&mut traj, &mut obs).unwrap();

        // KE started at zero, so H after one small step equals the initial V
        // to within the integration error of that step
        assert_relative_eq!(means.hamiltonian, v0, max_relative = 1e-4);
        // The atoms moved purely under inter-particle and wall forces
        assert!(sim
            .system()
            .positions
            .iter()
            .zip(&r0)
            .any(|(now, before)| (now - before).norm() > 0.0));
        assert_eq!(sim.system().phase(), Phase::Complete);
    }

    #[test]
    fn completed_run_cannot_be_rerun_without_reinit() {
        let mut sim = Simulation::new(tiny_config()).unwrap();
        sim.initialize_state();
        sim.initialize_forces().unwrap();
        let (mut traj, mut obs) = sinks();
        sim.run(&mut traj, &mut obs).unwrap();
        assert!(matches!(
            sim.run(&mut traj, &mut obs),
            Err(Error::NotReady { .. })
        ));
    }

    #[test]
    fn sampling_cadence_matches_intervals() {
        let mut config = tiny_config();
        config.production_steps = 4;
        config.observable_interval = 2;
        config.trajectory_interval = 2;
        let mut sim = Simulation::new(config).unwrap();
        sim.initialize_state();
        sim.initialize_forces().unwrap();

        let mut traj_buf = Vec::new();
        let mut obs_buf = Vec::new();
        {
            let mut traj = XyzWriter::new(&mut traj_buf);
            let mut obs = ObservableWriter::new(&mut obs_buf);
            sim.run(&mut traj, &mut obs).unwrap();
        }

        // t=0 frame plus frames at s = 2 and s = 4
        let traj_text = String::from_utf8(traj_buf).unwrap();
        assert_eq!(traj_text.matches("AR ").count(), 3 * 8);

        // header, t=0 row, rows at s = 2 and s = 4
        let obs_text = String::from_utf8(obs_buf).unwrap();
        assert_eq!(obs_text.lines().count(), 4);
    }

    #[test]
    fn lone_particle_run_is_trivial() {
        let mut config = tiny_config();
        config.edge_count = 1;
        config.production_steps = 10;
        let mut sim = Simulation::new(config).unwrap();
        sim.initialize_state();
        sim.initialize_forces().unwrap();

        // No pair interactions: V is the wall term only, which is zero at the origin
        assert_eq!(sim.system().potential, 0.0);

        let (mut traj, mut obs) = sinks();
        let means = sim.run(&mut traj, &mut obs).unwrap();
        assert_eq!(means.hamiltonian, 0.0);
        assert_eq!(means.temperature, 0.0);
        assert_eq!(means.pressure, 0.0);
    }
}
