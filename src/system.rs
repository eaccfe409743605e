//! Per-particle state storage and the run-phase machine.

use nalgebra::Vector3;
use std::fmt;

use crate::config::SystemConfig;
use crate::forces::ForceEval;

/// Lifecycle of a simulation run. Phases are strictly ordered; each transition
/// requires the previous phase to have completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Uninitialized,
    PositionsReady,
    ForcesReady,
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Uninitialized => "uninitialized",
            Phase::PositionsReady => "positions-ready",
            Phase::ForcesReady => "forces-ready",
            Phase::Complete => "complete",
        };
        write!(f, "{}", name)
    }
}

/// Owns the mutable per-particle state of one run: positions, momenta, the
/// forces from the most recent evaluation, and the wall contributions needed
/// by the pressure estimator.
///
/// A parameter reload constructs a fresh `ParticleSystem` sized for the new
/// atom count; instances are never resized in place.
pub struct ParticleSystem {
    pub positions: Vec<Vector3<f64>>,
    pub momenta: Vec<Vector3<f64>>,
    pub forces: Vec<Vector3<f64>>,
    pub wall_forces: Vec<Vector3<f64>>,
    pub wall_potentials: Vec<f64>,
    /// Total potential energy at the last force evaluation
    pub potential: f64,
    mass: f64,
    phase: Phase,
}

impl ParticleSystem {
    /// Allocate zeroed state for the atom count given by `config`.
    pub fn new(config: &SystemConfig) -> Self {
        let n = config.n_atoms();
        Self {
            positions: vec![Vector3::zeros(); n],
            momenta: vec![Vector3::zeros(); n],
            forces: vec![Vector3::zeros(); n],
            wall_forces: vec![Vector3::zeros(); n],
            wall_potentials: vec![0.0; n],
            potential: 0.0,
            mass: config.mass,
            phase: Phase::Uninitialized,
        }
    }

    pub fn n_atoms(&self) -> usize {
        self.positions.len()
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Store the results of a force evaluation.
    pub fn apply_forces(&mut self, eval: ForceEval) {
        self.forces = eval.forces;
        self.wall_forces = eval.wall_forces;
        self.wall_potentials = eval.wall_potentials;
        self.potential = eval.potential;
    }

    /// Absolute momentum of every particle, e.g. for a speed histogram.
    pub fn momentum_magnitudes(&self) -> Vec<f64> {
        self.momenta.iter().map(|p| p.norm()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::Uninitialized < Phase::PositionsReady);
        assert!(Phase::PositionsReady < Phase::ForcesReady);
        assert!(Phase::ForcesReady < Phase::Complete);
    }

    #[test]
    fn allocates_per_config() {
        let mut config = SystemConfig::default();
        config.edge_count = 2;
        let system = ParticleSystem::new(&config);
        assert_eq!(system.n_atoms(), 8);
        assert_eq!(system.phase(), Phase::Uninitialized);
        assert!(system.momenta.iter().all(|p| p.norm() == 0.0));
    }

    #[test]
    fn momentum_magnitudes_match_state() {
        let mut config = SystemConfig::default();
        config.edge_count = 1;
        let mut system = ParticleSystem::new(&config);
        system.momenta[0] = Vector3::new(3.0, 4.0, 0.0);
        assert_eq!(system.momentum_magnitudes(), vec![5.0]);
    }
}
