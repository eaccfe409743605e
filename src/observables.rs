//! Thermodynamic observables derived from the instantaneous state.

use std::f64::consts::PI;

use crate::config::SystemConfig;
use crate::system::ParticleSystem;

/// One instantaneous measurement, never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservableSnapshot {
    pub time: f64,
    /// Total potential energy
    pub potential: f64,
    /// Total energy H = V + sum of kinetic energies
    pub hamiltonian: f64,
    /// Equipartition temperature, 3 degrees of freedom per atom
    pub temperature: f64,
    /// Boundary-flux pressure: wall-force magnitude per unit sphere surface
    pub pressure: f64,
}

impl ObservableSnapshot {
    /// Measure H, T and P from the current momenta and wall forces.
    pub fn measure(system: &ParticleSystem, config: &SystemConfig, time: f64) -> Self {
        let n = system.n_atoms() as f64;
        let mut hamiltonian = system.potential;
        let mut temperature = 0.0;
        let mut pressure = 0.0;

        let temp_per_ke = 2.0 / (3.0 * n * config.k_boltzmann);
        let inv_surface = 1.0 / (4.0 * PI * config.wall_radius * config.wall_radius);

        for (p, f_wall) in system.momenta.iter().zip(&system.wall_forces) {
            let kinetic = p.norm_squared() / (2.0 * system.mass());
            hamiltonian += kinetic;
            temperature += temp_per_ke * kinetic;
            pressure += f_wall.norm() * inv_surface;
        }

        Self {
            time,
            potential: system.potential,
            hamiltonian,
            temperature,
            pressure,
        }
    }
}

/// Final time-averaged observables of a production window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanObservables {
    pub hamiltonian: f64,
    pub temperature: f64,
    pub pressure: f64,
}

/// Accumulates H, T and P over the production steps.
#[derive(Debug, Default)]
pub struct RunningMeans {
    hamiltonian: f64,
    temperature: f64,
    pressure: f64,
}

impl RunningMeans {
    pub fn accumulate(&mut self, snapshot: &ObservableSnapshot) {
        self.hamiltonian += snapshot.hamiltonian;
        self.temperature += snapshot.temperature;
        self.pressure += snapshot.pressure;
    }

    /// Divide the sums by the production step count `Sd`.
    pub fn finalize(self, production_steps: usize) -> MeanObservables {
        let inv = 1.0 / production_steps as f64;
        MeanObservables {
            hamiltonian: self.hamiltonian * inv,
            temperature: self.temperature * inv,
            pressure: self.pressure * inv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn one_atom_config() -> SystemConfig {
        let mut config = SystemConfig::default();
        config.edge_count = 1;
        config
    }

    #[test]
    fn lone_atom_observables_follow_directly() {
        let config = one_atom_config();
        let mut system = ParticleSystem::new(&config);
        system.momenta[0] = Vector3::new(1.0, 2.0, 2.0); // |p|^2 = 9
        system.potential = 0.5;
        system.wall_forces[0] = Vector3::new(3.0, 0.0, 4.0); // |F| = 5

        let snap = ObservableSnapshot::measure(&system, &config, 0.1);
        let ke = 9.0 / 2.0;
        assert_relative_eq!(snap.hamiltonian, 0.5 + ke, epsilon = 1e-12);
        assert_relative_eq!(
            snap.temperature,
            2.0 / (3.0 * config.k_boltzmann) * ke,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            snap.pressure,
            5.0 / (4.0 * PI * 25.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn temperature_and_pressure_are_non_negative() {
        let config = one_atom_config();
        let mut system = ParticleSystem::new(&config);
        system.momenta[0] = Vector3::new(-0.3, 0.7, -0.1);
        system.wall_forces[0] = Vector3::new(-2.0, 1.0, 0.0);

        let snap = ObservableSnapshot::measure(&system, &config, 0.0);
        assert!(snap.temperature >= 0.0);
        assert!(snap.pressure >= 0.0);
    }

    #[test]
    fn at_rest_hamiltonian_equals_potential() {
        let config = one_atom_config();
        let mut system = ParticleSystem::new(&config);
        system.potential = -3.25;

        let snap = ObservableSnapshot::measure(&system, &config, 0.0);
        assert_eq!(snap.hamiltonian, -3.25);
        assert_eq!(snap.temperature, 0.0);
        assert_eq!(snap.pressure, 0.0);
    }

    #[test]
    fn means_divide_by_production_steps() {
        let mut means = RunningMeans::default();
        for i in 1..=4 {
            means.accumulate(&ObservableSnapshot {
                time: i as f64,
                potential: 0.0,
                hamiltonian: 2.0,
                temperature: 1.0,
                pressure: 0.5,
            });
        }
        let out = means.finalize(4);
        assert_relative_eq!(out.hamiltonian, 2.0, epsilon = 1e-12);
        assert_relative_eq!(out.temperature, 1.0, epsilon = 1e-12);
        assert_relative_eq!(out.pressure, 0.5, epsilon = 1e-12);
    }
}
