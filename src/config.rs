//! Simulation parameters, validation and YAML loading.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Error;

/// Immutable constants describing one simulation run.
///
/// All fields carry serde defaults, so a parameter file only needs to name the
/// values it overrides. The defaults reproduce the reference argon cluster
/// (343 atoms, reduced argon units).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SystemConfig {
    /// Number of atoms along each crystal edge (`n`); total atoms `n^3`
    #[serde(default = "default_edge_count")]
    pub edge_count: usize,
    /// Mass of a single atom
    #[serde(default = "default_mass")]
    pub mass: f64,
    /// Depth of the pair-potential well (`e`)
    #[serde(default = "default_well_depth")]
    pub well_depth: f64,
    /// Interatomic distance at the potential minimum (`R`)
    #[serde(default = "default_r_min")]
    pub r_min: f64,
    /// Boltzmann constant in simulation units (`k`)
    #[serde(default = "default_k_boltzmann")]
    pub k_boltzmann: f64,
    /// Elastic coefficient of the confining sphere (`f`)
    #[serde(default = "default_wall_stiffness")]
    pub wall_stiffness: f64,
    /// Radius of the confining sphere (`L`)
    #[serde(default = "default_wall_radius")]
    pub wall_radius: f64,
    /// Lattice spacing (`a`)
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    /// Target initial temperature (`T0`)
    #[serde(default = "default_initial_temperature")]
    pub initial_temperature: f64,
    /// Integration step (`tau`)
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    /// Thermalization steps excluded from the running means (`So`)
    #[serde(default = "default_thermalization_steps")]
    pub thermalization_steps: usize,
    /// Production steps over which observables are averaged (`Sd`)
    #[serde(default = "default_production_steps")]
    pub production_steps: usize,
    /// Emit an observable record every this many steps; 0 disables (`Sout`)
    #[serde(default = "default_observable_interval")]
    pub observable_interval: usize,
    /// Emit a trajectory frame every this many steps; 0 disables (`Sxyz`)
    #[serde(default = "default_trajectory_interval")]
    pub trajectory_interval: usize,
    /// RNG seed for momentum sampling; entropy-seeded when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_edge_count() -> usize {
    7
}
fn default_mass() -> f64 {
    1.0
}
fn default_well_depth() -> f64 {
    1.0
}
fn default_r_min() -> f64 {
    0.38
}
fn default_k_boltzmann() -> f64 {
    8.31e-3
}
fn default_wall_stiffness() -> f64 {
    1e4
}
fn default_wall_radius() -> f64 {
    5.0
}
fn default_spacing() -> f64 {
    0.38
}
fn default_initial_temperature() -> f64 {
    1e3
}
fn default_time_step() -> f64 {
    1e-3
}
fn default_thermalization_steps() -> usize {
    100
}
fn default_production_steps() -> usize {
    10_000
}
fn default_observable_interval() -> usize {
    100
}
fn default_trajectory_interval() -> usize {
    100
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            edge_count: default_edge_count(),
            mass: default_mass(),
            well_depth: default_well_depth(),
            r_min: default_r_min(),
            k_boltzmann: default_k_boltzmann(),
            wall_stiffness: default_wall_stiffness(),
            wall_radius: default_wall_radius(),
            spacing: default_spacing(),
            initial_temperature: default_initial_temperature(),
            time_step: default_time_step(),
            thermalization_steps: default_thermalization_steps(),
            production_steps: default_production_steps(),
            observable_interval: default_observable_interval(),
            trajectory_interval: default_trajectory_interval(),
            seed: None,
        }
    }
}

impl SystemConfig {
    /// Total number of atoms in the cluster.
    pub fn n_atoms(&self) -> usize {
        self.edge_count * self.edge_count * self.edge_count
    }

    /// Load and validate a configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        let config: SystemConfig =
            serde_yml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a YAML file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let content = serde_yml::to_string(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Range-check every parameter.
    pub fn validate(&self) -> Result<(), Error> {
        if self.edge_count < 1 || self.edge_count > 25 {
            return Err(Error::Config(format!(
                "edge_count must be between 1 and 25, found {}",
                self.edge_count
            )));
        }
        if self.mass < 0.0 {
            return Err(Error::Config("mass must be non-negative".into()));
        }
        if self.well_depth < 0.0 {
            return Err(Error::Config("well_depth must be non-negative".into()));
        }
        if self.r_min < 0.0 {
            return Err(Error::Config("r_min must be non-negative".into()));
        }
        if self.k_boltzmann < 0.0 || self.k_boltzmann > 1.0 {
            return Err(Error::Config(
                "k_boltzmann must be between 0 and 1".into(),
            ));
        }
        if self.wall_stiffness < 0.0 {
            return Err(Error::Config("wall_stiffness must be non-negative".into()));
        }
        // The whole lattice must fit inside the confining sphere.
        let min_radius = 1.22 * (self.edge_count as f64 - 1.0) * self.spacing;
        if self.wall_radius < min_radius {
            return Err(Error::Config(format!(
                "wall_radius must be at least 1.22*(n-1)*a = {:.4}, found {}",
                min_radius, self.wall_radius
            )));
        }
        if self.spacing < 0.0 {
            return Err(Error::Config("spacing must be non-negative".into()));
        }
        if self.initial_temperature < 0.0 {
            return Err(Error::Config(
                "initial_temperature must be non-negative".into(),
            ));
        }
        if self.time_step <= 0.0 || self.time_step > 1e-2 {
            return Err(Error::Config(
                "time_step must be in (0, 1e-2]".into(),
            ));
        }
        if self.production_steps == 0 {
            return Err(Error::Config("production_steps must be positive".into()));
        }
        if self.thermalization_steps > self.production_steps {
            return Err(Error::Config(
                "thermalization_steps must not exceed production_steps".into(),
            ));
        }
        if self.observable_interval > self.production_steps {
            return Err(Error::Config(
                "observable_interval must be between 0 and production_steps".into(),
            ));
        }
        if self.trajectory_interval > self.production_steps {
            return Err(Error::Config(
                "trajectory_interval must be between 0 and production_steps".into(),
            ));
        }
        Ok(())
    }
}
