//! Force and potential evaluation: soft spherical wall plus all-pairs
//! Lennard-Jones interaction.

use nalgebra::Vector3;

use crate::config::SystemConfig;
use crate::error::Error;

/// Result of one force evaluation over a configuration.
pub struct ForceEval {
    /// Total potential energy (wall + pair terms)
    pub potential: f64,
    /// Net force on every particle
    pub forces: Vec<Vector3<f64>>,
    /// Wall contribution only, kept separate for the pressure estimator
    pub wall_forces: Vec<Vector3<f64>>,
    /// Wall potential per particle
    pub wall_potentials: Vec<f64>,
}

/// The interaction model: a Lennard-Jones pair potential with minimum at
/// `r_min` and depth `well_depth`, confined by a piecewise-quadratic wall of
/// stiffness `wall_stiffness` beyond radius `wall_radius`.
#[derive(Debug, Clone)]
pub struct ForceField {
    pub well_depth: f64,
    pub r_min: f64,
    pub wall_stiffness: f64,
    pub wall_radius: f64,
}

impl ForceField {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            well_depth: config.well_depth,
            r_min: config.r_min,
            wall_stiffness: config.wall_stiffness,
            wall_radius: config.wall_radius,
        }
    }

    /// Wall potential and force for a particle at `pos`. Zero inside the
    /// sphere; quadratic in the overshoot and directed radially inward past it.
    pub fn wall_interaction(&self, pos: &Vector3<f64>) -> (f64, Vector3<f64>) {
        let r = pos.norm();
        if r < self.wall_radius {
            (0.0, Vector3::zeros())
        } else {
            let overshoot = r - self.wall_radius;
            let potential = 0.5 * self.wall_stiffness * overshoot * overshoot;
            let force = pos * (self.wall_stiffness * (self.wall_radius - r) / r);
            (potential, force)
        }
    }

    /// Pair potential and the force on the particle at `ri` due to the one at
    /// `rj`. The force on `rj` is the exact negation, so callers evaluate each
    /// unordered pair once.
    ///
    /// With `y = (R/r)^2` and `x = y^3` the potential is `e*x*(x - 2)` and the
    /// force is `12*e*x*(x - 1)*(ri - rj)/r^2`, expanded from powers instead
    /// of calling `powf`.
    pub fn pair_interaction(
        &self,
        ri: &Vector3<f64>,
        rj: &Vector3<f64>,
    ) -> (f64, Vector3<f64>) {
        let rij = ri - rj;
        let r2 = rij.norm_squared();
        let y = self.r_min * self.r_min / r2;
        let x = y * y * y;
        let potential = self.well_depth * x * (x - 2.0);
        let force = rij * (12.0 * self.well_depth * x * (x - 1.0) / r2);
        (potential, force)
    }

    /// Compute the total potential and net force on every particle.
    ///
    /// Pure function of the positions: no randomness, no history. Coincident
    /// particles make the pair term non-finite, which is surfaced as
    /// `Error::Singularity` and is fatal to the run.
    pub fn evaluate(&self, positions: &[Vector3<f64>]) -> Result<ForceEval, Error> {
        let n = positions.len();
        let mut forces = vec![Vector3::zeros(); n];
        let mut wall_forces = vec![Vector3::zeros(); n];
        let mut wall_potentials = vec![0.0; n];
        let mut potential = 0.0;

        for i in 0..n {
            let (v_wall, f_wall) = self.wall_interaction(&positions[i]);
            wall_potentials[i] = v_wall;
            wall_forces[i] = f_wall;
            potential += v_wall;
            forces[i] += f_wall;

            // Strict lower triangle; Newton's third law fills the rest
            for j in 0..i {
                let (v_pair, f_pair) = self.pair_interaction(&positions[i], &positions[j]);
                potential += v_pair;
                forces[i] += f_pair;
                forces[j] -= f_pair;
            }
        }

        if !potential.is_finite()
            || forces.iter().any(|f| !f.iter().all(|c| c.is_finite()))
        {
            return Err(Error::Singularity);
        }

        Ok(ForceEval {
            potential,
            forces,
            wall_forces,
            wall_potentials,
        })
    }
}
