//! Symplectic time integration.

use itertools::izip;

use crate::error::Error;
use crate::forces::ForceField;
use crate::system::ParticleSystem;

/// Velocity-Verlet stepper: half-kick, drift, force recomputation, half-kick.
///
/// The scheme is time-reversible and conserves the Hamiltonian over long runs,
/// which is the invariant used to validate the simulation. The first step
/// consumes the forces evaluated at the initial configuration, never zeros.
pub struct VelocityVerlet {
    dt: f64,
    mass: f64,
}

impl VelocityVerlet {
    pub fn new(dt: f64, mass: f64) -> Self {
        assert!(dt > 0.0, "time step must be positive, found {}", dt);
        Self { dt, mass }
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Advance the system by one step of width `dt`.
    pub fn step(&self, system: &mut ParticleSystem, field: &ForceField) -> Result<(), Error> {
        let half_dt = 0.5 * self.dt;

        // Half-kick with the forces from the previous evaluation
        for (p, &f) in izip!(&mut system.momenta, &system.forces) {
            *p += f * half_dt;
        }

        // Drift
        let dt_over_m = self.dt / self.mass;
        for (r, &p) in izip!(&mut system.positions, &system.momenta) {
            *r += p * dt_over_m;
        }

        // Full force pass at the new positions
        let eval = field.evaluate(&system.positions)?;
        system.apply_forces(eval);

        // Second half-kick with the fresh forces
        for (p, &f) in izip!(&mut system.momenta, &system.forces) {
            *p += f * half_dt;
        }

        Ok(())
    }
}
