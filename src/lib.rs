//! Microcanonical molecular dynamics of an argon-like cluster confined by a
//! soft spherical wall.
//!
//! The crate integrates Hamilton's equations for `n^3` atoms placed on a
//! close-packed lattice, interacting through a Lennard-Jones pair potential,
//! and derives energy, temperature and pressure as time averages over a
//! production window.

pub mod config;
pub mod driver;
pub mod error;
pub mod forces;
pub mod integrate;
pub mod lattice;
pub mod observables;
pub mod output;
pub mod system;

pub use config::SystemConfig;
pub use driver::Simulation;
pub use error::Error;
pub use forces::{ForceEval, ForceField};
pub use integrate::VelocityVerlet;
pub use observables::{MeanObservables, ObservableSnapshot, RunningMeans};
pub use output::{ObservableWriter, XyzWriter};
pub use system::{ParticleSystem, Phase};
