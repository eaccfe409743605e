//! Error taxonomy for the simulation core.

use std::fmt;
use std::io;

use crate::system::Phase;

/// Errors surfaced by the simulation core.
///
/// Configuration errors are recoverable by the caller (substitute defaults),
/// sequencing errors abort the run without performing any physics, and
/// singularities are fatal to the current run.
#[derive(Debug)]
pub enum Error {
    /// An out-of-range or inconsistent simulation parameter.
    Config(String),
    /// A phase was entered before its predecessor completed.
    NotReady { required: Phase, current: Phase },
    /// A non-finite potential or force, produced by coincident particles.
    Singularity,
    /// Failure writing to a trajectory or observable sink.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "invalid configuration: {}", msg),
            Error::NotReady { required, current } => write!(
                f,
                "system is not ready: requires phase {}, currently {}",
                required, current
            ),
            Error::Singularity => {
                write!(f, "non-finite force or potential (coincident particles)")
            }
            Error::Io(err) => write!(f, "output error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
