// particles/ - Generic particle engine
//
// A system owns its particles, holds handles to shared forces and a
// shared boundary, and defers every policy decision to per-instance
// hooks. It knows nothing about rain or splashes.

mod particle;
mod shared;
mod spawn;
mod system;

pub use particle::{Particle, ParticleId};
pub use shared::{Boundary, Force, Shared, SharedBoundary};
pub use spawn::{SpawnContext, clock_seed, from_angle};
pub use system::{Emitter, Hooks, ParticleSystem};

use crate::error::{Error, Result};

/// Convert a count from a loosely typed source (JS number, config value).
pub fn count_from(value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::InvalidArgument(format!("particle count must be non-negative, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_counts_are_rejected() {
        assert!(matches!(count_from(-1), Err(Error::InvalidArgument(_))));
        assert_eq!(count_from(0).ok(), Some(0));
        assert_eq!(count_from(300).ok(), Some(300));
    }
}
