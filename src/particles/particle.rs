// particle.rs - A single simulated point
//
// Plain data. The owning system integrates position and velocity; the
// payload is whatever the composing caller wants to carry per particle.

use glam::Vec2;

/// Identity of a particle within its system. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub(crate) u64);

impl ParticleId {
    pub fn raw(self) -> u64 { self.0 }
}

#[derive(Debug, Clone)]
pub struct Particle<P> {
    id: ParticleId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub payload: P,
}

impl<P> Particle<P> {
    pub(crate) fn new(id: ParticleId, position: Vec2, velocity: Vec2, payload: P) -> Self {
        Self { id, position, velocity, payload }
    }

    pub fn id(&self) -> ParticleId { self.id }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_independent_of_data() {
        let a = Particle::new(ParticleId(1), Vec2::ZERO, Vec2::ZERO, ());
        let b = Particle::new(ParticleId(2), Vec2::ZERO, Vec2::ZERO, ());
        assert_eq!(a.position, b.position);
        assert_ne!(a.id(), b.id());
    }
}
