// system.rs - Generic particle system
//
// One concrete type, configured per instance with closures. Rain and
// splash are two configurations of this, not two implementations.
//
// C is the caller's context. It is threaded through `update` and
// `remove_particle` into the destroyed callbacks so a callback can do
// external work (register another system, queue a deregistration)
// without the system holding a reference to its owner.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use super::{Boundary, Force, Particle, ParticleId, SharedBoundary, SpawnContext};

type VectorFn = Box<dyn FnMut(&mut SpawnContext<'_>) -> Vec2>;
type PayloadFn<P> = Box<dyn FnMut(&mut SpawnContext<'_>) -> P>;
type DestroyFn<P> = Box<dyn Fn(&Particle<P>, &Boundary) -> bool>;
type DestroyedFn<P, C> = Box<dyn FnMut(&Particle<P>, &mut Emitter<'_, P>, &mut C)>;
type AllDestroyedFn<C> = Box<dyn FnMut(&mut C)>;

// ============================================================================
// Hooks
// ============================================================================

/// Per-instance behavior of a [`ParticleSystem`].
///
/// Every hook has a default: spawn at the origin at rest with a default
/// payload, never self-destroy, ignore destruction.
pub struct Hooks<P, C = ()> {
    initial_position: Option<VectorFn>,
    position: VectorFn,
    initial_velocity: Option<VectorFn>,
    velocity: VectorFn,
    payload: PayloadFn<P>,
    destroy_when: DestroyFn<P>,
    on_destroyed: DestroyedFn<P, C>,
    on_all_destroyed: AllDestroyedFn<C>,
}

impl<P: Default + 'static, C: 'static> Hooks<P, C> {
    pub fn new() -> Self {
        Self {
            initial_position: None,
            position: Box::new(|_: &mut SpawnContext<'_>| Vec2::ZERO),
            initial_velocity: None,
            velocity: Box::new(|_: &mut SpawnContext<'_>| Vec2::ZERO),
            payload: Box::new(|_: &mut SpawnContext<'_>| P::default()),
            destroy_when: Box::new(|_: &Particle<P>, _: &Boundary| false),
            on_destroyed: Box::new(|_: &Particle<P>, _: &mut Emitter<'_, P>, _: &mut C| {}),
            on_all_destroyed: Box::new(|_: &mut C| {}),
        }
    }
}

impl<P: Default + 'static, C: 'static> Default for Hooks<P, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, C> Hooks<P, C> {
    /// Position for particles created by `add_particles(_, true)`.
    /// Falls back to the steady-state position when unset.
    pub fn initial_position(mut self, f: impl FnMut(&mut SpawnContext<'_>) -> Vec2 + 'static) -> Self {
        self.initial_position = Some(Box::new(f));
        self
    }

    /// Position for every other spawn (resizes, replacements).
    pub fn position(mut self, f: impl FnMut(&mut SpawnContext<'_>) -> Vec2 + 'static) -> Self {
        self.position = Box::new(f);
        self
    }

    pub fn initial_velocity(mut self, f: impl FnMut(&mut SpawnContext<'_>) -> Vec2 + 'static) -> Self {
        self.initial_velocity = Some(Box::new(f));
        self
    }

    pub fn velocity(mut self, f: impl FnMut(&mut SpawnContext<'_>) -> Vec2 + 'static) -> Self {
        self.velocity = Box::new(f);
        self
    }

    pub fn payload(mut self, f: impl FnMut(&mut SpawnContext<'_>) -> P + 'static) -> Self {
        self.payload = Box::new(f);
        self
    }

    /// Evaluated on the post-integration state of each particle.
    pub fn destroy_when(mut self, f: impl Fn(&Particle<P>, &Boundary) -> bool + 'static) -> Self {
        self.destroy_when = Box::new(f);
        self
    }

    /// Called once per removed particle, after it left the collection.
    pub fn on_destroyed(
        mut self,
        f: impl FnMut(&Particle<P>, &mut Emitter<'_, P>, &mut C) + 'static,
    ) -> Self {
        self.on_destroyed = Box::new(f);
        self
    }

    /// Called when a removal leaves the collection empty.
    pub fn on_all_destroyed(mut self, f: impl FnMut(&mut C) + 'static) -> Self {
        self.on_all_destroyed = Box::new(f);
        self
    }
}

struct Spawner<P> {
    initial_position: Option<VectorFn>,
    position: VectorFn,
    initial_velocity: Option<VectorFn>,
    velocity: VectorFn,
    payload: PayloadFn<P>,
}

impl<P> Spawner<P> {
    fn spawn(&mut self, id: ParticleId, initial: bool, ctx: &mut SpawnContext<'_>) -> Particle<P> {
        let position = match self.initial_position.as_mut() {
            Some(f) if initial => f(ctx),
            _ => (self.position)(ctx),
        };
        let velocity = match self.initial_velocity.as_mut() {
            Some(f) if initial => f(ctx),
            _ => (self.velocity)(ctx),
        };
        let payload = (self.payload)(ctx);
        Particle::new(id, position, velocity, payload)
    }
}

// ============================================================================
// Emitter
// ============================================================================

/// Spawning handle given to `on_destroyed`, so a callback can refill its
/// own system while the system is mid-update.
pub struct Emitter<'a, P> {
    particles: &'a mut Vec<Particle<P>>,
    spawner: &'a mut Spawner<P>,
    rng: &'a mut SmallRng,
    next_id: &'a mut u64,
    boundary: Boundary,
}

impl<P> Emitter<'_, P> {
    /// Spawn one particle with the steady-state policy.
    pub fn add_particle(&mut self) -> ParticleId {
        self.spawn(false)
    }

    pub fn add_particles(&mut self, count: usize, initial: bool) {
        self.particles.reserve(count);
        for _ in 0..count {
            self.spawn(initial);
        }
    }

    pub fn len(&self) -> usize { self.particles.len() }
    pub fn is_empty(&self) -> bool { self.particles.is_empty() }
    pub fn boundary(&self) -> Boundary { self.boundary }

    /// Independent generator for a system created from a callback.
    pub fn fork_rng(&mut self) -> SmallRng {
        SmallRng::seed_from_u64(self.rng.next_u64())
    }

    fn spawn(&mut self, initial: bool) -> ParticleId {
        let id = ParticleId(*self.next_id);
        *self.next_id += 1;
        let mut ctx = SpawnContext::new(self.boundary, self.rng);
        let particle = self.spawner.spawn(id, initial, &mut ctx);
        self.particles.push(particle);
        id
    }
}

// ============================================================================
// ParticleSystem
// ============================================================================

pub struct ParticleSystem<P, C = ()> {
    particles: Vec<Particle<P>>,
    forces: Vec<Force>,
    max_speed: Option<f32>,
    boundary: SharedBoundary,

    spawner: Spawner<P>,
    destroy_when: DestroyFn<P>,
    on_destroyed: DestroyedFn<P, C>,
    on_all_destroyed: AllDestroyedFn<C>,

    rng: SmallRng,
    next_id: u64,

    // Scratch buffers reused across updates
    scratch: Vec<Particle<P>>,
    destroyed: Vec<Particle<P>>,
}

impl<P, C> ParticleSystem<P, C> {
    pub fn new(hooks: Hooks<P, C>, boundary: SharedBoundary, rng: SmallRng) -> Self {
        let Hooks {
            initial_position,
            position,
            initial_velocity,
            velocity,
            payload,
            destroy_when,
            on_destroyed,
            on_all_destroyed,
        } = hooks;

        Self {
            particles: Vec::new(),
            forces: Vec::new(),
            max_speed: None,
            boundary,
            spawner: Spawner { initial_position, position, initial_velocity, velocity, payload },
            destroy_when,
            on_destroyed,
            on_all_destroyed,
            rng,
            next_id: 0,
            scratch: Vec::new(),
            destroyed: Vec::new(),
        }
    }

    // ========== Configuration ==========

    pub fn set_boundary(&mut self, boundary: SharedBoundary) {
        self.boundary = boundary;
    }

    pub fn boundary(&self) -> &SharedBoundary { &self.boundary }

    /// Clamp on velocity magnitude after forces are applied.
    /// `None` or a non-positive value disables clamping.
    pub fn set_maximum_speed(&mut self, max_speed: Option<f32>) {
        self.max_speed = max_speed.filter(|s| *s > 0.0);
    }

    pub fn maximum_speed(&self) -> Option<f32> { self.max_speed }

    /// Register a force. Adding a force already present is a no-op.
    pub fn add_force(&mut self, force: &Force) {
        if !self.forces.contains(force) {
            self.forces.push(force.clone());
        }
    }

    /// Unregister a force. Removing an absent force is a no-op.
    pub fn remove_force(&mut self, force: &Force) {
        self.forces.retain(|f| f != force);
    }

    pub fn forces(&self) -> &[Force] { &self.forces }

    // ========== Population ==========

    pub fn particles(&self) -> &[Particle<P>] { &self.particles }
    pub fn len(&self) -> usize { self.particles.len() }
    pub fn is_empty(&self) -> bool { self.particles.is_empty() }

    pub fn get(&self, id: ParticleId) -> Option<&Particle<P>> {
        self.particles.iter().find(|p| p.id() == id)
    }

    /// Resize to exactly `target` live particles.
    ///
    /// Growth uses the steady-state spawn policy. Shrinking drops an
    /// unspecified subset without firing destroy callbacks.
    pub fn set_count(&mut self, target: usize) {
        let current = self.particles.len();
        if target > current {
            self.add_particles(target - current, false);
        } else if target < current {
            self.particles.truncate(target);
        }
    }

    /// Spawn `count` particles, each sampling the spawn hooks independently.
    /// `initial` selects the initial-spawn policy.
    pub fn add_particles(&mut self, count: usize, initial: bool) {
        self.emitter().add_particles(count, initial);
    }

    pub fn add_particle(&mut self) -> ParticleId {
        self.emitter().add_particle()
    }

    /// Remove one particle by identity and report it.
    ///
    /// Fires `on_destroyed`, then `on_all_destroyed` if the collection is
    /// now empty. Returns false, without callbacks, if the id is absent.
    pub fn remove_particle(&mut self, id: ParticleId, ctx: &mut C) -> bool {
        let Some(index) = self.particles.iter().position(|p| p.id() == id) else {
            return false;
        };
        let particle = self.particles.swap_remove(index);
        self.report_destroyed(&particle, ctx);
        if self.particles.is_empty() {
            (self.on_all_destroyed)(ctx);
        }
        true
    }

    // ========== Simulation ==========

    /// Advance one frame: apply forces, clamp, integrate, cull.
    ///
    /// Survivors are compacted into place first; destroyed particles are
    /// reported afterwards in discovery order, so callbacks never see a
    /// half-updated collection and nothing is visited twice. Particles
    /// spawned by callbacks are integrated from the next update on.
    pub fn update(&mut self, ctx: &mut C) {
        let acceleration: Vec2 = self.forces.iter().map(Force::value).sum();
        let boundary = self.boundary.get();

        std::mem::swap(&mut self.particles, &mut self.scratch);
        for mut particle in self.scratch.drain(..) {
            particle.velocity += acceleration;
            if let Some(max) = self.max_speed {
                particle.velocity = particle.velocity.clamp_length_max(max);
            }
            particle.position += particle.velocity;

            if (self.destroy_when)(&particle, &boundary) {
                self.destroyed.push(particle);
            } else {
                self.particles.push(particle);
            }
        }

        if self.destroyed.is_empty() {
            return;
        }

        let mut destroyed = std::mem::take(&mut self.destroyed);
        for particle in destroyed.drain(..) {
            self.report_destroyed(&particle, ctx);
        }
        self.destroyed = destroyed;

        if self.particles.is_empty() {
            (self.on_all_destroyed)(ctx);
        }
    }

    fn report_destroyed(&mut self, particle: &Particle<P>, ctx: &mut C) {
        let mut emitter = Emitter {
            particles: &mut self.particles,
            spawner: &mut self.spawner,
            rng: &mut self.rng,
            next_id: &mut self.next_id,
            boundary: self.boundary.get(),
        };
        (self.on_destroyed)(particle, &mut emitter, ctx);
    }

    fn emitter(&mut self) -> Emitter<'_, P> {
        Emitter {
            particles: &mut self.particles,
            spawner: &mut self.spawner,
            rng: &mut self.rng,
            next_id: &mut self.next_id,
            boundary: self.boundary.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system<P: Default + 'static>(hooks: Hooks<P>) -> ParticleSystem<P> {
        let boundary = SharedBoundary::new(Boundary::from_screen(100.0, 100.0, 0.0));
        ParticleSystem::new(hooks, boundary, SmallRng::seed_from_u64(1))
    }

    #[test]
    fn defaults_spawn_at_rest_and_never_destroy() {
        let mut sys = system::<()>(Hooks::new());
        sys.set_count(5);
        sys.update(&mut ());
        assert_eq!(sys.len(), 5);
        assert!(sys.particles().iter().all(|p| p.position == Vec2::ZERO));
    }

    #[test]
    fn ids_are_unique() {
        let mut sys = system::<()>(Hooks::new());
        sys.set_count(50);
        let mut ids: Vec<_> = sys.particles().iter().map(|p| p.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn initial_policy_falls_back_to_steady_state() {
        let mut sys = system::<()>(Hooks::new().position(|_| Vec2::new(1.0, 2.0)));
        sys.add_particles(3, true);
        assert!(sys.particles().iter().all(|p| p.position == Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn initial_policy_is_used_only_when_asked() {
        let mut sys = system::<()>(
            Hooks::new()
                .initial_position(|_| Vec2::new(0.0, 50.0))
                .position(|_| Vec2::new(0.0, -10.0)),
        );
        sys.add_particles(2, true);
        sys.add_particles(3, false);
        let initial = sys.particles().iter().filter(|p| p.position.y == 50.0).count();
        let steady = sys.particles().iter().filter(|p| p.position.y == -10.0).count();
        assert_eq!((initial, steady), (2, 3));
    }

    #[test]
    fn add_and_remove_force_are_idempotent() {
        let mut sys = system::<()>(Hooks::new());
        let gravity = Force::new(0.0, 0.3);
        sys.add_force(&gravity);
        sys.add_force(&gravity.clone());
        assert_eq!(sys.forces().len(), 1);
        sys.remove_force(&gravity);
        sys.remove_force(&gravity);
        assert!(sys.forces().is_empty());
    }

    #[test]
    fn removing_absent_particle_is_silent() {
        let mut sys = system::<()>(Hooks::new());
        let id = sys.add_particle();
        assert!(sys.remove_particle(id, &mut ()));
        assert!(!sys.remove_particle(id, &mut ()));
        assert!(sys.get(id).is_none());
    }

    #[test]
    fn non_positive_max_speed_disables_clamp() {
        let mut sys = system::<()>(Hooks::new());
        sys.set_maximum_speed(Some(0.0));
        assert_eq!(sys.maximum_speed(), None);
        sys.set_maximum_speed(Some(3.0));
        assert_eq!(sys.maximum_speed(), Some(3.0));
        sys.set_maximum_speed(None);
        assert_eq!(sys.maximum_speed(), None);
    }

    #[test]
    fn boundary_changes_reach_the_predicate() {
        let mut sys = system::<()>(
            Hooks::new()
                .velocity(|_| Vec2::new(0.0, 1.0))
                .destroy_when(|p, b| p.position.y > b.bottom),
        );
        sys.set_count(1);
        sys.update(&mut ());
        assert_eq!(sys.len(), 1);

        sys.boundary().update(|b| b.bottom = 0.5);
        sys.update(&mut ());
        assert!(sys.is_empty());
    }

    #[test]
    fn spawned_particles_wait_for_next_update() {
        let mut sys = system::<()>(
            Hooks::new()
                .velocity(|_| Vec2::new(0.0, 10.0))
                .destroy_when(|p, _| p.position.y >= 10.0)
                .on_destroyed(|_, emitter, _| {
                    emitter.add_particle();
                }),
        );
        sys.set_count(1);
        sys.update(&mut ());
        assert_eq!(sys.len(), 1);
        assert_eq!(sys.particles()[0].position, Vec2::ZERO);
    }
}
