// splash.rs - Splash bursts where rain lands
//
// Each burst is its own particle system. The registry owns the live
// bursts; a burst asks to be dropped by queueing its id from its
// all-destroyed hook, and the registry honors the queue after the pass.

use std::collections::BTreeMap;
use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::rngs::SmallRng;
use tracing::debug;

use crate::config::Settings;
use crate::particles::{Force, Hooks, ParticleSystem, Shared, SharedBoundary};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SplashDrop {
    /// Diameter in pixels
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SplashId(u64);

/// Ids of bursts that ran out of particles during a pass
pub type Drained = Vec<SplashId>;

pub type Splash = ParticleSystem<SplashDrop, Drained>;

pub struct SplashRegistry {
    live: BTreeMap<SplashId, Splash>,
    drained: Drained,
    next_id: u64,

    settings: Shared<Settings>,
    screen: Shared<Vec2>,
    boundary: SharedBoundary,
    forces: Vec<Force>,
}

impl SplashRegistry {
    pub fn new(
        settings: Shared<Settings>,
        screen: Shared<Vec2>,
        boundary: SharedBoundary,
        forces: &[Force],
    ) -> Self {
        Self {
            live: BTreeMap::new(),
            drained: Vec::new(),
            next_id: 0,
            settings,
            screen,
            boundary,
            forces: forces.to_vec(),
        }
    }

    /// Start a burst under `origin`. A burst configured with zero
    /// particles would never drain, so it is not registered.
    pub fn spawn(&mut self, origin: Vec2, rng: SmallRng) -> Option<SplashId> {
        let id = SplashId(self.next_id);
        self.next_id += 1;

        let mut splash = create_splash(id, origin, &self.settings, &self.screen, self.boundary.clone(), rng);
        for force in &self.forces {
            splash.add_force(force);
        }
        splash.set_count(self.settings.get().splash.count as usize);

        if splash.is_empty() {
            debug!(target: "splash", "splash count is zero, burst at x={} skipped", origin.x);
            return None;
        }
        self.live.insert(id, splash);
        Some(id)
    }

    /// Update every live burst, then drop the ones that drained.
    pub fn update(&mut self) {
        for splash in self.live.values_mut() {
            splash.update(&mut self.drained);
        }
        for id in self.drained.drain(..) {
            if self.live.remove(&id).is_some() {
                debug!(target: "splash", "splash {} finished", id.0);
            }
        }
    }

    pub fn len(&self) -> usize { self.live.len() }
    pub fn is_empty(&self) -> bool { self.live.is_empty() }
    pub fn get(&self, id: SplashId) -> Option<&Splash> { self.live.get(&id) }
    pub fn contains(&self, id: SplashId) -> bool { self.live.contains_key(&id) }

    pub fn iter(&self) -> impl Iterator<Item = (SplashId, &Splash)> {
        self.live.iter().map(|(id, s)| (*id, s))
    }

    /// Particles across all live bursts
    pub fn particle_count(&self) -> usize {
        self.live.values().map(Splash::len).sum()
    }

    pub fn clear(&mut self) {
        self.live.clear();
        self.drained.clear();
    }
}

/// Burst fanning upward from the bottom of the screen under `origin`.
fn create_splash(
    id: SplashId,
    origin: Vec2,
    settings: &Shared<Settings>,
    screen: &Shared<Vec2>,
    boundary: SharedBoundary,
    rng: SmallRng,
) -> Splash {
    let screen = screen.clone();
    let speed_settings = settings.clone();
    let size_settings = settings.clone();

    let hooks = Hooks::<SplashDrop, Drained>::new()
        .position(move |_| Vec2::new(origin.x, screen.get().y))
        .velocity(move |ctx| {
            let s = speed_settings.get().splash;
            let speed = ctx.random_integer(s.min_speed, s.max_speed);
            ctx.random_direction(PI, TAU, speed)
        })
        .payload(move |ctx| {
            let s = size_settings.get().splash;
            SplashDrop { size: ctx.random_integer(s.min_size, s.max_size) }
        })
        .destroy_when(|p, edge| p.position.y - p.payload.size > edge.bottom)
        .on_all_destroyed(move |drained: &mut Drained| drained.push(id));

    ParticleSystem::new(hooks, boundary, rng)
}
