// rain.rs - Falling rain streaks
//
// One long-lived system. Every drop that falls past the bottom edge
// starts a splash where it landed and is replaced on the spot, so the
// drop count only changes when the count setting changes.

use glam::Vec2;
use rand::rngs::SmallRng;
use tracing::warn;

use super::SplashRegistry;
use crate::config::Settings;
use crate::particles::{Force, Hooks, ParticleSystem, Shared, SharedBoundary};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Droplet {
    /// Streak length in pixels
    pub length: f32,
}

pub type Rain = ParticleSystem<Droplet, SplashRegistry>;

/// Build the rain system and fill the whole screen with its first drops.
pub fn create_rain(
    settings: &Shared<Settings>,
    screen: &Shared<Vec2>,
    boundary: SharedBoundary,
    forces: &[Force],
    rng: SmallRng,
) -> Rain {
    let initial = (settings.clone(), screen.clone());
    let steady = (settings.clone(), screen.clone());
    let speed_settings = settings.clone();
    let length_settings = settings.clone();

    let hooks = Hooks::<Droplet, SplashRegistry>::new()
        // Anywhere on screen, so the first frame is already raining
        .initial_position(move |ctx| {
            let (settings, screen) = &initial;
            let (offset, size) = (settings.get().rain.offset, screen.get());
            let x = ctx.random_integer(-offset, size.x + offset);
            let y = ctx.random_integer(0.0, size.y);
            Vec2::new(x, y)
        })
        // One screen-height above the top, streaming in
        .position(move |ctx| {
            let (settings, screen) = &steady;
            let (offset, size) = (settings.get().rain.offset, screen.get());
            let x = ctx.random_integer(-offset, size.x + offset);
            let y = ctx.random_integer(-size.y, 0.0);
            Vec2::new(x, y)
        })
        .velocity(move |ctx| {
            let r = speed_settings.get().rain;
            Vec2::new(0.0, ctx.random_integer(r.min_speed, r.max_speed))
        })
        .payload(move |ctx| {
            let r = length_settings.get().rain;
            Droplet { length: ctx.random_integer(r.min_length, r.max_length) }
        })
        .destroy_when(|p, edge| p.position.y - p.payload.length > edge.bottom)
        .on_destroyed(|droplet, emitter, splashes: &mut SplashRegistry| {
            splashes.spawn(droplet.position, emitter.fork_rng());
            emitter.add_particle();
        })
        .on_all_destroyed(|_| warn!(target: "rain", "rain destroyed"));

    let mut rain = ParticleSystem::new(hooks, boundary, rng);
    rain.add_particles(settings.get().rain.count as usize, true);
    for force in forces {
        rain.add_force(force);
    }
    rain
}
