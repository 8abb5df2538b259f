// sim/ - Rain scene
//
// Wires the generic particle engine into the rain effect: one rain
// system, a registry of splash bursts, gravity and wind shared by all
// of them, and the frame counter. `tick` is the per-frame driver.

mod rain;
mod splash;

pub use rain::{Droplet, Rain, create_rain};
pub use splash::{Drained, Splash, SplashDrop, SplashId, SplashRegistry};

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info};

use crate::config::{GRAVITY_RANGE, Settings, clamp_to};
use crate::fps::FpsCounter;
use crate::particles::{Boundary, Force, Shared, SharedBoundary};

/// Rain simulation world
pub struct RainScene {
    settings: Shared<Settings>,
    screen: Shared<Vec2>,
    boundary: SharedBoundary,

    gravity: Force,
    wind: Force,

    rain: Rain,
    splashes: SplashRegistry,

    fps: FpsCounter,
    frame: u64,
}

impl RainScene {
    pub fn new(mut settings: Settings, width: f32, height: f32, seed: u64, now_ms: f64) -> Self {
        settings.forces.gravity = clamp_to(settings.forces.gravity, &GRAVITY_RANGE);
        let mut rng = SmallRng::seed_from_u64(seed);
        let screen = Shared::new(Vec2::new(width, height));
        let boundary = SharedBoundary::new(Boundary::from_screen(width, height, settings.rain_edge_margin));
        let gravity = Force::new(0.0, settings.forces.gravity);
        let wind = Force::new(settings.forces.wind, 0.0);
        let forces = [gravity.clone(), wind.clone()];
        let settings = Shared::new(settings);

        let rain = create_rain(
            &settings,
            &screen,
            boundary.clone(),
            &forces,
            SmallRng::seed_from_u64(rng.next_u64()),
        );
        let splashes = SplashRegistry::new(settings.clone(), screen.clone(), boundary.clone(), &forces);

        info!(target: "scene", "rain scene {width}x{height} with {} drops", rain.len());

        Self {
            settings,
            screen,
            boundary,
            gravity,
            wind,
            rain,
            splashes,
            fps: FpsCounter::new(now_ms),
            frame: 0,
        }
    }

    /// New screen size. Particles are kept; the boundary follows.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.screen.set(Vec2::new(width, height));
        let margin = self.settings.get().rain_edge_margin;
        self.boundary.set(Boundary::from_screen(width, height, margin));
        debug!(target: "scene", "resized to {width}x{height}");
    }

    /// Advance one frame: rain, then every live splash, then the counter.
    pub fn tick(&mut self, now_ms: f64) {
        self.rain.update(&mut self.splashes);
        self.splashes.update();
        self.fps.tick(now_ms);
        self.frame += 1;
    }

    // ========== Live controls ==========

    /// Clamped to `GRAVITY_RANGE`: splashes only drain by falling, so
    /// gravity must stay positive.
    pub fn set_gravity(&mut self, gravity: f32) {
        let gravity = clamp_to(gravity, &GRAVITY_RANGE);
        self.settings.update(|s| s.forces.gravity = gravity);
        self.gravity.set_y(gravity);
    }

    pub fn set_wind(&mut self, wind: f32) {
        self.settings.update(|s| s.forces.wind = wind);
        self.wind.set_x(wind);
    }

    pub fn set_rain_count(&mut self, count: usize) {
        self.settings.update(|s| s.rain.count = count as u32);
        self.rain.set_count(count);
    }

    /// Particles per burst, for bursts started from now on
    pub fn set_splash_count(&mut self, count: usize) {
        self.settings.update(|s| s.splash.count = count as u32);
    }

    /// Edit settings in place; forces, drop count and margin follow.
    pub fn update_settings(&mut self, f: impl FnOnce(&mut Settings)) {
        let mut settings = self.settings.get();
        f(&mut settings);
        self.apply_settings(settings);
    }

    /// Replace all settings at once.
    pub fn apply_settings(&mut self, mut settings: Settings) {
        settings.forces.gravity = clamp_to(settings.forces.gravity, &GRAVITY_RANGE);
        self.settings.set(settings);
        self.gravity.set_y(settings.forces.gravity);
        self.wind.set_x(settings.forces.wind);
        self.rain.set_count(settings.rain.count as usize);
        let size = self.screen.get();
        self.boundary.set(Boundary::from_screen(size.x, size.y, settings.rain_edge_margin));
    }

    // ========== Accessors ==========

    pub fn settings(&self) -> Settings { self.settings.get() }
    pub fn screen(&self) -> Vec2 { self.screen.get() }
    pub fn boundary(&self) -> Boundary { self.boundary.get() }
    pub fn gravity(&self) -> &Force { &self.gravity }
    pub fn wind(&self) -> &Force { &self.wind }
    pub fn rain(&self) -> &Rain { &self.rain }
    pub fn splashes(&self) -> &SplashRegistry { &self.splashes }
    pub fn fps(&self) -> u32 { self.fps.frames() }
    pub fn frame(&self) -> u64 { self.frame }

    pub fn drop_count(&self) -> usize { self.rain.len() }
    pub fn splash_count(&self) -> usize { self.splashes.len() }
    pub fn splash_particle_count(&self) -> usize { self.splashes.particle_count() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> RainScene {
        RainScene::new(Settings::default(), 640.0, 480.0, 99, 0.0)
    }

    #[test]
    fn starts_with_configured_rain_and_no_splashes() {
        let s = scene();
        assert_eq!(s.drop_count(), 300);
        assert_eq!(s.splash_count(), 0);
        assert_eq!(s.boundary(), Boundary::new(0.0, 0.0, 640.0, 480.0));
    }

    #[test]
    fn force_controls_reach_every_system() {
        let mut s = scene();
        for i in 0..60 {
            s.tick(i as f64 * 16.0);
        }
        assert!(s.splash_count() > 0);

        s.set_wind(-0.3);
        s.set_gravity(1.2);
        assert_eq!(s.rain().forces()[1].value(), Vec2::new(-0.3, 0.0));
        for (_, splash) in s.splashes().iter() {
            assert_eq!(splash.forces()[0].value(), Vec2::new(0.0, 1.2));
            assert_eq!(splash.forces()[1].value(), Vec2::new(-0.3, 0.0));
        }
        assert_eq!(s.settings().forces.gravity, 1.2);
    }

    #[test]
    fn non_positive_gravity_is_clamped_and_splashes_still_drain() {
        let mut s = scene();
        for i in 0..60 {
            s.tick(i as f64 * 16.0);
        }
        assert!(s.splash_count() > 0);

        s.set_rain_count(0);
        s.set_gravity(0.0);
        assert_eq!(s.gravity().value(), Vec2::new(0.0, 0.1));
        assert_eq!(s.settings().forces.gravity, 0.1);

        s.update_settings(|st| st.forces.gravity = -1.0);
        assert_eq!(s.gravity().value().y, 0.1);

        for i in 60..5000 {
            s.tick(i as f64 * 16.0);
        }
        assert_eq!(s.splash_count(), 0);
    }

    #[test]
    fn rain_count_control_resizes() {
        let mut s = scene();
        s.set_rain_count(50);
        assert_eq!(s.drop_count(), 50);
        s.tick(16.0);
        assert_eq!(s.drop_count(), 50);
        s.set_rain_count(800);
        assert_eq!(s.drop_count(), 800);
    }

    #[test]
    fn resize_moves_the_shared_boundary() {
        let mut s = scene();
        s.resize(1024.0, 768.0);
        assert_eq!(s.boundary().bottom, 768.0);
        assert_eq!(s.rain().boundary().get().bottom, 768.0);
        assert_eq!(s.drop_count(), 300);
    }

    #[test]
    fn apply_settings_propagates() {
        let mut s = scene();
        s.update_settings(|st| {
            st.rain_edge_margin = 20.0;
            st.rain.count = 120;
            st.forces.wind = 0.0;
        });
        assert_eq!(s.boundary(), Boundary::new(20.0, 20.0, 620.0, 460.0));
        assert_eq!(s.drop_count(), 120);
        assert_eq!(s.wind().value().x, 0.0);
    }

    #[test]
    fn splash_count_applies_to_new_bursts() {
        let mut s = scene();
        s.set_splash_count(5);
        for i in 0..40 {
            s.tick(i as f64 * 16.0);
        }
        assert!(s.splash_count() > 0);
        for (_, splash) in s.splashes().iter() {
            assert!(splash.len() <= 5);
        }
    }

    #[test]
    fn frame_counter_advances() {
        let mut s = scene();
        for i in 0..70 {
            s.tick(i as f64 * 16.0);
        }
        assert_eq!(s.frame(), 70);
        assert!(s.fps() > 0);
    }
}
