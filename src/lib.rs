use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod fps;
pub mod particles;
pub mod render;
pub mod sim;

pub use config::Settings;
pub use error::{Error, Result};
pub use sim::RainScene;

use config::{
    RAIN_COUNT_RANGE, RAIN_LENGTH_RANGE, RAIN_SPEED_RANGE, RAIN_WIDTH_RANGE, SPLASH_COUNT_RANGE,
    SPLASH_SIZE_RANGE, SPLASH_SPEED_RANGE, clamp_to,
};
use particles::count_from;
use render::Encoder;

// ============================================================================
// RAIN WORLD - wasm facade over the rain scene
// ============================================================================
//
// The host calls `tick` once per animation frame and then reads the
// encoded buffer through `output_ptr`/`output_len`. Slider callbacks go
// through the setters, which clamp to the control ranges.

#[wasm_bindgen]
pub struct RainWorld {
    scene: RainScene,
    encoder: Encoder,
    w: u32,
    h: u32,
}

#[wasm_bindgen]
impl RainWorld {
    #[wasm_bindgen(constructor)]
    pub fn new(w: u32, h: u32) -> Self {
        Self::from_settings(Settings::default(), w, h)
    }

    /// Start from a JSON settings object; missing keys take defaults
    pub fn with_settings(w: u32, h: u32, json: &str) -> std::result::Result<RainWorld, JsError> {
        let settings = Settings::from_json_str(json)?;
        settings.validate()?;
        Ok(Self::from_settings(settings, w, h))
    }

    pub fn tick(&mut self) {
        self.scene.tick(fps::now_ms());
        self.encoder.clear();
        self.encoder.encode_rain(self.scene.rain().particles(), self.scene.settings().rain.width);
        self.encoder.encode_splashes(self.scene.splashes());
    }

    pub fn resize(&mut self, w: u32, h: u32) {
        self.w = w;
        self.h = h;
        self.scene.resize(w as f32, h as f32);
        self.encoder.resize(w, h);
    }

    // ========== Controls ==========

    pub fn set_gravity(&mut self, gravity: f32) {
        self.scene.set_gravity(clamp_to(gravity, &config::GRAVITY_RANGE));
    }

    pub fn set_wind(&mut self, wind: f32) {
        self.scene.set_wind(clamp_to(wind, &config::WIND_RANGE));
    }

    pub fn set_rain_count(&mut self, count: i32) -> std::result::Result<(), JsError> {
        let count = count_from(count.into())?;
        let count = clamp_to(count as u32, &RAIN_COUNT_RANGE);
        self.scene.set_rain_count(count as usize);
        Ok(())
    }

    pub fn set_splash_count(&mut self, count: i32) -> std::result::Result<(), JsError> {
        let count = count_from(count.into())?;
        let count = clamp_to(count as u32, &SPLASH_COUNT_RANGE);
        self.scene.set_splash_count(count as usize);
        Ok(())
    }

    pub fn set_rain_length(&mut self, min: f32, max: f32) {
        let (min, max) = (clamp_to(min, &RAIN_LENGTH_RANGE), clamp_to(max, &RAIN_LENGTH_RANGE));
        self.scene.update_settings(|s| {
            s.rain.min_length = min;
            s.rain.max_length = max;
        });
    }

    pub fn set_rain_speed(&mut self, min: f32, max: f32) {
        let (min, max) = (clamp_to(min, &RAIN_SPEED_RANGE), clamp_to(max, &RAIN_SPEED_RANGE));
        self.scene.update_settings(|s| {
            s.rain.min_speed = min;
            s.rain.max_speed = max;
        });
    }

    pub fn set_rain_width(&mut self, width: f32) {
        let width = clamp_to(width, &RAIN_WIDTH_RANGE);
        self.scene.update_settings(|s| s.rain.width = width);
    }

    pub fn set_splash_size(&mut self, min: f32, max: f32) {
        let (min, max) = (clamp_to(min, &SPLASH_SIZE_RANGE), clamp_to(max, &SPLASH_SIZE_RANGE));
        self.scene.update_settings(|s| {
            s.splash.min_size = min;
            s.splash.max_size = max;
        });
    }

    pub fn set_splash_speed(&mut self, min: f32, max: f32) {
        let (min, max) = (clamp_to(min, &SPLASH_SPEED_RANGE), clamp_to(max, &SPLASH_SPEED_RANGE));
        self.scene.update_settings(|s| {
            s.splash.min_speed = min;
            s.splash.max_speed = max;
        });
    }

    pub fn set_show_fps(&mut self, show: bool) {
        self.scene.update_settings(|s| s.show_fps = show);
    }

    pub fn settings_json(&self) -> std::result::Result<String, JsError> {
        Ok(self.scene.settings().to_json()?)
    }

    pub fn apply_settings_json(&mut self, json: &str) -> std::result::Result<(), JsError> {
        let settings = Settings::from_json_str(json)?;
        settings.validate()?;
        self.scene.apply_settings(settings);
        Ok(())
    }

    // Accessors for WASM
    pub fn output_ptr(&self) -> *const u8 { self.encoder.ptr() }
    pub fn output_len(&self) -> usize { self.encoder.len() }
    pub fn width(&self) -> u32 { self.w }
    pub fn height(&self) -> u32 { self.h }
    pub fn fps(&self) -> u32 { self.scene.fps() }
    pub fn show_fps(&self) -> bool { self.scene.settings().show_fps }
    pub fn drop_count(&self) -> usize { self.scene.drop_count() }
    pub fn splash_count(&self) -> usize { self.scene.splash_count() }
}

impl RainWorld {
    fn from_settings(settings: Settings, w: u32, h: u32) -> Self {
        let scene = RainScene::new(settings, w as f32, h as f32, particles::clock_seed(), fps::now_ms());
        Self {
            scene,
            encoder: Encoder::new(w, h),
            w,
            h,
        }
    }

    pub fn scene(&self) -> &RainScene { &self.scene }
    pub fn output(&self) -> &[u8] { self.encoder.as_bytes() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_encodes_the_frame() {
        let mut world = RainWorld::new(320, 200);
        assert_eq!(world.output_len(), 320 * 200);
        world.tick();
        assert!(world.output().iter().any(|&b| b != render::EMPTY));
        assert_eq!(world.drop_count(), 300);
    }

    #[test]
    fn setters_clamp_to_control_ranges() {
        let mut world = RainWorld::new(100, 100);
        world.set_gravity(9.0);
        world.set_wind(-3.0);
        assert!(world.set_rain_count(5000).is_ok());
        world.set_rain_width(0.0);

        let s = world.scene().settings();
        assert_eq!(s.forces.gravity, 2.0);
        assert_eq!(s.forces.wind, -0.4);
        assert_eq!(s.rain.count, 1000);
        assert_eq!(s.rain.width, 1.0);
        assert_eq!(world.drop_count(), 1000);
    }

    #[test]
    fn settings_json_reapplies() {
        let mut world = RainWorld::new(100, 100);
        world.set_splash_size(3.0, 7.0);
        let json = world.settings_json().ok().expect("json");
        let mut other = RainWorld::new(100, 100);
        assert!(other.apply_settings_json(&json).is_ok());
        assert_eq!(other.scene().settings().splash.max_size, 7.0);
    }

    #[test]
    fn resize_reallocates_output() {
        let mut world = RainWorld::new(100, 100);
        world.resize(50, 40);
        assert_eq!((world.width(), world.height()), (50, 40));
        assert_eq!(world.output_len(), 2000);
        world.tick();
        assert_eq!(world.output_len(), 2000);
    }
}
