// config.rs - Live-editable simulation settings
//
// Settings are plain numbers read fresh by the spawn hooks every time
// they fire, so an edit between frames takes effect on the next spawn.
// Ranges mirror the control panel sliders; the engine itself tolerates
// anything, `validate` is for files and the facade clamps.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const GRAVITY_RANGE: RangeInclusive<f32> = 0.1..=2.0;
pub const WIND_RANGE: RangeInclusive<f32> = -0.4..=0.4;
pub const RAIN_COUNT_RANGE: RangeInclusive<u32> = 10..=1000;
pub const RAIN_LENGTH_RANGE: RangeInclusive<f32> = 1.0..=170.0;
pub const RAIN_WIDTH_RANGE: RangeInclusive<f32> = 1.0..=5.0;
pub const RAIN_SPEED_RANGE: RangeInclusive<f32> = 0.0..=100.0;
pub const SPLASH_COUNT_RANGE: RangeInclusive<u32> = 5..=30;
pub const SPLASH_SIZE_RANGE: RangeInclusive<f32> = 1.0..=10.0;
pub const SPLASH_SPEED_RANGE: RangeInclusive<f32> = 1.0..=15.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub show_fps: bool,
    /// Inset of the destroy boundary from the screen edges
    pub rain_edge_margin: f32,
    pub forces: ForceSettings,
    pub rain: RainSettings,
    pub splash: SplashSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceSettings {
    /// Downward acceleration per frame
    pub gravity: f32,
    /// Sideways acceleration per frame
    pub wind: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RainSettings {
    pub count: u32,
    /// Horizontal overspill so wind-blown drops enter from the sides
    pub offset: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub min_length: f32,
    pub max_length: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SplashSettings {
    pub count: u32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub min_size: f32,
    pub max_size: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_fps: true,
            rain_edge_margin: 0.0,
            forces: ForceSettings::default(),
            rain: RainSettings::default(),
            splash: SplashSettings::default(),
        }
    }
}

impl Default for ForceSettings {
    fn default() -> Self {
        Self { gravity: 0.3, wind: 0.1 }
    }
}

impl Default for RainSettings {
    fn default() -> Self {
        Self {
            count: 300,
            offset: 300.0,
            min_speed: 10.0,
            max_speed: 20.0,
            min_length: 10.0,
            max_length: 120.0,
            width: 1.0,
        }
    }
}

impl Default for SplashSettings {
    fn default() -> Self {
        Self {
            count: 10,
            min_speed: 2.0,
            max_speed: 6.0,
            min_size: 2.0,
            max_size: 4.0,
        }
    }
}

impl Settings {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from a `.toml` or `.json` file, chosen by extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(Error::Config(format!("unsupported settings format: {other:?}"))),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => self.to_toml()?,
            _ => self.to_json()?,
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override from `RAIN_COUNT`, `RAIN_GRAVITY`, `RAIN_WIND`, `SPLASH_COUNT`.
    /// Unparseable values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        override_from_env("RAIN_COUNT", &mut self.rain.count);
        override_from_env("RAIN_GRAVITY", &mut self.forces.gravity);
        override_from_env("RAIN_WIND", &mut self.forces.wind);
        override_from_env("SPLASH_COUNT", &mut self.splash.count);
    }

    /// Check every value against its control range.
    pub fn validate(&self) -> Result<()> {
        check("forces.gravity", self.forces.gravity, &GRAVITY_RANGE)?;
        check("forces.wind", self.forces.wind, &WIND_RANGE)?;
        check("rain.count", self.rain.count, &RAIN_COUNT_RANGE)?;
        check("rain.minLength", self.rain.min_length, &RAIN_LENGTH_RANGE)?;
        check("rain.maxLength", self.rain.max_length, &RAIN_LENGTH_RANGE)?;
        check("rain.width", self.rain.width, &RAIN_WIDTH_RANGE)?;
        check("rain.minSpeed", self.rain.min_speed, &RAIN_SPEED_RANGE)?;
        check("rain.maxSpeed", self.rain.max_speed, &RAIN_SPEED_RANGE)?;
        check("splash.count", self.splash.count, &SPLASH_COUNT_RANGE)?;
        check("splash.minSize", self.splash.min_size, &SPLASH_SIZE_RANGE)?;
        check("splash.maxSize", self.splash.max_size, &SPLASH_SIZE_RANGE)?;
        check("splash.minSpeed", self.splash.min_speed, &SPLASH_SPEED_RANGE)?;
        check("splash.maxSpeed", self.splash.max_speed, &SPLASH_SPEED_RANGE)?;
        if self.rain_edge_margin < 0.0 {
            return Err(Error::Config(format!(
                "rainEdgeMargin must be non-negative, got {}",
                self.rain_edge_margin
            )));
        }
        Ok(())
    }
}

fn check<T: PartialOrd + std::fmt::Debug>(name: &str, value: T, range: &RangeInclusive<T>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::Config(format!("{name} = {value:?} outside {range:?}")))
    }
}

fn override_from_env<T: std::str::FromStr>(key: &str, slot: &mut T) {
    let Ok(raw) = std::env::var(key) else { return };
    match raw.parse() {
        Ok(value) => *slot = value,
        Err(_) => tracing::warn!(target: "config", "ignoring {key}={raw:?}: not a number"),
    }
}

/// Clamp a slider value into its range.
pub fn clamp_to<T: PartialOrd + Copy>(value: T, range: &RangeInclusive<T>) -> T {
    if value < *range.start() {
        *range.start()
    } else if value > *range.end() {
        *range.end()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s = Settings::from_json_str(r#"{ "rain": { "count": 500 }, "forces": { "wind": -0.2 } }"#)
            .expect("parse");
        assert_eq!(s.rain.count, 500);
        assert_eq!(s.rain.max_length, 120.0);
        assert_eq!(s.forces.wind, -0.2);
        assert_eq!(s.forces.gravity, 0.3);
        assert_eq!(s.splash, SplashSettings::default());
    }

    #[test]
    fn toml_uses_camel_case_keys() {
        let s = Settings::from_toml_str(
            "showFps = false\nrainEdgeMargin = 4.0\n\n[splash]\nminSize = 3.0\n",
        )
        .expect("parse");
        assert!(!s.show_fps);
        assert_eq!(s.rain_edge_margin, 4.0);
        assert_eq!(s.splash.min_size, 3.0);
    }

    #[test]
    fn json_and_toml_reload_to_the_same_settings() {
        let mut s = Settings::default();
        s.rain.count = 420;
        s.splash.max_speed = 9.0;
        assert_eq!(Settings::from_json_str(&s.to_json().expect("json")).expect("parse"), s);
        assert_eq!(Settings::from_toml_str(&s.to_toml().expect("toml")).expect("parse"), s);
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let mut s = Settings::default();
        s.forces.gravity = 5.0;
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("forces.gravity"));

        let mut s = Settings::default();
        s.splash.count = 0;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.rain_edge_margin = -1.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn malformed_input_is_a_config_error() {
        assert!(matches!(Settings::from_json_str("{ rain: "), Err(Error::Config(_))));
        assert!(matches!(Settings::from_toml_str("rain = ["), Err(Error::Config(_))));
    }

    #[test]
    fn clamp_to_respects_bounds() {
        assert_eq!(clamp_to(3.0, &GRAVITY_RANGE), 2.0);
        assert_eq!(clamp_to(-1.0, &WIND_RANGE), -0.4);
        assert_eq!(clamp_to(50, &RAIN_COUNT_RANGE), 50);
    }

    #[test]
    fn save_and_load_by_extension() {
        let dir = std::env::temp_dir().join(format!("rainfall-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("dir");
        let mut s = Settings::default();
        s.rain.width = 3.0;

        let json = dir.join("settings.json");
        s.save(&json).expect("save json");
        assert_eq!(Settings::load(&json).expect("load json"), s);

        let toml = dir.join("settings.toml");
        s.save(&toml).expect("save toml");
        assert_eq!(Settings::load(&toml).expect("load toml"), s);

        let other = dir.join("settings.yaml");
        std::fs::write(&other, "").expect("write");
        assert!(matches!(Settings::load(&other), Err(Error::Config(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
