// spawn.rs - Spawn context handed to position, velocity and payload hooks

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::Rng;

use super::Boundary;

/// What a spawn hook can see: the current boundary and the system's RNG.
pub struct SpawnContext<'a> {
    /// Boundary at the moment of spawning.
    pub boundary: Boundary,
    rng: &'a mut SmallRng,
}

impl<'a> SpawnContext<'a> {
    pub(crate) fn new(boundary: Boundary, rng: &'a mut SmallRng) -> Self {
        Self { boundary, rng }
    }

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen_range(0.0..1.0)
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if min < max { self.rng.gen_range(min..max) } else { min }
    }

    /// Whole number in `[min, max)`, bounds given in either order.
    ///
    /// Equal bounds yield that bound. Settings arrive as floats from the
    /// control surface, so the result is a float holding an integer.
    pub fn random_integer(&mut self, min: f32, max: f32) -> f32 {
        let (lo, hi) = (min.min(max), min.max(max));
        lo + (self.random() * (hi - lo)).floor()
    }

    /// Unit vector at a random angle in `[from, to)` radians, scaled.
    pub fn random_direction(&mut self, from: f32, to: f32, magnitude: f32) -> Vec2 {
        from_angle(self.random_range(from, to), magnitude)
    }
}

/// Vector of the given length pointing along `angle` (radians).
#[inline]
pub fn from_angle(angle: f32, magnitude: f32) -> Vec2 {
    Vec2::from_angle(angle) * magnitude
}

/// Seed from the wall clock; runs are not meant to be reproducible.
pub fn clock_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().to_bits() ^ (js_sys::Math::random().to_bits() << 1)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5EED)
    }
}
