// fps.rs - Frames-per-second counter
//
// Counts ticks and publishes the count once per interval. Not part of
// the simulation; the driver ticks it after the particle updates.

const INTERVAL_MS: f64 = 1000.0;

#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval_ms: f64,
    last_ms: f64,
    count: u32,
    frames: u32,
}

impl FpsCounter {
    pub fn new(now_ms: f64) -> Self {
        Self {
            interval_ms: INTERVAL_MS,
            last_ms: now_ms,
            count: 0,
            frames: 0,
        }
    }

    /// Count one frame at time `now_ms`.
    pub fn tick(&mut self, now_ms: f64) {
        self.count += 1;
        if now_ms - self.last_ms > self.interval_ms {
            self.frames = self.count;
            self.count = 0;
            self.last_ms = now_ms;
        }
    }

    /// Frames counted in the last completed interval
    pub fn frames(&self) -> u32 { self.frames }
}

/// Wall clock in milliseconds
pub fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}
