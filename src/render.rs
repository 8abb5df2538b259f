// render.rs - Encode particle state to an output buffer
//
// One byte per pixel, for canvas rendering on the host side:
//   0        = empty
//   1-5      = rain streak (stroke width)
//   16       = splash
//
// Higher codes win where shapes overlap. Reads particles, never writes them.

use glam::Vec2;

use crate::particles::Particle;
use crate::sim::{Droplet, SplashRegistry};

pub const EMPTY: u8 = 0;
pub const RAIN_OFFSET: u8 = 1;
pub const MAX_RAIN_WIDTH: u8 = 5;
pub const SPLASH: u8 = 16;

pub struct Encoder {
    out: Vec<u8>,
    w: u32,
    h: u32,
}

impl Encoder {
    pub fn new(w: u32, h: u32) -> Self {
        Self {
            out: vec![EMPTY; (w * h) as usize],
            w,
            h,
        }
    }

    pub fn resize(&mut self, w: u32, h: u32) {
        self.w = w;
        self.h = h;
        self.out.clear();
        self.out.resize((w * h) as usize, EMPTY);
    }

    pub fn clear(&mut self) {
        self.out.fill(EMPTY);
    }

    pub fn ptr(&self) -> *const u8 { self.out.as_ptr() }
    pub fn len(&self) -> usize { self.out.len() }
    pub fn is_empty(&self) -> bool { self.out.is_empty() }
    pub fn as_bytes(&self) -> &[u8] { &self.out }

    pub fn get(&self, x: i32, y: i32) -> u8 {
        if (x as u32) < self.w && (y as u32) < self.h {
            self.out[(y as u32 * self.w + x as u32) as usize]
        } else {
            EMPTY
        }
    }

    /// Pixels holding anything
    pub fn lit(&self) -> usize {
        self.out.iter().filter(|&&b| b != EMPTY).count()
    }

    /// Streak from the head back along the velocity, `length` long
    pub fn encode_rain(&mut self, drops: &[Particle<Droplet>], width: f32) {
        let width = (width.round() as u8).clamp(1, MAX_RAIN_WIDTH);
        let enc = RAIN_OFFSET + width - 1;

        for drop in drops {
            let head = drop.position;
            let dir = drop.velocity.normalize_or_zero();
            let tail = head - dir * drop.payload.length;
            self.line(tail, head, width as i32, enc);
        }
    }

    /// Filled disc per splash particle, `size` across
    pub fn encode_splashes(&mut self, splashes: &SplashRegistry) {
        for (_, splash) in splashes.iter() {
            for drop in splash.particles() {
                self.disc(drop.position, drop.payload.size * 0.5, SPLASH);
            }
        }
    }

    #[inline]
    fn put(&mut self, x: i32, y: i32, enc: u8) {
        if (x as u32) < self.w && (y as u32) < self.h {
            let idx = (y as u32 * self.w + x as u32) as usize;
            if enc > self.out[idx] { self.out[idx] = enc; }
        }
    }

    // DDA; thick strokes widen horizontally, rain is near vertical
    fn line(&mut self, from: Vec2, to: Vec2, width: i32, enc: u8) {
        let delta = to - from;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as i32;
        let step = delta / steps as f32;
        let half = width / 2;

        let mut p = from;
        for _ in 0..=steps {
            let (x, y) = (p.x.round() as i32, p.y.round() as i32);
            for dx in 0..width {
                self.put(x - half + dx, y, enc);
            }
            p += step;
        }
    }

    fn disc(&mut self, center: Vec2, radius: f32, enc: u8) {
        let r = radius.max(0.5);
        let (x0, x1) = ((center.x - r).floor() as i32, (center.x + r).ceil() as i32);
        let (y0, y1) = ((center.y - r).floor() as i32, (center.y + r).ceil() as i32);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = Vec2::new(x as f32, y as f32) - center;
                if d.length_squared() <= r * r {
                    self.put(x, y, enc);
                }
            }
        }
    }
}
