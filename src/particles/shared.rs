// shared.rs - Values shared by reference between the driver and systems
//
// Forces and the boundary are owned by nobody in particular: the driver
// creates them, any number of systems hold handles, and a write through
// one handle is seen by every holder on the next read.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

/// Shared, copy-out cell. Cloning shares the same slot.
#[derive(Debug, Default)]
pub struct Shared<T: Copy>(Rc<Cell<T>>);

impl<T: Copy> Shared<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    #[inline]
    pub fn get(&self) -> T { self.0.get() }

    #[inline]
    pub fn set(&self, value: T) { self.0.set(value) }

    /// Read-modify-write in one call
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.0.get();
        f(&mut value);
        self.0.set(value);
    }

    /// True if both handles point at the same slot
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Copy> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

// ============================================================================
// Force
// ============================================================================

/// Constant acceleration added to every particle's velocity each update.
///
/// Equality is identity: two forces with the same vector are still
/// different forces unless one is a clone of the other.
#[derive(Debug, Clone)]
pub struct Force(Shared<Vec2>);

impl Force {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Shared::new(Vec2::new(x, y)))
    }

    pub fn value(&self) -> Vec2 { self.0.get() }
    pub fn set(&self, value: Vec2) { self.0.set(value) }
    pub fn set_x(&self, x: f32) { self.0.update(|v| v.x = x) }
    pub fn set_y(&self, y: f32) { self.0.update(|v| v.y = y) }
}

impl PartialEq for Force {
    fn eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl Eq for Force {}

// ============================================================================
// Boundary
// ============================================================================

/// Logical viewport consulted by destroy predicates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Boundary {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Boundary {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Screen rectangle inset by `margin` on every side
    pub fn from_screen(width: f32, height: f32, margin: f32) -> Self {
        Self {
            left: margin,
            top: margin,
            right: width - margin,
            bottom: height - margin,
        }
    }

    pub fn width(&self) -> f32 { self.right - self.left }
    pub fn height(&self) -> f32 { self.bottom - self.top }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

pub type SharedBoundary = Shared<Boundary>;
