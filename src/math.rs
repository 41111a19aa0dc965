use std::ops::{Add, AddAssign, Mul, RangeInclusive, Sub};

use bytemuck::NoUninit;

#[derive(Debug, Default, Clone, Copy, PartialEq, NoUninit)]
#[repr(C)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

impl Vec2f {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn dist(self, other: Self) -> f32 {
        (other - self).length()
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Clamps both components into `0..=max`, componentwise.
    pub fn clamped(self, max: Vec2f) -> Vec2f {
        vec2(self.x.clamp(0.0, max.x), self.y.clamp(0.0, max.y))
    }
}

pub fn vec2(x: f32, y: f32) -> Vec2f {
    Vec2f { x, y }
}

impl Add for Vec2f {
    type Output = Vec2f;

    fn add(self, rhs: Vec2f) -> Vec2f {
        vec2(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2f {
    fn add_assign(&mut self, rhs: Vec2f) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2f {
    type Output = Vec2f;

    fn sub(self, rhs: Vec2f) -> Vec2f {
        vec2(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2f {
    type Output = Vec2f;

    fn mul(self, rhs: f32) -> Vec2f {
        vec2(self.x * rhs, self.y * rhs)
    }
}

pub fn lerp<R>(range: RangeInclusive<R>, t: f32) -> R
where
    R: Copy + Add<R, Output = R> + Mul<f32, Output = R>,
{
    *range.start() * (1.0 - t) + *range.end() * t
}

/// Converts one sRGB-encoded channel into linear light.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
