use std::fmt;

use serde::{Deserialize, Serialize};

/// Packed 32-bit color, `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Argb(pub u32);

impl Argb {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0);

    /// Build a color from its four channels.
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(0xFF, r, g, b)
    }

    /// Build from an RGBA pixel (`image` channel order).
    pub const fn from_rgba(px: [u8; 4]) -> Self {
        Self::new(px[3], px[0], px[1], px[2])
    }

    /// Opaque color from 0..1 float channels (MTL `Kd` convention).
    pub fn from_unit_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::opaque(unit_to_byte(r), unit_to_byte(g), unit_to_byte(b))
    }

    /// Alpha channel.
    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Red channel.
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel.
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel.
    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// True when alpha is 255.
    pub const fn is_opaque(self) -> bool {
        self.a() == 0xFF
    }

    /// Squared euclidean distance over RGB. Alpha is ignored.
    pub fn distance_sq(self, other: Argb) -> u32 {
        let dr = self.r() as i32 - other.r() as i32;
        let dg = self.g() as i32 - other.g() as i32;
        let db = self.b() as i32 - other.b() as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

fn unit_to_byte(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

impl fmt::Display for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_round_trip() {
        let c = Argb::new(0x80, 0x11, 0x22, 0x33);
        assert_eq!((c.a(), c.r(), c.g(), c.b()), (0x80, 0x11, 0x22, 0x33));
        assert_eq!(c.0, 0x8011_2233);
    }

    #[test]
    fn rgba_pixel_order() {
        assert_eq!(Argb::from_rgba([1, 2, 3, 4]), Argb::new(4, 1, 2, 3));
    }

    #[test]
    fn unit_rgb_scales_and_clamps() {
        assert_eq!(Argb::from_unit_rgb(1.0, 0.0, 2.0), Argb::opaque(255, 0, 255));
        assert_eq!(Argb::from_unit_rgb(0.5, -1.0, f32::NAN), Argb::opaque(127, 0, 0));
    }

    #[test]
    fn distance_ignores_alpha() {
        let a = Argb::new(0, 10, 0, 0);
        let b = Argb::new(255, 0, 0, 0);
        assert_eq!(a.distance_sq(b), 100);
    }
}
