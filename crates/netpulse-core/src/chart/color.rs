//! RGBA color and linear interpolation.

use serde::{Deserialize, Serialize};

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 255 = fully opaque.
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    // Series defaults, matching the TUI palette.
    /// #80ffea
    pub const DOWNLOAD: Self = Self::rgb(128, 255, 234);
    /// #ff6ac1
    pub const UPLOAD: Self = Self::rgb(255, 106, 193);
    /// #1e1f29
    pub const BACKGROUND: Self = Self::rgb(30, 31, 41);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Interpolate towards `other`; `t` is clamped to `[0, 1]`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::as_conversions
    )]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f32::from(a) * (1.0 - t) + f32::from(b) * t).round() as u8;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Rgba;

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Rgba::new(0, 0, 0, 0);
        let b = Rgba::new(200, 100, 50, 255);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgba::new(100, 50, 25, 128));
        assert_eq!(a.lerp(b, 7.0), b);
    }
}
