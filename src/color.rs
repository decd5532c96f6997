use palette::{FromColor, Hsv, Srgb};

/// 8-bit RGBA color used for text fills and surface pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses a `#rrggbb` or `#rgb` string as produced by host color pickers.
    ///
    /// Returns `None` for anything else; callers fall back to their previous
    /// color rather than erroring.
    pub fn from_css_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        match hex.len() {
            6 => {
                let value = u32::from_str_radix(hex, 16).ok()?;
                Some(Self::opaque(
                    (value >> 16) as u8,
                    (value >> 8) as u8,
                    value as u8,
                ))
            }
            3 => {
                let value = u32::from_str_radix(hex, 16).ok()?;
                let expand = |n: u32| (n | (n << 4)) as u8;
                Some(Self::opaque(
                    expand((value >> 8) & 0xf),
                    expand((value >> 4) & 0xf),
                    expand(value & 0xf),
                ))
            }
            _ => None,
        }
    }
}

/// Fully saturated hue sweep used by the rainbow effect.
///
/// `t` is a phase in revolutions; values outside `[0, 1)` wrap around.
pub fn rainbow(t: f32) -> Rgba {
    let hue = t.rem_euclid(1.0) * 360.0;
    let rgb = Srgb::from_color(Hsv::new(hue, 1.0, 1.0)).into_format::<u8>();
    Rgba::opaque(rgb.red, rgb.green, rgb.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        assert_eq!(
            Rgba::from_css_hex("#17a0ff"),
            Some(Rgba::opaque(0x17, 0xa0, 0xff))
        );
    }

    #[test]
    fn parses_three_digit_hex() {
        assert_eq!(Rgba::from_css_hex("#fff"), Some(Rgba::WHITE));
        assert_eq!(Rgba::from_css_hex("#000"), Some(Rgba::BLACK));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Rgba::from_css_hex("fff"), None);
        assert_eq!(Rgba::from_css_hex("#ggg"), None);
        assert_eq!(Rgba::from_css_hex("#12345"), None);
    }

    #[test]
    fn rainbow_wraps_phase() {
        assert_eq!(rainbow(0.25), rainbow(1.25));
        assert_eq!(rainbow(0.0), Rgba::opaque(255, 0, 0));
    }
}
