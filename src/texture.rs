use crate::color::Rgba;

/// Offscreen RGBA8 drawing surface backing a text costume skin.
///
/// Pixels are row-major with the origin at the top-left. The surface is
/// resized in place when the requested device size changes and cleared before
/// every rasterization pass, so the allocation is reused frame to frame.
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width.saturating_mul(height) * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA8 pixel data, `width * height * 4` bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Resizes to the requested device size and clears all pixels.
    ///
    /// Reuses the existing allocation when the size is unchanged.
    pub fn reset(&mut self, width: usize, height: usize) {
        let len = width.saturating_mul(height) * 4;
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixels.resize(len, 0);
        }
        self.pixels.fill(0);
    }

    /// Releases the pixel allocation. Used on disposal only.
    pub fn release(&mut self) {
        self.width = 0;
        self.height = 0;
        self.pixels = Vec::new();
    }

    /// Blends `color` into the pixel at `(x, y)` with 8-bit `coverage`.
    ///
    /// Out-of-bounds writes are ignored so glyphs can spill past the surface
    /// edge without the caller clipping every coordinate.
    pub fn blend_pixel(&mut self, x: isize, y: isize, color: Rgba, coverage: u8) {
        if coverage == 0 || x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = (y * self.width + x) * 4;
        let src_a = (coverage as u16 * color.a as u16) / 255;
        let inv = 255 - src_a;

        let blend = |dst: u8, src: u8| -> u8 {
            ((src as u16 * src_a + dst as u16 * inv) / 255) as u8
        };
        self.pixels[idx] = blend(self.pixels[idx], color.r);
        self.pixels[idx + 1] = blend(self.pixels[idx + 1], color.g);
        self.pixels[idx + 2] = blend(self.pixels[idx + 2], color.b);
        let dst_a = self.pixels[idx + 3] as u16;
        self.pixels[idx + 3] = (src_a + (dst_a * inv) / 255).min(255) as u8;
    }
}

/// Texture handle handed to the host renderer.
///
/// Created once per skin and mutated in place: the host must treat the handle
/// as aliased and stable across queries, and only reinterpret its contents
/// after a query that actually re-rendered. The generation counter increments
/// on every re-render so callers can detect that cheaply.
pub struct Texture {
    surface: Surface,
    generation: u64,
}

impl Texture {
    pub fn new() -> Self {
        Self {
            surface: Surface::new(0, 0),
            generation: 0,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub(crate) fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Number of completed rasterization passes into this texture.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn bump_generation(&mut self) {
        self.generation += 1;
    }

    pub(crate) fn release(&mut self) {
        self.surface.release();
    }
}

impl Default for Texture {
    fn default() -> Self {
        Self::new()
    }
}

/// Hit-test mask derived from the surface alpha channel.
///
/// The mask goes stale whenever the texture is re-rendered; hosts must call
/// the skin's silhouette refresh before trusting pixel-accurate hit tests.
pub struct Silhouette {
    width: usize,
    height: usize,
    mask: Vec<u8>,
}

impl Silhouette {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            mask: Vec::new(),
        }
    }

    /// Rebuilds the mask from the surface's alpha channel.
    pub fn rebuild_from(&mut self, surface: &Surface) {
        self.width = surface.width();
        self.height = surface.height();
        self.mask.clear();
        self.mask
            .extend(surface.pixels().iter().skip(3).step_by(4));
    }

    /// Whether the device pixel at `(x, y)` is opaque enough to count as a hit.
    pub fn is_touching(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.mask[y * self.width + x] > 0
    }
}

impl Default for Silhouette {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_reuses_allocation_and_clears() {
        let mut surface = Surface::new(4, 4);
        surface.blend_pixel(1, 1, Rgba::WHITE, 255);
        assert_ne!(surface.pixels()[(1 * 4 + 1) * 4 + 3], 0);

        surface.reset(4, 4);
        assert!(surface.pixels().iter().all(|&p| p == 0));

        surface.reset(2, 8);
        assert_eq!(surface.width(), 2);
        assert_eq!(surface.height(), 8);
        assert_eq!(surface.pixels().len(), 2 * 8 * 4);
    }

    #[test]
    fn blend_ignores_out_of_bounds() {
        let mut surface = Surface::new(2, 2);
        surface.blend_pixel(-1, 0, Rgba::WHITE, 255);
        surface.blend_pixel(2, 0, Rgba::WHITE, 255);
        surface.blend_pixel(0, 5, Rgba::WHITE, 255);
        assert!(surface.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn silhouette_tracks_alpha() {
        let mut surface = Surface::new(2, 1);
        surface.blend_pixel(1, 0, Rgba::WHITE, 255);

        let mut silhouette = Silhouette::new();
        silhouette.rebuild_from(&surface);
        assert!(!silhouette.is_touching(0, 0));
        assert!(silhouette.is_touching(1, 0));
        assert!(!silhouette.is_touching(2, 0));
    }
}
