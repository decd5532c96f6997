use std::sync::Arc;

use euclid::Point2D;
use fxhash::FxHashMap;
use parking_lot::Mutex;

use crate::color::{Rgba, rainbow};
use crate::font_store::FontStore;
use crate::host::StageSpace;
use crate::texture::Surface;

/// Fill style for a single rasterized line.
pub enum LinePaint {
    Flat(Rgba),
    /// Horizontal hue gradient spanning the line's measured width.
    /// `phase` shifts the gradient as the rainbow effect advances.
    Rainbow { line_width: f32, phase: f32 },
}

impl LinePaint {
    fn color_at(&self, logical_x: f32) -> Rgba {
        match self {
            Self::Flat(color) => *color,
            Self::Rainbow { line_width, phase } => {
                let span = line_width.max(1.0);
                rainbow(logical_x / span + phase)
            }
        }
    }
}

/// Measurement and rasterization seam between skins and the font stack.
///
/// Skins only ever measure line widths and draw single lines at a baseline,
/// so the trait stays narrow enough for tests to substitute a fixed-advance
/// fake without touching any real font.
pub trait TextEngine: Send {
    /// Measured advance width of `text` at `font_size`, in logical units.
    fn measure(&mut self, text: &str, family: &str, font_size: f32) -> f32;

    /// Draws one line of text into `surface`.
    ///
    /// `origin` is the logical position of the line's left edge at the
    /// baseline; `scale` converts logical units to device pixels.
    fn draw_line(
        &mut self,
        surface: &mut Surface,
        text: &str,
        family: &str,
        font_size: f32,
        origin: Point2D<f32, StageSpace>,
        scale: f32,
        paint: &LinePaint,
    );
}

/// Engine handle shared between the stage adapter and every skin.
pub type SharedTextEngine = Arc<Mutex<dyn TextEngine>>;

const SIZE_QUANTIZE: f32 = 256.0;

/// Cache key for a rasterized glyph bitmap.
///
/// The size is quantized so floating-point jitter in the effective scale does
/// not defeat the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GlyphKey {
    font_id: fontdb::ID,
    ch: char,
    font_size: u32,
}

impl GlyphKey {
    fn new(font_id: fontdb::ID, ch: char, font_size: f32) -> Self {
        Self {
            font_id,
            ch,
            font_size: (font_size * SIZE_QUANTIZE).round() as u32,
        }
    }
}

struct CachedGlyph {
    metrics: fontdue::Metrics,
    coverage: Vec<u8>,
}

/// Production [`TextEngine`] backed by [`FontStore`].
///
/// Glyphs are rasterized at device resolution and cached per
/// (font, char, size) key; the cache is unbounded but bounded in practice by
/// the handful of sizes a stage uses.
pub struct FontEngine {
    store: FontStore,
    glyph_cache: FxHashMap<GlyphKey, CachedGlyph>,
}

impl FontEngine {
    pub fn new(store: FontStore) -> Self {
        Self {
            store,
            glyph_cache: FxHashMap::default(),
        }
    }

    /// Convenience constructor that loads the system fonts.
    pub fn with_system_fonts() -> Self {
        let mut store = FontStore::new();
        store.load_system_fonts();
        Self::new(store)
    }

    /// Wraps the engine in the shared handle used by skins.
    pub fn into_shared(self) -> SharedTextEngine {
        Arc::new(Mutex::new(self))
    }

    pub fn clear_cache(&mut self) {
        self.glyph_cache.clear();
    }

    pub fn store_mut(&mut self) -> &mut FontStore {
        &mut self.store
    }

    fn draw_glyph(
        surface: &mut Surface,
        cached: &CachedGlyph,
        cursor_x: f32,
        baseline_y: f32,
        paint: &LinePaint,
        origin_x: f32,
        scale: f32,
    ) {
        let m = &cached.metrics;
        let left = cursor_x + m.xmin as f32;
        let top = baseline_y - (m.height as f32 + m.ymin as f32);

        for row in 0..m.height {
            let y = (top + row as f32).floor() as isize;
            for col in 0..m.width {
                let coverage = cached.coverage[row * m.width + col];
                if coverage == 0 {
                    continue;
                }
                let px = left + col as f32;
                let logical_x = px / scale - origin_x;
                surface.blend_pixel(
                    px.floor() as isize,
                    y,
                    paint.color_at(logical_x),
                    coverage,
                );
            }
        }
    }
}

impl TextEngine for FontEngine {
    fn measure(&mut self, text: &str, family: &str, font_size: f32) -> f32 {
        let Some((_, font)) = self.store.query_family(family) else {
            return 0.0;
        };

        let mut width = 0.0;
        let mut prev: Option<char> = None;
        for ch in text.chars() {
            if let Some(prev) = prev {
                width += font.horizontal_kern(prev, ch, font_size).unwrap_or(0.0);
            }
            width += font.metrics(ch, font_size).advance_width;
            prev = Some(ch);
        }
        width
    }

    fn draw_line(
        &mut self,
        surface: &mut Surface,
        text: &str,
        family: &str,
        font_size: f32,
        origin: Point2D<f32, StageSpace>,
        scale: f32,
        paint: &LinePaint,
    ) {
        let Some((font_id, font)) = self.store.query_family(family) else {
            log::warn!("draw_line: no usable font for family `{family}`");
            return;
        };

        // Glyphs are rasterized at device size so text stays crisp at every
        // render scale instead of upscaling a fixed-size bitmap.
        let device_size = font_size * scale;
        let mut cursor_x = origin.x * scale;
        let baseline_y = origin.y * scale;
        let mut prev: Option<char> = None;

        for ch in text.chars() {
            if let Some(prev) = prev {
                let kern = font.horizontal_kern(prev, ch, device_size).unwrap_or(0.0);
                cursor_x += kern;
            }

            let key = GlyphKey::new(font_id, ch, device_size);
            let cached = self.glyph_cache.entry(key).or_insert_with(|| {
                let (metrics, coverage) = font.rasterize(ch, device_size);
                CachedGlyph { metrics, coverage }
            });

            Self::draw_glyph(surface, cached, cursor_x, baseline_y, paint, origin.x, scale);

            cursor_x += cached.metrics.advance_width;
            prev = Some(ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_paint_ignores_position() {
        let paint = LinePaint::Flat(Rgba::WHITE);
        assert_eq!(paint.color_at(0.0), Rgba::WHITE);
        assert_eq!(paint.color_at(123.0), Rgba::WHITE);
    }

    #[test]
    fn rainbow_paint_sweeps_hue_across_line() {
        let paint = LinePaint::Rainbow {
            line_width: 100.0,
            phase: 0.0,
        };
        let start = paint.color_at(0.0);
        let middle = paint.color_at(50.0);
        assert_ne!(start, middle);
        // One full revolution returns to the starting hue.
        assert_eq!(start, paint.color_at(100.0));
    }

    #[test]
    fn glyph_key_quantizes_size() {
        let id = fontdb::ID::dummy();
        assert_eq!(GlyphKey::new(id, 'a', 12.0), GlyphKey::new(id, 'a', 12.0001));
        assert_ne!(GlyphKey::new(id, 'a', 12.0), GlyphKey::new(id, 'a', 13.0));
    }
}
