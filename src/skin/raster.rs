use euclid::{Point2D, Size2D};

use crate::color::Rgba;
use crate::engine::{LinePaint, TextEngine};
use crate::host::StageSpace;
use crate::skin::layout::{HorizontalAlign, MeasuredLine};
use crate::texture::Surface;

/// Inputs to one rasterization pass, assembled by the skin from its current
/// content, style, and animation state.
pub(crate) struct RasterParams<'a> {
    pub lines: &'a [MeasuredLine],
    pub family: &'a str,
    /// Baseline spacing inputs, pinned to the base size even while zooming.
    pub base_font_size: f32,
    pub line_height: f32,
    pub vertical_padding: f32,
    /// Size glyphs are actually drawn at (differs from base during zoom).
    pub computed_font_size: f32,
    pub wrap_width: f32,
    pub max_height: f32,
    pub align: HorizontalAlign,
    pub color: Rgba,
    /// `Some` while the rainbow effect is active.
    pub rainbow_phase: Option<f32>,
    pub logical_size: Size2D<f32, StageSpace>,
    pub scale: f32,
}

/// Clears the surface to the scaled stage footprint and draws every line.
pub(crate) fn rasterize(
    surface: &mut Surface,
    params: &RasterParams<'_>,
    engine: &mut dyn TextEngine,
) {
    let device_w = (params.logical_size.width * params.scale).ceil() as usize;
    let device_h = (params.logical_size.height * params.scale).ceil() as usize;
    surface.reset(device_w, device_h);

    for (index, line) in params.lines.iter().enumerate() {
        let top = params.vertical_padding + index as f32 * params.line_height;
        if top + params.line_height > params.max_height {
            break;
        }
        if line.text.is_empty() {
            continue;
        }

        let x = params.align.offset(params.wrap_width, line.width);
        let baseline = top + params.base_font_size;
        let paint = match params.rainbow_phase {
            Some(phase) => LinePaint::Rainbow {
                line_width: line.width,
                phase,
            },
            None => LinePaint::Flat(params.color),
        };

        engine.draw_line(
            surface,
            &line.text,
            params.family,
            params.computed_font_size,
            Point2D::new(x, baseline),
            params.scale,
            &paint,
        );
    }
}
