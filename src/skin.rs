pub mod layout;
pub(crate) mod raster;

use std::sync::Arc;
use std::time::Duration;

use euclid::{Point2D, Size2D};

use crate::animation::{AnimationKind, AnimationState, Completion};
use crate::color::Rgba;
use crate::engine::SharedTextEngine;
use crate::host::{DrawableId, FrameClock, SkinId, StageSpace};
use crate::skin::layout::{HorizontalAlign, MeasuredLine, break_lines};
use crate::skin::raster::{RasterParams, rasterize};
use crate::texture::{Silhouette, Texture};

/// Hard ceiling on the device-pixel render scale.
pub const MAX_RENDER_SCALE: f32 = 10.0;

/// Initial style of a freshly created skin.
///
/// Plain data with defaults; the host can override any field before the
/// first render.
#[derive(Clone, Debug)]
pub struct TextSkinConfig {
    pub font_family: String,
    pub base_font_size: f32,
    pub line_height: f32,
    pub vertical_padding: f32,
    pub color: Rgba,
    pub align: HorizontalAlign,
}

impl Default for TextSkinConfig {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            base_font_size: 24.0,
            line_height: 32.0,
            vertical_padding: 8.0,
            color: Rgba::BLACK,
            align: HorizontalAlign::Start,
        }
    }
}

/// Value snapshot of the fields a clone inherits.
///
/// Deliberately excludes animation state, dirty flags, and the texture:
/// clones start from a clean skin with copied style only.
#[derive(Clone, Debug)]
pub struct TextSkinStyle {
    pub text: String,
    pub color: Rgba,
    pub align: HorizontalAlign,
    pub font_family: String,
    pub wrap_width: f32,
}

/// Contract the host renderer expects from every skin implementation.
///
/// Matches the host's existing skin types: report a size and rotation
/// center, produce a texture for a requested display scale, refresh the
/// hit-test mask, release resources.
pub trait Skin {
    fn size(&self) -> Size2D<f32, StageSpace>;
    fn rotation_center(&self) -> Point2D<f32, StageSpace>;

    /// Demand-pull texture query. `scale` is the drawable's display scale as
    /// `[x, y]` percentages (100 = natural size).
    fn get_texture(&mut self, scale: [f32; 2]) -> &Texture;

    /// Forces a render and rebuilds the hit-test mask. Must be called before
    /// any pixel-accurate hit test is trusted.
    fn update_silhouette(&mut self);

    /// Releases the texture and drawing surface. Idempotent.
    fn dispose(&mut self);
}

/// Dynamically rendered text costume consumed by the host renderer as if it
/// were a normal sprite costume.
///
/// The skin tracks two independent dirty booleans plus two derived
/// comparisons computed at query time (render scale, frame stamp). Content
/// changes re-run line breaking and re-rasterize; style changes re-rasterize
/// only; continuous animations (rainbow, zoom) re-render every frame while
/// active. The common case is a cache hit that returns the existing texture
/// handle untouched.
pub struct TextCostumeSkin {
    id: Option<SkinId>,
    drawable: DrawableId,
    engine: SharedTextEngine,
    clock: Arc<FrameClock>,

    // Content inputs.
    text: String,
    color: Rgba,
    align: HorizontalAlign,
    font_family: String,
    base_font_size: f32,
    wrap_width: f32,
    max_height: f32,

    // Derived at reflow time.
    computed_font_size: f32,
    line_height: f32,
    vertical_padding: f32,
    lines: Vec<MeasuredLine>,
    logical_size: Size2D<f32, StageSpace>,

    // Invalidation state.
    content_dirty: bool,
    style_dirty: bool,
    rendered_scale: f32,
    rendered_frame: u64,

    animation: AnimationState,

    texture: Texture,
    silhouette: Silhouette,
    disposed: bool,
}

impl TextCostumeSkin {
    /// Creates a skin occupying the full stage footprint.
    pub fn new(
        drawable: DrawableId,
        engine: SharedTextEngine,
        clock: Arc<FrameClock>,
        stage_size: Size2D<f32, StageSpace>,
        config: &TextSkinConfig,
    ) -> Self {
        Self {
            id: None,
            drawable,
            engine,
            clock,
            text: String::new(),
            color: config.color,
            align: config.align,
            font_family: config.font_family.clone(),
            base_font_size: config.base_font_size,
            wrap_width: stage_size.width,
            max_height: stage_size.height,
            computed_font_size: config.base_font_size,
            line_height: config.line_height,
            vertical_padding: config.vertical_padding,
            lines: Vec::new(),
            logical_size: stage_size,
            content_dirty: true,
            style_dirty: false,
            rendered_scale: 0.0,
            rendered_frame: 0,
            animation: AnimationState::new(),
            texture: Texture::new(),
            silhouette: Silhouette::new(),
            disposed: false,
        }
    }

    pub(crate) fn assign_id(&mut self, id: SkinId) {
        self.id = Some(id);
    }

    pub fn id(&self) -> Option<SkinId> {
        self.id
    }

    pub fn drawable(&self) -> DrawableId {
        self.drawable
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Style fields a clone copies by value.
    pub fn style_snapshot(&self) -> TextSkinStyle {
        TextSkinStyle {
            text: self.text.clone(),
            color: self.color,
            align: self.align,
            font_family: self.font_family.clone(),
            wrap_width: self.wrap_width,
        }
    }

    pub fn apply_style(&mut self, style: &TextSkinStyle) {
        self.text = style.text.clone();
        self.color = style.color;
        self.align = style.align;
        self.font_family = style.font_family.clone();
        self.wrap_width = style.wrap_width;
        self.content_dirty = true;
    }

    /// Replaces the displayed text. Equal values are a no-op.
    pub fn set_text(&mut self, text: &str) {
        if self.text == text {
            return;
        }
        self.text = text.to_string();
        self.content_dirty = true;
    }

    pub fn set_color(&mut self, color: Rgba) {
        if self.color == color {
            return;
        }
        self.color = color;
        self.style_dirty = true;
    }

    pub fn set_align(&mut self, align: HorizontalAlign) {
        if self.align == align {
            return;
        }
        self.align = align;
        self.style_dirty = true;
    }

    pub fn set_font(&mut self, family: &str) {
        if self.font_family == family {
            return;
        }
        self.font_family = family.to_string();
        self.style_dirty = true;
    }

    /// Wrap width changes line breaking, so this is content-affecting.
    pub fn set_width(&mut self, width: f32) {
        self.wrap_width = width;
        self.content_dirty = true;
    }

    pub fn set_height(&mut self, height: f32) {
        self.max_height = height;
        self.content_dirty = true;
    }

    pub fn animation_kind(&self) -> AnimationKind {
        self.animation.kind()
    }

    /// Starts the typewriter reveal over the current text.
    pub fn start_type_animation(&mut self) -> Completion {
        let total = self.text.chars().count();
        let completion = self.animation.start_typing(total, self.clock.now());
        self.content_dirty = true;
        completion
    }

    pub fn start_rainbow_animation(&mut self) -> Completion {
        let completion = self.animation.start_rainbow(self.clock.now());
        self.style_dirty = true;
        completion
    }

    pub fn start_zoom_animation(&mut self) -> Completion {
        let completion = self.animation.start_zoom(self.clock.now());
        self.content_dirty = true;
        completion
    }

    /// Cancels any running animation and settles the display.
    pub fn cancel_animation(&mut self) {
        if self.animation.cancel() {
            self.content_dirty = true;
        }
    }

    /// Advances animation timers; called once per frame by the stage adapter
    /// before the host's draw pass.
    ///
    /// Returns `true` when the skin needs a redraw this frame.
    pub(crate) fn tick(&mut self, now: Duration) -> bool {
        let invalidation = self.animation.tick(now);
        if invalidation.content {
            self.content_dirty = true;
        }
        if invalidation.style {
            self.style_dirty = true;
        }
        invalidation.any() || self.animation.is_continuous()
    }

    /// Portion of the text currently revealed by the typewriter.
    fn visible_text(&self) -> &str {
        match self.animation.visible_chars() {
            Some(n) => {
                let end = self
                    .text
                    .char_indices()
                    .nth(n)
                    .map(|(i, _)| i)
                    .unwrap_or(self.text.len());
                &self.text[..end]
            }
            None => &self.text,
        }
    }

    /// Re-runs line breaking from the current content inputs.
    fn reflow(&mut self) {
        let engine = Arc::clone(&self.engine);
        let mut engine = engine.lock();
        let family = self.font_family.clone();
        let size = self.computed_font_size;
        let text = self.visible_text().to_string();

        self.lines = break_lines(&text, self.wrap_width, &mut |s| {
            engine.measure(s, &family, size)
        });
    }

    /// Redraws the surface at `scale` device pixels per logical unit.
    fn render(&mut self, scale: f32, now: Duration) {
        let params = RasterParams {
            lines: &self.lines,
            family: &self.font_family,
            base_font_size: self.base_font_size,
            line_height: self.line_height,
            vertical_padding: self.vertical_padding,
            computed_font_size: self.computed_font_size,
            wrap_width: self.wrap_width,
            max_height: self.max_height,
            align: self.align,
            color: self.color,
            rainbow_phase: self.animation.rainbow_phase(now),
            logical_size: self.logical_size,
            scale,
        };

        let engine = Arc::clone(&self.engine);
        let mut engine = engine.lock();
        rasterize(self.texture.surface_mut(), &params, &mut *engine);
        self.texture.bump_generation();
    }

    /// The core read path shared by `get_texture` and `update_silhouette`.
    fn query_texture(&mut self, scale: f32) {
        let frame = self.clock.frame();
        let now = self.clock.now();

        // The zoomed font size is a layout input, so deriving it can itself
        // trigger a reflow.
        match self.animation.zoom_progress(now) {
            Some(progress) => {
                let zoomed = self.base_font_size * progress;
                if zoomed != self.computed_font_size {
                    self.computed_font_size = zoomed;
                    self.content_dirty = true;
                }
            }
            None => {
                if self.computed_font_size != self.base_font_size {
                    self.computed_font_size = self.base_font_size;
                    self.content_dirty = true;
                }
            }
        }

        let continuous_frame_advance =
            self.animation.is_continuous() && frame != self.rendered_frame;
        let needs_render = self.content_dirty
            || self.style_dirty
            || scale != self.rendered_scale
            || continuous_frame_advance;

        if !needs_render {
            return;
        }

        // Reflow always runs before rasterization when both are pending.
        if self.content_dirty {
            self.reflow();
        }
        self.render(scale, now);
        self.content_dirty = false;
        self.style_dirty = false;
        self.rendered_scale = scale;
        self.rendered_frame = frame;
    }
}

/// Normalizes a drawable's `[x, y]` percentage scale to the capped device
/// scale used for rasterization.
pub(crate) fn effective_scale(scale: [f32; 2]) -> f32 {
    let raw = scale[0].abs().max(scale[1].abs()) / 100.0;
    raw.clamp(0.01, MAX_RENDER_SCALE)
}

impl Skin for TextCostumeSkin {
    fn size(&self) -> Size2D<f32, StageSpace> {
        self.logical_size
    }

    /// Always the geometric center of the fixed stage rectangle.
    fn rotation_center(&self) -> Point2D<f32, StageSpace> {
        Point2D::new(self.logical_size.width / 2.0, self.logical_size.height / 2.0)
    }

    fn get_texture(&mut self, scale: [f32; 2]) -> &Texture {
        if self.disposed {
            log::warn!("get_texture called on a disposed text skin");
            return &self.texture;
        }
        self.query_texture(effective_scale(scale));
        &self.texture
    }

    fn update_silhouette(&mut self) {
        if self.disposed {
            return;
        }
        // Self-heals from any state: an un-rendered skin renders here first.
        let scale = if self.rendered_scale > 0.0 {
            self.rendered_scale
        } else {
            1.0
        };
        self.query_texture(scale);
        self.silhouette.rebuild_from(self.texture.surface());
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel_animation();
        self.texture.release();
        self.silhouette = Silhouette::new();
        self.disposed = true;
        log::debug!("disposed text skin {:?}", self.id);
    }
}
