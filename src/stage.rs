use std::sync::Arc;
use std::time::Duration;

use fxhash::FxHashMap;

use crate::animation::Completion;
use crate::color::Rgba;
use crate::engine::SharedTextEngine;
use crate::error::HostError;
use crate::host::{DrawableId, FrameClock, HostRuntime, SkinId, SkinRegistry, TargetId, probe_host};
use crate::skin::layout::HorizontalAlign;
use crate::skin::{Skin, TextCostumeSkin, TextSkinConfig};
use crate::texture::Texture;

/// Links a host target to its lazily created text skin.
#[derive(Clone, Copy, Debug)]
struct SkinBinding {
    skin: SkinId,
    drawable: DrawableId,
}

/// Per-stage adapter between host targets and their text costume skins.
///
/// Skins come into existence lazily on the first text operation against a
/// target; until then the target keeps its ordinary costume and this adapter
/// holds no state for it. All timing flows through [`begin_frame`], which the
/// embedding glue wires to the host's pre-execution frame hook.
///
/// [`begin_frame`]: TextStage::begin_frame
pub struct TextStage {
    host: Arc<dyn HostRuntime>,
    skins: Box<dyn SkinRegistry>,
    engine: SharedTextEngine,
    clock: Arc<FrameClock>,
    config: TextSkinConfig,
    bindings: FxHashMap<TargetId, SkinBinding>,
}

impl TextStage {
    /// Probes the host and builds the adapter. Fails fast when the host
    /// runtime is missing a required surface.
    pub fn new(
        host: Arc<dyn HostRuntime>,
        skins: Box<dyn SkinRegistry>,
        engine: SharedTextEngine,
        config: TextSkinConfig,
    ) -> Result<Self, HostError> {
        probe_host(host.as_ref())?;
        Ok(Self {
            host,
            skins,
            engine,
            clock: Arc::new(FrameClock::new()),
            config,
            bindings: FxHashMap::default(),
        })
    }

    pub fn clock(&self) -> Arc<FrameClock> {
        Arc::clone(&self.clock)
    }

    /// Whether `target` currently displays a text skin.
    pub fn is_bound(&self, target: TargetId) -> bool {
        self.bindings.contains_key(&target)
    }

    /// Advances the frame clock and ticks every bound skin.
    ///
    /// Must run before the host's draw pass each frame so continuous
    /// animations re-render against the new frame stamp. Requests a host
    /// redraw when any skin changed.
    pub fn begin_frame(&mut self, now: Duration) {
        self.clock.advance(now);
        let tick_now = self.clock.now();

        let mut needs_redraw = false;
        for binding in self.bindings.values() {
            if let Some(skin) = self.skins.get_mut(binding.skin)
                && skin.tick(tick_now)
            {
                needs_redraw = true;
            }
        }

        if needs_redraw {
            self.host.request_redraw();
        }
    }

    fn ensure_skin(&mut self, target: TargetId, drawable: DrawableId) -> SkinId {
        if let Some(binding) = self.bindings.get(&target) {
            return binding.skin;
        }

        let skin = TextCostumeSkin::new(
            drawable,
            Arc::clone(&self.engine),
            Arc::clone(&self.clock),
            self.host.stage_size(),
            &self.config,
        );
        let id = self.skins.insert(skin);
        self.host.bind_skin(drawable, id);
        self.bindings.insert(target, SkinBinding { skin: id, drawable });
        id
    }

    fn with_skin(&mut self, target: TargetId, f: impl FnOnce(&mut TextCostumeSkin)) {
        if let Some(binding) = self.bindings.get(&target)
            && let Some(skin) = self.skins.get_mut(binding.skin)
        {
            f(skin);
        }
        self.host.request_redraw();
    }

    /// Displays `text` on `target`, creating and binding a skin on first use.
    pub fn set_text(&mut self, target: TargetId, drawable: DrawableId, text: &str) {
        let id = self.ensure_skin(target, drawable);
        if let Some(skin) = self.skins.get_mut(id) {
            skin.set_text(text);
        }
        self.host.request_redraw();
    }

    pub fn set_color(&mut self, target: TargetId, color: Rgba) {
        self.with_skin(target, |skin| skin.set_color(color));
    }

    pub fn set_align(&mut self, target: TargetId, align: HorizontalAlign) {
        self.with_skin(target, |skin| skin.set_align(align));
    }

    pub fn set_font(&mut self, target: TargetId, family: &str) {
        self.with_skin(target, |skin| skin.set_font(family));
    }

    pub fn set_width(&mut self, target: TargetId, width: f32) {
        self.with_skin(target, |skin| skin.set_width(width));
    }

    pub fn set_height(&mut self, target: TargetId, height: f32) {
        self.with_skin(target, |skin| skin.set_height(height));
    }

    /// Starts the typewriter reveal of `text` on `target`.
    pub fn animate_type(
        &mut self,
        target: TargetId,
        drawable: DrawableId,
        text: &str,
    ) -> Completion {
        let id = self.ensure_skin(target, drawable);
        let completion = match self.skins.get_mut(id) {
            Some(skin) => {
                skin.set_text(text);
                skin.start_type_animation()
            }
            None => resolved_completion(),
        };
        self.host.request_redraw();
        completion
    }

    pub fn animate_rainbow(&mut self, target: TargetId, drawable: DrawableId) -> Completion {
        let id = self.ensure_skin(target, drawable);
        let completion = match self.skins.get_mut(id) {
            Some(skin) => skin.start_rainbow_animation(),
            None => resolved_completion(),
        };
        self.host.request_redraw();
        completion
    }

    pub fn animate_zoom(&mut self, target: TargetId, drawable: DrawableId) -> Completion {
        let id = self.ensure_skin(target, drawable);
        let completion = match self.skins.get_mut(id) {
            Some(skin) => skin.start_zoom_animation(),
            None => resolved_completion(),
        };
        self.host.request_redraw();
        completion
    }

    /// Cancels any running animation on `target`. Unbound targets are a no-op.
    pub fn cancel_animation(&mut self, target: TargetId) {
        self.with_skin(target, |skin| skin.cancel_animation());
    }

    /// Clone-lifecycle hook: when the host clones a bound target, the clone
    /// gets its own skin carrying a value copy of the original's style.
    ///
    /// Animation state deliberately does not carry over, and clones of
    /// unbound targets stay unbound.
    pub fn handle_target_cloned(
        &mut self,
        original: TargetId,
        clone: TargetId,
        clone_drawable: DrawableId,
    ) {
        let Some(style) = self
            .bindings
            .get(&original)
            .and_then(|binding| self.skins.get(binding.skin))
            .map(|skin| skin.style_snapshot())
        else {
            return;
        };

        let id = self.ensure_skin(clone, clone_drawable);
        if let Some(skin) = self.skins.get_mut(id) {
            skin.apply_style(&style);
        }
        self.host.request_redraw();
    }

    /// Removal-lifecycle hook: disposes and unbinds the target's skin.
    ///
    /// Runs unconditionally for every removed target so a stale binding can
    /// never outlive its sprite.
    pub fn handle_target_removed(&mut self, target: TargetId) {
        let Some(binding) = self.bindings.remove(&target) else {
            return;
        };
        if let Some(mut skin) = self.skins.remove(binding.skin) {
            skin.dispose();
        }
    }

    /// Read access for the host's draw pass and hit testing.
    pub fn skin(&self, target: TargetId) -> Option<&TextCostumeSkin> {
        self.bindings
            .get(&target)
            .and_then(|binding| self.skins.get(binding.skin))
    }

    pub fn skin_mut(&mut self, target: TargetId) -> Option<&mut TextCostumeSkin> {
        self.bindings
            .get(&target)
            .and_then(|binding| self.skins.get_mut(binding.skin))
    }

    /// Texture query for the host renderer, using the drawable's current
    /// display scale.
    pub fn texture_for(&mut self, target: TargetId) -> Option<&Texture> {
        let binding = *self.bindings.get(&target)?;
        let scale = self
            .host
            .drawable_scale(binding.drawable)
            .unwrap_or([100.0, 100.0]);
        let skin = self.skins.get_mut(binding.skin)?;
        Some(skin.get_texture(scale))
    }
}

// Registry lookups right after an insert cannot fail with the provided
// registry; a custom registry that drops skins still gets a terminated
// signal instead of one that never fires.
fn resolved_completion() -> Completion {
    Completion::resolved()
}
