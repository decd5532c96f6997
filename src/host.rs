use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use euclid::Size2D;

use crate::error::HostError;
use crate::skin::TextCostumeSkin;

/// Logical stage coordinate space (the host VM's stage units).
pub enum StageSpace {}

/// Device pixel space after the render scale has been applied.
pub enum DeviceSpace {}

/// 3D world space on the scene-engine side of the bridge.
pub enum WorldSpace {}

/// Identifier assigned by the skin registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SkinId(pub u32);

/// The host's per-sprite render record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DrawableId(pub u32);

/// A sprite/target in the host VM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(pub u32);

/// Host surfaces probed at load time.
///
/// Every flag must be present; the plugin fails fast otherwise because
/// nothing in the core can function without them.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostCapabilities {
    pub drawable_registry: bool,
    pub skin_binding: bool,
    pub frame_hook: bool,
}

impl HostCapabilities {
    pub fn all() -> Self {
        Self {
            drawable_registry: true,
            skin_binding: true,
            frame_hook: true,
        }
    }

    /// First missing capability, if any.
    pub fn missing(&self) -> Option<&'static str> {
        if !self.drawable_registry {
            Some("drawable registry")
        } else if !self.skin_binding {
            Some("skin binding")
        } else if !self.frame_hook {
            Some("pre-execution frame hook")
        } else {
            None
        }
    }
}

/// Narrow view of the host VM consumed by the stage adapter.
///
/// Implemented by the embedding glue; tests use a hand-built fake.
pub trait HostRuntime: Send + Sync {
    fn capabilities(&self) -> HostCapabilities;

    /// Logical stage dimensions. Skins always occupy this footprint.
    fn stage_size(&self) -> Size2D<f32, StageSpace>;

    /// Asks the host to schedule a redraw of the current frame.
    fn request_redraw(&self);

    /// Rebinds a drawable to the given skin.
    fn bind_skin(&self, drawable: DrawableId, skin: SkinId);

    /// Current display scale of a drawable as `[x, y]` percentages
    /// (100 = natural size).
    fn drawable_scale(&self, drawable: DrawableId) -> Option<[f32; 2]>;
}

/// Verifies the host exposes everything the core needs.
pub fn probe_host(host: &dyn HostRuntime) -> Result<(), HostError> {
    match host.capabilities().missing() {
        Some(capability) => {
            log::error!("host runtime too old: missing {capability}");
            Err(HostError::MissingCapability(capability))
        }
        None => Ok(()),
    }
}

/// Storage for text costume skins, keyed by [`SkinId`].
///
/// The host keeps its own skin table; this trait is the injected stand-in so
/// the core never reaches into a process-wide array. [`InMemorySkinRegistry`]
/// is the provided implementation and doubles as the unit-test fake.
pub trait SkinRegistry: Send {
    fn insert(&mut self, skin: TextCostumeSkin) -> SkinId;
    fn get(&self, id: SkinId) -> Option<&TextCostumeSkin>;
    fn get_mut(&mut self, id: SkinId) -> Option<&mut TextCostumeSkin>;
    fn remove(&mut self, id: SkinId) -> Option<TextCostumeSkin>;
}

/// Map-backed registry with monotonically increasing ids.
#[derive(Default)]
pub struct InMemorySkinRegistry {
    skins: fxhash::FxHashMap<SkinId, TextCostumeSkin>,
    next_id: u32,
}

impl InMemorySkinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.skins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skins.is_empty()
    }
}

impl SkinRegistry for InMemorySkinRegistry {
    fn insert(&mut self, mut skin: TextCostumeSkin) -> SkinId {
        let id = SkinId(self.next_id);
        self.next_id += 1;
        skin.assign_id(id);
        self.skins.insert(id, skin);
        id
    }

    fn get(&self, id: SkinId) -> Option<&TextCostumeSkin> {
        self.skins.get(&id)
    }

    fn get_mut(&mut self, id: SkinId) -> Option<&mut TextCostumeSkin> {
        self.skins.get_mut(&id)
    }

    fn remove(&mut self, id: SkinId) -> Option<TextCostumeSkin> {
        self.skins.remove(&id)
    }
}

/// Process-shared frame timing updated once per frame by the host's
/// pre-execution hook.
///
/// Skins read the clock during demand-pull texture queries, so the counter
/// must be advanced before the host's draw pass touches any texture that
/// frame. Atomics are enough: all mutation happens on the single event-loop
/// thread between frames.
pub struct FrameClock {
    frame: AtomicU64,
    now_micros: AtomicU64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            frame: AtomicU64::new(0),
            now_micros: AtomicU64::new(0),
        }
    }

    /// Advances to the next frame at timestamp `now`.
    pub fn advance(&self, now: Duration) {
        self.frame.fetch_add(1, Ordering::Relaxed);
        self.now_micros
            .store(now.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn frame(&self) -> u64 {
        self.frame.load(Ordering::Relaxed)
    }

    pub fn now(&self) -> Duration {
        Duration::from_micros(self.now_micros.load(Ordering::Relaxed))
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_report_first_missing_surface() {
        assert_eq!(HostCapabilities::all().missing(), None);

        let caps = HostCapabilities {
            drawable_registry: true,
            skin_binding: false,
            frame_hook: false,
        };
        assert_eq!(caps.missing(), Some("skin binding"));
    }

    #[test]
    fn frame_clock_advances() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);

        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.frame(), 1);
        assert_eq!(clock.now(), Duration::from_millis(16));

        clock.advance(Duration::from_millis(33));
        assert_eq!(clock.frame(), 2);
    }
}
