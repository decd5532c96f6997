//! # Maku
//!
//! A plugin core bridging a block-programming host VM's 2D sprite pipeline to
//! an external 3D scene engine.
//!
//! ## Overview
//!
//! The centerpiece is [`TextCostumeSkin`]: a dynamically rendered text
//! costume the host renderer consumes like any other sprite skin, with lazy
//! line re-breaking, scale-aware re-rasterization, and a cancellable
//! animation sequencer (typewriter, rainbow, zoom). [`TextStage`] adapts
//! skins to host targets and their lifecycle (cloning, removal, the per-frame
//! hook); [`SceneBlocks`] carries the 3D block vocabulary behind the
//! [`SceneEngine`] collaborator trait.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use maku::{FontEngine, InMemorySkinRegistry, TextSkinConfig, TextStage};
//! # use maku::{HostRuntime, HostCapabilities, DrawableId, SkinId, TargetId};
//! # use maku::euclid::Size2D;
//! # struct Glue;
//! # impl HostRuntime for Glue {
//! #     fn capabilities(&self) -> HostCapabilities { HostCapabilities::all() }
//! #     fn stage_size(&self) -> Size2D<f32, maku::StageSpace> { Size2D::new(480.0, 360.0) }
//! #     fn request_redraw(&self) {}
//! #     fn bind_skin(&self, _: DrawableId, _: SkinId) {}
//! #     fn drawable_scale(&self, _: DrawableId) -> Option<[f32; 2]> { None }
//! # }
//! # fn main() -> Result<(), maku::HostError> {
//! let engine = FontEngine::with_system_fonts().into_shared();
//! let mut stage = TextStage::new(
//!     Arc::new(Glue),
//!     Box::new(InMemorySkinRegistry::new()),
//!     engine,
//!     TextSkinConfig::default(),
//! )?;
//!
//! stage.set_text(TargetId(0), DrawableId(0), "hello");
//! let done = stage.animate_type(TargetId(0), DrawableId(0), "hello");
//! // Drive stage.begin_frame(now) from the host's per-frame hook until
//! // `done.is_done()`.
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! *   **Drop-in skin contract**: implements the host renderer's skin
//!     interface (size, rotation center, demand-pull texture, silhouette).
//! *   **Three-axis invalidation**: content, style, and per-frame continuous
//!     animation invalidation are tracked independently; cache hits are O(1).
//! *   **Injected host surfaces**: registry, runtime, and scene engine are
//!     traits, so the whole core unit-tests against fakes.
//! *   **Optional GPU upload** via the `wgpu` feature.

pub mod animation;
pub mod blocks;
pub mod color;
pub mod engine;
pub mod error;
pub mod font_store;
pub mod host;
pub mod scene;
pub mod skin;
pub mod stage;
pub mod texture;

#[cfg(feature = "wgpu")]
pub mod gpu;

// common re-exports
pub use animation::{AnimationKind, Completion};
pub use blocks::SceneBlocks;
pub use color::Rgba;
pub use engine::{FontEngine, SharedTextEngine, TextEngine};
pub use error::{BlockError, HostError};
pub use font_store::FontStore;
pub use host::{
    DeviceSpace, DrawableId, FrameClock, HostCapabilities, HostRuntime, InMemorySkinRegistry,
    SkinId, SkinRegistry, StageSpace, TargetId, WorldSpace,
};
pub use scene::{Axis, MeshFormat, ProjectionAxis, SceneEngine, Space};
pub use skin::layout::HorizontalAlign;
pub use skin::{Skin, TextCostumeSkin, TextSkinConfig};
pub use stage::TextStage;
pub use texture::{Silhouette, Surface, Texture};

// re-export dependencies
pub use euclid;
pub use fontdb;
pub use fontdue;
pub use parking_lot;

#[cfg(feature = "wgpu")]
pub use wgpu;
