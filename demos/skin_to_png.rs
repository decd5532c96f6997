//! Renders a text costume skin to `skin.png` using the system fonts.
//!
//! Run with: `cargo run --example skin_to_png`

use std::sync::Arc;

use image::{ImageBuffer, Rgba};
use maku::euclid::Size2D;
use maku::{
    DrawableId, FontEngine, FrameClock, HorizontalAlign, Skin, TextCostumeSkin, TextSkinConfig,
};

fn main() {
    let engine = FontEngine::with_system_fonts().into_shared();
    let clock = Arc::new(FrameClock::new());

    let config = TextSkinConfig {
        base_font_size: 32.0,
        line_height: 40.0,
        color: maku::Rgba::opaque(0x20, 0x20, 0x20),
        align: HorizontalAlign::Center,
        ..TextSkinConfig::default()
    };

    let mut skin = TextCostumeSkin::new(
        DrawableId(0),
        engine,
        clock,
        Size2D::new(480.0, 360.0),
        &config,
    );

    skin.set_text("Hello from a text costume skin!\nLines wrap to the stage width and align to the center.");

    // Render at 2x the natural scale for a crisper image.
    let texture = skin.get_texture([200.0, 200.0]);
    let surface = texture.surface();

    let image: ImageBuffer<Rgba<u8>, _> = ImageBuffer::from_raw(
        surface.width() as u32,
        surface.height() as u32,
        surface.pixels().to_vec(),
    )
    .expect("surface dimensions match the pixel buffer");

    image.save("skin.png").expect("write skin.png");
    println!(
        "wrote skin.png ({}x{}, generation {})",
        surface.width(),
        surface.height(),
        texture.generation()
    );
}
