//! Popover Background Demo
//!
//! Drives a few popover backgrounds the way a host toolkit would and prints
//! what each one would draw.
//!
//! Features demonstrated:
//! - Global style changes applied to every live background at once
//! - A skin with its own, isolated style values
//! - Toggling the border between 5 and 0
//! - Arrows on each of the four edges, with an offset tip
//! - Lazy cleanup of torn-down backgrounds on the next loop tick
//!
//! Run with: RUST_LOG=debug cargo run -p popover_background --example popover_demo

use std::rc::Rc;

use popover_background::{
    live_background_count, live_background_slots, set_style, FillImageProvider, MainLoop,
    PanelBackground, PopoverSkin, Result, StyleKey, StyleKind, TexturedBackground,
};
use popover_core::{Brush, Color, ImageBrush, Size};
use popover_paint::PopoverDirection;
use tracing_subscriber::EnvFilter;

/// A darker variant configured independently of the stock skin
struct NightSkin;

impl PopoverSkin for NightSkin {
    const KIND: StyleKind = StyleKind::new("NightSkin");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    TexturedBackground::set_border_color(Color::RED);
    let linen: FillImageProvider = Rc::new(|| ImageBrush::new("textures/linen.png"));
    TexturedBackground::set_fill_image_provider(Some(linen));
    TexturedBackground::set_corner_radius(8.0);

    NightSkin::set_border_color(Color::from_hex(0x3a3f58));
    NightSkin::set_border_width(1.0);
    // Untyped entry point, as a theme loader would use it
    set_style(NightSkin::KIND, StyleKey::ArrowHeight, 14.0)?;

    let size = Size::new(280.0, 180.0);
    let directions = [
        (PopoverDirection::Up, 0.0),
        (PopoverDirection::Down, 60.0),
        (PopoverDirection::Left, -30.0),
        (PopoverDirection::Right, 0.0),
    ];

    let backgrounds: Vec<PanelBackground> = directions
        .iter()
        .map(|&(direction, offset)| {
            let background = TexturedBackground::create_background();
            background.set_arrow_direction(direction);
            background.set_arrow_offset(offset);
            background.layout(size);
            background
        })
        .collect();

    let night = NightSkin::create_background();
    night.set_arrow_direction(PopoverDirection::Up);
    night.layout(size);

    for border in [5.0, 0.0] {
        TexturedBackground::set_border_width(border);
        println!("\n== border width {border} ==");
        for background in backgrounds.iter().chain(std::iter::once(&night)) {
            describe(background);
        }
    }

    drop(backgrounds);
    println!(
        "\nafter teardown: {} live, {} slots",
        live_background_count(),
        live_background_slots()
    );
    let ran = MainLoop::run_pending();
    println!(
        "after {ran} deferred task(s): {} live, {} slots",
        live_background_count(),
        live_background_slots()
    );

    Ok(())
}

fn describe(background: &PanelBackground) {
    let Some(shape) = background.render() else {
        println!("{:?}: not laid out", background.kind());
        return;
    };

    let fill = match &shape.fill {
        Brush::Solid(color) => format!("solid {:?}", color.to_array()),
        Brush::Pattern(image) => format!("pattern {}", image.source),
    };
    let border = match &shape.stroke {
        Some(stroke) => format!("{}px {:?}", stroke.width(), stroke.color.to_array()),
        None => "none".to_string(),
    };
    let content = background
        .content_rect()
        .map(|rect| {
            format!(
                "{:.0},{:.0} {:.0}x{:.0}",
                rect.x(),
                rect.y(),
                rect.width(),
                rect.height()
            )
        })
        .unwrap_or_default();

    println!(
        "{} {:?} offset {:>5.1}: {} segments, fill {fill}, border {border}, content {content}",
        background.kind(),
        background.arrow_direction(),
        background.arrow_offset(),
        shape.mask.segments().len(),
    );
}
