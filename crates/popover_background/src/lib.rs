//! Textured Popover Backgrounds
//!
//! Decorated backgrounds for anchored popovers whose style can be changed at
//! runtime and is applied to every displayed instance immediately.
//!
//! - [`StyleRegistry`]: one flat table of `(kind, key) -> value`, so each skin
//!   keeps its own values without separate storage
//! - [`LiveInstanceRegistry`]: weak handles to every constructed background,
//!   refreshed on each style write and compacted lazily
//! - [`PanelBackground`]: per-popover state that turns style, direction and
//!   bounds into a [`RenderedShape`]
//! - [`MainLoop`]: the deferred task queue the host ticks once per iteration
//!
//! All of this state is per thread; use it from the UI thread only.
//!
//! # Example
//!
//! ```rust
//! use popover_background::{PopoverSkin, TexturedBackground};
//! use popover_core::{Color, Size};
//! use popover_paint::PopoverDirection;
//!
//! let background = TexturedBackground::create_background();
//! background.set_arrow_direction(PopoverDirection::Up);
//! background.layout(Size::new(320.0, 200.0));
//!
//! TexturedBackground::set_border_color(Color::RED);
//! TexturedBackground::set_border_width(5.0);
//!
//! let shape = background.render().unwrap();
//! assert_eq!(shape.stroke.unwrap().width(), 5.0);
//! ```

pub mod background;
pub mod error;
pub mod live;
pub mod main_loop;
pub mod skin;
pub mod style;

pub use background::{
    compact_live_backgrounds, live_background_count, live_background_slots, Lifecycle,
    PanelBackground, RenderedShape,
};
pub use error::{Result, StyleError};
pub use live::{refresh_all, LiveHandle, LiveInstanceRegistry, Refresh};
pub use main_loop::MainLoop;
pub use skin::{set_style, style, PopoverSkin, TexturedBackground};
pub use style::{
    FillImageProvider, RefreshAspects, ResolvedStyle, StyleKey, StyleKind, StyleRegistry,
    StyleValue, StyleValueType,
};
