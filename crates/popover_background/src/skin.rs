//! Skins - per-kind style entry points
//!
//! Writing a style value goes through here so every live background is
//! refreshed straight after the registry changes. A skin is a type with its
//! own [`StyleKind`]; the typed accessors on [`PopoverSkin`] read and write
//! only that kind's values.
//!
//! ```ignore
//! struct DarkSkin;
//!
//! impl PopoverSkin for DarkSkin {
//!     const KIND: StyleKind = StyleKind::new("DarkSkin");
//! }
//!
//! TexturedBackground::set_border_width(11.0);
//! DarkSkin::set_border_width(12.0);
//! assert_eq!(TexturedBackground::border_width(), 11.0);
//! ```

use std::rc::Rc;

use popover_core::{Color, EdgeInsets, ImageBrush};

use crate::background::{broadcast_refresh, PanelBackground};
use crate::error::Result;
use crate::style::{
    with_styles, with_styles_mut, FillImageProvider, RefreshAspects, StyleKey, StyleKind,
    StyleValue,
};

/// Store a style value for `kind` and refresh every live background
///
/// Fails without touching the registry if the value's type does not match
/// the key.
pub fn set_style(kind: StyleKind, key: StyleKey, value: impl Into<StyleValue>) -> Result<()> {
    let aspects = with_styles_mut(|styles| styles.set(kind, key, value)).map_err(|err| {
        tracing::warn!(%kind, ?key, "rejected style value: {err}");
        err
    })?;
    apply(kind, key, aspects);
    Ok(())
}

/// Current value of `key` for `kind`, or the key's default
pub fn style(kind: StyleKind, key: StyleKey) -> StyleValue {
    with_styles(|styles| styles.get(kind, key))
}

fn set_typed(kind: StyleKind, key: StyleKey, value: StyleValue) {
    let aspects = with_styles_mut(|styles| styles.insert(kind, key, value));
    apply(kind, key, aspects);
}

// The registry borrow is released before any background refreshes
fn apply(kind: StyleKind, key: StyleKey, aspects: RefreshAspects) {
    let refreshed = broadcast_refresh(aspects);
    tracing::debug!(%kind, ?key, ?aspects, refreshed, "style updated");
}

/// A family of popover backgrounds with its own style values
///
/// Implementors only name their kind; every accessor is provided.
pub trait PopoverSkin {
    const KIND: StyleKind;

    /// Create a background of this skin's kind
    fn create_background() -> PanelBackground {
        PanelBackground::new(Self::KIND)
    }

    fn corner_radius() -> f32 {
        with_styles(|styles| styles.float(Self::KIND, StyleKey::CornerRadius))
    }

    fn set_corner_radius(radius: f32) {
        set_typed(Self::KIND, StyleKey::CornerRadius, radius.into());
    }

    fn border_width() -> f32 {
        with_styles(|styles| styles.float(Self::KIND, StyleKey::BorderWidth))
    }

    /// Zero removes the border
    fn set_border_width(width: f32) {
        set_typed(Self::KIND, StyleKey::BorderWidth, width.into());
    }

    fn border_color() -> Color {
        with_styles(|styles| styles.color(Self::KIND, StyleKey::BorderColor))
    }

    fn set_border_color(color: Color) {
        set_typed(Self::KIND, StyleKey::BorderColor, color.into());
    }

    fn fill_image_provider() -> Option<FillImageProvider> {
        with_styles(|styles| styles.image_provider(Self::KIND))
    }

    /// `None` restores the plain white fill
    fn set_fill_image_provider(provider: Option<FillImageProvider>) {
        set_typed(
            Self::KIND,
            StyleKey::FillImageProvider,
            StyleValue::ImageProvider(provider),
        );
    }

    /// Convenience for a provider that always hands out the same image
    fn set_fill_image(image: ImageBrush) {
        let provider: FillImageProvider = Rc::new(move || image.clone());
        Self::set_fill_image_provider(Some(provider));
    }

    fn content_insets() -> EdgeInsets {
        with_styles(|styles| styles.insets(Self::KIND, StyleKey::ContentInsets))
    }

    fn set_content_insets(insets: EdgeInsets) {
        set_typed(Self::KIND, StyleKey::ContentInsets, insets.into());
    }

    fn arrow_base() -> f32 {
        with_styles(|styles| styles.float(Self::KIND, StyleKey::ArrowBase))
    }

    fn set_arrow_base(base: f32) {
        set_typed(Self::KIND, StyleKey::ArrowBase, base.into());
    }

    fn arrow_height() -> f32 {
        with_styles(|styles| styles.float(Self::KIND, StyleKey::ArrowHeight))
    }

    fn set_arrow_height(height: f32) {
        set_typed(Self::KIND, StyleKey::ArrowHeight, height.into());
    }
}

/// The stock textured popover background
pub struct TexturedBackground;

impl PopoverSkin for TexturedBackground {
    const KIND: StyleKind = StyleKind::new("TexturedBackground");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StyleError;
    use crate::style::StyleValueType;
    use popover_core::{Brush, Size};
    use popover_paint::PopoverDirection;

    struct Skin1;

    impl PopoverSkin for Skin1 {
        const KIND: StyleKind = StyleKind::new("Skin1");
    }

    #[test]
    fn test_skin_values_are_isolated_from_base() {
        TexturedBackground::set_border_width(11.0);
        assert_eq!(TexturedBackground::border_width(), 11.0);
        assert_ne!(Skin1::border_width(), 11.0);

        Skin1::set_border_width(12.0);
        assert_eq!(TexturedBackground::border_width(), 11.0);
        assert_eq!(Skin1::border_width(), 12.0);
    }

    #[test]
    fn test_defaults_through_skin() {
        assert_eq!(Skin1::corner_radius(), 0.0);
        assert_eq!(Skin1::arrow_base(), 40.0);
        assert_eq!(Skin1::arrow_height(), 20.0);
        assert_eq!(Skin1::content_insets(), EdgeInsets::uniform(10.0));
        assert_eq!(Skin1::border_color(), Color::BLACK);
        assert!(Skin1::fill_image_provider().is_none());
    }

    #[test]
    fn test_untyped_setter_matches_typed_getter() {
        set_style(Skin1::KIND, StyleKey::ArrowBase, 32.0).unwrap();
        assert_eq!(Skin1::arrow_base(), 32.0);
        assert_eq!(style(Skin1::KIND, StyleKey::ArrowBase), StyleValue::Float(32.0));
        assert_eq!(TexturedBackground::arrow_base(), 40.0);
    }

    #[test]
    fn test_mismatched_value_is_rejected() {
        let err = set_style(Skin1::KIND, StyleKey::ArrowHeight, Color::RED).unwrap_err();
        assert_eq!(
            err,
            StyleError::TypeMismatch {
                key: StyleKey::ArrowHeight,
                expected: StyleValueType::Float,
                found: StyleValueType::Color,
            }
        );
        assert_eq!(Skin1::arrow_height(), 20.0);
    }

    #[test]
    fn test_skin_setter_refreshes_its_backgrounds() {
        let base = TexturedBackground::create_background();
        let skin = Skin1::create_background();
        for bg in [&base, &skin] {
            bg.set_arrow_direction(PopoverDirection::Down);
            bg.layout(Size::new(200.0, 120.0));
        }

        Skin1::set_fill_image(ImageBrush::new("canvas").opacity(0.5));
        Skin1::set_border_width(2.0);

        assert_eq!(base.fill(), Brush::default());
        assert!(base.render().unwrap().stroke.is_none());
        assert!(skin.fill().is_pattern());
        assert_eq!(skin.render().unwrap().stroke.unwrap().width(), 2.0);

        Skin1::set_fill_image_provider(None);
        assert_eq!(skin.fill(), Brush::default());
    }
}
