//! Style registry - one flat table of per-kind style values
//!
//! Every value is stored under a `(StyleKind, StyleKey)` pair. Kinds are
//! namespaces: a skin derived from another conceptually still has its own
//! kind, and a read never falls back to any other kind's value. Unset keys
//! resolve to the key's documented default.
//!
//! ```ignore
//! let mut styles = StyleRegistry::new();
//! styles.set(BASE, StyleKey::BorderWidth, 11.0)?;
//!
//! assert_eq!(styles.float(BASE, StyleKey::BorderWidth), 11.0);
//! assert_eq!(styles.float(SKIN, StyleKey::BorderWidth), 0.0); // default
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use popover_core::{Color, EdgeInsets, ImageBrush};
use popover_paint::ArrowGeometry;
use rustc_hash::FxHashMap;

use crate::error::{Result, StyleError};

// =============================================================================
// Kinds and keys
// =============================================================================

/// Identifier of a family of popover backgrounds sharing one set of style values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleKind(&'static str);

impl StyleKind {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A configurable style property
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleKey {
    CornerRadius,
    BorderWidth,
    BorderColor,
    FillImageProvider,
    ContentInsets,
    ArrowBase,
    ArrowHeight,
}

impl StyleKey {
    pub const ALL: [StyleKey; 7] = [
        StyleKey::CornerRadius,
        StyleKey::BorderWidth,
        StyleKey::BorderColor,
        StyleKey::FillImageProvider,
        StyleKey::ContentInsets,
        StyleKey::ArrowBase,
        StyleKey::ArrowHeight,
    ];

    /// Value used when nothing has been stored for a kind
    pub fn default_value(self) -> StyleValue {
        match self {
            StyleKey::CornerRadius => StyleValue::Float(0.0),
            StyleKey::BorderWidth => StyleValue::Float(0.0),
            StyleKey::BorderColor => StyleValue::Color(Color::BLACK),
            StyleKey::FillImageProvider => StyleValue::ImageProvider(None),
            StyleKey::ContentInsets => StyleValue::Insets(EdgeInsets::uniform(10.0)),
            StyleKey::ArrowBase => StyleValue::Float(40.0),
            StyleKey::ArrowHeight => StyleValue::Float(20.0),
        }
    }

    /// The type of value this key holds
    pub fn value_type(self) -> StyleValueType {
        match self {
            StyleKey::CornerRadius
            | StyleKey::BorderWidth
            | StyleKey::ArrowBase
            | StyleKey::ArrowHeight => StyleValueType::Float,
            StyleKey::BorderColor => StyleValueType::Color,
            StyleKey::FillImageProvider => StyleValueType::ImageProvider,
            StyleKey::ContentInsets => StyleValueType::Insets,
        }
    }

    /// Which part of a live background must be refreshed after this key changes
    pub fn aspect(self) -> RefreshAspects {
        match self {
            StyleKey::FillImageProvider => RefreshAspects::FILL,
            StyleKey::CornerRadius
            | StyleKey::BorderWidth
            | StyleKey::BorderColor
            | StyleKey::ArrowBase
            | StyleKey::ArrowHeight
            | StyleKey::ContentInsets => RefreshAspects::LAYOUT,
        }
    }
}

bitflags! {
    /// Parts of a background to recompute
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RefreshAspects: u8 {
        /// Re-derive the fill brush from the image provider
        const FILL = 1 << 0;
        /// Recompute contour, mask and border stroke
        const LAYOUT = 1 << 1;
    }
}

// =============================================================================
// Values
// =============================================================================

/// Produces the image tiled across a background's fill
///
/// Called on every fill refresh, so providers may hand out a different image
/// over time.
pub type FillImageProvider = Rc<dyn Fn() -> ImageBrush>;

/// Discriminant of [`StyleValue`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleValueType {
    Float,
    Color,
    Insets,
    ImageProvider,
}

/// A stored style value
#[derive(Clone)]
pub enum StyleValue {
    Float(f32),
    Color(Color),
    Insets(EdgeInsets),
    /// `None` means plain white fill
    ImageProvider(Option<FillImageProvider>),
}

impl StyleValue {
    pub fn value_type(&self) -> StyleValueType {
        match self {
            StyleValue::Float(_) => StyleValueType::Float,
            StyleValue::Color(_) => StyleValueType::Color,
            StyleValue::Insets(_) => StyleValueType::Insets,
            StyleValue::ImageProvider(_) => StyleValueType::ImageProvider,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            StyleValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            StyleValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_insets(&self) -> Option<EdgeInsets> {
        match self {
            StyleValue::Insets(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_image_provider(&self) -> Option<FillImageProvider> {
        match self {
            StyleValue::ImageProvider(p) => p.clone(),
            _ => None,
        }
    }
}

impl fmt::Debug for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            StyleValue::Color(c) => f.debug_tuple("Color").field(c).finish(),
            StyleValue::Insets(i) => f.debug_tuple("Insets").field(i).finish(),
            StyleValue::ImageProvider(p) => f
                .debug_tuple("ImageProvider")
                .field(&p.as_ref().map(|_| "<fn>"))
                .finish(),
        }
    }
}

impl PartialEq for StyleValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StyleValue::Float(a), StyleValue::Float(b)) => a == b,
            (StyleValue::Color(a), StyleValue::Color(b)) => a == b,
            (StyleValue::Insets(a), StyleValue::Insets(b)) => a == b,
            (StyleValue::ImageProvider(a), StyleValue::ImageProvider(b)) => match (a, b) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            },
            _ => false,
        }
    }
}

impl From<f32> for StyleValue {
    fn from(value: f32) -> Self {
        StyleValue::Float(value)
    }
}

impl From<Color> for StyleValue {
    fn from(color: Color) -> Self {
        StyleValue::Color(color)
    }
}

impl From<EdgeInsets> for StyleValue {
    fn from(insets: EdgeInsets) -> Self {
        StyleValue::Insets(insets)
    }
}

impl From<FillImageProvider> for StyleValue {
    fn from(provider: FillImageProvider) -> Self {
        StyleValue::ImageProvider(Some(provider))
    }
}

/// All layout-relevant values of one kind, read in a single pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedStyle {
    pub corner_radius: f32,
    pub border_width: f32,
    pub border_color: Color,
    pub content_insets: EdgeInsets,
    pub arrow_base: f32,
    pub arrow_height: f32,
}

impl ResolvedStyle {
    /// Arrow geometry for a given tip offset
    pub fn arrow(&self, offset: f32) -> ArrowGeometry {
        ArrowGeometry::new(self.arrow_base, self.arrow_height, offset)
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Flat `(kind, key) -> value` table
#[derive(Default)]
pub struct StyleRegistry {
    values: FxHashMap<(StyleKind, StyleKey), StyleValue>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value for exactly `(kind, key)`
    ///
    /// Returns the aspects live backgrounds must refresh. Fails only if the
    /// value's type is not the key's declared type.
    pub fn set(
        &mut self,
        kind: StyleKind,
        key: StyleKey,
        value: impl Into<StyleValue>,
    ) -> Result<RefreshAspects> {
        let value = value.into();
        let expected = key.value_type();
        let found = value.value_type();
        if expected != found {
            return Err(StyleError::TypeMismatch {
                key,
                expected,
                found,
            });
        }
        Ok(self.insert(kind, key, value))
    }

    /// Store a value already known to match the key's type
    pub(crate) fn insert(
        &mut self,
        kind: StyleKind,
        key: StyleKey,
        value: StyleValue,
    ) -> RefreshAspects {
        debug_assert_eq!(key.value_type(), value.value_type());
        self.values.insert((kind, key), value);
        key.aspect()
    }

    /// Stored value for `(kind, key)`, or the key's default
    pub fn get(&self, kind: StyleKind, key: StyleKey) -> StyleValue {
        self.values
            .get(&(kind, key))
            .cloned()
            .unwrap_or_else(|| key.default_value())
    }

    /// Whether a value has been stored for exactly this kind
    pub fn is_set(&self, kind: StyleKind, key: StyleKey) -> bool {
        self.values.contains_key(&(kind, key))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn float(&self, kind: StyleKind, key: StyleKey) -> f32 {
        self.get(kind, key)
            .as_float()
            .or_else(|| key.default_value().as_float())
            .unwrap_or_default()
    }

    pub fn color(&self, kind: StyleKind, key: StyleKey) -> Color {
        self.get(kind, key)
            .as_color()
            .or_else(|| key.default_value().as_color())
            .unwrap_or_default()
    }

    pub fn insets(&self, kind: StyleKind, key: StyleKey) -> EdgeInsets {
        self.get(kind, key)
            .as_insets()
            .or_else(|| key.default_value().as_insets())
            .unwrap_or_default()
    }

    pub fn image_provider(&self, kind: StyleKind) -> Option<FillImageProvider> {
        self.get(kind, StyleKey::FillImageProvider).as_image_provider()
    }

    /// Every layout value of a kind
    pub fn resolve(&self, kind: StyleKind) -> ResolvedStyle {
        ResolvedStyle {
            corner_radius: self.float(kind, StyleKey::CornerRadius),
            border_width: self.float(kind, StyleKey::BorderWidth),
            border_color: self.color(kind, StyleKey::BorderColor),
            content_insets: self.insets(kind, StyleKey::ContentInsets),
            arrow_base: self.float(kind, StyleKey::ArrowBase),
            arrow_height: self.float(kind, StyleKey::ArrowHeight),
        }
    }
}

// =============================================================================
// Process-wide registry
// =============================================================================

thread_local! {
    static STYLES: RefCell<StyleRegistry> = RefCell::new(StyleRegistry::new());
}

/// Read the UI thread's style registry
pub(crate) fn with_styles<R>(f: impl FnOnce(&StyleRegistry) -> R) -> R {
    STYLES.with(|styles| f(&styles.borrow()))
}

/// Mutate the UI thread's style registry
pub(crate) fn with_styles_mut<R>(f: impl FnOnce(&mut StyleRegistry) -> R) -> R {
    STYLES.with(|styles| f(&mut styles.borrow_mut()))
}
