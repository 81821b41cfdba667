//! Panel backgrounds - one per displayed popover
//!
//! A [`PanelBackground`] owns the direction, offset and bounds of a single
//! popover and turns its kind's style values into a [`RenderedShape`]: the
//! fill brush, the contour that masks it, and an optional border stroke.
//!
//! # Lifecycle
//!
//! ```text
//! Constructing ──first layout()──▶ Live ──drop──▶ Destroying
//! ```
//!
//! Every background is registered with the thread's live registry when it is
//! constructed, so style changes reach it immediately. Dropping it marks its
//! slot inert and schedules a compaction on the [`MainLoop`]; the slot itself
//! is removed on the next tick.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use popover_core::{Brush, Color, Contour, Rect, Size};
use popover_paint::{
    compute_contour, compute_stroke, ArrowDirection, PopoverDirection, StrokeDescription,
};

use crate::live::{refresh_all, LiveInstanceRegistry, Refresh};
use crate::main_loop::MainLoop;
use crate::style::{with_styles, RefreshAspects, ResolvedStyle, StyleKind};

/// Where a background is in its lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created but not laid out yet
    Constructing,
    /// Laid out at least once; reacts to style and direction changes
    Live,
    /// Teardown has begun; ignores every further refresh
    Destroying,
}

/// Everything the host needs to composite a background
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedShape {
    /// Local frame the shape was laid out in
    pub frame: Rect,
    /// Fill painted inside the mask
    pub fill: Brush,
    /// Outline clipping the fill
    pub mask: Contour,
    /// Border drawn over the fill along the same outline
    pub stroke: Option<StrokeDescription>,
}

// =============================================================================
// Per-instance state
// =============================================================================

/// Mutable state of one background, shared with the live registry
pub struct BackgroundState {
    kind: StyleKind,
    lifecycle: Lifecycle,
    direction: PopoverDirection,
    offset: f32,
    bounds: Option<Size>,
    style: ResolvedStyle,
    fill: Brush,
    mask: Option<Contour>,
    stroke: Option<StrokeDescription>,
}

impl BackgroundState {
    fn new(kind: StyleKind) -> Self {
        Self {
            kind,
            lifecycle: Lifecycle::Constructing,
            direction: PopoverDirection::Any,
            offset: 0.0,
            bounds: None,
            style: with_styles(|styles| styles.resolve(kind)),
            fill: Brush::Solid(Color::WHITE),
            mask: None,
            stroke: None,
        }
    }

    fn refresh_fill(&mut self) {
        // Clone the provider out first; it may itself read styles
        let provider = with_styles(|styles| styles.image_provider(self.kind));
        self.fill = match provider {
            Some(provider) => Brush::Pattern(provider()),
            None => Brush::Solid(Color::WHITE),
        };
        tracing::trace!(kind = %self.kind, pattern = self.fill.is_pattern(), "refreshed fill");
    }

    /// Recompute mask and stroke from the current style, direction and bounds
    ///
    /// # Panics
    ///
    /// Panics if the direction is [`PopoverDirection::Any`]. The host must
    /// pick one of the four supported directions before laying out.
    fn relayout(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let direction = match ArrowDirection::try_from(self.direction) {
            Ok(direction) => direction,
            Err(err) => panic!("cannot lay out popover background `{}`: {err}", self.kind),
        };

        self.style = with_styles(|styles| styles.resolve(self.kind));
        let contour = compute_contour(
            bounds,
            direction,
            self.style.corner_radius,
            self.style.arrow(self.offset),
        );
        self.stroke = compute_stroke(&contour, self.style.border_width, self.style.border_color);
        self.mask = Some(contour);

        tracing::trace!(
            kind = %self.kind,
            ?direction,
            offset = self.offset,
            width = bounds.width,
            height = bounds.height,
            bordered = self.stroke.is_some(),
            "relaid out popover background"
        );
    }

    fn render(&self) -> Option<RenderedShape> {
        let bounds = self.bounds?;
        let mask = self.mask.clone()?;
        Some(RenderedShape {
            frame: bounds.to_rect(),
            fill: self.fill.clone(),
            mask,
            stroke: self.stroke.clone(),
        })
    }

    /// Bounds minus the arrow band, minus the kind's content insets
    fn content_rect(&self) -> Option<Rect> {
        let bounds = self.bounds?;
        let direction = ArrowDirection::try_from(self.direction).ok()?;
        let depth = if direction.is_vertical() {
            bounds.height
        } else {
            bounds.width
        };
        let band = self.style.arrow_height.max(0.0).min(depth);

        let mut body = bounds.to_rect();
        match direction {
            ArrowDirection::Up => {
                body.origin.y += band;
                body.size.height -= band;
            }
            ArrowDirection::Down => body.size.height -= band,
            ArrowDirection::Left => {
                body.origin.x += band;
                body.size.width -= band;
            }
            ArrowDirection::Right => body.size.width -= band,
        }
        Some(body.inset_by(self.style.content_insets))
    }
}

impl Refresh for BackgroundState {
    fn refresh(&mut self, aspects: RefreshAspects) {
        if self.lifecycle == Lifecycle::Destroying {
            return;
        }
        if aspects.contains(RefreshAspects::FILL) {
            self.refresh_fill();
        }
        if aspects.contains(RefreshAspects::LAYOUT) {
            if self.lifecycle == Lifecycle::Live {
                self.relayout();
            } else {
                // Picked up by the first layout pass
                self.style = with_styles(|styles| styles.resolve(self.kind));
            }
        }
    }

    fn is_alive(&self) -> bool {
        self.lifecycle != Lifecycle::Destroying
    }
}

// =============================================================================
// Live registry
// =============================================================================

thread_local! {
    static LIVE: RefCell<LiveInstanceRegistry<BackgroundState>> =
        RefCell::new(LiveInstanceRegistry::new());
    static COMPACTION_QUEUED: Cell<bool> = const { Cell::new(false) };
}

/// Refresh every live background on this thread
///
/// The registry is released before the first refresh, so fill providers may
/// construct or drop backgrounds.
pub(crate) fn broadcast_refresh(aspects: RefreshAspects) -> usize {
    let handles = LIVE.with(|live| live.borrow().snapshot());
    refresh_all(&handles, aspects)
}

/// Queue one compaction for the next tick, however many teardowns happen first
fn schedule_compaction() {
    let Ok(false) = COMPACTION_QUEUED.try_with(|queued| queued.replace(true)) else {
        return;
    };
    MainLoop::defer(|| {
        COMPACTION_QUEUED.with(|queued| queued.set(false));
        compact_live_backgrounds();
    });
}

/// Remove slots of destroyed backgrounds; returns how many were removed
///
/// Scheduled automatically on the [`MainLoop`] after every teardown.
pub fn compact_live_backgrounds() -> usize {
    LIVE.with(|live| live.borrow_mut().compact())
}

/// Size of the live registry's backing list, dead slots included
pub fn live_background_slots() -> usize {
    LIVE.with(|live| live.borrow().len())
}

/// Number of backgrounds currently alive on this thread
pub fn live_background_count() -> usize {
    LIVE.with(|live| live.borrow().live_count())
}

// =============================================================================
// PanelBackground
// =============================================================================

/// Decorated background of a single popover
///
/// Owned by the host's view hierarchy. Not `Clone`: dropping the one handle
/// is what tears the background down.
pub struct PanelBackground {
    state: Rc<RefCell<BackgroundState>>,
}

impl PanelBackground {
    /// Create a background of the given kind and register it as live
    pub fn new(kind: StyleKind) -> Self {
        let mut state = BackgroundState::new(kind);
        state.refresh_fill();
        let state = Rc::new(RefCell::new(state));
        LIVE.with(|live| live.borrow_mut().register(kind, &state));
        Self { state }
    }

    pub fn kind(&self) -> StyleKind {
        self.state.borrow().kind
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state.borrow().lifecycle
    }

    pub fn arrow_direction(&self) -> PopoverDirection {
        self.state.borrow().direction
    }

    /// Change the arrow direction, relaying out if it actually changed
    ///
    /// # Panics
    ///
    /// Panics if a live background is switched to [`PopoverDirection::Any`].
    pub fn set_arrow_direction(&self, direction: PopoverDirection) {
        let mut state = self.state.borrow_mut();
        if state.direction == direction {
            return;
        }
        state.direction = direction;
        state.refresh(RefreshAspects::LAYOUT);
    }

    pub fn arrow_offset(&self) -> f32 {
        self.state.borrow().offset
    }

    /// Move the arrow tip along its edge, relaying out if it actually changed
    pub fn set_arrow_offset(&self, offset: f32) {
        let mut state = self.state.borrow_mut();
        if state.offset == offset {
            return;
        }
        state.offset = offset;
        state.refresh(RefreshAspects::LAYOUT);
    }

    /// Layout pass with the size supplied by the host
    ///
    /// The first pass makes the background live and derives both fill and
    /// shape; later passes recompute the shape only.
    ///
    /// # Panics
    ///
    /// Panics if the arrow direction is still [`PopoverDirection::Any`].
    pub fn layout(&self, bounds: Size) {
        let mut state = self.state.borrow_mut();
        state.bounds = Some(bounds.non_negative());
        match state.lifecycle {
            Lifecycle::Constructing => {
                state.lifecycle = Lifecycle::Live;
                tracing::debug!(kind = %state.kind, "popover background is live");
                state.refresh(RefreshAspects::all());
            }
            Lifecycle::Live => state.relayout(),
            Lifecycle::Destroying => {}
        }
    }

    /// Re-derive the given aspects from the style registry
    pub fn refresh(&self, aspects: RefreshAspects) {
        self.state.borrow_mut().refresh(aspects);
    }

    /// Current render description, once the background has been laid out
    pub fn render(&self) -> Option<RenderedShape> {
        self.state.borrow().render()
    }

    /// Current fill brush
    pub fn fill(&self) -> Brush {
        self.state.borrow().fill.clone()
    }

    /// Area available to the popover's content
    pub fn content_rect(&self) -> Option<Rect> {
        self.state.borrow().content_rect()
    }
}

impl std::fmt::Debug for PanelBackground {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("PanelBackground")
            .field("kind", &state.kind)
            .field("lifecycle", &state.lifecycle)
            .field("direction", &state.direction)
            .field("offset", &state.offset)
            .field("bounds", &state.bounds)
            .finish()
    }
}

impl Drop for PanelBackground {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.lifecycle = Lifecycle::Destroying;
            tracing::debug!(kind = %state.kind, "popover background torn down");
        }
        schedule_compaction();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skin::set_style;
    use crate::style::{FillImageProvider, StyleKey};
    use popover_core::{EdgeInsets, ImageBrush};
    use popover_paint::ArrowGeometry;

    const A: StyleKind = StyleKind::new("A");
    const B: StyleKind = StyleKind::new("B");

    fn bounds() -> Size {
        Size::new(240.0, 160.0)
    }

    fn laid_out(kind: StyleKind, direction: PopoverDirection) -> PanelBackground {
        let bg = PanelBackground::new(kind);
        bg.set_arrow_direction(direction);
        bg.layout(bounds());
        bg
    }

    fn expected_mask(direction: ArrowDirection, radius: f32, offset: f32) -> Contour {
        compute_contour(
            bounds(),
            direction,
            radius,
            ArrowGeometry::new(40.0, 20.0, offset),
        )
    }

    #[test]
    fn test_lifecycle_transitions() {
        let bg = PanelBackground::new(A);
        assert_eq!(bg.lifecycle(), Lifecycle::Constructing);
        assert!(bg.render().is_none());

        bg.set_arrow_direction(PopoverDirection::Up);
        bg.layout(bounds());
        assert_eq!(bg.lifecycle(), Lifecycle::Live);

        let shape = bg.render().unwrap();
        assert_eq!(shape.frame, Rect::new(0.0, 0.0, 240.0, 160.0));
        assert_eq!(shape.mask, expected_mask(ArrowDirection::Up, 0.0, 0.0));
        assert!(shape.stroke.is_none());
        assert_eq!(shape.fill, Brush::Solid(Color::WHITE));
    }

    #[test]
    #[should_panic(expected = "unsupported arrow direction")]
    fn test_layout_without_direction_is_fatal() {
        let bg = PanelBackground::new(A);
        bg.layout(bounds());
    }

    #[test]
    fn test_style_change_relayouts_only_matching_values() {
        let a1 = laid_out(A, PopoverDirection::Up);
        let a2 = laid_out(A, PopoverDirection::Down);
        let b = laid_out(B, PopoverDirection::Up);

        set_style(A, StyleKey::CornerRadius, 5.0).unwrap();

        assert_eq!(
            a1.render().unwrap().mask,
            expected_mask(ArrowDirection::Up, 5.0, 0.0)
        );
        assert_eq!(
            a2.render().unwrap().mask,
            expected_mask(ArrowDirection::Down, 5.0, 0.0)
        );
        assert_eq!(
            b.render().unwrap().mask,
            expected_mask(ArrowDirection::Up, 0.0, 0.0)
        );
    }

    #[test]
    fn test_border_follows_style() {
        let bg = laid_out(A, PopoverDirection::Left);
        set_style(A, StyleKey::BorderColor, Color::RED).unwrap();
        assert!(bg.render().unwrap().stroke.is_none());

        set_style(A, StyleKey::BorderWidth, 5.0).unwrap();
        let shape = bg.render().unwrap();
        let stroke = shape.stroke.unwrap();
        assert_eq!(stroke.width(), 5.0);
        assert_eq!(stroke.color, Color::RED);
        assert_eq!(stroke.contour, shape.mask);

        set_style(A, StyleKey::BorderWidth, 0.0).unwrap();
        assert!(bg.render().unwrap().stroke.is_none());
    }

    #[test]
    fn test_fill_provider_broadcast() {
        let bg = PanelBackground::new(A);
        let other = PanelBackground::new(B);
        assert_eq!(bg.fill(), Brush::Solid(Color::WHITE));

        let provider: FillImageProvider = Rc::new(|| ImageBrush::new("popover-bg"));
        set_style(A, StyleKey::FillImageProvider, provider).unwrap();

        assert_eq!(bg.fill(), Brush::Pattern(ImageBrush::new("popover-bg")));
        assert_eq!(other.fill(), Brush::Solid(Color::WHITE));
    }

    #[test]
    fn test_new_background_picks_up_existing_fill() {
        let provider: FillImageProvider = Rc::new(|| ImageBrush::new("linen"));
        set_style(A, StyleKey::FillImageProvider, provider).unwrap();

        let bg = PanelBackground::new(A);
        assert!(bg.fill().is_pattern());
    }

    #[test]
    fn test_direction_and_offset_changes_relayout() {
        let bg = laid_out(A, PopoverDirection::Up);

        bg.set_arrow_offset(30.0);
        assert_eq!(
            bg.render().unwrap().mask,
            expected_mask(ArrowDirection::Up, 0.0, 30.0)
        );

        bg.set_arrow_direction(PopoverDirection::Right);
        assert_eq!(
            bg.render().unwrap().mask,
            expected_mask(ArrowDirection::Right, 0.0, 30.0)
        );
    }

    #[test]
    fn test_settings_before_first_layout_are_applied() {
        let bg = PanelBackground::new(A);
        bg.set_arrow_direction(PopoverDirection::Down);
        bg.set_arrow_offset(-12.0);
        set_style(A, StyleKey::CornerRadius, 7.0).unwrap();
        assert!(bg.render().is_none());

        bg.layout(bounds());
        assert_eq!(
            bg.render().unwrap().mask,
            expected_mask(ArrowDirection::Down, 7.0, -12.0)
        );
    }

    #[test]
    fn test_content_rect_excludes_band_and_insets() {
        let bg = laid_out(A, PopoverDirection::Up);
        assert_eq!(
            bg.content_rect(),
            Some(Rect::new(10.0, 30.0, 220.0, 120.0))
        );

        set_style(A, StyleKey::ContentInsets, EdgeInsets::new(4.0, 6.0, 8.0, 2.0)).unwrap();
        bg.set_arrow_direction(PopoverDirection::Right);
        assert_eq!(
            bg.content_rect(),
            Some(Rect::new(6.0, 4.0, 212.0, 148.0))
        );
    }

    #[test]
    fn test_drop_compacts_lazily() {
        let kept = laid_out(A, PopoverDirection::Up);
        let dropped = laid_out(B, PopoverDirection::Up);
        assert_eq!(live_background_slots(), 2);

        drop(dropped);
        assert_eq!(live_background_slots(), 2);
        assert_eq!(live_background_count(), 1);

        // Broadcast between teardown and compaction skips the dead slot
        set_style(B, StyleKey::CornerRadius, 3.0).unwrap();
        assert_eq!(broadcast_refresh(RefreshAspects::all()), 1);
        assert!(kept.render().is_some());

        assert!(MainLoop::run_pending() >= 1);
        assert_eq!(live_background_slots(), 1);
        assert_eq!(live_background_count(), 1);
    }

    #[test]
    fn test_teardowns_in_one_tick_share_one_compaction() {
        let backgrounds: Vec<_> = (0..3).map(|_| PanelBackground::new(A)).collect();
        drop(backgrounds);
        assert_eq!(MainLoop::pending_count(), 1);

        assert_eq!(MainLoop::run_pending(), 1);
        assert_eq!(live_background_slots(), 0);

        // The next teardown queues a fresh compaction
        drop(PanelBackground::new(B));
        assert_eq!(MainLoop::pending_count(), 1);
        assert_eq!(MainLoop::run_pending(), 1);
        assert_eq!(live_background_slots(), 0);
    }

    #[test]
    fn test_provider_may_construct_backgrounds() {
        const PREVIEW: StyleKind = StyleKind::new("Preview");

        let bg = laid_out(A, PopoverDirection::Up);
        let previews = Rc::new(RefCell::new(Vec::new()));
        let sink = previews.clone();
        let provider: FillImageProvider = Rc::new(move || {
            sink.borrow_mut().push(PanelBackground::new(PREVIEW));
            ImageBrush::new("preview")
        });

        set_style(A, StyleKey::FillImageProvider, provider).unwrap();

        assert_eq!(bg.fill(), Brush::Pattern(ImageBrush::new("preview")));
        assert_eq!(previews.borrow().len(), 1);
        assert_eq!(previews.borrow()[0].fill(), Brush::Solid(Color::WHITE));
        assert_eq!(live_background_count(), 2);
        previews.borrow_mut().clear();
    }

    #[test]
    fn test_provider_writing_styles_skips_its_own_background() {
        const RESTYLER: StyleKind = StyleKind::new("Restyler");

        let busy = laid_out(RESTYLER, PopoverDirection::Up);
        let other = laid_out(RESTYLER, PopoverDirection::Up);

        let wrote = Rc::new(Cell::new(false));
        let flag = wrote.clone();
        let provider: FillImageProvider = Rc::new(move || {
            if !flag.replace(true) {
                set_style(RESTYLER, StyleKey::CornerRadius, 9.0).unwrap();
            }
            ImageBrush::new("restyled")
        });

        // `busy` is refreshed first; its provider's write reaches every other
        // background while `busy` itself is still mid-refresh
        set_style(RESTYLER, StyleKey::FillImageProvider, provider).unwrap();
        assert!(wrote.get());
        assert!(busy.fill().is_pattern());
        assert!(other.fill().is_pattern());

        let expected = |radius| expected_mask(ArrowDirection::Up, radius, 0.0);
        assert_eq!(other.render().unwrap().mask, expected(9.0));
        assert_eq!(busy.render().unwrap().mask, expected(0.0));

        busy.refresh(RefreshAspects::LAYOUT);
        assert_eq!(busy.render().unwrap().mask, expected(9.0));
    }
}
