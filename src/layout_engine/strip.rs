use crate::common::config::SwitcherSettings;
use crate::common::geometry::Size;

/// Gesture commit thresholds, derived from the viewport so behavior is
/// resolution independent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum horizontal travel to advance/retreat one card on release.
    pub scroll: f64,
    /// Vertical travel before a drag starts lifting a card.
    pub move_card: f64,
    /// Vertical travel past which release commits a dismiss.
    pub dismiss: f64,
}

/// Horizontal strip geometry: card extents, the aligned offset per card
/// index, and the live viewport scroll offset.
///
/// Pure with respect to the registry; the controller pushes the card count
/// in after every registry mutation, since extents shift when a card goes
/// away.
#[derive(Debug, Clone)]
pub struct StripLayout {
    viewport: Size,
    card_width: f64,
    gap: f64,
    card_count: usize,
    scroll_offset: f64,
    thresholds: Thresholds,
}

impl StripLayout {
    pub fn new(viewport: Size, settings: &SwitcherSettings) -> Self {
        Self {
            viewport,
            card_width: viewport.width * settings.card_fraction,
            gap: settings.card_gap,
            card_count: 0,
            scroll_offset: 0.0,
            thresholds: Thresholds {
                scroll: viewport.width * settings.scroll_fraction,
                move_card: viewport.height * settings.lift_fraction,
                dismiss: viewport.height * settings.dismiss_fraction,
            },
        }
    }

    pub fn viewport(&self) -> Size { self.viewport }

    pub fn thresholds(&self) -> Thresholds { self.thresholds }

    pub fn card_count(&self) -> usize { self.card_count }

    pub fn card_width(&self) -> f64 { self.card_width }

    pub fn scroll_offset(&self) -> f64 { self.scroll_offset }

    pub fn set_card_count(&mut self, count: usize) {
        self.card_count = count;
        self.scroll_offset = self.clamp_offset(self.scroll_offset);
    }

    /// Scroll offset at which card `index`'s leading edge sits at the
    /// viewport origin.
    pub fn aligned_offset(&self, index: usize) -> f64 {
        index as f64 * (self.card_width + self.gap)
    }

    /// Snap the viewport to card `index` (clamped to the strip) and return
    /// the index actually snapped to.
    pub fn snap_to(&mut self, index: usize) -> usize {
        let index = if self.card_count == 0 { 0 } else { index.min(self.card_count - 1) };
        self.scroll_offset = self.aligned_offset(index);
        index
    }

    /// Live (unsnapped) scroll during a drag, clamped to the strip.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = self.clamp_offset(offset);
    }

    /// Card whose horizontal extent contains the content coordinate `x`
    /// (viewport x plus scroll offset). Gaps between cards hit nothing.
    pub fn card_at(&self, x: f64) -> Option<usize> {
        if x < 0.0 || self.card_count == 0 {
            return None;
        }
        let pitch = self.card_width + self.gap;
        let index = (x / pitch) as usize;
        if index >= self.card_count {
            return None;
        }
        let within = x - index as f64 * pitch;
        (within <= self.card_width).then_some(index)
    }

    fn clamp_offset(&self, offset: f64) -> f64 {
        if self.card_count == 0 {
            return 0.0;
        }
        offset.clamp(0.0, self.aligned_offset(self.card_count - 1))
    }
}
