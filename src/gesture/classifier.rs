use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::common::config::SwitcherSettings;
use crate::gesture::PointerSample;
use crate::gesture::session::{GestureSession, Intent, SlideDirection};
use crate::layout_engine::StripLayout;

/// Scale applied to a card visual while it is lifted for dismissal or
/// dragged for reordering.
pub const CARD_DRAG_SCALE: f64 = 0.6;

/// Visual feedback the controller applies while a gesture is live. None of
/// these mutate the registry; they only move pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEffect {
    /// Live viewport offset during a plain drag.
    ScrollTo(f64),
    /// Dismiss feedback: card at `index` scales down and rises by `dy`.
    LiftCard { index: usize, dy: f64 },
    /// Reorder feedback: the grabbed card follows the pointer at `x`
    /// (pre-scale coordinates).
    DragCard { index: usize, x: f64 },
    /// A slot advance committed mid-reorder; viewport snaps to `index`.
    SlideTo { index: usize },
    /// The card entered edit mode at reorder start.
    MarkEditing { index: usize },
}

/// Terminal outcome of a session, applied by the controller on release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureCommit {
    /// No session was active.
    None,
    /// Below-threshold release; snap back to the pre-gesture card.
    SnapBack { index: usize },
    /// Scroll release crossed the threshold; `index` is the new displayed
    /// card.
    Advance { index: usize },
    /// Dismiss drag released short of the threshold; clear the card's
    /// transform and settle.
    CancelDismiss { index: usize },
    /// Remove the card at `index` and terminate its app.
    Dismiss { index: usize },
    /// Finalize a reorder: the card at `index` lands before or after the
    /// `target` slot depending on `direction`.
    Reorder {
        index: usize,
        target: usize,
        direction: SlideDirection,
    },
}

/// Disambiguates a raw pointer stream into Scroll, Dismiss, or Reorder.
///
/// `Idle -> Tracking(Undetermined) -> {Scroll, Dismiss, Reorder} -> Idle`.
/// Classification is lazy: nothing is decided at down time, and the intent
/// stays revisable frame to frame until one of them crosses its own commit
/// threshold. A long-press enters Reorder directly and locks the other two
/// out for the session.
///
/// The classifier reads layout geometry but never touches the registry; it
/// emits effects and a terminal commit for the controller to apply.
#[derive(Debug)]
pub struct GestureClassifier {
    session: Option<GestureSession>,
    snapping: bool,
    dismiss_enabled: bool,
    reorder_enabled: bool,
    slide_cooldown: Duration,
}

impl GestureClassifier {
    pub fn new(settings: &SwitcherSettings) -> Self {
        Self {
            session: None,
            snapping: settings.snapping_scrolling,
            dismiss_enabled: settings.manual_dismiss,
            reorder_enabled: settings.user_defined_ordering,
            slide_cooldown: Duration::from_millis(settings.slide_cooldown_ms),
        }
    }

    pub fn update_settings(&mut self, settings: &SwitcherSettings) {
        self.snapping = settings.snapping_scrolling;
        self.dismiss_enabled = settings.manual_dismiss;
        self.reorder_enabled = settings.user_defined_ordering;
        self.slide_cooldown = Duration::from_millis(settings.slide_cooldown_ms);
    }

    pub fn is_active(&self) -> bool { self.session.is_some() }

    pub fn intent(&self) -> Option<Intent> { self.session.as_ref().map(|s| s.intent) }

    pub fn session(&self) -> Option<&GestureSession> { self.session.as_ref() }

    /// Drop the live session without committing anything. Used when the
    /// gesture is interrupted externally (e.g. the dragged card was removed
    /// by another path); the cooldown dies with the session.
    pub fn abort(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(intent = %session.intent, "gesture aborted");
        }
    }

    pub fn on_down(
        &mut self,
        layout: &StripLayout,
        sample: PointerSample,
        current_displayed: usize,
    ) {
        if self.session.is_some() {
            warn!("pointer down with live session; discarding stale session");
        }
        let pressed = layout.card_at(layout.scroll_offset() + sample.x);
        self.session = Some(GestureSession::start(
            sample,
            layout.scroll_offset(),
            pressed,
            current_displayed,
        ));
    }

    /// The long-press trigger. Enters Reorder directly, independent of move
    /// deltas, unless the session already locked to Dismiss.
    pub fn on_long_press(
        &mut self,
        layout: &StripLayout,
        sample: PointerSample,
        current_displayed: usize,
    ) -> Vec<GestureEffect> {
        if !self.reorder_enabled {
            return Vec::new();
        }
        if self.session.as_ref().is_some_and(|s| s.intent == Intent::Dismiss) {
            return Vec::new();
        }
        if self.session.is_none() {
            self.on_down(layout, sample, current_displayed);
        }
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        let Some(grabbed) = layout.card_at(session.origin_scroll_offset + session.origin.x)
        else {
            return Vec::new();
        };
        session.intent = Intent::Reorder;
        session.grabbed_card = Some(grabbed);
        session.drag_margin = layout.aligned_offset(grabbed);
        session.slide_direction = SlideDirection::Left;
        session.cooldown.cancel();
        debug!(grabbed, "reorder gesture started");
        vec![GestureEffect::MarkEditing { index: grabbed }]
    }

    pub fn on_move(
        &mut self,
        layout: &StripLayout,
        sample: PointerSample,
        now: Instant,
    ) -> Vec<GestureEffect> {
        let slide_cooldown = self.slide_cooldown;
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        let thresholds = layout.thresholds();

        match session.intent {
            Intent::Reorder => {
                let Some(grabbed) = session.grabbed_card else {
                    return Vec::new();
                };
                // Vertical motion is ignored while reordering.
                let dx = sample.x - session.origin.x;
                let x = layout.aligned_offset(session.current_displayed) / CARD_DRAG_SCALE
                    + dx
                    - session.drag_margin / CARD_DRAG_SCALE;
                let mut effects = vec![GestureEffect::DragCard { index: grabbed, x }];

                if dx.abs() > thresholds.scroll && session.cooldown.is_ready(now) {
                    session.cooldown.arm(now, slide_cooldown);
                    if dx > 0.0 && session.current_displayed + 1 < layout.card_count() {
                        session.current_displayed += 1;
                        session.slide_direction = SlideDirection::Right;
                        effects.push(GestureEffect::SlideTo {
                            index: session.current_displayed,
                        });
                    } else if dx < 0.0 && session.current_displayed > 0 {
                        session.current_displayed -= 1;
                        session.slide_direction = SlideDirection::Left;
                        effects.push(GestureEffect::SlideTo {
                            index: session.current_displayed,
                        });
                    }
                }
                effects
            }
            Intent::Dismiss => {
                // Locked: horizontal travel no longer scrolls the strip.
                let Some(index) = session.pressed_card else {
                    return Vec::new();
                };
                let dy = session.origin.y - sample.y;
                vec![GestureEffect::LiftCard { index, dy: dy.max(0.0) }]
            }
            Intent::Undetermined | Intent::Scroll => {
                if self.dismiss_enabled {
                    if let Some(index) = session.pressed_card {
                        let dy = session.origin.y - sample.y;
                        if dy > thresholds.move_card {
                            session.intent = Intent::Dismiss;
                            debug!(index, "dismiss gesture started");
                            return vec![GestureEffect::LiftCard { index, dy }];
                        }
                    }
                }
                if self.snapping {
                    session.intent = Intent::Scroll;
                    let dx = session.origin.x - sample.x;
                    return vec![GestureEffect::ScrollTo(session.origin_scroll_offset + dx)];
                }
                Vec::new()
            }
        }
    }

    pub fn on_up(&mut self, layout: &StripLayout, sample: PointerSample) -> GestureCommit {
        let Some(session) = self.session.take() else {
            return GestureCommit::None;
        };
        let thresholds = layout.thresholds();

        match session.intent {
            Intent::Reorder => {
                let Some(grabbed) = session.grabbed_card else {
                    return GestureCommit::SnapBack { index: session.current_displayed };
                };
                GestureCommit::Reorder {
                    index: grabbed,
                    target: session.current_displayed,
                    direction: session.slide_direction,
                }
            }
            Intent::Dismiss => {
                let Some(index) = session.pressed_card else {
                    return GestureCommit::SnapBack { index: session.current_displayed };
                };
                let dy = session.origin.y - sample.y;
                if dy > thresholds.dismiss {
                    GestureCommit::Dismiss { index }
                } else {
                    GestureCommit::CancelDismiss { index }
                }
            }
            Intent::Undetermined | Intent::Scroll => {
                if !self.snapping {
                    return GestureCommit::None;
                }
                let dx = session.origin.x - sample.x;
                let current = session.current_displayed;
                if dx > thresholds.scroll && current + 1 < layout.card_count() {
                    GestureCommit::Advance { index: current + 1 }
                } else if dx < -thresholds.scroll && current > 0 {
                    GestureCommit::Advance { index: current - 1 }
                } else {
                    GestureCommit::SnapBack { index: current }
                }
            }
        }
    }
}
