use crate::gesture::PointerSample;
use crate::sys::timer::Cooldown;

/// The disambiguated gesture category a session resolves to. Starts
/// `Undetermined`; revisable until an intent crosses its own commit
/// threshold, after which it locks for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Intent {
    Undetermined,
    Scroll,
    Dismiss,
    Reorder,
}

/// Direction of the most recent committed slot advance during a reorder.
/// Decides whether the dragged card lands before or after the target slot
/// on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SlideDirection {
    Left,
    Right,
}

/// State of one pointer-down-to-pointer-up interaction. Never persists
/// across sessions; dropping it cancels the slide cooldown with it.
#[derive(Debug)]
pub struct GestureSession {
    pub intent: Intent,
    pub origin: PointerSample,
    pub origin_scroll_offset: f64,
    /// Card under the pointer at down time, if any. The dismiss target.
    pub pressed_card: Option<usize>,
    /// Card grabbed by long-press. The reorder target.
    pub grabbed_card: Option<usize>,
    /// Aligned offset of the grabbed card at grab time.
    pub drag_margin: f64,
    /// The slot the viewport is snapped to, live-updated by slides.
    pub current_displayed: usize,
    pub slide_direction: SlideDirection,
    pub cooldown: Cooldown,
}

impl GestureSession {
    pub fn start(
        origin: PointerSample,
        origin_scroll_offset: f64,
        pressed_card: Option<usize>,
        current_displayed: usize,
    ) -> Self {
        Self {
            intent: Intent::Undetermined,
            origin,
            origin_scroll_offset,
            pressed_card,
            grabbed_card: None,
            drag_margin: 0.0,
            current_displayed,
            slide_direction: SlideDirection::Left,
            cooldown: Cooldown::new(),
        }
    }

    /// True if the session holds a reference to the card at `index`.
    pub fn references(&self, index: usize) -> bool {
        self.pressed_card == Some(index) || self.grabbed_card == Some(index)
    }
}
