pub mod classifier;
pub mod session;

pub use classifier::{GestureClassifier, GestureCommit, GestureEffect};
pub use session::{GestureSession, Intent, SlideDirection};

use std::time::Instant;

/// Normalized pointer coordinates. Mouse and touch fields are flattened at
/// the host boundary; nothing past this point branches on event origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
}

impl PointerSample {
    pub fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

/// The unified input surface exposed to the host shell: pointer
/// down/move/up plus a distinct long-press trigger (the host decides what
/// constitutes a long press).
#[derive(Debug, Clone, Copy)]
pub enum InputEvent {
    Down { sample: PointerSample, at: Instant },
    Move { sample: PointerSample, at: Instant },
    Up { sample: PointerSample, at: Instant },
    LongPress { sample: PointerSample, at: Instant },
}
