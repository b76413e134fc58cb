use thiserror::Error;

use crate::controller::SwitcherState;

/// Everything in this crate is recoverable: the controller logs and no-ops
/// rather than propagating, since a transient race (card removed mid-gesture)
/// must never take down an interactive surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SwitcherError {
    #[error("operation not valid while {0}")]
    InvalidState(SwitcherState),
    #[error("card not found in registry")]
    NotFound,
    #[error("index {index} out of bounds for {count} cards")]
    OutOfBounds { index: usize, count: usize },
}
