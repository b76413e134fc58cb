use std::time::{Duration, Instant};

/// Deadline handle for the reorder slide cooldown.
///
/// Owned by the active gesture session, so tearing the session down drops
/// the deadline with it; a stale re-enable can never fire into a later
/// session.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cooldown {
    until: Option<Instant>,
}

impl Cooldown {
    pub fn new() -> Self { Self::default() }

    pub fn is_ready(&self, now: Instant) -> bool { self.until.is_none_or(|t| now >= t) }

    pub fn arm(&mut self, now: Instant, period: Duration) { self.until = Some(now + period); }

    pub fn cancel(&mut self) { self.until = None; }
}
