use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::model::{AppInfo, AppOrigin, ThumbnailRef};

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Narrow contract onto the window-management subsystem. Launching,
/// killing, screenshotting and orientation locking all live on the other
/// side of this trait; the switcher core only issues commands and consumes
/// snapshots.
pub trait WindowManager {
    /// Running apps in display order. An explicit ordered sequence: the
    /// switcher never relies on associative-container iteration order.
    fn running_apps(&self) -> Vec<(AppOrigin, AppInfo)>;

    fn displayed_app(&self) -> Option<AppOrigin>;

    fn running_app_count(&self) -> usize;

    /// Fire and forget; completion is observed through later snapshots.
    fn launch(&self, origin: &AppOrigin);

    /// Fire and forget.
    fn kill(&self, origin: &AppOrigin);

    fn set_orientation_for_app(&self, origin: &AppOrigin);

    fn lock_orientation(&self, orientation: Orientation);

    /// Take keyboard focus away from `origin` while the overlay is up.
    fn take_focus(&self, origin: &AppOrigin);

    fn restore_focus(&self, origin: &AppOrigin);

    /// Request a frame capture for one card. Resolves with `None` on
    /// failure; the card then keeps its placeholder background. Completion
    /// order across cards is unconstrained.
    fn capture_frame(&self, origin: &AppOrigin) -> oneshot::Receiver<Option<ThumbnailRef>>;
}
