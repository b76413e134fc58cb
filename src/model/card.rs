use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique key of a running application instance, as reported by the window
/// manager (e.g. `app://clock.gaiamobile.org`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppOrigin(pub String);

impl AppOrigin {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AppOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for AppOrigin {
    fn from(s: &str) -> Self { AppOrigin(s.to_string()) }
}

/// One entry of an app's icon manifest: nominal square size in pixels and
/// the icon path, either absolute (`data:` URI) or relative to the origin.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IconEntry {
    pub size: u32,
    pub path: String,
}

/// Snapshot of one running application, handed over by the window manager
/// when the switcher is shown.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppInfo {
    pub name: String,
    #[serde(default)]
    pub icons: Vec<IconEntry>,
    /// Milliseconds since epoch at which the app was last launched. Used
    /// for recency ordering when user-defined ordering is disabled.
    #[serde(default)]
    pub launch_time_ms: u64,
}

/// Opaque handle to a captured app frame (the original carries a data URL).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRef(pub String);

/// One card in the switcher strip. Owned exclusively by the
/// [`CardRegistry`](super::registry::CardRegistry); `order_index` always
/// matches the card's position in the visible strip.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRecord {
    pub origin: AppOrigin,
    pub display_name: String,
    pub icons: Vec<IconEntry>,
    pub launch_time_ms: u64,
    pub thumbnail: Option<ThumbnailRef>,
    pub order_index: usize,
}

impl CardRecord {
    pub fn new(origin: AppOrigin, info: AppInfo, order_index: usize) -> Self {
        Self {
            origin,
            display_name: info.name,
            icons: info.icons,
            launch_time_ms: info.launch_time_ms,
            thumbnail: None,
            order_index,
        }
    }
}
