pub mod card;
pub mod registry;

pub use card::{AppInfo, AppOrigin, CardRecord, IconEntry, ThumbnailRef};
pub use registry::CardRegistry;
