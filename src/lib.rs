//! cardstrip: the gesture-interpretation and card-layout core of a mobile
//! task switcher.
//!
//! Running apps appear as a horizontal strip of cards; a single continuous
//! touch stream is disambiguated in real time into snap-scrolling between
//! cards, drag-to-dismiss, or long-press drag-to-reorder. Application
//! lifecycle, screenshots, and orientation belong to the host window
//! manager and are reached through [`sys::window_manager::WindowManager`].

pub mod actor;
pub mod common;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod layout_engine;
pub mod model;
pub mod sys;
pub mod ui;

pub use common::config::Config;
pub use controller::{SwitcherController, SwitcherState};
pub use error::SwitcherError;
pub use gesture::{InputEvent, PointerSample};
pub use model::{AppInfo, AppOrigin, CardRegistry, ThumbnailRef};
pub use sys::window_manager::{Orientation, WindowManager};
