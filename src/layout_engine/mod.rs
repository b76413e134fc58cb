pub mod strip;

pub use strip::{StripLayout, Thresholds};
