pub mod cards;

pub use cards::{CardBackground, CardStrip, CardTransform, CardVisual};
