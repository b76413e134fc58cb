use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

fn yes() -> bool { true }

fn default_scroll_fraction() -> f64 { 0.25 }
fn default_lift_fraction() -> f64 { 1.0 / 6.0 }
fn default_dismiss_fraction() -> f64 { 0.25 }
fn default_card_fraction() -> f64 { 0.6 }
fn default_card_gap() -> f64 { 16.0 }
fn default_slide_cooldown_ms() -> u64 { 500 }
fn default_small_viewport_width() -> f64 { 480.0 }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct SwitcherSettings {
    /// Scrolling moves the strip one card at a time and snaps the current
    /// card into the viewport. When disabled the host provides free
    /// scrolling and release never commits a card change.
    #[serde(default = "yes")]
    pub snapping_scrolling: bool,
    /// Dragging a card upward past the dismiss threshold closes its app.
    #[serde(default = "yes")]
    pub manual_dismiss: bool,
    /// Cards keep the window manager's order and can be reordered by
    /// long-press drag. When disabled, cards are sorted most recently
    /// launched first and reordering is unavailable.
    #[serde(default = "yes")]
    pub user_defined_ordering: bool,
    #[serde(default = "yes")]
    pub display_app_icon: bool,

    /// Fraction of viewport width a horizontal release must travel to
    /// commit a card change.
    #[serde(default = "default_scroll_fraction")]
    pub scroll_fraction: f64,
    /// Fraction of viewport height after which a vertical drag starts
    /// lifting the card.
    #[serde(default = "default_lift_fraction")]
    pub lift_fraction: f64,
    /// Fraction of viewport height past which release commits a dismiss.
    #[serde(default = "default_dismiss_fraction")]
    pub dismiss_fraction: f64,

    /// Card width as a fraction of viewport width.
    #[serde(default = "default_card_fraction")]
    pub card_fraction: f64,
    /// Horizontal gap between adjacent cards, in pixels.
    #[serde(default = "default_card_gap")]
    pub card_gap: f64,

    /// Cooldown between slot advances while reordering.
    #[serde(default = "default_slide_cooldown_ms")]
    pub slide_cooldown_ms: u64,
    /// Viewports narrower than this pick the smallest manifest icon.
    #[serde(default = "default_small_viewport_width")]
    pub small_viewport_width: f64,
}

impl Default for SwitcherSettings {
    fn default() -> Self {
        Self {
            snapping_scrolling: true,
            manual_dismiss: true,
            user_defined_ordering: true,
            display_app_icon: true,
            scroll_fraction: default_scroll_fraction(),
            lift_fraction: default_lift_fraction(),
            dismiss_fraction: default_dismiss_fraction(),
            card_fraction: default_card_fraction(),
            card_gap: default_card_gap(),
            slide_cooldown_ms: default_slide_cooldown_ms(),
            small_viewport_width: default_small_viewport_width(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub switcher: SwitcherSettings,
}

pub fn config_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("cardstrip")
        .join("config.toml")
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Config::parse(&contents)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Config> {
        toml::from_str(contents).context("failed to parse config")
    }

    /// Load the default config file, falling back to defaults when absent.
    pub fn load_default() -> Config {
        let path = config_file();
        if !path.exists() {
            return Config::default();
        }
        match Config::load(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("ignoring invalid config: {err:#}");
                Config::default()
            }
        }
    }
}
