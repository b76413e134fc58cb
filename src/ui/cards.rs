//! Side-effecting projection of card records onto their rendered
//! representation. No decisions are made here; authoritative state lives in
//! the registry and the gesture session, and the host's renderer reads
//! these visuals.

use tracing::debug;

use crate::common::config::SwitcherSettings;
use crate::gesture::classifier::CARD_DRAG_SCALE;
use crate::model::{AppOrigin, CardRegistry, IconEntry, ThumbnailRef};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

/// Cards start on a plain white fill and swap to the captured frame when
/// (and if) it arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardBackground {
    Placeholder,
    Thumbnail(ThumbnailRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardVisual {
    pub origin: AppOrigin,
    pub title: String,
    pub icon: Option<String>,
    pub background: CardBackground,
    pub transform: Option<CardTransform>,
    pub editing: bool,
    /// Interaction handlers are detached before removal side effects run,
    /// so a re-entrant synthesized click cannot land on a dying card.
    pub detached: bool,
}

/// The visible strip of card visuals, kept in lockstep with the registry.
#[derive(Debug, Default)]
pub struct CardStrip {
    visuals: Vec<CardVisual>,
    display_icons: bool,
    small_viewport: bool,
}

impl CardStrip {
    pub fn new(settings: &SwitcherSettings, viewport_width: f64) -> Self {
        Self {
            visuals: Vec::new(),
            display_icons: settings.display_app_icon,
            small_viewport: viewport_width < settings.small_viewport_width,
        }
    }

    /// Project the registry into visuals, in registry order. Thumbnails
    /// come from the records, so an already-swapped background survives a
    /// rebuild after reordering.
    pub fn rebuild(&mut self, registry: &CardRegistry) {
        self.visuals = registry
            .iter()
            .map(|record| CardVisual {
                origin: record.origin.clone(),
                title: record.display_name.clone(),
                icon: if self.display_icons {
                    icon_for(&record.origin, &record.icons, self.small_viewport)
                } else {
                    None
                },
                background: match &record.thumbnail {
                    Some(thumbnail) => CardBackground::Thumbnail(thumbnail.clone()),
                    None => CardBackground::Placeholder,
                },
                transform: None,
                editing: registry.sorting() == Some(&record.origin),
                detached: false,
            })
            .collect();
    }

    pub fn len(&self) -> usize { self.visuals.len() }

    pub fn is_empty(&self) -> bool { self.visuals.is_empty() }

    pub fn visuals(&self) -> &[CardVisual] { &self.visuals }

    pub fn visual(&self, index: usize) -> Option<&CardVisual> { self.visuals.get(index) }

    pub fn set_thumbnail(&mut self, origin: &AppOrigin, thumbnail: ThumbnailRef) -> bool {
        match self.visuals.iter_mut().find(|v| &v.origin == origin) {
            Some(visual) => {
                visual.background = CardBackground::Thumbnail(thumbnail);
                true
            }
            None => false,
        }
    }

    /// Dismiss feedback: scale the card down and raise it by `dy`.
    pub fn lift(&mut self, index: usize, dy: f64) {
        if let Some(visual) = self.visuals.get_mut(index) {
            visual.transform = Some(CardTransform {
                scale: CARD_DRAG_SCALE,
                translate_x: 0.0,
                translate_y: -dy,
            });
        }
    }

    /// Reorder feedback: the card follows the pointer horizontally.
    pub fn drag(&mut self, index: usize, x: f64) {
        if let Some(visual) = self.visuals.get_mut(index) {
            visual.transform = Some(CardTransform {
                scale: CARD_DRAG_SCALE,
                translate_x: x,
                translate_y: 0.0,
            });
        }
    }

    pub fn set_editing(&mut self, index: usize, editing: bool) {
        if let Some(visual) = self.visuals.get_mut(index) {
            visual.editing = editing;
        }
    }

    pub fn clear_transform(&mut self, index: usize) {
        if let Some(visual) = self.visuals.get_mut(index) {
            visual.transform = None;
        }
    }

    /// A canceled gesture always reverts to the pre-gesture layout.
    pub fn clear_transforms(&mut self) {
        for visual in &mut self.visuals {
            visual.transform = None;
            visual.editing = false;
        }
    }

    pub fn detach(&mut self, index: usize) {
        if let Some(visual) = self.visuals.get_mut(index) {
            visual.detached = true;
        }
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.visuals.len() {
            let visual = self.visuals.remove(index);
            debug!(origin = %visual.origin, "removed card visual");
        }
    }

    pub fn clear(&mut self) { self.visuals.clear(); }
}

/// Resolve an icon URI from the app's manifest: the largest icon wins,
/// except on narrow viewports where the smallest does. `data:` URIs pass
/// through untouched; other paths are joined onto the origin.
pub fn icon_for(origin: &AppOrigin, icons: &[IconEntry], small_viewport: bool) -> Option<String> {
    let entry = if small_viewport {
        icons.iter().min_by_key(|e| e.size)?
    } else {
        icons.iter().max_by_key(|e| e.size)?
    };
    if entry.path.starts_with("data:") {
        Some(entry.path.clone())
    } else {
        Some(format!("{}{}", origin, entry.path))
    }
}
