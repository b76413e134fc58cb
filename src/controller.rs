use std::rc::Rc;

use tracing::{debug, info, instrument, warn};

use crate::common::config::Config;
use crate::common::geometry::Size;
use crate::error::SwitcherError;
use crate::gesture::session::{Intent, SlideDirection};
use crate::gesture::{GestureClassifier, GestureCommit, GestureEffect, InputEvent};
use crate::layout_engine::StripLayout;
use crate::model::{AppOrigin, CardRegistry, ThumbnailRef};
use crate::sys::window_manager::{Orientation, WindowManager};
use crate::ui::CardStrip;

/// Overlay lifecycle state. `Sorting` is a sub-mode of `Showing`, entered
/// only while a reorder gesture holds a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SwitcherState {
    Hidden,
    Showing,
    Sorting,
}

/// Owns the card registry and wires classifier output into registry,
/// layout, and visual mutations, talking to the window manager for
/// everything outside the overlay.
///
/// Single threaded by construction: every entry point runs to completion
/// within one event-handling turn, and invariants are restored before any
/// call that could re-dispatch events.
pub struct SwitcherController<W: WindowManager> {
    config: Config,
    wm: Rc<W>,
    viewport: Size,
    state: SwitcherState,
    registry: CardRegistry,
    layout: StripLayout,
    strip: CardStrip,
    classifier: GestureClassifier,
    current_displayed: usize,
    displayed_at_show: Option<AppOrigin>,
}

impl<W: WindowManager> SwitcherController<W> {
    pub fn new(config: Config, wm: Rc<W>, viewport: Size) -> Self {
        let layout = StripLayout::new(viewport, &config.switcher);
        let strip = CardStrip::new(&config.switcher, viewport.width);
        let classifier = GestureClassifier::new(&config.switcher);
        Self {
            config,
            wm,
            viewport,
            state: SwitcherState::Hidden,
            registry: CardRegistry::new(),
            layout,
            strip,
            classifier,
            current_displayed: 0,
            displayed_at_show: None,
        }
    }

    pub fn state(&self) -> SwitcherState { self.state }

    pub fn is_shown(&self) -> bool { self.state != SwitcherState::Hidden }

    pub fn registry(&self) -> &CardRegistry { &self.registry }

    pub fn strip(&self) -> &CardStrip { &self.strip }

    pub fn layout(&self) -> &StripLayout { &self.layout }

    pub fn classifier(&self) -> &GestureClassifier { &self.classifier }

    pub fn current_displayed(&self) -> usize { self.current_displayed }

    pub fn origins(&self) -> Vec<AppOrigin> { self.registry.origins() }

    /// Snapshot the running apps and build the strip. The switcher is
    /// rebuilt from scratch on every show rather than kept in sync with
    /// app launches.
    #[instrument(skip(self))]
    pub fn show(&mut self) -> Result<(), SwitcherError> {
        if self.state != SwitcherState::Hidden {
            return Err(SwitcherError::InvalidState(self.state));
        }
        let mut apps = self.wm.running_apps();
        if !self.config.switcher.user_defined_ordering {
            // Most recently active apps on the far left.
            apps.sort_by(|a, b| b.1.launch_time_ms.cmp(&a.1.launch_time_ms));
        }
        self.registry.reset(apps)?;
        self.layout.set_card_count(self.registry.count());
        self.strip.rebuild(&self.registry);
        self.current_displayed = self.layout.snap_to(0);
        self.state = SwitcherState::Showing;

        self.wm.lock_orientation(Orientation::Portrait);
        self.displayed_at_show = self.wm.displayed_app();
        if let Some(app) = &self.displayed_at_show {
            self.wm.take_focus(app);
        }
        info!(cards = self.registry.count(), "switcher shown");
        Ok(())
    }

    /// Tear the overlay down. Idempotent: hiding while hidden is a no-op.
    #[instrument(skip(self))]
    pub fn hide(&mut self) {
        if self.state == SwitcherState::Hidden {
            return;
        }
        self.classifier.abort();
        self.registry.end_sort();
        self.strip.clear();
        self.registry.clear();
        self.layout.set_card_count(0);
        self.state = SwitcherState::Hidden;

        if self.wm.displayed_app().is_some() {
            if let Some(prev) = self.displayed_at_show.take() {
                self.wm.restore_focus(&prev);
                self.wm.set_orientation_for_app(&prev);
            }
        }
        self.displayed_at_show = None;
        info!("switcher hidden");
    }

    /// A committed tap on a card: hide the overlay and activate the app.
    #[instrument(skip(self))]
    pub fn select_card(&mut self, origin: &AppOrigin) {
        if self.registry.position_of(origin).is_none() {
            warn!(%origin, "select for a card not in the registry");
            return;
        }
        let origin = origin.clone();
        self.hide();
        self.wm.launch(&origin);
    }

    /// Unified input entry point for the host shell.
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.state == SwitcherState::Hidden {
            return;
        }
        match event {
            InputEvent::Down { sample, .. } => {
                self.classifier.on_down(&self.layout, sample, self.current_displayed);
            }
            InputEvent::LongPress { sample, .. } => {
                let effects =
                    self.classifier.on_long_press(&self.layout, sample, self.current_displayed);
                if self.classifier.intent() == Some(Intent::Reorder) {
                    self.enter_sorting();
                }
                self.apply_effects(effects);
            }
            InputEvent::Move { sample, at } => {
                let effects = self.classifier.on_move(&self.layout, sample, at);
                self.apply_effects(effects);
            }
            InputEvent::Up { sample, .. } => {
                let commit = self.classifier.on_up(&self.layout, sample);
                self.apply_commit(commit);
            }
        }
    }

    /// Completion of an async frame capture. `None` (capture failed) keeps
    /// the placeholder; completions for departed cards are dropped.
    pub fn apply_thumbnail(&mut self, origin: &AppOrigin, thumbnail: Option<ThumbnailRef>) {
        if self.state == SwitcherState::Hidden {
            return;
        }
        let Some(thumbnail) = thumbnail else {
            debug!(%origin, "frame capture failed; keeping placeholder");
            return;
        };
        match self.registry.set_thumbnail(origin, thumbnail.clone()) {
            Ok(()) => {
                self.strip.set_thumbnail(origin, thumbnail);
            }
            Err(_) => debug!(%origin, "thumbnail for a departed card dropped"),
        }
    }

    /// Removal arriving from outside the gesture path (e.g. the app died).
    /// Must never leave a dangling session behind.
    #[instrument(skip(self))]
    pub fn remove_card(&mut self, origin: &AppOrigin) {
        if self.state == SwitcherState::Hidden {
            return;
        }
        let Some(index) = self.registry.position_of(origin) else {
            warn!(%origin, "remove for a card not in the registry");
            return;
        };
        if self.classifier.is_active() {
            // Indices held by the live session are invalidated; drop the
            // session and revert the visuals before mutating.
            self.classifier.abort();
            self.strip.clear_transforms();
            self.registry.end_sort();
            if self.state == SwitcherState::Sorting {
                self.state = SwitcherState::Showing;
            }
        }
        self.dismiss_at(index, false);
    }

    pub fn update_config(&mut self, config: Config) {
        self.config = config;
        self.classifier.update_settings(&self.config.switcher);
        let count = self.registry.count();
        self.layout = StripLayout::new(self.viewport, &self.config.switcher);
        self.layout.set_card_count(count);
        if self.state != SwitcherState::Hidden {
            self.strip = CardStrip::new(&self.config.switcher, self.viewport.width);
            self.strip.rebuild(&self.registry);
            self.current_displayed = self.layout.snap_to(self.current_displayed);
        }
    }

    fn enter_sorting(&mut self) {
        let Some(grabbed) = self.classifier.session().and_then(|s| s.grabbed_card) else {
            return;
        };
        let Some(origin) = self.registry.at(grabbed).map(|r| r.origin.clone()) else {
            return;
        };
        match self.registry.begin_sort(&origin) {
            Ok(()) => self.state = SwitcherState::Sorting,
            Err(err) => warn!(%err, %origin, "could not enter sort mode"),
        }
    }

    fn apply_effects(&mut self, effects: Vec<GestureEffect>) {
        for effect in effects {
            match effect {
                GestureEffect::ScrollTo(offset) => self.layout.set_scroll_offset(offset),
                GestureEffect::LiftCard { index, dy } => self.strip.lift(index, dy),
                GestureEffect::DragCard { index, x } => self.strip.drag(index, x),
                GestureEffect::SlideTo { index } => {
                    self.layout.snap_to(index);
                }
                GestureEffect::MarkEditing { index } => self.strip.set_editing(index, true),
            }
        }
    }

    fn apply_commit(&mut self, commit: GestureCommit) {
        match commit {
            GestureCommit::None => {}
            GestureCommit::SnapBack { index } | GestureCommit::Advance { index } => {
                self.current_displayed = self.layout.snap_to(index);
                self.strip.clear_transforms();
            }
            GestureCommit::CancelDismiss { index } => {
                self.strip.clear_transform(index);
                self.layout.snap_to(self.current_displayed);
            }
            GestureCommit::Dismiss { index } => self.dismiss_at(index, true),
            GestureCommit::Reorder { index, target, direction } => {
                self.finish_reorder(index, target, direction);
            }
        }
    }

    fn dismiss_at(&mut self, index: usize, kill: bool) {
        // Handlers come off before side effects run, so a synthesized
        // click re-entering during removal cannot land on the dying card.
        self.strip.detach(index);
        match self.registry.remove_at(index) {
            Ok(removed) => {
                self.strip.remove(index);
                self.layout.set_card_count(self.registry.count());
                if kill {
                    self.wm.kill(&removed.origin);
                }
                info!(origin = %removed.origin, "card dismissed");
                if self.registry.is_empty() {
                    self.hide();
                    return;
                }
                if index < self.current_displayed {
                    self.current_displayed -= 1;
                }
                self.current_displayed = self.layout.snap_to(self.current_displayed);
            }
            Err(err) => warn!(%err, index, "dismiss failed"),
        }
    }

    fn finish_reorder(&mut self, index: usize, target: usize, direction: SlideDirection) {
        self.registry.end_sort();
        self.state = SwitcherState::Showing;
        let Some(origin) = self.registry.at(index).map(|r| r.origin.clone()) else {
            warn!(index, "reorder commit for unknown card");
            self.strip.clear_transforms();
            return;
        };
        let slot = match direction {
            SlideDirection::Right => target + 1,
            SlideDirection::Left => target,
        };
        if let Err(err) = self.registry.move_before(&origin, slot) {
            warn!(%err, %origin, slot, "reorder failed");
        }
        self.strip.rebuild(&self.registry);
        self.current_displayed = self.layout.snap_to(target);
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gesture::PointerSample;
    use crate::sys::window_manager::testing::FakeWindowManager;
    use crate::ui::CardBackground;

    // Same geometry as the classifier tests: thresholds 80/80/120, card
    // pitch 208.
    fn controller(names: &[&str]) -> (SwitcherController<FakeWindowManager>, Rc<FakeWindowManager>) {
        let wm = Rc::new(FakeWindowManager::with_apps(names));
        let controller =
            SwitcherController::new(Config::default(), wm.clone(), Size::new(320.0, 480.0));
        (controller, wm)
    }

    fn shown(names: &[&str]) -> (SwitcherController<FakeWindowManager>, Rc<FakeWindowManager>) {
        let (mut c, wm) = controller(names);
        c.show().unwrap();
        (c, wm)
    }

    fn down(c: &mut SwitcherController<FakeWindowManager>, x: f64, y: f64) {
        c.handle_input(InputEvent::Down {
            sample: PointerSample::new(x, y),
            at: Instant::now(),
        });
    }

    fn move_to(c: &mut SwitcherController<FakeWindowManager>, x: f64, y: f64) {
        c.handle_input(InputEvent::Move {
            sample: PointerSample::new(x, y),
            at: Instant::now(),
        });
    }

    fn up(c: &mut SwitcherController<FakeWindowManager>, x: f64, y: f64) {
        c.handle_input(InputEvent::Up {
            sample: PointerSample::new(x, y),
            at: Instant::now(),
        });
    }

    fn long_press(c: &mut SwitcherController<FakeWindowManager>, x: f64, y: f64) {
        c.handle_input(InputEvent::LongPress {
            sample: PointerSample::new(x, y),
            at: Instant::now(),
        });
    }

    fn order(c: &SwitcherController<FakeWindowManager>) -> Vec<&str> {
        c.registry().iter().map(|r| r.origin.as_str()).collect()
    }

    #[test]
    fn show_builds_one_card_per_running_app() {
        let (c, wm) = shown(&["a", "b", "c"]);
        assert_eq!(c.state(), SwitcherState::Showing);
        assert_eq!(c.registry().count(), 3);
        let indices: Vec<usize> = c.registry().iter().map(|r| r.order_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(c.strip().len(), 3);
        assert_eq!(wm.orientation_locks.borrow().as_slice(), &[Orientation::Portrait]);
    }

    #[test]
    fn show_with_no_running_apps_yields_empty_strip() {
        let (c, _) = shown(&[]);
        assert_eq!(c.registry().count(), 0);
        assert!(c.is_shown());
    }

    #[test]
    fn double_show_is_invalid_state() {
        let (mut c, _) = shown(&["a"]);
        assert_eq!(c.show(), Err(SwitcherError::InvalidState(SwitcherState::Showing)));
    }

    #[test]
    fn hide_is_idempotent() {
        let (mut c, _) = shown(&["a"]);
        c.hide();
        assert_eq!(c.state(), SwitcherState::Hidden);
        c.hide();
        assert_eq!(c.state(), SwitcherState::Hidden);
    }

    #[test]
    fn show_takes_focus_and_hide_restores_it() {
        let wm = Rc::new(FakeWindowManager::with_apps(&["a", "b"]));
        *wm.displayed.borrow_mut() = Some(AppOrigin::from("b"));
        let mut c =
            SwitcherController::new(Config::default(), wm.clone(), Size::new(320.0, 480.0));
        c.show().unwrap();
        assert_eq!(wm.focus_taken.borrow().as_slice(), &[AppOrigin::from("b")]);
        c.hide();
        assert_eq!(wm.focus_restored.borrow().as_slice(), &[AppOrigin::from("b")]);
        assert_eq!(wm.orientation_restores.borrow().as_slice(), &[AppOrigin::from("b")]);
    }

    #[test]
    fn recency_ordering_when_user_ordering_disabled() {
        let wm = Rc::new(FakeWindowManager::with_apps(&["old", "newest", "mid"]));
        wm.apps.borrow_mut()[0].1.launch_time_ms = 10;
        wm.apps.borrow_mut()[1].1.launch_time_ms = 300;
        wm.apps.borrow_mut()[2].1.launch_time_ms = 200;
        let mut config = Config::default();
        config.switcher.user_defined_ordering = false;
        let mut c = SwitcherController::new(config, wm, Size::new(320.0, 480.0));
        c.show().unwrap();
        assert_eq!(order(&c), vec!["newest", "mid", "old"]);
    }

    #[test]
    fn select_card_hides_and_launches() {
        let (mut c, wm) = shown(&["a", "b"]);
        c.select_card(&AppOrigin::from("b"));
        assert_eq!(c.state(), SwitcherState::Hidden);
        assert_eq!(wm.launched.borrow().as_slice(), &[AppOrigin::from("b")]);
    }

    #[test]
    fn select_unknown_card_is_logged_noop() {
        let (mut c, wm) = shown(&["a"]);
        c.select_card(&AppOrigin::from("nope"));
        assert!(c.is_shown());
        assert!(wm.launched.borrow().is_empty());
    }

    #[test]
    fn scroll_gesture_advances_current_card() {
        let (mut c, _) = shown(&["a", "b", "c"]);
        down(&mut c, 100.0, 200.0);
        move_to(&mut c, 19.0, 200.0);
        up(&mut c, 19.0, 200.0);
        assert_eq!(c.current_displayed(), 1);
        assert_eq!(c.layout().scroll_offset(), c.layout().aligned_offset(1));
    }

    #[test]
    fn short_scroll_snaps_back() {
        let (mut c, _) = shown(&["a", "b", "c"]);
        down(&mut c, 100.0, 200.0);
        move_to(&mut c, 60.0, 200.0);
        assert_eq!(c.layout().scroll_offset(), 40.0);
        up(&mut c, 60.0, 200.0);
        assert_eq!(c.current_displayed(), 0);
        assert_eq!(c.layout().scroll_offset(), 0.0);
    }

    #[test]
    fn dismiss_gesture_removes_card_and_kills_app() {
        let (mut c, wm) = shown(&["a", "b", "c"]);
        down(&mut c, 100.0, 400.0); // over card "a"
        move_to(&mut c, 100.0, 319.0);
        up(&mut c, 100.0, 270.0); // dy = 130 > 120
        assert_eq!(order(&c), vec!["b", "c"]);
        let indices: Vec<usize> = c.registry().iter().map(|r| r.order_index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(wm.killed.borrow().as_slice(), &[AppOrigin::from("a")]);
        assert!(c.is_shown());
    }

    #[test]
    fn canceled_dismiss_leaves_registry_untouched() {
        let (mut c, wm) = shown(&["a", "b"]);
        down(&mut c, 100.0, 400.0);
        move_to(&mut c, 100.0, 319.0);
        assert!(c.strip().visual(0).unwrap().transform.is_some());
        up(&mut c, 100.0, 300.0); // dy = 100 < 120
        assert_eq!(order(&c), vec!["a", "b"]);
        assert!(c.strip().visual(0).unwrap().transform.is_none());
        assert!(wm.killed.borrow().is_empty());
    }

    #[test]
    fn dismissing_last_card_closes_the_overlay() {
        let (mut c, wm) = shown(&["only"]);
        down(&mut c, 100.0, 400.0);
        move_to(&mut c, 100.0, 319.0);
        up(&mut c, 100.0, 200.0);
        assert_eq!(c.state(), SwitcherState::Hidden);
        assert_eq!(wm.killed.borrow().as_slice(), &[AppOrigin::from("only")]);
    }

    #[test]
    fn dismiss_locks_out_horizontal_scroll() {
        let (mut c, _) = shown(&["a", "b", "c"]);
        down(&mut c, 100.0, 400.0);
        move_to(&mut c, 100.0, 319.0); // Dismiss locked
        move_to(&mut c, 300.0, 319.0); // horizontal-only from here on
        assert_eq!(c.layout().scroll_offset(), 0.0);
        up(&mut c, 300.0, 390.0);
        assert_eq!(c.current_displayed(), 0);
        assert_eq!(order(&c), vec!["a", "b", "c"]);
    }

    #[test]
    fn long_press_enters_sorting_and_release_restores_showing() {
        let (mut c, _) = shown(&["a", "b", "c"]);
        down(&mut c, 100.0, 200.0);
        long_press(&mut c, 100.0, 200.0);
        assert_eq!(c.state(), SwitcherState::Sorting);
        assert!(c.strip().visual(0).unwrap().editing);
        up(&mut c, 100.0, 200.0);
        assert_eq!(c.state(), SwitcherState::Showing);
        // Zero net delta: order is untouched.
        assert_eq!(order(&c), vec!["a", "b", "c"]);
        assert!(!c.strip().visual(0).unwrap().editing);
    }

    #[test]
    fn reorder_drag_right_moves_card_after_target() {
        let (mut c, _) = shown(&["a", "b", "c"]);
        down(&mut c, 100.0, 200.0);
        long_press(&mut c, 100.0, 200.0);
        move_to(&mut c, 181.0, 200.0); // one slide right
        up(&mut c, 181.0, 200.0);
        assert_eq!(order(&c), vec!["b", "a", "c"]);
        assert_eq!(c.current_displayed(), 1);
        assert_eq!(c.state(), SwitcherState::Showing);
    }

    #[test]
    fn concurrent_removal_mid_gesture_resets_classifier() {
        let (mut c, _) = shown(&["a", "b", "c"]);
        down(&mut c, 100.0, 200.0);
        long_press(&mut c, 100.0, 200.0);
        assert!(c.classifier().is_active());

        c.remove_card(&AppOrigin::from("a"));
        assert!(!c.classifier().is_active());
        assert_eq!(c.state(), SwitcherState::Showing);
        assert_eq!(order(&c), vec!["b", "c"]);

        // The interrupted gesture's release is inert.
        up(&mut c, 300.0, 200.0);
        assert_eq!(order(&c), vec!["b", "c"]);
    }

    #[test]
    fn external_removal_does_not_kill_again() {
        let (mut c, wm) = shown(&["a", "b"]);
        c.remove_card(&AppOrigin::from("b"));
        assert_eq!(order(&c), vec!["a"]);
        assert!(wm.killed.borrow().is_empty());
    }

    #[test]
    fn removal_before_current_shifts_displayed_index() {
        let (mut c, _) = shown(&["a", "b", "c"]);
        down(&mut c, 100.0, 200.0);
        move_to(&mut c, 19.0, 200.0);
        up(&mut c, 19.0, 200.0);
        assert_eq!(c.current_displayed(), 1);

        c.remove_card(&AppOrigin::from("a"));
        assert_eq!(c.current_displayed(), 0);
        assert_eq!(c.registry().at(0).unwrap().origin, AppOrigin::from("b"));
        assert_eq!(c.layout().scroll_offset(), 0.0);
    }

    #[test]
    fn thumbnail_completion_updates_one_card() {
        let (mut c, _) = shown(&["a", "b"]);
        c.apply_thumbnail(&AppOrigin::from("b"), Some(ThumbnailRef("shot".into())));
        assert_eq!(c.strip().visual(0).unwrap().background, CardBackground::Placeholder);
        assert_eq!(
            c.strip().visual(1).unwrap().background,
            CardBackground::Thumbnail(ThumbnailRef("shot".into()))
        );
    }

    #[test]
    fn failed_or_stale_thumbnails_are_tolerated() {
        let (mut c, _) = shown(&["a"]);
        c.apply_thumbnail(&AppOrigin::from("a"), None);
        assert_eq!(c.strip().visual(0).unwrap().background, CardBackground::Placeholder);
        c.apply_thumbnail(&AppOrigin::from("gone"), Some(ThumbnailRef("x".into())));
        assert_eq!(c.registry().count(), 1);
    }

    #[test]
    fn input_while_hidden_is_ignored() {
        let (mut c, _) = controller(&["a"]);
        down(&mut c, 100.0, 200.0);
        assert!(!c.classifier().is_active());
    }

    #[test]
    fn reorder_cooldown_gates_second_slide() {
        let (mut c, _) = shown(&["a", "b", "c", "d"]);
        let start = Instant::now();
        down(&mut c, 50.0, 200.0);
        long_press(&mut c, 50.0, 200.0);
        c.handle_input(InputEvent::Move {
            sample: PointerSample::new(131.0, 200.0),
            at: start,
        });
        assert_eq!(c.layout().scroll_offset(), c.layout().aligned_offset(1));

        // Still past threshold shortly after: suppressed.
        c.handle_input(InputEvent::Move {
            sample: PointerSample::new(131.0, 200.0),
            at: start + Duration::from_millis(50),
        });
        assert_eq!(c.layout().scroll_offset(), c.layout().aligned_offset(1));

        c.handle_input(InputEvent::Move {
            sample: PointerSample::new(131.0, 200.0),
            at: start + Duration::from_millis(600),
        });
        assert_eq!(c.layout().scroll_offset(), c.layout().aligned_offset(2));
    }
}
