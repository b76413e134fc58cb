use std::rc::Rc;

use tracing::instrument;

use crate::actor;
use crate::common::config::Config;
use crate::common::geometry::Size;
use crate::controller::SwitcherController;
use crate::gesture::InputEvent;
use crate::model::{AppOrigin, ThumbnailRef};
use crate::sys::window_manager::WindowManager;

#[derive(Debug)]
pub enum Event {
    Show,
    Hide,
    SelectCard(AppOrigin),
    Input(InputEvent),
    /// A card's frame capture resolved (or failed, with `None`).
    ThumbnailReady {
        origin: AppOrigin,
        thumbnail: Option<ThumbnailRef>,
    },
    UpdateConfig(Config),
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

/// Event-loop wrapper around the controller. Owns the only asynchronous
/// boundary in the system: per-card frame captures, spawned fire-and-forget
/// on show and fed back through the actor's own channel.
///
/// Runs on a single thread; spawn inside a `tokio::task::LocalSet`.
pub struct SwitcherActor<W: WindowManager> {
    controller: SwitcherController<W>,
    wm: Rc<W>,
    rx: Receiver,
    tx: Sender,
}

impl<W: WindowManager + 'static> SwitcherActor<W> {
    pub fn new(config: Config, wm: Rc<W>, viewport: Size, rx: Receiver, tx: Sender) -> Self {
        Self {
            controller: SwitcherController::new(config, wm.clone(), viewport),
            wm,
            rx,
            tx,
        }
    }

    pub fn controller(&self) -> &SwitcherController<W> { &self.controller }

    pub async fn run(mut self) {
        while let Some((span, event)) = self.rx.recv().await {
            let _guard = span.enter();
            self.handle_event(event);
        }
    }

    #[instrument(skip(self))]
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Show => {
                if self.controller.show().is_ok() {
                    self.spawn_captures();
                }
            }
            Event::Hide => self.controller.hide(),
            Event::SelectCard(origin) => self.controller.select_card(&origin),
            Event::Input(input) => self.controller.handle_input(input),
            Event::ThumbnailReady { origin, thumbnail } => {
                self.controller.apply_thumbnail(&origin, thumbnail);
            }
            Event::UpdateConfig(config) => self.controller.update_config(config),
        }
    }

    /// Kick off one capture per card. Completions arrive in any order and
    /// never block card-list construction or gesture handling; a receiver
    /// dropped without a value counts as a failed capture.
    fn spawn_captures(&self) {
        for origin in self.controller.origins() {
            let capture = self.wm.capture_frame(&origin);
            let tx = self.tx.clone();
            tokio::task::spawn_local(async move {
                let thumbnail = capture.await.ok().flatten();
                tx.try_send(Event::ThumbnailReady { origin, thumbnail });
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::window_manager::testing::FakeWindowManager;
    use crate::ui::CardBackground;

    fn make_actor(
        names: &[&str],
    ) -> (SwitcherActor<FakeWindowManager>, Sender, Rc<FakeWindowManager>) {
        let wm = Rc::new(FakeWindowManager::with_apps(names));
        let (tx, rx) = actor::channel();
        let actor = SwitcherActor::new(
            Config::default(),
            wm.clone(),
            Size::new(320.0, 480.0),
            rx,
            tx.clone(),
        );
        (actor, tx, wm)
    }

    #[test_log::test(tokio::test)]
    async fn show_requests_a_capture_per_card() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (mut actor, _tx, wm) = make_actor(&["a", "b"]);
                actor.handle_event(Event::Show);
                assert!(actor.controller.is_shown());
                assert_eq!(wm.captures.borrow().len(), 2);
            })
            .await;
    }

    #[test_log::test(tokio::test)]
    async fn resolved_captures_flow_back_as_thumbnails() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (mut actor, _tx, wm) = make_actor(&["a", "b"]);
                actor.handle_event(Event::Show);

                wm.complete_capture(&AppOrigin::from("b"), Some(ThumbnailRef("shot-b".into())));
                // Let the spawned capture task run and post its event.
                tokio::task::yield_now().await;
                let (_, event) = actor.rx.recv().await.unwrap();
                actor.handle_event(event);

                let strip = actor.controller.strip();
                assert_eq!(strip.visual(0).unwrap().background, CardBackground::Placeholder);
                assert_eq!(
                    strip.visual(1).unwrap().background,
                    CardBackground::Thumbnail(ThumbnailRef("shot-b".into()))
                );
            })
            .await;
    }

    #[test_log::test(tokio::test)]
    async fn dropped_capture_counts_as_failure() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (mut actor, _tx, wm) = make_actor(&["a"]);
                actor.handle_event(Event::Show);

                // Drop the sender without resolving: the card keeps its
                // placeholder.
                wm.captures.borrow_mut().clear();
                tokio::task::yield_now().await;
                let (_, event) = actor.rx.recv().await.unwrap();
                actor.handle_event(event);
                assert_eq!(
                    actor.controller.strip().visual(0).unwrap().background,
                    CardBackground::Placeholder
                );
            })
            .await;
    }

    #[test_log::test(tokio::test)]
    async fn run_processes_queued_events_in_order() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (actor, tx, wm) = make_actor(&["a"]);
                let handle = tokio::task::spawn_local(actor.run());

                tx.try_send(Event::Show);
                tx.try_send(Event::SelectCard(AppOrigin::from("a")));
                tokio::task::yield_now().await;
                tokio::task::yield_now().await;

                assert_eq!(wm.launched.borrow().as_slice(), &[AppOrigin::from("a")]);
                handle.abort();
            })
            .await;
    }
}
