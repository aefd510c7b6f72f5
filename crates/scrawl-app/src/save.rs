//! Background submission of save requests.
//!
//! Saves never block the event loop: native builds run each request on a
//! worker thread, the browser build on the JS task queue. Outcomes come back
//! over a channel, and the optional notifier wakes the event loop so the app
//! polls it on the next frame.

use std::sync::mpsc::{self, Receiver, Sender};

use scrawl_core::api::{ApiResult, SavePayload, WhiteboardApi};

use crate::ui::Notification;

/// Banner shown after a successful save.
pub const SAVE_SUCCESS_MESSAGE: &str = "Whiteboard saved successfully!";
/// Banner shown for any save failure.
pub const SAVE_FAILURE_MESSAGE: &str = "Failed to save whiteboard";

#[cfg(not(target_arch = "wasm32"))]
pub type SharedApi = std::sync::Arc<dyn WhiteboardApi>;

#[cfg(target_arch = "wasm32")]
pub type SharedApi = std::rc::Rc<dyn WhiteboardApi>;

/// Called once per finished save, from wherever the save ran.
#[cfg(not(target_arch = "wasm32"))]
pub type SaveNotifier = std::sync::Arc<dyn Fn() + Send + Sync>;

/// Called once per finished save.
#[cfg(target_arch = "wasm32")]
pub type SaveNotifier = std::rc::Rc<dyn Fn()>;

type SaveResult = ApiResult<serde_json::Value>;

pub struct SaveQueue {
    api: SharedApi,
    tx: Sender<SaveResult>,
    rx: Receiver<SaveResult>,
    in_flight: usize,
    notifier: Option<SaveNotifier>,
}

impl SaveQueue {
    pub fn new(api: SharedApi) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            api,
            tx,
            rx,
            in_flight: 0,
            notifier: None,
        }
    }

    /// Wake the caller whenever a save finishes.
    pub fn with_notifier(mut self, notifier: SaveNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Number of saves submitted but not yet collected by [`SaveQueue::poll`].
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start saving `payload` in the background.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn submit(&mut self, payload: SavePayload) {
        log::info!("Saving whiteboard ({} shapes)", payload.shapes.len());
        let api = std::sync::Arc::clone(&self.api);
        let tx = self.tx.clone();
        let notifier = self.notifier.clone();
        self.in_flight += 1;

        let spawned = std::thread::Builder::new()
            .name("scrawl-save".to_string())
            .spawn(move || {
                let result = pollster::block_on(api.save(&payload));
                let _ = tx.send(result);
                if let Some(notify) = notifier {
                    notify();
                }
            });
        if let Err(e) = spawned {
            let _ = self
                .tx
                .send(Err(scrawl_core::ApiError::Transport(e.to_string())));
            if let Some(notify) = &self.notifier {
                notify();
            }
        }
    }

    /// Start saving `payload` in the background.
    #[cfg(target_arch = "wasm32")]
    pub fn submit(&mut self, payload: SavePayload) {
        log::info!("Saving whiteboard ({} shapes)", payload.shapes.len());
        let api = std::rc::Rc::clone(&self.api);
        let tx = self.tx.clone();
        let notifier = self.notifier.clone();
        self.in_flight += 1;

        wasm_bindgen_futures::spawn_local(async move {
            let result = api.save(&payload).await;
            let _ = tx.send(result);
            if let Some(notify) = notifier {
                notify();
            }
        });
    }

    /// Collect finished saves. Returns the banner for the most recent one.
    pub fn poll(&mut self) -> Option<Notification> {
        let mut latest = None;
        for result in self.rx.try_iter() {
            self.in_flight = self.in_flight.saturating_sub(1);
            latest = Some(outcome_notification(&result));
        }
        latest
    }
}

fn outcome_notification(result: &SaveResult) -> Notification {
    match result {
        Ok(response) => {
            log::info!("Whiteboard saved: {}", response);
            Notification::success(SAVE_SUCCESS_MESSAGE)
        }
        Err(e) => {
            log::error!("Failed to save whiteboard: {}", e);
            Notification::error(SAVE_FAILURE_MESSAGE)
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::ui::NotificationKind;
    use kurbo::Point;
    use scrawl_core::api::MemoryApi;
    use scrawl_core::canvas::Canvas;
    use scrawl_core::input::{PointerButton, PointerEvent};
    use scrawl_core::tools::ToolKind;
    use scrawl_core::ApiError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn wait_for_outcome(queue: &mut SaveQueue) -> Notification {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(notification) = queue.poll() {
                return notification;
            }
            assert!(Instant::now() < deadline, "save never completed");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn canvas_with_rectangle() -> Canvas {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Rectangle);
        let mut no_prompt = |_: &str, _: Point| -> Option<String> { None };
        canvas.handle_pointer_event(
            PointerEvent::Down {
                position: Point::new(10.0, 10.0),
                button: PointerButton::Primary,
            },
            &mut no_prompt,
        );
        canvas.handle_pointer_event(
            PointerEvent::Move {
                position: Point::new(110.0, 60.0),
            },
            &mut no_prompt,
        );
        canvas.handle_pointer_event(
            PointerEvent::Up {
                position: Point::new(110.0, 60.0),
            },
            &mut no_prompt,
        );
        canvas
    }

    #[test]
    fn test_successful_save() {
        let api = Arc::new(MemoryApi::new());
        let mut queue = SaveQueue::new(api.clone());
        let canvas = canvas_with_rectangle();

        queue.submit(canvas.save_payload(1));
        assert_eq!(queue.in_flight(), 1);

        let notification = wait_for_outcome(&mut queue);
        assert_eq!(notification.kind, NotificationKind::Success);
        assert_eq!(notification.message, SAVE_SUCCESS_MESSAGE);
        assert_eq!(queue.in_flight(), 0);
        assert_eq!(api.len(), 1);
    }

    #[test]
    fn test_failed_save_leaves_document_alone() {
        let api = Arc::new(MemoryApi::new());
        api.set_failing(true);
        let mut queue = SaveQueue::new(api.clone());
        let canvas = canvas_with_rectangle();
        let before = canvas.document.clone();

        queue.submit(canvas.save_payload(2));
        let notification = wait_for_outcome(&mut queue);

        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, SAVE_FAILURE_MESSAGE);
        assert_eq!(canvas.document, before);
        assert!(api.is_empty());
    }

    #[test]
    fn test_every_error_maps_to_same_banner() {
        for error in [
            ApiError::Transport("refused".into()),
            ApiError::Status(500),
            ApiError::Serialization("bad".into()),
            ApiError::InvalidUrl("nope".into()),
        ] {
            let notification = outcome_notification(&Err(error));
            assert_eq!(notification.message, SAVE_FAILURE_MESSAGE);
        }
    }

    #[test]
    fn test_finished_save_wakes_notifier() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        let mut queue = SaveQueue::new(Arc::new(MemoryApi::new()))
            .with_notifier(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));

        queue.submit(canvas_with_rectangle().save_payload(3));
        wait_for_outcome(&mut queue);

        let deadline = Instant::now() + Duration::from_secs(5);
        while wakes.load(Ordering::SeqCst) == 0 {
            assert!(Instant::now() < deadline, "notifier never called");
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(wakes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_poll_without_saves() {
        let mut queue = SaveQueue::new(Arc::new(MemoryApi::new()));
        assert!(queue.poll().is_none());
    }
}
