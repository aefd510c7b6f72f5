//! In-memory API implementation.

use super::{ApiError, ApiResult, BoxFuture, SavePayload, WhiteboardApi};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

/// In-process stand-in for the server, for testing and offline use.
#[derive(Default)]
pub struct MemoryApi {
    boards: RwLock<HashMap<String, SavePayload>>,
    failing: AtomicBool,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following request fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of stored boards.
    pub fn len(&self) -> usize {
        self.boards.read().map(|b| b.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> ApiResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ApiError::Transport("Connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

impl WhiteboardApi for MemoryApi {
    fn save(&self, payload: &SavePayload) -> BoxFuture<'_, ApiResult<serde_json::Value>> {
        let payload = payload.clone();
        Box::pin(async move {
            self.check_available()?;
            let id = Uuid::new_v4().to_string();
            let mut boards = self
                .boards
                .write()
                .map_err(|e| ApiError::Transport(format!("Lock error: {}", e)))?;
            boards.insert(id.clone(), payload);
            Ok(serde_json::json!({ "id": id }))
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, ApiResult<SavePayload>> {
        let id = id.to_string();
        Box::pin(async move {
            self.check_available()?;
            let boards = self
                .boards
                .read()
                .map_err(|e| ApiError::Transport(format!("Lock error: {}", e)))?;
            boards.get(&id).cloned().ok_or(ApiError::Status(404))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Shape, ShapeStyle};
    use kurbo::Point;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        // Simple blocking executor for tests
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
                return result;
            }
        }
    }

    fn payload() -> SavePayload {
        SavePayload {
            shapes: vec![Shape::Circle(Circle::new(Point::ZERO, ShapeStyle::default()))],
            timestamp: 1,
        }
    }

    #[test]
    fn test_save_and_load() {
        let api = MemoryApi::new();
        let saved = payload();
        let response = block_on(api.save(&saved)).unwrap();
        let id = response["id"].as_str().unwrap().to_string();

        let loaded = block_on(api.load(&id)).unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(api.len(), 1);
    }

    #[test]
    fn test_not_found() {
        let api = MemoryApi::new();
        let result = block_on(api.load("missing"));
        assert!(matches!(result, Err(ApiError::Status(404))));
    }

    #[test]
    fn test_failing() {
        let api = MemoryApi::new();
        api.set_failing(true);
        assert!(matches!(block_on(api.save(&payload())), Err(ApiError::Transport(_))));
        assert!(api.is_empty());

        api.set_failing(false);
        assert!(block_on(api.save(&payload())).is_ok());
    }
}
