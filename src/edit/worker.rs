use std::sync::{mpsc, Arc};
use std::time::Duration;

use super::{EditRequest, EditResponse, EditService, EditServiceError};

pub const DEFAULT_EDIT_TIMEOUT: Duration = Duration::from_secs(240);

/// Runs one submission on a worker thread and waits at most `timeout` for it.
///
/// There is no cancellation: on timeout the worker is left to finish on its
/// own and its late result is dropped.
pub fn submit_with_timeout<S>(
    service: Arc<S>,
    request: EditRequest,
    timeout: Duration,
) -> Result<EditResponse, EditServiceError>
where
    S: EditService + Send + Sync + ?Sized + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("edit-service".to_string())
        .spawn(move || {
            let result = service.submit(&request);
            let _ = tx.send(result);
        })
        .map_err(|source| EditServiceError::WorkerSpawn { source })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            tracing::warn!(timeout_secs = timeout.as_secs(), "edit service timed out");
            Err(EditServiceError::Timeout {
                seconds: timeout.as_secs(),
            })
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(EditServiceError::WorkerDisconnected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;

    fn request() -> EditRequest {
        EditRequest {
            prompt: "add hat".to_string(),
            base_image: Vec::new(),
            mask: Vec::new(),
            color_hint: None,
            model: "test".to_string(),
            endpoint: String::new(),
            api_key: None,
            feather: 0,
            user_config: None,
            selection_bounds: Bounds::new(0, 0, 1, 1),
        }
    }

    struct Echo;
    impl EditService for Echo {
        fn submit(&self, request: &EditRequest) -> Result<EditResponse, EditServiceError> {
            Ok(EditResponse {
                image_data: request.prompt.as_bytes().to_vec(),
                mime_type: "text/plain".to_string(),
            })
        }
    }

    struct Slow;
    impl EditService for Slow {
        fn submit(&self, _request: &EditRequest) -> Result<EditResponse, EditServiceError> {
            std::thread::sleep(Duration::from_millis(500));
            Err(EditServiceError::failed("too late"))
        }
    }

    struct Panics;
    impl EditService for Panics {
        fn submit(&self, _request: &EditRequest) -> Result<EditResponse, EditServiceError> {
            panic!("service crashed");
        }
    }

    #[test]
    fn worker_returns_service_result() {
        let response = submit_with_timeout(Arc::new(Echo), request(), Duration::from_secs(5))
            .expect("echo should answer");
        assert_eq!(response.image_data, b"add hat".to_vec());
    }

    #[test]
    fn worker_times_out_on_slow_service() {
        let err = submit_with_timeout(Arc::new(Slow), request(), Duration::from_millis(20))
            .expect_err("slow service should time out");
        assert!(matches!(err, EditServiceError::Timeout { seconds: 0 }));
    }

    #[test]
    fn worker_reports_disconnect_when_service_panics() {
        let err = submit_with_timeout(Arc::new(Panics), request(), Duration::from_secs(5))
            .expect_err("panicking service should not hang");
        assert!(matches!(err, EditServiceError::WorkerDisconnected));
    }
}
