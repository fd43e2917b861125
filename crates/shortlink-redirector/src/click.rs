use shortlink_core::{Repository, ShortCode};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Hands click increments to a background worker.
///
/// Recording never blocks and never fails: when the queue is full or the
/// worker has stopped, the click is dropped. The worker exits once every
/// recorder clone is dropped and the queue is drained.
#[derive(Debug, Clone)]
pub struct ClickRecorder {
    tx: mpsc::Sender<ShortCode>,
}

impl ClickRecorder {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// `capacity` bounds the number of queued clicks; zero is treated as one.
    pub fn spawn<R: Repository>(repository: Arc<R>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_worker(repository, rx));
        (Self { tx }, handle)
    }

    pub fn record(&self, code: &ShortCode) {
        match self.tx.try_send(code.clone()) {
            Ok(()) => trace!(code = %code, "click queued"),
            Err(TrySendError::Full(_)) => debug!(code = %code, "click queue full, dropping click"),
            Err(TrySendError::Closed(_)) => debug!(code = %code, "click worker stopped, dropping click"),
        }
    }
}

async fn run_worker<R: Repository>(repository: Arc<R>, mut rx: mpsc::Receiver<ShortCode>) {
    while let Some(code) = rx.recv().await {
        match repository.increment_clicks(&code).await {
            Ok(true) => trace!(code = %code, "click recorded"),
            Ok(false) => debug!(code = %code, "click for unknown code ignored"),
            Err(e) => warn!(code = %code, error = %e, "failed to record click"),
        }
    }
    debug!("click worker drained");
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortlink_core::{NewUrl, ReadRepository};
    use shortlink_storage::InMemoryRepository;

    async fn repo_with(code: &str) -> Arc<InMemoryRepository> {
        let repo = Arc::new(InMemoryRepository::new());
        repo.insert(NewUrl {
            short_code: ShortCode::new_unchecked(code),
            original_url: "https://example.com".to_string(),
            expires_at: None,
        })
        .await
        .unwrap();
        repo
    }

    #[tokio::test]
    async fn queued_clicks_are_applied_before_worker_exits() {
        let repo = repo_with("abc").await;
        let (recorder, worker) = ClickRecorder::spawn(Arc::clone(&repo), 16);
        let code = ShortCode::new_unchecked("abc");

        for _ in 0..5 {
            recorder.record(&code);
        }
        drop(recorder);
        worker.await.unwrap();

        assert_eq!(repo.get_by_code(&code).await.unwrap().clicks, 5);
    }

    #[tokio::test]
    async fn unknown_codes_do_not_stop_the_worker() {
        let repo = repo_with("abc").await;
        let (recorder, worker) = ClickRecorder::spawn(Arc::clone(&repo), 16);

        recorder.record(&ShortCode::new_unchecked("missing"));
        recorder.record(&ShortCode::new_unchecked("abc"));
        drop(recorder);
        worker.await.unwrap();

        assert_eq!(repo.stats().await.unwrap().total_clicks, 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn full_queue_drops_clicks() {
        let repo = repo_with("abc").await;
        let (recorder, worker) = ClickRecorder::spawn(Arc::clone(&repo), 2);
        let code = ShortCode::new_unchecked("abc");

        // The worker cannot run until this task yields, so only two fit.
        for _ in 0..10 {
            recorder.record(&code);
        }
        drop(recorder);
        worker.await.unwrap();

        assert_eq!(repo.get_by_code(&code).await.unwrap().clicks, 2);
    }

    #[tokio::test]
    async fn recording_after_worker_stopped_is_silent() {
        let repo = repo_with("abc").await;
        let (recorder, worker) = ClickRecorder::spawn(Arc::clone(&repo), 4);
        worker.abort();
        let _ = worker.await;

        recorder.record(&ShortCode::new_unchecked("abc"));

        assert_eq!(repo.stats().await.unwrap().total_clicks, 0);
    }
}
