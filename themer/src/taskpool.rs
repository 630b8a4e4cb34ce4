use std::sync::Arc;

use futures::Future;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Bounded pool of background deliveries.
///
/// At most `n_tasks` spawned futures run at once; the rest wait for a permit.
/// Dropping the pool cancels everything still pending.
pub struct TaskPool {
    semaphore: Arc<Semaphore>,
    cancel_token: CancellationToken,
    tracker: TaskTracker,
}

impl TaskPool {
    pub fn new(n_tasks: usize) -> TaskPool {
        let semaphore = Arc::new(Semaphore::new(n_tasks.max(1)));
        let cancel_token = CancellationToken::new();

        TaskPool {
            semaphore,
            cancel_token,
            tracker: TaskTracker::new(),
        }
    }

    pub fn execute<F, T>(&self, func: F)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send,
    {
        let semaphore = self.semaphore.clone();
        let token = self.cancel_token.clone();
        self.tracker.spawn(async move {
            let main = async {
                let Ok(_permit) = semaphore.acquire().await else {
                    return;
                };
                func.await;
            };

            tokio::select! {
                () = main => {},
                () = token.cancelled() => {}
            }
        });
    }

    /// Stop accepting work and wait for every spawned task to finish.
    pub async fn close_and_wait(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.semaphore.close();
        self.cancel_token.cancel();
    }
}
