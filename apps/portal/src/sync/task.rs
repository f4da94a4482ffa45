use std::future::Future;
use std::sync::Mutex;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A spawned background task tied to a cancellation token.
///
/// The task receives the token and must check it after every `.await` before
/// touching shared state. Dropping the handle stops the task.
pub struct TaskHandle {
    token: CancellationToken,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl TaskHandle {
    /// Spawns `body`. With a `parent`, cancelling the parent stops this task too.
    pub fn spawn<F, Fut>(parent: Option<&CancellationToken>, body: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = match parent {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let join = tokio::spawn(body(token.clone()));
        Self {
            token,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    /// False once stopped or once the task body has returned.
    pub fn is_active(&self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        match self.join.lock() {
            Ok(guard) => guard.as_ref().is_some_and(|h| !h.is_finished()),
            Err(_) => false,
        }
    }

    /// Waits for the task body to return. Call after `stop()` for a clean teardown.
    pub async fn join(&self) {
        let handle = match self.join.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    tracing::error!(error = ?e, "Background task panicked");
                }
            }
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
