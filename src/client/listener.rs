use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::api::ClientResult;
use super::store::ShiftListStore;
use crate::models::Shift;

/// Live subscription on a shift query.
///
/// Polls `query` every `interval` and pushes the full result set into the
/// store whenever it differs from the previous delivery. The store's content
/// is replaced wholesale, so any optimistic local change is overwritten by
/// the next push.
///
/// Dropping a `Listener` detaches it; polling stops only through
/// [`Listener::remove`] or when the store shuts down.
pub struct Listener {
    stop: Arc<Notify>,
    task: JoinHandle<()>,
}

impl Listener {
    pub fn spawn<F, Fut>(store: ShiftListStore, interval: Duration, query: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<Vec<Shift>>> + Send,
    {
        let stop = Arc::new(Notify::new());
        let signal = stop.clone();

        let task = tokio::spawn(async move {
            let mut last_delivered: Option<Vec<Shift>> = None;

            loop {
                match query().await {
                    Ok(shifts) if last_delivered.as_ref() != Some(&shifts) => {
                        if store.replace(shifts.clone()).await.is_err() {
                            tracing::debug!("Store gone, stopping listener");
                            break;
                        }
                        tracing::debug!(count = shifts.len(), "Listener delivered shifts");
                        last_delivered = Some(shifts);
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "Listener query failed"),
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = signal.notified() => break,
                }
            }
        });

        Self { stop, task }
    }

    /// Stops polling and waits for the task to finish. No delivery happens
    /// after this returns.
    pub async fn remove(self) {
        self.stop.notify_one();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Listener task ended abnormally");
        }
    }
}
