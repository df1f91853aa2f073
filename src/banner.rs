//! Auto-dismissing error display.

use crate::store::{ChatStore, StoreEvent, Subscription};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub const DEFAULT_DISPLAY_WINDOW: Duration = Duration::from_secs(5);

/// Shows the store's error through `render` and clears it once it has been
/// visible for the display window.
///
/// Each error change cancels the pending timer; a timer only clears the
/// error it was started for. Dropping the banner cancels the timer and
/// unsubscribes from the store.
pub struct ErrorBanner {
    timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    _subscription: Subscription,
}

impl ErrorBanner {
    /// Must be called from inside a tokio runtime; timers run on it.
    pub fn attach<R>(store: &Arc<ChatStore>, window: Duration, render: R) -> Self
    where
        R: Fn(Option<&str>) + Send + Sync + 'static,
    {
        let runtime = Handle::current();
        let timer: Arc<Mutex<Option<JoinHandle<()>>>> = Arc::default();
        let slot = timer.clone();
        let weak = Arc::downgrade(store);

        let subscription = store.subscribe(move |event| {
            let StoreEvent::ErrorChanged(error) = event else {
                return;
            };
            render(error.as_deref());

            let mut slot = slot.lock();
            if let Some(pending) = slot.take() {
                pending.abort();
            }
            if let Some(error) = error.clone() {
                let weak = weak.clone();
                *slot = Some(runtime.spawn(async move {
                    tokio::time::sleep(window).await;
                    if let Some(store) = weak.upgrade() {
                        store.clear_error_if(&error);
                    }
                }));
            }
        });

        Self {
            timer,
            _subscription: subscription,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.timer
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ErrorBanner {
    fn drop(&mut self) {
        if let Some(pending) = self.timer.lock().take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_banner(store: &Arc<ChatStore>) -> (ErrorBanner, Arc<Mutex<Vec<Option<String>>>>) {
        let shown = Arc::new(Mutex::new(Vec::new()));
        let sink = shown.clone();
        let banner = ErrorBanner::attach(store, DEFAULT_DISPLAY_WINDOW, move |error| {
            sink.lock().push(error.map(str::to_string));
        });
        (banner, shown)
    }

    #[tokio::test(start_paused = true)]
    async fn error_clears_after_display_window() {
        let store = Arc::new(ChatStore::default());
        let (banner, shown) = recording_banner(&store);

        store.set_error(Some("x".to_string()));
        assert!(banner.is_armed());

        tokio::time::sleep(Duration::from_millis(4900)).await;
        assert_eq!(store.error().as_deref(), Some("x"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.error().is_none());
        assert_eq!(*shown.lock(), vec![Some("x".to_string()), None]);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_clear_cancels_the_timer() {
        let store = Arc::new(ChatStore::default());
        let (banner, _shown) = recording_banner(&store);

        store.set_error(Some("x".to_string()));
        store.set_error(None);
        assert!(!banner.is_armed());

        // A fresh error later gets its own full window.
        tokio::time::sleep(Duration::from_secs(3)).await;
        store.set_error(Some("y".to_string()));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(store.error().as_deref(), Some("y"));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(store.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_error_restarts_the_window() {
        let store = Arc::new(ChatStore::default());
        let (_banner, _shown) = recording_banner(&store);

        store.set_error(Some("first".to_string()));
        tokio::time::sleep(Duration::from_secs(4)).await;
        store.set_error(Some("second".to_string()));
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(store.error().as_deref(), Some("second"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(store.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_banner_stops_auto_clear() {
        let store = Arc::new(ChatStore::default());
        let (banner, _shown) = recording_banner(&store);

        store.set_error(Some("x".to_string()));
        drop(banner);
        assert_eq!(store.subscriber_count(), 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.error().as_deref(), Some("x"));
    }
}
