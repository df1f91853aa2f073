//! Session state container.
//!
//! [`ChatStore`] owns the conversation, the in-flight flag, the last error and
//! the generation settings. Every mutation is a single step under one lock,
//! and subscribers are notified after the lock has been released so they may
//! read the store from inside their callback.

pub mod types;

pub use types::{Message, Role, SessionState, Settings, SettingsPatch};

use chrono::Local;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use tracing::debug;

/// What changed in the store. Delivered to every subscriber after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    MessageAdded(Message),
    MessagesCleared,
    LoadingChanged(bool),
    ErrorChanged(Option<String>),
    SettingsChanged(Settings),
}

type Listener = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: BTreeMap<u64, Listener>,
}

/// Returned by [`ChatStore::begin_turn`] when a request is already pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnRejected;

/// Snapshot handed to the request cycle when a turn starts.
#[derive(Debug, Clone)]
pub struct Turn {
    pub conversation: Vec<Message>,
    pub settings: Settings,
}

#[derive(Default)]
pub struct ChatStore {
    state: Mutex<SessionState>,
    listeners: Arc<Mutex<Listeners>>,
}

impl ChatStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: Mutex::new(SessionState {
                settings,
                ..SessionState::default()
            }),
            listeners: Arc::default(),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.lock().clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().messages.clone()
    }

    pub fn settings(&self) -> Settings {
        self.state.lock().settings.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Appends a message stamped with the local clock.
    pub fn add_message(&self, role: Role, content: impl Into<String>) -> Message {
        let message = Message {
            role,
            content: content.into(),
            timestamp: Local::now(),
        };
        self.state.lock().messages.push(message.clone());
        self.emit(StoreEvent::MessageAdded(message.clone()));
        message
    }

    pub fn set_loading(&self, is_loading: bool) {
        let changed = {
            let mut state = self.state.lock();
            std::mem::replace(&mut state.is_loading, is_loading) != is_loading
        };
        if changed {
            self.emit(StoreEvent::LoadingChanged(is_loading));
        }
    }

    pub fn set_error(&self, error: Option<String>) {
        let changed = {
            let mut state = self.state.lock();
            if state.error == error {
                false
            } else {
                state.error = error.clone();
                true
            }
        };
        if changed {
            self.emit(StoreEvent::ErrorChanged(error));
        }
    }

    /// Clears the error only if it is still `expected`. Returns whether it did.
    pub fn clear_error_if(&self, expected: &str) -> bool {
        let cleared = {
            let mut state = self.state.lock();
            if state.error.as_deref() == Some(expected) {
                state.error = None;
                true
            } else {
                false
            }
        };
        if cleared {
            self.emit(StoreEvent::ErrorChanged(None));
        }
        cleared
    }

    pub fn update_settings(&self, patch: &SettingsPatch) {
        let updated = {
            let mut state = self.state.lock();
            state
                .settings
                .merge(patch)
                .then(|| state.settings.clone())
        };
        if let Some(settings) = updated {
            debug!(?settings, "settings updated");
            self.emit(StoreEvent::SettingsChanged(settings));
        }
    }

    /// Applies the model catalog fallback rule to the current settings.
    pub fn reconcile_model(&self, catalog: &[String]) {
        let updated = {
            let mut state = self.state.lock();
            state
                .settings
                .reconcile_model(catalog)
                .then(|| state.settings.clone())
        };
        if let Some(settings) = updated {
            debug!(model = %settings.model, "model not in catalog, using first available");
            self.emit(StoreEvent::SettingsChanged(settings));
        }
    }

    pub fn clear_messages(&self) {
        self.state.lock().messages.clear();
        self.emit(StoreEvent::MessagesCleared);
    }

    /// Starts a turn atomically: appends the user message and raises the
    /// loading flag, or rejects without touching anything if a request is
    /// already pending.
    pub fn begin_turn(&self, content: impl Into<String>) -> Result<Turn, TurnRejected> {
        let (message, turn) = {
            let mut state = self.state.lock();
            if state.is_loading {
                return Err(TurnRejected);
            }
            let message = Message {
                role: Role::User,
                content: content.into(),
                timestamp: Local::now(),
            };
            state.messages.push(message.clone());
            state.is_loading = true;
            let turn = Turn {
                conversation: state.messages.clone(),
                settings: state.settings.clone(),
            };
            (message, turn)
        };
        self.emit(StoreEvent::MessageAdded(message));
        self.emit(StoreEvent::LoadingChanged(true));
        Ok(turn)
    }

    /// Registers `listener` for every subsequent change. The listener stays
    /// registered until the returned handle is dropped or unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.insert(id, Arc::new(listener));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().entries.len()
    }

    fn emit(&self, event: StoreEvent) {
        let listeners: Vec<Listener> = self.listeners.lock().entries.values().cloned().collect();
        for listener in listeners {
            listener(&event);
        }
    }
}

/// Handle for a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().entries.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn messages_append_in_call_order() {
        let store = ChatStore::default();
        for i in 0..25 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            store.add_message(role, format!("message {}", i));
        }

        let messages = store.messages();
        assert_eq!(messages.len(), 25);
        for (i, message) in messages.iter().enumerate() {
            assert_eq!(message.content, format!("message {}", i));
        }
        assert!(messages.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn clear_messages_keeps_settings_loading_and_error() {
        let store = ChatStore::default();
        store.update_settings(&SettingsPatch::max_tokens(1500));
        store.add_message(Role::User, "one");
        store.add_message(Role::Assistant, "two");
        store.set_loading(true);
        store.set_error(Some("oops".to_string()));

        store.clear_messages();

        let state = store.snapshot();
        assert!(state.messages.is_empty());
        assert_eq!(state.settings.max_tokens, 1500);
        assert!(state.is_loading);
        assert_eq!(state.error.as_deref(), Some("oops"));
    }

    #[test]
    fn clear_on_empty_store_is_fine() {
        let store = ChatStore::default();
        store.clear_messages();
        assert!(store.messages().is_empty());
    }

    #[test]
    fn begin_turn_rejects_while_pending() {
        let store = ChatStore::default();
        let turn = store.begin_turn("Hello").unwrap();
        assert_eq!(turn.conversation.len(), 1);
        assert!(store.is_loading());

        assert_eq!(store.begin_turn("again").unwrap_err(), TurnRejected);
        assert_eq!(store.messages().len(), 1);

        store.set_loading(false);
        let turn = store.begin_turn("again").unwrap();
        assert_eq!(turn.conversation.len(), 2);
    }

    #[test]
    fn subscribers_see_each_change_until_dropped() {
        let store = ChatStore::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscription = store.subscribe(move |event| sink.lock().push(event.clone()));

        store.add_message(Role::User, "hi");
        store.set_loading(true);
        store.set_loading(true);
        store.set_error(Some("bad".to_string()));
        store.update_settings(&SettingsPatch::stream(true));
        store.clear_messages();

        {
            let seen = seen.lock();
            assert_eq!(seen.len(), 5);
            assert!(matches!(&seen[0], StoreEvent::MessageAdded(m) if m.content == "hi"));
            assert_eq!(seen[1], StoreEvent::LoadingChanged(true));
            assert_eq!(seen[2], StoreEvent::ErrorChanged(Some("bad".to_string())));
            assert!(matches!(&seen[3], StoreEvent::SettingsChanged(s) if s.stream));
            assert_eq!(seen[4], StoreEvent::MessagesCleared);
        }

        subscription.unsubscribe();
        assert_eq!(store.subscriber_count(), 0);
        store.add_message(Role::User, "unseen");
        assert_eq!(seen.lock().len(), 5);
    }

    #[test]
    fn listener_may_read_the_store() {
        let store = Arc::new(ChatStore::default());
        let reads = Arc::new(AtomicUsize::new(0));
        let (weak, counter) = (Arc::downgrade(&store), reads.clone());
        let _subscription = store.subscribe(move |_| {
            if let Some(store) = weak.upgrade() {
                counter.fetch_add(store.messages().len(), Ordering::SeqCst);
            }
        });

        store.add_message(Role::User, "a");
        store.add_message(Role::User, "b");
        assert_eq!(reads.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unchanged_settings_emit_nothing() {
        let store = ChatStore::default();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let _subscription = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.update_settings(&SettingsPatch::default());
        store.update_settings(&SettingsPatch::temperature(0.7));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
