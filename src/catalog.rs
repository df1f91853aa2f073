use crate::api::ChatBackend;
use crate::store::ChatStore;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Model ids offered by the backend, fetched at most once per session.
///
/// A failed fetch is remembered as an empty catalog: it is logged, never
/// surfaced to the store's error, and never retried.
pub struct ModelCatalog {
    backend: Arc<dyn ChatBackend>,
    models: OnceCell<Vec<String>>,
}

impl ModelCatalog {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            models: OnceCell::new(),
        }
    }

    /// The catalog, fetching it on first use.
    pub async fn load(&self) -> &[String] {
        self.models
            .get_or_init(|| async {
                match self.backend.fetch_models().await {
                    Ok(models) => {
                        info!(count = models.len(), "model catalog loaded");
                        models
                    }
                    Err(e) => {
                        warn!(error = %e, "model catalog unavailable");
                        Vec::new()
                    }
                }
            })
            .await
    }

    /// The catalog if it has already been fetched.
    pub fn get(&self) -> Option<&[String]> {
        self.models.get().map(Vec::as_slice)
    }

    /// Loads the catalog and makes sure the store's model is one of it.
    pub async fn sync_settings(&self, store: &ChatStore) -> &[String] {
        let models = self.load().await;
        store.reconcile_model(models);
        models
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ChatError;
    use crate::store::types::DEFAULT_MODEL;
    use crate::store::{Message, Settings, StoreEvent};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CatalogBackend {
        models: Option<Vec<String>>,
        calls: AtomicUsize,
    }

    impl CatalogBackend {
        fn new(models: Option<Vec<&str>>) -> Arc<Self> {
            Arc::new(Self {
                models: models.map(|m| m.into_iter().map(str::to_string).collect()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for CatalogBackend {
        async fn send_chat(&self, _: &[Message], _: &Settings) -> Result<String, ChatError> {
            Err(ChatError::Api("not used".to_string()))
        }

        async fn fetch_models(&self) -> Result<Vec<String>, ChatError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.models
                .clone()
                .ok_or_else(|| ChatError::Network("Connection failed".to_string()))
        }

        async fn health(&self) -> Result<String, ChatError> {
            Ok("ok".to_string())
        }
    }

    #[tokio::test]
    async fn fetches_once_and_caches() {
        let backend = CatalogBackend::new(Some(vec!["a", "b"]));
        let catalog = ModelCatalog::new(backend.clone());
        assert!(catalog.get().is_none());

        assert_eq!(catalog.load().await, ["a", "b"]);
        assert_eq!(catalog.load().await, ["a", "b"]);
        assert_eq!(catalog.get(), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_default_model_and_sets_no_error() {
        let backend = CatalogBackend::new(None);
        let catalog = ModelCatalog::new(backend.clone());
        let store = ChatStore::default();
        let events = Arc::new(AtomicUsize::new(0));
        let counter = events.clone();
        let _subscription = store.subscribe(move |event| {
            if matches!(event, StoreEvent::ErrorChanged(_)) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        assert!(catalog.sync_settings(&store).await.is_empty());

        assert_eq!(store.settings().model, DEFAULT_MODEL);
        assert!(store.error().is_none());
        assert_eq!(events.load(Ordering::SeqCst), 0);

        catalog.load().await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_default_falls_back_to_first_model() {
        let backend = CatalogBackend::new(Some(vec!["llama-3.3-70b-versatile", "qwen-qwq-32b"]));
        let catalog = ModelCatalog::new(backend);
        let store = ChatStore::default();

        catalog.sync_settings(&store).await;
        assert_eq!(store.settings().model, "llama-3.3-70b-versatile");
    }
}
