pub mod dispatcher;
pub mod handler;
pub mod registry;

use crate::api::ChatBackend;
use crate::catalog::ModelCatalog;
use crate::store::ChatStore;
use std::sync::Arc;
pub use dispatcher::{CommandDispatcher, create_command_registry};

/// What a slash command may read and change.
pub struct CommandContext {
    pub store: Arc<ChatStore>,
    pub catalog: Arc<ModelCatalog>,
    pub backend: Arc<dyn ChatBackend>,
    pub should_continue: bool,
}

impl CommandContext {
    pub fn new(
        store: Arc<ChatStore>,
        catalog: Arc<ModelCatalog>,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            store,
            catalog,
            backend,
            should_continue: true,
        }
    }
}
