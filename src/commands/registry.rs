use super::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::core::error::ChatError;
use std::collections::HashMap;
use std::sync::Arc;

pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<C: CommandHandler + 'static>(&mut self, name: &str, command: C) {
        self.handlers.insert(name.to_string(), Arc::new(command));
    }

    pub async fn execute(
        &self,
        name: &str,
        args: &[&str],
        ctx: &mut CommandContext,
    ) -> Result<Option<String>, ChatError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| ChatError::Input(format!("Unknown command: /{}", name)))?;
        handler.execute(ctx, args).await
    }

    pub fn get_command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}
