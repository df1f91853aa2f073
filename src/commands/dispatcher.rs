use super::{
    CommandContext,
    handler::{
        ClearCommand, HealthCommand, HelpCommand, MaxTokensCommand, ModelCommand, ModelsCommand,
        QuitCommand, SettingsCommand, StreamCommand, TemperatureCommand,
    },
    registry::CommandRegistry,
};
use crate::core::error::ChatError;
use std::sync::Arc;

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// Runs a `/command arg...` line. Returns `None` for lines that are not
    /// commands.
    pub async fn dispatch(
        &self,
        line: &str,
        ctx: &mut CommandContext,
    ) -> Option<Result<Option<String>, ChatError>> {
        let rest = line.trim().strip_prefix('/')?;
        let parts: Vec<&str> = rest.split_whitespace().collect();
        let (command, args) = parts.split_first()?;
        Some(self.execute(command, args, ctx).await)
    }

    pub async fn execute(
        &self,
        command: &str,
        args: &[&str],
        ctx: &mut CommandContext,
    ) -> Result<Option<String>, ChatError> {
        self.registry.execute(command, args, ctx).await
    }

    pub fn get_command_names(&self) -> Vec<String> {
        self.registry.get_command_names()
    }
}

pub fn create_command_registry() -> CommandDispatcher {
    let mut registry = CommandRegistry::new();

    registry.register("quit", QuitCommand);
    registry.register("help", HelpCommand);
    registry.register("clear", ClearCommand);
    registry.register("model", ModelCommand);
    registry.register("models", ModelsCommand);
    registry.register("temperature", TemperatureCommand);
    registry.register("max-tokens", MaxTokensCommand);
    registry.register("stream", StreamCommand);
    registry.register("settings", SettingsCommand);
    registry.register("health", HealthCommand);

    CommandDispatcher::new(Arc::new(registry))
}
