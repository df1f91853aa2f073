use super::CommandContext;
use crate::core::error::ChatError;
use crate::store::SettingsPatch;
use async_trait::async_trait;
use console::style;

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(
        &self,
        ctx: &mut CommandContext,
        args: &[&str],
    ) -> Result<Option<String>, ChatError>;
    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct HelpCommand;
pub struct ClearCommand;
pub struct ModelCommand;
pub struct ModelsCommand;
pub struct TemperatureCommand;
pub struct MaxTokensCommand;
pub struct StreamCommand;
pub struct SettingsCommand;
pub struct HealthCommand;

#[async_trait]
impl CommandHandler for QuitCommand {
    async fn execute(
        &self,
        ctx: &mut CommandContext,
        _args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        ctx.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit - Exit the chat session"
    }
}

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn execute(
        &self,
        _ctx: &mut CommandContext,
        _args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        let title = style("Available Commands").bold().underlined();
        let help_text = [
            title.to_string(),
            style(HelpCommand.help()).to_string(),
            style(ClearCommand.help()).to_string(),
            style(ModelCommand.help()).to_string(),
            style(ModelsCommand.help()).to_string(),
            style(TemperatureCommand.help()).to_string(),
            style(MaxTokensCommand.help()).to_string(),
            style(StreamCommand.help()).to_string(),
            style(SettingsCommand.help()).to_string(),
            style(HealthCommand.help()).to_string(),
            style(QuitCommand.help()).to_string(),
        ]
        .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        "/help - Show available commands"
    }
}

#[async_trait]
impl CommandHandler for ClearCommand {
    async fn execute(
        &self,
        ctx: &mut CommandContext,
        _args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        ctx.store.clear_messages();
        Ok(Some("Chat history cleared.".to_string()))
    }

    fn help(&self) -> &'static str {
        "/clear - Clear conversation history"
    }
}

#[async_trait]
impl CommandHandler for ModelCommand {
    async fn execute(
        &self,
        ctx: &mut CommandContext,
        args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        let Some(requested) = args.first() else {
            return Ok(Some(format!("Current model: {}", ctx.store.settings().model)));
        };

        let catalog = ctx.catalog.load().await;
        if !catalog.is_empty() && !catalog.iter().any(|m| m == requested) {
            return Err(ChatError::Input(format!(
                "Unknown model '{}'. Available: {}",
                requested,
                catalog.join(", ")
            )));
        }

        ctx.store.update_settings(&SettingsPatch::model(*requested));
        Ok(Some(format!("Model changed to: {}", ctx.store.settings().model)))
    }

    fn help(&self) -> &'static str {
        "/model <name> - Show or change the current model"
    }
}

#[async_trait]
impl CommandHandler for ModelsCommand {
    async fn execute(
        &self,
        ctx: &mut CommandContext,
        _args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        let catalog = ctx.catalog.load().await;
        if catalog.is_empty() {
            return Ok(Some("No models available.".to_string()));
        }

        let current = ctx.store.settings().model;
        let lines: Vec<String> = catalog
            .iter()
            .map(|model| {
                if *model == current {
                    format!("{} {}", style("*").green().bold(), style(model).bold())
                } else {
                    format!("  {}", model)
                }
            })
            .collect();
        Ok(Some(lines.join("\n")))
    }

    fn help(&self) -> &'static str {
        "/models - List the models offered by the backend"
    }
}

#[async_trait]
impl CommandHandler for TemperatureCommand {
    async fn execute(
        &self,
        ctx: &mut CommandContext,
        args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        let Some(raw) = args.first() else {
            return Ok(Some(format!(
                "Temperature: {:.1}",
                ctx.store.settings().temperature
            )));
        };

        let value: f64 = raw
            .parse()
            .map_err(|_| ChatError::Input(format!("Not a number: {}", raw)))?;
        ctx.store.update_settings(&SettingsPatch::temperature(value));
        Ok(Some(format!(
            "Temperature set to {:.1}",
            ctx.store.settings().temperature
        )))
    }

    fn help(&self) -> &'static str {
        "/temperature <0.0-1.0> - Show or set the sampling temperature"
    }
}

#[async_trait]
impl CommandHandler for MaxTokensCommand {
    async fn execute(
        &self,
        ctx: &mut CommandContext,
        args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        let Some(raw) = args.first() else {
            return Ok(Some(format!(
                "Max tokens: {}",
                ctx.store.settings().max_tokens
            )));
        };

        let value: u32 = raw
            .parse()
            .map_err(|_| ChatError::Input(format!("Not a whole number: {}", raw)))?;
        ctx.store.update_settings(&SettingsPatch::max_tokens(value));
        Ok(Some(format!(
            "Max tokens set to {}",
            ctx.store.settings().max_tokens
        )))
    }

    fn help(&self) -> &'static str {
        "/max-tokens <100-2000> - Show or set the reply length limit"
    }
}

#[async_trait]
impl CommandHandler for StreamCommand {
    async fn execute(
        &self,
        ctx: &mut CommandContext,
        args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        let enabled = match args.first().map(|a| a.to_ascii_lowercase()) {
            None => {
                let state = if ctx.store.settings().stream { "on" } else { "off" };
                return Ok(Some(format!("Stream: {}", state)));
            }
            Some(arg) => match arg.as_str() {
                "on" | "true" | "yes" => true,
                "off" | "false" | "no" => false,
                _ => return Ok(Some("Usage: /stream <on|off>".to_string())),
            },
        };

        ctx.store.update_settings(&SettingsPatch::stream(enabled));
        Ok(Some(format!(
            "Stream {}",
            if enabled { "enabled" } else { "disabled" }
        )))
    }

    fn help(&self) -> &'static str {
        "/stream <on|off> - Show or toggle the stream flag sent to the backend"
    }
}

#[async_trait]
impl CommandHandler for SettingsCommand {
    async fn execute(
        &self,
        ctx: &mut CommandContext,
        _args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        let settings = ctx.store.settings();
        Ok(Some(format!(
            "{}\n{:<12} {}\n{:<12} {:.1}\n{:<12} {}\n{:<12} {}",
            style("Settings").bold().underlined(),
            "model",
            settings.model,
            "temperature",
            settings.temperature,
            "max tokens",
            settings.max_tokens,
            "stream",
            settings.stream
        )))
    }

    fn help(&self) -> &'static str {
        "/settings - Show the current generation settings"
    }
}

#[async_trait]
impl CommandHandler for HealthCommand {
    async fn execute(
        &self,
        ctx: &mut CommandContext,
        _args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        let status = ctx.backend.health().await?;
        Ok(Some(format!("Backend status: {}", status)))
    }

    fn help(&self) -> &'static str {
        "/health - Check that the backend is reachable"
    }
}
