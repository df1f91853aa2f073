use crate::api::{ChatBackend, HttpBackend};
use crate::banner::ErrorBanner;
use crate::catalog::ModelCatalog;
use crate::chat::{ChatSession, CycleOutcome, Submission};
use crate::cli::Args;
use crate::commands::{CommandContext, CommandDispatcher};
use crate::config::Config;
use crate::core::error::ChatError;
use crate::display;
use crate::input;
use crate::store::{ChatStore, Role, StoreEvent};
use is_terminal::IsTerminal;
use std::io::{self, Read};
use std::sync::Arc;
use tracing::{debug, info};

pub struct Application {
    pub args: Args,
    pub config: Config,
    pub session: ChatSession,
    pub catalog: Arc<ModelCatalog>,
    pub command_dispatcher: CommandDispatcher,
    base_url: String,
}

impl Application {
    pub fn new(
        args: Args,
        config: Config,
        command_dispatcher: CommandDispatcher,
    ) -> Result<Self, ChatError> {
        let base_url = match &args.base_url {
            Some(url) => url.trim().trim_end_matches('/').to_string(),
            None => config.base_url(),
        };
        let backend: Arc<dyn ChatBackend> = Arc::new(HttpBackend::new(
            base_url.clone(),
            config.request_timeout(),
            config.retry_policy(),
        )?);

        let mut settings = config.initial_settings();
        settings.merge(&args.settings_patch());
        info!(%base_url, model = %settings.model, "session starting");

        let store = Arc::new(ChatStore::new(settings));
        let catalog = Arc::new(ModelCatalog::new(backend.clone()));

        Ok(Self {
            args,
            config,
            session: ChatSession::new(store, backend),
            catalog,
            command_dispatcher,
            base_url,
        })
    }

    pub fn store(&self) -> &Arc<ChatStore> {
        self.session.store()
    }

    pub async fn run(&mut self) -> Result<(), ChatError> {
        let piped = if !io::stdin().is_terminal() {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| ChatError::Input(format!("Failed to read from stdin: {}", e)))?;
            Some(buffer)
        } else {
            None
        };

        let query = match (piped, self.args.query.clone()) {
            (Some(stdin_ctx), Some(arg_q)) => Some(format!("{}\n\n{}", stdin_ctx.trim_end(), arg_q)),
            (Some(stdin_ctx), None) => Some(stdin_ctx),
            (None, Some(arg_q)) => Some(arg_q),
            (None, None) => None,
        };

        match query {
            Some(query) => self.handle_one_shot(&query).await,
            None => self.handle_interactive().await,
        }
    }

    async fn handle_one_shot(&self, query: &str) -> Result<(), ChatError> {
        let pending = match self.session.submit(query) {
            Submission::Dispatched(pending) => pending,
            Submission::Empty => return Err(ChatError::Input("No query provided".to_string())),
            Submission::Busy => {
                return Err(ChatError::Input("A request is already pending".to_string()));
            }
        };

        match pending.wait().await {
            CycleOutcome::Replied(reply) => {
                if io::stdout().is_terminal() {
                    display::display_markdown(&reply.content);
                } else {
                    println!("{}", reply.content);
                }
                Ok(())
            }
            CycleOutcome::Failed(message) => Err(ChatError::Api(message)),
        }
    }

    async fn handle_interactive(&mut self) -> Result<(), ChatError> {
        let store = self.store().clone();
        display::display_welcome(&self.base_url, &store.settings());

        let _renderer = store.subscribe(|event| {
            if let StoreEvent::MessageAdded(message) = event {
                if message.role == Role::Assistant {
                    display::display_message(message);
                }
            }
        });
        let _banner = ErrorBanner::attach(&store, self.config.error_display_window(), |error| {
            if let Some(error) = error {
                display::display_error_banner(error);
            }
        });

        let catalog = self.catalog.clone();
        let catalog_store = store.clone();
        tokio::spawn(async move {
            catalog.sync_settings(&catalog_store).await;
        });

        let mut ctx = CommandContext::new(
            store.clone(),
            self.catalog.clone(),
            self.session.backend().clone(),
        );
        let mut editor = input::create_editor(self.command_dispatcher.clone())?;

        loop {
            let Some(line) = input::read_input(&mut editor)? else {
                break;
            };

            if let Some(result) = self.command_dispatcher.dispatch(&line, &mut ctx).await {
                match result {
                    Ok(Some(output)) => println!("{}", output),
                    Ok(None) => {}
                    Err(e) => display::display_command_error(&e),
                }
                if !ctx.should_continue {
                    break;
                }
                continue;
            }

            match self.session.submit(&line) {
                Submission::Dispatched(pending) => {
                    display::display_thinking();
                    pending.wait().await;
                }
                Submission::Empty => {}
                Submission::Busy => debug!("still waiting for the previous reply"),
            }
        }

        input::save_history(&mut editor)?;
        Ok(())
    }
}
