use clap::Parser;
use console::style;
use gchat::app::Application;
use gchat::cli::Args;
use gchat::commands::create_command_registry;
use gchat::config::Config;
use gchat::core::error::ChatError;
use gchat::logging;

async fn run(args: Args) -> Result<(), ChatError> {
    let config_path = args.config.clone().unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)?.with_env_overrides();
    logging::init(&config.log_level);

    let mut app = Application::new(args, config, create_command_registry())?;
    app.run().await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("{} {}", style("Error:").bold().red(), e);
        std::process::exit(1);
    }
}
