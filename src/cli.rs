use crate::store::SettingsPatch;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Terminal chat client for a hosted LLM backend", long_about = None)]
pub struct Args {
    /// Message to send; with piped stdin it is appended after the piped text
    pub query: Option<String>,

    /// Backend root URL (overrides GCHAT_BACKEND_URL and the config file)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature between 0.0 and 1.0
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Maximum tokens in the reply (100-2000, steps of 100)
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Ask the backend for a streamed completion
    #[arg(long)]
    pub stream: bool,

    /// Path to an alternative config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Settings given on the command line, as a patch over the configured ones.
    pub fn settings_patch(&self) -> SettingsPatch {
        SettingsPatch {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: self.stream.then_some(true),
        }
    }
}
