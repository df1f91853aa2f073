pub mod api;
pub mod app;
pub mod banner;
pub mod catalog;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod display;
pub mod input;
pub mod logging;
pub mod store;

pub use api::{ChatBackend, HttpBackend, RetryPolicy};
pub use banner::ErrorBanner;
pub use catalog::ModelCatalog;
pub use chat::{ChatSession, CycleOutcome, PendingReply, Submission};
pub use core::error::ChatError;
pub use store::{ChatStore, Message, Role, SessionState, Settings, SettingsPatch, StoreEvent};
