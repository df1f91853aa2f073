use crate::store::{Message, Role, Settings};
use console::style;
use termimad::MadSkin;

/// Render a conversation turn: role label, local time, then the content.
/// Assistant replies are rendered as markdown.
pub fn display_message(message: &Message) {
    let (label, time) = (
        match message.role {
            Role::User => style("You").bold().blue(),
            Role::Assistant => style("Assistant").bold().magenta(),
        },
        style(message.timestamp.format("%H:%M:%S").to_string()).dim(),
    );

    println!("\n{} {}", label, time);
    match message.role {
        Role::User => println!("{}", message.content),
        Role::Assistant => display_markdown(&message.content),
    }
}

pub fn display_markdown(text: &str) {
    MadSkin::default().print_text(text);
}

pub fn display_thinking() {
    println!("{}", style("Thinking...").dim().italic());
}

/// The error banner shown while the store holds an error.
pub fn display_error_banner(error: &str) {
    println!(
        "\n{} {}",
        style("✖").bold().red(),
        style(error).red()
    );
}

pub fn display_command_error(error: &dyn std::fmt::Display) {
    eprintln!("{} {}", style("Error executing command:").red(), error);
}

pub fn display_welcome(base_url: &str, settings: &Settings) {
    println!(
        "{} {}",
        style("gchat").bold().cyan(),
        style(format!("connected to {}", base_url)).dim()
    );
    println!(
        "{}",
        style(format!(
            "model {} · temperature {:.1} · max tokens {}",
            settings.model, settings.temperature, settings.max_tokens
        ))
        .dim()
    );
    println!(
        "Type a message to chat. '/help' lists commands; Ctrl+D or /quit exits.\n"
    );
}
