use crate::commands::CommandDispatcher;
use crate::config::Config;
use crate::core::error::ChatError;

use console::style;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config as EditorConfig, Context, EditMode, Editor, Helper};
use std::path::Path;

pub type ChatEditor = Editor<ChatHelper, FileHistory>;

/// Completes `/command` names and hints from history.
pub struct ChatHelper {
    commands: CommandDispatcher,
    history_hinter: HistoryHinter,
}

impl ChatHelper {
    pub fn new(commands: CommandDispatcher) -> Self {
        Self {
            commands,
            history_hinter: HistoryHinter {},
        }
    }

    fn command_candidates(&self, typed: &str) -> Vec<Pair> {
        self.commands
            .get_command_names()
            .into_iter()
            .filter(|cmd| cmd.starts_with(typed))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd,
            })
            .collect()
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Only the command word itself is completed.
        match line[..pos].strip_prefix('/') {
            Some(typed) if !typed.contains(char::is_whitespace) => {
                Ok((1, self.command_candidates(typed)))
            }
            _ => Ok((pos, Vec::new())),
        }
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.history_hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ChatHelper {}

impl Validator for ChatHelper {}

pub fn create_editor(commands: CommandDispatcher) -> Result<ChatEditor, ChatError> {
    let config = EditorConfig::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| ChatError::Input(format!("Failed to create line editor: {}", e)))?;
    editor.set_helper(Some(ChatHelper::new(commands)));

    let _ = editor.load_history(&Config::history_path());

    Ok(editor)
}

/// Reads one line. `None` means the user asked to leave (Ctrl-C / Ctrl-D).
pub fn read_input(editor: &mut ChatEditor) -> Result<Option<String>, ChatError> {
    let prompt = style("> ").bold().cyan().to_string();
    match editor.readline(&prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                editor
                    .add_history_entry(line.as_str())
                    .map_err(|e| ChatError::Input(format!("Failed to add history entry: {}", e)))?;
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(ChatError::Input(format!("Input error: {}", err))),
    }
}

pub fn save_history(editor: &mut ChatEditor) -> Result<(), ChatError> {
    save_history_to(editor, &Config::history_path())
}

fn save_history_to(editor: &mut ChatEditor, history_path: &Path) -> Result<(), ChatError> {
    if let Some(parent) = history_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ChatError::Input(format!("Failed to create history directory: {}", e))
            })?;
        }
    }

    editor
        .save_history(history_path)
        .map_err(|e| ChatError::Input(format!("Failed to save history: {}", e)))
}
