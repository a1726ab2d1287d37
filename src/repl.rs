use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use crate::core::engine::{Input, LineSource};
use crate::core::error::ShellError;

/// Interactive line source with persistent line-editing history.
pub struct Repl {
    editor: DefaultEditor,
    history_file: PathBuf,
}

impl Repl {
    pub fn new(history_file: PathBuf, history_size: usize) -> Result<Self, String> {
        let config = Config::builder()
            .max_history_size(history_size)
            .map_err(|e| format!("Invalid history size: {}", e))?
            .auto_add_history(false)
            .build();
        let mut editor = DefaultEditor::with_config(config)
            .map_err(|e| format!("Failed to initialize line editor: {}", e))?;

        if let Some(dir) = history_file.parent() {
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
            }
        }
        if history_file.exists() {
            if let Err(e) = editor.load_history(&history_file) {
                log::warn!("could not load {}: {}", history_file.display(), e);
            }
        }

        Ok(Self { editor, history_file })
    }

    pub fn save_history(&mut self) -> Result<(), String> {
        self.editor.save_history(&self.history_file)
            .map_err(|e| format!("Failed to save REPL history: {}", e))
    }
}

impl LineSource for Repl {
    fn read_line(&mut self, prompt: &str) -> Result<Input, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(e) => Err(ShellError::handler_with("Failed to read input", e)),
        }
    }
}
