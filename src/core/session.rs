// File: src/core/session.rs
use std::sync::Arc;

use crate::core::api::{ClusterApi, Credentials};
use crate::core::cluster::ShellCluster;
use crate::core::command::Registry;
use crate::core::config::ShellConfig;
use crate::core::env::VariableStore;
use crate::core::error::ShellError;
use crate::core::history::CommandHistory;
use crate::output::Printer;

pub const VAR_USER: &str = "user";
pub const VAR_PASSWORD: &str = "password";
pub const VAR_OS_PASSWORD: &str = "ospassword";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modes {
    /// Print each command before running it.
    pub echo: bool,
    /// Stop the process at the first failing command, exit status 1.
    pub exit_on_error: bool,
    pub maintenance: bool,
    /// Ask queries for a row count.
    pub sql_count: bool,
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub cluster: ShellCluster,
    pub database: String,
}

/// Everything one shell run carries between commands.
pub struct Session {
    pub vars: VariableStore,
    pub modes: Modes,
    pub connection: Option<Connection>,
    pub ssl_mode: String,
    pub printer: Printer,
    pub history: CommandHistory,
    pub config: ShellConfig,
    pub registry: Arc<Registry>,
    pub api: Arc<dyn ClusterApi>,
    /// Nesting of `load`.
    pub load_depth: usize,
    exit_request: Option<i32>,
}

impl Session {
    pub fn new(config: ShellConfig, registry: Arc<Registry>, api: Arc<dyn ClusterApi>, printer: Printer) -> Self {
        let history = CommandHistory::new(config.history_size);
        log::debug!("session {} started", history.session_id());
        Self {
            vars: VariableStore::new(),
            modes: Modes::default(),
            connection: None,
            ssl_mode: "DISABLED".to_string(),
            printer,
            history,
            config,
            registry,
            api,
            load_depth: 0,
            exit_request: None,
        }
    }

    pub fn prompt(&self) -> String {
        let mut prompt = String::from("gridsh");
        if self.modes.maintenance {
            prompt.push_str("(maintenance)");
        }
        if let Some(ref connection) = self.connection {
            prompt.push('[');
            prompt.push_str(&connection.database);
            prompt.push(']');
        }
        prompt.push_str("> ");
        prompt
    }

    /// Ask the evaluator to stop after the current command.
    pub fn request_exit(&mut self, status: i32) {
        self.exit_request = Some(status);
    }

    pub fn take_exit(&mut self) -> Option<i32> {
        self.exit_request.take()
    }

    /// Credentials from the `user`/`password`/`ospassword` variables.
    pub fn credentials(&self, need_os_password: bool) -> Result<Credentials, ShellError> {
        let user = self.vars.get_str(VAR_USER)
            .ok_or_else(|| ShellError::handler("User is not set; run setuser first"))?;
        let password = self.vars.get_str(VAR_PASSWORD)
            .ok_or_else(|| ShellError::handler("Password is not set; run setuser first"))?;
        let os_password = self.vars.get_str(VAR_OS_PASSWORD).map(str::to_string);
        if need_os_password && os_password.is_none() {
            return Err(ShellError::handler(
                "OS password is not set; run setuser <user> <password> <ospassword>",
            ));
        }
        Ok(Credentials {
            user: user.to_string(),
            password: password.to_string(),
            os_password,
        })
    }
}
