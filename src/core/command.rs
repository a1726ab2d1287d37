// File: src/core/command.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::cluster::{ShellCluster, ShellNode};
use crate::core::error::ShellError;
use crate::core::session::Session;
use crate::core::types::{ParamKind, ParamSpec, Value};
use crate::core::watch::{WaitTime, Watcher};

pub type CommandHandler = fn(&mut Session, &Args) -> Result<Reply, ShellError>;

/// Runs after a wait completes, with the session back in hand.
pub type FollowUp = Box<dyn FnOnce(&mut Session) -> Result<(), ShellError>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandFlags {
    pub hidden: bool,
    /// Keeps reading lines until one ends with `;`.
    pub multiline: bool,
    /// The last parameter takes the rest of the line verbatim.
    pub assign_all: bool,
}

pub struct CommandDescriptor {
    pub name: String,
    pub group: String,
    pub params: Vec<ParamSpec>,
    pub flags: CommandFlags,
    pub summary: &'static str,
    pub handler: CommandHandler,
}

impl CommandDescriptor {
    pub fn new(name: &str, handler: CommandHandler) -> Self {
        Self {
            name: name.to_lowercase(),
            group: String::new(),
            params: Vec::new(),
            flags: CommandFlags::default(),
            summary: "",
            handler,
        }
    }

    pub fn params(mut self, params: &[ParamSpec]) -> Self {
        debug_assert!(
            params
                .iter()
                .rev()
                .skip(1)
                .all(|p| p.kind != ParamKind::Variadic),
            "only the last parameter of {} may be variadic",
            self.name
        );
        self.params = params.to_vec();
        self
    }

    pub fn summary(mut self, summary: &'static str) -> Self {
        self.summary = summary;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.flags.hidden = true;
        self
    }

    pub fn multiline(mut self) -> Self {
        self.flags.multiline = true;
        self
    }

    pub fn assign_all(mut self) -> Self {
        self.flags.assign_all = true;
        self
    }

    /// `name <a> [<b>]` as shown by `help`.
    pub fn syntax(&self) -> String {
        let mut syntax = self.name.clone();
        for param in &self.params {
            syntax.push(' ');
            syntax.push_str(&param.syntax());
        }
        if self.flags.multiline {
            syntax.push(';');
        }
        syntax
    }
}

impl std::fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("flags", &self.flags)
            .finish()
    }
}

static NULL: Value = Value::Null;

/// Resolved, coerced arguments in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&NULL)
    }

    fn mismatch(&self, index: usize, expected: &str) -> ShellError {
        ShellError::Internal(format!(
            "argument {} is {}, not {}",
            index,
            self.get(index).type_name(),
            expected
        ))
    }

    pub fn str(&self, index: usize) -> Result<&str, ShellError> {
        self.opt_str(index)?.ok_or_else(|| self.mismatch(index, "string"))
    }

    pub fn opt_str(&self, index: usize) -> Result<Option<&str>, ShellError> {
        match self.get(index) {
            Value::Null => Ok(None),
            Value::Str(s) | Value::Enum(s) => Ok(Some(s.as_str())),
            _ => Err(self.mismatch(index, "string")),
        }
    }

    pub fn opt_int(&self, index: usize) -> Result<Option<i32>, ShellError> {
        match self.get(index) {
            Value::Null => Ok(None),
            Value::Int(v) => Ok(Some(*v)),
            _ => Err(self.mismatch(index, "int")),
        }
    }

    pub fn int(&self, index: usize) -> Result<i32, ShellError> {
        self.opt_int(index)?.ok_or_else(|| self.mismatch(index, "int"))
    }

    pub fn double(&self, index: usize) -> Result<f64, ShellError> {
        match self.get(index) {
            Value::Double(v) => Ok(*v),
            _ => Err(self.mismatch(index, "double")),
        }
    }

    pub fn bool(&self, index: usize) -> Result<bool, ShellError> {
        match self.get(index) {
            Value::Bool(v) => Ok(*v),
            _ => Err(self.mismatch(index, "boolean")),
        }
    }

    pub fn node(&self, index: usize) -> Result<&ShellNode, ShellError> {
        match self.get(index) {
            Value::Node(node) => Ok(node),
            _ => Err(self.mismatch(index, "node")),
        }
    }

    pub fn cluster(&self, index: usize) -> Result<&ShellCluster, ShellError> {
        match self.get(index) {
            Value::Cluster(cluster) => Ok(cluster),
            _ => Err(self.mismatch(index, "cluster")),
        }
    }

    /// Elements of a node-array or variadic node parameter.
    pub fn nodes(&self, index: usize) -> Result<Vec<ShellNode>, ShellError> {
        match self.get(index) {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Node(node) => Ok(node.clone()),
                    _ => Err(self.mismatch(index, "node array")),
                })
                .collect(),
            _ => Err(self.mismatch(index, "node array")),
        }
    }
}

/// What a handler hands back to the evaluator.
pub enum Reply {
    Done,
    Value(Value),
    Wait(Wait),
}

impl Reply {
    /// Nothing to wait for when the user asked not to.
    pub fn wait(wait: Wait) -> Reply {
        if wait.timeout == WaitTime::NoWait {
            Reply::Done
        } else {
            Reply::Wait(wait)
        }
    }
}

/// A watcher to block on, with the messages around it.
pub struct Wait {
    pub watcher: Box<dyn Watcher>,
    pub timeout: WaitTime,
    pub waiting: Option<String>,
    pub completed: String,
    pub then: Option<FollowUp>,
}

impl Wait {
    pub fn new(watcher: Box<dyn Watcher>, timeout: WaitTime, completed: impl Into<String>) -> Self {
        Self {
            watcher,
            timeout,
            waiting: None,
            completed: completed.into(),
            then: None,
        }
    }

    pub fn waiting(mut self, message: impl Into<String>) -> Self {
        self.waiting = Some(message.into());
        self
    }

    pub fn then(mut self, follow_up: FollowUp) -> Self {
        self.then = Some(follow_up);
        self
    }
}

/// Command table, grouped for `help`.
#[derive(Debug, Default)]
pub struct Registry {
    commands: BTreeMap<String, Arc<CommandDescriptor>>,
    groups: BTreeMap<String, Vec<Arc<CommandDescriptor>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
            groups: BTreeMap::new(),
        }
    }

    /// Register one provider's commands. Registering a group again
    /// replaces what it registered before.
    pub fn register(&mut self, group: &str, descriptors: Vec<CommandDescriptor>) {
        if let Some(previous) = self.groups.remove(group) {
            for descriptor in previous {
                self.commands.remove(&descriptor.name);
            }
        }

        let mut members: Vec<Arc<CommandDescriptor>> = Vec::with_capacity(descriptors.len());
        for mut descriptor in descriptors {
            descriptor.group = group.to_string();
            let descriptor = Arc::new(descriptor);
            if let Some(shadowed) = self.commands.insert(descriptor.name.clone(), Arc::clone(&descriptor)) {
                log::warn!("command {} from group {} replaced by group {}", shadowed.name, shadowed.group, group);
            }
            members.retain(|m| m.name != descriptor.name);
            members.push(descriptor);
        }
        members.sort_by(|a, b| a.name.cmp(&b.name));
        log::debug!("registered {} command(s) in group {}", members.len(), group);
        self.groups.insert(group.to_string(), members);
    }

    pub fn get(&self, name: &str) -> Option<Arc<CommandDescriptor>> {
        self.commands.get(&name.to_lowercase()).cloned()
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<CommandDescriptor>, ShellError> {
        self.get(name).ok_or_else(|| ShellError::UnknownCommand(name.to_string()))
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<Arc<CommandDescriptor>>> {
        &self.groups
    }

    pub fn commands(&self) -> impl Iterator<Item = &Arc<CommandDescriptor>> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Invoke the handler. Causes go to the log; the caller prints the message.
pub fn dispatch(command: &CommandDescriptor, session: &mut Session, args: Vec<Value>) -> Result<Reply, ShellError> {
    log::debug!("dispatching {} with {} argument(s)", command.name, args.len());
    let args = Args::new(args);
    (command.handler)(session, &args).map_err(|err| {
        match err.cause_chain() {
            Some(cause) => log::error!("{} failed: {} (caused by: {})", command.name, err, cause),
            None => log::debug!("{} failed: {}", command.name, err),
        }
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ParamType;

    fn noop(_: &mut Session, _: &Args) -> Result<Reply, ShellError> {
        Ok(Reply::Done)
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut registry = Registry::new();
        registry.register("basic", vec![CommandDescriptor::new("set", noop)]);

        assert_eq!(registry.lookup("SET").unwrap().name, "set");
        assert_eq!(registry.lookup("Set").unwrap().group, "basic");
        assert!(matches!(registry.lookup("nosuch"), Err(ShellError::UnknownCommand(_))));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = Registry::new();
        let build = || vec![CommandDescriptor::new("stat", noop), CommandDescriptor::new("config", noop)];
        registry.register("cluster", build());
        registry.register("cluster", build());

        assert_eq!(registry.len(), 2);
        let names: Vec<&str> = registry.groups()["cluster"].iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["config", "stat"]);
    }

    #[test]
    fn test_syntax_shows_parameter_kinds() {
        let command = CommandDescriptor::new("setcluster", noop).params(&[
            ParamSpec::fixed("name", ParamType::Str),
            ParamSpec::optional("wait", ParamType::Int),
            ParamSpec::variadic("node", ParamType::Node),
        ]);
        assert_eq!(command.syntax(), "setcluster <name> [<wait>] <node>...");
    }

    #[test]
    fn test_args_accessors_report_mismatch() {
        let args = Args::new(vec![Value::Str("x".to_string()), Value::Null]);
        assert_eq!(args.str(0).unwrap(), "x");
        assert_eq!(args.opt_int(1).unwrap(), None);
        assert!(matches!(args.int(0), Err(ShellError::Internal(_))));
        assert!(args.get(9).is_null());
    }
}
