// File: src/core/env.rs
use std::collections::{BTreeMap, HashMap};

use crate::core::error::ShellError;
use crate::core::types::Value;

/// Session variables, addressed as `$name` on the command line.
#[derive(Debug, Default)]
pub struct VariableStore {
    variables: HashMap<String, Value>,
}

pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn check_name(name: &str) -> Result<(), ShellError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ShellError::handler(format!(
            "Variable name is invalid (only alphanumerics and '_' are allowed): name=[{}]",
            name
        )))
    }
}

impl VariableStore {
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
        }
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<(), ShellError> {
        check_name(name)?;
        self.variables.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.variables.get(name) {
            Some(Value::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Name-ordered view for `show` and `save`.
    pub fn sorted(&self) -> BTreeMap<&str, &Value> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }
}
