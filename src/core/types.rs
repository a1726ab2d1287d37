use std::fmt;
use serde::Serialize;

use crate::core::cluster::{ShellCluster, ShellNode};

/// A typed argument, variable value or command result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Str(String),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
    /// Canonical member name of an enumerated parameter.
    Enum(String),
    Node(ShellNode),
    Cluster(ShellCluster),
    Array(Vec<Value>),
    Json(serde_json::Value),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Str(_) => "string",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Double(_) => "double",
            Value::Bool(_) => "boolean",
            Value::Enum(_) => "enum",
            Value::Node(_) => "node",
            Value::Cluster(_) => "cluster",
            Value::Array(_) => "array",
            Value::Json(_) => "json",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// How the value is named in diagnostics: domain objects by their variable.
    pub fn describe(&self) -> String {
        match self {
            Value::Node(node) => format!("${}", node.name),
            Value::Cluster(cluster) => format!("${}", cluster.variable),
            other => other.to_string(),
        }
    }

    /// Text written after a command returns: strings as-is, everything else pretty JSON.
    pub fn render(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Str(s) => write!(f, "{}", s),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Enum(name) => write!(f, "{}", name),
            Value::Node(node) => write!(f, "{}", node),
            Value::Cluster(cluster) => write!(f, "{}", cluster),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Json(json) => write!(f, "{}", json),
        }
    }
}

/// Target type of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamType {
    Str,
    Byte,
    Short,
    Int,
    Long,
    Double,
    Bool,
    Enum(&'static [&'static str]),
    Node,
    Cluster,
    Array(&'static ParamType),
}

impl ParamType {
    pub fn name(&self) -> String {
        match self {
            ParamType::Str => "String".to_string(),
            ParamType::Byte => "byte".to_string(),
            ParamType::Short => "short".to_string(),
            ParamType::Int => "int".to_string(),
            ParamType::Long => "long".to_string(),
            ParamType::Double => "double".to_string(),
            ParamType::Bool => "boolean".to_string(),
            ParamType::Enum(members) => members.join("|"),
            ParamType::Node => "ShellNode".to_string(),
            ParamType::Cluster => "ShellCluster".to_string(),
            ParamType::Array(element) => format!("{}[]", element.name()),
        }
    }
}

/// How a parameter takes its tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Fixed,
    /// Resolves to `Value::Null` when no token is left.
    Optional,
    /// Last parameter only; absorbs every remaining token.
    Variadic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub const fn fixed(name: &'static str, ty: ParamType) -> Self {
        Self { name, ty, kind: ParamKind::Fixed }
    }

    pub const fn optional(name: &'static str, ty: ParamType) -> Self {
        Self { name, ty, kind: ParamKind::Optional }
    }

    pub const fn variadic(name: &'static str, ty: ParamType) -> Self {
        Self { name, ty, kind: ParamKind::Variadic }
    }

    /// `<name>`, `[<name>]` or `<name>...` for help output.
    pub fn syntax(&self) -> String {
        match self.kind {
            ParamKind::Fixed => format!("<{}>", self.name),
            ParamKind::Optional => format!("[<{}>]", self.name),
            ParamKind::Variadic => format!("<{}>...", self.name),
        }
    }
}
