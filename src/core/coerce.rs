use crate::core::error::ShellError;
use crate::core::types::{ParamType, Value};

const TRUE_WORDS: [&str; 4] = ["yes", "on", "true", "1"];
const FALSE_WORDS: [&str; 4] = ["no", "off", "false", "0"];

/// Convert a resolved argument into the declared parameter type.
///
/// Literal tokens arrive as `Value::Str`; variable references may already be
/// domain objects. Domain objects are never built from bare strings, the one
/// widening being a cluster passed where an array of nodes is expected.
pub fn coerce(value: &Value, ty: &ParamType) -> Result<Value, ShellError> {
    match ty {
        ParamType::Str => Ok(match value {
            Value::Str(s) => Value::Str(s.clone()),
            other => Value::Str(other.to_string()),
        }),
        ParamType::Byte => parse_number(value, ty, Value::Byte),
        ParamType::Short => parse_number(value, ty, Value::Short),
        ParamType::Int => parse_number(value, ty, Value::Int),
        ParamType::Long => parse_number(value, ty, Value::Long),
        ParamType::Double => parse_number(value, ty, Value::Double),
        ParamType::Bool => coerce_bool(value),
        ParamType::Enum(members) => coerce_enum(value, members),
        ParamType::Node => match value {
            Value::Node(node) => Ok(Value::Node(node.clone())),
            other => Err(ShellError::invalid_type(other.describe(), "node variable")),
        },
        ParamType::Cluster => match value {
            Value::Cluster(cluster) => Ok(Value::Cluster(cluster.clone())),
            other => Err(ShellError::invalid_type(other.describe(), "cluster variable")),
        },
        ParamType::Array(element) => match (value, element) {
            (Value::Cluster(cluster), ParamType::Node) => Ok(Value::Array(
                cluster.nodes.iter().cloned().map(Value::Node).collect(),
            )),
            (Value::Array(items), _) => items
                .iter()
                .map(|item| coerce(item, element))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (single, _) => Ok(Value::Array(vec![coerce(single, element)?])),
        },
    }
}

fn parse_number<T, F>(value: &Value, ty: &ParamType, wrap: F) -> Result<Value, ShellError>
where
    T: std::str::FromStr,
    F: Fn(T) -> Value,
{
    match value {
        Value::Str(token) => token
            .parse::<T>()
            .map(wrap)
            .map_err(|_| ShellError::invalid_type(token.clone(), ty.name())),
        other if other.type_name() == value_type_name(ty) => Ok(other.clone()),
        other => Err(ShellError::invalid_type(other.describe(), ty.name())),
    }
}

fn value_type_name(ty: &ParamType) -> &'static str {
    match ty {
        ParamType::Byte => "byte",
        ParamType::Short => "short",
        ParamType::Int => "int",
        ParamType::Long => "long",
        ParamType::Double => "double",
        _ => "",
    }
}

fn coerce_bool(value: &Value) -> Result<Value, ShellError> {
    let token = match value {
        Value::Bool(b) => return Ok(Value::Bool(*b)),
        Value::Str(s) => s.to_lowercase(),
        other => return Err(ShellError::invalid_type(other.describe(), "boolean")),
    };

    if TRUE_WORDS.contains(&token.as_str()) {
        Ok(Value::Bool(true))
    } else if FALSE_WORDS.contains(&token.as_str()) {
        Ok(Value::Bool(false))
    } else {
        Err(ShellError::invalid_type(
            token,
            "boolean (yes/on/true/1 or no/off/false/0)",
        ))
    }
}

fn coerce_enum(value: &Value, members: &[&str]) -> Result<Value, ShellError> {
    let token = match value {
        Value::Str(s) | Value::Enum(s) => s,
        other => {
            return Err(ShellError::invalid_type(
                other.describe(),
                format!("one of [{}]", members.join(", ")),
            ))
        }
    };

    members
        .iter()
        .find(|member| member.eq_ignore_ascii_case(token))
        .map(|member| Value::Enum(member.to_string()))
        .ok_or_else(|| {
            ShellError::invalid_type(token.clone(), format!("one of [{}]", members.join(", ")))
        })
}
