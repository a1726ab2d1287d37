// File: src/core/args.rs
use crate::core::coerce::coerce;
use crate::core::command::CommandDescriptor;
use crate::core::env::{is_valid_name, VariableStore};
use crate::core::error::ShellError;
use crate::core::types::{ParamKind, ParamSpec, ParamType, Value};

/// Commands whose first argument names a variable instead of reading one.
const LITERAL_FIRST_ARG: [&str; 3] = ["getval", "set", "show"];

/// Split on whitespace runs. With a `limit`, the last piece keeps the rest
/// of the text untouched, embedded newlines included.
pub fn split_tokens(text: &str, limit: Option<usize>) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        if limit.map_or(false, |limit| tokens.len() + 1 >= limit) {
            tokens.push(rest.to_string());
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                tokens.push(rest[..end].to_string());
                rest = rest[end..].trim_start();
            }
            None => {
                tokens.push(rest.to_string());
                break;
            }
        }
    }
    tokens
}

/// Tokenize, expand `$name` references, bind to the declared parameters and
/// coerce each one.
pub fn resolve(text: &str, command: &CommandDescriptor, vars: &VariableStore) -> Result<Vec<Value>, ShellError> {
    let limit = if command.flags.multiline || command.flags.assign_all {
        Some(command.params.len()).filter(|n| *n > 0)
    } else {
        None
    };

    let expanded = split_tokens(text, limit)
        .into_iter()
        .enumerate()
        .map(|(index, token)| expand(index, token, &command.name, vars))
        .collect::<Result<Vec<_>, _>>()?;

    bind(expanded, &command.params)
}

fn expand(index: usize, token: String, command: &str, vars: &VariableStore) -> Result<Value, ShellError> {
    let Some(name) = token.strip_prefix('$') else {
        return Ok(Value::Str(token));
    };
    if name.is_empty() || token.contains(char::is_whitespace) {
        return Ok(Value::Str(token));
    }
    if index == 0 && LITERAL_FIRST_ARG.contains(&command) {
        return Ok(Value::Str(token));
    }
    if !is_valid_name(name) {
        return Err(ShellError::Lex(format!("malformed variable reference: {}", token)));
    }

    match vars.get(name) {
        None => Err(ShellError::UndefinedVariable(name.to_string())),
        Some(Value::Cluster(cluster)) => Ok(Value::Cluster(cluster.refresh_nodes(vars, true)?)),
        Some(value) => Ok(value.clone()),
    }
}

/// Assign values to parameters, then coerce.
///
/// Missing fixed parameters are reported by name; leftovers after the last
/// non-variadic parameter are an error.
pub fn bind(values: Vec<Value>, params: &[ParamSpec]) -> Result<Vec<Value>, ShellError> {
    let mut values = values.into_iter();
    let mut bound = Vec::with_capacity(params.len());

    for param in params {
        let arg = match param.kind {
            ParamKind::Variadic => {
                let rest = values
                    .by_ref()
                    .map(|value| coerce(&value, &param.ty))
                    .collect::<Result<Vec<_>, _>>()?;
                Value::Array(flatten_nodes(rest, &param.ty))
            }
            ParamKind::Optional => match values.next() {
                Some(value) => coerce(&value, &param.ty)?,
                None => Value::Null,
            },
            ParamKind::Fixed => match values.next() {
                Some(value) => coerce(&value, &param.ty)?,
                None => return Err(ShellError::MissingArgument(param.name.to_string())),
            },
        };
        bound.push(arg);
    }

    if values.next().is_some() {
        return Err(ShellError::TooManyArguments);
    }
    Ok(bound)
}

/// Variadic node-array elements may each expand to several nodes.
fn flatten_nodes(items: Vec<Value>, ty: &ParamType) -> Vec<Value> {
    if !matches!(ty, ParamType::Array(_)) {
        return items;
    }
    items
        .into_iter()
        .flat_map(|item| match item {
            Value::Array(inner) => inner,
            other => vec![other],
        })
        .collect()
}
