pub mod basic;
pub mod cluster;
pub mod data;

use crate::core::command::{Args, Registry};
use crate::core::error::ShellError;
use crate::core::watch::WaitTime;

/// Every built-in provider, registered under its group name.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register("basic", basic::commands());
    registry.register("cluster", cluster::commands());
    registry.register("data", data::commands());
    registry
}

/// Optional trailing wait argument, in seconds.
pub(crate) fn wait_time(args: &Args, index: usize) -> Result<WaitTime, ShellError> {
    Ok(WaitTime::from_arg(args.opt_int(index)?))
}
