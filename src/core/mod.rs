pub mod api;
pub mod args;
pub mod cluster;
pub mod coerce;
pub mod command;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod history;
pub mod local;
pub mod pool;
pub mod session;
pub mod types;
pub mod watch;
