mod commands;
mod core;
mod output;
mod repl;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use crate::commands::basic::VERSION;
use crate::core::config::{has_script_extension, ShellConfig, SCRIPT_EXTENSION};
use crate::core::engine::{evaluate, run_script, Flow, ScriptSource};
use crate::core::local::LocalCluster;
use crate::core::session::Session;
use crate::output::Printer;
use crate::repl::Repl;

fn usage() -> String {
    format!(
        "Usage: gridsh [-v|--version] [-h|--help] [script.{ext} ...]\n\n\
         Without a script the shell reads commands interactively.\n\
         ~/.gridshrc is loaded first when it exists.\n\n\
         Cluster commands run against a built-in in-process cluster;\n\
         this build does not connect to remote nodes.",
        ext = SCRIPT_EXTENSION
    )
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off"))
        .format_timestamp_millis()
        .init();

    let mut scripts = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" | "--version" => {
                println!("gridsh version {}", VERSION);
                return;
            }
            "-h" | "--help" => {
                println!("{}", usage());
                return;
            }
            option if option.starts_with('-') => {
                let printer = Printer::new();
                printer.error(&format!("Unknown option: {}", option));
                println!("{}", usage());
                process::exit(2);
            }
            _ => scripts.push(PathBuf::from(arg)),
        }
    }

    process::exit(run(ShellConfig::load(), &scripts));
}

/// Run the rc file, then the scripts or the interactive loop. Returns the exit status.
fn run(config: ShellConfig, scripts: &[PathBuf]) -> i32 {
    let printer = Printer::new();
    if let Some(bad) = scripts.iter().find(|path| !has_script_extension(path)) {
        printer.error(&format!("Expected a .{} file, got: {}", SCRIPT_EXTENSION, bad.display()));
        printer.info(&usage());
        return 1;
    }

    if let Err(e) = ctrlc::set_handler(|| process::exit(130)) {
        log::warn!("could not install the interrupt handler: {}", e);
    }

    let backend = LocalCluster::new(config.settle(), config.poll_interval());
    let registry = Arc::new(commands::registry());
    let mut session = Session::new(config, registry, Arc::new(backend), printer);

    let rc_file = session.config.rc_file.clone();
    if rc_file.exists() {
        match run_file(&mut session, &rc_file) {
            Flow::Finished => {}
            Flow::Exit(status) => return status,
        }
    }

    if scripts.is_empty() {
        return interactive(&mut session);
    }
    for script in scripts {
        if let Flow::Exit(status) = run_file(&mut session, script) {
            return status;
        }
    }
    0
}

fn run_file(session: &mut Session, path: &Path) -> Flow {
    match run_script(session, path) {
        Ok(flow) => flow,
        Err(e) => {
            session.printer.error(&e.to_string());
            Flow::Exit(1)
        }
    }
}

fn interactive(session: &mut Session) -> i32 {
    session.printer.line(&format!("gridsh version {}. Type \"help\" for commands.", VERSION));

    let flow = match Repl::new(session.config.history_file.clone(), session.config.history_size) {
        Ok(mut repl) => {
            let flow = evaluate(session, &mut repl);
            if let Err(e) = repl.save_history() {
                log::warn!("{}", e);
            }
            flow
        }
        Err(e) => {
            session.printer.warning(&format!("{}; falling back to basic input", e));
            evaluate(session, &mut ScriptSource::stdin())
        }
    };

    match flow {
        Flow::Finished => 0,
        Flow::Exit(status) => status,
    }
}
