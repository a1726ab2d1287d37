// File: src/core/engine.rs
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::core::args::resolve;
use crate::core::command::{dispatch, Reply, Wait};
use crate::core::config::{expand_path, has_script_extension, SCRIPT_EXTENSION};
use crate::core::error::ShellError;
use crate::core::session::Session;
use crate::core::watch::WaitOutcome;

/// Deepest `load` nesting before a script is refused.
pub const MAX_LOAD_DEPTH: usize = 10;

const CONTINUATION_PROMPT: &str = "> ";

pub enum Input {
    Line(String),
    Eof,
    Interrupted,
}

/// Where the evaluator reads commands from.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Input, ShellError>;
}

/// Lines from any reader: a script file, or stdin when no line editor is available.
pub struct ScriptSource {
    reader: Box<dyn BufRead>,
    show_prompt: bool,
}

impl ScriptSource {
    pub fn new(reader: impl BufRead + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            show_prompt: false,
        }
    }

    pub fn open(path: &Path) -> Result<Self, ShellError> {
        let file = File::open(path).map_err(|e| ShellError::Script {
            path: path.to_path_buf(),
            message: format!("Failed to open script ({})", e),
        })?;
        Ok(Self::new(BufReader::new(file)))
    }

    pub fn stdin() -> Self {
        Self {
            reader: Box::new(BufReader::new(io::stdin())),
            show_prompt: true,
        }
    }
}

impl LineSource for ScriptSource {
    fn read_line(&mut self, prompt: &str) -> Result<Input, ShellError> {
        if self.show_prompt {
            print!("{}", prompt);
            let _ = io::Write::flush(&mut io::stdout());
        }
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| ShellError::handler_with("Failed to read input", e))?;
        if read == 0 {
            return Ok(Input::Eof);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Input::Line(line))
    }
}

/// How a source finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Input exhausted; the caller moves on.
    Finished,
    Exit(i32),
}

/// Read-evaluate loop over one source. Per-command failures are printed and
/// evaluation goes on, unless exit-on-error mode is active.
pub fn evaluate(session: &mut Session, source: &mut dyn LineSource) -> Flow {
    loop {
        let prompt = session.prompt();
        let line = match source.read_line(&prompt) {
            Ok(Input::Line(line)) => line,
            Ok(Input::Eof) => return Flow::Finished,
            Ok(Input::Interrupted) => return Flow::Exit(130),
            Err(err) => {
                report(session, &err);
                return if session.modes.exit_on_error { Flow::Exit(1) } else { Flow::Finished };
            }
        };

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        session.history.record(line);

        match execute_line(session, source, line) {
            Ok(Some(status)) => return Flow::Exit(status),
            Ok(None) => {}
            Err(err) => {
                report(session, &err);
                if session.modes.exit_on_error {
                    return Flow::Exit(1);
                }
            }
        }
    }
}

fn report(session: &Session, err: &ShellError) {
    session.printer.error(&err.to_string());
    if let Some(cause) = err.cause_chain() {
        log::debug!("{}: caused by {}", err, cause);
    }
}

/// Run one command. `Some(status)` ends evaluation.
fn execute_line(session: &mut Session, source: &mut dyn LineSource, line: &str) -> Result<Option<i32>, ShellError> {
    let (name, params) = match line.find(char::is_whitespace) {
        Some(end) => (line[..end].to_lowercase(), line[end..].trim_start()),
        None => (line.to_lowercase(), ""),
    };

    match name.as_str() {
        "load" => return load(session, params),
        "history" => {
            if !params.is_empty() {
                return Err(ShellError::TooManyArguments);
            }
            for row in session.history.listing() {
                session.printer.line(&row);
            }
            return Ok(None);
        }
        _ => {}
    }

    let command = session.registry.lookup(&name)?;
    let params = if command.flags.multiline {
        match read_continuation(source, params)? {
            Some(text) => text,
            None => return Ok(Some(130)),
        }
    } else {
        params.to_string()
    };

    if session.modes.echo {
        session.printer.line(&format!("{} {}", command.name, params));
    }

    let args = resolve(&params, &command, &session.vars)?;
    match dispatch(&command, session, args)? {
        Reply::Done => {}
        Reply::Value(value) => {
            if !value.is_null() {
                session.printer.line(&value.render());
            }
        }
        Reply::Wait(wait) => {
            await_completion(session, wait)?;
        }
    }
    Ok(session.take_exit())
}

/// Collect lines until one ends with `;`. The lines are joined with `\n`
/// and the terminator dropped. `None` on interrupt.
fn read_continuation(source: &mut dyn LineSource, first: &str) -> Result<Option<String>, ShellError> {
    let mut text = first.to_string();
    while !text.ends_with(';') {
        match source.read_line(CONTINUATION_PROMPT)? {
            Input::Line(line) => {
                text.push('\n');
                text.push_str(&line);
            }
            Input::Eof => return Err(ShellError::UnexpectedEndOfInput),
            Input::Interrupted => return Ok(None),
        }
    }
    text.pop();
    Ok(Some(text))
}

/// Block on a handler's watcher and report how it ended.
pub fn await_completion(session: &mut Session, wait: Wait) -> Result<WaitOutcome, ShellError> {
    let Wait { mut watcher, timeout, waiting, completed, then } = wait;
    if let Some(message) = waiting {
        session.printer.info(&message);
    }

    if !watcher.wait_completion(timeout) {
        session.printer.info("Timed out waiting for the operation to complete");
        return Ok(WaitOutcome::TimedOut);
    }

    session.printer.success(&completed);
    if let Some(follow_up) = then {
        follow_up(session)?;
    }
    Ok(WaitOutcome::Completed)
}

/// `load [file]`: run another script in this session. Without a file the rc
/// file is loaded.
fn load(session: &mut Session, params: &str) -> Result<Option<i32>, ShellError> {
    let path = if params.is_empty() {
        session.config.rc_file.clone()
    } else {
        if params.split_whitespace().count() > 1 {
            return Err(ShellError::TooManyArguments);
        }
        let path = expand_path(params);
        if !has_script_extension(&path) {
            return Err(ShellError::Script {
                path,
                message: format!("Script file must have the .{} extension", SCRIPT_EXTENSION),
            });
        }
        path
    };
    run_script(session, &path).map(|flow| match flow {
        Flow::Finished => None,
        Flow::Exit(status) => Some(status),
    })
}

/// Evaluate a whole script file in this session.
pub fn run_script(session: &mut Session, path: &Path) -> Result<Flow, ShellError> {
    if session.load_depth >= MAX_LOAD_DEPTH {
        return Err(ShellError::Script {
            path: path.to_path_buf(),
            message: format!("Scripts are nested more than {} deep", MAX_LOAD_DEPTH),
        });
    }
    let mut source = ScriptSource::open(path)?;
    log::info!("loading script {}", path.display());

    session.load_depth += 1;
    let flow = evaluate(session, &mut source);
    session.load_depth -= 1;
    Ok(flow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    use crate::core::session::testing;
    use crate::core::types::Value;

    fn run(session: &mut Session, script: &str) -> Flow {
        let mut source = ScriptSource::new(Cursor::new(script.to_string()));
        evaluate(session, &mut source)
    }

    fn output(buffer: &std::sync::Mutex<String>) -> String {
        buffer.lock().unwrap().clone()
    }

    #[test]
    fn test_set_then_unset() {
        let (mut session, _, _) = testing::session();
        assert_eq!(run(&mut session, "set x hello\n"), Flow::Finished);
        assert_eq!(session.vars.get_str("x"), Some("hello"));

        run(&mut session, "set x\n");
        assert!(!session.vars.contains("x"));
    }

    #[test]
    fn test_command_names_are_case_insensitive() {
        let (mut session, _, out) = testing::session();
        run(&mut session, "SET x hello\nPrint $x\n");
        assert!(output(&out).contains("hello\n"));
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let (mut session, _, out) = testing::session();
        run(&mut session, "\n   \n# set x 1\n");
        assert!(!session.vars.contains("x"));
        assert!(output(&out).is_empty());
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_multiline_tql_joins_lines() {
        let (mut session, backend, out) = testing::session();
        run(
            &mut session,
            "setuser admin admin\n\
             setnode n1 10.0.0.1 10040\n\
             setcluster c1 prod FIXED_LIST 10.0.0.1:10001 $n1\n\
             connect $c1\n",
        );
        backend.force_status(&crate::core::cluster::ShellNode::new("n1", "10.0.0.1", 10040, None),
            crate::core::api::CombinedStatus::Servicing, Some("prod"));

        assert_eq!(run(&mut session, "tql c1\nselect * from t\nwhere x=1;\n"), Flow::Finished);
        let printed = output(&out);
        assert!(printed.contains("\"query\": \"select * from t\\nwhere x=1\""), "{}", printed);
    }

    #[test]
    fn test_unterminated_multiline_reports_end_of_input() {
        let (mut session, _, out) = testing::session();
        session.modes.exit_on_error = true;
        assert_eq!(run(&mut session, "tql c1\nselect * from t\n"), Flow::Exit(1));
        assert!(output(&out).contains("End of input reached"));
    }

    #[test]
    fn test_errors_continue_without_exit_on_error() {
        let (mut session, _, out) = testing::session();
        assert_eq!(run(&mut session, "nosuch\nset y 2\n"), Flow::Finished);
        assert!(output(&out).contains("Command not found: nosuch"));
        assert_eq!(session.vars.get_str("y"), Some("2"));
    }

    #[test]
    fn test_exit_on_error_stops_with_status_one() {
        let (mut session, _, _) = testing::session();
        assert_eq!(run(&mut session, "errexit on\nprint $missing\nset y 2\n"), Flow::Exit(1));
        assert!(!session.vars.contains("y"));
    }

    #[test]
    fn test_echo_prints_command_before_running() {
        let (mut session, _, out) = testing::session();
        run(&mut session, "echo on\nset z 5\n");
        assert!(output(&out).contains("set z 5\n"));
    }

    /// Replays a fixed sequence of inputs, then reports end of input.
    struct Scripted(std::collections::VecDeque<Input>);

    impl LineSource for Scripted {
        fn read_line(&mut self, _prompt: &str) -> Result<Input, ShellError> {
            Ok(self.0.pop_front().unwrap_or(Input::Eof))
        }
    }

    #[test]
    fn test_interrupt_at_prompt_exits_130() {
        let (mut session, _, _) = testing::session();
        let mut source = Scripted(vec![Input::Interrupted, Input::Line("set y 2".to_string())].into());
        assert_eq!(evaluate(&mut session, &mut source), Flow::Exit(130));
        assert!(!session.vars.contains("y"));
    }

    #[test]
    fn test_interrupt_during_continuation_exits_130() {
        let (mut session, _, _) = testing::session();
        let mut source = Scripted(vec![Input::Line("tql c1".to_string()), Input::Interrupted].into());
        assert_eq!(evaluate(&mut session, &mut source), Flow::Exit(130));
    }

    #[test]
    fn test_end_of_input_finishes() {
        let (mut session, _, _) = testing::session();
        let mut source = Scripted(vec![Input::Line("set y 2".to_string())].into());
        assert_eq!(evaluate(&mut session, &mut source), Flow::Finished);
        assert_eq!(session.vars.get_str("y"), Some("2"));
    }

    #[test]
    fn test_echo_applies_to_line_editor_input() {
        let (mut session, _, out) = testing::session();
        session.modes.echo = true;
        let mut source = Scripted(vec![Input::Line("set z 5".to_string())].into());
        evaluate(&mut session, &mut source);
        assert!(output(&out).contains("set z 5\n"));
    }

    #[test]
    fn test_quit_ends_evaluation() {
        let (mut session, _, _) = testing::session();
        assert_eq!(run(&mut session, "quit\nset y 2\n"), Flow::Exit(0));
        assert!(!session.vars.contains("y"));
    }

    #[test]
    fn test_history_rejects_arguments() {
        let (mut session, _, out) = testing::session();
        run(&mut session, "set a 1\nhistory\nhistory 3\n");
        let printed = output(&out);
        assert!(printed.contains("    1  set a 1\n"));
        assert!(printed.contains("Too many arguments"));
    }

    #[test]
    fn test_load_runs_script_in_same_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.GSH");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "setnode n1 10.0.0.1 10040").unwrap();
        writeln!(file, "set greeting hi").unwrap();

        let (mut session, _, _) = testing::session();
        run(&mut session, &format!("load {}\n", path.display()));
        assert!(matches!(session.vars.get("n1"), Some(Value::Node(_))));
        assert_eq!(session.vars.get_str("greeting"), Some("hi"));
    }

    #[test]
    fn test_load_checks_extension() {
        let (mut session, _, out) = testing::session();
        run(&mut session, "load setup.sh\n");
        assert!(output(&out).contains("must have the .gsh extension"));
    }

    #[test]
    fn test_self_loading_script_is_cut_off() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.gsh");
        std::fs::write(&path, format!("load {}\n", path.display())).unwrap();

        let (mut session, _, out) = testing::session();
        run(&mut session, &format!("load {}\n", path.display()));
        assert!(output(&out).contains("nested more than 10 deep"));
        assert_eq!(session.load_depth, 0);
    }

    #[test]
    fn test_wait_timeout_is_reported_not_failed() {
        let (mut session, backend, out) = testing::session();
        run(&mut session, "setuser admin admin\nsetnode n1 10.0.0.1 10040\nerrexit on\n");
        let node = crate::core::cluster::ShellNode::new("n1", "10.0.0.1", 10040, None);
        backend.force_status(&node, crate::core::api::CombinedStatus::Started, None);
        backend.set_unreachable(&node.key(), false);

        // Never settles: the node is made unreachable right after the request.
        let api = std::sync::Arc::clone(&session.api);
        let creds = session.credentials(false).unwrap();
        let watcher = api.stop_node(&node, &creds, false).unwrap();
        backend.set_unreachable(&node.key(), true);

        let wait = Wait::new(watcher, crate::core::watch::WaitTime::Seconds(1), "stopped");
        assert_eq!(await_completion(&mut session, wait).unwrap(), WaitOutcome::TimedOut);
        assert!(output(&out).contains("Timed out"));
    }
}
