use std::fmt::Write as _;
use std::fs;
use std::process::Command;
use std::thread;
use std::time::Duration;

use crate::core::cluster::{Endpoint, NotificationMode, ShellCluster, ShellNode};
use crate::core::command::{Args, CommandDescriptor, Reply};
use crate::core::config::{expand_path, has_script_extension, SCRIPT_EXTENSION};
use crate::core::env::{check_name, VariableStore};
use crate::core::error::ShellError;
use crate::core::session::{Session, VAR_OS_PASSWORD, VAR_PASSWORD, VAR_USER};
use crate::core::types::{ParamSpec, ParamType, Value};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const MODCLUSTER_OPS: &[&str] = &["ADD", "REMOVE"];
const SSL_MODES: &[&str] = &["DISABLED", "PREFERRED", "VERIFY"];
const MASK: &str = "*****";

pub fn commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("set", set)
            .params(&[
                ParamSpec::fixed("name", ParamType::Str),
                ParamSpec::optional("value", ParamType::Str),
            ])
            .assign_all()
            .summary("Set a variable to the rest of the line; without a value the variable is removed."),
        CommandDescriptor::new("setnode", setnode)
            .params(&[
                ParamSpec::fixed("name", ParamType::Str),
                ParamSpec::fixed("address", ParamType::Str),
                ParamSpec::fixed("port", ParamType::Int),
                ParamSpec::optional("sshPort", ParamType::Int),
            ])
            .summary("Define a node variable."),
        CommandDescriptor::new("setcluster", setcluster)
            .params(&[
                ParamSpec::fixed("name", ParamType::Str),
                ParamSpec::fixed("clusterName", ParamType::Str),
                ParamSpec::fixed("address|FIXED_LIST|PROVIDER", ParamType::Str),
                ParamSpec::fixed("port|members|url", ParamType::Str),
                ParamSpec::variadic("node", ParamType::Node),
            ])
            .summary("Define a cluster variable from node variables."),
        CommandDescriptor::new("setclustersql", setclustersql)
            .params(&[
                ParamSpec::fixed("name", ParamType::Str),
                ParamSpec::fixed("clusterName", ParamType::Str),
                ParamSpec::fixed("address|FIXED_LIST|PROVIDER", ParamType::Str),
                ParamSpec::fixed("port|members|url", ParamType::Str),
            ])
            .summary("Set the SQL endpoint of a cluster variable."),
        CommandDescriptor::new("modcluster", modcluster)
            .params(&[
                ParamSpec::fixed("cluster", ParamType::Cluster),
                ParamSpec::fixed("operation", ParamType::Enum(MODCLUSTER_OPS)),
                ParamSpec::variadic("node", ParamType::Node),
            ])
            .summary("Add nodes to or remove nodes from a cluster variable."),
        CommandDescriptor::new("setuser", setuser)
            .params(&[
                ParamSpec::fixed("user", ParamType::Str),
                ParamSpec::fixed("password", ParamType::Str),
                ParamSpec::optional("osPassword", ParamType::Str),
            ])
            .summary("Set the credentials used for cluster operations."),
        CommandDescriptor::new("show", show)
            .params(&[ParamSpec::optional("name", ParamType::Str)])
            .summary("Show one variable, or all of them."),
        CommandDescriptor::new("help", help)
            .params(&[ParamSpec::optional("command", ParamType::Str)])
            .summary("List commands, or describe one. \"help all\" describes every command."),
        CommandDescriptor::new("version", version).summary("Show the shell version."),
        CommandDescriptor::new("quit", quit).summary("Leave the shell."),
        CommandDescriptor::new("exit", quit).summary("Leave the shell."),
        CommandDescriptor::new("save", save)
            .params(&[ParamSpec::optional("file", ParamType::Str)])
            .summary("Write the variable definitions to a script (default: the rc file)."),
        CommandDescriptor::new("load", builtin)
            .params(&[ParamSpec::optional("file", ParamType::Str)])
            .summary("Run a script in this session (default: the rc file)."),
        CommandDescriptor::new("history", builtin).summary("List the commands entered in this session."),
        CommandDescriptor::new("errexit", errexit)
            .params(&[ParamSpec::fixed("enable", ParamType::Bool)])
            .summary("Exit with status 1 at the first failing command."),
        CommandDescriptor::new("echo", echo)
            .params(&[ParamSpec::fixed("enable", ParamType::Bool)])
            .summary("Print each script command before it runs."),
        CommandDescriptor::new("sqlcount", sqlcount)
            .params(&[ParamSpec::fixed("enable", ParamType::Bool)])
            .summary("Ask queries for a row count."),
        CommandDescriptor::new("print", print)
            .params(&[ParamSpec::fixed("text", ParamType::Str)])
            .assign_all()
            .summary("Print the rest of the line."),
        CommandDescriptor::new("exec", exec)
            .params(&[
                ParamSpec::fixed("program", ParamType::Str),
                ParamSpec::optional("arguments", ParamType::Str),
            ])
            .assign_all()
            .summary("Run an external program and show its output."),
        CommandDescriptor::new("sleep", sleep)
            .params(&[ParamSpec::fixed("seconds", ParamType::Double)])
            .summary("Pause for the given number of seconds."),
        CommandDescriptor::new("setsslmode", setsslmode)
            .params(&[ParamSpec::optional("mode", ParamType::Enum(SSL_MODES))])
            .summary("Set or show the SSL mode used for connections."),
        CommandDescriptor::new("maintenance", maintenance)
            .params(&[ParamSpec::fixed("enable", ParamType::Bool)])
            .hidden(),
    ]
}

fn set(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let name = args.str(0)?;
    check_name(name)?;
    match args.opt_str(1)? {
        Some(value) => session.vars.set(name, Value::Str(value.to_string()))?,
        None => {
            session.vars.remove(name);
        }
    }
    Ok(Reply::Done)
}

fn port(value: i32, what: &str) -> Result<u16, ShellError> {
    u16::try_from(value)
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| ShellError::handler(format!("{} is out of range: port=[{}]", what, value)))
}

fn setnode(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let name = args.str(0)?;
    check_name(name)?;
    let port_number = port(args.int(2)?, "Port")?;
    let ssh_port = args.opt_int(3)?.map(|p| port(p, "SSH port")).transpose()?;

    let node = ShellNode::new(name, args.str(1)?, port_number, ssh_port);
    session.vars.set(name, Value::Node(node))?;
    Ok(Reply::Done)
}

fn setcluster(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let variable = args.str(0)?;
    check_name(variable)?;
    let name = args.str(1)?;
    let (value1, value2) = (args.str(2)?, args.str(3)?);
    let mode = NotificationMode::from_keyword(value1);

    let mut cluster = ShellCluster::new(variable, name, mode);
    cluster.transaction = Some(ShellCluster::endpoint(mode, value1, value2)?);
    cluster.nodes = args.nodes(4)?;
    cluster.check_nodes()?;

    // A redefinition of the same cluster keeps its SQL endpoint.
    if let Some(Value::Cluster(previous)) = session.vars.get(variable) {
        if previous.name == cluster.name && previous.mode == cluster.mode {
            cluster.sql = previous.sql.clone();
        }
    }
    session.vars.set(variable, Value::Cluster(cluster))?;
    Ok(Reply::Done)
}

fn setclustersql(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let variable = args.str(0)?;
    check_name(variable)?;
    let name = args.str(1)?;
    let (value1, value2) = (args.str(2)?, args.str(3)?);
    let mode = NotificationMode::from_keyword(value1);
    let endpoint = ShellCluster::endpoint(mode, value1, value2)?;

    let mut cluster = match session.vars.get(variable) {
        None => ShellCluster::new(variable, name, mode),
        Some(Value::Cluster(existing)) => {
            if existing.name != name {
                return Err(ShellError::handler(format!(
                    "Cluster name does not match ${}: expected=[{}] given=[{}]",
                    variable, existing.name, name
                )));
            }
            if existing.mode != mode {
                return Err(ShellError::handler(format!(
                    "Notification mode does not match ${}: expected=[{}] given=[{}]",
                    variable,
                    existing.mode.keyword(),
                    mode.keyword()
                )));
            }
            existing.clone()
        }
        Some(_) => {
            return Err(ShellError::handler(format!("${} is not a cluster variable", variable)));
        }
    };
    cluster.sql = Some(endpoint);
    session.vars.set(variable, Value::Cluster(cluster))?;
    Ok(Reply::Done)
}

fn modcluster(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let mut cluster = args.cluster(0)?.clone();
    let nodes = args.nodes(2)?;
    if nodes.is_empty() {
        return Err(ShellError::MissingArgument("node".to_string()));
    }

    match args.str(1)? {
        "ADD" => {
            for node in nodes {
                match cluster.nodes.iter().find(|member| member.key() == node.key()) {
                    Some(member) if member.name != node.name => session.printer.warning(&format!(
                        "${} has the same address as ${}; not added",
                        node.name, member.name
                    )),
                    Some(_) => {}
                    None => cluster.nodes.push(node),
                }
            }
        }
        _ => cluster
            .nodes
            .retain(|member| !nodes.iter().any(|node| node.name == member.name)),
    }

    let variable = cluster.variable.clone();
    session.vars.set(&variable, Value::Cluster(cluster))?;
    Ok(Reply::Done)
}

fn setuser(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    session.vars.set(VAR_USER, Value::Str(args.str(0)?.to_string()))?;
    session.vars.set(VAR_PASSWORD, Value::Str(args.str(1)?.to_string()))?;
    match args.opt_str(2)? {
        Some(os_password) => session.vars.set(VAR_OS_PASSWORD, Value::Str(os_password.to_string()))?,
        None => {
            session.vars.remove(VAR_OS_PASSWORD);
        }
    }
    Ok(Reply::Done)
}

fn shown(name: &str, value: &Value) -> String {
    if name == VAR_PASSWORD || name == VAR_OS_PASSWORD {
        MASK.to_string()
    } else {
        value.to_string()
    }
}

fn show(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    if let Some(raw) = args.opt_str(0)? {
        let name = raw.strip_prefix('$').unwrap_or(raw);
        let value = session.vars.get(name)
            .ok_or_else(|| ShellError::UndefinedVariable(name.to_string()))?;
        return Ok(Reply::Value(Value::Str(shown(name, value))));
    }

    let mut nodes = Vec::new();
    let mut clusters = Vec::new();
    let mut others = Vec::new();
    for (name, value) in session.vars.sorted() {
        let row = format!("  {}={}", name, shown(name, value));
        match value {
            Value::Node(_) => nodes.push(row),
            Value::Cluster(_) => clusters.push(row),
            _ => others.push(row),
        }
    }

    let mut text = String::new();
    for (title, rows) in [("Node variables:", nodes), ("Cluster variables:", clusters), ("Other variables:", others)] {
        if rows.is_empty() {
            continue;
        }
        let _ = writeln!(text, "{}", title);
        for row in rows {
            let _ = writeln!(text, "{}", row);
        }
    }
    if session.modes.maintenance {
        let _ = writeln!(text, "Modes: {:?}", session.modes);
    }
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(Reply::Value(Value::Str(text)))
}

fn help(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let registry = std::sync::Arc::clone(&session.registry);
    let printer = &session.printer;

    match args.opt_str(0)? {
        None => {
            for (group, commands) in registry.groups() {
                let names: Vec<&str> = commands
                    .iter()
                    .filter(|c| !c.flags.hidden)
                    .map(|c| c.name.as_str())
                    .collect();
                if names.is_empty() {
                    continue;
                }
                printer.header(group);
                for row in names.chunks(6) {
                    printer.line(&format!("  {}", row.join("  ")));
                }
            }
            printer.line("");
            printer.line("Type \"help <command>\" for details, \"help all\" for every command.");
        }
        Some(name) if name.eq_ignore_ascii_case("all") => {
            for command in registry.commands().filter(|c| !c.flags.hidden) {
                printer.line(&command.syntax());
                printer.line(&format!("    {}", command.summary));
            }
        }
        Some(name) => {
            let command = registry.lookup(name)?;
            printer.line(&command.syntax());
            if !command.summary.is_empty() {
                printer.line(&format!("    {}", command.summary));
            }
        }
    }
    Ok(Reply::Done)
}

fn version(_session: &mut Session, _args: &Args) -> Result<Reply, ShellError> {
    Ok(Reply::Value(Value::Str(format!("gridsh version {}", VERSION))))
}

fn quit(session: &mut Session, _args: &Args) -> Result<Reply, ShellError> {
    session.request_exit(0);
    Ok(Reply::Done)
}

fn builtin(_session: &mut Session, _args: &Args) -> Result<Reply, ShellError> {
    Err(ShellError::Internal("handled by the evaluator".to_string()))
}

fn endpoint_args(endpoint: &Endpoint) -> String {
    match endpoint {
        Endpoint::Address { address, port } => format!("{} {}", address, port),
        Endpoint::Member(members) => format!("{} {}", NotificationMode::FixedList.keyword(), members),
        Endpoint::Provider(url) => format!("{} {}", NotificationMode::Provider.keyword(), url),
    }
}

/// The variables as a script that recreates them. Credentials are left out.
pub fn render_definitions(vars: &VariableStore) -> String {
    let mut nodes = Vec::new();
    let mut strings = Vec::new();
    let mut clusters = Vec::new();

    for (name, value) in vars.sorted() {
        match value {
            Value::Node(node) => nodes.push(format!(
                "setnode {} {} {} {}",
                name, node.address, node.port, node.ssh_port
            )),
            Value::Str(s) if ![VAR_USER, VAR_PASSWORD, VAR_OS_PASSWORD].contains(&name) => {
                strings.push(format!("set {} {}", name, s))
            }
            Value::Cluster(cluster) => {
                if let Some(ref transaction) = cluster.transaction {
                    let mut line = format!("setcluster {} {} {}", name, cluster.name, endpoint_args(transaction));
                    for node in &cluster.nodes {
                        let _ = write!(line, " ${}", node.name);
                    }
                    clusters.push(line);
                }
                if let Some(ref sql) = cluster.sql {
                    clusters.push(format!("setclustersql {} {} {}", name, cluster.name, endpoint_args(sql)));
                }
            }
            _ => {}
        }
    }

    let mut script = String::new();
    for line in nodes.into_iter().chain(strings).chain(clusters) {
        script.push_str(&line);
        script.push('\n');
    }
    script
}

fn save(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let path = match args.opt_str(0)? {
        Some(raw) => {
            let path = expand_path(raw);
            if !has_script_extension(&path) {
                return Err(ShellError::Script {
                    path,
                    message: format!("Script file must have the .{} extension", SCRIPT_EXTENSION),
                });
            }
            path
        }
        None => session.config.rc_file.clone(),
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(ShellError::Script {
                path: path.clone(),
                message: "Directory does not exist".to_string(),
            });
        }
    }

    let script = render_definitions(&session.vars);
    fs::write(&path, &script)
        .map_err(|e| ShellError::handler_with(format!("Failed to write {}", path.display()), e))?;
    session.printer.success(&format!("Saved {} definition(s) to {}", script.lines().count(), path.display()));
    Ok(Reply::Done)
}

fn errexit(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    session.modes.exit_on_error = args.bool(0)?;
    Ok(Reply::Done)
}

fn echo(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    session.modes.echo = args.bool(0)?;
    Ok(Reply::Done)
}

fn sqlcount(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    session.modes.sql_count = args.bool(0)?;
    Ok(Reply::Done)
}

fn maintenance(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    session.modes.maintenance = args.bool(0)?;
    Ok(Reply::Done)
}

fn print(_session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    Ok(Reply::Value(Value::Str(args.str(0)?.to_string())))
}

fn exec(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let program = args.str(0)?;
    if program == "cd" {
        return Err(ShellError::handler("cd cannot be run through exec"));
    }
    let arguments: Vec<&str> = args.opt_str(1)?.map(|a| a.split_whitespace().collect()).unwrap_or_default();

    log::debug!("exec {} {:?}", program, arguments);
    let output = Command::new(program)
        .args(&arguments)
        .output()
        .map_err(|e| ShellError::handler_with(format!("Failed to run {}", program), e))?;

    for stream in [&output.stdout, &output.stderr] {
        let text = String::from_utf8_lossy(stream);
        for line in text.lines() {
            session.printer.line(line);
        }
    }
    if !output.status.success() {
        return Err(ShellError::handler(format!(
            "{} exited with {}",
            program,
            output.status.code().map_or_else(|| "a signal".to_string(), |c| format!("status {}", c))
        )));
    }
    Ok(Reply::Done)
}

fn sleep(_session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let seconds = args.double(0)?;
    if seconds > 0.0 {
        let pause = Duration::try_from_secs_f64(seconds)
            .map_err(|e| ShellError::handler_with(format!("Invalid sleep time: {}", seconds), e))?;
        thread::sleep(pause);
    }
    Ok(Reply::Done)
}

fn setsslmode(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    match args.opt_str(0)? {
        Some(mode) => {
            session.ssl_mode = mode.to_string();
            Ok(Reply::Done)
        }
        None => Ok(Reply::Value(Value::Str(session.ssl_mode.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::core::engine::{evaluate, Flow, ScriptSource};
    use crate::core::session::testing;

    fn run(session: &mut Session, script: &str) -> Flow {
        evaluate(session, &mut ScriptSource::new(Cursor::new(script.to_string())))
    }

    fn output(buffer: &std::sync::Mutex<String>) -> String {
        buffer.lock().unwrap().clone()
    }

    const NODES: &str = "setnode n1 10.0.0.1 10040\nsetnode n2 10.0.0.2 10040\nsetnode n3 10.0.0.3 10040 2222\n";

    #[test]
    fn test_setnode_validates_port() {
        let (mut session, _, out) = testing::session();
        run(&mut session, "setnode n1 10.0.0.1 70000\nsetnode n2 10.0.0.2 abc\n");
        let printed = output(&out);
        assert!(printed.contains("Port is out of range"));
        assert!(printed.contains("expectedType=[int]"));
        assert!(session.vars.is_empty());
    }

    #[test]
    fn test_setcluster_collects_nodes() {
        let (mut session, _, _) = testing::session();
        run(&mut session, &format!("{}setcluster c1 prod 239.0.0.1 31999 $n1 $n2\n", NODES));
        match session.vars.get("c1") {
            Some(Value::Cluster(cluster)) => {
                assert_eq!(cluster.mode, NotificationMode::Multicast);
                assert_eq!(cluster.nodes.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_setcluster_rejects_duplicate_address() {
        let (mut session, _, out) = testing::session();
        run(&mut session, "setnode a 10.0.0.1 10040\nsetnode b 10.0.0.1 10040\nsetcluster c1 prod FIXED_LIST x $a $b\n");
        assert!(output(&out).contains("defined more than once"));
        assert!(!session.vars.contains("c1"));
    }

    #[test]
    fn test_setclustersql_checks_existing_cluster() {
        let (mut session, _, out) = testing::session();
        run(
            &mut session,
            &format!(
                "{}setcluster c1 prod FIXED_LIST m1 $n1\nsetclustersql c1 other FIXED_LIST m2\nsetclustersql c1 prod FIXED_LIST m2\n",
                NODES
            ),
        );
        assert!(output(&out).contains("Cluster name does not match"));
        match session.vars.get("c1") {
            Some(Value::Cluster(cluster)) => assert_eq!(cluster.sql, Some(Endpoint::Member("m2".to_string()))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_modcluster_add_and_remove() {
        let (mut session, _, _) = testing::session();
        run(
            &mut session,
            &format!("{}setcluster c1 prod FIXED_LIST m $n1\nmodcluster $c1 add $n2 $n3\nmodcluster $c1 REMOVE $n1\n", NODES),
        );
        match session.vars.get("c1") {
            Some(Value::Cluster(cluster)) => {
                let names: Vec<&str> = cluster.nodes.iter().map(|n| n.name.as_str()).collect();
                assert_eq!(names, vec!["n2", "n3"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_show_masks_passwords() {
        let (mut session, _, out) = testing::session();
        run(&mut session, "setuser admin secret\nshow password\nshow\n");
        let printed = output(&out);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("  user=admin"));
        assert!(printed.contains(MASK));
    }

    #[test]
    fn test_show_accepts_dollar_name() {
        let (mut session, _, out) = testing::session();
        run(&mut session, "set x 42\nshow $x\n");
        assert!(output(&out).ends_with("42\n"));
    }

    #[test]
    fn test_print_keeps_rest_of_line() {
        let (mut session, _, out) = testing::session();
        run(&mut session, "print hello   big   world\n");
        assert_eq!(output(&out), "hello   big   world\n");
    }

    #[test]
    fn test_help_hides_hidden_commands() {
        let (mut session, _, out) = testing::session();
        run(&mut session, "help\n");
        let printed = output(&out);
        assert!(printed.contains("setcluster"));
        assert!(!printed.contains("maintenance"));

        run(&mut session, "help nosuch\n");
        assert!(output(&out).contains("Command not found: nosuch"));
    }

    #[test]
    fn test_save_then_load_restores_definitions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defs.gsh");

        let (mut session, _, _) = testing::session();
        run(
            &mut session,
            &format!(
                "{}set greeting hello world\nsetuser admin secret\nsetcluster c1 prod FIXED_LIST m $n1 $n2\nsetclustersql c1 prod FIXED_LIST q\nsave {}\n",
                NODES,
                path.display()
            ),
        );
        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.contains("setnode n3 10.0.0.3 10040 2222\n"));
        assert!(saved.contains("setcluster c1 prod FIXED_LIST m $n1 $n2\n"));
        assert!(!saved.contains("secret"));

        let (mut restored, _, _) = testing::session();
        run(&mut restored, &format!("load {}\n", path.display()));
        assert_eq!(restored.vars.get("c1"), session.vars.get("c1"));
        assert_eq!(restored.vars.get_str("greeting"), Some("hello world"));
    }

    #[test]
    fn test_sslmode_is_canonicalised() {
        let (mut session, _, _) = testing::session();
        run(&mut session, "setsslmode verify\n");
        assert_eq!(session.ssl_mode, "VERIFY");
    }

    #[test]
    fn test_sleep_out_of_range_is_an_error() {
        let (mut session, _, out) = testing::session();
        assert_eq!(run(&mut session, "sleep 1e300\nset y 2\n"), Flow::Finished);
        assert!(output(&out).contains("Invalid sleep time"));
        assert_eq!(session.vars.get_str("y"), Some("2"));

        assert_eq!(run(&mut session, "errexit on\nsleep inf\nset z 3\n"), Flow::Exit(1));
        assert!(!session.vars.contains("z"));
    }

    #[test]
    fn test_version() {
        let (mut session, _, out) = testing::session();
        run(&mut session, "version\n");
        assert_eq!(output(&out), format!("gridsh version {}\n", VERSION));
    }
}
