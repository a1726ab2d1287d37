use std::sync::Arc;

use crate::commands::wait_time;
use crate::core::api::{ApiError, ClusterApi};
use crate::core::cluster::{ShellCluster, ShellNode};
use crate::core::command::{Args, CommandDescriptor, Reply, Wait};
use crate::core::error::ShellError;
use crate::core::pool::run_bounded;
use crate::core::session::Session;
use crate::core::types::{ParamSpec, ParamType, Value};
use crate::core::watch::{CompositeWatcher, Watcher};
use crate::output::Printer;

const NODES: ParamType = ParamType::Array(&ParamType::Node);
const WAIT: ParamSpec = ParamSpec::optional("waitTime", ParamType::Int);

pub fn commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("startnode", startnode)
            .params(&[ParamSpec::fixed("node", NODES), WAIT])
            .summary("Start one node, or every node of a cluster, and wait until they are up."),
        CommandDescriptor::new("stopnode", stopnode)
            .params(&[ParamSpec::fixed("node", NODES), WAIT])
            .summary("Stop nodes that have left their cluster."),
        CommandDescriptor::new("stopnodeforce", stopnodeforce)
            .params(&[ParamSpec::fixed("node", NODES), WAIT])
            .summary("Stop nodes even while they are cluster members."),
        CommandDescriptor::new("startcluster", startcluster)
            .params(&[ParamSpec::fixed("cluster", ParamType::Cluster), WAIT])
            .summary("Form the cluster from its started nodes."),
        CommandDescriptor::new("stopcluster", stopcluster)
            .params(&[ParamSpec::fixed("cluster", ParamType::Cluster), WAIT])
            .summary("Take every member out of the cluster."),
        CommandDescriptor::new("joincluster", joincluster)
            .params(&[
                ParamSpec::fixed("cluster", ParamType::Cluster),
                ParamSpec::fixed("node", ParamType::Node),
                WAIT,
            ])
            .summary("Have a started node join a cluster it is defined in."),
        CommandDescriptor::new("leavecluster", leavecluster)
            .params(&[ParamSpec::fixed("node", ParamType::Node), WAIT])
            .summary("Take a node out of its cluster."),
        CommandDescriptor::new("leaveclusterforce", leaveclusterforce)
            .params(&[ParamSpec::fixed("node", ParamType::Node), WAIT])
            .summary("Take a node out of its cluster even if it is the last member."),
        CommandDescriptor::new("appendcluster", appendcluster)
            .params(&[
                ParamSpec::fixed("cluster", ParamType::Cluster),
                ParamSpec::fixed("node", ParamType::Node),
                WAIT,
            ])
            .summary("Add a started node to a running cluster and to the cluster variable."),
        CommandDescriptor::new("stat", stat)
            .params(&[ParamSpec::fixed("node", ParamType::Node)])
            .summary("Show the status of a node."),
        CommandDescriptor::new("config", config)
            .params(&[ParamSpec::fixed("node", ParamType::Node)])
            .summary("Show the configuration of a node."),
        CommandDescriptor::new("configcluster", configcluster)
            .params(&[ParamSpec::fixed("cluster", ParamType::Cluster)])
            .summary("Show the status of every member of a cluster."),
    ]
}

fn nodes_arg(args: &Args) -> Result<Vec<ShellNode>, ShellError> {
    let nodes = args.nodes(0)?;
    if nodes.is_empty() {
        return Err(ShellError::handler("No node is specified"));
    }
    Ok(nodes)
}

fn require_members(cluster: &ShellCluster) -> Result<(), ShellError> {
    if cluster.nodes.is_empty() {
        return Err(ShellError::InvalidCluster {
            cluster: cluster.variable.clone(),
            reason: "it has no nodes".to_string(),
        });
    }
    Ok(())
}

/// Run `op` on every node through the worker pool and keep the watchers.
/// Anything short of every node succeeding is an error, reported before
/// any waiting starts.
fn fan_out<F>(session: &Session, nodes: Vec<ShellNode>, verb: &str, op: F) -> Result<Vec<Box<dyn Watcher>>, ShellError>
where
    F: Fn(&dyn ClusterApi, &ShellNode) -> Result<Box<dyn Watcher>, ApiError> + Sync,
{
    let requested = nodes.len();
    let api: &dyn ClusterApi = session.api.as_ref();
    let printer: &Printer = &session.printer;

    let results = run_bounded(nodes, session.config.worker_threads, |node| {
        printer.info(&format!("{} node ${} ({})", verb, node.name, node.key()));
        op(api, &node).map_err(|e| {
            printer.error(&format!("${}: {}", node.name, e));
            log::error!("{} {} failed: {}", verb, node.key(), e);
            e
        })
    });

    let watchers: Vec<Box<dyn Watcher>> = results.into_iter().filter_map(Result::ok).collect();
    if watchers.len() < requested {
        return Err(ShellError::handler(format!(
            "{} of {} node(s) could not be processed",
            requested - watchers.len(),
            requested
        )));
    }
    Ok(watchers)
}

fn startnode(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let nodes = nodes_arg(args)?;
    let timeout = wait_time(args, 1)?;
    let creds = session.credentials(true)?;

    let watchers = fan_out(session, nodes, "Starting", |api, node| api.start_node(node, &creds))?;
    let wait = Wait::new(Box::new(CompositeWatcher::new(watchers)), timeout, "The node(s) have been started.")
        .waiting("Waiting for the node(s) to start...");
    Ok(Reply::wait(wait))
}

fn stop_nodes(session: &mut Session, args: &Args, force: bool) -> Result<Reply, ShellError> {
    let nodes = nodes_arg(args)?;
    let timeout = wait_time(args, 1)?;
    let creds = session.credentials(false)?;

    let watchers = fan_out(session, nodes, "Stopping", |api, node| api.stop_node(node, &creds, force))?;
    let wait = Wait::new(Box::new(CompositeWatcher::new(watchers)), timeout, "The node(s) have been stopped.")
        .waiting("Waiting for the node(s) to stop...");
    Ok(Reply::wait(wait))
}

fn stopnode(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    stop_nodes(session, args, false)
}

fn stopnodeforce(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    stop_nodes(session, args, true)
}

fn startcluster(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let cluster = args.cluster(0)?;
    require_members(cluster)?;
    let timeout = wait_time(args, 1)?;
    let creds = session.credentials(false)?;

    let watchers = session.api.start_cluster(cluster, &creds)?;
    let wait = Wait::new(
        Box::new(CompositeWatcher::new(watchers)),
        timeout,
        format!("Cluster {} has been started.", cluster.name),
    )
    .waiting(format!("Waiting for cluster {} to start...", cluster.name));
    Ok(Reply::wait(wait))
}

fn stopcluster(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let cluster = args.cluster(0)?;
    require_members(cluster)?;
    let timeout = wait_time(args, 1)?;
    let creds = session.credentials(false)?;

    let watchers = session.api.stop_cluster(cluster, &creds)?;
    let wait = Wait::new(
        Box::new(CompositeWatcher::new(watchers)),
        timeout,
        format!("Cluster {} has been stopped.", cluster.name),
    )
    .waiting(format!("Waiting for cluster {} to stop...", cluster.name));
    Ok(Reply::wait(wait))
}

fn joincluster(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let cluster = args.cluster(0)?;
    let node = args.node(1)?;
    let timeout = wait_time(args, 2)?;
    if !cluster.contains(node) {
        return Err(ShellError::handler(format!(
            "${} is not defined in ${}",
            node.name, cluster.variable
        )));
    }
    let creds = session.credentials(false)?;

    match session.api.join_cluster(cluster, node, &creds)? {
        None => {
            session.printer.info(&format!("${} is already a member of {}", node.name, cluster.name));
            Ok(Reply::Done)
        }
        Some(watcher) => Ok(Reply::wait(
            Wait::new(watcher, timeout, format!("${} has joined {}.", node.name, cluster.name))
                .waiting(format!("Waiting for ${} to join {}...", node.name, cluster.name)),
        )),
    }
}

fn leave(session: &mut Session, args: &Args, force: bool) -> Result<Reply, ShellError> {
    let node = args.node(0)?;
    let timeout = wait_time(args, 1)?;
    let creds = session.credentials(false)?;

    match session.api.leave_cluster(node, &creds, force)? {
        None => {
            session.printer.info(&format!("${} is not a member of any cluster", node.name));
            Ok(Reply::Done)
        }
        Some(watcher) => Ok(Reply::wait(
            Wait::new(watcher, timeout, format!("${} has left its cluster.", node.name))
                .waiting(format!("Waiting for ${} to leave its cluster...", node.name)),
        )),
    }
}

fn leavecluster(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    leave(session, args, false)
}

fn leaveclusterforce(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    leave(session, args, true)
}

fn appendcluster(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let cluster = args.cluster(0)?;
    let node = args.node(1)?;
    let timeout = wait_time(args, 2)?;
    require_members(cluster)?;
    if cluster.contains(node) {
        return Err(ShellError::handler(format!(
            "${} is already defined in ${}",
            node.name, cluster.variable
        )));
    }
    let creds = session.credentials(false)?;
    let watcher = session.api.append_cluster(cluster, node, &creds)?;

    let variable = cluster.variable.clone();
    let added = node.clone();
    let wait = Wait::new(watcher, timeout, format!("${} has been appended to {}.", node.name, cluster.name))
        .waiting(format!("Waiting for ${} to join {}...", node.name, cluster.name))
        .then(Box::new(move |session: &mut Session| {
            let mut cluster = match session.vars.get(&variable) {
                Some(Value::Cluster(cluster)) => cluster.clone(),
                _ => return Err(ShellError::UndefinedVariable(variable)),
            };
            if !cluster.contains(&added) {
                cluster.nodes.push(added);
            }
            session.printer.line(&format!("{}={}", variable, cluster));
            session.vars.set(&variable, Value::Cluster(cluster))
        }));
    Ok(Reply::wait(wait))
}

fn stat(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let creds = session.credentials(false)?;
    let status = session.api.stat(args.node(0)?, &creds)?;
    Ok(Reply::Value(Value::Json(status)))
}

fn config(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let creds = session.credentials(false)?;
    let config = session.api.config(args.node(0)?, &creds)?;
    Ok(Reply::Value(Value::Json(config)))
}

fn configcluster(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let cluster = args.cluster(0)?;
    let api: Arc<dyn ClusterApi> = Arc::clone(&session.api);

    let statuses = run_bounded(cluster.nodes.clone(), session.config.worker_threads, |node| {
        let status = match api.get_status(&node) {
            Ok(snapshot) => snapshot.status.label().to_string(),
            Err(e) => format!("UNREACHABLE ({})", e),
        };
        format!("  ${} {} {}", node.name, node.key(), status)
    });

    let mut text = format!("Name: {}\nMode: {}", cluster.name, cluster.mode.keyword());
    for row in statuses {
        text.push('\n');
        text.push_str(&row);
    }
    Ok(Reply::Value(Value::Str(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::core::api::CombinedStatus;
    use crate::core::engine::{evaluate, Flow, ScriptSource};
    use crate::core::local::LocalCluster;
    use crate::core::session::testing;

    const SETUP: &str = "setuser admin admin root\n\
                         setnode n1 10.0.0.1 10040\n\
                         setnode n2 10.0.0.2 10040\n\
                         setnode n3 10.0.0.3 10040\n\
                         setcluster c1 prod FIXED_LIST m $n1 $n2\n";

    fn run(session: &mut Session, script: &str) -> Flow {
        evaluate(session, &mut ScriptSource::new(Cursor::new(script.to_string())))
    }

    fn output(buffer: &std::sync::Mutex<String>) -> String {
        buffer.lock().unwrap().clone()
    }

    fn status(backend: &LocalCluster, n: u8) -> CombinedStatus {
        let node = ShellNode::new(&format!("n{}", n), &format!("10.0.0.{}", n), 10040, None);
        backend.get_status(&node).unwrap().status
    }

    #[test]
    fn test_startnode_over_cluster_waits_for_all() {
        let (mut session, backend, out) = testing::session();
        run(&mut session, SETUP);
        assert_eq!(run(&mut session, "startnode $c1 5\n"), Flow::Finished);

        assert_eq!(status(&backend, 1), CombinedStatus::Started);
        assert_eq!(status(&backend, 2), CombinedStatus::Started);
        assert!(output(&out).contains("The node(s) have been started."));
    }

    #[test]
    fn test_startnode_partial_failure_skips_wait() {
        let (mut session, backend, out) = testing::session();
        run(&mut session, SETUP);
        backend.set_unreachable("10.0.0.2:10040", true);

        run(&mut session, "startnode $c1\n");
        let printed = output(&out);
        assert!(printed.contains("1 of 2 node(s) could not be processed"));
        assert!(!printed.contains("Waiting for the node(s)"));
    }

    #[test]
    fn test_negative_wait_returns_immediately() {
        let (mut session, backend, out) = testing::session();
        run(&mut session, SETUP);
        run(&mut session, "startnode $n3 -1\n");
        assert_ne!(status(&backend, 3), CombinedStatus::Stopped);
        assert!(!output(&out).contains("have been started"));
    }

    #[test]
    fn test_commands_need_credentials() {
        let (mut session, _, out) = testing::session();
        run(&mut session, "setnode n1 10.0.0.1 10040\nstartnode $n1\n");
        assert!(output(&out).contains("User is not set"));
    }

    #[test]
    fn test_startnode_needs_os_password() {
        let (mut session, backend, out) = testing::session();
        run(&mut session, "setuser admin admin\nsetnode n1 10.0.0.1 10040\nstartnode $n1 5\n");
        let printed = output(&out);
        assert!(printed.contains("OS password is not set"), "{}", printed);
        assert!(!printed.contains("have been started"));
        assert_eq!(status(&backend, 1), CombinedStatus::Stopped);
    }

    #[test]
    fn test_cluster_round_trip() {
        let (mut session, backend, out) = testing::session();
        run(&mut session, SETUP);
        run(&mut session, "startnode $c1\nstartcluster $c1\n");
        assert_eq!(status(&backend, 1), CombinedStatus::Servicing);

        run(&mut session, "startnode $n3\nappendcluster $c1 $n3\n");
        assert_eq!(status(&backend, 3), CombinedStatus::Servicing);
        match session.vars.get("c1") {
            Some(Value::Cluster(cluster)) => assert_eq!(cluster.nodes.len(), 3),
            other => panic!("unexpected {:?}", other),
        }

        run(&mut session, "stopnode $n1\n");
        assert!(output(&out).contains("could not be processed"));

        run(&mut session, "stopcluster $c1\nstopnode $c1\n");
        assert_eq!(status(&backend, 1), CombinedStatus::Stopped);
    }

    #[test]
    fn test_joincluster_requires_membership() {
        let (mut session, _, out) = testing::session();
        run(&mut session, SETUP);
        run(&mut session, "joincluster $c1 $n3\n");
        assert!(output(&out).contains("$n3 is not defined in $c1"));
    }

    #[test]
    fn test_stat_prints_json() {
        let (mut session, _, out) = testing::session();
        run(&mut session, SETUP);
        run(&mut session, "stat $n1\n");
        assert!(output(&out).contains("\"status\": \"STOPPED\""));
    }

    #[test]
    fn test_configcluster_lists_members() {
        let (mut session, backend, out) = testing::session();
        run(&mut session, SETUP);
        backend.set_unreachable("10.0.0.2:10040", true);
        run(&mut session, "configcluster $c1\n");
        let printed = output(&out);
        assert!(printed.contains("  $n1 10.0.0.1:10040 STOPPED"));
        assert!(printed.contains("  $n2 10.0.0.2:10040 UNREACHABLE"));
    }
}
