use crate::core::api::{QueryLanguage, QueryRequest};
use crate::core::command::{Args, CommandDescriptor, Reply};
use crate::core::error::ShellError;
use crate::core::session::{Connection, Session};
use crate::core::types::{ParamSpec, ParamType, Value};

const DEFAULT_DATABASE: &str = "public";

pub fn commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("connect", connect)
            .params(&[
                ParamSpec::fixed("cluster", ParamType::Cluster),
                ParamSpec::optional("database", ParamType::Str),
            ])
            .summary("Connect to a cluster for queries."),
        CommandDescriptor::new("disconnect", disconnect).summary("Close the current connection."),
        CommandDescriptor::new("tql", tql)
            .params(&[
                ParamSpec::fixed("container", ParamType::Str),
                ParamSpec::fixed("query", ParamType::Str),
            ])
            .multiline()
            .summary("Run a TQL query on a container. Ends at a line ending with ';'."),
        CommandDescriptor::new("sql", sql)
            .params(&[ParamSpec::fixed("query", ParamType::Str)])
            .multiline()
            .summary("Run an SQL statement. Ends at a line ending with ';'."),
    ]
}

fn connect(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    let cluster = args.cluster(0)?.clone();
    if cluster.nodes.is_empty() {
        return Err(ShellError::InvalidCluster {
            cluster: cluster.variable,
            reason: "it has no nodes".to_string(),
        });
    }
    session.credentials(false)?;
    let database = args.opt_str(1)?.unwrap_or(DEFAULT_DATABASE).to_string();

    session.printer.success(&format!("Connected to {} (database {})", cluster.name, database));
    session.connection = Some(Connection { cluster, database });
    Ok(Reply::Done)
}

fn disconnect(session: &mut Session, _args: &Args) -> Result<Reply, ShellError> {
    match session.connection.take() {
        Some(connection) => session.printer.info(&format!("Disconnected from {}", connection.cluster.name)),
        None => session.printer.info("Not connected"),
    }
    Ok(Reply::Done)
}

fn query(
    session: &mut Session,
    language: QueryLanguage,
    container: Option<&str>,
    text: &str,
) -> Result<Reply, ShellError> {
    let connection = session
        .connection
        .as_ref()
        .ok_or_else(|| ShellError::handler("Not connected; run connect first"))?;
    let creds = session.credentials(false)?;

    let request = QueryRequest {
        cluster: &connection.cluster,
        database: &connection.database,
        language,
        container,
        text,
        count: session.modes.sql_count,
    };
    let result = session.api.execute_query(&request, &creds)?;
    Ok(Reply::Value(Value::Json(result)))
}

fn tql(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    query(session, QueryLanguage::Tql, Some(args.str(0)?), args.str(1)?)
}

fn sql(session: &mut Session, args: &Args) -> Result<Reply, ShellError> {
    query(session, QueryLanguage::Sql, None, args.str(0)?)
}
