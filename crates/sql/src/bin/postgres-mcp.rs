use anyhow::Result;
use clap::Parser;
use toolrelay_mcp::cli::CommonArgs;
use toolrelay_mcp::{logging, ConfigSource};
use toolrelay_sql::postgres::PgConnector;
use toolrelay_sql::{Dialect, SessionHandle};

#[derive(Parser, Debug)]
#[command(name = "postgres-mcp")]
#[command(about = "MCP server for read-only PostgreSQL queries and schema inspection", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.common.log_format);

    let source = ConfigSource::load(args.common.config.as_deref())?;
    let handle = SessionHandle::new(Dialect::Postgres, PgConnector::new(source));

    toolrelay_sql::server::run(handle).await
}
