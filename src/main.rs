use clap::Parser;
use tracing_subscriber::EnvFilter;

use kbase::cli::commands::{Cli, Command};
use kbase::cli::input::{self, Submissions};
use kbase::config::Config;
use kbase::db::Database;
use kbase::error::Result;
use kbase::operations::{self, to_json, ErrorOutput, SearchRequest};

fn main() {
    let cli = Cli::parse();
    let operation = cli.command.operation();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => fail(operation, &e),
    };
    init_tracing(&config.settings.logging.level);

    if let Err(e) = run(cli.command, &config) {
        fail(operation, &e);
    }
}

fn fail(operation: &str, err: &kbase::error::KbError) -> ! {
    eprintln!("{}", to_json(&ErrorOutput::new(operation, err)));
    std::process::exit(1);
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let config = Config::from_cwd()?;
    Ok(match &cli.db {
        Some(path) => config.with_db_path(path),
        None => config,
    })
}

/// Logs go to stderr; stdout carries JSON results and the MCP transport.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Mcp => return cmd_mcp(config.clone()),
        Command::Init => {
            print(&operations::init(config)?);
            return Ok(());
        }
        _ => {}
    }

    let db = Database::open_with_timeout(&config.db_path, config.busy_timeout())?;
    match command {
        Command::Index { input, format } => cmd_index(&db, &input, format)?,
        Command::Search {
            query,
            file_types,
            technologies,
            repos,
            tags,
            limit,
        } => print(&operations::search_knowledge(
            &db,
            SearchRequest {
                query,
                file_types,
                technologies,
                repos,
                tags,
                limit,
            },
        )?),
        Command::Context { path } => print(&operations::get_file_context(&db, &path)?),
        Command::Related { path, limit } => print(&operations::find_related(&db, &path, limit)?),
        Command::ByType {
            file_type,
            repo,
            limit,
        } => print(&operations::search_by_type(&db, &file_type, repo, limit)?),
        Command::Stats => print(&operations::get_stats(&db)?),
        Command::Deps { path, max_depth } => print(&operations::analyze_dependencies(
            &db,
            &path,
            max_depth,
            &config.settings.dependencies,
        )?),
        Command::Health => cmd_health(&db),
        Command::Mcp | Command::Init => {}
    }
    db.close()
}

fn print<T: serde::Serialize>(output: &T) {
    println!("{}", to_json(output));
}

fn cmd_index(db: &Database, input: &str, format: input::InputFormat) -> Result<()> {
    match input::read_submissions(input, format)? {
        Submissions::One(value) => print(&operations::index_file(db, Submissions::one(value)?)?),
        Submissions::Many(items) => print(&operations::index_batch(db, items)),
    }
    Ok(())
}

fn cmd_health(db: &Database) {
    let output = operations::health(db);
    print(&output);
    if !output.is_healthy() {
        std::process::exit(1);
    }
}

fn cmd_mcp(config: Config) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(kbase::mcp::server::start_mcp_server(config))
}
