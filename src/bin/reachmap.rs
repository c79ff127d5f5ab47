//! Reachmap CLI — load a dependency graph, then query it or serve it.
//!
//! Usage:
//!   reachmap serve --data graph.json [--listen 127.0.0.1:8000] [--cutoff 10]
//!   reachmap query --data graph.json [--start-public] [--end-sink] [--has-vuln]

use clap::{Parser, Subcommand};
use reachmap::{render, FilterSelection, GraphStore, QueryConfig, QueryEngine};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "reachmap",
    version,
    about = "Reachability queries over service-dependency graphs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Path to the graph JSON document
        #[arg(long)]
        data: PathBuf,
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8000")]
        listen: SocketAddr,
        /// Maximum edges per enumerated path
        #[arg(long, default_value_t = 10)]
        cutoff: usize,
    },
    /// Run a single query and print the result
    Query {
        /// Path to the graph JSON document
        #[arg(long)]
        data: PathBuf,
        /// Keep only publicly exposed start nodes
        #[arg(long)]
        start_public: bool,
        /// Keep only sink (rds/sqs) end nodes
        #[arg(long)]
        end_sink: bool,
        /// Keep only paths touching a vulnerable node
        #[arg(long)]
        has_vuln: bool,
        /// Print the Mermaid diagram instead of JSON
        #[arg(long)]
        mermaid: bool,
        /// Maximum edges per enumerated path
        #[arg(long, default_value_t = 10)]
        cutoff: usize,
    },
}

fn open_engine(data: &PathBuf, cutoff: usize) -> Result<QueryEngine, i32> {
    match GraphStore::load(data) {
        Ok(store) => Ok(QueryEngine::with_config(
            Arc::new(store),
            QueryConfig::default().cutoff(cutoff),
        )),
        Err(e) => {
            eprintln!("Error: cannot load '{}': {}", data.display(), e);
            Err(1)
        }
    }
}

fn cmd_query(engine: &QueryEngine, selection: FilterSelection, as_mermaid: bool) -> i32 {
    let result = engine.query_selection(selection);
    if as_mermaid {
        print!("{}", render::mermaid(engine.graph(), &result));
        return 0;
    }
    match serde_json::to_string_pretty(&result) {
        Ok(raw) => {
            println!("{}", raw);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reachmap=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { data, listen, cutoff } => {
            let engine = match open_engine(&data, cutoff) {
                Ok(engine) => Arc::new(engine),
                Err(code) => std::process::exit(code),
            };
            if let Err(e) = reachmap::server::serve(engine, listen).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Query {
            data,
            start_public,
            end_sink,
            has_vuln,
            mermaid,
            cutoff,
        } => {
            let engine = match open_engine(&data, cutoff) {
                Ok(engine) => engine,
                Err(code) => std::process::exit(code),
            };
            let mut selection = FilterSelection::none();
            if start_public {
                selection = selection.start_public();
            }
            if end_sink {
                selection = selection.end_sink();
            }
            if has_vuln {
                selection = selection.has_vulnerability();
            }
            std::process::exit(cmd_query(&engine, selection, mermaid));
        }
    }
}
