mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    add, delete, get, move_node, search, set, types, AddArgs, DeleteArgs, GetArgs, MoveArgs, SearchArgs,
    Session, SetArgs, TypesArgs,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// jsontree - edit JSON documents by path
#[derive(Parser, Debug)]
#[command(name = "jsontree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON document to open
    file: PathBuf,

    /// Editor config file (defaults to jsontree.config.json next to the document)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Save the result back to the document instead of printing it
    #[arg(short, long, global = true)]
    write: bool,

    /// Log editor activity
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value at a path
    Get(GetArgs),

    /// Replace the value at a path
    Set(SetArgs),

    /// Remove the value at a path
    Delete(DeleteArgs),

    /// Add a new value
    Add(AddArgs),

    /// Move a value next to another node
    ///
    /// Dragging is restricted unless the editor config sets `"restrictDrag": false`.
    #[command(after_help = "Moves are refused by default. Set \"restrictDrag\": false in jsontree.config.json to allow them.")]
    Move(MoveArgs),

    /// Find nodes matching a query
    Search(SearchArgs),

    /// Convert the value at a path to another type
    Types(TypesArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::load(cli.config.as_deref(), &cli.file)?;
    let session = Session::open(&cli.file, &config, cli.write)?;

    match cli.command {
        Command::Get(args) => return get(args, &session),
        Command::Search(args) => return search(args, &session),
        Command::Set(args) => set(args, &session).await?,
        Command::Delete(args) => delete(args, &session).await?,
        Command::Add(args) => add(args, &session).await?,
        Command::Move(args) => move_node(args, &session).await?,
        Command::Types(args) => types(args, &session).await?,
    }

    session.finish()
}
