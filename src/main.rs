use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ticketlog::cli::{
    handle_add, handle_delete, handle_done, handle_edit, handle_export, handle_list,
    handle_search, handle_settings, handle_shell, resolve_data_dir, Cli, Commands,
};
use ticketlog::Result;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TICKETLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let dir = resolve_data_dir(cli.data_dir)?;

    match cli.command {
        Commands::Add(args) => handle_add(&dir, args),
        Commands::List {
            sort,
            reverse,
            json,
        } => handle_list(&dir, sort, reverse, json),
        Commands::Search { term, json } => handle_search(&dir, term, json),
        Commands::Edit {
            selector,
            fields,
            done,
        } => handle_edit(&dir, selector, fields, done),
        Commands::Done { selector } => handle_done(&dir, selector),
        Commands::Delete { selectors } => handle_delete(&dir, selectors),
        Commands::Export { path } => handle_export(&dir, path),
        Commands::Settings {
            reminders,
            interval,
            unit,
            view,
            json,
        } => handle_settings(&dir, reminders, interval, unit, view, json).await,
        Commands::Shell => handle_shell(&dir).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
