//! mongo-autocomplete
//!
//! Schema-aware autocomplete for MongoDB query filters. Samples a collection,
//! infers its schema and completes field names, operators and values as a
//! filter is typed.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode
//! mongo-autocomplete mongodb://localhost:27017/shop --collection orders
//!
//! # One-shot suggestions
//! mongo-autocomplete --collection orders suggest --text "{status: "
//! ```

use std::sync::Arc;
use tracing::{Level, warn};

use mongo_autocomplete::cli::CliInterface;
use mongo_autocomplete::connection::ConnectionManager;
use mongo_autocomplete::error::Result;
use mongo_autocomplete::ranking::FuzzyMatcher;
use mongo_autocomplete::repl::{ReplCommand, ReplEngine, ReplSession, SharedState};
use mongo_autocomplete::schema::{SchemaSampler, SchemaStore, SystemClock};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or start the interactive prompt
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand().await? {
        return Ok(());
    }

    cli.print_banner();

    run_interactive_mode(&cli).await
}

/// Run application in interactive REPL mode
async fn run_interactive_mode(cli: &CliInterface) -> Result<()> {
    let config = cli.config();
    let mut manager =
        ConnectionManager::new(cli.get_connection_uri(), config.connection.clone());
    manager.connect().await?;

    let session = create_session(cli, &manager)?;
    session.state().set_connected(manager.is_connected().await);
    let mut repl = ReplEngine::new(session.clone(), &config.history)?;

    run_repl_loop(&mut repl, &session).await?;

    manager.disconnect().await?;
    println!("Goodbye!");
    Ok(())
}

/// Wire the connection's data source into a schema store and session
fn create_session(cli: &CliInterface, manager: &ConnectionManager) -> Result<ReplSession> {
    let config = cli.config();
    let sampler = SchemaSampler::new(
        Arc::new(manager.data_source()?),
        config.sampling.sample_size,
    );
    let store = SchemaStore::new(sampler, config.schema_ttl(), Arc::new(SystemClock));

    let state = SharedState::with_config(
        manager.connection_id(),
        cli.get_database(),
        &config.display,
    );
    state.set_collection(cli.get_collection().map(str::to_string));

    // Start sampling before the first keystroke.
    if let Some(key) = state.cache_key() {
        store.schema_for(&key);
    }

    Ok(ReplSession::new(
        state,
        store,
        FuzzyMatcher::new(config.fuzzy.max_results, config.fuzzy.min_quality),
        config.suggestions.clone(),
    ))
}

/// Main REPL loop
async fn run_repl_loop(repl: &mut ReplEngine, session: &ReplSession) -> Result<()> {
    while repl.is_running() {
        let input = match repl.read_line()? {
            Some(line) => line,
            None => break,
        };

        let command = match ReplCommand::parse(&input) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        if command == ReplCommand::Exit {
            repl.stop();
            break;
        }

        match session.execute(command).await {
            Ok(output) if output.is_empty() => {}
            Ok(output) => println!("{}", output),
            Err(e) => {
                warn!("Command failed: {}", e);
                eprintln!("{}", e);
            }
        }
    }

    Ok(())
}

/// Initialize logging system based on verbosity level
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
