//! Interactive tasknest shell.
//!
//! Runs the client against in-memory collaborators and drives it from
//! standard input, one command per line.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=tasknest=debug cargo run --bin tasknest
//! ```

use anyhow::Context;
use std::io::Write;
use std::sync::Arc;
use tasknest::cli::{self, Command, HELP};
use tasknest::{AppAction, AppConfig, AppEnvironment, AppReducer, AppState, TaskListEnvironment};
use tasknest_core::environment::SystemClock;
use tasknest_runtime::{Store, StoreError};
use tasknest_testing::{InMemoryDocumentStore, MockIdentityClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;

/// Send an action and wait until everything it triggered has settled.
async fn dispatch(store: &AppStore, action: AppAction) -> Result<(), StoreError> {
    let mut handle = store.send(action).await?;
    handle.wait().await;
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(collection = %config.collection, "Configuration loaded");

    let env = AppEnvironment::new(
        Arc::new(MockIdentityClient::new().with_clock(SystemClock)),
        TaskListEnvironment::new(
            Arc::new(InMemoryDocumentStore::new()),
            config.collection.clone(),
        ),
    );
    let store = Store::with_config(AppState::new(), AppReducer::new(), env, config.store_config());

    dispatch(&store, AppAction::Started).await?;
    println!("tasknest (type 'help' for commands)");
    let (text, mut shown) = store.state(cli::render).await;
    print!("{text}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(cli::ParseError::Empty) => continue,
            Err(error) => {
                println!("{error}");
                continue;
            },
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::List => {
                let (text, view) = store.state(cli::render).await;
                print!("{text}");
                shown = view;
            },
            command => {
                let screen = store.state(|state| state.screen).await;
                let actions = command.actions(screen, &shown);
                if actions.is_empty() && matches!(command, Command::Done { .. } | Command::Delete { .. }) {
                    println!("no such row, try 'list'");
                }
                for action in actions {
                    dispatch(&store, action).await?;
                }
                let (text, view) = store.state(cli::render).await;
                print!("{text}");
                shown = view;
                dispatch(&store, AppAction::DismissNotice).await?;
            },
        }
    }

    tracing::info!("Shutting down");
    store
        .shutdown(store.default_shutdown_timeout())
        .await
        .context("Remote calls still running at exit")?;
    Ok(())
}
